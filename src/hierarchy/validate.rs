//! Structural checks over a merged tree.
//!
//! Validation never fails and never filters: every problem found becomes an
//! entry in [`ValidationOutcome`], in tree order.

use serde::Serialize;

use crate::code;
use crate::models::{MergeResult, Region, RegionLevel, Totals};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// `name(code)`, tolerating either being empty.
fn label(region: &Region) -> String {
    format!("{}({})", region.name, region.code)
}

fn is_incomplete(region: &Region) -> bool {
    region.code.is_empty() || region.name.is_empty()
}

pub fn validate(result: &MergeResult) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for province in &result.provinces {
        check_node(&mut outcome, province, RegionLevel::Province, &[]);

        for city in &province.children {
            check_node(&mut outcome, city, RegionLevel::City, &[province]);
            check_containment(&mut outcome, city, province, RegionLevel::Province, &[province]);

            for county in &city.children {
                check_node(&mut outcome, county, RegionLevel::County, &[province, city]);
                check_containment(&mut outcome, county, city, RegionLevel::City, &[province, city]);
            }

            if city.children.is_empty() {
                outcome.warning(format!(
                    "{} - {} has no county data",
                    label(province),
                    label(city)
                ));
            }
        }

        if province.children.is_empty() {
            outcome.warning(format!("{} has no city data", label(province)));
        }
    }

    let recounted = Totals::tally(&result.provinces);
    if recounted != result.totals {
        outcome.error(format!(
            "Totals mismatch: recorded {}/{}/{} provinces/cities/counties, tree has {}/{}/{}",
            result.totals.province_count,
            result.totals.city_count,
            result.totals.county_count,
            recounted.province_count,
            recounted.city_count,
            recounted.county_count
        ));
    }

    outcome
}

/// Field presence, level tag and code shape for one node.
fn check_node(outcome: &mut ValidationOutcome, node: &Region, level: RegionLevel, path: &[&Region]) {
    let path_prefix: String = path.iter().map(|r| format!("{} - ", label(r))).collect();

    if is_incomplete(node) {
        outcome.error(format!(
            "Incomplete {}: {}code={:?} name={:?}",
            level, path_prefix, node.code, node.name
        ));
    }
    if node.level != level {
        outcome.error(format!(
            "{}{} is tagged {} but sits at {} level",
            path_prefix,
            label(node),
            node.level,
            level
        ));
    }
    if !node.code.is_empty() && !code::is_well_formed(&node.code) {
        outcome.warning(format!("{}{} has a non-numeric code", path_prefix, label(node)));
    }
}

/// The child's code prefix must equal the parent's code; the recorded
/// parent code must agree with the enclosing node.
fn check_containment(
    outcome: &mut ValidationOutcome,
    child: &Region,
    parent: &Region,
    parent_level: RegionLevel,
    path: &[&Region],
) {
    if let Some(recorded) = child.parent_code.as_deref() {
        if recorded != parent.code {
            outcome.warning(format!(
                "{} records parent {} but is listed under {}",
                label(child),
                recorded,
                label(parent)
            ));
        }
    } else {
        outcome.warning(format!("{} has no parent code", label(child)));
    }

    if child.code.is_empty() || parent.code.is_empty() {
        return;
    }

    match code::prefix(&child.code, parent_level) {
        Ok(p) if p == parent.code => {}
        Ok(_) => outcome.warning(format!(
            "Code hierarchy mismatch: {} - {}",
            label(parent),
            label(child)
        )),
        Err(e) => {
            let path_prefix: String = path.iter().map(|r| format!("{} - ", label(r))).collect();
            outcome.error(format!("{}{}: {}", path_prefix, label(child), e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(level: RegionLevel, code: &str, name: &str, parent: Option<&str>) -> Region {
        Region::new(level, code, name, parent.map(str::to_string))
    }

    /// 北京市 > 市辖区 > {东城区, 朝阳区}
    fn beijing() -> MergeResult {
        let mut city = region(RegionLevel::City, "1101", "市辖区", Some("11"));
        city.children = vec![
            region(RegionLevel::County, "110101", "东城区", Some("1101")),
            region(RegionLevel::County, "110105", "朝阳区", Some("1101")),
        ];
        let mut province = region(RegionLevel::Province, "11", "北京市", None);
        province.children.push(city);
        let provinces = vec![province];
        let totals = Totals::tally(&provinces);
        MergeResult::new("test", provinces, totals)
    }

    #[test]
    fn test_clean_tree() {
        assert!(validate(&beijing()).is_clean());
    }

    #[test]
    fn test_seeded_prefix_violation_is_one_warning() {
        let mut result = beijing();
        result.provinces[0].children[0].children[1].code = "120105".to_string();

        let outcome = validate(&result);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("市辖区"));
        assert!(outcome.warnings[0].contains("朝阳区"));
    }

    #[test]
    fn test_missing_fields_are_errors() {
        let mut result = beijing();
        result.provinces[0].children[0].children[0].name = String::new();
        result.provinces[0].children[0].name = String::new();

        let outcome = validate(&result);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].starts_with("Incomplete city"));
        assert!(outcome.errors[1].starts_with("Incomplete county"));
        assert!(outcome.errors[1].contains("北京市(11)"));
    }

    #[test]
    fn test_short_county_code_is_error() {
        let mut result = beijing();
        result.provinces[0].children[0].children[0].code = "110".to_string();

        let outcome = validate(&result);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("malformed"));
    }

    #[test]
    fn test_empty_children_are_warnings_in_tree_order() {
        let mut result = beijing();
        result.provinces[0].children[0].children.clear();
        result
            .provinces
            .push(region(RegionLevel::Province, "41", "河南省", None));
        result.totals = Totals::tally(&result.provinces);

        let outcome = validate(&result);
        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![
                "北京市(11) - 市辖区(1101) has no county data".to_string(),
                "河南省(41) has no city data".to_string(),
            ]
        );
    }

    #[test]
    fn test_totals_mismatch_is_error() {
        let mut result = beijing();
        result.totals.county_count = 7;

        let outcome = validate(&result);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Totals mismatch"));
    }

    #[test]
    fn test_city_outside_province_is_warning() {
        let mut result = beijing();
        result.provinces[0].children[0].code = "1201".to_string();
        for county in &mut result.provinces[0].children[0].children {
            county.parent_code = Some("1201".to_string());
            county.code = county.code.replacen("11", "12", 1);
        }

        let outcome = validate(&result);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("北京市(11)"));
    }

    #[test]
    fn test_wrong_parent_code_is_warning() {
        let mut result = beijing();
        result.provinces[0].children[0].children[0].parent_code = Some("1102".to_string());

        let outcome = validate(&result);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("records parent 1102"));
    }
}

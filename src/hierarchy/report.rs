//! Flattened per-province / per-city counts derived from a merged tree.

use serde::{Deserialize, Serialize};

use crate::models::{MergeResult, Region};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub summary: Summary,
    pub provinces: Vec<ProvinceSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_provinces: usize,
    pub total_cities: usize,
    pub total_counties: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSummary {
    pub code: String,
    pub name: String,
    pub city_count: usize,
    pub county_count: usize,
    pub cities: Vec<CitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub code: String,
    pub name: String,
    pub county_count: usize,
}

impl From<&Region> for CitySummary {
    fn from(city: &Region) -> Self {
        Self {
            code: city.code.clone(),
            name: city.name.clone(),
            county_count: city.child_count(),
        }
    }
}

impl From<&Region> for ProvinceSummary {
    fn from(province: &Region) -> Self {
        Self {
            code: province.code.clone(),
            name: province.name.clone(),
            city_count: province.child_count(),
            county_count: province.grandchild_count(),
            cities: province.children.iter().map(CitySummary::from).collect(),
        }
    }
}

/// Project a merged tree onto its report. Grand totals come from the
/// recorded running sums; the validator checks those against the tree.
pub fn report(result: &MergeResult) -> SummaryReport {
    SummaryReport {
        summary: Summary {
            total_provinces: result.totals.province_count,
            total_cities: result.totals.city_count,
            total_counties: result.totals.county_count,
        },
        provinces: result.provinces.iter().map(ProvinceSummary::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegionLevel, Totals};

    fn sample() -> MergeResult {
        let mut zhengzhou = Region::new(RegionLevel::City, "4101", "郑州市", Some("41".into()));
        zhengzhou.children = vec![
            Region::new(RegionLevel::County, "410102", "中原区", Some("4101".into())),
            Region::new(RegionLevel::County, "410103", "二七区", Some("4101".into())),
        ];
        let kaifeng = Region::new(RegionLevel::City, "4102", "开封市", Some("41".into()));
        let mut henan = Region::new(RegionLevel::Province, "41", "河南省", None);
        henan.children = vec![zhengzhou, kaifeng];
        let hubei = Region::new(RegionLevel::Province, "42", "湖北省", None);

        let provinces = vec![henan, hubei];
        let totals = Totals::tally(&provinces);
        MergeResult::new("test", provinces, totals)
    }

    #[test]
    fn test_report_matches_rewalk() {
        let result = sample();
        let report = report(&result);

        let rewalk = Totals::tally(&result.provinces);
        assert_eq!(report.summary.total_provinces, rewalk.province_count);
        assert_eq!(report.summary.total_cities, rewalk.city_count);
        assert_eq!(report.summary.total_counties, rewalk.county_count);

        let cities: usize = report.provinces.iter().map(|p| p.city_count).sum();
        let counties: usize = report.provinces.iter().map(|p| p.county_count).sum();
        assert_eq!(cities, report.summary.total_cities);
        assert_eq!(counties, report.summary.total_counties);
    }

    #[test]
    fn test_per_province_breakdown() {
        let report = report(&sample());

        let henan = &report.provinces[0];
        assert_eq!((henan.city_count, henan.county_count), (2, 2));
        assert_eq!(
            henan.cities,
            vec![
                CitySummary {
                    code: "4101".into(),
                    name: "郑州市".into(),
                    county_count: 2
                },
                CitySummary {
                    code: "4102".into(),
                    name: "开封市".into(),
                    county_count: 0
                },
            ]
        );
        assert!(report.provinces[1].cities.is_empty());
    }

    #[test]
    fn test_report_field_names() {
        let value = serde_json::to_value(report(&sample())).unwrap();
        assert_eq!(value["summary"]["totalCounties"], 2);
        assert_eq!(value["provinces"][0]["cities"][0]["countyCount"], 2);
        assert_eq!(value["provinces"][0]["cityCount"], 2);
    }
}

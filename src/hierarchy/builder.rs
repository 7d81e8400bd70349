//! Assembles the province -> city -> county tree from the source documents.

use hashbrown::HashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::code;
use crate::edition::{Edition, MismatchPolicy, ProvinceEntry};
use crate::models::{Document, Feature, Geometry, MergeResult, Region, RegionLevel, Totals};
use crate::source::DocumentSource;

/// Builds a [`MergeResult`] for one edition.
///
/// Provinces are visited in edition table order regardless of how the input
/// files are ordered. Each province is independent, so they are assembled on
/// the rayon pool and collected back into table order.
pub struct HierarchyBuilder<'a> {
    edition: &'a Edition,
    progress: Option<ProgressBar>,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(edition: &'a Edition) -> Self {
        Self {
            edition,
            progress: None,
        }
    }

    /// Tick `progress` once per finished province.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(&self, root: &Document, source: &dyn DocumentSource) -> MergeResult {
        info!(
            "Merging {} provinces for {}",
            self.edition.provinces().len(),
            self.edition.name()
        );

        let built: Vec<(Region, Totals)> = self
            .edition
            .provinces()
            .par_iter()
            .map(|entry| {
                let built = self.build_province(entry, root, source);
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                built
            })
            .collect();

        let mut totals = Totals::default();
        let mut provinces = Vec::with_capacity(built.len());
        for (province, subtotal) in built {
            totals.absorb(subtotal);
            provinces.push(province);
        }

        info!(
            "Merged {} provinces, {} cities, {} counties",
            totals.province_count, totals.city_count, totals.county_count
        );

        MergeResult::new(self.edition.name(), provinces, totals)
    }

    /// One province plus the counts gathered while assembling it.
    fn build_province(
        &self,
        entry: &ProvinceEntry,
        root: &Document,
        source: &dyn DocumentSource,
    ) -> (Region, Totals) {
        let geometry = match root.find(&entry.code) {
            Some(feature) => Geometry::from_value(feature.geometry.clone()),
            None => {
                warn!(
                    "No boundary for {} ({}) in root document",
                    entry.name, entry.code
                );
                None
            }
        };

        let mut province =
            Region::new(RegionLevel::Province, &entry.code, &entry.name, None).with_geometry(geometry);

        let mut subtotal = Totals {
            province_count: 1,
            ..Totals::default()
        };
        province.children = if self.edition.is_direct_administration(&entry.code) {
            vec![self.build_municipal_district(entry, source, &mut subtotal)]
        } else {
            self.build_cities(entry, source, &mut subtotal)
        };

        if province.children.is_empty() {
            warn!("{} ({}) has no city data", entry.name, entry.code);
        }

        info!(
            "{} ({}): {} cities, {} counties",
            entry.name, entry.code, subtotal.city_count, subtotal.county_count
        );

        (province, subtotal)
    }

    /// Direct-administration units get a single placeholder city holding
    /// every county document filed under the province code.
    fn build_municipal_district(
        &self,
        entry: &ProvinceEntry,
        source: &dyn DocumentSource,
        subtotal: &mut Totals,
    ) -> Region {
        let mut city = Region::new(
            RegionLevel::City,
            code::municipal_district_code(&entry.code),
            self.edition.municipal_district_name(),
            Some(entry.code.clone()),
        );
        city.children = self.collect_counties(&city, &entry.code, source);
        subtotal.city_count += 1;
        subtotal.county_count += city.children.len();

        if city.children.is_empty() {
            warn!("{} - {} has no county data", entry.name, city.name);
        }
        city
    }

    fn build_cities(
        &self,
        entry: &ProvinceEntry,
        source: &dyn DocumentSource,
        subtotal: &mut Totals,
    ) -> Vec<Region> {
        let document = match source.province(&entry.code) {
            Ok(d) => d,
            Err(e) => {
                warn!(
                    "Could not load city data for {} ({}): {}",
                    entry.name, entry.code, e
                );
                return Vec::new();
            }
        };

        debug!(
            "{} ({}): {} city features",
            entry.name,
            entry.code,
            document.features.len()
        );

        let mut cities = Vec::with_capacity(document.features.len());
        for feature in document.features {
            let mut city = region_from_feature(RegionLevel::City, feature, &entry.code);
            if !self.accepts(&city, &entry.code) {
                continue;
            }

            if code::is_well_formed(&city.code) {
                city.children = self.collect_counties(&city, &city.code, source);
            } else {
                // An empty prefix would match every county document.
                warn!(
                    "{} - {}: unusable city code {:?}, skipping county lookup",
                    entry.name, city.name, city.code
                );
            }

            if city.children.is_empty() {
                warn!("{} - {} has no county data", entry.name, city.name);
            }
            subtotal.city_count += 1;
            subtotal.county_count += city.children.len();
            cities.push(city);
        }
        cities
    }

    /// Counties from every county document whose key starts with `key_prefix`,
    /// in key order. A county code seen twice keeps its first position and
    /// takes the data of the later record.
    fn collect_counties(
        &self,
        city: &Region,
        key_prefix: &str,
        source: &dyn DocumentSource,
    ) -> Vec<Region> {
        let mut counties: Vec<Region> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for key in source.county_keys(key_prefix) {
            let document = match source.county(&key) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Could not load county data {} for {}: {}", key, city.name, e);
                    continue;
                }
            };

            for feature in document.features {
                let county = region_from_feature(RegionLevel::County, feature, &city.code);
                if !self.accepts(&county, &city.code) {
                    continue;
                }

                if county.code.is_empty() {
                    counties.push(county);
                    continue;
                }
                match positions.get(&county.code) {
                    Some(&i) => {
                        debug!("Duplicate county {} in {}, later record wins", county.code, key);
                        counties[i] = county;
                    }
                    None => {
                        positions.insert(county.code.clone(), counties.len());
                        counties.push(county);
                    }
                }
            }
        }
        counties
    }

    /// Check a child's code against its parent's and apply the mismatch policy.
    fn accepts(&self, child: &Region, parent_code: &str) -> bool {
        if child.code.is_empty() {
            return true;
        }
        let parent_level = match child.level {
            RegionLevel::County => RegionLevel::City,
            _ => RegionLevel::Province,
        };
        match code::prefix(&child.code, parent_level) {
            Ok(p) if p == parent_code => true,
            _ => {
                let policy = self.edition.mismatch_policy();
                warn!(
                    "{} {} ({}) does not belong to {} ({:?})",
                    child.level,
                    child.name,
                    child.code,
                    parent_code,
                    policy
                );
                policy == MismatchPolicy::Keep
            }
        }
    }
}

fn region_from_feature(level: RegionLevel, feature: Feature, parent_code: &str) -> Region {
    let code = feature.code().unwrap_or_default().to_string();
    let name = feature.name().unwrap_or_default().to_string();
    Region::new(level, code, name, Some(parent_code.to_string()))
        .with_geometry(Geometry::from_value(feature.geometry))
}

//! Administrative hierarchy types: the merged province/city/county tree.

use serde::{Deserialize, Serialize};

use super::geometry::{GeoBbox, Geometry};

/// Administrative tier, mapped to the code prefix length that identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    /// Province, autonomous region, municipality or SAR (2-digit prefix)
    Province,
    /// Prefecture-level city (4-digit prefix)
    City,
    /// County / district (6-digit prefix)
    County,
}

impl RegionLevel {
    /// Number of leading code characters identifying a unit at this level
    pub fn prefix_len(&self) -> usize {
        match self {
            RegionLevel::Province => 2,
            RegionLevel::City => 4,
            RegionLevel::County => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLevel::Province => "province",
            RegionLevel::City => "city",
            RegionLevel::County => "county",
        }
    }
}

impl std::fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the merged tree.
///
/// `code` and `name` default to empty strings on deserialization so that a
/// reloaded document with missing fields still parses; the validator reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub level: RegionLevel,

    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub name: String,

    /// `None` only for provinces
    #[serde(default)]
    pub parent_code: Option<String>,

    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<GeoBbox>,

    #[serde(default)]
    pub children: Vec<Region>,
}

impl Region {
    pub fn new(
        level: RegionLevel,
        code: impl Into<String>,
        name: impl Into<String>,
        parent_code: Option<String>,
    ) -> Self {
        Self {
            level,
            code: code.into(),
            name: name.into(),
            parent_code,
            geometry: None,
            bbox: None,
            children: Vec::new(),
        }
    }

    /// Attach a geometry, deriving the envelope from it.
    pub fn with_geometry(mut self, geometry: Option<Geometry>) -> Self {
        self.bbox = geometry.as_ref().and_then(Geometry::bbox);
        self.geometry = geometry;
        self
    }

    /// Number of descendants at the next level down.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of grandchildren (counties of a province).
    pub fn grandchild_count(&self) -> usize {
        self.children.iter().map(Region::child_count).sum()
    }
}

/// Running counts accumulated while building the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub province_count: usize,
    pub city_count: usize,
    pub county_count: usize,
}

impl Totals {
    /// Fold one finished province into the running sums.
    pub fn add_province(&mut self, province: &Region) {
        self.province_count += 1;
        self.city_count += province.child_count();
        self.county_count += province.grandchild_count();
    }

    /// Add a subtotal produced while building one province.
    pub fn absorb(&mut self, other: Totals) {
        self.province_count += other.province_count;
        self.city_count += other.city_count;
        self.county_count += other.county_count;
    }

    /// Recount from scratch by walking the tree.
    pub fn tally(provinces: &[Region]) -> Self {
        let mut totals = Totals::default();
        for province in provinces {
            totals.add_province(province);
        }
        totals
    }
}

/// Root of the persisted hierarchy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    #[serde(rename = "type")]
    pub collection_type: String,

    #[serde(default)]
    pub name: String,

    pub provinces: Vec<Region>,

    pub totals: Totals,
}

impl MergeResult {
    pub const COLLECTION_TYPE: &'static str = "FeatureCollection";

    pub fn new(name: impl Into<String>, provinces: Vec<Region>, totals: Totals) -> Self {
        Self {
            collection_type: Self::COLLECTION_TYPE.to_string(),
            name: name.into(),
            provinces,
            totals,
        }
    }
}

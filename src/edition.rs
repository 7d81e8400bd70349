//! Country edition: the fixed province table and direct-administration set.
//!
//! An edition is immutable input to the builder. The built-in default is the
//! mainland China table; other editions load from TOML.

use std::fs;
use std::path::Path;

use hashbrown::HashSet;
use serde::Deserialize;

use crate::code;
use crate::error::EditionError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvinceEntry {
    pub code: String,
    pub name: String,
}

/// What to do with a county record whose city prefix disagrees with the city
/// whose document listed it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Attach it anyway; the validator flags it.
    #[default]
    Keep,
    /// Leave it out of the tree.
    Drop,
}

#[derive(Debug, Clone, Deserialize)]
struct EditionFile {
    name: String,
    #[serde(default = "default_municipal_district_name")]
    municipal_district_name: String,
    #[serde(default)]
    direct_administration: Vec<String>,
    #[serde(default)]
    mismatch_policy: MismatchPolicy,
    provinces: Vec<ProvinceEntry>,
}

fn default_municipal_district_name() -> String {
    "市辖区".to_string()
}

#[derive(Debug, Clone)]
pub struct Edition {
    name: String,
    municipal_district_name: String,
    provinces: Vec<ProvinceEntry>,
    direct_administration: HashSet<String>,
    mismatch_policy: MismatchPolicy,
}

const CHINA_PROVINCES: &[(&str, &str)] = &[
    ("11", "北京市"),
    ("12", "天津市"),
    ("13", "河北省"),
    ("14", "山西省"),
    ("15", "内蒙古自治区"),
    ("21", "辽宁省"),
    ("22", "吉林省"),
    ("23", "黑龙江省"),
    ("31", "上海市"),
    ("32", "江苏省"),
    ("33", "浙江省"),
    ("34", "安徽省"),
    ("35", "福建省"),
    ("36", "江西省"),
    ("37", "山东省"),
    ("41", "河南省"),
    ("42", "湖北省"),
    ("43", "湖南省"),
    ("44", "广东省"),
    ("45", "广西壮族自治区"),
    ("46", "海南省"),
    ("50", "重庆市"),
    ("51", "四川省"),
    ("52", "贵州省"),
    ("53", "云南省"),
    ("54", "西藏自治区"),
    ("61", "陕西省"),
    ("62", "甘肃省"),
    ("63", "青海省"),
    ("64", "宁夏回族自治区"),
    ("65", "新疆维吾尔自治区"),
    ("71", "台湾省"),
    ("81", "香港特别行政区"),
    ("82", "澳门特别行政区"),
];

/// Municipalities and special administrative regions.
const CHINA_DIRECT_ADMINISTRATION: &[&str] = &["11", "12", "31", "50", "81", "82"];

impl Edition {
    pub fn new(
        name: impl Into<String>,
        provinces: Vec<ProvinceEntry>,
        direct_administration: impl IntoIterator<Item = String>,
    ) -> Result<Self, EditionError> {
        let edition = Self {
            name: name.into(),
            municipal_district_name: default_municipal_district_name(),
            provinces,
            direct_administration: direct_administration.into_iter().collect(),
            mismatch_policy: MismatchPolicy::default(),
        };
        edition.check()?;
        Ok(edition)
    }

    /// Built-in mainland China edition.
    pub fn china() -> Self {
        Self {
            name: "中国行政区划数据".to_string(),
            municipal_district_name: default_municipal_district_name(),
            provinces: CHINA_PROVINCES
                .iter()
                .map(|(code, name)| ProvinceEntry {
                    code: code.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            direct_administration: CHINA_DIRECT_ADMINISTRATION
                .iter()
                .map(|c| c.to_string())
                .collect(),
            mismatch_policy: MismatchPolicy::default(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EditionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EditionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            EditionError::Parse { source, .. } => EditionError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, EditionError> {
        let file: EditionFile = toml::from_str(content).map_err(|source| EditionError::Parse {
            path: Default::default(),
            source,
        })?;
        let edition = Self {
            name: file.name,
            municipal_district_name: file.municipal_district_name,
            provinces: file.provinces,
            direct_administration: file.direct_administration.into_iter().collect(),
            mismatch_policy: file.mismatch_policy,
        };
        edition.check()?;
        Ok(edition)
    }

    fn check(&self) -> Result<(), EditionError> {
        let mut seen = HashSet::new();
        for entry in &self.provinces {
            if entry.code.len() != 2 || !code::is_well_formed(&entry.code) {
                return Err(EditionError::Invalid(format!(
                    "province code {:?} is not a 2-digit code",
                    entry.code
                )));
            }
            if entry.name.is_empty() {
                return Err(EditionError::Invalid(format!(
                    "province {} has no name",
                    entry.code
                )));
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(EditionError::Invalid(format!(
                    "province code {} listed twice",
                    entry.code
                )));
            }
        }
        if let Some(stray) = self
            .direct_administration
            .iter()
            .find(|c| !seen.contains(c.as_str()))
        {
            return Err(EditionError::Invalid(format!(
                "direct-administration code {} is not in the province table",
                stray
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn municipal_district_name(&self) -> &str {
        &self.municipal_district_name
    }

    /// Provinces in table order; this order drives the output order.
    pub fn provinces(&self) -> &[ProvinceEntry] {
        &self.provinces
    }

    pub fn mismatch_policy(&self) -> MismatchPolicy {
        self.mismatch_policy
    }

    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    pub fn is_direct_administration(&self, province_code: &str) -> bool {
        self.direct_administration.contains(province_code)
    }

    /// Resolve a province by code, full name, or short name.
    ///
    /// Exact code or name wins; otherwise a short name matches as a prefix of
    /// the full name ("北京" -> "北京市").
    pub fn find_province(&self, query: &str) -> Option<&ProvinceEntry> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.provinces
            .iter()
            .find(|p| p.code == query || p.name == query)
            .or_else(|| self.provinces.iter().find(|p| p.name.starts_with(query)))
    }

    /// Keep only the provinces matched by `queries`, in table order.
    pub fn restrict_to(&self, queries: &[String]) -> Result<Self, EditionError> {
        let mut keep = HashSet::new();
        for query in queries {
            let entry = self.find_province(query).ok_or_else(|| {
                EditionError::Invalid(format!("unknown province {:?}", query))
            })?;
            keep.insert(entry.code.clone());
        }
        Ok(Self {
            name: self.name.clone(),
            municipal_district_name: self.municipal_district_name.clone(),
            provinces: self
                .provinces
                .iter()
                .filter(|p| keep.contains(&p.code))
                .cloned()
                .collect(),
            direct_administration: self
                .direct_administration
                .iter()
                .filter(|c| keep.contains(*c))
                .cloned()
                .collect(),
            mismatch_policy: self.mismatch_policy,
        })
    }
}

impl Default for Edition {
    fn default() -> Self {
        Self::china()
    }
}

//! Input documents: the GeoJSON feature collections published per level.

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// A parsed source document (nationwide, per-province, or per-city).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Document {
    /// Find the feature whose identifying code equals `code`.
    pub fn find(&self, code: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.code() == Some(code))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<FeatureProperties>,

    #[serde(default)]
    pub geometry: Value,
}

/// Upstream publishers disagree on `id` vs `code`, and on string vs number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(default, deserialize_with = "code_from_value")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "code_from_value")]
    pub code: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

impl Feature {
    /// Identifying code: `properties.id`, falling back to `properties.code`.
    pub fn code(&self) -> Option<&str> {
        let props = self.properties.as_ref()?;
        props
            .id
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| props.code.as_deref().filter(|c| !c.is_empty()))
    }

    pub fn name(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|n| !n.is_empty())
    }
}

fn code_from_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(number_code(&n)),
        _ => None,
    })
}

/// Integral floats (`4101.0`) render without the fraction.
fn number_code(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_u64() && !n.is_i64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{:.0}", f)
        }
        _ => n.to_string(),
    }
}

//! Series record as returned by the backend's series listing

use serde::{Deserialize, Deserializer};

/// Series an event is filed under
///
/// Every field is optional on the wire; missing lists deserialize empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Series {
    pub identifier: String,
    pub title: String,
    #[serde(deserialize_with = "nullable_list")]
    pub subjects: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub contributors: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub creators: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub publishers: Vec<String>,
    pub language: Option<String>,
    pub license: Option<String>,
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

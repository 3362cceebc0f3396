use serde::{Deserialize, Deserializer, Serialize};

/// A recording stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecording {
    /// Backend identifier; numeric ids are kept in their decimal form
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,

    /// Original file name of the upload
    pub filename: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

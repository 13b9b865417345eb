//! Request and response bodies of the marketplace API.
//!
//! Field names follow the service's camelCase JSON. Response types default
//! missing fields so older deployments still decode.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use defai_core::domain::Tier;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// What `publish` uploads: the archive plus the listing terms.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub bundle: PathBuf,
    pub tier: Tier,
    pub price: f64,
    pub royalty: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub element_id: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: u64,
}

/// `/elements/{id}/stats` answers with one object, `/elements/stats` with
/// an array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    One(ElementStats),
    Many(Vec<ElementStats>),
}

impl StatsResponse {
    pub fn into_vec(self) -> Vec<ElementStats> {
        match self {
            Self::One(stats) => vec![stats],
            Self::Many(all) => all,
        }
    }
}

/// One row of `GET /elements`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// `GET /elements` may wrap the array as `{"elements": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse {
    Bare(Vec<ElementSummary>),
    Wrapped { elements: Vec<ElementSummary> },
}

impl ListResponse {
    pub(crate) fn into_vec(self) -> Vec<ElementSummary> {
        match self {
            Self::Bare(all) | Self::Wrapped { elements: all } => all,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Ids come back as strings from some endpoints and numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_accepts_one_or_many() {
        let one: StatsResponse =
            serde_json::from_str(r#"{"downloads": 3, "revenue": 1.5, "rating": 4.0, "reviews": 2}"#)
                .unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: StatsResponse =
            serde_json::from_str(r#"[{"elementId": "a", "downloads": 1}, {"elementId": "b"}]"#)
                .unwrap();
        let many = many.into_vec();
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].element_id.as_deref(), Some("a"));
        assert_eq!(many[1].downloads, 0);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let response: PublishResponse =
            serde_json::from_str(r#"{"elementId": 42, "url": "https://x"}"#).unwrap();
        assert_eq!(response.element_id, "42");

        let login: LoginResponse =
            serde_json::from_str(r#"{"token": "t", "user": {"id": 7, "email": "a@b.co"}}"#)
                .unwrap();
        assert_eq!(login.user.id, "7");
    }

    #[test]
    fn list_accepts_wrapped_array() {
        let wrapped: ListResponse =
            serde_json::from_str(r#"{"elements": [{"id": "x", "name": "X"}]}"#).unwrap();
        assert_eq!(wrapped.into_vec()[0].name, "X");
    }
}

//! The project descriptor (`package.json`) and its `defaiElement` block.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    entities::element::ElementDetails,
    error::DomainError,
    value_objects::{Category, Tier},
};

/// File name of the descriptor inside a project directory.
pub const DESCRIPTOR_FILE: &str = "package.json";

/// npm scope every element package is published under.
pub const PACKAGE_SCOPE: &str = "@defai-element";

/// Marketplace listing data duplicated into `package.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConfig {
    pub id: String,
    pub display_name: String,
    pub category: Category,
    pub tier: Tier,
    #[serde(default)]
    pub price: f64,
}

impl From<&ElementDetails> for ElementConfig {
    fn from(details: &ElementDetails) -> Self {
        Self {
            id: details.name.clone(),
            display_name: details.display_name.clone(),
            category: details.category,
            tier: details.tier,
            price: details.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defai_element: Option<ElementConfig>,
    /// `scripts`, `dependencies` and everything else, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDescriptor {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::InvalidDescriptor {
            reason: e.to_string(),
        })
    }

    /// `@defai-element/<slug>`
    pub fn package_name(slug: &str) -> String {
        format!("{PACKAGE_SCOPE}/{slug}")
    }

    pub fn apply_details(&mut self, details: &ElementDetails) {
        self.name = Self::package_name(&details.name);
        self.description = details.description.clone();
        self.author = details.author.clone();
        self.defai_element = Some(ElementConfig::from(details));
    }

    pub fn to_pretty_json(&self) -> String {
        let mut out = serde_json::to_string_pretty(self).unwrap_or_default();
        out.push('\n');
        out
    }
}

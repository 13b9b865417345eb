//! The element manifest (`manifest.json`).
//!
//! [`ElementManifest`] is the typed form. Unknown keys survive a
//! read-modify-write cycle through the flattened `extra` map, so the tool
//! never drops fields a user (or a newer marketplace) added by hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    entities::element::ElementDetails,
    validation::{manifest_semantic_issues, missing_manifest_fields},
    value_objects::{Capability, Category, Tier},
};

/// File name of the manifest inside a project directory.
pub const MANIFEST_FILE: &str = "manifest.json";

// ============================================================================
// Size
// ============================================================================

/// Pixel dimensions of an element frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const MAX_WIDTH: u32 = 1920;
    pub const MAX_HEIGHT: u32 = 1080;

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_within_bounds(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.width <= Self::MAX_WIDTH
            && self.height <= Self::MAX_HEIGHT
    }

    /// True if both dimensions are no larger than `other`'s.
    pub const fn fits_within(&self, other: &Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Whole-pixel size from a raw JSON object; `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        let dim = |key| {
            value
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
        };
        Some(Self::new(dim("width")?, dim("height")?))
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Requested host capabilities. Absent keys mean "not requested".
pub type PermissionSet = BTreeMap<Capability, bool>;

// ============================================================================
// ElementManifest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementManifest {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub category: Category,
    pub tier_required: Tier,
    #[serde(default)]
    pub price: f64,
    pub default_size: Size,
    pub min_size: Size,
    pub max_size: Size,
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_output: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementManifest {
    /// Parse and validate a manifest document.
    ///
    /// Returns every problem found: syntax, missing fields, bad enum values,
    /// out-of-range or mis-ordered sizes, malformed permissions. A document
    /// only deserializes into the typed form once all of those pass.
    pub fn parse(raw: &str) -> Result<Self, Vec<String>> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| vec![format!("Invalid manifest.json format: {e}")])?;
        Self::from_value(value)
    }

    /// Same as [`parse`](Self::parse) for an already-decoded document.
    pub fn from_value(value: Value) -> Result<Self, Vec<String>> {
        if !value.is_object() {
            return Err(vec!["Invalid manifest.json format: expected an object".into()]);
        }

        let mut issues: Vec<String> = missing_manifest_fields(&value)
            .into_iter()
            .map(|field| format!("manifest.json missing \"{field}\" field"))
            .collect();
        issues.extend(manifest_semantic_issues(&value));
        if !issues.is_empty() {
            return Err(issues);
        }

        serde_json::from_value(value).map_err(|e| vec![format!("manifest.json: {e}")])
    }

    /// Pretty JSON with a trailing newline, as written to disk.
    pub fn to_pretty_json(&self) -> String {
        // Serializing a struct of strings, numbers and string-keyed maps
        // cannot fail.
        let mut out = serde_json::to_string_pretty(self).unwrap_or_default();
        out.push('\n');
        out
    }

    /// Overwrite identity and listing fields from creation answers.
    pub fn apply_details(&mut self, details: &ElementDetails) {
        self.id = details.name.clone();
        self.name = details.display_name.clone();
        self.description = details.description.clone();
        self.author = details.author.clone();
        self.category = details.category;
        self.tier_required = details.tier;
        self.price = details.price;
    }

    /// Capabilities switched on, in canonical order.
    pub fn requested_capabilities(&self) -> Vec<Capability> {
        self.permissions
            .iter()
            .filter_map(|(capability, enabled)| enabled.then_some(*capability))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_manifest() -> Value {
        json!({
            "id": "price-ticker",
            "name": "Price Ticker",
            "version": "1.0.0",
            "description": "Live prices",
            "author": "Ada",
            "category": "AI Tools",
            "tierRequired": "gold",
            "price": 4.5,
            "defaultSize": {"width": 400, "height": 300},
            "minSize": {"width": 200, "height": 150},
            "maxSize": {"width": 800, "height": 600},
            "permissions": {"network": true, "wallet": false},
            "homepage": "https://example.com"
        })
    }

    #[test]
    fn parses_typed_manifest() {
        let manifest = ElementManifest::from_value(raw_manifest()).unwrap();
        assert_eq!(manifest.category, Category::AiTools);
        assert_eq!(manifest.tier_required, Tier::Gold);
        assert_eq!(manifest.default_size, Size::new(400, 300));
        assert_eq!(manifest.requested_capabilities(), vec![Capability::Network]);
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let manifest = ElementManifest::from_value(raw_manifest()).unwrap();
        let written: Value = serde_json::from_str(&manifest.to_pretty_json()).unwrap();
        assert_eq!(written["homepage"], "https://example.com");
        assert!(written.get("publishedAt").is_none());
    }

    #[test]
    fn reports_all_problems_at_once() {
        let mut raw = raw_manifest();
        raw["author"] = json!("");
        raw["minSize"] = json!({"width": 900, "height": 150});
        raw["permissions"] = json!({"bogus": true});
        let issues = ElementManifest::from_value(raw).unwrap_err();
        assert_eq!(issues.len(), 3, "{issues:?}");
        assert_eq!(issues[0], "manifest.json missing \"author\" field");
    }

    #[test]
    fn syntax_error_is_single_issue() {
        let issues = ElementManifest::parse("{ not json").unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Invalid manifest.json format"));
    }

    #[test]
    fn size_helpers() {
        assert!(Size::new(1920, 1080).is_within_bounds());
        assert!(!Size::new(0, 10).is_within_bounds());
        assert!(Size::new(200, 150).fits_within(&Size::new(400, 300)));
        assert_eq!(Size::from_value(&json!({"width": 10.5, "height": 3})), None);
        assert_eq!(Size::new(400, 300).to_string(), "400x300");
    }
}

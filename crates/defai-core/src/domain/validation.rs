//! Pure validation rules for element names, sizes, permissions and manifests.
//!
//! Nothing here touches the filesystem. The on-disk project check lives in
//! [`crate::application::ProjectValidator`], which reads files through the
//! `Filesystem` port and feeds their contents into these functions.
//!
//! Manifest checks operate on raw `serde_json::Value` so they can report
//! *every* problem in a document that would not deserialize into
//! [`ElementManifest`](super::ElementManifest) at all.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::entities::manifest::Size;
use super::value_objects::{Capability, Category, Tier};

/// Shortest accepted element name.
pub const NAME_MIN_LEN: usize = 3;
/// Longest accepted element name.
pub const NAME_MAX_LEN: usize = 50;

/// Manifest fields that must be present and non-empty.
pub const REQUIRED_MANIFEST_FIELDS: [&str; 10] = [
    "id",
    "name",
    "version",
    "description",
    "author",
    "category",
    "tierRequired",
    "defaultSize",
    "minSize",
    "maxSize",
];

const SIZE_FIELDS: [&str; 3] = ["minSize", "defaultSize", "maxSize"];

// ============================================================================
// ValidationResult
// ============================================================================

/// Outcome of a validation pass: an ordered list of human-readable errors.
///
/// Validity is derived from the list, so `is_valid()` can never disagree with
/// `errors()`. Serializes as `{"valid": bool, "errors": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn extend<I>(&mut self, errors: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.errors.extend(errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

#[derive(Serialize, Deserialize)]
struct ValidationResultRepr {
    valid: bool,
    #[serde(default)]
    errors: Vec<String>,
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ValidationResultRepr {
            valid: self.is_valid(),
            errors: self.errors.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidationResult {
    /// `valid` is recomputed from `errors`; a remote `{valid:false, errors:[]}`
    /// gets a generic error so the two can never disagree.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = ValidationResultRepr::deserialize(deserializer)?;
        let mut errors = repr.errors;
        if !repr.valid && errors.is_empty() {
            errors.push("Validation failed".to_string());
        }
        Ok(Self { errors })
    }
}

// ============================================================================
// Element names
// ============================================================================

/// Check an element slug.
///
/// Accepts lowercase ASCII letters, digits and hyphens; the first character
/// must be a letter, the last a letter or digit; length 3 to 50; no `--`.
pub fn validate_element_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&bytes.len()) {
        return false;
    }

    let allowed = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-';
    if !bytes.iter().all(allowed) {
        return false;
    }

    let first_ok = bytes.first().is_some_and(u8::is_ascii_lowercase);
    let last_ok = bytes
        .last()
        .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());

    first_ok && last_ok && !name.contains("--")
}

// ============================================================================
// Sizes and permissions
// ============================================================================

/// True iff `size` is an object whose `width` and `height` are positive
/// numbers no larger than 1920x1080.
pub fn validate_size(size: &Value) -> bool {
    let dimension = |key: &str, max: u32| {
        size.get(key)
            .and_then(Value::as_f64)
            .is_some_and(|v| v > 0.0 && v <= f64::from(max))
    };
    size.is_object() && dimension("width", Size::MAX_WIDTH) && dimension("height", Size::MAX_HEIGHT)
}

/// True iff `permissions` is an object whose keys all name a known
/// capability and whose values are all booleans. An empty map is valid.
pub fn validate_permissions(permissions: &Value) -> bool {
    permissions.as_object().is_some_and(|map| {
        map.iter()
            .all(|(key, value)| Capability::from_str(key).is_ok() && value.is_boolean())
    })
}

// ============================================================================
// Manifest field checks
// ============================================================================

/// Loose "is this field filled in" test: absent, `null`, `false`, `0` and
/// `""` all count as missing. Objects and arrays count as present.
pub fn is_populated(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Required manifest fields that are missing or empty, in declaration order.
pub fn missing_manifest_fields(manifest: &Value) -> Vec<&'static str> {
    REQUIRED_MANIFEST_FIELDS
        .into_iter()
        .filter(|field| !is_populated(manifest.get(*field)))
        .collect()
}

/// Checks beyond presence: enum values, size bounds and ordering,
/// permission shape, version format and price.
///
/// Fields that are absent are skipped; presence is reported separately by
/// [`missing_manifest_fields`].
pub fn manifest_semantic_issues(manifest: &Value) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(version) = manifest.get("version").and_then(Value::as_str) {
        if !version.is_empty() && !is_plain_semver(version) {
            issues.push(format!(
                "manifest.json \"version\" must be MAJOR.MINOR.PATCH (got \"{version}\")"
            ));
        }
    }

    if let Some(category) = manifest.get("category").and_then(Value::as_str) {
        if !category.is_empty() && !Category::ALL.iter().any(|c| c.as_str() == category) {
            issues.push(format!(
                "manifest.json \"category\" is not a known category: \"{category}\""
            ));
        }
    }

    if let Some(tier) = manifest.get("tierRequired").and_then(Value::as_str) {
        if !tier.is_empty() && !Tier::ALL.iter().any(|t| t.as_str() == tier) {
            issues.push(format!(
                "manifest.json \"tierRequired\" is not a known tier: \"{tier}\""
            ));
        }
    }

    if let Some(price) = manifest.get("price") {
        if !price.as_f64().is_some_and(|p| p >= 0.0 && p.is_finite()) {
            issues.push("manifest.json \"price\" must be a non-negative number".to_string());
        }
    }

    let mut sizes = Vec::with_capacity(SIZE_FIELDS.len());
    for field in SIZE_FIELDS {
        let Some(raw) = manifest.get(field).filter(|v| is_populated(Some(*v))) else {
            continue;
        };
        if validate_size(raw) {
            match Size::from_value(raw) {
                Some(size) => sizes.push((field, size)),
                None => issues.push(format!(
                    "manifest.json \"{field}\" width and height must be whole pixels"
                )),
            }
        } else {
            issues.push(format!(
                "manifest.json \"{field}\" must have a width and height between 1 and {}x{}",
                Size::MAX_WIDTH,
                Size::MAX_HEIGHT
            ));
        }
    }
    issues.extend(size_ordering_issues(&sizes));

    if let Some(permissions) = manifest.get("permissions") {
        if !validate_permissions(permissions) {
            issues.push(format!(
                "manifest.json \"permissions\" may only map {} to true or false",
                Capability::ALL.map(Capability::as_str).join(", ")
            ));
        }
    }

    issues
}

/// `minSize <= defaultSize <= maxSize`, per dimension, for whichever of the
/// three sizes parsed.
fn size_ordering_issues(sizes: &[(&str, Size)]) -> Vec<String> {
    let mut issues = Vec::new();
    for pair in sizes.windows(2) {
        let [(smaller_name, smaller), (larger_name, larger)] = pair else {
            continue;
        };
        if smaller.width > larger.width {
            issues.push(format!(
                "manifest.json \"{smaller_name}\" width ({}) exceeds \"{larger_name}\" width ({})",
                smaller.width, larger.width
            ));
        }
        if smaller.height > larger.height {
            issues.push(format!(
                "manifest.json \"{smaller_name}\" height ({}) exceeds \"{larger_name}\" height ({})",
                smaller.height, larger.height
            ));
        }
    }
    issues
}

/// `MAJOR.MINOR.PATCH` with digits only.
pub fn is_plain_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// True if `name` follows the `@scope/<slug>` package convention with a
/// valid element slug.
pub fn is_scoped_package_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('@') else {
        return false;
    };
    match rest.split_once('/') {
        Some((scope, slug)) => {
            !scope.is_empty()
                && scope
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
                && validate_element_name(slug)
        }
        None => false,
    }
}

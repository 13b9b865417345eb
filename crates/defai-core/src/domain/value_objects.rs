//! Value objects for the element domain.
//!
//! These are small, `Copy` enums with a fixed vocabulary. Each one has:
//!
//! - `ALL` listing every variant in display order
//! - `as_str` returning the exact on-disk spelling
//! - `Display` / `FromStr` round-tripping through that spelling
//!
//! The on-disk spellings are part of the marketplace contract and must not
//! change: `"AI Tools"` keeps its space, tiers stay lowercase.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

// ============================================================================
// Category
// ============================================================================

/// Marketplace category an element is listed under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    Trading,
    Analytics,
    #[serde(rename = "DEFAI")]
    Defai,
    Productivity,
    #[serde(rename = "AI Tools")]
    AiTools,
    Information,
    #[default]
    Utilities,
    Games,
    #[serde(rename = "Developer Tools")]
    DeveloperTools,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::Trading,
        Self::Analytics,
        Self::Defai,
        Self::Productivity,
        Self::AiTools,
        Self::Information,
        Self::Utilities,
        Self::Games,
        Self::DeveloperTools,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trading => "Trading",
            Self::Analytics => "Analytics",
            Self::Defai => "DEFAI",
            Self::Productivity => "Productivity",
            Self::AiTools => "AI Tools",
            Self::Information => "Information",
            Self::Utilities => "Utilities",
            Self::Games => "Games",
            Self::DeveloperTools => "Developer Tools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Matches the on-disk spelling, ignoring ASCII case. `developer-tools`
    /// and `ai-tools` are accepted as CLI-friendly aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', " ");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// Tier
// ============================================================================

/// Subscription tier a user must hold to install an element.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Bronze,
    Silver,
    Gold,
    Titanium,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Self::Free,
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Titanium,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Titanium => "titanium",
        }
    }

    /// Label shown in prompts, e.g. `Gold`.
    pub fn label(self) -> String {
        let s = self.as_str();
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
        out
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownTier(s.to_string()))
    }
}

// ============================================================================
// Capability
// ============================================================================

/// A host capability an element may request in its `permissions` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Wallet,
    Network,
    Storage,
    Notifications,
    Camera,
    Microphone,
    Location,
    Clipboard,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Self::Wallet,
        Self::Network,
        Self::Storage,
        Self::Notifications,
        Self::Camera,
        Self::Microphone,
        Self::Location,
        Self::Clipboard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Notifications => "notifications",
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::Location => "location",
            Self::Clipboard => "clipboard",
        }
    }

    /// One-line explanation shown when reviewing requested permissions.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Wallet => "read the connected wallet and request signatures",
            Self::Network => "make network requests",
            Self::Storage => "persist data in local storage",
            Self::Notifications => "show notifications",
            Self::Camera => "access the camera",
            Self::Microphone => "access the microphone",
            Self::Location => "read the device location",
            Self::Clipboard => "read and write the clipboard",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = DomainError;

    /// Exact match only: permission keys are case-sensitive on disk.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::UnknownCapability(s.to_string()))
    }
}

//! Content entities served to the portfolio page.
//!
//! Every entity is an immutable value produced by the document mapper: the
//! storage identity becomes `id` and every other field is carried through as
//! stored. Field names follow the stored documents (camelCase). Fields the
//! page does not read are kept in `extra` and serialized back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioSection {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyEntry {
    pub id: String,
    pub date: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechCategory {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub techs: Vec<Tech>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single skill inside a [`TechCategory`]; `level` is a 0-100 proficiency,
/// kept as whatever number was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tech {
    pub name: String,
    pub level: Number,
    pub icon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub items: Vec<AchievementItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementItem {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Stored either as text (`"2022"`, `"2021-2023"`) or as a bare number.
    pub year: Value,
    #[serde(default)]
    pub highlight: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    pub code_snippet: String,
    pub mockup_image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub icon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

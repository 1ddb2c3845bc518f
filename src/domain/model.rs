use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SCOPED_SYSTEMS: &str = "No Scoped Systems";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    #[serde(rename = "control_id", default)]
    pub id: String,
    #[serde(rename = "control_name", default)]
    pub name: String,
    #[serde(rename = "control_description", default)]
    pub description: Option<String>,
    #[serde(rename = "control_framework_id", default)]
    pub framework_id: Option<String>,
    #[serde(rename = "control_framework_category_id", default)]
    pub category_id: Option<String>,
    #[serde(rename = "control_requirement_ids", default)]
    pub requirement_ids: Vec<String>,
    #[serde(rename = "control_custom_fields", default)]
    pub custom_fields: HashMap<String, serde_json::Value>,
}

impl Control {
    /// Named custom field rendered as text, "N/A" when absent or null.
    pub fn custom_field(&self, name: &str) -> String {
        self.custom_fields
            .get(name)
            .map(render_value)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category_id")]
    pub id: String,
    #[serde(rename = "category_name")]
    pub name: String,
    #[serde(default)]
    pub framework_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(rename = "requirement_id")]
    pub id: String,
    #[serde(rename = "requirement_name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDefinition {
    pub id: String,
    #[serde(default)]
    pub field_metadata: FieldMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    #[serde(default)]
    pub values: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "tag_name")]
    pub name: String,
    #[serde(default)]
    pub tagged_entities: Vec<TaggedEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub entity_type: String,
    pub entity_id: String,
}

impl TaggedEntity {
    pub fn is_control(&self) -> bool {
        self.entity_type == "control"
    }
}

/// Per-control custom field slots read from the fields endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    /// Evidence text keyed by control id, "N/A" when the slot is empty.
    pub values: HashMap<String, String>,
    /// Scoped-system keys keyed by control id. Controls without keys are absent.
    pub scope_keys: HashMap<String, Vec<String>>,
}

/// Controls bucketed by category display name, each bucket sorted by control name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedControls {
    buckets: BTreeMap<String, Vec<Control>>,
}

impl GroupedControls {
    pub fn push(&mut self, category: &str, control: Control) {
        self.buckets
            .entry(category.to_string())
            .or_default()
            .push(control);
    }

    pub fn sort_buckets(&mut self) {
        for controls in self.buckets.values_mut() {
            // stable: equal names keep fetch order
            controls.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    pub fn get(&self, category: &str) -> Option<&[Control]> {
        self.buckets.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Control])> {
        self.buckets
            .iter()
            .map(|(name, controls)| (name.as_str(), controls.as_slice()))
    }

    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.buckets.values().flatten()
    }

    pub fn category_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn control_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlEnrichment {
    pub field_value: String,
    pub scoped_systems: String,
    pub tags: Vec<String>,
    pub requirements: String,
}

impl Default for ControlEnrichment {
    fn default() -> Self {
        Self {
            field_value: NOT_AVAILABLE.to_string(),
            scoped_systems: NO_SCOPED_SYSTEMS.to_string(),
            tags: Vec::new(),
            requirements: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Current state of a wiki page, read right before publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub id: String,
    pub title: String,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageUpdate {
    pub page_id: String,
    pub title: String,
    pub markup: String,
    pub current_version: u64,
}

impl PageUpdate {
    pub fn next_version(&self) -> u64 {
        self.current_version + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPage {
    pub id: String,
    pub title: String,
    pub version: u64,
    /// Set when the document was written locally instead of pushed.
    pub local_path: Option<String>,
}

pub(crate) fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => NOT_AVAILABLE.to_string(),
        other => other.to_string(),
    }
}

use crate::domain::model::{
    Category, Control, ControlEnrichment, CustomFieldDefinition, FieldValues, GroupedControls,
    NOT_AVAILABLE, NO_SCOPED_SYSTEMS, UNCATEGORIZED, UNKNOWN,
};
use std::collections::HashMap;

/// Buckets controls by category display name and sorts each bucket by control name.
pub fn group_by_category(
    controls: Vec<Control>,
    categories: &HashMap<String, Category>,
) -> GroupedControls {
    let mut grouped = GroupedControls::default();

    for control in controls {
        let category_name = control
            .category_id
            .as_ref()
            .and_then(|id| categories.get(id))
            .map(|category| category.name.as_str())
            .unwrap_or(UNCATEGORIZED)
            .to_string();
        grouped.push(&category_name, control);
    }

    grouped.sort_buckets();
    grouped
}

/// Requirement names per control id, joined with ", ".
pub fn resolve_requirements(
    grouped: &GroupedControls,
    requirements: &HashMap<String, String>,
) -> HashMap<String, String> {
    grouped
        .controls()
        .map(|control| {
            let names: Vec<&str> = control
                .requirement_ids
                .iter()
                .map(|id| requirements.get(id).map(String::as_str).unwrap_or(UNKNOWN))
                .collect();
            (control.id.clone(), names.join(", "))
        })
        .collect()
}

/// Scoped-system display names per control id, resolved through the designated
/// custom field definition.
pub fn resolve_scoped_systems(
    scope_keys: &HashMap<String, Vec<String>>,
    definitions: &[CustomFieldDefinition],
    definition_id: &str,
) -> HashMap<String, String> {
    let table = definitions
        .iter()
        .find(|definition| definition.id == definition_id)
        .map(|definition| &definition.field_metadata.values);

    if table.is_none() && !scope_keys.is_empty() {
        tracing::warn!(
            "⚠️ Custom field definition {} not found; scoped systems left unresolved",
            definition_id
        );
    }

    scope_keys
        .iter()
        .map(|(control_id, keys)| {
            let resolved = match table {
                Some(values) if !keys.is_empty() => keys
                    .iter()
                    .map(|key| values.get(key).map(String::as_str).unwrap_or(UNKNOWN))
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => NO_SCOPED_SYSTEMS.to_string(),
            };
            (control_id.clone(), resolved)
        })
        .collect()
}

/// Joins every per-control lookup into one record per grouped control.
pub fn enrich(
    grouped: &GroupedControls,
    field_values: &FieldValues,
    scoped_systems: &HashMap<String, String>,
    tags: &HashMap<String, Vec<String>>,
    requirements: &HashMap<String, String>,
) -> HashMap<String, ControlEnrichment> {
    grouped
        .controls()
        .map(|control| {
            let id = &control.id;
            let enrichment = ControlEnrichment {
                field_value: field_values
                    .values
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                scoped_systems: scoped_systems
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| NO_SCOPED_SYSTEMS.to_string()),
                tags: tags.get(id).cloned().unwrap_or_default(),
                requirements: requirements
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            };
            (id.clone(), enrichment)
        })
        .collect()
}

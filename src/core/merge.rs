use crate::domain::model::{ControlEnrichment, GroupedControls};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]+\}\}").expect("placeholder pattern is valid"));

const REQUIREMENT_SEPARATOR: &str = "<br>";

/// Category display name as it appears inside template tokens.
pub fn category_key(category: &str) -> String {
    category.replace(' ', "_")
}

pub fn placeholder(category_key: &str, field: &str, index: usize) -> String {
    format!("{{{{{}_{}_{}}}}}", category_key, field, index)
}

/// Substitutes every `{{<category>_<field>_<index>}}` token with the control at
/// that 1-based position of the category bucket. Missing tokens are no-ops.
pub fn merge_placeholders(
    template: &str,
    grouped: &GroupedControls,
    enrichment: &HashMap<String, ControlEnrichment>,
) -> String {
    let mut content = template.to_string();
    let fallback = ControlEnrichment::default();

    for (category, controls) in grouped.iter() {
        let key = category_key(category);

        for (position, control) in controls.iter().enumerate() {
            let index = position + 1;
            let extra = enrichment.get(&control.id).unwrap_or(&fallback);

            let requirements = extra
                .requirements
                .split(", ")
                .collect::<Vec<_>>()
                .join(REQUIREMENT_SEPARATOR);
            let scoped_systems = extra
                .scoped_systems
                .trim_matches(|c: char| c == '{' || c == '}');

            let replacements = [
                ("control_framework_category", category.to_string()),
                ("control_name", control.name.clone()),
                (
                    "control_description",
                    control.description.clone().unwrap_or_else(|| "N/A".to_string()),
                ),
                (
                    "control_custom_fields.Control implementation",
                    control.custom_field("Control implementation"),
                ),
                ("control_requirements", requirements),
                ("control_fields_value", extra.field_value.clone()),
                ("control_tags", extra.tags.join(", ")),
                ("control_scoped_systems", scoped_systems.to_string()),
            ];

            for (field, value) in replacements {
                content = content.replace(&placeholder(&key, field, index), &value);
            }
        }
    }

    content
}

/// Distinct `{{...}}` tokens still present in the document, in order of appearance.
pub fn find_unconsumed_placeholders(markup: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for found in PLACEHOLDER.find_iter(markup) {
        let token = found.as_str().to_string();
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

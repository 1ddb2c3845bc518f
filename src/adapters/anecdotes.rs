use crate::config::{FieldMapping, SourceEndpoints, SyncConfig};
use crate::domain::model::{
    render_value, BearerToken, Category, Control, CustomFieldDefinition, FieldValues,
    Requirement, Tag, NOT_AVAILABLE,
};
use crate::domain::ports::ControlSource;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

const API_KEY_HEADER: &str = "x-anecdotes-api-key";

/// Raw fields endpoint payload: control id -> field key -> slot object.
pub type RawFieldValues = HashMap<String, HashMap<String, serde_json::Value>>;

pub struct AnecdotesClient {
    client: Client,
    endpoints: SourceEndpoints,
    fields: FieldMapping,
    api_key: String,
}

impl AnecdotesClient {
    pub fn new(endpoints: SourceEndpoints, fields: FieldMapping, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            fields,
            api_key,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.source.clone(),
            config.fields.clone(),
            config.secrets.api_key.clone(),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &BearerToken) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!("API response status: {}", response.status());
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ControlSource for AnecdotesClient {
    async fn authenticate(&self) -> Result<BearerToken> {
        let response = self
            .client
            .get(&self.endpoints.auth_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "text/plain")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Auth { status });
        }

        let token = response.text().await?;
        Ok(BearerToken::new(token.trim()))
    }

    async fn fetch_controls(
        &self,
        framework_id: &str,
        token: &BearerToken,
    ) -> Result<Vec<Control>> {
        let all: Vec<Control> = self.get_json(&self.endpoints.controls_url, token).await?;
        let total = all.len();
        let controls: Vec<Control> = all
            .into_iter()
            .filter(|control| control.framework_id.as_deref() == Some(framework_id))
            .collect();

        tracing::debug!(
            "Kept {} of {} controls for framework {}",
            controls.len(),
            total,
            framework_id
        );
        Ok(controls)
    }

    async fn fetch_categories(&self, token: &BearerToken) -> Result<HashMap<String, Category>> {
        let categories: Vec<Category> =
            self.get_json(&self.endpoints.categories_url, token).await?;
        Ok(categories
            .into_iter()
            .map(|category| (category.id.clone(), category))
            .collect())
    }

    async fn fetch_field_values(&self, token: &BearerToken) -> Result<FieldValues> {
        let raw: RawFieldValues = self.get_json(&self.endpoints.fields_url, token).await?;
        Ok(parse_field_values(&raw, &self.fields))
    }

    async fn fetch_custom_field_definitions(
        &self,
        token: &BearerToken,
    ) -> Result<Vec<CustomFieldDefinition>> {
        self.get_json(&self.endpoints.custom_fields_url, token).await
    }

    async fn fetch_tags(&self, token: &BearerToken) -> Result<HashMap<String, Vec<String>>> {
        let tags: Vec<Tag> = self.get_json(&self.endpoints.tags_url, token).await?;
        Ok(tags_by_control(&tags))
    }

    async fn fetch_requirements(&self, token: &BearerToken) -> Result<HashMap<String, String>> {
        let requirements: Vec<Requirement> =
            self.get_json(&self.endpoints.requirements_url, token).await?;
        Ok(requirements
            .into_iter()
            .map(|requirement| (requirement.id, requirement.name))
            .collect())
    }
}

pub fn parse_field_values(raw: &RawFieldValues, mapping: &FieldMapping) -> FieldValues {
    let mut field_values = FieldValues::default();

    for (control_id, fields) in raw {
        let slot_value = |key: &str| fields.get(key).and_then(|slot| slot.get("value"));

        let evidence = slot_value(&mapping.evidence_field)
            .map(render_value)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        field_values.values.insert(control_id.clone(), evidence);

        let keys = slot_value(&mapping.scoped_systems_field)
            .map(scope_keys)
            .unwrap_or_default();
        if !keys.is_empty() {
            field_values.scope_keys.insert(control_id.clone(), keys);
        }
    }

    field_values
}

/// Accepts a JSON list of keys or a raw `{a,b}` string.
fn scope_keys(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().map(render_value).collect(),
        serde_json::Value::String(raw) => raw
            .trim()
            .trim_matches(|c: char| c == '{' || c == '}')
            .split(',')
            .map(|key| key.trim().trim_matches('"').to_string())
            .filter(|key| !key.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn tags_by_control(tags: &[Tag]) -> HashMap<String, Vec<String>> {
    let mut tag_map: HashMap<String, Vec<String>> = HashMap::new();
    for tag in tags {
        for entity in tag.tagged_entities.iter().filter(|e| e.is_control()) {
            tag_map
                .entry(entity.entity_id.clone())
                .or_default()
                .push(tag.name.clone());
        }
    }
    tag_map
}

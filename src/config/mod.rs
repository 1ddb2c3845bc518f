pub mod cli;
pub mod file;

use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use file::ConfigValues;
use std::fmt;
use std::path::Path;

pub const API_KEY_ENV: &str = "ANECDOTES_API_KEY";
pub const WIKI_TOKEN_ENV: &str = "DEV_API_TOKEN";

/// Field slot names used when `evidence_field` / `scoped_systems_field` are not set.
pub const DEFAULT_EVIDENCE_FIELD: &str = "evidence";
pub const DEFAULT_SCOPED_SYSTEMS_FIELD: &str = "scoped_systems";

/// Data-provider endpoints, one per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEndpoints {
    pub auth_url: String,
    pub controls_url: String,
    pub fields_url: String,
    pub custom_fields_url: String,
    pub tags_url: String,
    pub requirements_url: String,
    pub categories_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WikiSettings {
    pub base_url: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncTargets {
    pub framework_id: String,
    pub template_page_id: String,
    pub page_id: String,
}

/// Which custom field slots carry evidence text and scoped-system keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub evidence_field: String,
    pub scoped_systems_field: String,
    pub scoped_systems_definition_id: String,
}

#[derive(Clone, PartialEq)]
pub struct Secrets {
    pub api_key: String,
    pub wiki_token: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |var: &str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| SyncError::MissingSecret {
                    var: var.to_string(),
                })
        };

        Ok(Self {
            api_key: fetch(API_KEY_ENV)?,
            wiki_token: fetch(WIKI_TOKEN_ENV)?,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &"***")
            .field("wiki_token", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub source: SourceEndpoints,
    pub wiki: WikiSettings,
    pub targets: SyncTargets,
    pub fields: FieldMapping,
    pub secrets: Secrets,
}

impl SyncConfig {
    /// Reads the config file, then the secrets. Nothing touches the network.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let values = file::read_config_file(path)?;
        let secrets = Secrets::from_env()?;
        let config = Self::from_values(&values, secrets)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_values(values: &ConfigValues, secrets: Secrets) -> Result<Self> {
        let scoped_systems_field = optional_or(
            values,
            "scoped_systems_field",
            DEFAULT_SCOPED_SYSTEMS_FIELD,
        );
        let scoped_systems_definition_id = optional(values, "scoped_systems_definition_id")
            .unwrap_or_else(|| scoped_systems_field.clone());

        Ok(Self {
            source: SourceEndpoints {
                auth_url: required(values, "ANECDOTES_AUTH_URL")?,
                controls_url: required(values, "API_ENDPOINT")?,
                fields_url: required(values, "FIELDS_API_ENDPOINT")?,
                custom_fields_url: required(values, "CUSTOM_FIELDS_API_ENDPOINT")?,
                tags_url: required(values, "TAGS_API_ENDPOINT")?,
                requirements_url: required(values, "REQUIREMENTS_API_ENDPOINT")?,
                categories_url: required(values, "FRAMEWORK_CATEGORY_API_ENDPOINT")?,
            },
            wiki: WikiSettings {
                base_url: required(values, "CONFLUENCE_URL")?,
                username: required(values, "CONFLUENCE_USERNAME")?,
            },
            targets: SyncTargets {
                framework_id: required(values, "control_framework_id")?,
                template_page_id: required(values, "template_page_id")?,
                page_id: required(values, "page_id")?,
            },
            fields: FieldMapping {
                evidence_field: optional_or(values, "evidence_field", DEFAULT_EVIDENCE_FIELD),
                scoped_systems_field,
                scoped_systems_definition_id,
            },
            secrets,
        })
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        let source = &self.source;
        validate_url("ANECDOTES_AUTH_URL", &source.auth_url)?;
        validate_url("API_ENDPOINT", &source.controls_url)?;
        validate_url("FIELDS_API_ENDPOINT", &source.fields_url)?;
        validate_url("CUSTOM_FIELDS_API_ENDPOINT", &source.custom_fields_url)?;
        validate_url("TAGS_API_ENDPOINT", &source.tags_url)?;
        validate_url("REQUIREMENTS_API_ENDPOINT", &source.requirements_url)?;
        validate_url("FRAMEWORK_CATEGORY_API_ENDPOINT", &source.categories_url)?;
        validate_url("CONFLUENCE_URL", &self.wiki.base_url)?;

        validate_non_empty_string("control_framework_id", &self.targets.framework_id)?;
        validate_non_empty_string("template_page_id", &self.targets.template_page_id)?;
        validate_non_empty_string("page_id", &self.targets.page_id)?;
        Ok(())
    }
}

fn optional(values: &ConfigValues, key: &str) -> Option<String> {
    values
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn optional_or(values: &ConfigValues, key: &str, default: &str) -> String {
    optional(values, key).unwrap_or_else(|| {
        tracing::debug!("{} not set, using \"{}\"", key, default);
        default.to_string()
    })
}

fn required(values: &ConfigValues, key: &str) -> Result<String> {
    optional(values, key).ok_or_else(|| SyncError::MissingConfig {
        field: key.to_string(),
    })
}

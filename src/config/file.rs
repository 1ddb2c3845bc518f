use crate::utils::error::{Result, SyncError};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Flat key/value pairs read from a CSV or TOML configuration file.
pub type ConfigValues = HashMap<String, String>;

pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<ConfigValues> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SyncError::MissingConfigFile {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        parse_toml(&content)
    } else {
        parse_csv(&content)
    }
}

/// Every data row is merged left-to-right; later rows win for duplicate columns.
pub fn parse_csv(content: &str) -> Result<ConfigValues> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut values = ConfigValues::new();
    for record in reader.records() {
        let record = record?;
        for (key, value) in headers.iter().zip(record.iter()) {
            values.insert(key.trim().to_string(), value.to_string());
        }
    }

    tracing::debug!("Read {} configuration keys from CSV", values.len());
    Ok(values)
}

pub fn parse_toml(content: &str) -> Result<ConfigValues> {
    let processed = substitute_env_vars(content)?;
    let table: toml::Table = toml::from_str(&processed).map_err(|e| SyncError::ConfigParse {
        message: format!("TOML parsing error: {}", e),
    })?;

    let mut values = ConfigValues::new();
    for (key, value) in table {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => {
                return Err(SyncError::ConfigParse {
                    message: format!("Key {} must be a scalar, got {}", key, other.type_str()),
                })
            }
        };
        values.insert(key, text);
    }

    tracing::debug!("Read {} configuration keys from TOML", values.len());
    Ok(values)
}

/// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigParse {
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

use crate::utils::error::{Result, SyncError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: String) -> SyncError {
    SyncError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.to_string(),
        reason,
    }
}

/// Endpoint keys must hold absolute http(s) URLs.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(
            field_name,
            url_str,
            format!("config key {} needs an endpoint URL", field_name),
        ));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!(
                    "config key {} must use http or https, found {}",
                    field_name, scheme
                ),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("config key {} is not an absolute URL ({})", field_name, e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(
            field_name,
            path,
            format!("--{} needs a file system path", field_name.replace('_', "-")),
        ));
    }

    if path.contains('\0') {
        return Err(invalid(
            field_name,
            path,
            "path contains null bytes".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            format!("config key {} is blank", field_name),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("CONFLUENCE_URL", "https://wiki.example.com/rest/api").is_ok());
        assert!(validate_url("CONFLUENCE_URL", "http://localhost:8090").is_ok());
        assert!(validate_url("CONFLUENCE_URL", "").is_err());
        assert!(validate_url("CONFLUENCE_URL", "invalid-url").is_err());
        assert!(validate_url("CONFLUENCE_URL", "ftp://example.com").is_err());
    }

    #[test]
    fn test_errors_name_the_config_key() {
        let err = validate_url("TAGS_API_ENDPOINT", "ftp://grc.example.com").unwrap_err();
        assert!(err.to_string().contains("config key TAGS_API_ENDPOINT must use http or https"));

        let err = validate_path("output_path", "").unwrap_err();
        assert!(err.to_string().contains("--output-path"));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./output").is_ok());
        assert!(validate_path("output_path", "").is_err());
        assert!(validate_path("output_path", "out\0put").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("page_id", "12345").is_ok());
        assert!(validate_non_empty_string("page_id", "   ").is_err());
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed with status {status}")]
    Auth { status: reqwest::StatusCode },

    #[error("Configuration file not found: {path}")]
    MissingConfigFile { path: String },

    #[error("Missing required configuration value: {field}")]
    MissingConfig { field: String },

    #[error("Environment variable {var} is not set")]
    MissingSecret { var: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Template page {page_id} has no content")]
    Template { page_id: String },

    #[error("Unconsumed placeholders in merged document: {}", .tokens.join(", "))]
    UnconsumedPlaceholders { tokens: Vec<String> },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Template,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::MissingConfigFile { .. }
            | SyncError::MissingConfig { .. }
            | SyncError::MissingSecret { .. }
            | SyncError::InvalidConfigValue { .. }
            | SyncError::ConfigParse { .. }
            | SyncError::Csv(_) => ErrorCategory::Configuration,
            SyncError::Auth { .. } => ErrorCategory::Authentication,
            SyncError::Http(_) => ErrorCategory::Network,
            SyncError::Template { .. } | SyncError::UnconsumedPlaceholders { .. } => {
                ErrorCategory::Template
            }
            SyncError::Io(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SyncError::Template { .. } => ErrorSeverity::Low,
            SyncError::Http(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            SyncError::Http(_)
            | SyncError::Auth { .. }
            | SyncError::UnconsumedPlaceholders { .. } => ErrorSeverity::High,
            SyncError::MissingConfigFile { .. }
            | SyncError::MissingConfig { .. }
            | SyncError::MissingSecret { .. }
            | SyncError::InvalidConfigValue { .. }
            | SyncError::ConfigParse { .. }
            | SyncError::Csv(_)
            | SyncError::Io(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::MissingConfigFile { .. } => "Pass an existing CSV or TOML file with --config",
            SyncError::MissingConfig { .. } | SyncError::InvalidConfigValue { .. } => {
                "Check the keys and values in the configuration file"
            }
            SyncError::MissingSecret { .. } => {
                "Export ANECDOTES_API_KEY and DEV_API_TOKEN before running"
            }
            SyncError::ConfigParse { .. } | SyncError::Csv(_) => {
                "Make sure the configuration file is well-formed"
            }
            SyncError::Auth { .. } => "Verify that the Anecdotes API key is valid and not expired",
            SyncError::Http(e) if e.status().map(|s| s.as_u16()) == Some(409) => {
                "The page was edited concurrently; rerun to pick up the latest version"
            }
            SyncError::Http(_) => "Check connectivity and the configured endpoint URLs",
            SyncError::Template { .. } => "Add content to the template page or fix template_page_id",
            SyncError::UnconsumedPlaceholders { .. } => {
                "Fix the template tokens or run without --strict-placeholders"
            }
            SyncError::Io(_) => "Check file permissions and the output path",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Authentication => format!("Could not authenticate: {}", self),
            ErrorCategory::Network => format!("Remote call failed: {}", self),
            ErrorCategory::Template => format!("Template problem: {}", self),
            ErrorCategory::Io => format!("File system error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

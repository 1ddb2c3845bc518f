use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "anecdotes-confluence-sync")]
#[command(about = "Publish Anecdotes control data into a Confluence page template")]
pub struct CliArgs {
    #[arg(
        long,
        default_value = "config.csv",
        help = "CSV or TOML configuration file",
        long_help = "CSV or TOML configuration file. Optional keys: evidence_field (default \"evidence\"), scoped_systems_field (default \"scoped_systems\") and scoped_systems_definition_id (default: scoped_systems_field)"
    )]
    pub config: String,

    #[arg(long, help = "Write the rendered page locally instead of publishing it")]
    pub dry_run: bool,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Fail when template tokens are left unreplaced")]
    pub strict_placeholders: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_path("config", &self.config)?;
        if self.dry_run {
            crate::utils::validation::validate_path("output_path", &self.output_path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path.display().to_string())
    }
}

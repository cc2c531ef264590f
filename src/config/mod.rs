pub mod toml_config;

pub use toml_config::{AdminConfig, ApiSettings, TableSettings};

#[cfg(feature = "cli")]
use crate::app::render::OutputFormat;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Command line. Flags override the TOML file given with `--config`.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "warehouse-admin")]
#[command(about = "Command-line client for the warehouse admin API")]
pub struct CliConfig {
    #[arg(long, short, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, env = "API_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List problems one server page at a time
    Problems {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        has_checker: Option<bool>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List the resources that can be searched, created and updated
    Resources,

    /// Search a resource by name, as the select boxes do
    Search {
        resource: String,
        #[arg(default_value = "")]
        term: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show one record
    Show {
        resource: String,
        id: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Create a record from field=value pairs
    Create {
        resource: String,
        #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
        set: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Load a record, apply field=value pairs and save it
    Update {
        resource: String,
        id: i64,
        #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
        set: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Layer the flags over the config file (or the defaults) and validate.
    pub fn resolve(&self) -> Result<AdminConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("📋 Loading configuration from {}", path.display());
                AdminConfig::from_file(path)?
            }
            None => AdminConfig::default(),
        };

        if let Some(base_url) = &self.api_base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            config.api.token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_create_with_assignments() {
        let cli = CliConfig::try_parse_from([
            "warehouse-admin",
            "create",
            "brand",
            "--set",
            "name=Nike",
            "-s",
            "status=true",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Create { resource, set, format } => {
                assert_eq!(resource, "brand");
                assert_eq!(set, vec!["name=Nike", "status=true"]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://from-file.example.com/api"
timeout_seconds = 5

[table]
page_size_options = [20, 50]
default_page_size = 50
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = CliConfig::try_parse_from([
            "warehouse-admin",
            "--config",
            &path,
            "--api-base-url",
            "https://from-flag.example.com/api",
            "resources",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.api.base_url, "https://from-flag.example.com/api");
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.table.default_page_size, 50);
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let cli = CliConfig::try_parse_from([
            "warehouse-admin",
            "--api-base-url",
            "http://localhost:8000/api",
            "--timeout",
            "0",
            "resources",
        ])
        .unwrap();
        assert!(cli.resolve().is_err());
    }
}

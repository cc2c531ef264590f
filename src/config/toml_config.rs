use crate::domain::model::DEFAULT_PAGE_SIZE;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub table: TableSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            token: None,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size_options: default_page_size_options(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_page_size_options() -> Vec<u32> {
    vec![DEFAULT_PAGE_SIZE]
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

impl AdminConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdminError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, expanding `${VAR}` first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unknown variables are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for AdminConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_range(
            "api.timeout_seconds",
            self.api.timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        if let Some(token) = &self.api.token {
            validation::validate_non_empty_string("api.token", token)?;
            if env_var_pattern().is_match(token) {
                return Err(AdminError::ConfigValidationError {
                    field: "api.token".to_string(),
                    message: format!("Unresolved environment variable in '{}'", token),
                });
            }
        }

        validation::validate_page_size_options(
            "table.page_size_options",
            &self.table.page_size_options,
        )?;

        if !self
            .table
            .page_size_options
            .contains(&self.table.default_page_size)
        {
            return Err(AdminError::InvalidConfigValueError {
                field: "table.default_page_size".to_string(),
                value: self.table.default_page_size.to_string(),
                reason: format!(
                    "Must be one of table.page_size_options {:?}",
                    self.table.page_size_options
                ),
            });
        }

        Ok(())
    }
}

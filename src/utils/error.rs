use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status} for {method} {path}")]
    ApiStatusError {
        method: String,
        path: String,
        status: u16,
        errors: ServerErrors,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Pagination error: {message}")]
    PaginationError { message: String },

    #[error("Unknown resource '{name}'")]
    UnknownResourceError { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Data,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AdminError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::HttpError(_) => ErrorCategory::Network,
            AdminError::ApiStatusError { .. } => ErrorCategory::Server,
            AdminError::IoError(_)
            | AdminError::SerializationError(_)
            | AdminError::CsvError(_) => ErrorCategory::Data,
            AdminError::InvalidConfigValueError { .. }
            | AdminError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AdminError::ValidationError { .. }
            | AdminError::PaginationError { .. }
            | AdminError::UnknownResourceError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdminError::HttpError(_) => ErrorSeverity::Medium,
            AdminError::ApiStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            AdminError::ApiStatusError { .. }
            | AdminError::ValidationError { .. }
            | AdminError::PaginationError { .. }
            | AdminError::UnknownResourceError { .. }
            | AdminError::SerializationError(_)
            | AdminError::CsvError(_) => ErrorSeverity::High,
            AdminError::IoError(_)
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::ConfigValidationError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AdminError::HttpError(e) if e.is_timeout() => {
                "Increase api.timeout_seconds or check the server load".to_string()
            }
            AdminError::HttpError(_) => {
                "Check that API_BASE_URL points at a reachable server".to_string()
            }
            AdminError::ApiStatusError { status: 401 | 403, .. } => {
                "Provide a valid token with --token or api.token".to_string()
            }
            AdminError::ApiStatusError { status: 404, .. } => {
                "Verify the resource id exists".to_string()
            }
            AdminError::ApiStatusError { status, .. } if *status >= 500 => {
                "The server failed; try again later".to_string()
            }
            AdminError::ApiStatusError { .. } => "Fix the rejected fields and resubmit".to_string(),
            AdminError::IoError(_) => "Check file paths and permissions".to_string(),
            AdminError::SerializationError(_) => {
                "The server answered with an unexpected payload shape".to_string()
            }
            AdminError::CsvError(_) => "Try --format table or --format json".to_string(),
            AdminError::InvalidConfigValueError { field, .. }
            | AdminError::ConfigValidationError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            AdminError::ValidationError { .. } => "Fill in the flagged fields".to_string(),
            AdminError::PaginationError { .. } => {
                "Use one of the configured page sizes and a page >= 1".to_string()
            }
            AdminError::UnknownResourceError { .. } => {
                "Run `warehouse-admin resources` to list known resources".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::HttpError(_) => "Could not reach the admin API".to_string(),
            AdminError::ApiStatusError { status, errors, .. } => match errors.first_message() {
                Some(message) => format!("Server rejected the request ({}): {}", status, message),
                None => format!("Server rejected the request ({})", status),
            },
            other => other.to_string(),
        }
    }

    /// Field errors reported by the server, if this is a rejected request.
    pub fn server_errors(&self) -> Option<&ServerErrors> {
        match self {
            AdminError::ApiStatusError { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Errors from a DRF-style error body: `{"field": ["msg", ...], "detail": "msg"}`.
///
/// Order follows the body (serde_json is built with `preserve_order`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerErrors {
    fields: Vec<(String, String)>,
}

impl ServerErrors {
    pub fn from_body(body: &serde_json::Value) -> Self {
        let mut fields = Vec::new();
        match body {
            serde_json::Value::Object(map) => {
                for (field, value) in map {
                    if let Some(message) = first_text(value) {
                        fields.push((field.clone(), message));
                    }
                }
            }
            serde_json::Value::String(s) if !s.is_empty() => {
                fields.push(("detail".to_string(), s.clone()));
            }
            serde_json::Value::Array(_) => {
                if let Some(message) = first_text(body) {
                    fields.push(("non_field_errors".to_string(), message));
                }
            }
            _ => {}
        }
        Self { fields }
    }

    pub fn first_message(&self) -> Option<&str> {
        self.fields.first().map(|(_, message)| message.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_errors_keep_body_order() {
        let errors = ServerErrors::from_body(&json!({
            "company_name": ["This field may not be blank."],
            "stir": ["A valid integer is required.", "second"],
        }));

        assert_eq!(errors.first_message(), Some("This field may not be blank."));
        assert_eq!(errors.get("stir"), Some("A valid integer is required."));
        assert_eq!(errors.iter().count(), 2);
    }

    #[test]
    fn test_server_errors_detail_and_plain_text() {
        let detail = ServerErrors::from_body(&json!({"detail": "Not found."}));
        assert_eq!(detail.get("detail"), Some("Not found."));

        let plain = ServerErrors::from_body(&json!("Bad gateway"));
        assert_eq!(plain.first_message(), Some("Bad gateway"));

        let list = ServerErrors::from_body(&json!(["duplicate"]));
        assert_eq!(list.get("non_field_errors"), Some("duplicate"));

        assert!(ServerErrors::from_body(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_severity_and_category() {
        let err = AdminError::ApiStatusError {
            method: "POST".to_string(),
            path: "/brands/".to_string(),
            status: 400,
            errors: ServerErrors::from_body(&json!({"name": ["required"]})),
        };
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Server rejected the request (400): required"
        );

        let err = AdminError::PaginationError {
            message: "page 0".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.category(), ErrorCategory::Input);
    }
}

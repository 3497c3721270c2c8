use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("No .csproj files found under {0}. Are you sure this is an Umbraco project?")]
    NoProjectFiles(String),

    #[error("Could not detect Umbraco version in {0}. This may not be an Umbraco project.")]
    UnknownFrameworkVersion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Registry error ({url}): {message}")]
    Registry { url: String, message: String },

    #[error("Rule error ({rule_id}): {message}")]
    Rule { rule_id: String, message: String },

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl AuditError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}

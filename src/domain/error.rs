//! Domain error types.

/// Top-level error type for the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("query references unbound parameter :{name}")]
    UnboundParameter { name: String },

    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("{reason}")]
    Rejected { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        let code: u8 = match err {
            DashboardError::Io(_) | DashboardError::Csv(_) => 1,
            DashboardError::ConfigParse { .. }
            | DashboardError::ConfigMissing { .. }
            | DashboardError::ConfigInvalid { .. } => 2,
            DashboardError::Database { .. } | DashboardError::DatabaseQuery { .. } => 3,
            DashboardError::InvalidInput { .. }
            | DashboardError::UnboundParameter { .. }
            | DashboardError::Rejected { .. } => 4,
            DashboardError::TableNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

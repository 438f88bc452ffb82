use crate::error::LaunchbarError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A non-fatal problem surfaced to presentation surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub suggestions: Vec<String>,
}

impl Warning {
    pub fn from_error(err: &LaunchbarError) -> Self {
        let message = err.to_string();
        let severity = match err {
            LaunchbarError::MalformedState(_) => Severity::Info,
            LaunchbarError::Persistence { .. } => Severity::Warning,
            _ => Severity::Error,
        };
        Self {
            suggestions: super::recovery::get_suggestions(&message),
            message,
            timestamp: Local::now(),
            severity,
        }
    }
}

//! Error context for enriched error information.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging.
///
/// Carries the operation that failed together with the identifiers that tie
/// it back to a connect cycle or an authorization attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Authorization attempt the error belongs to, if any.
    pub attempt: Option<u64>,

    /// Connect cycle the error belongs to, if any.
    pub cycle: Option<u64>,

    /// Optional component/module where the error originated.
    pub component: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            timestamp: Utc::now(),
            attempt: None,
            cycle: None,
            component: None,
        }
    }

    pub fn with_attempt(mut self, attempt: u64) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }
        if let Some(attempt) = self.attempt {
            parts.push(format!("attempt={}", attempt));
        }
        if let Some(cycle) = self.cycle {
            parts.push(format!("cycle={}", cycle));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(attempt) = self.attempt {
            write!(f, " attempt={}", attempt)?;
        }
        if let Some(cycle) = self.cycle {
            write!(f, " cycle={}", cycle)?;
        }

        Ok(())
    }
}

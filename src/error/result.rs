//! Result type alias for musiclink operations.

use super::context::ErrorContext;
use super::link_error::LinkError;

/// Type alias for Results using LinkError.
pub type LinkResult<T> = Result<T, LinkError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use musiclink::error::{ErrorContext, ResultExt};
    ///
    /// let config = ClientConfig::load_from(&path)
    ///     .context(ErrorContext::new("load_config"))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> LinkResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> LinkResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<LinkError>,
{
    fn context(self, ctx: ErrorContext) -> LinkResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> LinkResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

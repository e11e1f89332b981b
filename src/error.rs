use thiserror::Error;

/// Errors that can occur while building, expanding or rendering a surface
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfError {
    /// A named parameter had no binding when a number was required
    #[error("unbound parameter '{name}'")]
    UnboundParameter { name: String },

    /// Negative power exponent, polynomial divisor or a function of x, y, z
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// Source text could not be parsed
    #[error("parse error at position {}: {msg}", position + 1)]
    Parse { msg: String, position: usize },

    /// The draw call observed a stop request
    #[error("rendering was cancelled")]
    RenderCancelled,

    #[error("output buffer holds {actual} bytes, {expected} required")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("worker pool could not be created: {0}")]
    ThreadPool(String),
}

impl SurfError {
    pub fn unbound(name: impl Into<String>) -> Self {
        SurfError::UnboundParameter { name: name.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        SurfError::MalformedExpression(msg.into())
    }

    pub fn parse(msg: impl Into<String>, position: usize) -> Self {
        SurfError::Parse {
            msg: msg.into(),
            position,
        }
    }

    /// Cancellation is an expected outcome, not a failure worth reporting
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SurfError::RenderCancelled)
    }
}

impl From<rayon::ThreadPoolBuildError> for SurfError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        SurfError::ThreadPool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SurfError::unbound("a").to_string(),
            "unbound parameter 'a'"
        );
        assert_eq!(
            SurfError::parse("unexpected ')'", 3).to_string(),
            "parse error at position 4: unexpected ')'"
        );
        assert!(SurfError::RenderCancelled.is_cancelled());
        assert!(!SurfError::malformed("x").is_cancelled());
    }
}

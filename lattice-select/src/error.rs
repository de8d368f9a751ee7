//! Error types.
//!
//! Only source resolution can fail with an error value. A panicking selector
//! is a bug in the caller's code and unwinds straight through to whoever
//! asked for the snapshot.

use crate::context::ContextId;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while resolving a context to its source handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No provider is in scope and the context's default source has been
    /// released.
    #[error(
        "context {context} has no source handle \
         (no provider in scope and the default was released)"
    )]
    MissingSource {
        /// The context that failed to resolve.
        context: ContextId,
    },
}

impl Error {
    /// The context this error is about.
    pub fn context(&self) -> ContextId {
        match self {
            Error::MissingSource { context } => *context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_names_the_context() {
        let err = Error::MissingSource {
            context: ContextId::from(7),
        };
        assert!(err.to_string().contains("context #7"));
        assert_eq!(err.context(), ContextId::from(7));
    }
}

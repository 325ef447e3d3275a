//! Errors that may occur when saving, loading or dispatching actions

use derive_more::{Display, Error};

/// The error type returned by action handlers.
///
/// A handler that fails is logged and skipped; it never aborts dispatch to other handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Bindings could not be saved to, or loaded from, a [`BindingStore`](crate::persistence::BindingStore).
///
/// In almost all cases, the correct way to handle this error is to keep the current bindings.
#[derive(Debug, Display, Error)]
pub enum PersistenceError {
    /// Nothing has been stored under the key
    #[display(fmt = "no bindings are stored under `{}`", key)]
    Missing {
        /// The key that was looked up
        key: String,
    },
    /// The storage medium failed
    #[display(fmt = "binding storage failed: {}", _0)]
    Io(std::io::Error),
    /// The bindings could not be turned into JSON
    #[display(fmt = "failed to serialize bindings: {}", _0)]
    Serialize(serde_json::Error),
    /// The stored data is not a valid list of bindings
    #[display(fmt = "failed to parse stored bindings: {}", _0)]
    Deserialize(serde_json::Error),
}

impl From<std::io::Error> for PersistenceError {
    fn from(error: std::io::Error) -> Self {
        PersistenceError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn missing_key_has_no_source() {
        let error = PersistenceError::Missing {
            key: "input-bindings".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "no bindings are stored under `input-bindings`"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn parse_errors_keep_their_source() {
        let parse_error = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let error = PersistenceError::Deserialize(parse_error);
        assert!(error.source().is_some());
        assert!(error.to_string().starts_with("failed to parse stored bindings"));
    }
}

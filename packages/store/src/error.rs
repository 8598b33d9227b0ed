use std::collections::BTreeMap;

use thiserror::Error;

/// Failure reported by a [`crate::UserStore`].
///
/// The `Display` string is what the UI shows; for a store response it is the
/// store's own message, unchanged.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
    /// The store answered with an error status.
    #[error("{message}")]
    Response {
        status: u16,
        message: String,
        /// Per-field validation messages keyed by field name.
        fields: BTreeMap<String, String>,
    },
    /// The response body could not be decoded.
    #[error("unexpected response from store: {0}")]
    Decode(String),
}

impl StoreError {
    /// A response error without field details.
    pub fn response(status: u16, message: impl Into<String>) -> Self {
        StoreError::Response {
            status,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Field validation messages, empty for transport and decode failures.
    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        let fields = match self {
            StoreError::Response { fields, .. } => Some(fields),
            _ => None,
        };
        fields
            .into_iter()
            .flat_map(|f| f.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

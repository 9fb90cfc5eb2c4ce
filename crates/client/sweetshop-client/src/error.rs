//! Error types for the Sweet Shop client

use thiserror::Error;

/// Errors surfaced by the session manager and the catalog façade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Login or registration rejected
    #[error("{0}")]
    Auth(String),

    /// Listing or fetching items failed
    #[error("{0}")]
    Fetch(String),

    /// Create, update, delete, purchase or restock rejected
    #[error("{0}")]
    Mutation(String),

    /// Malformed bearer token; only ever logged
    #[error("Token decode error: {0}")]
    Decode(String),

    /// Purchase of an item with nothing left in stock
    #[error("Sweet {id} is out of stock")]
    OutOfStock { id: i64 },

    /// Purchase or restock with a zero quantity
    #[error("Quantity must be greater than 0")]
    InvalidQuantity,

    /// Another action is still waiting for its reconciliation
    #[error("Another action is still in progress")]
    ActionPending,

    /// Durable session storage failed
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn mutation<S: Into<String>>(msg: S) -> Self {
        Self::Mutation(msg.into())
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        let err = ClientError::auth("Incorrect username or password");
        assert_eq!(err.to_string(), "Incorrect username or password");

        let err = ClientError::OutOfStock { id: 4 };
        assert_eq!(err.to_string(), "Sweet 4 is out of stock");
    }

    #[test]
    fn test_local_guard_messages() {
        assert_eq!(
            ClientError::InvalidQuantity.to_string(),
            "Quantity must be greater than 0"
        );
        assert_eq!(
            ClientError::ActionPending.to_string(),
            "Another action is still in progress"
        );
    }
}

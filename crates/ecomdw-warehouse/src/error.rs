//! Warehouse backend error types.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by [`Warehouse`](crate::Warehouse) and
/// [`Connect`](crate::Connect) implementations.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Underlying driver failure (`postgres`, `rusqlite`, ...).
    #[error("{0}")]
    Backend(#[source] BoxError),

    /// Driver failure with the operation that was running.
    #[error("{context}: {source}")]
    BackendContext {
        context: String,
        #[source]
        source: BoxError,
    },

    /// File-system I/O failure (e.g. creating the `SQLite` directory).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection settings could not be resolved.
    #[error("invalid warehouse configuration: {0}")]
    Config(String),

    /// The handle was used after `close()`.
    #[error("warehouse connection is closed")]
    Closed,

    /// A second connection was requested while one is still open.
    #[error("a warehouse connection is already open for this run")]
    AlreadyOpen,
}

impl WarehouseError {
    /// Wrap any driver error.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }

    /// Wrap a driver error together with the operation that produced it.
    pub fn backend_context(context: impl Into<String>, err: impl Into<BoxError>) -> Self {
        Self::BackendContext {
            context: context.into(),
            source: err.into(),
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, WarehouseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_driver_message() {
        let err = WarehouseError::backend("duplicate key value violates unique constraint");
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn backend_context_prefixes_operation() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = WarehouseError::backend_context("connect to localhost:5432/ecommerce_dw", inner);
        let msg = err.to_string();
        assert!(msg.starts_with("connect to localhost:5432"), "got: {msg}");
        assert!(msg.ends_with("refused"), "got: {msg}");
    }

    #[test]
    fn closed_displays() {
        assert_eq!(
            WarehouseError::Closed.to_string(),
            "warehouse connection is closed"
        );
    }
}

//! Connection manager: owns the single warehouse handle of a pipeline run.

use ecomdw_warehouse::{Connect, Warehouse, WarehouseConfig, WarehouseError};

/// Opens at most one warehouse handle at a time and guarantees it is
/// closed, either explicitly through [`ConnectionManager::disconnect`] or
/// on drop.
pub struct ConnectionManager<C: Connect> {
    connector: C,
    handle: Option<C::Handle>,
}

impl<C: Connect> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            handle: None,
        }
    }

    /// Open the handle and set its schema context. No retry.
    ///
    /// # Errors
    ///
    /// [`WarehouseError::AlreadyOpen`] if a handle is already held, or the
    /// connector's error if the network, authentication or schema setup
    /// fails.
    pub fn connect(&mut self, config: &WarehouseConfig) -> Result<(), WarehouseError> {
        if self.handle.is_some() {
            return Err(WarehouseError::AlreadyOpen);
        }
        tracing::info!(warehouse = %config.target(), "Connecting to database");
        match self.connector.open(config) {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Database connection established");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Borrow the open handle.
    ///
    /// # Errors
    ///
    /// [`WarehouseError::Closed`] when not connected.
    pub fn handle(&mut self) -> Result<&mut dyn Warehouse, WarehouseError> {
        match self.handle.as_mut() {
            Some(handle) => Ok(handle),
            None => Err(WarehouseError::Closed),
        }
    }

    /// Release the handle if one is held. Safe to call repeatedly; close
    /// errors are logged, not returned.
    pub fn disconnect(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if handle.in_transaction() {
                if let Err(e) = handle.rollback() {
                    tracing::warn!(error = %e, "Rollback of open transaction on disconnect failed");
                }
            }
            if let Err(e) = handle.close() {
                tracing::warn!(error = %e, "Error closing database connection");
            }
            tracing::info!("Database connection closed");
        }
    }
}

impl<C: Connect> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

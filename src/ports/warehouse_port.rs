//! Warehouse query port.

use crate::domain::error::DashboardError;
use crate::domain::query::QueryParams;
use crate::domain::table::ResultTable;

/// Runs read-only SQL against the trade warehouse.
///
/// Implementations block the calling thread for the whole round trip.
pub trait WarehousePort {
    fn query(&self, sql: &str, params: &QueryParams) -> Result<ResultTable, DashboardError>;
}

impl<P: WarehousePort + ?Sized> WarehousePort for &P {
    fn query(&self, sql: &str, params: &QueryParams) -> Result<ResultTable, DashboardError> {
        (**self).query(sql, params)
    }
}

impl<P: WarehousePort + ?Sized> WarehousePort for std::sync::Arc<P> {
    fn query(&self, sql: &str, params: &QueryParams) -> Result<ResultTable, DashboardError> {
        (**self).query(sql, params)
    }
}

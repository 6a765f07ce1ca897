//! Estate Reporting API
//!
//! Read-only reporting over per-estate transaction processing read models:
//! reference data, today-versus-comparison sales and settlement aggregates,
//! unsettled fees, rankings and transaction search.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

pub use modules::dimensions::DimensionService;
pub use modules::facts::FactService;
pub use modules::search::TransactionSearchService;
pub use modules::tenancy::{MySqlStoreResolver, StoreResolver};

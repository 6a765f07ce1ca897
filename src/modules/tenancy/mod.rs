//! Per-estate read model resolution.
//!
//! Every estate owns its own read model database. A request resolves one
//! handle, runs all of its queries on it, and releases it before returning.

mod read_model;
mod resolver;

pub use read_model::{MySqlReadModel, ReadModel};
pub use resolver::{acquire, MySqlStoreResolver, StoreResolver};

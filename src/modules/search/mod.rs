//! Ad-hoc search over one day of transactions.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use services::TransactionSearchService;

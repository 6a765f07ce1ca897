mod search_repository;

pub use search_repository::{TransactionSearch, TransactionSearchReader};

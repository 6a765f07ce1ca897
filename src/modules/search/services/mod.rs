mod search_service;

pub use search_service::TransactionSearchService;

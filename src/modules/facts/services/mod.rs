mod fact_service;

pub use fact_service::FactService;

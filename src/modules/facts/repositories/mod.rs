mod fact_repository;
pub(crate) mod queries;

pub use fact_repository::FactReader;

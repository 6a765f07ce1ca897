mod dimension_repository;

pub use dimension_repository::DimensionReader;

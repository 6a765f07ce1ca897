mod dimension_service;

pub use dimension_service::DimensionService;

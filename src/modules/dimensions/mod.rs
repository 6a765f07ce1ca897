//! Reference data: calendar, merchants, operators and response codes.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use services::DimensionService;

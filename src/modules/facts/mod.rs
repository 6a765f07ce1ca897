//! Sales, settlement and fee aggregates comparing today with a chosen date.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use services::FactService;

mod fact_controller;

pub use fact_controller::configure;

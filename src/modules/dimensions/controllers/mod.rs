mod dimension_controller;

pub use dimension_controller::configure;

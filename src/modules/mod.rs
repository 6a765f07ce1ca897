use actix_web::web;

pub mod dimensions;
pub mod facts;
pub mod health;
pub mod search;
pub mod tenancy;

/// Register every route. The search resource sits under the facts prefix and
/// must be registered before the facts scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure(cfg);
    search::configure(cfg);
    facts::configure(cfg);
    dimensions::configure(cfg);
}

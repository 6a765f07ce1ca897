use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estate_reporting::config::Config;
use estate_reporting::core::{Clock, SystemClock};
use estate_reporting::middleware::{json_config, path_config, query_config, RequestId};
use estate_reporting::modules;
use estate_reporting::{
    DimensionService, FactService, MySqlStoreResolver, StoreResolver, TransactionSearchService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(to_io_error)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("estate_reporting={},actix_web=info", config.app.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate().map_err(to_io_error)?;

    tracing::info!(env = %config.app.env, "Starting Estate Reporting API");
    if config.database.connection_template.is_none() {
        tracing::warn!("READ_MODEL_CONNECTION_TEMPLATE is not set; estate requests will fail");
    }

    let resolver: Arc<dyn StoreResolver> =
        Arc::new(MySqlStoreResolver::new(config.database.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let dimension_service = web::Data::new(Arc::new(DimensionService::new(
        resolver.clone(),
        clock.clone(),
    )));
    let fact_service = web::Data::new(Arc::new(FactService::new(resolver.clone(), clock.clone())));
    let search_service = web::Data::new(Arc::new(TransactionSearchService::new(
        resolver.clone(),
        clock.clone(),
    )));

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .app_data(dimension_service.clone())
            .app_data(fact_service.clone())
            .app_data(search_service.clone())
            .configure(modules::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!(address = %bind_address, workers = config.server.workers, "Server started");

    server.await
}

fn to_io_error(err: estate_reporting::core::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
}

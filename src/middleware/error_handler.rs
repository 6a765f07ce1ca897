use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web, Error, HttpRequest,
};

use crate::core::AppError;

/// Malformed JSON bodies become validation errors with the standard body
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    log_rejection(req, &err);
    AppError::validation(format!("Invalid request body: {}", err)).into()
}

/// Missing or unparsable query parameters become validation errors
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    log_rejection(req, &err);
    AppError::validation(format!("Invalid query string: {}", err)).into()
}

/// Path segments that fail to parse (e.g. a malformed estate id)
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> Error {
    log_rejection(req, &err);
    AppError::validation(format!("Invalid path: {}", err)).into()
}

fn log_rejection(req: &HttpRequest, err: &dyn std::fmt::Display) {
    tracing::warn!(
        method = %req.method(),
        path = %req.path(),
        error = %err,
        "Request rejected before reaching handler"
    );
}

/// Extractor configs wired to the handlers above
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}

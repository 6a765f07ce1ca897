use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::cancellation::request_token;
use crate::core::error::AppError;
use crate::modules::dimensions::models::ComparisonDate;
use crate::modules::dimensions::services::DimensionService;

#[derive(Debug, Deserialize)]
pub struct CalendarDatesQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

/// Last sale window. Both bounds or neither.
#[derive(Debug, Deserialize)]
pub struct MerchantsQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
}

/// GET /dimensions/calendar/years
pub async fn get_calendar_years(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let years = service.calendar_years(path.into_inner(), &token).await?;

    Ok(HttpResponse::Ok().json(years))
}

/// GET /dimensions/calendar/dates
pub async fn get_calendar_dates(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
    query: web::Query<CalendarDatesQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let dates = service
        .calendar_dates(path.into_inner(), query.year, &token)
        .await?;

    Ok(HttpResponse::Ok().json(dates))
}

/// GET /dimensions/calendar/comparisondates
///
/// Yesterday, last week and last month come first, then this year's dates
/// most recent first.
pub async fn get_comparison_dates(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let dates = service
        .calendar_comparison_dates(path.into_inner(), &token)
        .await?;

    let options = ComparisonDate::with_fixed_options(service.today(), &dates);
    Ok(HttpResponse::Ok().json(options))
}

/// GET /dimensions/merchants
pub async fn get_merchants(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
    query: web::Query<MerchantsQuery>,
) -> Result<HttpResponse, AppError> {
    let estate_id = path.into_inner();
    let (token, _guard) = request_token();

    let merchants = match (query.start_date, query.end_date) {
        (None, None) => service.merchants(estate_id, &token).await?,
        (Some(start), Some(end)) => {
            service
                .merchants_by_last_sale(estate_id, start, end, &token)
                .await?
        }
        _ => {
            return Err(AppError::validation(
                "start_date and end_date must be supplied together",
            ))
        }
    };

    Ok(HttpResponse::Ok().json(merchants))
}

/// GET /dimensions/merchants/kpis
pub async fn get_merchant_kpis(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let kpi = service.merchant_kpis(path.into_inner(), &token).await?;

    Ok(HttpResponse::Ok().json(kpi))
}

/// GET /dimensions/operators
pub async fn get_operators(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let operators = service.operators(path.into_inner(), &token).await?;

    Ok(HttpResponse::Ok().json(operators))
}

/// GET /dimensions/responsecodes
pub async fn get_response_codes(
    service: web::Data<Arc<DimensionService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let codes = service.response_codes(path.into_inner(), &token).await?;

    Ok(HttpResponse::Ok().json(codes))
}

/// Configure dimension routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/estates/{estate_id}/dimensions")
            .route("/calendar/years", web::get().to(get_calendar_years))
            .route("/calendar/dates", web::get().to(get_calendar_dates))
            .route("/calendar/comparisondates", web::get().to(get_comparison_dates))
            .route("/merchants", web::get().to(get_merchants))
            .route("/merchants/kpis", web::get().to(get_merchant_kpis))
            .route("/operators", web::get().to(get_operators))
            .route("/responsecodes", web::get().to(get_response_codes)),
    );
}

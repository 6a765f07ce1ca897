use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::cancellation::request_token;
use crate::core::error::AppError;
use crate::core::{DimensionFilter, ReportingIdFilter};
use crate::modules::facts::models::{Dimension, RankingDirection};
use crate::modules::facts::services::FactService;

/// Comparison date plus an optional merchant/operator pair (`0` means any)
#[derive(Debug, Deserialize)]
pub struct TodaysSalesQuery {
    pub comparison_date: NaiveDate,
    #[serde(default)]
    pub merchant_reporting_id: Option<i32>,
    #[serde(default)]
    pub operator_reporting_id: Option<i32>,
}

impl TodaysSalesQuery {
    fn filter(&self) -> DimensionFilter {
        DimensionFilter::merchant_and_operator(self.merchant_reporting_id, self.operator_reporting_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct FailedSalesQuery {
    pub comparison_date: NaiveDate,
    #[serde(default)]
    pub response_code: Option<String>,
}

/// `reporting_ids` is a comma separated list; absent or empty means all
#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub comparison_date: NaiveDate,
    #[serde(default)]
    pub reporting_ids: Option<String>,
}

impl PerformanceQuery {
    fn reporting_ids(&self) -> Result<Vec<i32>, AppError> {
        let filter = parse_ids(self.reporting_ids.as_deref())?;
        Ok(filter.ids().to_vec())
    }
}

#[derive(Debug, Deserialize)]
pub struct UnsettledFeesQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub merchant_ids: Option<String>,
    #[serde(default)]
    pub operator_ids: Option<String>,
    #[serde(default)]
    pub product_ids: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
}

impl UnsettledFeesQuery {
    fn filter(&self) -> Result<DimensionFilter, AppError> {
        Ok(DimensionFilter {
            merchants: parse_ids(self.merchant_ids.as_deref())?,
            operators: parse_ids(self.operator_ids.as_deref())?,
            products: parse_ids(self.product_ids.as_deref())?,
        })
    }

    fn group_by(&self) -> Result<Option<Dimension>, AppError> {
        self.group_by
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct TopBottomParams {
    pub direction: String,
    pub result_count: u32,
    pub dimension: String,
}

fn parse_ids(value: Option<&str>) -> Result<ReportingIdFilter, AppError> {
    match value {
        Some(value) => value.parse(),
        None => Ok(ReportingIdFilter::any()),
    }
}

/// GET /facts/sales/today
pub async fn get_todays_sales(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<TodaysSalesQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let summary = service
        .todays_sales(path.into_inner(), query.comparison_date, query.filter(), &token)
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /facts/sales/today/failed
pub async fn get_todays_failed_sales(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<FailedSalesQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let query = query.into_inner();
    let summary = service
        .todays_failed_sales(
            path.into_inner(),
            query.comparison_date,
            query.response_code.unwrap_or_default(),
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /facts/sales/today/countbyhour
pub async fn get_todays_sales_count_by_hour(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<TodaysSalesQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let hours = service
        .todays_sales_count_by_hour(path.into_inner(), query.comparison_date, query.filter(), &token)
        .await?;

    Ok(HttpResponse::Ok().json(hours))
}

/// GET /facts/sales/today/valuebyhour
pub async fn get_todays_sales_value_by_hour(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<TodaysSalesQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let hours = service
        .todays_sales_value_by_hour(path.into_inner(), query.comparison_date, query.filter(), &token)
        .await?;

    Ok(HttpResponse::Ok().json(hours))
}

/// GET /facts/performance/merchants
pub async fn get_merchant_performance(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<PerformanceQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let summary = service
        .merchant_performance(
            path.into_inner(),
            query.comparison_date,
            query.reporting_ids()?,
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /facts/performance/operators
pub async fn get_operator_performance(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<PerformanceQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let summary = service
        .operator_performance(
            path.into_inner(),
            query.comparison_date,
            query.reporting_ids()?,
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /facts/performance/products
pub async fn get_product_performance(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<PerformanceQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let summary = service
        .product_performance(
            path.into_inner(),
            query.comparison_date,
            query.reporting_ids()?,
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /facts/settlements/today
pub async fn get_todays_settlement(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<TodaysSalesQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let summary = service
        .todays_settlement(
            path.into_inner(),
            query.comparison_date,
            query.merchant_reporting_id,
            query.operator_reporting_id,
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /facts/settlements/last
pub async fn get_last_settlement(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (token, _guard) = request_token();
    let settlement = service.last_settlement(path.into_inner(), &token).await?;

    Ok(HttpResponse::Ok().json(settlement))
}

/// GET /facts/fees/unsettled
pub async fn get_unsettled_fees(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<UnsettledFeesQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.filter()?;
    let group_by = query.group_by()?;

    let (token, _guard) = request_token();
    let fees = service
        .unsettled_fees(
            path.into_inner(),
            query.start_date,
            query.end_date,
            filter,
            group_by,
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(fees))
}

/// GET /facts/sales/topbottom
pub async fn get_top_bottom(
    service: web::Data<Arc<FactService>>,
    path: web::Path<Uuid>,
    query: web::Query<TopBottomParams>,
) -> Result<HttpResponse, AppError> {
    let direction: RankingDirection = query.direction.parse()?;
    let dimension: Dimension = query.dimension.parse()?;

    let (token, _guard) = request_token();
    let rows = service
        .top_bottom(path.into_inner(), direction, query.result_count, dimension, &token)
        .await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Configure fact routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/estates/{estate_id}/facts")
            .route("/sales/today", web::get().to(get_todays_sales))
            .route("/sales/today/failed", web::get().to(get_todays_failed_sales))
            .route("/sales/today/countbyhour", web::get().to(get_todays_sales_count_by_hour))
            .route("/sales/today/valuebyhour", web::get().to(get_todays_sales_value_by_hour))
            .route("/sales/topbottom", web::get().to(get_top_bottom))
            .route("/performance/merchants", web::get().to(get_merchant_performance))
            .route("/performance/operators", web::get().to(get_operator_performance))
            .route("/performance/products", web::get().to(get_product_performance))
            .route("/settlements/today", web::get().to(get_todays_settlement))
            .route("/settlements/last", web::get().to(get_last_settlement))
            .route("/fees/unsettled", web::get().to(get_unsettled_fees)),
    );
}

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::cancellation::request_token;
use crate::core::error::AppError;
use crate::modules::search::models::{
    PagingRequest, SearchRequest, SortDirection, SortField, SortingRequest,
};
use crate::modules::search::services::TransactionSearchService;

/// Paging and sorting arrive on the query string, filters in the body
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_direction: Option<String>,
}

impl SearchParams {
    /// Paging applies only when a page size is given; the page defaults to 1
    fn paging(&self) -> Option<PagingRequest> {
        self.page_size
            .map(|page_size| PagingRequest::new(self.page.unwrap_or(1), page_size))
    }

    /// Sorting applies only when a field is given; direction defaults to ascending
    fn sorting(&self) -> Result<Option<SortingRequest>, AppError> {
        let Some(field) = self.sort_field.as_deref() else {
            return Ok(None);
        };

        let field: SortField = field.parse()?;
        let direction: SortDirection = match self.sort_direction.as_deref() {
            Some(direction) => direction.parse()?,
            None => SortDirection::Ascending,
        };

        Ok(Some(SortingRequest { field, direction }))
    }
}

/// POST /facts/transactions/search
pub async fn search_transactions(
    service: web::Data<Arc<TransactionSearchService>>,
    path: web::Path<Uuid>,
    params: web::Query<SearchParams>,
    request: web::Json<SearchRequest>,
) -> Result<HttpResponse, AppError> {
    let sorting = params.sorting()?;

    let (token, _guard) = request_token();
    let transactions = service
        .search(
            path.into_inner(),
            request.into_inner(),
            params.paging(),
            sorting,
            &token,
        )
        .await?;

    Ok(HttpResponse::Ok().json(transactions))
}

/// Configure search routes. Register before the facts scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/estates/{estate_id}/facts/transactions/search")
            .route(web::post().to(search_transactions)),
    );
}

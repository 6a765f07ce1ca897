use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::core::{cancellable, AppError, Clock, Result};
use crate::modules::facts::models::TransactionSource;
use crate::modules::search::models::{
    PagingRequest, SearchRequest, SortingRequest, TransactionResult, MAX_PAGE_SIZE,
};
use crate::modules::search::repositories::{TransactionSearch, TransactionSearchReader};
use crate::modules::tenancy::{acquire, StoreResolver};

/// Ad-hoc transaction search for one day
pub struct TransactionSearchService {
    resolver: Arc<dyn StoreResolver>,
    clock: Arc<dyn Clock>,
}

impl TransactionSearchService {
    pub fn new(resolver: Arc<dyn StoreResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    /// Search the transactions of `request.query_date`.
    ///
    /// Today's date reads the live transaction table; every other date reads
    /// history. Rows come back in store order unless `sorting` is given.
    pub async fn search(
        &self,
        estate_id: Uuid,
        request: SearchRequest,
        paging: Option<PagingRequest>,
        sorting: Option<SortingRequest>,
        token: &CancellationToken,
    ) -> Result<Vec<TransactionResult>> {
        let query_date = request
            .query_date
            .ok_or_else(|| AppError::validation("query_date is required"))?;

        if let Some(paging) = paging {
            if paging.page_size < 1 {
                return Err(AppError::validation("page_size must be at least 1"));
            }
            if paging.page_size > MAX_PAGE_SIZE {
                return Err(AppError::validation(format!(
                    "page_size must not exceed {}",
                    MAX_PAGE_SIZE
                )));
            }
            paging.skip()?;
        }

        if let Some(range) = request.value_range {
            if range.start_value > range.end_value {
                return Err(AppError::validation(
                    "value_range start_value must not exceed end_value",
                ));
            }
        }

        let search = TransactionSearch {
            source: TransactionSource::for_date(query_date, self.clock.today()),
            query_date,
            request,
            paging,
            sorting,
        };

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.search_transactions(&search)).await;
        store.release().await;

        let rows = result?;
        info!(
            %estate_id,
            %query_date,
            source = search.source.table(),
            rows = rows.len(),
            "Transaction search completed"
        );
        Ok(rows)
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::{cancellable, AppError, Clock, DimensionFilter, Result};
use crate::modules::facts::models::{
    Dimension, HourlySales, HourlySalesCount, HourlySalesValue, LastSettlement, RankingDirection,
    SaleOutcome, SalesQuery, SalesSummary, SettlementSummary, TopBottomData, TopBottomQuery,
    TransactionSource, UnsettledFee, UnsettledFeeQuery,
};
use crate::modules::facts::repositories::FactReader;
use crate::modules::tenancy::{acquire, ReadModel, StoreResolver};

/// Fact aggregation engine
///
/// Reconciles today's live transactions with the historical transaction
/// source for every "today vs comparison date" metric. "Today" only counts
/// the part of the day that has elapsed, and the comparison date is cut off
/// at the same time of day.
pub struct FactService {
    resolver: Arc<dyn StoreResolver>,
    clock: Arc<dyn Clock>,
}

impl FactService {
    pub fn new(resolver: Arc<dyn StoreResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    /// Today and comparison sales queries sharing outcome and filter
    fn sales_queries(
        &self,
        now: NaiveDateTime,
        comparison_date: NaiveDate,
        outcome: SaleOutcome,
        filter: DimensionFilter,
    ) -> (SalesQuery, SalesQuery) {
        let today = SalesQuery {
            date: now.date(),
            cutoff: now.time(),
            outcome,
            filter,
        };
        let comparison = SalesQuery {
            date: comparison_date,
            ..today.clone()
        };
        (today, comparison)
    }

    /// Authorised sales today against the comparison date
    pub async fn todays_sales(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        filter: DimensionFilter,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        let (today, comparison) =
            self.sales_queries(self.clock.now(), comparison_date, SaleOutcome::Authorised, filter);

        let summary = self.sales_summary(estate_id, &today, &comparison, token).await?;
        info!(
            %estate_id,
            %comparison_date,
            todays_count = summary.todays_sales_count,
            comparison_count = summary.comparison_sales_count,
            "Today's sales calculated"
        );
        Ok(summary)
    }

    /// Declined sales with a given response code, today against the comparison date
    pub async fn todays_failed_sales(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        response_code: String,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        if response_code.trim().is_empty() {
            return Err(AppError::validation("response_code is required"));
        }

        let outcome = SaleOutcome::Declined { response_code };
        let (today, comparison) =
            self.sales_queries(self.clock.now(), comparison_date, outcome, DimensionFilter::none());

        self.sales_summary(estate_id, &today, &comparison, token).await
    }

    pub async fn merchant_performance(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        merchant_reporting_ids: Vec<i32>,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        let filter = DimensionFilter::merchants(merchant_reporting_ids);
        self.todays_sales(estate_id, comparison_date, filter, token).await
    }

    pub async fn operator_performance(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        operator_reporting_ids: Vec<i32>,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        let filter = DimensionFilter::operators(operator_reporting_ids);
        self.todays_sales(estate_id, comparison_date, filter, token).await
    }

    pub async fn product_performance(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        product_reporting_ids: Vec<i32>,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        let filter = DimensionFilter::products(product_reporting_ids);
        self.todays_sales(estate_id, comparison_date, filter, token).await
    }

    async fn sales_summary(
        &self,
        estate_id: Uuid,
        today: &SalesQuery,
        comparison: &SalesQuery,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = Self::read_sales_totals(store.as_mut(), today, comparison, token).await;
        store.release().await;
        result
    }

    async fn read_sales_totals(
        store: &mut dyn ReadModel,
        today: &SalesQuery,
        comparison: &SalesQuery,
        token: &CancellationToken,
    ) -> Result<SalesSummary> {
        let todays_totals =
            cancellable(token, store.sales_totals(TransactionSource::Today, today)).await?;
        let comparison_totals =
            cancellable(token, store.sales_totals(TransactionSource::History, comparison)).await?;

        Ok(SalesSummary::assemble(todays_totals, comparison_totals))
    }

    /// Sales counts per hour.
    ///
    /// Hours with sales in only one of the two series are left out.
    pub async fn todays_sales_count_by_hour(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        filter: DimensionFilter,
        token: &CancellationToken,
    ) -> Result<Vec<HourlySalesCount>> {
        let joined = self
            .hourly_sales(estate_id, comparison_date, filter, token)
            .await?;

        Ok(joined
            .into_iter()
            .map(|(today, comparison)| HourlySalesCount {
                hour: today.hour,
                todays_sales_count: today.count,
                comparison_sales_count: comparison.count,
            })
            .collect())
    }

    /// Sales values per hour. Same hour matching as the counts.
    pub async fn todays_sales_value_by_hour(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        filter: DimensionFilter,
        token: &CancellationToken,
    ) -> Result<Vec<HourlySalesValue>> {
        let joined = self
            .hourly_sales(estate_id, comparison_date, filter, token)
            .await?;

        Ok(joined
            .into_iter()
            .map(|(today, comparison)| HourlySalesValue {
                hour: today.hour,
                todays_sales_value: today.value,
                comparison_sales_value: comparison.value,
            })
            .collect())
    }

    async fn hourly_sales(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        filter: DimensionFilter,
        token: &CancellationToken,
    ) -> Result<Vec<(HourlySales, HourlySales)>> {
        let (today, comparison) =
            self.sales_queries(self.clock.now(), comparison_date, SaleOutcome::Authorised, filter);

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = Self::read_hourly_sales(store.as_mut(), &today, &comparison, token).await;
        store.release().await;

        let (todays_hours, comparison_hours) = result?;
        Ok(join_on_hour(todays_hours, comparison_hours))
    }

    async fn read_hourly_sales(
        store: &mut dyn ReadModel,
        today: &SalesQuery,
        comparison: &SalesQuery,
        token: &CancellationToken,
    ) -> Result<(Vec<HourlySales>, Vec<HourlySales>)> {
        let todays_hours =
            cancellable(token, store.sales_by_hour(TransactionSource::Today, today)).await?;
        let comparison_hours =
            cancellable(token, store.sales_by_hour(TransactionSource::History, comparison)).await?;
        Ok((todays_hours, comparison_hours))
    }

    /// Settled and pending fees for today and the comparison date
    pub async fn todays_settlement(
        &self,
        estate_id: Uuid,
        comparison_date: NaiveDate,
        merchant_reporting_id: Option<i32>,
        operator_reporting_id: Option<i32>,
        token: &CancellationToken,
    ) -> Result<SettlementSummary> {
        let today = self.clock.today();
        let filter =
            DimensionFilter::merchant_and_operator(merchant_reporting_id, operator_reporting_id);

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result =
            Self::read_settlement(store.as_mut(), today, comparison_date, &filter, token).await;
        store.release().await;

        let summary = result?;
        debug!(%estate_id, %comparison_date, ?summary, "Today's settlement calculated");
        Ok(summary)
    }

    async fn read_settlement(
        store: &mut dyn ReadModel,
        today: NaiveDate,
        comparison_date: NaiveDate,
        filter: &DimensionFilter,
        token: &CancellationToken,
    ) -> Result<SettlementSummary> {
        let todays_buckets = cancellable(
            token,
            store.settlement_buckets(TransactionSource::Today, today, filter),
        )
        .await?;

        // A comparison date of today reads today's source again
        let comparison_source = TransactionSource::for_date(comparison_date, today);
        let comparison_buckets = cancellable(
            token,
            store.settlement_buckets(comparison_source, comparison_date, filter),
        )
        .await?;

        Ok(SettlementSummary::assemble(&todays_buckets, &comparison_buckets))
    }

    /// Totals of the most recent date with a completed settlement
    pub async fn last_settlement(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<LastSettlement> {
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = Self::read_last_settlement(store.as_mut(), token).await;
        store.release().await;

        match result? {
            Some(settlement) => Ok(settlement),
            None => {
                warn!(%estate_id, "No completed settlement found");
                Err(AppError::not_found("No completed settlement found"))
            }
        }
    }

    async fn read_last_settlement(
        store: &mut dyn ReadModel,
        token: &CancellationToken,
    ) -> Result<Option<LastSettlement>> {
        let Some(settlement_date) =
            cancellable(token, store.last_completed_settlement_date()).await?
        else {
            return Ok(None);
        };

        let totals = cancellable(token, store.settlement_totals(settlement_date)).await?;
        Ok(Some(LastSettlement::new(settlement_date, totals)))
    }

    /// Unsettled fees in `[start_date, end_date]` grouped by one dimension.
    ///
    /// `group_by` is required; there is no ungrouped mode.
    pub async fn unsettled_fees(
        &self,
        estate_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        filter: DimensionFilter,
        group_by: Option<Dimension>,
        token: &CancellationToken,
    ) -> Result<Vec<UnsettledFee>> {
        let group_by = group_by
            .ok_or_else(|| AppError::validation("group_by must be one of Merchant, Operator, Product"))?;

        if start_date > end_date {
            return Err(AppError::validation(format!(
                "start_date ({}) must be before or equal to end_date ({})",
                start_date, end_date
            )));
        }

        let query = UnsettledFeeQuery {
            start_date,
            end_date,
            filter,
            group_by,
        };
        query.end_exclusive()?;

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.unsettled_fee_groups(&query)).await;
        store.release().await;

        let fees: Vec<UnsettledFee> = result?.into_iter().map(UnsettledFee::from).collect();
        info!(
            %estate_id,
            %group_by,
            groups = fees.len(),
            "Unsettled fees grouped"
        );
        Ok(fees)
    }

    /// Today's authorised sales per dimension, best (`Top`) or worst (`Bottom`) first
    pub async fn top_bottom(
        &self,
        estate_id: Uuid,
        direction: RankingDirection,
        result_count: u32,
        dimension: Dimension,
        token: &CancellationToken,
    ) -> Result<Vec<TopBottomData>> {
        if result_count == 0 {
            return Err(AppError::validation("result_count must be at least 1"));
        }

        let query = TopBottomQuery {
            date: self.clock.today(),
            direction,
            result_count,
            dimension,
        };

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.top_bottom(&query)).await;
        store.release().await;

        let mut rows = result?;
        rows.truncate(result_count as usize);
        Ok(rows)
    }
}

/// Inner join of the two hourly series on hour, in today's hour order
fn join_on_hour(
    today: Vec<HourlySales>,
    comparison: Vec<HourlySales>,
) -> Vec<(HourlySales, HourlySales)> {
    let comparison_by_hour: HashMap<i32, HourlySales> =
        comparison.into_iter().map(|h| (h.hour, h)).collect();

    let mut joined: Vec<(HourlySales, HourlySales)> = today
        .into_iter()
        .filter_map(|t| comparison_by_hour.get(&t.hour).map(|c| (t, *c)))
        .collect();
    joined.sort_by_key(|(t, _)| t.hour);
    joined
}

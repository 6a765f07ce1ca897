use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::{DimensionFilter, Result};
use crate::modules::facts::models::{
    FeeGroupRow, HourlySales, SalesQuery, SalesTotals, SettlementBucket, SettlementTotals,
    TopBottomData, TopBottomQuery, TransactionSource, UnsettledFeeQuery,
};
use crate::modules::facts::repositories::queries;
use crate::modules::tenancy::MySqlReadModel;

/// Raw fact aggregates against one estate's read model.
///
/// Each method is a single store round trip; combining today and comparison
/// results is left to the caller.
#[async_trait]
pub trait FactReader: Send {
    async fn sales_totals(
        &mut self,
        source: TransactionSource,
        query: &SalesQuery,
    ) -> Result<SalesTotals>;

    /// One row per hour bucket that has at least one matching sale
    async fn sales_by_hour(
        &mut self,
        source: TransactionSource,
        query: &SalesQuery,
    ) -> Result<Vec<HourlySales>>;

    /// Settled/pending fee buckets of settlements dated `settlement_date`
    async fn settlement_buckets(
        &mut self,
        source: TransactionSource,
        settlement_date: NaiveDate,
        filter: &DimensionFilter,
    ) -> Result<Vec<SettlementBucket>>;

    async fn last_completed_settlement_date(&mut self) -> Result<Option<NaiveDate>>;

    async fn settlement_totals(&mut self, settlement_date: NaiveDate) -> Result<SettlementTotals>;

    async fn unsettled_fee_groups(&mut self, query: &UnsettledFeeQuery) -> Result<Vec<FeeGroupRow>>;

    async fn top_bottom(&mut self, query: &TopBottomQuery) -> Result<Vec<TopBottomData>>;
}

#[async_trait]
impl FactReader for MySqlReadModel {
    async fn sales_totals(
        &mut self,
        source: TransactionSource,
        query: &SalesQuery,
    ) -> Result<SalesTotals> {
        let mut builder = queries::sales_totals_query(source, query);
        let totals = builder
            .build_query_as::<SalesTotals>()
            .fetch_one(self.conn())
            .await?;
        Ok(totals)
    }

    async fn sales_by_hour(
        &mut self,
        source: TransactionSource,
        query: &SalesQuery,
    ) -> Result<Vec<HourlySales>> {
        let mut builder = queries::sales_by_hour_query(source, query);
        let hours = builder
            .build_query_as::<HourlySales>()
            .fetch_all(self.conn())
            .await?;
        Ok(hours)
    }

    async fn settlement_buckets(
        &mut self,
        source: TransactionSource,
        settlement_date: NaiveDate,
        filter: &DimensionFilter,
    ) -> Result<Vec<SettlementBucket>> {
        let mut builder = queries::settlement_buckets_query(source, settlement_date, filter);
        let buckets = builder
            .build_query_as::<SettlementBucket>()
            .fetch_all(self.conn())
            .await?;
        Ok(buckets)
    }

    async fn last_completed_settlement_date(&mut self) -> Result<Option<NaiveDate>> {
        let mut builder = queries::last_completed_settlement_date_query();
        let date = builder
            .build_query_scalar::<Option<NaiveDate>>()
            .fetch_one(self.conn())
            .await?;
        Ok(date)
    }

    async fn settlement_totals(&mut self, settlement_date: NaiveDate) -> Result<SettlementTotals> {
        let mut builder = queries::settlement_totals_query(settlement_date);
        let totals = builder
            .build_query_as::<SettlementTotals>()
            .fetch_one(self.conn())
            .await?;
        Ok(totals)
    }

    async fn unsettled_fee_groups(&mut self, query: &UnsettledFeeQuery) -> Result<Vec<FeeGroupRow>> {
        let mut builder = queries::unsettled_fees_query(query)?;
        let rows = builder
            .build_query_as::<FeeGroupRow>()
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn top_bottom(&mut self, query: &TopBottomQuery) -> Result<Vec<TopBottomData>> {
        let mut builder = queries::top_bottom_query(query);
        let rows = builder
            .build_query_as::<TopBottomData>()
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }
}

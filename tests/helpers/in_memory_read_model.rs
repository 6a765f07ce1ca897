// In-memory read model
//
// Evaluates every reader query over plain vectors with the same semantics as
// the MySQL statements: inner joins on reporting ids, wildcard id filters,
// GROUP BY buckets that only exist when rows exist.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use uuid::Uuid;

use estate_reporting::core::{AppError, DimensionFilter, ReportingIdFilter, Result};
use estate_reporting::modules::dimensions::models::{
    CalendarEntry, Merchant, MerchantActivity, Operator, ResponseCode,
};
use estate_reporting::modules::dimensions::repositories::DimensionReader;
use estate_reporting::modules::facts::models::{
    Dimension, FeeGroupRow, HourlySales, RankingDirection, SaleOutcome, SalesQuery, SalesTotals,
    SettlementBucket, SettlementTotals, TopBottomData, TopBottomQuery, TransactionSource,
    UnsettledFeeQuery,
};
use estate_reporting::modules::facts::repositories::FactReader;
use estate_reporting::modules::search::models::{
    SortDirection, SortField, TransactionResult,
};
use estate_reporting::modules::search::repositories::{TransactionSearch, TransactionSearchReader};
use estate_reporting::modules::tenancy::{ReadModel, StoreResolver};

/// Row of `todays_transactions` / `transaction_history`
#[derive(Debug, Clone)]
pub struct TestTransaction {
    pub transaction_id: String,
    pub transaction_reporting_id: i32,
    pub date_time: NaiveDateTime,
    pub amount: Decimal,
    pub transaction_type: String,
    pub is_authorised: bool,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub merchant_reporting_id: i32,
    pub operator_reporting_id: i32,
    pub product_reporting_id: i32,
    pub auth_code: Option<String>,
    pub transaction_number: Option<String>,
    pub transaction_source: String,
}

/// Row of `contract_product`
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub product_id: String,
    pub reporting_id: i32,
    pub operator_reporting_id: i32,
    pub name: String,
}

/// Row of `merchant_settlement_fee` with its settlement date
#[derive(Debug, Clone)]
pub struct TestFee {
    pub transaction_id: String,
    pub settlement_date: NaiveDate,
    pub is_settled: bool,
    pub value: Decimal,
    pub calculated_at: NaiveDateTime,
}

/// Row of `settlement_summary`
#[derive(Debug, Clone)]
pub struct TestSettlementSummary {
    pub settlement_date: NaiveDate,
    pub is_completed: bool,
    pub sales_value: Decimal,
    pub sales_count: i64,
    pub fee_value: Decimal,
}

/// Contents of one estate's read model
#[derive(Debug, Clone, Default)]
pub struct EstateData {
    pub calendar: Vec<CalendarEntry>,
    pub merchants: Vec<Merchant>,
    pub operators: Vec<Operator>,
    pub products: Vec<TestProduct>,
    pub response_codes: Vec<ResponseCode>,
    pub todays_transactions: Vec<TestTransaction>,
    pub transaction_history: Vec<TestTransaction>,
    pub fees: Vec<TestFee>,
    pub settlement_summaries: Vec<TestSettlementSummary>,
}

impl EstateData {
    fn transactions(&self, source: TransactionSource) -> &[TestTransaction] {
        match source {
            TransactionSource::Today => &self.todays_transactions,
            TransactionSource::History => &self.transaction_history,
        }
    }

    fn all_transactions(&self) -> impl Iterator<Item = &TestTransaction> {
        self.todays_transactions
            .iter()
            .chain(self.transaction_history.iter())
    }

    fn merchant(&self, reporting_id: i32) -> Option<&Merchant> {
        self.merchants
            .iter()
            .find(|m| m.merchant_reporting_id == reporting_id)
    }

    fn operator(&self, reporting_id: i32) -> Option<&Operator> {
        self.operators
            .iter()
            .find(|o| o.operator_reporting_id == reporting_id)
    }

    fn product(&self, reporting_id: i32) -> Option<&TestProduct> {
        self.products.iter().find(|p| p.reporting_id == reporting_id)
    }
}

/// `IN` semantics, with an empty filter matching every id
pub fn id_matches(filter: &ReportingIdFilter, id: i32) -> bool {
    filter.is_wildcard() || filter.ids().contains(&id)
}

fn activity_matches(activity: MerchantActivity, merchant: &Merchant) -> bool {
    match activity {
        MerchantActivity::SaleSince { date, since } => {
            merchant.last_sale_date == Some(date)
                && merchant.last_sale_date_time.is_some_and(|at| at >= since)
        }
        MerchantActivity::LastSaleOn(date) => merchant.last_sale_date == Some(date),
        MerchantActivity::LastSaleOnOrBefore(date) => {
            merchant.last_sale_date.is_some_and(|last| last <= date)
        }
    }
}

fn dimension_matches(filter: &DimensionFilter, tx: &TestTransaction) -> bool {
    id_matches(&filter.merchants, tx.merchant_reporting_id)
        && id_matches(&filter.operators, tx.operator_reporting_id)
        && id_matches(&filter.products, tx.product_reporting_id)
}

fn is_counted_sale(tx: &TestTransaction, query: &SalesQuery) -> bool {
    let outcome_matches = match &query.outcome {
        SaleOutcome::Authorised => tx.is_authorised,
        SaleOutcome::Declined { response_code } => {
            !tx.is_authorised && tx.response_code.as_deref() == Some(response_code.as_str())
        }
    };

    tx.transaction_type == "Sale"
        && outcome_matches
        && tx.date_time.date() == query.date
        && tx.date_time.time() <= query.cutoff
        && dimension_matches(&query.filter, tx)
}

/// Read model handle over shared estate data
pub struct InMemoryReadModel {
    data: Arc<EstateData>,
    released: Arc<AtomicUsize>,
    stall: bool,
}

impl InMemoryReadModel {
    /// Never answers when stalled, so only cancellation can end the call
    async fn round_trip(&self) {
        if self.stall {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl DimensionReader for InMemoryReadModel {
    async fn calendar_years(&mut self, until: NaiveDate) -> Result<Vec<i32>> {
        self.round_trip().await;
        let mut years: Vec<i32> = self
            .data
            .calendar
            .iter()
            .filter(|c| c.date <= until)
            .map(|c| c.year)
            .collect();
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }

    async fn calendar_dates(
        &mut self,
        from: Option<NaiveDate>,
        until: NaiveDate,
    ) -> Result<Vec<CalendarEntry>> {
        self.round_trip().await;
        let mut dates: Vec<CalendarEntry> = self
            .data
            .calendar
            .iter()
            .filter(|c| c.date <= until && from.map_or(true, |from| c.date >= from))
            .cloned()
            .collect();
        dates.sort_by_key(|c| c.date);
        Ok(dates)
    }

    async fn merchants(&mut self) -> Result<Vec<Merchant>> {
        self.round_trip().await;
        let mut merchants = self.data.merchants.clone();
        merchants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(merchants)
    }

    async fn merchants_by_last_sale(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Merchant>> {
        self.round_trip().await;
        let mut merchants: Vec<Merchant> = self
            .data
            .merchants
            .iter()
            .filter(|m| {
                m.last_sale_date_time
                    .is_some_and(|at| at >= start && at <= end)
            })
            .cloned()
            .collect();
        merchants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(merchants)
    }

    async fn count_merchants(&mut self, activity: MerchantActivity) -> Result<i64> {
        self.round_trip().await;
        Ok(self
            .data
            .merchants
            .iter()
            .filter(|m| activity_matches(activity, m))
            .count() as i64)
    }

    async fn operators(&mut self) -> Result<Vec<Operator>> {
        self.round_trip().await;
        let mut operators = self.data.operators.clone();
        operators.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(operators)
    }

    async fn response_codes(&mut self) -> Result<Vec<ResponseCode>> {
        self.round_trip().await;
        let mut codes = self.data.response_codes.clone();
        codes.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(codes)
    }
}

#[async_trait]
impl FactReader for InMemoryReadModel {
    async fn sales_totals(
        &mut self,
        source: TransactionSource,
        query: &SalesQuery,
    ) -> Result<SalesTotals> {
        self.round_trip().await;
        Ok(self
            .data
            .transactions(source)
            .iter()
            .filter(|tx| is_counted_sale(tx, query))
            .fold(SalesTotals::default(), |totals, tx| SalesTotals {
                value: totals.value + tx.amount,
                count: totals.count + 1,
            }))
    }

    async fn sales_by_hour(
        &mut self,
        source: TransactionSource,
        query: &SalesQuery,
    ) -> Result<Vec<HourlySales>> {
        self.round_trip().await;
        let mut hours: BTreeMap<i32, (Decimal, i64)> = BTreeMap::new();
        for tx in self
            .data
            .transactions(source)
            .iter()
            .filter(|tx| is_counted_sale(tx, query))
        {
            let bucket = hours
                .entry(tx.date_time.hour() as i32)
                .or_insert((Decimal::ZERO, 0));
            bucket.0 += tx.amount;
            bucket.1 += 1;
        }

        Ok(hours
            .into_iter()
            .map(|(hour, (value, count))| HourlySales { hour, value, count })
            .collect())
    }

    async fn settlement_buckets(
        &mut self,
        source: TransactionSource,
        settlement_date: NaiveDate,
        filter: &DimensionFilter,
    ) -> Result<Vec<SettlementBucket>> {
        self.round_trip().await;
        let transactions: HashMap<&str, &TestTransaction> = self
            .data
            .transactions(source)
            .iter()
            .map(|tx| (tx.transaction_id.as_str(), tx))
            .collect();

        let mut buckets: BTreeMap<bool, (Decimal, i64)> = BTreeMap::new();
        for fee in self
            .data
            .fees
            .iter()
            .filter(|f| f.settlement_date == settlement_date)
        {
            let Some(tx) = transactions.get(fee.transaction_id.as_str()) else {
                continue;
            };
            if !dimension_matches(filter, tx) {
                continue;
            }
            let bucket = buckets.entry(fee.is_settled).or_insert((Decimal::ZERO, 0));
            bucket.0 += fee.value;
            bucket.1 += 1;
        }

        Ok(buckets
            .into_iter()
            .map(|(is_settled, (fees_value, fees_count))| SettlementBucket {
                is_settled,
                fees_value,
                fees_count,
            })
            .collect())
    }

    async fn last_completed_settlement_date(&mut self) -> Result<Option<NaiveDate>> {
        self.round_trip().await;
        Ok(self
            .data
            .settlement_summaries
            .iter()
            .filter(|s| s.is_completed)
            .map(|s| s.settlement_date)
            .max())
    }

    async fn settlement_totals(&mut self, settlement_date: NaiveDate) -> Result<SettlementTotals> {
        self.round_trip().await;
        Ok(self
            .data
            .settlement_summaries
            .iter()
            .filter(|s| s.settlement_date == settlement_date)
            .fold(SettlementTotals::default(), |totals, s| SettlementTotals {
                sales_value: totals.sales_value + s.sales_value,
                sales_count: totals.sales_count + s.sales_count,
                fees_value: totals.fees_value + s.fee_value,
            }))
    }

    async fn unsettled_fee_groups(&mut self, query: &UnsettledFeeQuery) -> Result<Vec<FeeGroupRow>> {
        self.round_trip().await;
        let transactions: Vec<&TestTransaction> = self.data.all_transactions().collect();

        let mut groups: BTreeMap<(String, Option<String>), (Decimal, i64)> = BTreeMap::new();
        for fee in self.data.fees.iter().filter(|f| {
            !f.is_settled
                && f.calculated_at.date() >= query.start_date
                && f.calculated_at.date() <= query.end_date
        }) {
            // UNION ALL join: a fee matches every transaction row with its id
            for tx in transactions
                .iter()
                .filter(|tx| tx.transaction_id == fee.transaction_id)
            {
                if !dimension_matches(&query.filter, tx) {
                    continue;
                }

                let key = match query.group_by {
                    Dimension::Merchant => match self.data.merchant(tx.merchant_reporting_id) {
                        Some(m) => (m.name.clone(), None),
                        None => continue,
                    },
                    Dimension::Operator => match self.data.operator(tx.operator_reporting_id) {
                        Some(o) => (o.name.clone(), None),
                        None => continue,
                    },
                    Dimension::Product => match (
                        self.data.operator(tx.operator_reporting_id),
                        self.data.product(tx.product_reporting_id),
                    ) {
                        (Some(o), Some(p)) => (o.name.clone(), Some(p.name.clone())),
                        _ => continue,
                    },
                };

                let group = groups.entry(key).or_insert((Decimal::ZERO, 0));
                group.0 += fee.value;
                group.1 += 1;
            }
        }

        Ok(groups
            .into_iter()
            .map(|((group_name, product_name), (fees_value, fees_count))| FeeGroupRow {
                group_name,
                product_name,
                fees_value,
                fees_count,
            })
            .collect())
    }

    async fn top_bottom(&mut self, query: &TopBottomQuery) -> Result<Vec<TopBottomData>> {
        self.round_trip().await;
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for tx in self.data.todays_transactions.iter().filter(|tx| {
            tx.transaction_type == "Sale" && tx.is_authorised && tx.date_time.date() == query.date
        }) {
            let name = match query.dimension {
                Dimension::Merchant => self
                    .data
                    .merchant(tx.merchant_reporting_id)
                    .map(|m| m.name.clone()),
                Dimension::Operator => self
                    .data
                    .operator(tx.operator_reporting_id)
                    .map(|o| o.name.clone()),
                Dimension::Product => self
                    .data
                    .product(tx.product_reporting_id)
                    .map(|p| p.name.clone()),
            };
            if let Some(name) = name {
                *totals.entry(name).or_insert(Decimal::ZERO) += tx.amount;
            }
        }

        let mut rows: Vec<TopBottomData> = totals
            .into_iter()
            .map(|(dimension_name, sales_value)| TopBottomData {
                dimension_name,
                sales_value,
            })
            .collect();
        match query.direction {
            RankingDirection::Top => rows.sort_by(|a, b| b.sales_value.cmp(&a.sales_value)),
            RankingDirection::Bottom => rows.sort_by(|a, b| a.sales_value.cmp(&b.sales_value)),
        }
        rows.truncate(query.result_count as usize);
        Ok(rows)
    }
}

#[async_trait]
impl TransactionSearchReader for InMemoryReadModel {
    async fn search_transactions(
        &mut self,
        search: &TransactionSearch,
    ) -> Result<Vec<TransactionResult>> {
        self.round_trip().await;
        let request = &search.request;
        let operators =
            ReportingIdFilter::from_ids(request.operators.clone().unwrap_or_default());
        let merchants =
            ReportingIdFilter::from_ids(request.merchants.clone().unwrap_or_default());

        let mut rows: Vec<TransactionResult> = self
            .data
            .transactions(search.source)
            .iter()
            .filter(|tx| tx.date_time.date() == search.query_date)
            .filter(|tx| id_matches(&operators, tx.operator_reporting_id))
            .filter(|tx| id_matches(&merchants, tx.merchant_reporting_id))
            .filter(|tx| {
                request.value_range.map_or(true, |range| {
                    tx.amount >= range.start_value && tx.amount <= range.end_value
                })
            })
            .filter(|tx| {
                request
                    .auth_code
                    .as_ref()
                    .map_or(true, |code| tx.auth_code.as_ref() == Some(code))
            })
            .filter(|tx| {
                request
                    .response_code
                    .as_ref()
                    .map_or(true, |code| tx.response_code.as_ref() == Some(code))
            })
            .filter(|tx| {
                request
                    .transaction_number
                    .as_ref()
                    .map_or(true, |number| tx.transaction_number.as_ref() == Some(number))
            })
            .filter_map(|tx| {
                let merchant = self.data.merchant(tx.merchant_reporting_id)?;
                let operator = self.data.operator(tx.operator_reporting_id)?;
                let product = self.data.product(tx.product_reporting_id)?;
                Some(TransactionResult {
                    transaction_id: tx.transaction_id.clone(),
                    transaction_reporting_id: tx.transaction_reporting_id,
                    transaction_amount: tx.amount,
                    is_authorised: tx.is_authorised,
                    response_code: tx.response_code.clone(),
                    response_message: tx.response_message.clone(),
                    transaction_date_time: tx.date_time,
                    transaction_source: tx.transaction_source.clone(),
                    merchant_id: merchant.merchant_id.clone(),
                    merchant_reporting_id: merchant.merchant_reporting_id,
                    merchant_name: merchant.name.clone(),
                    operator_id: operator.operator_id.clone(),
                    operator_reporting_id: operator.operator_reporting_id,
                    operator_name: operator.name.clone(),
                    product_id: product.product_id.clone(),
                    product_reporting_id: product.reporting_id,
                    product: product.name.clone(),
                })
            })
            .collect();

        if let Some(sorting) = search.sorting {
            rows.sort_by(|a, b| {
                let ordering = match sorting.field {
                    SortField::TransactionAmount => a.transaction_amount.cmp(&b.transaction_amount),
                    SortField::MerchantName => a.merchant_name.cmp(&b.merchant_name),
                    SortField::OperatorName => a.operator_name.cmp(&b.operator_name),
                };
                match sorting.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(paging) = search.paging {
            rows = rows
                .into_iter()
                .skip(paging.skip()?.max(0) as usize)
                .take(paging.take().max(0) as usize)
                .collect();
        }

        Ok(rows)
    }
}

#[async_trait]
impl ReadModel for InMemoryReadModel {
    async fn release(self: Box<Self>) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resolver over a fixed set of estates. Unknown estates fail like a
/// missing connection template.
#[derive(Default)]
pub struct InMemoryResolver {
    estates: HashMap<Uuid, Arc<EstateData>>,
    resolved: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    stall: bool,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_estate(mut self, estate_id: Uuid, data: EstateData) -> Self {
        self.estates.insert(estate_id, Arc::new(data));
        self
    }

    /// Every read model call hangs until the request is cancelled
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreResolver for InMemoryResolver {
    async fn resolve(&self, estate_id: Uuid) -> Result<Box<dyn ReadModel>> {
        let data = self.estates.get(&estate_id).cloned().ok_or_else(|| {
            AppError::configuration(format!("No read model registered for estate {}", estate_id))
        })?;

        self.resolved.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryReadModel {
            data,
            released: self.released.clone(),
            stall: self.stall,
        }))
    }
}

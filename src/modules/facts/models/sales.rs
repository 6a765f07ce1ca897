use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{average, DimensionFilter};

/// The two transaction sources reconciled by every today-vs-comparison metric.
///
/// Today's live transactions and historical transactions live in separate
/// tables and never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionSource {
    Today,
    History,
}

impl TransactionSource {
    /// Source holding transactions for `date`
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            TransactionSource::Today
        } else {
            TransactionSource::History
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            TransactionSource::Today => "todays_transactions",
            TransactionSource::History => "transaction_history",
        }
    }
}

/// Which sales an aggregate counts. Successful and failed sales are never mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    Authorised,
    Declined { response_code: String },
}

/// Shape of one today or comparison sales aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesQuery {
    pub date: NaiveDate,
    /// Only transactions at or before this time of day are counted
    pub cutoff: NaiveTime,
    pub outcome: SaleOutcome,
    pub filter: DimensionFilter,
}

/// Raw value/count aggregate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct SalesTotals {
    pub value: Decimal,
    pub count: i64,
}

/// Raw value/count aggregate for one hour bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct HourlySales {
    pub hour: i32,
    pub value: Decimal,
    pub count: i64,
}

/// Today's sales against the comparison date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub todays_sales_value: Decimal,
    pub todays_sales_count: i64,
    pub todays_average_sales_value: Decimal,
    pub comparison_sales_value: Decimal,
    pub comparison_sales_count: i64,
    pub comparison_average_sales_value: Decimal,
}

impl SalesSummary {
    pub fn assemble(today: SalesTotals, comparison: SalesTotals) -> Self {
        Self {
            todays_sales_value: today.value,
            todays_sales_count: today.count,
            todays_average_sales_value: average(today.value, today.count),
            comparison_sales_value: comparison.value,
            comparison_sales_count: comparison.count,
            comparison_average_sales_value: average(comparison.value, comparison.count),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySalesCount {
    pub hour: i32,
    pub todays_sales_count: i64,
    pub comparison_sales_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySalesValue {
    pub hour: i32,
    pub todays_sales_value: Decimal,
    pub comparison_sales_value: Decimal,
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Settlement fees of one day grouped by their settled flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct SettlementBucket {
    pub is_settled: bool,
    pub fees_value: Decimal,
    pub fees_count: i64,
}

/// Settled and pending fees for today and the comparison date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub todays_settlement_value: Decimal,
    pub todays_settlement_count: i64,
    pub todays_pending_settlement_value: Decimal,
    pub todays_pending_settlement_count: i64,
    pub comparison_settlement_value: Decimal,
    pub comparison_settlement_count: i64,
    pub comparison_pending_settlement_value: Decimal,
    pub comparison_pending_settlement_count: i64,
}

/// Value and count of the bucket with the given settled flag; zero when absent
fn bucket_totals(buckets: &[SettlementBucket], is_settled: bool) -> (Decimal, i64) {
    buckets
        .iter()
        .filter(|b| b.is_settled == is_settled)
        .fold((Decimal::ZERO, 0), |(value, count), b| {
            (value + b.fees_value, count + b.fees_count)
        })
}

impl SettlementSummary {
    pub fn assemble(today: &[SettlementBucket], comparison: &[SettlementBucket]) -> Self {
        let (todays_settlement_value, todays_settlement_count) = bucket_totals(today, true);
        let (todays_pending_settlement_value, todays_pending_settlement_count) =
            bucket_totals(today, false);
        let (comparison_settlement_value, comparison_settlement_count) =
            bucket_totals(comparison, true);
        let (comparison_pending_settlement_value, comparison_pending_settlement_count) =
            bucket_totals(comparison, false);

        Self {
            todays_settlement_value,
            todays_settlement_count,
            todays_pending_settlement_value,
            todays_pending_settlement_count,
            comparison_settlement_value,
            comparison_settlement_count,
            comparison_pending_settlement_value,
            comparison_pending_settlement_count,
        }
    }
}

/// Summed settlement batches of one date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct SettlementTotals {
    pub sales_value: Decimal,
    pub sales_count: i64,
    pub fees_value: Decimal,
}

/// Totals of the most recent completed settlement date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSettlement {
    pub settlement_date: NaiveDate,
    pub sales_value: Decimal,
    pub sales_count: i64,
    pub fees_value: Decimal,
}

impl LastSettlement {
    pub fn new(settlement_date: NaiveDate, totals: SettlementTotals) -> Self {
        Self {
            settlement_date,
            sales_value: totals.sales_value,
            sales_count: totals.sales_count,
            fees_value: totals.fees_value,
        }
    }
}

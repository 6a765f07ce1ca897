use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Merchant with its most recently created address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Merchant {
    pub merchant_id: String,
    pub merchant_reporting_id: i32,
    pub name: String,
    pub reference: String,
    pub last_sale_date: Option<NaiveDate>,
    pub last_sale_date_time: Option<NaiveDateTime>,
    pub created_date_time: NaiveDateTime,
    pub last_statement_generated: Option<NaiveDateTime>,
    pub post_code: Option<String>,
    pub region: Option<String>,
    pub town: Option<String>,
}

/// Merchant activity predicates backing the KPI counts.
///
/// Each variant is counted on its own; a merchant may satisfy none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerchantActivity {
    /// Last sale on `date` at or after `since`
    SaleSince { date: NaiveDate, since: NaiveDateTime },
    /// Last sale exactly on this date
    LastSaleOn(NaiveDate),
    /// Last sale on or before this date
    LastSaleOnOrBefore(NaiveDate),
}

/// Merchant activity counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantKpi {
    pub merchants_with_sale_in_last_hour: i64,
    pub merchants_with_no_sale_today: i64,
    pub merchants_with_no_sale_in_last7_days: i64,
}

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Transaction row with denormalised merchant, operator and product names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TransactionResult {
    pub transaction_id: String,
    pub transaction_reporting_id: i32,
    pub transaction_amount: Decimal,
    pub is_authorised: bool,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub transaction_date_time: NaiveDateTime,
    pub transaction_source: String,
    pub merchant_id: String,
    pub merchant_reporting_id: i32,
    pub merchant_name: String,
    pub operator_id: String,
    pub operator_reporting_id: i32,
    pub operator_name: String,
    pub product_id: String,
    pub product_reporting_id: i32,
    pub product: String,
}

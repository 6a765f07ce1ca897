use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Operator {
    pub operator_id: String,
    pub operator_reporting_id: i32,
    pub name: String,
    pub require_custom_merchant_number: bool,
    pub require_custom_terminal_number: bool,
}

/// Static response code lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ResponseCode {
    pub code: String,
    pub description: String,
}

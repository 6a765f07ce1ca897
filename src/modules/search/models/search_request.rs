use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::{AppError, Result};

/// Largest page a single search may return
pub const MAX_PAGE_SIZE: i64 = 1_000;

/// Inclusive transaction amount range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub start_value: Decimal,
    pub end_value: Decimal,
}

/// Transaction search filters. Every filter except `query_date` is optional
/// and all supplied filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Required: exact transaction date
    pub query_date: Option<NaiveDate>,
    /// Operator reporting ids
    #[serde(default)]
    pub operators: Option<Vec<i32>>,
    /// Merchant reporting ids
    #[serde(default)]
    pub merchants: Option<Vec<i32>>,
    #[serde(default)]
    pub value_range: Option<ValueRange>,
    #[serde(default)]
    pub auth_code: Option<String>,
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub transaction_number: Option<String>,
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PagingRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Rows to skip. Pages below 2 (including 0 and negatives) skip nothing.
    /// Fails when the offset does not fit in an `i64`.
    pub fn skip(&self) -> Result<i64> {
        if self.page <= 1 {
            return Ok(0);
        }
        (self.page - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| AppError::validation(format!("page {} is out of range", self.page)))
    }

    pub fn take(&self) -> i64 {
        self.page_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    TransactionAmount,
    MerchantName,
    OperatorName,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transactionamount" | "transaction_amount" => Ok(SortField::TransactionAmount),
            "merchantname" | "merchant_name" => Ok(SortField::MerchantName),
            "operatorname" | "operator_name" => Ok(SortField::OperatorName),
            _ => Err(AppError::validation(format!("Invalid sort field: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            _ => Err(AppError::validation(format!("Invalid sort direction: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingRequest {
    pub field: SortField,
    pub direction: SortDirection,
}

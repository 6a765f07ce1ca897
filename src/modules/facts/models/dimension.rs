use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::core::{AppError, DimensionFilter};

/// Axis of aggregation for fee grouping and top/bottom rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Merchant,
    Operator,
    Product,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Merchant => write!(f, "Merchant"),
            Dimension::Operator => write!(f, "Operator"),
            Dimension::Product => write!(f, "Product"),
        }
    }
}

impl FromStr for Dimension {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merchant" => Ok(Dimension::Merchant),
            "operator" => Ok(Dimension::Operator),
            "product" => Ok(Dimension::Product),
            _ => Err(AppError::validation(format!("Invalid dimension: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingDirection {
    Top,
    Bottom,
}

impl FromStr for RankingDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(RankingDirection::Top),
            "bottom" => Ok(RankingDirection::Bottom),
            _ => Err(AppError::validation(format!("Invalid direction: '{}'", s))),
        }
    }
}

/// Unsettled fees in a date range, grouped by one dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsettledFeeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub filter: DimensionFilter,
    pub group_by: Dimension,
}

impl UnsettledFeeQuery {
    /// Exclusive upper bound: midnight after `end_date`
    pub fn end_exclusive(&self) -> crate::core::Result<NaiveDateTime> {
        self.end_date
            .succ_opt()
            .map(|day| day.and_time(NaiveTime::MIN))
            .ok_or_else(|| AppError::validation(format!("end_date {} is out of range", self.end_date)))
    }
}

/// Grouped fee row as read from the store.
///
/// For product grouping `group_name` holds the operator name and
/// `product_name` the product.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FeeGroupRow {
    pub group_name: String,
    pub product_name: Option<String>,
    pub fees_value: Decimal,
    pub fees_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsettledFee {
    pub dimension_name: String,
    pub fees_value: Decimal,
    pub fees_count: i64,
}

impl From<FeeGroupRow> for UnsettledFee {
    fn from(row: FeeGroupRow) -> Self {
        let dimension_name = match row.product_name {
            Some(product) => format!("{} - {}", row.group_name, product),
            None => row.group_name,
        };

        Self {
            dimension_name,
            fees_value: row.fees_value,
            fees_count: row.fees_count,
        }
    }
}

/// Today's authorised sales ranked by one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopBottomQuery {
    pub date: NaiveDate,
    pub direction: RankingDirection,
    pub result_count: u32,
    pub dimension: Dimension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TopBottomData {
    pub dimension_name: String,
    pub sales_value: Decimal,
}

use std::str::FromStr;

use crate::core::AppError;

/// Optional filter over reporting ids.
///
/// An empty filter is a wildcard: it matches every row. Reporting id `0` is
/// the wire encoding of "no filter" and is dropped on construction. Multiple
/// ids combine with IN semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportingIdFilter(Vec<i32>);

impl ReportingIdFilter {
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn from_ids<I: IntoIterator<Item = i32>>(ids: I) -> Self {
        let mut ids: Vec<i32> = ids.into_iter().filter(|id| *id != 0).collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn single(id: Option<i32>) -> Self {
        Self::from_ids(id)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[i32] {
        &self.0
    }
}

/// Comma separated list as sent on query strings, e.g. `"1,2,3"`
impl FromStr for ReportingIdFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i32>().map_err(|_| {
                    AppError::validation(format!("Invalid reporting id: '{}'", part))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_ids(ids))
    }
}

/// Merchant, operator and product narrowing applied to a fact query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionFilter {
    pub merchants: ReportingIdFilter,
    pub operators: ReportingIdFilter,
    pub products: ReportingIdFilter,
}

impl DimensionFilter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn merchants(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            merchants: ReportingIdFilter::from_ids(ids),
            ..Self::default()
        }
    }

    pub fn operators(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            operators: ReportingIdFilter::from_ids(ids),
            ..Self::default()
        }
    }

    pub fn products(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            products: ReportingIdFilter::from_ids(ids),
            ..Self::default()
        }
    }

    /// Single merchant/operator pair where `None` or `0` means "any"
    pub fn merchant_and_operator(merchant: Option<i32>, operator: Option<i32>) -> Self {
        Self {
            merchants: ReportingIdFilter::single(merchant),
            operators: ReportingIdFilter::single(operator),
            products: ReportingIdFilter::any(),
        }
    }
}

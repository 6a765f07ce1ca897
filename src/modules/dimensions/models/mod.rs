mod calendar;
mod merchant;
mod operator;

pub use calendar::{CalendarEntry, ComparisonDate};
pub use merchant::{Merchant, MerchantActivity, MerchantKpi};
pub use operator::{Operator, ResponseCode};

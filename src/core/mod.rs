pub mod cancellation;
pub mod clock;
pub mod error;
pub mod filters;
pub mod safe_math;

pub use cancellation::cancellable;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AppError, Result};
pub use filters::{DimensionFilter, ReportingIdFilter};
pub use safe_math::{average, safe_divide};

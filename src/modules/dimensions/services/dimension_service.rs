use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::{cancellable, AppError, Clock, Result};
use crate::modules::dimensions::models::{
    CalendarEntry, Merchant, MerchantActivity, MerchantKpi, Operator, ResponseCode,
};
use crate::modules::dimensions::repositories::DimensionReader;
use crate::modules::tenancy::{acquire, ReadModel, StoreResolver};

/// Reads reference data for an estate
///
/// Empty calendar, merchant, operator and response code lookups are reported
/// as `NotFound`.
pub struct DimensionService {
    resolver: Arc<dyn StoreResolver>,
    clock: Arc<dyn Clock>,
}

impl DimensionService {
    pub fn new(resolver: Arc<dyn StoreResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Distinct years with calendar dates up to today
    pub async fn calendar_years(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vec<i32>> {
        let today = self.clock.today();
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.calendar_years(today)).await;
        store.release().await;

        // Ascending, one entry per year
        let years: Vec<i32> = result?.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        not_empty(years, "No calendar years found")
    }

    /// All calendar dates up to and including today, optionally narrowed to one year
    pub async fn calendar_dates(
        &self,
        estate_id: Uuid,
        year: Option<i32>,
        token: &CancellationToken,
    ) -> Result<Vec<CalendarEntry>> {
        let today = self.clock.today();
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.calendar_dates(None, today)).await;
        store.release().await;

        let dates = result?
            .into_iter()
            .filter(|entry| year.map_or(true, |year| entry.year == year))
            .collect();
        not_empty(dates, "No calendar dates found")
    }

    /// Dates from the 1st of January of the current year up to yesterday,
    /// most recent first. May be empty on the 1st of January.
    pub async fn calendar_comparison_dates(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vec<CalendarEntry>> {
        let today = self.clock.today();
        let start_of_year = NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .ok_or_else(|| AppError::internal("Invalid start of year"))?;
        let yesterday = today - Duration::days(1);

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.calendar_dates(Some(start_of_year), yesterday)).await;
        store.release().await;

        let mut dates = result?;
        dates.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(dates)
    }

    pub async fn merchants(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vec<Merchant>> {
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.merchants()).await;
        store.release().await;

        not_empty(result?, "No merchants found")
    }

    /// Merchants whose last sale happened within `[start, end]`
    pub async fn merchants_by_last_sale(
        &self,
        estate_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
        token: &CancellationToken,
    ) -> Result<Vec<Merchant>> {
        if start > end {
            return Err(AppError::validation(format!(
                "start ({}) must be before or equal to end ({})",
                start, end
            )));
        }

        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.merchants_by_last_sale(start, end)).await;
        store.release().await;

        not_empty(result?, "No merchants found with a sale in the requested window")
    }

    pub async fn operators(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vec<Operator>> {
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.operators()).await;
        store.release().await;

        not_empty(result?, "No operators found")
    }

    pub async fn response_codes(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vec<ResponseCode>> {
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = cancellable(token, store.response_codes()).await;
        store.release().await;

        not_empty(result?, "No response codes found")
    }

    /// Three independent merchant activity counts relative to now
    pub async fn merchant_kpis(
        &self,
        estate_id: Uuid,
        token: &CancellationToken,
    ) -> Result<MerchantKpi> {
        let now = self.clock.now();
        let mut store = acquire(self.resolver.as_ref(), estate_id, token).await?;
        let result = self.count_merchant_kpis(store.as_mut(), now, token).await;
        store.release().await;

        let kpi = result?;
        info!(
            %estate_id,
            last_hour = kpi.merchants_with_sale_in_last_hour,
            no_sale_today = kpi.merchants_with_no_sale_today,
            no_sale_7_days = kpi.merchants_with_no_sale_in_last7_days,
            "Merchant KPIs calculated"
        );
        Ok(kpi)
    }

    async fn count_merchant_kpis(
        &self,
        store: &mut dyn ReadModel,
        now: NaiveDateTime,
        token: &CancellationToken,
    ) -> Result<MerchantKpi> {
        let today = now.date();

        let last_hour = MerchantActivity::SaleSince {
            date: today,
            since: now - Duration::hours(1),
        };
        let no_sale_today = MerchantActivity::LastSaleOn(today - Duration::days(1));
        let no_sale_7_days = MerchantActivity::LastSaleOnOrBefore(today - Duration::days(7));

        let merchants_with_sale_in_last_hour =
            cancellable(token, store.count_merchants(last_hour)).await?;
        let merchants_with_no_sale_today =
            cancellable(token, store.count_merchants(no_sale_today)).await?;
        let merchants_with_no_sale_in_last7_days =
            cancellable(token, store.count_merchants(no_sale_7_days)).await?;

        Ok(MerchantKpi {
            merchants_with_sale_in_last_hour,
            merchants_with_no_sale_today,
            merchants_with_no_sale_in_last7_days,
        })
    }
}

fn not_empty<T>(rows: Vec<T>, message: &str) -> Result<Vec<T>> {
    if rows.is_empty() {
        debug!("{}", message);
        return Err(AppError::not_found(message));
    }
    Ok(rows)
}

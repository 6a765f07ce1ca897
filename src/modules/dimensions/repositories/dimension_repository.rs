use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySql, QueryBuilder};

use crate::core::Result;
use crate::modules::dimensions::models::{
    CalendarEntry, Merchant, MerchantActivity, Operator, ResponseCode,
};
use crate::modules::tenancy::MySqlReadModel;

/// Reference data lookups against one estate's read model
#[async_trait]
pub trait DimensionReader: Send {
    /// Distinct calendar years with at least one date on or before `until`
    async fn calendar_years(&mut self, until: NaiveDate) -> Result<Vec<i32>>;

    /// Calendar rows in `[from, until]`, ascending by date. `from = None` is unbounded.
    async fn calendar_dates(
        &mut self,
        from: Option<NaiveDate>,
        until: NaiveDate,
    ) -> Result<Vec<CalendarEntry>>;

    async fn merchants(&mut self) -> Result<Vec<Merchant>>;

    /// Merchants whose last sale timestamp falls in `[start, end]`
    async fn merchants_by_last_sale(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Merchant>>;

    async fn count_merchants(&mut self, activity: MerchantActivity) -> Result<i64>;

    async fn operators(&mut self) -> Result<Vec<Operator>>;

    async fn response_codes(&mut self) -> Result<Vec<ResponseCode>>;
}

const CALENDAR_COLUMNS: &str = "date, day_of_week, day_of_week_number, day_of_week_short, \
     month_name_long, month_name_short, month_number, week_number, week_number_string, \
     year, year_week_number";

// Latest address per merchant: the address row with the greatest created_date_time
const MERCHANT_SELECT: &str = r#"
    SELECT
        m.merchant_id, m.merchant_reporting_id, m.name, m.reference,
        m.last_sale_date, m.last_sale_date_time, m.created_date_time,
        m.last_statement_generated,
        a.postal_code AS post_code, a.region, a.town
    FROM merchant m
    LEFT JOIN merchant_address a
        ON a.merchant_id = m.merchant_id
        AND a.created_date_time = (
            SELECT MAX(latest.created_date_time)
            FROM merchant_address latest
            WHERE latest.merchant_id = m.merchant_id
        )
"#;

pub(crate) fn calendar_years_query(until: NaiveDate) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new("SELECT DISTINCT year FROM calendar WHERE date <= ");
    builder.push_bind(until);
    builder.push(" ORDER BY year");
    builder
}

pub(crate) fn calendar_dates_query(
    from: Option<NaiveDate>,
    until: NaiveDate,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM calendar WHERE date <= ", CALENDAR_COLUMNS));
    builder.push_bind(until);
    if let Some(from) = from {
        builder.push(" AND date >= ").push_bind(from);
    }
    builder.push(" ORDER BY date");
    builder
}

pub(crate) fn merchants_query(
    last_sale_window: Option<(NaiveDateTime, NaiveDateTime)>,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(MERCHANT_SELECT);
    if let Some((start, end)) = last_sale_window {
        builder
            .push(" WHERE m.last_sale_date_time >= ")
            .push_bind(start)
            .push(" AND m.last_sale_date_time <= ")
            .push_bind(end);
    }
    builder.push(" ORDER BY m.name");
    builder
}

pub(crate) fn merchant_count_query(activity: MerchantActivity) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM merchant WHERE ");
    match activity {
        MerchantActivity::SaleSince { date, since } => {
            builder
                .push("last_sale_date = ")
                .push_bind(date)
                .push(" AND last_sale_date_time >= ")
                .push_bind(since);
        }
        MerchantActivity::LastSaleOn(date) => {
            builder.push("last_sale_date = ").push_bind(date);
        }
        MerchantActivity::LastSaleOnOrBefore(date) => {
            builder.push("last_sale_date <= ").push_bind(date);
        }
    }
    builder
}

#[async_trait]
impl DimensionReader for MySqlReadModel {
    async fn calendar_years(&mut self, until: NaiveDate) -> Result<Vec<i32>> {
        let mut query = calendar_years_query(until);
        let years = query
            .build_query_scalar::<i32>()
            .fetch_all(self.conn())
            .await?;
        Ok(years)
    }

    async fn calendar_dates(
        &mut self,
        from: Option<NaiveDate>,
        until: NaiveDate,
    ) -> Result<Vec<CalendarEntry>> {
        let mut query = calendar_dates_query(from, until);
        let dates = query
            .build_query_as::<CalendarEntry>()
            .fetch_all(self.conn())
            .await?;
        Ok(dates)
    }

    async fn merchants(&mut self) -> Result<Vec<Merchant>> {
        let mut query = merchants_query(None);
        let merchants = query
            .build_query_as::<Merchant>()
            .fetch_all(self.conn())
            .await?;
        Ok(merchants)
    }

    async fn merchants_by_last_sale(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Merchant>> {
        let mut query = merchants_query(Some((start, end)));
        let merchants = query
            .build_query_as::<Merchant>()
            .fetch_all(self.conn())
            .await?;
        Ok(merchants)
    }

    async fn count_merchants(&mut self, activity: MerchantActivity) -> Result<i64> {
        let mut query = merchant_count_query(activity);
        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.conn())
            .await?;
        Ok(count)
    }

    async fn operators(&mut self) -> Result<Vec<Operator>> {
        let operators = sqlx::query_as::<_, Operator>(
            r#"
            SELECT
                operator_id, operator_reporting_id, name,
                require_custom_merchant_number, require_custom_terminal_number
            FROM operator
            ORDER BY name
            "#,
        )
        .fetch_all(self.conn())
        .await?;

        Ok(operators)
    }

    async fn response_codes(&mut self) -> Result<Vec<ResponseCode>> {
        let codes = sqlx::query_as::<_, ResponseCode>(
            r#"
            SELECT code, description
            FROM response_codes
            ORDER BY code
            "#,
        )
        .fetch_all(self.conn())
        .await?;

        Ok(codes)
    }
}

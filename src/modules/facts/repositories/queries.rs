//! SQL construction for the fact aggregates.
//!
//! Each builder is a plain function of its query shape so the composed SQL
//! can be checked without a database.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{MySql, QueryBuilder};

use crate::core::{DimensionFilter, ReportingIdFilter, Result};
use crate::modules::facts::models::{
    Dimension, RankingDirection, SaleOutcome, SalesQuery, TopBottomQuery, TransactionSource,
    UnsettledFeeQuery,
};

const SALE: &str = "Sale";

/// `AND <column> IN (?, ...)`, or nothing for a wildcard filter
pub(crate) fn push_id_filter(
    builder: &mut QueryBuilder<'static, MySql>,
    column: &str,
    filter: &ReportingIdFilter,
) {
    if filter.is_wildcard() {
        return;
    }

    builder.push(format!(" AND {} IN (", column));
    let mut ids = builder.separated(", ");
    for id in filter.ids() {
        ids.push_bind(*id);
    }
    ids.push_unseparated(")");
}

/// Merchant/operator/product narrowing on transaction alias `t`
pub(crate) fn push_dimension_filter(
    builder: &mut QueryBuilder<'static, MySql>,
    filter: &DimensionFilter,
) {
    push_id_filter(builder, "t.merchant_reporting_id", &filter.merchants);
    push_id_filter(builder, "t.operator_reporting_id", &filter.operators);
    push_id_filter(builder, "t.contract_product_reporting_id", &filter.products);
}

fn push_sale_predicates(builder: &mut QueryBuilder<'static, MySql>, query: &SalesQuery) {
    builder.push(" WHERE t.transaction_type = ").push_bind(SALE);

    match &query.outcome {
        SaleOutcome::Authorised => {
            builder.push(" AND t.is_authorised = ").push_bind(true);
        }
        SaleOutcome::Declined { response_code } => {
            builder
                .push(" AND t.is_authorised = ")
                .push_bind(false)
                .push(" AND t.response_code = ")
                .push_bind(response_code.clone());
        }
    }

    builder
        .push(" AND t.transaction_date = ")
        .push_bind(query.date)
        .push(" AND t.transaction_time <= ")
        .push_bind(query.cutoff);

    push_dimension_filter(builder, &query.filter);
}

pub(crate) fn sales_totals_query(
    source: TransactionSource,
    query: &SalesQuery,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT COALESCE(SUM(t.transaction_amount), 0) AS value, COUNT(*) AS count FROM {} t",
        source.table()
    ));
    push_sale_predicates(&mut builder, query);
    builder
}

pub(crate) fn sales_by_hour_query(
    source: TransactionSource,
    query: &SalesQuery,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT t.hour AS hour, COALESCE(SUM(t.transaction_amount), 0) AS value, COUNT(*) AS count FROM {} t",
        source.table()
    ));
    push_sale_predicates(&mut builder, query);
    builder.push(" GROUP BY t.hour ORDER BY t.hour");
    builder
}

/// Fees of settlements dated `settlement_date`, joined to their transactions
/// in `source`, bucketed by the settled flag
pub(crate) fn settlement_buckets_query(
    source: TransactionSource,
    settlement_date: NaiveDate,
    filter: &DimensionFilter,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!(
        r#"SELECT f.is_settled AS is_settled,
            COALESCE(SUM(f.calculated_value), 0) AS fees_value,
            COUNT(*) AS fees_count
        FROM settlement s
        JOIN merchant_settlement_fee f ON f.settlement_id = s.settlement_id
        JOIN {} t ON t.transaction_id = f.transaction_id
        WHERE s.settlement_date = "#,
        source.table()
    ));
    builder.push_bind(settlement_date);
    push_dimension_filter(&mut builder, filter);
    builder.push(" GROUP BY f.is_settled");
    builder
}

pub(crate) fn last_completed_settlement_date_query() -> QueryBuilder<'static, MySql> {
    QueryBuilder::new("SELECT MAX(settlement_date) FROM settlement_summary WHERE is_completed = 1")
}

/// Every settlement batch sharing `settlement_date` contributes
pub(crate) fn settlement_totals_query(settlement_date: NaiveDate) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(
        r#"SELECT COALESCE(SUM(sales_value), 0) AS sales_value,
            CAST(COALESCE(SUM(sales_count), 0) AS SIGNED) AS sales_count,
            COALESCE(SUM(fee_value), 0) AS fees_value
        FROM settlement_summary
        WHERE settlement_date = "#,
    );
    builder.push_bind(settlement_date);
    builder
}

/// Fees can belong to transactions of either source within a date range
const ALL_TRANSACTIONS: &str = r#"(
        SELECT transaction_id, merchant_reporting_id, operator_reporting_id, contract_product_reporting_id
        FROM todays_transactions
        UNION ALL
        SELECT transaction_id, merchant_reporting_id, operator_reporting_id, contract_product_reporting_id
        FROM transaction_history
    ) t"#;

pub(crate) fn unsettled_fees_query(
    query: &UnsettledFeeQuery,
) -> Result<QueryBuilder<'static, MySql>> {
    let (columns, join, group_by) = match query.group_by {
        Dimension::Merchant => (
            "m.name AS group_name, CAST(NULL AS CHAR) AS product_name",
            "JOIN merchant m ON m.merchant_reporting_id = t.merchant_reporting_id",
            "m.name",
        ),
        Dimension::Operator => (
            "o.name AS group_name, CAST(NULL AS CHAR) AS product_name",
            "JOIN operator o ON o.operator_reporting_id = t.operator_reporting_id",
            "o.name",
        ),
        Dimension::Product => (
            "o.name AS group_name, cp.product_name AS product_name",
            "JOIN operator o ON o.operator_reporting_id = t.operator_reporting_id \
             JOIN contract_product cp ON cp.contract_product_reporting_id = t.contract_product_reporting_id",
            "o.name, cp.product_name",
        ),
    };

    let mut builder = QueryBuilder::new(format!(
        r#"SELECT {columns},
            COALESCE(SUM(f.calculated_value), 0) AS fees_value,
            COUNT(*) AS fees_count
        FROM merchant_settlement_fee f
        JOIN {transactions} ON t.transaction_id = f.transaction_id
        {join}
        WHERE f.is_settled = "#,
        columns = columns,
        transactions = ALL_TRANSACTIONS,
        join = join,
    ));
    builder.push_bind(false);

    // [start, end] by calendar day, kept sargable on the timestamp column
    let from = query.start_date.and_time(NaiveTime::MIN);
    let until = query.end_exclusive()?;
    builder
        .push(" AND f.fee_calculated_date_time >= ")
        .push_bind(from)
        .push(" AND f.fee_calculated_date_time < ")
        .push_bind(until);

    push_dimension_filter(&mut builder, &query.filter);
    builder.push(format!(" GROUP BY {} ORDER BY {}", group_by, group_by));
    Ok(builder)
}

/// Dimension table, its reporting id column and its display name column
fn dimension_table(dimension: Dimension) -> (&'static str, &'static str, &'static str) {
    match dimension {
        Dimension::Merchant => ("merchant", "merchant_reporting_id", "name"),
        Dimension::Operator => ("operator", "operator_reporting_id", "name"),
        Dimension::Product => (
            "contract_product",
            "contract_product_reporting_id",
            "product_name",
        ),
    }
}

pub(crate) fn top_bottom_query(query: &TopBottomQuery) -> QueryBuilder<'static, MySql> {
    let (table, key, name) = dimension_table(query.dimension);
    let order = match query.direction {
        RankingDirection::Top => "DESC",
        RankingDirection::Bottom => "ASC",
    };

    let mut builder = QueryBuilder::new(format!(
        r#"SELECT d.{name} AS dimension_name,
            COALESCE(SUM(t.transaction_amount), 0) AS sales_value
        FROM {today} t
        JOIN {table} d ON d.{key} = t.{key}
        WHERE t.transaction_type = "#,
        name = name,
        today = TransactionSource::Today.table(),
        table = table,
        key = key,
    ));
    builder
        .push_bind(SALE)
        .push(" AND t.is_authorised = ")
        .push_bind(true)
        .push(" AND t.transaction_date = ")
        .push_bind(query.date)
        .push(format!(" GROUP BY d.{} ORDER BY sales_value {} LIMIT ", name, order))
        .push_bind(query.result_count);
    builder
}

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, QueryBuilder};

use crate::core::{ReportingIdFilter, Result};
use crate::modules::facts::models::TransactionSource;
use crate::modules::facts::repositories::queries::push_id_filter;
use crate::modules::search::models::{
    PagingRequest, SearchRequest, SortDirection, SortField, SortingRequest, TransactionResult,
};
use crate::modules::tenancy::MySqlReadModel;

/// A search request resolved against a transaction source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSearch {
    pub source: TransactionSource,
    pub query_date: NaiveDate,
    pub request: SearchRequest,
    pub paging: Option<PagingRequest>,
    pub sorting: Option<SortingRequest>,
}

#[async_trait]
pub trait TransactionSearchReader: Send {
    async fn search_transactions(
        &mut self,
        search: &TransactionSearch,
    ) -> Result<Vec<TransactionResult>>;
}

const SEARCH_SELECT: &str = r#"SELECT
        t.transaction_id, t.transaction_reporting_id, t.transaction_amount, t.is_authorised,
        t.response_code, t.response_message, t.transaction_date_time,
        CAST(t.transaction_source AS CHAR) AS transaction_source,
        m.merchant_id, m.merchant_reporting_id, m.name AS merchant_name,
        o.operator_id, o.operator_reporting_id, o.name AS operator_name,
        cp.contract_product_id AS product_id,
        cp.contract_product_reporting_id AS product_reporting_id,
        cp.product_name AS product"#;

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::TransactionAmount => "t.transaction_amount",
        SortField::MerchantName => "m.name",
        SortField::OperatorName => "o.name",
    }
}

pub(crate) fn search_query(search: &TransactionSearch) -> Result<QueryBuilder<'static, MySql>> {
    let mut builder = QueryBuilder::new(format!(
        r#"{select}
        FROM {table} t
        JOIN merchant m ON m.merchant_id = t.merchant_id
        JOIN operator o ON o.operator_id = t.operator_id
        JOIN contract_product cp ON cp.contract_product_id = t.contract_product_id
        WHERE t.transaction_date = "#,
        select = SEARCH_SELECT,
        table = search.source.table(),
    ));
    builder.push_bind(search.query_date);

    let request = &search.request;
    if let Some(operators) = &request.operators {
        push_id_filter(
            &mut builder,
            "t.operator_reporting_id",
            &ReportingIdFilter::from_ids(operators.iter().copied()),
        );
    }
    if let Some(merchants) = &request.merchants {
        push_id_filter(
            &mut builder,
            "t.merchant_reporting_id",
            &ReportingIdFilter::from_ids(merchants.iter().copied()),
        );
    }
    if let Some(range) = &request.value_range {
        builder
            .push(" AND t.transaction_amount >= ")
            .push_bind(range.start_value)
            .push(" AND t.transaction_amount <= ")
            .push_bind(range.end_value);
    }
    if let Some(auth_code) = &request.auth_code {
        builder.push(" AND t.auth_code = ").push_bind(auth_code.clone());
    }
    if let Some(response_code) = &request.response_code {
        builder.push(" AND t.response_code = ").push_bind(response_code.clone());
    }
    if let Some(transaction_number) = &request.transaction_number {
        builder
            .push(" AND t.transaction_number = ")
            .push_bind(transaction_number.clone());
    }

    if let Some(sorting) = search.sorting {
        let direction = match sorting.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        builder.push(format!(" ORDER BY {} {}", sort_column(sorting.field), direction));
    }

    if let Some(paging) = search.paging {
        builder.push(" LIMIT ").push_bind(paging.take());
        let skip = paging.skip()?;
        if skip > 0 {
            builder.push(" OFFSET ").push_bind(skip);
        }
    }

    Ok(builder)
}

#[async_trait]
impl TransactionSearchReader for MySqlReadModel {
    async fn search_transactions(
        &mut self,
        search: &TransactionSearch,
    ) -> Result<Vec<TransactionResult>> {
        let mut builder = search_query(search)?;
        let rows = builder
            .build_query_as::<TransactionResult>()
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }
}

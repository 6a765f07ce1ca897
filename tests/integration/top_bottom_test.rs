//! Integration tests for today's top/bottom rankings

#[path = "../helpers/mod.rs"]
mod helpers;

use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use estate_reporting::core::AppError;
use estate_reporting::modules::facts::models::{Dimension, RankingDirection};
use helpers::*;

fn today() -> chrono::NaiveDate {
    date(2024, 3, 15)
}

fn now() -> chrono::NaiveDateTime {
    at(today(), 18, 0)
}

/// Merchants A=$100, B=$50, C=$75 across today's sales
fn estate() -> EstateBuilder {
    EstateBuilder::new()
        .merchant(merchant(1, "A"))
        .merchant(merchant(2, "B"))
        .merchant(merchant(3, "C"))
        .operator(operator(1, "Safaricom"))
        .operator(operator(2, "Voucher"))
        .product(1, 1, "Topup")
        .product(2, 2, "Voucher")
        .today(TestTransaction::sale(1, at(today(), 9, 0), dec!(60)).merchant(1))
        .today(TestTransaction::sale(2, at(today(), 10, 0), dec!(40)).merchant(1).operator(2).product(2))
        .today(TestTransaction::sale(3, at(today(), 11, 0), dec!(50)).merchant(2))
        .today(TestTransaction::sale(4, at(today(), 12, 0), dec!(75)).merchant(3))
        .today(TestTransaction::sale(5, at(today(), 12, 30), dec!(500)).merchant(2).declined("1008"))
        .history(TestTransaction::sale(6, at(date(2024, 3, 14), 9, 0), dec!(1000)).merchant(2))
}

/// Scenario C
#[tokio::test]
async fn test_top_two_merchants() {
    let ctx = TestContext::new(estate().build(), now());

    let rows = ctx
        .facts()
        .top_bottom(
            ctx.estate_id,
            RankingDirection::Top,
            2,
            Dimension::Merchant,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].dimension_name, "A");
    assert_eq!(rows[0].sales_value, dec!(100));
    assert_eq!(rows[1].dimension_name, "C");
    assert_eq!(rows[1].sales_value, dec!(75));
    ctx.assert_all_released();
}

#[tokio::test]
async fn test_bottom_merchant() {
    let ctx = TestContext::new(estate().build(), now());

    let rows = ctx
        .facts()
        .top_bottom(
            ctx.estate_id,
            RankingDirection::Bottom,
            1,
            Dimension::Merchant,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].dimension_name, "B");
    assert_eq!(rows[0].sales_value, dec!(50));
}

#[tokio::test]
async fn test_result_count_larger_than_groups() {
    let ctx = TestContext::new(estate().build(), now());

    let rows = ctx
        .facts()
        .top_bottom(
            ctx.estate_id,
            RankingDirection::Top,
            10,
            Dimension::Operator,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].dimension_name, "Safaricom");
    assert_eq!(rows[0].sales_value, dec!(185));
    assert_eq!(rows[1].dimension_name, "Voucher");
}

#[tokio::test]
async fn test_ranking_by_product() {
    let ctx = TestContext::new(estate().build(), now());

    let rows = ctx
        .facts()
        .top_bottom(
            ctx.estate_id,
            RankingDirection::Bottom,
            5,
            Dimension::Product,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.dimension_name.as_str()).collect();
    assert_eq!(names, vec!["Voucher", "Topup"]);
}

#[tokio::test]
async fn test_zero_result_count_is_rejected() {
    let ctx = TestContext::new(estate().build(), now());

    let result = ctx
        .facts()
        .top_bottom(
            ctx.estate_id,
            RankingDirection::Top,
            0,
            Dimension::Merchant,
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(ctx.resolver.resolved(), 0);
}

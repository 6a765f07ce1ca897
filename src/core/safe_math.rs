use rust_decimal::Decimal;

/// Divide `numerator` by `denominator`, returning the numerator unchanged when
/// the denominator is zero.
///
/// Every average in the reporting responses goes through this function, so a
/// day with no sales reports an average equal to its (zero) value rather than
/// failing the request.
pub fn safe_divide(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return numerator;
    }
    numerator / denominator
}

/// Average of `value` over `count` items using [`safe_divide`].
pub fn average(value: Decimal, count: i64) -> Decimal {
    safe_divide(value, Decimal::from(count))
}

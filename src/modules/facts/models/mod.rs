mod dimension;
mod sales;
mod settlement;

pub use dimension::{
    Dimension, FeeGroupRow, RankingDirection, TopBottomData, TopBottomQuery, UnsettledFee,
    UnsettledFeeQuery,
};
pub use sales::{
    HourlySales, HourlySalesCount, HourlySalesValue, SaleOutcome, SalesQuery, SalesSummary,
    SalesTotals, TransactionSource,
};
pub use settlement::{LastSettlement, SettlementBucket, SettlementSummary, SettlementTotals};

mod search_request;
mod transaction_result;

pub use search_request::{
    PagingRequest, SearchRequest, SortDirection, SortField, SortingRequest, ValueRange,
    MAX_PAGE_SIZE,
};
pub use transaction_result::TransactionResult;

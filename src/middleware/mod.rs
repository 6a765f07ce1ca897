pub mod error_handler;
pub mod request_id;

pub use error_handler::{json_config, path_config, query_config};
pub use request_id::RequestId;

// Test helpers shared by the integration and contract tests.
//
// Usage from a test file:
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;
#![allow(dead_code)]

pub mod in_memory_read_model;

pub use in_memory_read_model::*;
pub use test_data::*;
pub use test_database::*;

pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::{FilterColumns, FilterQuery};
pub use filter_order::FilterOrder;
pub use types::*;

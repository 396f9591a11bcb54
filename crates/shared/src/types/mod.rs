//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    CURRENCY_DECIMAL_PLACES, percentage_of, round_currency, round_percentage, truncate_currency,
};
pub use pagination::{PageMeta, PageRequest, PageResponse};

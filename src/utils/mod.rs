mod maths_utils;
mod perf;
mod sync_utils;
pub mod time_utils;

pub use time_utils::{TimeUtils, format_date, parse_date};

pub(crate) use maths_utils::rmse;
pub(crate) use sync_utils::{lock, read, write};

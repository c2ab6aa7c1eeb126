//! Windowed query execution.
//!
//! A [`WindowedQuery`] runs a prepared statement one page at a time. Each
//! select asks the store for one row more than the page size; the presence of
//! that extra row is what decides whether a next window exists, so no separate
//! count query is ever needed.

mod options;
mod query;
mod state;
mod statement;

pub use self::options::{DEFAULT_LIMIT, LimitPolicy, MAX_LIMIT, WindowOptions};
pub use self::query::WindowedQuery;
pub use self::state::{WindowBounds, WindowState};
pub use self::statement::{Prepare, PreparedStatement, SelectInto};

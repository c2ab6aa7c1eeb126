//! PostgreSQL statements for windowed queries.
//!
//! [`PgClient`] implements [`Prepare`], so a window over PostgreSQL is
//! created with [`WindowedQuery::prepare`]:
//!
//! ```rust,no_run
//! use pagewise_core::{ListParams, WindowedQuery};
//! use pagewise_postgres::{PgConfig, PgStatement};
//!
//! #[derive(diesel::QueryableByName)]
//! struct Item {
//!     #[diesel(sql_type = diesel::sql_types::BigInt)]
//!     id: i64,
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PgConfig::new("postgresql://localhost/items").build()?;
//! let mut window: WindowedQuery<PgStatement> = WindowedQuery::prepare(
//!     &client,
//!     "SELECT id FROM items ORDER BY id LIMIT :limit OFFSET :offset",
//! )
//! .await?;
//!
//! let mut rows: Vec<Item> = Vec::new();
//! window.select(&mut rows, &mut ListParams::new(20, 0)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`PgClient`]: crate::PgClient
//! [`Prepare`]: pagewise_core::Prepare
//! [`WindowedQuery::prepare`]: pagewise_core::WindowedQuery::prepare

mod named;
mod pg_statement;

pub use named::{NamedStatement, positional_placeholders};
pub use pg_statement::PgStatement;

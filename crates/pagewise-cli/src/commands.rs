//! Command implementations.

use std::io::{self, Write};

use anyhow::Context;
use diesel::QueryableByName;
use diesel::sql_types::Text;
use pagewise_core::{Page, PagedQuery, WindowedQuery};
use pagewise_postgres::{PgClient, PgClientSchemaExt, PgStatement, SchemaConfig};
use serde_json::Value;

use crate::TRACING_TARGET_COMMAND;
use crate::config::{PageArgs, to_params};

/// One result row rendered by PostgreSQL as a JSON object.
#[derive(Debug, QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    row_json: String,
}

/// Wraps `query` so every row comes back as a single JSON text column.
///
/// The window placeholders stay inside the wrapped query, so the window is
/// applied before the rows are rendered.
fn wrap_query(query: &str) -> String {
    let query = query.trim().trim_end_matches(';').trim_end();
    format!("SELECT row_to_json(window_rows)::text AS row_json FROM ({query}) AS window_rows")
}

fn decode_rows(rows: Vec<JsonRow>) -> anyhow::Result<Vec<Value>> {
    rows.into_iter()
        .map(|row| serde_json::from_str(&row.row_json).context("row is not valid JSON"))
        .collect()
}

/// Runs `init-schema`.
#[tracing::instrument(skip_all, target = TRACING_TARGET_COMMAND, fields(schema = %config.schema_name))]
pub async fn init_schema(client: &PgClient, config: &SchemaConfig) -> anyhow::Result<()> {
    let result = client
        .init_schema(config)
        .await
        .with_context(|| format!("failed to initialize schema `{}`", config.schema_name))?;

    if result.is_no_op() {
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            "Schema already exists, nothing to do"
        );
    } else {
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            files = result.applied_files.len(),
            duration = ?result.duration,
            "Schema created"
        );
    }

    Ok(())
}

/// Runs `page`, printing each selected window as a JSON page document.
#[tracing::instrument(skip_all, target = TRACING_TARGET_COMMAND, fields(endpoint = %args.endpoint))]
pub async fn page(client: &PgClient, args: &PageArgs) -> anyhow::Result<()> {
    let window: WindowedQuery<PgStatement> =
        WindowedQuery::prepare(client, &wrap_query(&args.query))
            .await
            .context("failed to prepare query")?;
    let mut paged = PagedQuery::new(window.options(args.window_options()), args.endpoint.clone());
    let mut window_args = args.list_params().with_filters(to_params(&args.filters));

    let mut stdout = io::stdout();
    for index in 0..args.pages.max(1) {
        let mut rows: Vec<JsonRow> = Vec::new();
        let selected = if index == 0 {
            paged.select(&mut rows, &mut window_args).await
        } else {
            paged.select_next(&mut rows, &mut window_args).await
        };
        selected.context("failed to select window")?;

        let page: Page<Value> = paged.page(decode_rows(rows)?);
        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            page = index + 1,
            items = page.items.len(),
            has_next = page.links.next.is_some(),
            "Window selected"
        );

        serde_json::to_writer_pretty(&mut stdout, &page).context("failed to write page")?;
        writeln!(stdout).context("failed to write page")?;

        if !paged.window().has_next() {
            break;
        }
    }

    paged.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_is_wrapped_as_json_rows() {
        assert_eq!(
            wrap_query("SELECT id FROM items LIMIT :limit OFFSET :offset;\n"),
            "SELECT row_to_json(window_rows)::text AS row_json \
             FROM (SELECT id FROM items LIMIT :limit OFFSET :offset) AS window_rows"
        );
    }

    #[test]
    fn wrapped_query_keeps_window_placeholders() {
        let statement = pagewise_postgres::NamedStatement::parse(&wrap_query(
            "SELECT id FROM items WHERE status = :status LIMIT :limit OFFSET :offset",
        ));
        assert_eq!(statement.names(), ["status", "limit", "offset"]);
        assert!(statement.sql().contains("::text"));
    }

    #[test]
    fn rows_decode_to_json_values() {
        let rows = vec![
            JsonRow {
                row_json: r#"{"id":1,"title":"first"}"#.into(),
            },
            JsonRow {
                row_json: r#"{"id":2,"title":null}"#.into(),
            },
        ];

        let values = decode_rows(rows).unwrap();
        assert_eq!(
            values,
            [json!({"id": 1, "title": "first"}), json!({"id": 2, "title": null})]
        );
    }

    #[test]
    fn invalid_row_json_is_an_error() {
        let rows = vec![JsonRow {
            row_json: "not json".into(),
        }];
        assert!(decode_rows(rows).is_err());
    }
}

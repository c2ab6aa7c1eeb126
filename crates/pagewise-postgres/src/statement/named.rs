//! Named placeholder rewriting.
//!
//! Queries are written with `:name` placeholders and sent to PostgreSQL with
//! positional `$n` parameters. The scanner leaves `::` casts, string
//! literals, dollar-quoted bodies, quoted identifiers and comments untouched.

use pagewise_core::{NamedParams, ParamValue};

use crate::{PgError, PgResult};

/// A query with its named placeholders rewritten to positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedStatement {
    sql: String,
    names: Vec<String>,
}

impl NamedStatement {
    /// Rewrites every `:name` placeholder of `query` to `$n`.
    ///
    /// Placeholders are numbered in order of first appearance; a name used
    /// more than once reuses its first position.
    pub fn parse(query: &str) -> Self {
        let bytes = query.as_bytes();
        let mut sql = String::with_capacity(query.len());
        let mut names: Vec<String> = Vec::new();
        let mut copied = 0;
        let mut i = 0;

        while i < bytes.len() {
            i = match bytes[i] {
                b'\'' => skip_quoted(bytes, i, b'\'', is_escape_string(bytes, i)),
                b'"' => skip_quoted(bytes, i, b'"', false),
                b'-' if bytes.get(i + 1) == Some(&b'-') => skip_line_comment(bytes, i),
                b'/' if bytes.get(i + 1) == Some(&b'*') => skip_block_comment(bytes, i),
                b'$' => skip_dollar_quoted(bytes, i).unwrap_or(i + 1),
                b':' if bytes.get(i + 1) == Some(&b':') => i + 2,
                b':' if bytes.get(i + 1).copied().is_some_and(is_ident_start) => {
                    let end = ident_end(bytes, i + 1);
                    let name = &query[i + 1..end];
                    let position = match names.iter().position(|known| known == name) {
                        Some(index) => index + 1,
                        None => {
                            names.push(name.to_owned());
                            names.len()
                        }
                    };

                    sql.push_str(&query[copied..i]);
                    sql.push('$');
                    sql.push_str(&position.to_string());
                    copied = end;
                    end
                }
                _ => i + 1,
            };
        }

        sql.push_str(&query[copied..]);
        Self { sql, names }
    }

    /// Returns the rewritten query text.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the placeholder names, indexed by position minus one.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of positional parameters.
    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.names.len()
    }

    /// Returns whether the statement uses the named placeholder.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    /// Orders `params` by position.
    ///
    /// Arguments without a placeholder are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::MissingParameter`] for the first placeholder
    /// without a value.
    pub fn bind<'a>(&self, params: &'a NamedParams) -> PgResult<Vec<&'a ParamValue>> {
        self.names
            .iter()
            .map(|name| {
                params
                    .get(name)
                    .ok_or_else(|| PgError::MissingParameter(name.clone()))
            })
            .collect()
    }
}

/// Returns `count` positional placeholders starting at `$first`.
///
/// Useful for expanding a list argument into an `IN (...)` clause.
pub fn positional_placeholders(first: usize, count: usize) -> Vec<String> {
    (first..first + count).map(|n| format!("${n}")).collect()
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&byte| !is_ident_char(byte))
        .map_or(bytes.len(), |offset| start + offset)
}

/// `E'...'` literals honour backslash escapes.
fn is_escape_string(bytes: &[u8], quote: usize) -> bool {
    quote > 0
        && matches!(bytes[quote - 1], b'E' | b'e')
        && (quote < 2 || !is_ident_char(bytes[quote - 2]))
}

fn skip_quoted(bytes: &[u8], start: usize, quote: u8, backslash: bool) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if backslash => i += 2,
            byte if byte == quote => {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                } else {
                    return i + 1;
                }
            }
            _ => i += 1,
        }
    }

    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 1;
    let mut i = start + 2;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"/*") {
            depth += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"*/") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }

    bytes.len()
}

/// Skips a `$tag$ ... $tag$` body, or returns `None` if `start` does not
/// open one (for example a positional `$1`).
fn skip_dollar_quoted(bytes: &[u8], start: usize) -> Option<usize> {
    let tag_end = match bytes.get(start + 1) {
        Some(b'$') => start + 1,
        Some(&byte) if is_ident_start(byte) => {
            let end = ident_end(bytes, start + 1);
            (bytes.get(end) == Some(&b'$')).then_some(end)?
        }
        _ => return None,
    };

    let tag = &bytes[start..=tag_end];
    let body = tag_end + 1;
    let close = bytes[body..]
        .windows(tag.len())
        .position(|window| window == tag)
        .map_or(bytes.len(), |offset| body + offset + tag.len());

    Some(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_placeholders_in_order() {
        let statement = NamedStatement::parse(
            "SELECT * FROM items WHERE status = :status LIMIT :limit OFFSET :offset",
        );

        assert_eq!(
            statement.sql(),
            "SELECT * FROM items WHERE status = $1 LIMIT $2 OFFSET $3"
        );
        assert_eq!(statement.names(), ["status", "limit", "offset"]);
        assert_eq!(statement.parameter_count(), 3);
    }

    #[test]
    fn repeated_names_share_a_position() {
        let statement =
            NamedStatement::parse("SELECT * FROM t WHERE a = :v OR b = :v LIMIT :limit");
        assert_eq!(statement.sql(), "SELECT * FROM t WHERE a = $1 OR b = $1 LIMIT $2");
        assert_eq!(statement.names(), ["v", "limit"]);
    }

    #[test]
    fn casts_are_not_placeholders() {
        let statement = NamedStatement::parse("SELECT :id::bigint, created_at::date FROM t");
        assert_eq!(statement.sql(), "SELECT $1::bigint, created_at::date FROM t");
        assert_eq!(statement.names(), ["id"]);
    }

    #[test]
    fn literals_and_identifiers_are_untouched() {
        let statement = NamedStatement::parse(
            r#"SELECT 'a :b', E'it\'s :c', "col:d", 'x'':y' FROM t WHERE v = :v"#,
        );
        assert_eq!(
            statement.sql(),
            r#"SELECT 'a :b', E'it\'s :c', "col:d", 'x'':y' FROM t WHERE v = $1"#
        );
        assert_eq!(statement.names(), ["v"]);
    }

    #[test]
    fn comments_are_untouched() {
        let statement = NamedStatement::parse(
            "SELECT 1 -- :skipped\nFROM t /* :also /* nested :x */ skipped */ WHERE a = :a",
        );
        assert_eq!(
            statement.sql(),
            "SELECT 1 -- :skipped\nFROM t /* :also /* nested :x */ skipped */ WHERE a = $1"
        );
        assert_eq!(statement.names(), ["a"]);
    }

    #[test]
    fn dollar_quoted_bodies_are_untouched() {
        let statement =
            NamedStatement::parse("SELECT $tag$ :inside $tag$, $$ :also $$, :outside");
        assert_eq!(
            statement.sql(),
            "SELECT $tag$ :inside $tag$, $$ :also $$, $1"
        );
        assert_eq!(statement.names(), ["outside"]);
    }

    #[test]
    fn non_identifier_colons_are_kept() {
        let statement = NamedStatement::parse("SELECT arr[1:2], :_x1 FROM t");
        assert_eq!(statement.sql(), "SELECT arr[1:2], $1 FROM t");
        assert!(statement.contains("_x1"));
    }

    #[test]
    fn unterminated_literal_is_copied_verbatim() {
        let statement = NamedStatement::parse("SELECT ':open");
        assert_eq!(statement.sql(), "SELECT ':open");
        assert_eq!(statement.parameter_count(), 0);
    }

    #[test]
    fn non_ascii_text_survives() {
        let statement = NamedStatement::parse("SELECT 'ünïcødé' AS ñ WHERE x = :x");
        assert_eq!(statement.sql(), "SELECT 'ünïcødé' AS ñ WHERE x = $1");
    }

    #[test]
    fn bind_orders_values_by_position() {
        let statement = NamedStatement::parse("SELECT :b, :a, :b");
        let params = NamedParams::new().with("a", 1).with("b", "two").with("unused", true);

        let values = statement.bind(&params).unwrap();
        assert_eq!(values, [&ParamValue::from("two"), &ParamValue::Int(1)]);
    }

    #[test]
    fn bind_reports_missing_parameter() {
        let statement = NamedStatement::parse("SELECT * FROM t WHERE status = :status");
        let error = statement.bind(&NamedParams::new()).unwrap_err();
        assert!(matches!(error, PgError::MissingParameter(name) if name == "status"));
    }

    #[test]
    fn positional_placeholder_list() {
        assert_eq!(positional_placeholders(3, 3), ["$3", "$4", "$5"]);
        assert!(positional_placeholders(1, 0).is_empty());
    }
}

use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a schema initialization.
///
/// # Example
///
/// ```rust
/// use pagewise_postgres::SchemaInitResult;
/// use std::time::Duration;
///
/// let result = SchemaInitResult::existing("app", Duration::from_millis(3));
/// assert!(result.is_no_op());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInitResult {
    /// Name of the schema.
    pub schema_name: String,
    /// Whether the schema was created by this run.
    pub created: bool,
    /// Files replayed, in order.
    pub applied_files: Vec<PathBuf>,
    /// Total duration of the run.
    pub duration: Duration,
}

impl SchemaInitResult {
    /// The schema already existed and nothing was replayed.
    pub fn existing(schema_name: impl Into<String>, duration: Duration) -> Self {
        Self {
            schema_name: schema_name.into(),
            created: false,
            applied_files: Vec::new(),
            duration,
        }
    }

    /// The schema was created and `applied_files` were replayed.
    pub fn created(
        schema_name: impl Into<String>,
        applied_files: Vec<PathBuf>,
        duration: Duration,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            created: true,
            applied_files,
            duration,
        }
    }

    /// Returns whether the run left the database untouched.
    pub fn is_no_op(&self) -> bool {
        !self.created
    }

    /// Returns the last replayed file, if any.
    pub fn last_applied_file(&self) -> Option<&PathBuf> {
        self.applied_files.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_result() {
        let result = SchemaInitResult::created(
            "app",
            vec![PathBuf::from("sql/a.sql"), PathBuf::from("sql/b.sql")],
            Duration::from_millis(12),
        );

        assert!(!result.is_no_op());
        assert_eq!(result.last_applied_file(), Some(&PathBuf::from("sql/b.sql")));
    }

    #[test]
    fn created_without_files_is_not_a_no_op() {
        let result = SchemaInitResult::created("app", Vec::new(), Duration::ZERO);
        assert!(!result.is_no_op());
        assert_eq!(result.last_applied_file(), None);
    }
}

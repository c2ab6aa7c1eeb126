use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{PgError, PgResult, TRACING_TARGET_SCHEMA};

/// Extension of the files replayed during schema initialization.
const SQL_EXTENSION: &str = "sql";

/// Where a schema lives and which SQL files create it.
///
/// With an explicit file list the files are replayed in the given order,
/// relative to [`schema_dir`]. Without one every `*.sql` file below
/// [`schema_dir`] is replayed, in lexical path order.
///
/// [`schema_dir`]: SchemaConfig::schema_dir
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SchemaConfig {
    /// Name of the schema to initialize
    #[cfg_attr(feature = "config", arg(long = "schema-name", env = "POSTGRES_SCHEMA"))]
    pub schema_name: String,

    /// Directory holding the schema SQL files
    #[cfg_attr(
        feature = "config",
        arg(long = "schema-dir", env = "POSTGRES_SCHEMA_DIR", default_value = "sql")
    )]
    pub schema_dir: PathBuf,

    /// Ordered SQL files relative to the schema directory (optional)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "schema-file",
            env = "POSTGRES_SCHEMA_FILES",
            value_delimiter = ','
        )
    )]
    #[serde(default)]
    pub schema_files: Vec<PathBuf>,
}

impl SchemaConfig {
    /// Creates a configuration replaying every SQL file under `schema_dir`.
    pub fn new(schema_name: impl Into<String>, schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_dir: schema_dir.into(),
            schema_files: Vec::new(),
        }
    }

    /// Replays exactly these files, in this order, instead of walking the directory.
    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.schema_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> PgResult<()> {
        if self.schema_name.trim().is_empty() {
            return Err(PgError::Config("schema_name cannot be empty".to_string()));
        }

        if self.schema_name.contains('\0') {
            return Err(PgError::Config(
                "schema_name cannot contain NUL characters".to_string(),
            ));
        }

        if let Some(path) = self.schema_files.iter().find(|path| path.is_absolute()) {
            return Err(PgError::Config(format!(
                "schema file `{}` must be relative to the schema directory",
                path.display()
            )));
        }

        Ok(())
    }

    /// Returns the schema name quoted as an SQL identifier.
    pub fn quoted_schema_name(&self) -> String {
        format!("\"{}\"", self.schema_name.replace('"', "\"\""))
    }

    /// Returns the files to replay, in replay order.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Schema`] if the schema directory cannot be walked.
    pub async fn resolve_files(&self) -> PgResult<Vec<PathBuf>> {
        if !self.schema_files.is_empty() {
            return Ok(self
                .schema_files
                .iter()
                .map(|file| self.schema_dir.join(file))
                .collect());
        }

        collect_sql_files(&self.schema_dir).await
    }
}

/// Collects every `*.sql` file below `dir`, sorted by path.
pub async fn collect_sql_files(dir: &Path) -> PgResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| PgError::schema(&current, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PgError::schema(&current, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PgError::schema(&path, e))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == SQL_EXTENSION) {
                files.push(path);
            }
        }
    }

    files.sort();
    tracing::debug!(
        target: TRACING_TARGET_SCHEMA,
        dir = %dir.display(),
        files = files.len(),
        "Collected schema files"
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "SELECT 1;").unwrap();
    }

    #[tokio::test]
    async fn walk_collects_sql_files_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.sql");
        touch(dir.path(), "a.sql");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "sub/c.sql");
        touch(dir.path(), "0_base/types.sql");
        touch(dir.path(), "sub/deeper/d.sql");

        let files = collect_sql_files(dir.path()).await.unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            [
                PathBuf::from("0_base/types.sql"),
                PathBuf::from("a.sql"),
                PathBuf::from("b.sql"),
                PathBuf::from("sub/c.sql"),
                PathBuf::from("sub/deeper/d.sql"),
            ]
        );
    }

    #[tokio::test]
    async fn explicit_files_keep_their_order() {
        let config = SchemaConfig::new("app", "/srv/sql").with_files(["02_items.sql", "01_base.sql"]);

        let files = config.resolve_files().await.unwrap();
        assert_eq!(
            files,
            [
                PathBuf::from("/srv/sql/02_items.sql"),
                PathBuf::from("/srv/sql/01_base.sql"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_directory_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let error = collect_sql_files(&missing).await.unwrap_err();
        assert!(matches!(error, PgError::Schema { ref path, .. } if *path == missing));
    }

    #[test]
    fn validation() {
        assert!(SchemaConfig::new("app", "sql").validate().is_ok());
        assert!(SchemaConfig::new("  ", "sql").validate().is_err());
        assert!(
            SchemaConfig::new("app", "sql")
                .with_files(["/etc/passwd"])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn schema_name_is_quoted() {
        assert_eq!(SchemaConfig::new("app", "sql").quoted_schema_name(), "\"app\"");
        assert_eq!(
            SchemaConfig::new("we\"ird", "sql").quoted_schema_name(),
            "\"we\"\"ird\""
        );
    }
}

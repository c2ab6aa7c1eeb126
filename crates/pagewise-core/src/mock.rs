//! In-memory statement used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::args::{NamedParams, ParamKeys};
use crate::window::{Prepare, PreparedStatement, SelectInto};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MockError(String);

impl MockError {
    pub fn new(message: &str) -> Self {
        Self(message.to_owned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Serves `LIMIT :limit OFFSET :offset` over a fixed vector of rows.
#[derive(Debug)]
pub struct MemoryStatement<T> {
    query: String,
    rows: Vec<T>,
    keys: ParamKeys,
    executions: Counter,
    closes: Counter,
    last_params: Mutex<Option<NamedParams>>,
    failure: Mutex<Option<MockError>>,
}

impl<T> MemoryStatement<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            query: String::new(),
            rows,
            keys: ParamKeys::default(),
            executions: Counter::default(),
            closes: Counter::default(),
            last_params: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    pub fn with_keys(mut self, keys: ParamKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn executions(&self) -> usize {
        self.executions.get()
    }

    pub fn close_counter(&self) -> Counter {
        self.closes.clone()
    }

    pub fn last_params(&self) -> Option<NamedParams> {
        self.last_params.lock().unwrap().clone()
    }

    pub fn fail_next(&self, error: MockError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    fn param(params: &NamedParams, name: &str) -> Result<usize, MockError> {
        params
            .get(name)
            .and_then(|value| value.as_int())
            .map(|value| value.max(0) as usize)
            .ok_or_else(|| MockError(format!("missing integer parameter `{name}`")))
    }
}

impl<T> PreparedStatement for MemoryStatement<T> {
    type Error = MockError;

    fn close(&mut self) {
        self.closes.bump();
    }
}

impl<T> SelectInto<T> for MemoryStatement<T>
where
    T: Clone + Send + Sync,
{
    async fn select_into(
        &mut self,
        rows: &mut Vec<T>,
        params: &NamedParams,
    ) -> Result<(), MockError> {
        self.executions.bump();
        *self.last_params.lock().unwrap() = Some(params.clone());

        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }

        let limit = Self::param(params, &self.keys.limit)?;
        let offset = Self::param(params, &self.keys.offset)?;
        rows.extend(self.rows.iter().skip(offset).take(limit).cloned());
        Ok(())
    }
}

/// Hands out [`MemoryStatement`]s over a fixed set of rows.
pub struct MemoryPreparer<T> {
    rows: Vec<T>,
}

impl<T> MemoryPreparer<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }
}

impl<T> Prepare for MemoryPreparer<T>
where
    T: Clone + Send + Sync,
{
    type Statement = MemoryStatement<T>;

    async fn prepare(&self, query: &str) -> Result<MemoryStatement<T>, MockError> {
        let mut statement = MemoryStatement::new(self.rows.clone());
        statement.query = query.to_owned();
        Ok(statement)
    }
}

//! Row store — rows materialized by `open`.

use crate::variant::Variant;
use ahash::AHashMap;
use std::sync::Arc;

/// Upper-cased column names of one result set, shared by all its rows.
#[derive(Debug, Clone, Default)]
pub struct RowColumns {
    names: Vec<String>,
    index: AHashMap<String, usize>,
}

impl RowColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_uppercase())
            .collect();
        let mut index = AHashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.insert(name.clone(), i);
        }
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a column; `name` is matched case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index
            .get(name)
            .or_else(|| self.index.get(&name.to_uppercase()))
            .copied()
    }
}

/// One immutable result row: upper-cased column name → value.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<RowColumns>,
    values: Vec<Variant>,
}

impl Row {
    /// Missing trailing values are filled with null.
    pub fn new(columns: Arc<RowColumns>, mut values: Vec<Variant>) -> Self {
        if values.len() < columns.len() {
            values.resize(columns.len(), Variant::Null);
        }
        Self { columns, values }
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.columns.position(name).and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&Variant> {
        self.values.get(index)
    }

    pub fn columns(&self) -> &RowColumns {
        &self.columns
    }

    pub fn values(&self) -> &[Variant] {
        &self.values
    }

    /// `(column, value)` pairs in result-set order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl From<Vec<Row>> for RowStore {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

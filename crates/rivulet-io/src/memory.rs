//! In-memory backend for testing.
//!
//! Collections live in a HashMap; cursors count themselves so leak tests can
//! assert that every open cursor was dropped by a close cascade.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rivulet_core::backend::{Backend, QueryRequest, RecordCursor};
use rivulet_core::error::{Error, Result};
use rivulet_core::sort;
use rivulet_core::tuple::Tuple;

use crate::query;

/// Thread-safe in-memory record store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    collections: Arc<Mutex<HashMap<String, Vec<Tuple>>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a collection (used by tests).
    pub fn insert(&self, collection: impl Into<String>, records: Vec<Tuple>) {
        let mut data = self.collections.lock().unwrap();
        data.entry(collection.into()).or_default().extend(records);
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.collections.lock().unwrap().contains_key(collection)
    }

    /// Cursors currently open against this backend. Zero means every stream
    /// that opened one has been closed (or never opened).
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.collections.lock().unwrap().clear();
    }
}

impl Backend for MemoryBackend {
    fn open_cursor(&self, request: &QueryRequest) -> Result<Box<dyn RecordCursor>> {
        let data = self.collections.lock().unwrap();
        let records = data
            .get(&request.collection)
            .ok_or_else(|| Error::Backend(format!("collection not found: {}", request.collection)))?;

        let mut selected = Vec::new();
        for record in records {
            if query::matches(&request.query, record).map_err(Error::Backend)? {
                selected.push(project(record, &request.fields));
            }
        }
        if !request.sort.is_empty() {
            selected.sort_by(|a, b| sort::compare(&request.sort, a, b));
        }

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            records: selected.into_iter(),
            open_cursors: Arc::clone(&self.open_cursors),
        }))
    }
}

fn project(record: &Tuple, fields: &[String]) -> Tuple {
    if fields.is_empty() {
        return record.clone();
    }
    let mut out = Tuple::new();
    for field in fields {
        if let Some(value) = record.get(field) {
            out.set(field.clone(), value.clone());
        }
    }
    out
}

struct MemoryCursor {
    records: std::vec::IntoIter<Tuple>,
    open_cursors: Arc<AtomicUsize>,
}

impl RecordCursor for MemoryCursor {
    fn next_record(&mut self) -> Result<Option<Tuple>> {
        Ok(self.records.next())
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

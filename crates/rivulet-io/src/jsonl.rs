//! JSONL file backend: one `<root>/<collection>.jsonl` file per collection.
//!
//! Meant for local runs and fixtures, not production storage. The whole file
//! is filtered and sorted at open; the cursor then streams the survivors.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use rivulet_core::backend::{Backend, QueryRequest, RecordCursor};
use rivulet_core::error::{Error, Result};
use rivulet_core::sort;
use rivulet_core::tuple::Tuple;

use crate::query;

pub struct JsonlBackend {
    root: PathBuf,
}

impl JsonlBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.jsonl"))
    }
}

impl Backend for JsonlBackend {
    fn open_cursor(&self, request: &QueryRequest) -> Result<Box<dyn RecordCursor>> {
        let path = self.collection_path(&request.collection);
        let file = File::open(&path)
            .map_err(|e| Error::Backend(format!("open {}: {e}", path.display())))?;

        let mut selected = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| Error::Backend(format!("read {}: {e}", path.display())))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Tuple = serde_json::from_str(&line).map_err(|e| {
                Error::Backend(format!("{}:{}: {e}", path.display(), lineno + 1))
            })?;
            if query::matches(&request.query, &record).map_err(Error::Backend)? {
                selected.push(project(&record, &request.fields));
            }
        }
        if !request.sort.is_empty() {
            selected.sort_by(|a, b| sort::compare(&request.sort, a, b));
        }

        Ok(Box::new(JsonlCursor {
            records: selected.into_iter(),
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

struct JsonlCursor {
    records: std::vec::IntoIter<Tuple>,
}

impl RecordCursor for JsonlCursor {
    fn next_record(&mut self) -> Result<Option<Tuple>> {
        Ok(self.records.next())
    }
}

//! Source stream that pulls records from the backend.

use rivulet_core::backend::{QueryRequest, RecordCursor};
use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::sort::SortKey;
use rivulet_core::tuple::Tuple;

use crate::traits::TupleStream;

pub struct SearchStream {
    collection: String,
    query: String,
    fields: Vec<String>,
    sort: Vec<SortKey>,
    cursor: Option<Box<dyn RecordCursor>>,
}

impl SearchStream {
    pub fn new(
        collection: String,
        query: String,
        fields: Vec<String>,
        sort: Vec<SortKey>,
    ) -> Self {
        Self {
            collection,
            query,
            fields,
            sort,
            cursor: None,
        }
    }
}

impl TupleStream for SearchStream {
    fn name(&self) -> &'static str {
        "search"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        let request = QueryRequest {
            collection: self.collection.clone(),
            query: self.query.clone(),
            fields: self.fields.clone(),
            sort: self.sort.clone(),
        };
        self.cursor = Some(ctx.backend.open_cursor(&request)?);
        tracing::trace!(collection = %self.collection, query = %self.query, "opened search cursor");
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_record().map_err(|e| match e {
                Error::Backend(msg) => Error::stream("search", msg),
                other => other,
            }),
            None => Err(Error::stream("search", "read before open")),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.cursor.take().is_some() {
            tracing::trace!(collection = %self.collection, "closed search cursor");
        }
        Ok(())
    }

    fn sort_order(&self) -> &[SortKey] {
        &self.sort
    }
}

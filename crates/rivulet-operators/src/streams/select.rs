//! Decorator that projects/renames fields and applies record operations.
//!
//! `select(search(...), "id", "name as n", replace(flag, with=false))`

use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::Tuple;

use crate::traits::{Accumulator, Reduced, TupleStream};

/// One projection: a field, optionally renamed (`"name as n"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub field: String,
    pub alias: Option<String>,
}

impl Selection {
    /// Parse `"field"` or `"field as alias"`. Errors are plain strings;
    /// callers wrap them with the operator name they belong to.
    pub fn parse(spec: &str) -> std::result::Result<Selection, String> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err("empty selection".to_string());
        }
        match spec.split_once(" as ") {
            None => Ok(Selection {
                field: spec.to_string(),
                alias: None,
            }),
            Some((field, alias)) => {
                let field = field.trim();
                let alias = alias.trim();
                if field.is_empty() || alias.is_empty() {
                    return Err(format!("unparseable selection '{spec}'"));
                }
                Ok(Selection {
                    field: field.to_string(),
                    alias: Some(alias.to_string()),
                })
            }
        }
    }
}

pub struct SelectStream {
    child: Box<dyn TupleStream>,
    selections: Vec<Selection>,
    operations: Vec<Box<dyn Accumulator>>,
}

impl SelectStream {
    pub fn new(
        child: Box<dyn TupleStream>,
        selections: Vec<Selection>,
        operations: Vec<Box<dyn Accumulator>>,
    ) -> Self {
        Self {
            child,
            selections,
            operations,
        }
    }

    fn transform(&mut self, mut record: Tuple) -> Result<Tuple> {
        for op in &mut self.operations {
            op.reset();
            op.update(&record)?;
            match op.result()? {
                Reduced::Record(next) => record = next,
                Reduced::Value(_) => {
                    return Err(Error::stream(
                        "select",
                        format!("operation '{}' did not produce a record", op.label()),
                    ))
                }
            }
        }
        if self.selections.is_empty() {
            return Ok(record);
        }
        let mut out = Tuple::new();
        for sel in &self.selections {
            if let Some(value) = record.get(&sel.field) {
                let name = sel.alias.as_ref().unwrap_or(&sel.field);
                out.set(name.clone(), value.clone());
            }
        }
        Ok(out)
    }
}

impl TupleStream for SelectStream {
    fn name(&self) -> &'static str {
        "select"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.child.open(ctx)
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        let record = match self.child.read() {
            Ok(Some(t)) => t,
            Ok(None) => return Ok(None),
            Err(e) => {
                let _ = self.child.close();
                return Err(e);
            }
        };
        match self.transform(record) {
            Ok(t) => Ok(Some(t)),
            Err(e) => {
                let _ = self.child.close();
                Err(e)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }
}

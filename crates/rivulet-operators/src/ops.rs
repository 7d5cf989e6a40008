//! Record operations: accumulators that transform the record they were fed.
//! Used by `select` one record at a time (reset, update, result).

use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::{Accumulator, Reduced};

/// Fills a null or missing field with a replacement value:
/// `replace(flag, with=false)`.
pub struct ReplaceOperation {
    field: String,
    with: Scalar,
    out: Option<Tuple>,
}

impl ReplaceOperation {
    pub fn new(field: String, with: Scalar) -> Self {
        Self {
            field,
            with,
            out: None,
        }
    }
}

impl Accumulator for ReplaceOperation {
    fn label(&self) -> String {
        format!("replace({})", self.field)
    }

    fn update(&mut self, tuple: &Tuple) -> Result<()> {
        let mut record = tuple.clone();
        if record.value_of(&self.field).is_null() {
            record.set(self.field.clone(), self.with.clone());
        }
        self.out = Some(record);
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        match &self.out {
            Some(record) => Ok(Reduced::Record(record.clone())),
            None => Err(Error::stream(
                "replace",
                "result requested before any record",
            )),
        }
    }

    fn reset(&mut self) {
        self.out = None;
    }
}

/// Joins field values into a new field:
/// `concat(fields="first,last", delim=" ", as=full)`.
pub struct ConcatOperation {
    fields: Vec<String>,
    delim: String,
    as_field: String,
    out: Option<Tuple>,
}

impl ConcatOperation {
    pub fn new(fields: Vec<String>, delim: String, as_field: String) -> Self {
        Self {
            fields,
            delim,
            as_field,
            out: None,
        }
    }
}

impl Accumulator for ConcatOperation {
    fn label(&self) -> String {
        format!("concat({})", self.as_field)
    }

    fn update(&mut self, tuple: &Tuple) -> Result<()> {
        let joined = self
            .fields
            .iter()
            .map(|f| tuple.value_of(f).to_string())
            .collect::<Vec<_>>()
            .join(&self.delim);
        let mut record = tuple.clone();
        record.set(self.as_field.clone(), Scalar::Str(joined));
        self.out = Some(record);
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        match &self.out {
            Some(record) => Ok(Reduced::Record(record.clone())),
            None => Err(Error::stream(
                "concat",
                "result requested before any record",
            )),
        }
    }

    fn reset(&mut self) {
        self.out = None;
    }
}

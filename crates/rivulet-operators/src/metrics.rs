//! Metric accumulators: summarize a record sequence to one value.
//!
//! Non-numeric and missing field values are skipped rather than failing the
//! whole group; a group with no usable values summarizes to null.

use rivulet_core::error::Result;
use rivulet_core::tuple::{scalar_cmp, Scalar, Tuple};

use crate::traits::{Accumulator, Reduced};

pub struct MinMetric {
    field: String,
    min: Option<Scalar>,
}

impl MinMetric {
    pub fn new(field: String) -> Self {
        Self { field, min: None }
    }
}

impl Accumulator for MinMetric {
    fn label(&self) -> String {
        format!("min({})", self.field)
    }

    fn update(&mut self, tuple: &Tuple) -> Result<()> {
        let v = tuple.value_of(&self.field);
        if v.as_f64().is_none() {
            return Ok(());
        }
        let smaller = match &self.min {
            None => true,
            Some(cur) => scalar_cmp(&v, cur) == std::cmp::Ordering::Less,
        };
        if smaller {
            self.min = Some(v);
        }
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        Ok(Reduced::Value(self.min.clone().unwrap_or(Scalar::Null)))
    }

    fn reset(&mut self) {
        self.min = None;
    }
}

pub struct MaxMetric {
    field: String,
    max: Option<Scalar>,
}

impl MaxMetric {
    pub fn new(field: String) -> Self {
        Self { field, max: None }
    }
}

impl Accumulator for MaxMetric {
    fn label(&self) -> String {
        format!("max({})", self.field)
    }

    fn update(&mut self, tuple: &Tuple) -> Result<()> {
        let v = tuple.value_of(&self.field);
        if v.as_f64().is_none() {
            return Ok(());
        }
        let larger = match &self.max {
            None => true,
            Some(cur) => scalar_cmp(&v, cur) == std::cmp::Ordering::Greater,
        };
        if larger {
            self.max = Some(v);
        }
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        Ok(Reduced::Value(self.max.clone().unwrap_or(Scalar::Null)))
    }

    fn reset(&mut self) {
        self.max = None;
    }
}

pub struct SumMetric {
    field: String,
    sum: f64,
    all_ints: bool,
    seen: bool,
}

impl SumMetric {
    pub fn new(field: String) -> Self {
        Self {
            field,
            sum: 0.0,
            all_ints: true,
            seen: false,
        }
    }
}

impl Accumulator for SumMetric {
    fn label(&self) -> String {
        format!("sum({})", self.field)
    }

    fn update(&mut self, tuple: &Tuple) -> Result<()> {
        match tuple.value_of(&self.field) {
            Scalar::I64(i) => {
                self.sum += i as f64;
                self.seen = true;
            }
            Scalar::F64(f) => {
                self.sum += f;
                self.all_ints = false;
                self.seen = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        let v = if !self.seen {
            Scalar::Null
        } else if self.all_ints {
            Scalar::I64(self.sum as i64)
        } else {
            Scalar::F64(self.sum)
        };
        Ok(Reduced::Value(v))
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.all_ints = true;
        self.seen = false;
    }
}

pub struct MeanMetric {
    field: String,
    sum: f64,
    count: u64,
}

impl MeanMetric {
    pub fn new(field: String) -> Self {
        Self {
            field,
            sum: 0.0,
            count: 0,
        }
    }
}

impl Accumulator for MeanMetric {
    fn label(&self) -> String {
        format!("avg({})", self.field)
    }

    fn update(&mut self, tuple: &Tuple) -> Result<()> {
        if let Some(v) = tuple.value_of(&self.field).as_f64() {
            self.sum += v;
            self.count += 1;
        }
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        let v = if self.count == 0 {
            Scalar::Null
        } else {
            Scalar::F64(self.sum / self.count as f64)
        };
        Ok(Reduced::Value(v))
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}

pub struct CountMetric {
    count: u64,
}

impl CountMetric {
    pub fn new() -> Self {
        Self { count: 0 }
    }
}

impl Default for CountMetric {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for CountMetric {
    fn label(&self) -> String {
        "count(*)".to_string()
    }

    fn update(&mut self, _tuple: &Tuple) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn result(&self) -> Result<Reduced> {
        Ok(Reduced::Value(Scalar::I64(self.count as i64)))
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

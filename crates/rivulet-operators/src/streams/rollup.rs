//! Decorator that groups a sorted stream by `over` fields and emits one
//! summary record per group, computed by its accumulators.
//!
//! Requires input sorted by the `over` fields; accumulators are reset at
//! every group boundary so one instance serves the whole stream.

use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::{scalar_cmp, Scalar, Tuple};

use crate::traits::{Accumulator, Reduced, TupleStream};

pub struct RollupStream {
    child: Box<dyn TupleStream>,
    over: Vec<String>,
    metrics: Vec<Box<dyn Accumulator>>,
    current_key: Option<Vec<Scalar>>,
    exhausted: bool,
}

impl RollupStream {
    pub fn new(
        child: Box<dyn TupleStream>,
        over: Vec<String>,
        metrics: Vec<Box<dyn Accumulator>>,
    ) -> Self {
        Self {
            child,
            over,
            metrics,
            current_key: None,
            exhausted: false,
        }
    }

    fn group_key(&self, record: &Tuple) -> Vec<Scalar> {
        self.over.iter().map(|f| record.value_of(f)).collect()
    }

    fn same_key(a: &[Scalar], b: &[Scalar]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| scalar_cmp(x, y) == std::cmp::Ordering::Equal)
    }

    /// Summary record for the group that just ended.
    fn flush(&mut self, key: Vec<Scalar>) -> Result<Tuple> {
        let mut out = Tuple::new();
        for (field, value) in self.over.iter().zip(key) {
            out.set(field.clone(), value);
        }
        for metric in &self.metrics {
            match metric.result()? {
                Reduced::Value(v) => out.set(metric.label(), v),
                Reduced::Record(_) => {
                    return Err(Error::stream(
                        "rollup",
                        format!("'{}' did not produce a summary value", metric.label()),
                    ))
                }
            }
        }
        for metric in &mut self.metrics {
            metric.reset();
        }
        Ok(out)
    }
}

impl TupleStream for RollupStream {
    fn name(&self) -> &'static str {
        "rollup"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.current_key = None;
        self.exhausted = false;
        for metric in &mut self.metrics {
            metric.reset();
        }
        self.child.open(ctx)
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let record = match self.child.read() {
                Ok(Some(t)) => t,
                Ok(None) => {
                    self.exhausted = true;
                    match self.current_key.take() {
                        Some(key) => return self.flush(key).map(Some),
                        None => return Ok(None),
                    }
                }
                Err(e) => {
                    let _ = self.child.close();
                    return Err(e);
                }
            };

            let key = self.group_key(&record);
            let boundary = match &self.current_key {
                Some(current) => !Self::same_key(current, &key),
                None => false,
            };

            if boundary {
                let finished = self
                    .current_key
                    .replace(key)
                    .expect("boundary implies a current group");
                let out = self.flush(finished)?;
                for metric in &mut self.metrics {
                    metric.update(&record)?;
                }
                return Ok(Some(out));
            }

            if self.current_key.is_none() {
                self.current_key = Some(key);
            }
            for metric in &mut self.metrics {
                metric.update(&record)?;
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.current_key = None;
        self.exhausted = true;
        self.child.close()
    }
}

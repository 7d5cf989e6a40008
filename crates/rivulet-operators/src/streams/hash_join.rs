//! Hash join decorator: fully reads the right (hashed) side into a table at
//! open, then streams the left side, emitting one merged record per match.

use std::collections::{HashMap, VecDeque};

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::hash::key_hash;
use rivulet_core::sort::SortKey;
use rivulet_core::tuple::Tuple;

use crate::traits::TupleStream;

pub struct HashJoinStream {
    left: Box<dyn TupleStream>,
    right: Box<dyn TupleStream>,
    left_keys: Vec<String>,
    right_keys: Vec<String>,
    table: HashMap<u64, Vec<Tuple>>,
    pending: VecDeque<Tuple>,
}

impl HashJoinStream {
    /// `on` pairs are (left field, right field).
    pub fn new(
        left: Box<dyn TupleStream>,
        right: Box<dyn TupleStream>,
        on: Vec<(String, String)>,
    ) -> Self {
        let (left_keys, right_keys) = on.into_iter().unzip();
        Self {
            left,
            right,
            left_keys,
            right_keys,
            table: HashMap::new(),
            pending: VecDeque::new(),
        }
    }
}

impl TupleStream for HashJoinStream {
    fn name(&self) -> &'static str {
        "hashJoin"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.table.clear();
        self.pending.clear();

        self.left.open(ctx)?;
        if let Err(e) = self.right.open(ctx) {
            let _ = self.left.close();
            return Err(e);
        }

        // Drain the hashed side eagerly; it is closed again below so a later
        // close on this stream only has the left side still open.
        loop {
            match self.right.read() {
                Ok(Some(t)) => {
                    let key = key_hash(&t, &self.right_keys);
                    self.table.entry(key).or_default().push(t);
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = self.left.close();
                    let _ = self.right.close();
                    return Err(e);
                }
            }
        }
        self.right.close()?;
        tracing::trace!(buckets = self.table.len(), "hash side loaded");
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        loop {
            if let Some(t) = self.pending.pop_front() {
                return Ok(Some(t));
            }
            let record = match self.left.read() {
                Ok(Some(t)) => t,
                Ok(None) => return Ok(None),
                Err(e) => {
                    let _ = self.left.close();
                    return Err(e);
                }
            };
            let key = key_hash(&record, &self.left_keys);
            if let Some(matches) = self.table.get(&key) {
                for right in matches {
                    let mut out = record.clone();
                    out.merge_suffixed(right);
                    self.pending.push_back(out);
                }
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.table.clear();
        self.pending.clear();
        let left = self.left.close();
        let right = self.right.close();
        left.and(right)
    }

    fn sort_order(&self) -> &[SortKey] {
        self.left.sort_order()
    }
}

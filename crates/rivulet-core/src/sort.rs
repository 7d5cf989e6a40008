//! Sort-key specs ("score desc, id asc") and tuple comparators.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::tuple::{scalar_cmp, Tuple};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Parse a comma-separated sort spec: `"score desc, id asc"`.
///
/// A key without a direction defaults to ascending. Errors are plain strings;
/// callers wrap them with the operator name they belong to.
pub fn parse_sort_spec(spec: &str) -> Result<Vec<SortKey>, String> {
    let mut keys = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(format!("empty sort key in '{spec}'"));
        }
        let mut words = part.split_whitespace();
        let field = words.next().expect("split_whitespace on non-empty str");
        let order = match words.next() {
            None => SortOrder::Asc,
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => return Err(format!("unknown sort direction '{other}' in '{spec}'")),
        };
        if words.next().is_some() {
            return Err(format!("trailing tokens in sort key '{part}'"));
        }
        keys.push(SortKey {
            field: field.to_string(),
            order,
        });
    }
    if keys.is_empty() {
        return Err("empty sort spec".to_string());
    }
    Ok(keys)
}

/// Compare two tuples under a sort-key list. Missing fields read as null.
pub fn compare(keys: &[SortKey], a: &Tuple, b: &Tuple) -> Ordering {
    for key in keys {
        let av = a.value_of(&key.field);
        let bv = b.value_of(&key.field);
        let ord = scalar_cmp(&av, &bv);
        let ord = match key.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::Scalar;

    #[test]
    fn parses_directions_and_defaults() {
        let keys = parse_sort_spec("score desc, id").unwrap();
        assert_eq!(keys, vec![SortKey::desc("score"), SortKey::asc("id")]);
    }

    #[test]
    fn rejects_bad_direction() {
        assert!(parse_sort_spec("score sideways").is_err());
        assert!(parse_sort_spec("").is_err());
    }

    #[test]
    fn compares_by_key_order() {
        let keys = parse_sort_spec("score desc, id asc").unwrap();
        let a = Tuple::from_pairs([("id", Scalar::I64(1)), ("score", Scalar::F64(2.0))]);
        let b = Tuple::from_pairs([("id", Scalar::I64(2)), ("score", Scalar::F64(2.0))]);
        let c = Tuple::from_pairs([("id", Scalar::I64(0)), ("score", Scalar::F64(9.0))]);
        assert_eq!(compare(&keys, &a, &b), Ordering::Less);
        assert_eq!(compare(&keys, &c, &a), Ordering::Less);
    }
}

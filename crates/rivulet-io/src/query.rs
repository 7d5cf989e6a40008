//! Minimal filter-query matching shared by the reference backends.
//!
//! Grammar: `*:*` matches everything; `field:value` is an equality term;
//! terms combine with ` AND `. Values are parsed with `Scalar::parse`, so
//! `age:42` matches an integer field and `name:bob` a string field.

use rivulet_core::tuple::{scalar_cmp, Scalar, Tuple};

/// Evaluate a filter query against one record.
pub fn matches(query: &str, tuple: &Tuple) -> Result<bool, String> {
    let query = query.trim();
    if query.is_empty() || query == "*:*" {
        return Ok(true);
    }

    for term in query.split(" AND ") {
        let term = term.trim();
        let (field, raw) = term
            .split_once(':')
            .ok_or_else(|| format!("unparseable query term '{term}'"))?;
        let expected = Scalar::parse(raw);
        let actual = tuple.value_of(field.trim());
        if scalar_cmp(&actual, &expected) != std::cmp::Ordering::Equal {
            return Ok(false);
        }
    }
    Ok(true)
}

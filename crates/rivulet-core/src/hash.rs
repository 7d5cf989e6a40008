//! Stable key hashing for join/grouping keys.

use crate::tuple::{Scalar, Tuple};

/// Hash the values of `fields` in a tuple into a stable u64 key.
///
/// Missing fields hash as null, so both sides of a join see the same key for
/// absent columns.
pub fn key_hash(tuple: &Tuple, fields: &[String]) -> u64 {
    let mut hasher = blake3::Hasher::new();
    for field in fields {
        hash_scalar(&tuple.value_of(field), &mut hasher);
    }
    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[0..8].try_into().expect("32-byte digest"))
}

/// Hash a scalar value into a hasher. The type discriminant goes first so
/// `1` and `"1"` never collide.
fn hash_scalar(scalar: &Scalar, hasher: &mut blake3::Hasher) {
    use Scalar::*;

    let tag: u8 = match scalar {
        Null => 0,
        Bool(_) => 1,
        I64(_) => 2,
        F64(_) => 3,
        Str(_) => 4,
        List(_) => 5,
    };
    hasher.update(&[tag]);

    match scalar {
        Null => {}
        Bool(b) => {
            hasher.update(&[*b as u8]);
        }
        I64(i) => {
            hasher.update(&i.to_le_bytes());
        }
        F64(f) => {
            hasher.update(&f.to_bits().to_le_bytes());
        }
        Str(s) => {
            hasher.update(s.as_bytes());
        }
        List(items) => {
            hasher.update(&(items.len() as u64).to_le_bytes());
            for item in items {
                hash_scalar(item, hasher);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_values_hash_equal_across_field_names() {
        let a = Tuple::from_pairs([("id", Scalar::I64(7))]);
        let b = Tuple::from_pairs([("user_id", Scalar::I64(7))]);
        let ha = key_hash(&a, &["id".to_string()]);
        let hb = key_hash(&b, &["user_id".to_string()]);
        assert_eq!(ha, hb);
    }

    #[test]
    fn type_discriminant_separates_int_from_string() {
        let a = Tuple::from_pairs([("k", Scalar::I64(1))]);
        let b = Tuple::from_pairs([("k", Scalar::Str("1".into()))]);
        let key = vec!["k".to_string()];
        assert_ne!(key_hash(&a, &key), key_hash(&b, &key));
    }
}

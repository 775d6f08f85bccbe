//! JSON types shared by responses, variables and cached entities.

pub use serde_json_bytes::ByteString;
pub use serde_json_bytes::Value;

/// A JSON object.
pub type Object = serde_json_bytes::Map<ByteString, Value>;

/// Extension trait for [`Value`].
pub(crate) trait ValueExt {
    /// Deep merge the JSON objects, array and override the values in `&mut self` if they already
    /// exists.
    fn deep_merge(&mut self, other: Self);
}

impl ValueExt for Value {
    fn deep_merge(&mut self, other: Self) {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => deep_merge_objects(a, b),
            (Value::Array(a), Value::Array(mut b)) => {
                let common = a.len().min(b.len());
                for (a_value, b_value) in a.iter_mut().zip(b.drain(..common)) {
                    a_value.deep_merge(b_value);
                }
                a.extend(b);
            }
            (a, b) => {
                *a = b;
            }
        }
    }
}

/// Merges the fields of `other` into `object`, recursively for fields present in both.
pub(crate) fn deep_merge_objects(object: &mut Object, other: Object) {
    for (key, value) in other {
        match object.get_mut(key.as_str()) {
            Some(existing) => existing.deep_merge(value),
            None => {
                object.insert(key, value);
            }
        }
    }
}

use std::hash::{Hash, Hasher};

use ahash::AHasher;
use opentelemetry::{Key, KeyValue, Value};

/// A canonical attribute set, used to key aggregation trackers.
///
/// Keys are sorted and de-duplicated (the last value recorded for a key wins),
/// so two sets built from the same pairs in a different order are equal and
/// hash the same.
#[derive(Clone, Debug)]
pub struct AttributeSet(Vec<KeyValue>, u64);

impl From<&[KeyValue]> for AttributeSet {
    fn from(values: &[KeyValue]) -> Self {
        let mut values = values.to_vec();
        // stable, so duplicated keys keep their recording order
        values.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));

        let mut deduped: Vec<KeyValue> = Vec::with_capacity(values.len());
        for kv in values {
            match deduped.last_mut() {
                Some(last) if last.key == kv.key => *last = kv,
                _ => deduped.push(kv),
            }
        }

        let hash = calculate_hash(&deduped);
        AttributeSet(deduped, hash)
    }
}

impl From<&Vec<KeyValue>> for AttributeSet {
    fn from(values: &Vec<KeyValue>) -> Self {
        AttributeSet::from(values.as_slice())
    }
}

impl AttributeSet {
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.0.iter().map(|kv| (&kv.key, &kv.value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    pub fn to_vec(&self) -> Vec<KeyValue> {
        self.0.clone()
    }

    pub fn into_inner(self) -> Vec<KeyValue> {
        self.0
    }
}

fn calculate_hash(values: &[KeyValue]) -> u64 {
    let mut hasher = AHasher::default();
    for kv in values {
        kv.key.as_str().hash(&mut hasher);
        hash_value(&kv.value, &mut hasher);
    }
    hasher.finish()
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Bool(b) => {
            0u8.hash(state);
            b.hash(state);
        }
        Value::I64(i) => {
            1u8.hash(state);
            i.hash(state);
        }
        Value::F64(f) => {
            2u8.hash(state);
            f.to_bits().hash(state);
        }
        Value::String(s) => {
            3u8.hash(state);
            s.as_str().hash(state);
        }
        other => {
            4u8.hash(state);
            other.as_str().hash(state);
        }
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
        (a, b) => a == b,
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
            && self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.key == b.key && value_eq(&a.value, &b.value))
    }
}

impl Eq for AttributeSet {}

impl Hash for AttributeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.1)
    }
}

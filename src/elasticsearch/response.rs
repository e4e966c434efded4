//! Read access to the aggregation results of a search response.
//!
//! Terms and histogram results carry their buckets as an array, each bucket
//! with its own `key`.  Filters results carry them as an object keyed by the
//! filter's name.

use serde_json::{Map, Value};

pub(crate) enum Buckets<'a> {
    List(&'a [Value]),
    Keyed(&'a Map<String, Value>),
}

impl<'a> Buckets<'a> {
    pub(crate) fn of(agg: &'a Value) -> Option<Buckets<'a>> {
        match agg.get("buckets")? {
            Value::Array(list) => Some(Buckets::List(list)),
            Value::Object(keyed) => Some(Buckets::Keyed(keyed)),
            _ => None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match *self {
            Buckets::List(list) => list.is_empty(),
            Buckets::Keyed(keyed) => keyed.is_empty(),
        }
    }

    /// `(key, bucket)` pairs in response order.  Array buckets without a `key`
    /// are left out.
    pub(crate) fn entries(&self) -> Vec<(Value, &'a Value)> {
        match *self {
            Buckets::List(list) => list
                .iter()
                .filter_map(|bucket| Some((bucket.get("key")?.clone(), bucket)))
                .collect(),
            Buckets::Keyed(keyed) => keyed
                .iter()
                .map(|(key, bucket)| (Value::String(key.clone()), bucket))
                .collect(),
        }
    }
}

/// Mutable `(key, bucket)` pairs of an aggregation result, in response order.
pub(crate) fn buckets_mut(agg: &mut Value) -> Vec<(Value, &mut Value)> {
    match agg.get_mut("buckets") {
        Some(Value::Array(list)) => list
            .iter_mut()
            .filter_map(|bucket| {
                let key = bucket.get("key")?.clone();
                Some((key, bucket))
            })
            .collect(),
        Some(Value::Object(keyed)) => keyed
            .iter_mut()
            .map(|(key, bucket)| (Value::String(key.clone()), bucket))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn doc_count(bucket: &Value) -> u64 {
    bucket
        .get("doc_count")
        .and_then(Value::as_u64)
        .unwrap_or_default()
}

/// Documents a terms aggregation counted but left out of its top-N buckets.
pub(crate) fn sum_other_doc_count(agg: &Value) -> u64 {
    agg.get("sum_other_doc_count")
        .and_then(Value::as_u64)
        .unwrap_or_default()
}

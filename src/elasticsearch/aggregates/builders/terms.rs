//! This Module is to build...
//! https://www.elastic.co/guide/en/elasticsearch/reference/7.9/search-aggregations-bucket-terms-aggregation.html
//!
//! Returns the body of a Terms ES aggregation

use crate::elasticsearch::aggregates::TermsParams;
use crate::other_bucket::MISSING_BUCKET_KEY;
use serde::*;
use serde_json::*;

#[derive(Serialize)]
struct Terms<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<Value>,
    size: u32,
    order: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<&'static str>,
}

/// `order_key` is `_key`, `_count`, or the name of the child aggregation
/// the buckets are sorted by.
pub(crate) fn terms_agg(params: &TermsParams, order_key: &str) -> Value {
    let mut order = Map::new();
    order.insert(
        order_key.to_string(),
        Value::String(params.order.value.as_str().to_string()),
    );

    let field = &params.field;
    let terms = Terms {
        field: (!field.scripted).then_some(field.name.as_str()),
        script: field.scripted.then(|| field.script_dsl()),
        size: params.size,
        order: Value::Object(order),
        // scripts have no notion of a missing value
        missing: (params.missing_bucket && !field.scripted).then_some(MISSING_BUCKET_KEY),
    };

    json! {
        {
            "terms": terms
        }
    }
}

//! This Module is to
//! https://www.elastic.co/guide/en/elasticsearch/reference/current/query-dsl-range-query.html
//!
//! Half-open `[gte, lt)` ranges, as produced by histogram buckets

use crate::elasticsearch::aggregates::FieldDescriptor;
use crate::query_dsl::Filter;
use serde::*;
use serde_json::*;

#[derive(Serialize)]
struct RangeNumber {
    gte: f64,
    lt: f64,
}

pub fn build_range_filter(field: &FieldDescriptor, gte: f64, lt: f64) -> Filter {
    let range = RangeNumber { gte, lt };
    let query = if field.scripted {
        let script = field.script.as_deref().unwrap_or_default();
        json! {
            {
                "script": {
                    "script": {
                        "source": format!(
                            "boolean gte(Supplier s, def v) {{return s.get() >= v}} \
                             boolean lt(Supplier s, def v) {{return s.get() < v}}\
                             gte(() -> {{ {script} }}, params.gte) && lt(() -> {{ {script} }}, params.lt)"
                        ),
                        "lang": field.lang,
                        "params": range
                    }
                }
            }
        }
    } else {
        json! {
            {
                "range": {
                    field.name.as_str(): range
                }
            }
        }
    };

    Filter::new("range", &field.name, Some(json!({ "gte": gte, "lt": lt })), query)
}

//! This Module is to
//! https://www.elastic.co/guide/en/elasticsearch/reference/current/query-dsl-exists-query.html
//!
//! Returns documents that contain an indexed value for a field.

use crate::elasticsearch::aggregates::FieldDescriptor;
use crate::query_dsl::Filter;
use serde_json::*;

pub fn build_exists_filter(field: &FieldDescriptor) -> Filter {
    Filter::new(
        "exists",
        &field.name,
        None,
        json! {
            {
                "exists": {
                    "field": field.name
                }
            }
        },
    )
}

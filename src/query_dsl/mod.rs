//! Filters as the console keeps them (a `meta` description plus the query
//! clause), and the helpers that turn lists of them into a `bool` query.

use crate::query_dsl::bool_query::BoolQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod bool_query;
pub mod field_exists;
pub mod phrase;
pub mod range;
pub mod script;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub meta: FilterMeta,
    pub query: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterMeta {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default)]
    pub negate: bool,
}

impl Filter {
    pub fn new(filter_type: &str, key: &str, params: Option<Value>, query: Value) -> Self {
        Filter {
            meta: FilterMeta {
                filter_type: Some(filter_type.to_string()),
                key: Some(key.to_string()),
                params,
                negate: false,
            },
            query,
        }
    }

    /// A filter carrying an arbitrary, user supplied query.
    pub fn custom(label: &str, query: Value) -> Self {
        Filter::new("custom", label, None, query)
    }

    pub fn negated(mut self) -> Self {
        self.meta.negate = !self.meta.negate;
        self
    }
}

/// Negated filters end up in `must_not`, everything else in `filter`.
pub fn build_query_from_filters(filters: &[Filter]) -> BoolQuery {
    let mut query = BoolQuery::default();
    for filter in filters {
        if filter.meta.negate {
            query.must_not.push(filter.query.clone());
        } else {
            query.filter.push(filter.query.clone());
        }
    }
    query
}

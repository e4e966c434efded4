//! This Module is to
//! https://www.elastic.co/guide/en/elasticsearch/reference/current/query-dsl-bool-query.html
//!
//! A `bool` query whose four occurrence lists are always present, even when empty

use serde::*;
use serde_json::*;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default)]
    pub must: Vec<Value>,
    #[serde(default)]
    pub filter: Vec<Value>,
    #[serde(default)]
    pub should: Vec<Value>,
    #[serde(default)]
    pub must_not: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    pub fn should(clauses: Vec<Value>) -> Self {
        BoolQuery {
            should: clauses,
            minimum_should_match: Some(1),
            ..Default::default()
        }
    }

    pub fn to_dsl(&self) -> Value {
        json! {
            {
                "bool": self
            }
        }
    }
}

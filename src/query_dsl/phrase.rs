//! This Module is to
//! https://www.elastic.co/guide/en/elasticsearch/reference/current/query-dsl-match-query-phrase.html
//!
//! Equality filters on a single bucket value.  Fields that exist in the index
//! match with `match_phrase`; scripted fields have no indexed value to match
//! against and compare through an inline script instead (see [`ScriptFilterBuilder`]).

use crate::elasticsearch::aggregates::FieldDescriptor;
use crate::query_dsl::bool_query::BoolQuery;
use crate::query_dsl::script::ScriptFilterBuilder;
use crate::query_dsl::Filter;
use serde_json::*;

pub trait FilterBuilder: Send + Sync {
    /// The bare query clause matching documents whose `field` equals `value`.
    fn phrase_query(&self, field: &FieldDescriptor, value: &Value) -> Value;

    fn phrase_filter(&self, field: &FieldDescriptor, value: &Value) -> Filter {
        Filter::new(
            "phrase",
            &field.name,
            Some(json! {{ "query": value }}),
            self.phrase_query(field, value),
        )
    }

    /// Matches documents equal to any of `values`.
    fn phrases_filter(&self, field: &FieldDescriptor, values: &[Value]) -> Filter {
        let should = values
            .iter()
            .map(|value| self.phrase_query(field, value))
            .collect();

        Filter::new(
            "phrases",
            &field.name,
            Some(Value::Array(values.to_vec())),
            BoolQuery::should(should).to_dsl(),
        )
    }
}

pub struct MatchPhraseFilterBuilder;

impl FilterBuilder for MatchPhraseFilterBuilder {
    fn phrase_query(&self, field: &FieldDescriptor, value: &Value) -> Value {
        json! {
            {
                "match_phrase": {
                    field.name.as_str(): converted_value(field, value)
                }
            }
        }
    }
}

/// Picks the equality strategy a field supports.
pub fn filter_builder_for(field: &FieldDescriptor) -> &'static dyn FilterBuilder {
    if field.scripted {
        &ScriptFilterBuilder
    } else {
        &MatchPhraseFilterBuilder
    }
}

/// Bucket keys of boolean fields may come back as the strings `"true"`/`"false"`.
pub(crate) fn converted_value(field: &FieldDescriptor, value: &Value) -> Value {
    if field.field_type.as_deref() == Some("boolean") {
        match value.as_str() {
            Some("true") => return Value::Bool(true),
            Some("false") => return Value::Bool(false),
            _ => {}
        }
    }
    value.clone()
}

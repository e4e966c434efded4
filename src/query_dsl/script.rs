//! This Module is to
//! https://www.elastic.co/guide/en/elasticsearch/reference/current/query-dsl-script-query.html
//!
//! Equality on scripted fields, which have no indexed value to match against.

use crate::elasticsearch::aggregates::FieldDescriptor;
use crate::query_dsl::phrase::{converted_value, FilterBuilder};
use serde::*;
use serde_json::*;
use tracing::warn;

#[derive(Serialize)]
struct InlineScript<'a> {
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<&'a str>,
    params: Value,
}

pub struct ScriptFilterBuilder;

impl ScriptFilterBuilder {
    /// Painless scripts may return a list of values, any of which can match.
    fn inline_script(field: &FieldDescriptor) -> String {
        let script = match field.script.as_deref() {
            Some(script) => script,
            None => {
                warn!(field = %field.name, "scripted field has no script");
                "undefined"
            }
        };
        if field.is_painless() {
            format!(
                "boolean compare(Supplier s, def v) {{if(s.get() instanceof List){{List list = s.get(); \
                 for(def k : list){{if(k==v){{return true;}}}}return false;}}else{{return s.get() == v;}}}}\
                 compare(() -> {{ {script} }}, params.value);"
            )
        } else {
            format!("({script}) == value")
        }
    }
}

impl FilterBuilder for ScriptFilterBuilder {
    fn phrase_query(&self, field: &FieldDescriptor, value: &Value) -> Value {
        let script = InlineScript {
            source: ScriptFilterBuilder::inline_script(field),
            lang: field.lang.as_deref(),
            params: json! {{ "value": converted_value(field, value) }},
        };

        json! {
            {
                "script": {
                    "script": script
                }
            }
        }
    }
}

use crate::elasticsearch::aggregates::MetricParams;
use serde_json::*;

pub(crate) fn metric_agg(agg_type: &str, params: &MetricParams) -> Value {
    let body = if params.field.scripted {
        json! {{ "script": params.field.script_dsl() }}
    } else {
        json! {{ "field": params.field.name }}
    };

    json! {
        {
            agg_type: body
        }
    }
}

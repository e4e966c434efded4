//! This Module is to build...
//! https://www.elastic.co/guide/en/elasticsearch/reference/7.9/search-aggregations-bucket-histogram-aggregation.html

use crate::elasticsearch::aggregates::HistogramParams;
use serde::*;
use serde_json::*;

#[derive(Serialize)]
struct Histogram<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<Value>,
    interval: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_doc_count: Option<u64>,
}

pub(crate) fn histogram_agg(params: &HistogramParams) -> Value {
    let field = &params.field;
    let histogram = Histogram {
        field: (!field.scripted).then_some(field.name.as_str()),
        script: field.scripted.then(|| field.script_dsl()),
        interval: params.interval,
        min_doc_count: params.min_doc_count,
    };

    json! {
        {
            "histogram": histogram
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::elasticsearch::aggregates::builders::histogram::histogram_agg;
    use crate::elasticsearch::aggregates::{FieldDescriptor, HistogramParams};
    use serde_json::*;

    #[test]
    fn test_histogram_agg() {
        let params = HistogramParams {
            field: FieldDescriptor::new("bytes"),
            interval: 1000.0,
            min_doc_count: Some(1),
        };

        assert_eq!(
            histogram_agg(&params),
            json! {
                {
                    "histogram": {
                        "field": "bytes",
                        "interval": 1000.0,
                        "min_doc_count": 1
                    }
                }
            }
        );
    }
}

//! Pipelines and search responses shared by the unit tests.
//!
//! Every scenario that reads a response is run once per entry of
//! [`PROBABILITIES`]: unsampled, sampled with a probability of `1` (which is
//! the same as unsampled) and truly sampled.

use crate::elasticsearch::aggregates::*;
use crate::other_bucket::SAMPLING_AGG_NAME;
use serde_json::{json, Value};

pub(crate) const PROBABILITIES: [Option<f64>; 3] = [None, Some(1.0), Some(0.5)];

pub(crate) fn terms_config(
    id: &str,
    field: &str,
    other_bucket: bool,
    missing_bucket: bool,
) -> AggConfig {
    AggConfig::new(
        id,
        AggKind::Terms(
            TermsParams::new(FieldDescriptor::new(field), 5)
                .with_other_bucket(other_bucket)
                .with_missing_bucket(missing_bucket),
        ),
    )
}

fn sized(mut config: AggConfig, size: u32) -> AggConfig {
    if let AggKind::Terms(terms) = &mut config.kind {
        terms.size = size;
    }
    config
}

pub(crate) fn single_term() -> AggConfigs {
    AggConfigs::new(vec![terms_config("1", "machine.os.raw", true, true)]).expect("valid pipeline")
}

pub(crate) fn nested_term() -> AggConfigs {
    AggConfigs::new(vec![
        sized(terms_config("1", "geo.src", false, false), 2),
        sized(terms_config("2", "machine.os.raw", true, true), 2),
    ])
    .expect("valid pipeline")
}

/// [`nested_term`] with an other bucket on both levels.
pub(crate) fn nested_term_with_other_buckets() -> AggConfigs {
    AggConfigs::new(vec![
        sized(terms_config("1", "geo.src", true, false), 2),
        sized(terms_config("2", "machine.os.raw", true, true), 2),
    ])
    .expect("valid pipeline")
}

/// [`nested_term`] below a filters aggregation with one empty query.
pub(crate) fn filters_then_nested_term() -> AggConfigs {
    let mut aggs = vec![AggConfig::new(
        "0",
        AggKind::Filters(FiltersParams {
            filters: vec![FilterEntry::new("", "")],
        }),
    )];
    aggs.extend(nested_term().aggs);
    AggConfigs::new(aggs).expect("valid pipeline")
}

pub(crate) fn wrap_response(aggregations: Value) -> Value {
    json! {
        {
            "took": 3,
            "timed_out": false,
            "_shards": { "total": 1, "successful": 1, "skipped": 0, "failed": 0 },
            "hits": { "total": 14005, "max_score": 0, "hits": [] },
            "aggregations": aggregations,
            "status": 200
        }
    }
}

fn os_buckets(counts: [u64; 3], sum_other_doc_count: u64) -> Value {
    json! {
        {
            "doc_count_error_upper_bound": 0,
            "sum_other_doc_count": sum_other_doc_count,
            "buckets": [
                { "key": "ios", "doc_count": counts[0] },
                { "key": "win xp", "doc_count": counts[1] },
                { "key": "__missing__", "doc_count": counts[2] }
            ]
        }
    }
}

fn countries(sum_other_doc_count: u64) -> Value {
    json! {
        {
            "doc_count_error_upper_bound": 0,
            "sum_other_doc_count": 8325,
            "buckets": [
                {
                    "2": os_buckets([2850, 2830, 1430], sum_other_doc_count),
                    "key": "US-with-dash",
                    "doc_count": 2850
                },
                {
                    "2": os_buckets([1850, 1830, 130], sum_other_doc_count),
                    "key": "IN-with-dash",
                    "doc_count": 2830
                }
            ]
        }
    }
}

pub(crate) fn single_term_response() -> Value {
    wrap_response(json!({ "1": os_buckets([2850, 2830, 1430], 8325) }))
}

pub(crate) fn nested_term_response() -> Value {
    wrap_response(json!({ "1": countries(8325) }))
}

pub(crate) fn exhaustive_nested_term_response() -> Value {
    wrap_response(json!({ "1": countries(0) }))
}

/// [`nested_term_response`] with a third country keyed `""`.
pub(crate) fn nested_term_response_with_empty_key() -> Value {
    let mut response = nested_term_response();
    if let Some(buckets) = response["aggregations"]["1"]["buckets"].as_array_mut() {
        buckets.push(json! {
            {
                "2": os_buckets([1850, 1830, 130], 8325),
                "key": "",
                "doc_count": 2830
            }
        });
    }
    response
}

/// [`nested_term_response_with_empty_key`] whose third country also has an
/// operating system keyed `""`.
pub(crate) fn nested_term_response_with_empty_keys() -> Value {
    let mut response = nested_term_response_with_empty_key();
    if let Some(buckets) = response["aggregations"]["1"]["buckets"][2]["2"]["buckets"].as_array_mut() {
        buckets.push(json!({ "key": "", "doc_count": 130 }));
    }
    response
}

pub(crate) fn filters_then_nested_term_response() -> Value {
    wrap_response(json! {
        {
            "0": {
                "buckets": {
                    "*": {
                        "1": countries(8325),
                        "doc_count": 1148
                    }
                }
            }
        }
    })
}

pub(crate) fn single_other_response() -> Value {
    wrap_response(json!({ "other-filter": { "buckets": { "": { "doc_count": 2805 } } } }))
}

pub(crate) fn nested_other_response() -> Value {
    wrap_response(json! {
        {
            "other-filter": {
                "buckets": {
                    "╰┄►US-with-dash": { "doc_count": 2805 },
                    "╰┄►IN-with-dash": { "doc_count": 2804 }
                }
            }
        }
    })
}

pub(crate) fn sampled(configs: AggConfigs, probability: Option<f64>) -> AggConfigs {
    match probability {
        Some(probability) => configs.with_sampling(probability, None),
        None => configs,
    }
}

/// Moves the aggregations of `response` under the sampling node, the way a
/// sampled search returns them.
pub(crate) fn sampled_response(mut response: Value, probability: Option<f64>) -> Value {
    if !matches!(probability, Some(probability) if probability != 1.0) {
        return response;
    }
    if let Some(aggregations) = response.get_mut("aggregations") {
        let unsampled = aggregations.take();
        *aggregations = json!({ SAMPLING_AGG_NAME: unsampled });
    }
    response
}

pub(crate) fn top_aggregations(response: &Value, probability: Option<f64>) -> &Value {
    match probability {
        Some(probability) if probability != 1.0 => &response["aggregations"][SAMPLING_AGG_NAME],
        _ => &response["aggregations"],
    }
}

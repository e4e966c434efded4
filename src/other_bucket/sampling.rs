//! Keeps the rest of the engine unaware of the `random_sampler` wrapper.
//!
//! When sampling is enabled the whole aggregation tree, in requests and in
//! responses, sits one level down under the [`SAMPLING_AGG_NAME`] node.

use crate::elasticsearch::aggregates::builders::sampler::random_sampler_agg;
use crate::other_bucket::SAMPLING_AGG_NAME;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub probability: f64,
    pub seed: Option<u64>,
}

/// A probability of exactly `1` samples everything, which is the same as not sampling.
pub fn is_sampling_enabled(probability: Option<f64>) -> bool {
    matches!(probability, Some(probability) if probability != 1.0)
}

/// The object holding the pipeline's aggregation results.
pub(crate) fn aggregations_root<'a>(
    response: &'a Value,
    sampling: Option<&SamplingOptions>,
) -> Option<&'a Value> {
    let aggregations = response.get("aggregations")?;
    match sampling {
        Some(_) => aggregations.get(SAMPLING_AGG_NAME),
        None => Some(aggregations),
    }
}

pub(crate) fn aggregations_root_mut<'a>(
    response: &'a mut Value,
    sampling: Option<&SamplingOptions>,
) -> Option<&'a mut Value> {
    let aggregations = response.get_mut("aggregations")?;
    match sampling {
        Some(_) => aggregations.get_mut(SAMPLING_AGG_NAME),
        None => Some(aggregations),
    }
}

pub(crate) fn wrap_request(
    aggs: Map<String, Value>,
    sampling: Option<&SamplingOptions>,
) -> Map<String, Value> {
    match sampling {
        Some(options) => {
            let mut wrapped = Map::new();
            wrapped.insert(
                SAMPLING_AGG_NAME.to_string(),
                random_sampler_agg(options.probability, options.seed, aggs),
            );
            wrapped
        }
        None => aggs,
    }
}

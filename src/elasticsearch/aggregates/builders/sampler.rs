//! This Module is to build...
//! https://www.elastic.co/guide/en/elasticsearch/reference/8.2/search-aggregations-random-sampler-aggregation.html
//!
//! Returns the body of a Random Sampler ES aggregation wrapping `children`

use serde::*;
use serde_json::*;

#[derive(Serialize)]
struct RandomSampler {
    probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

pub(crate) fn random_sampler_agg(
    probability: f64,
    seed: Option<u64>,
    children: Map<String, Value>,
) -> Value {
    let sampler = RandomSampler { probability, seed };

    json! {
        {
            "random_sampler": sampler,
            "aggs": children
        }
    }
}

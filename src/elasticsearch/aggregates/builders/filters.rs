//! This Module is to build...
//! https://www.elastic.co/guide/en/elasticsearch/reference/7.9/search-aggregations-bucket-filters-aggregation.html
//!
//! Returns the body of a Filters ES aggregation

use crate::elasticsearch::aggregates::FiltersParams;
use serde_json::*;

pub(crate) fn filters_agg(params: &FiltersParams) -> Value {
    let mut filters_map = Map::new();
    for entry in &params.filters {
        filters_map.insert(entry.key().to_string(), entry.query());
    }

    json! {
        {
            "filters": {
                "filters": filters_map
            }
        }
    }
}

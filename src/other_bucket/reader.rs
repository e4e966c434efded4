use crate::elasticsearch::aggregates::{AggConfig, AggConfigs, TermsParams};
use crate::error::{OtherBucketError, Result};

/// Where a terms aggregation sits in its pipeline.
#[derive(Debug, Clone)]
pub struct AggPath<'c> {
    /// Enabled bucket aggregations the target is nested in, outermost first.
    pub ancestors: Vec<&'c AggConfig>,
    pub target: &'c AggConfig,
    pub terms: &'c TermsParams,
    /// Ids of the other aggregations requested at the target's level.
    pub siblings: Vec<&'c str>,
}

pub fn read_agg_path<'c>(configs: &'c AggConfigs, target_id: &str) -> Result<AggPath<'c>> {
    let target = configs
        .by_id(target_id)
        .ok_or_else(|| OtherBucketError::ConfigNotFound(target_id.to_string()))?;
    let terms = target
        .kind
        .as_terms()
        .ok_or_else(|| OtherBucketError::NotTermsAggregation(target_id.to_string()))?;
    if !target.enabled {
        return Err(OtherBucketError::DisabledAggregation(target_id.to_string()));
    }

    let ancestors = configs
        .bucket_aggs()
        .take_while(|agg| agg.id != target.id)
        .collect::<Vec<_>>();

    // hierarchical pipelines repeat their metrics inside every bucket level
    let siblings = if configs.hierarchical && !ancestors.is_empty() {
        configs
            .metric_aggs()
            .filter(|agg| agg.to_dsl().is_some())
            .map(|agg| agg.id.as_str())
            .collect()
    } else {
        Vec::new()
    };

    Ok(AggPath {
        ancestors,
        target,
        terms,
        siblings,
    })
}

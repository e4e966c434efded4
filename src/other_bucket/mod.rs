//! "Other" buckets for terms aggregations.
//!
//! A terms aggregation only returns its top-N terms.  To show the rest as a
//! single `__other__` bucket a second search is needed: one `filters`
//! aggregation clause per branch of the first response, each excluding the
//! terms that branch already returned.  [`build_other_bucket_agg`] builds that
//! search from the first response, [`merge_other_bucket_agg_response`] folds
//! its counts back in, and [`update_missing_bucket`] marks the `__missing__`
//! buckets so they can be filtered on as well.

use crate::elasticsearch::aggregates::AggConfigs;
use crate::error::Result;
use crate::other_bucket::builder::build_request;
use crate::other_bucket::merge::{mark_missing_buckets, merge_other_buckets};
use crate::other_bucket::sampling::{aggregations_root, aggregations_root_mut};
use serde_json::Value;
use tracing::{debug, warn};

mod builder;
mod merge;
mod path_key;
mod reader;
pub mod sampling;
mod walker;

pub use builder::{OtherBucketBuild, OtherBucketRequest, OtherClause};
pub use merge::{OtherFilterConstructor, SingleTermOtherFilter};
pub use path_key::PathKey;
pub use reader::{read_agg_path, AggPath};

pub const OTHER_BUCKET_KEY: &str = "__other__";
pub const MISSING_BUCKET_KEY: &str = "__missing__";
/// Joins ancestor bucket keys into a [`PathKey`].
pub const OTHER_BUCKET_SEPARATOR: &str = "╰┄►";
pub const OTHER_FILTER_AGG_NAME: &str = "other-filter";
pub const SAMPLING_AGG_NAME: &str = "sampling";

/// Plans the secondary search counting the documents left out of the top-N
/// buckets of the terms aggregation `target_id`, in every branch of `response`.
pub fn build_other_bucket_agg(
    configs: &AggConfigs,
    target_id: &str,
    response: &Value,
) -> Result<OtherBucketBuild> {
    let path = read_agg_path(configs, target_id)?;
    if !path.terms.other_bucket {
        debug!(agg_id = target_id, "other bucket is not enabled");
        return Ok(OtherBucketBuild::Disabled);
    }

    let sampling = configs.sampling();
    let Some(root) = aggregations_root(response, sampling.as_ref()) else {
        warn!(agg_id = target_id, "response has no aggregations");
        return Ok(OtherBucketBuild::NoBuckets);
    };

    let build = build_request(&path, root, configs.children_dsl(target_id), sampling);
    match &build {
        OtherBucketBuild::Request(request) => {
            debug!(agg_id = target_id, clauses = request.clauses().len(), "built other bucket request")
        }
        other => debug!(agg_id = target_id, outcome = ?other, "no other bucket request needed"),
    }
    Ok(build)
}

/// Returns a copy of `response` with an `__other__` bucket appended to every
/// branch `other_response` counted documents for.
pub fn merge_other_bucket_agg_response(
    configs: &AggConfigs,
    response: &Value,
    other_response: &Value,
    target_id: &str,
    request: &OtherBucketRequest,
    constructor: &dyn OtherFilterConstructor,
) -> Result<Value> {
    let path = read_agg_path(configs, target_id)?;
    let sampling = configs.sampling();
    let mut merged = response.clone();

    let Some(other_root) = aggregations_root(other_response, sampling.as_ref()) else {
        warn!(agg_id = target_id, "other response has no aggregations");
        return Ok(merged);
    };
    let Some(root) = aggregations_root_mut(&mut merged, sampling.as_ref()) else {
        warn!(agg_id = target_id, "response has no aggregations");
        return Ok(merged);
    };

    let appended = merge_other_buckets(root, &path, other_root, request, constructor);
    debug!(agg_id = target_id, appended, "merged other buckets");
    Ok(merged)
}

/// Returns a copy of `response` whose `__missing__` buckets of `target_id`
/// carry the filter selecting documents without a value.
pub fn update_missing_bucket(
    response: &Value,
    configs: &AggConfigs,
    target_id: &str,
) -> Result<Value> {
    let path = read_agg_path(configs, target_id)?;
    let sampling = configs.sampling();
    let mut updated = response.clone();

    if let Some(root) = aggregations_root_mut(&mut updated, sampling.as_ref()) {
        let marked = mark_missing_buckets(root, &path);
        debug!(agg_id = target_id, marked, "updated missing buckets");
    } else {
        warn!(agg_id = target_id, "response has no aggregations");
    }
    Ok(updated)
}

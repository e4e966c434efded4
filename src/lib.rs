//! "Other" and "missing" buckets for Elasticsearch terms aggregations.
//!
//! Given an aggregation pipeline ([`AggConfigs`]) and the response of the
//! search it produced, [`build_other_bucket_agg`] plans a second search
//! counting every document a terms aggregation left out of its top-N buckets,
//! [`merge_other_bucket_agg_response`] folds those counts back in as
//! `__other__` buckets and [`update_missing_bucket`] marks the `__missing__`
//! buckets.

pub mod elasticsearch;
pub mod error;
pub mod other_bucket;
pub mod query_dsl;
pub mod utils;

#[cfg(test)]
mod testing;

pub use elasticsearch::aggregates::{AggConfig, AggConfigs, AggKind};
pub use error::{OtherBucketError, Result};
pub use other_bucket::{
    build_other_bucket_agg, merge_other_bucket_agg_response, update_missing_bucket,
    OtherBucketBuild, OtherBucketRequest, OtherFilterConstructor, PathKey, SingleTermOtherFilter,
};

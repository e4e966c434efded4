//! Folds the counts of the secondary `filters` search back into the primary
//! response as `__other__` buckets, and marks the `__missing__` buckets.

use crate::elasticsearch::aggregates::AggConfig;
use crate::elasticsearch::response::{buckets_mut, doc_count};
use crate::other_bucket::builder::{is_missing_key, OtherBucketRequest};
use crate::other_bucket::path_key::PathKey;
use crate::other_bucket::reader::AggPath;
use crate::other_bucket::walker::walk_mut;
use crate::other_bucket::{MISSING_BUCKET_KEY, OTHER_BUCKET_KEY, OTHER_FILTER_AGG_NAME};
use crate::query_dsl::field_exists::build_exists_filter;
use crate::query_dsl::phrase::filter_builder_for;
use crate::query_dsl::Filter;
use rustc_hash::FxHashSet;
use serde_json::*;
use tracing::{debug, warn};

/// Describes the documents an `__other__` bucket stands for, so the bucket
/// can be drilled into like any other.
pub trait OtherFilterConstructor {
    fn construct(
        &self,
        request: &OtherBucketRequest,
        path: &PathKey,
        target: &AggConfig,
    ) -> Option<Filter>;
}

/// Excludes every term the branch already returned a bucket for.
pub struct SingleTermOtherFilter;

impl OtherFilterConstructor for SingleTermOtherFilter {
    fn construct(
        &self,
        request: &OtherBucketRequest,
        path: &PathKey,
        target: &AggConfig,
    ) -> Option<Filter> {
        let clause = request.clause(path.as_str())?;
        let terms = target.kind.as_terms()?;

        Some(
            filter_builder_for(&terms.field)
                .phrases_filter(&terms.field, &clause.excluded_keys)
                .negated(),
        )
    }
}

/// Appends an `__other__` bucket to every branch of `root` the other response
/// counted documents for.  Returns how many were appended.
pub(crate) fn merge_other_buckets(
    root: &mut Value,
    path: &AggPath,
    other_root: &Value,
    request: &OtherBucketRequest,
    constructor: &dyn OtherFilterConstructor,
) -> usize {
    let Some(other_buckets) = other_root
        .get(OTHER_FILTER_AGG_NAME)
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_object)
    else {
        warn!(agg_id = %path.target.id, "other response has no `{}` buckets", OTHER_FILTER_AGG_NAME);
        return 0;
    };

    let mut matched = FxHashSet::default();
    let mut appended = 0;

    walk_mut(root, &path.ancestors, &path.target.id, |key, agg| {
        let Some(other) = other_buckets.get(key.as_str()) else {
            return;
        };
        matched.insert(key.to_string());

        let count = doc_count(other);
        if count == 0 {
            return;
        }
        let Some(agg) = agg else {
            warn!(agg_id = %path.target.id, path = %key, "branch has no results to merge into");
            return;
        };

        let filter = constructor.construct(request, key, path.target);
        if append_other_bucket(agg, other, count, filter, path) {
            appended += 1;
        }
    });

    for (key, bucket) in other_buckets {
        if !matched.contains(key) && doc_count(bucket) > 0 {
            warn!(agg_id = %path.target.id, path = %key, "other bucket matches no branch of the response");
        }
    }

    appended
}

fn append_other_bucket(
    agg: &mut Value,
    other: &Value,
    count: u64,
    filter: Option<Filter>,
    path: &AggPath,
) -> bool {
    let Some(other) = other.as_object() else {
        return false;
    };
    let Some(buckets) = agg.get_mut("buckets").and_then(Value::as_array_mut) else {
        warn!(agg_id = %path.target.id, "results have no bucket list to merge into");
        return false;
    };

    let field = &path.terms.field;
    let has_missing_bucket = buckets
        .iter()
        .any(|bucket| bucket.get("key").map_or(false, is_missing_key));

    let mut filters = filter.into_iter().collect::<Vec<_>>();
    if !field.scripted && (!path.terms.missing_bucket || has_missing_bucket) {
        filters.push(build_exists_filter(field));
    }

    let mut bucket = other.clone();
    bucket.insert("key".to_string(), json!(OTHER_BUCKET_KEY));
    bucket.insert("filters".to_string(), json!(filters));
    buckets.push(Value::Object(bucket));

    // the merged bucket now accounts for these documents
    if let Some(remaining) = agg.get("sum_other_doc_count").and_then(Value::as_u64) {
        agg["sum_other_doc_count"] = json!(remaining.saturating_sub(count));
    }
    true
}

/// Gives every `__missing__` bucket of the target the filter selecting
/// documents without a value.  Returns how many buckets were marked.
pub(crate) fn mark_missing_buckets(root: &mut Value, path: &AggPath) -> usize {
    let field = &path.terms.field;
    let mut marked = 0;

    walk_mut(root, &path.ancestors, &path.target.id, |key, agg| {
        let Some(agg) = agg else {
            return;
        };
        for (bucket_key, bucket) in buckets_mut(agg) {
            if !is_missing_key(&bucket_key) {
                continue;
            }
            debug!(agg_id = %path.target.id, path = %key, "marking missing bucket");

            bucket["key"] = json!(MISSING_BUCKET_KEY);
            if bucket.get("filters").is_none() && !field.scripted {
                bucket["filters"] = json!([build_exists_filter(field).negated()]);
            }
            marked += 1;
        }
    });

    marked
}

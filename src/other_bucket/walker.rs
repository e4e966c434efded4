//! Depth-first walk from the response root down to every result of the
//! target aggregation, one branch per combination of ancestor buckets.
//!
//! Ancestors are the enabled bucket aggregations preceding the target, so a
//! disabled aggregation, which is absent from the response, never interrupts
//! the descent.

use crate::elasticsearch::aggregates::AggConfig;
use crate::elasticsearch::response::{buckets_mut, Buckets};
use crate::other_bucket::path_key::PathKey;
use crate::utils::json_to_string;
use serde_json::Value;
use tracing::debug;

/// One ancestor bucket on the way down to the target aggregation.
#[derive(Debug, Clone)]
pub(crate) struct PathStep<'c> {
    pub(crate) config: &'c AggConfig,
    pub(crate) key: Value,
    /// Set on buckets an earlier merge synthesized.
    pub(crate) filters: Option<Value>,
}

/// Calls `visit` with the ancestor steps, the path key and the target's
/// result (absent when the branch has none) for every branch of `root`.
pub(crate) fn walk<'c, F>(root: &Value, ancestors: &[&'c AggConfig], target_id: &str, mut visit: F)
where
    F: FnMut(&[PathStep<'c>], &PathKey, Option<&Value>),
{
    let mut steps = Vec::with_capacity(ancestors.len());
    walk_level(
        root,
        ancestors,
        target_id,
        &mut steps,
        &PathKey::root(),
        &mut visit,
    );
}

fn walk_level<'c, F>(
    level: &Value,
    ancestors: &[&'c AggConfig],
    target_id: &str,
    steps: &mut Vec<PathStep<'c>>,
    path: &PathKey,
    visit: &mut F,
) where
    F: FnMut(&[PathStep<'c>], &PathKey, Option<&Value>),
{
    let Some((ancestor, rest)) = ancestors.split_first() else {
        visit(steps, path, level.get(target_id));
        return;
    };

    let Some(buckets) = level.get(ancestor.id.as_str()).and_then(Buckets::of) else {
        debug!(agg_id = %ancestor.id, path = %path, "branch has no ancestor buckets");
        return;
    };

    for (key, bucket) in buckets.entries() {
        let Some(key_string) = json_to_string(&key) else {
            debug!(agg_id = %ancestor.id, %key, "skipping bucket with unusable key");
            continue;
        };

        steps.push(PathStep {
            config: ancestor,
            key,
            filters: bucket.get("filters").cloned(),
        });
        walk_level(
            bucket,
            rest,
            target_id,
            steps,
            &path.child(&key_string),
            visit,
        );
        steps.pop();
    }
}

/// Same descent as [`walk`], handing out the target's results mutably.
pub(crate) fn walk_mut<F>(root: &mut Value, ancestors: &[&AggConfig], target_id: &str, mut visit: F)
where
    F: FnMut(&PathKey, Option<&mut Value>),
{
    walk_level_mut(root, ancestors, target_id, &PathKey::root(), &mut visit);
}

fn walk_level_mut<F>(
    level: &mut Value,
    ancestors: &[&AggConfig],
    target_id: &str,
    path: &PathKey,
    visit: &mut F,
) where
    F: FnMut(&PathKey, Option<&mut Value>),
{
    let Some((ancestor, rest)) = ancestors.split_first() else {
        visit(path, level.get_mut(target_id));
        return;
    };

    let Some(agg) = level.get_mut(ancestor.id.as_str()) else {
        debug!(agg_id = %ancestor.id, path = %path, "branch has no ancestor buckets");
        return;
    };

    for (key, bucket) in buckets_mut(agg) {
        if let Some(key_string) = json_to_string(&key) {
            walk_level_mut(bucket, rest, target_id, &path.child(&key_string), visit);
        }
    }
}

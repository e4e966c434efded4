//! Turns an [`AggConfigs`] pipeline into the `aggs` object of a search request.
//!
//! Bucket aggregations nest in pipeline order, each one receiving the next as a
//! child.  Metric aggregations land under the deepest bucket, or under every
//! bucket level when the pipeline is hierarchical.

use crate::elasticsearch::aggregates::{AggConfig, AggConfigs, AggKind, TermsParams};
use crate::other_bucket::sampling::wrap_request;
use serde_json::{Map, Value};
use tracing::warn;

pub(crate) mod filters;
pub(crate) mod histogram;
pub(crate) mod metrics;
pub(crate) mod sampler;
pub(crate) mod terms;

pub(crate) fn make_children_map(children: Vec<(String, Value)>) -> Map<String, Value> {
    let mut map = Map::new();
    map.extend(children);
    map
}

impl AggConfig {
    /// The DSL body of this aggregation alone, without children.  `count`
    /// has none as it is read from each bucket's `doc_count`.
    ///
    /// Out of its pipeline a terms aggregation ordered by a metric falls back
    /// to `_count`; [`AggConfigs::to_dsl`] resolves the metric.
    pub fn to_dsl(&self) -> Option<Value> {
        self.dsl_ordered_by(None)
    }

    fn dsl_ordered_by(&self, order_agg: Option<&AggConfig>) -> Option<Value> {
        match &self.kind {
            AggKind::Terms(params) => Some(terms::terms_agg(params, order_key(params, order_agg))),
            AggKind::Filters(params) => Some(filters::filters_agg(params)),
            AggKind::Histogram(params) => Some(histogram::histogram_agg(params)),
            AggKind::Count => None,
            AggKind::Avg(params) => Some(metrics::metric_agg("avg", params)),
            AggKind::Sum(params) => Some(metrics::metric_agg("sum", params)),
            AggKind::Min(params) => Some(metrics::metric_agg("min", params)),
            AggKind::Max(params) => Some(metrics::metric_agg("max", params)),
            AggKind::Cardinality(params) => Some(metrics::metric_agg("cardinality", params)),
        }
    }
}

/// `_key`, `_count`, or the id of `order_agg`.  A `count` metric is the
/// bucket's own `doc_count`.
fn order_key<'a>(params: &TermsParams, order_agg: Option<&'a AggConfig>) -> &'a str {
    if params.order_by.as_deref() == Some("_key") {
        return "_key";
    }
    match order_agg {
        Some(agg) if !matches!(agg.kind, AggKind::Count) => agg.id.as_str(),
        _ => "_count",
    }
}

/// The enabled metric aggregation `agg` orders its buckets by, if any.
fn find_order_agg<'a>(agg: &AggConfig, metrics: &[&'a AggConfig]) -> Option<&'a AggConfig> {
    let order_by = agg.kind.as_terms()?.order_by.as_deref()?;
    if order_by == "_key" || order_by == "_count" {
        return None;
    }

    let found = metrics.iter().copied().find(|metric| metric.id == order_by);
    if found.is_none() {
        warn!(agg = %agg.id, order_by, "no enabled metric to order by, ordering by _count");
    }
    found
}

impl AggConfigs {
    /// The full `aggs` object of the primary search request, wrapped in the
    /// sampling aggregation when sampling is enabled.
    pub fn to_dsl(&self) -> Map<String, Value> {
        let buckets = self.bucket_aggs().collect::<Vec<_>>();
        let metrics = self.metric_aggs().collect::<Vec<_>>();
        let aggs = build_level(&buckets, &metrics, self.hierarchical, true);

        wrap_request(aggs, self.sampling().as_ref())
    }

    /// Everything nested below the aggregation `id`, exactly as [`to_dsl`](Self::to_dsl)
    /// places it, or `None` when nothing is.
    pub fn children_dsl(&self, id: &str) -> Option<Map<String, Value>> {
        let buckets = self.bucket_aggs().collect::<Vec<_>>();
        let position = buckets.iter().position(|agg| agg.id == id)?;
        let metrics = self.metric_aggs().collect::<Vec<_>>();

        let mut level = build_level(
            &buckets[position..],
            &metrics,
            self.hierarchical,
            position == 0,
        );
        match level.get_mut(id)?.get_mut("aggs").map(Value::take) {
            Some(Value::Object(children)) if !children.is_empty() => Some(children),
            _ => None,
        }
    }
}

fn build_level(
    buckets: &[&AggConfig],
    metrics: &[&AggConfig],
    hierarchical: bool,
    top: bool,
) -> Map<String, Value> {
    let mut children = Vec::new();

    match buckets.split_first() {
        None => children.extend(metric_children(metrics)),
        Some((first, rest)) => {
            let order_agg = find_order_agg(first, metrics);
            if let Some(mut dsl) = first.dsl_ordered_by(order_agg) {
                let mut nested = build_level(rest, metrics, hierarchical, false);
                // the metric ordered by must be a direct child
                if let Some(order_agg) = order_agg {
                    if let Some(metric) = order_agg.to_dsl() {
                        nested.entry(order_agg.id.clone()).or_insert(metric);
                    }
                }
                if !nested.is_empty() {
                    dsl["aggs"] = Value::Object(nested);
                }
                children.push((first.id.clone(), dsl));
            }

            if hierarchical && !top {
                children.extend(metric_children(metrics));
            }
        }
    }

    make_children_map(children)
}

fn metric_children(metrics: &[&AggConfig]) -> Vec<(String, Value)> {
    metrics
        .iter()
        .filter_map(|agg| agg.to_dsl().map(|dsl| (agg.id.clone(), dsl)))
        .collect()
}

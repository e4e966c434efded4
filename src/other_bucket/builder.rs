//! Builds the `filters` aggregation that counts, for every branch of a terms
//! aggregation's results, the documents that fell outside its top-N buckets.

use crate::elasticsearch::response::{sum_other_doc_count, Buckets};
use crate::other_bucket::path_key::PathKey;
use crate::other_bucket::reader::AggPath;
use crate::other_bucket::sampling::{wrap_request, SamplingOptions};
use crate::other_bucket::walker::{walk, PathStep};
use crate::other_bucket::{MISSING_BUCKET_KEY, OTHER_BUCKET_KEY, OTHER_FILTER_AGG_NAME};
use crate::query_dsl::bool_query::BoolQuery;
use crate::query_dsl::field_exists::build_exists_filter;
use crate::query_dsl::phrase::filter_builder_for;
use crate::query_dsl::{build_query_from_filters, Filter};
use indexmap::IndexMap;
use serde_json::*;
use tracing::{debug, warn};

/// The `bool` query selecting one branch's leftover documents.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherClause {
    pub query: BoolQuery,
    /// Bucket keys `query` excludes, in response order.
    pub excluded_keys: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OtherBucketRequest {
    clauses: IndexMap<PathKey, OtherClause>,
    aggs: Option<Map<String, Value>>,
    sampling: Option<SamplingOptions>,
}

impl OtherBucketRequest {
    pub fn clauses(&self) -> &IndexMap<PathKey, OtherClause> {
        &self.clauses
    }

    pub fn clause(&self, key: &str) -> Option<&OtherClause> {
        self.clauses.get(key)
    }

    /// The `aggs` object of the secondary search request.
    pub fn to_dsl(&self) -> Value {
        let mut filters = Map::new();
        for (key, clause) in &self.clauses {
            filters.insert(key.to_string(), clause.query.to_dsl());
        }

        let mut other_filter = json! {
            {
                "filters": {
                    "filters": filters
                }
            }
        };
        if let Some(aggs) = &self.aggs {
            other_filter["aggs"] = Value::Object(aggs.clone());
        }

        let mut request = Map::new();
        request.insert(OTHER_FILTER_AGG_NAME.to_string(), other_filter);
        Value::Object(wrap_request(request, self.sampling.as_ref()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtherBucketBuild {
    Request(OtherBucketRequest),
    /// No branch of the response has buckets for the aggregation.
    NoBuckets,
    /// Every branch already returned all of its terms.
    Exhaustive,
    /// The aggregation doesn't ask for an other bucket.
    Disabled,
}

impl OtherBucketBuild {
    pub fn into_request(self) -> Option<OtherBucketRequest> {
        match self {
            OtherBucketBuild::Request(request) => Some(request),
            _ => None,
        }
    }

    pub fn is_needed(&self) -> bool {
        matches!(self, OtherBucketBuild::Request(_))
    }
}

pub(crate) fn build_request(
    path: &AggPath,
    root: &Value,
    aggs: Option<Map<String, Value>>,
    sampling: Option<SamplingOptions>,
) -> OtherBucketBuild {
    let field = &path.terms.field;
    let builder = filter_builder_for(field);
    let mut clauses = IndexMap::new();
    let mut exhaustive = true;

    walk(root, &path.ancestors, &path.target.id, |steps, key, agg| {
        let Some(agg) = agg else {
            debug!(agg_id = %path.target.id, path = %key, "branch has no results");
            return;
        };
        let Some(buckets) = Buckets::of(agg).filter(|buckets| !buckets.is_empty()) else {
            debug!(agg_id = %path.target.id, path = %key, "branch has no buckets");
            return;
        };
        if sum_other_doc_count(agg) > 0 {
            exhaustive = false;
        }

        let entries = buckets.entries();
        let has_missing_bucket = entries.iter().any(|(key, _)| is_missing_key(key));

        let mut filters = steps.iter().flat_map(ancestor_filters).collect::<Vec<_>>();
        if !field.scripted && (!path.terms.missing_bucket || has_missing_bucket) {
            filters.push(build_exists_filter(field));
        }

        let mut excluded_keys = Vec::new();
        for (bucket_key, bucket) in entries {
            if is_missing_key(&bucket_key) || is_merged_other(&bucket_key, bucket) {
                continue;
            }
            filters.push(builder.phrase_filter(field, &bucket_key).negated());
            excluded_keys.push(bucket_key);
        }

        clauses.insert(
            key.clone(),
            OtherClause {
                query: build_query_from_filters(&filters),
                excluded_keys,
            },
        );
    });

    if clauses.is_empty() {
        OtherBucketBuild::NoBuckets
    } else if exhaustive {
        OtherBucketBuild::Exhaustive
    } else {
        OtherBucketBuild::Request(OtherBucketRequest {
            clauses,
            aggs,
            sampling,
        })
    }
}

/// The filters restricting documents to the ancestor bucket `step`.
fn ancestor_filters(step: &PathStep) -> Vec<Filter> {
    if let Some(filters) = &step.filters {
        match from_value::<Vec<Filter>>(filters.clone()) {
            Ok(filters) => return filters,
            Err(e) => {
                warn!(agg_id = %step.config.id, error = %e, "ignoring unreadable bucket filters")
            }
        }
    }

    match step.config.create_filter(&step.key) {
        Some(filter) => vec![filter],
        None => {
            warn!(agg_id = %step.config.id, key = %step.key, "no filter for ancestor bucket");
            Vec::new()
        }
    }
}

pub(crate) fn is_missing_key(key: &Value) -> bool {
    key.as_str() == Some(MISSING_BUCKET_KEY)
}

/// A bucket appended by an earlier merge rather than returned by the search.
fn is_merged_other(key: &Value, bucket: &Value) -> bool {
    key.as_str() == Some(OTHER_BUCKET_KEY) && bucket.get("filters").is_some()
}

#[cfg(test)]
mod tests {
    use crate::other_bucket::builder::*;
    use crate::other_bucket::path_key::PathKey;
    use crate::other_bucket::reader::read_agg_path;
    use crate::testing::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn test_skips_missing_and_merged_buckets() {
        let configs = single_term();
        let path = read_agg_path(&configs, "1").expect("failed to read path");
        let response = json! {
            {
                "1": {
                    "sum_other_doc_count": 4,
                    "buckets": [
                        { "key": "ios", "doc_count": 2 },
                        { "key": "__missing__", "doc_count": 1 },
                        { "key": "__other__", "doc_count": 4, "filters": [] }
                    ]
                }
            }
        };

        let request = build_request(&path, &response, None, None)
            .into_request()
            .expect("expected a request");
        let clause = request.clause(&PathKey::root().to_string()).expect("no root clause");

        assert_eq!(clause.excluded_keys, vec![json!("ios")]);
        assert_eq!(
            clause.query.to_dsl(),
            json! {
                {
                    "bool": {
                        "must": [],
                        "filter": [{ "exists": { "field": "machine.os.raw" } }],
                        "should": [],
                        "must_not": [{ "match_phrase": { "machine.os.raw": "ios" } }]
                    }
                }
            }
        );
    }

    #[test]
    fn test_missing_bucket_without_missing_result_skips_exists() {
        let configs = single_term();
        let path = read_agg_path(&configs, "1").expect("failed to read path");
        let response = json! {
            {
                "1": {
                    "sum_other_doc_count": 4,
                    "buckets": [{ "key": "ios", "doc_count": 2 }]
                }
            }
        };

        let request = build_request(&path, &response, None, None)
            .into_request()
            .expect("expected a request");
        let dsl = request.clause(PathKey::root().as_str()).expect("no root clause").query.to_dsl();
        assert_eq!(dsl["bool"]["filter"], json!([]));
    }

    #[test]
    fn test_unreadable_ancestor_filters_fall_back_to_key() {
        let configs = nested_term();
        let path = read_agg_path(&configs, "2").expect("failed to read path");
        let response = json! {
            {
                "1": {
                    "buckets": [
                        {
                            "key": "US",
                            "filters": "not a list",
                            "2": {
                                "sum_other_doc_count": 1,
                                "buckets": [{ "key": "ios", "doc_count": 1 }]
                            }
                        }
                    ]
                }
            }
        };

        let request = build_request(&path, &response, None, None)
            .into_request()
            .expect("expected a request");
        let dsl = request
            .clause(PathKey::from_keys(["US"]).as_str())
            .expect("no clause")
            .query
            .to_dsl();
        assert_eq!(dsl["bool"]["filter"][0], json!({ "match_phrase": { "geo.src": "US" } }));
    }

    #[test]
    fn test_request_dsl_carries_children() {
        let configs = single_term();
        let path = read_agg_path(&configs, "1").expect("failed to read path");
        let response = single_term_response();
        let children = json!({ "3": { "sum": { "field": "bytes" } } });

        let request = build_request(
            &path,
            &response["aggregations"],
            children.as_object().cloned(),
            None,
        )
        .into_request()
        .expect("expected a request");

        assert_eq!(request.to_dsl()["other-filter"]["aggs"], children);
    }

    #[test]
    fn test_build_outcomes() {
        assert!(OtherBucketBuild::Request(OtherBucketRequest {
            clauses: IndexMap::new(),
            aggs: None,
            sampling: None,
        })
        .is_needed());
        assert!(!OtherBucketBuild::Exhaustive.is_needed());
        assert_eq!(OtherBucketBuild::NoBuckets.into_request(), None);
    }
}

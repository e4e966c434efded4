//! The aggregation pipeline: an ordered list of bucket and metric aggregations
//! that nest into one another in pipeline order.

use crate::error::{OtherBucketError, Result};
use crate::other_bucket::sampling::{is_sampling_enabled, SamplingOptions};
use crate::other_bucket::MISSING_BUCKET_KEY;
use crate::query_dsl::field_exists::build_exists_filter;
use crate::query_dsl::phrase::filter_builder_for;
use crate::query_dsl::range::build_range_filter;
use crate::query_dsl::Filter;
use crate::utils::json_to_string;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::{json, Value};

pub mod builders;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggConfigs {
    pub aggs: Vec<AggConfig>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub sampler_seed: Option<u64>,
    #[serde(default)]
    pub hierarchical: bool,
}

impl AggConfigs {
    pub fn new(aggs: Vec<AggConfig>) -> Result<Self> {
        AggConfigs {
            aggs,
            probability: None,
            sampler_seed: None,
            hierarchical: false,
        }
        .validate()
    }

    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str::<AggConfigs>(input)?.validate()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value::<AggConfigs>(value)?.validate()
    }

    fn validate(self) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for agg in &self.aggs {
            if !seen.insert(agg.id.as_str()) {
                return Err(OtherBucketError::DuplicateId(agg.id.clone()));
            }
        }
        Ok(self)
    }

    pub fn with_sampling(mut self, probability: f64, seed: Option<u64>) -> Self {
        self.probability = Some(probability);
        self.sampler_seed = seed;
        self
    }

    pub fn with_hierarchical(mut self, hierarchical: bool) -> Self {
        self.hierarchical = hierarchical;
        self
    }

    pub fn sampling(&self) -> Option<SamplingOptions> {
        if is_sampling_enabled(self.probability) {
            self.probability.map(|probability| SamplingOptions {
                probability,
                seed: self.sampler_seed,
            })
        } else {
            None
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&AggConfig> {
        self.aggs.iter().find(|agg| agg.id == id)
    }

    /// Enabled bucket aggregations, in the order they nest.
    pub fn bucket_aggs(&self) -> impl Iterator<Item = &AggConfig> {
        self.aggs
            .iter()
            .filter(|agg| agg.enabled && agg.kind.is_bucket())
    }

    /// Enabled metric aggregations, in pipeline order.
    pub fn metric_aggs(&self) -> impl Iterator<Item = &AggConfig> {
        self.aggs
            .iter()
            .filter(|agg| agg.enabled && !agg.kind.is_bucket())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawAggConfig")]
pub struct AggConfig {
    pub id: String,
    pub enabled: bool,
    pub kind: AggKind,
}

#[derive(Deserialize)]
struct RawAggConfig {
    id: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(rename = "type")]
    agg_type: String,
    #[serde(default)]
    params: Value,
}

fn default_enabled() -> bool {
    true
}

impl TryFrom<RawAggConfig> for AggConfig {
    type Error = serde_json::Error;

    fn try_from(raw: RawAggConfig) -> std::result::Result<Self, Self::Error> {
        // `count` takes no params, whatever the config carries
        let tagged = if raw.params.is_null() || raw.agg_type == "count" {
            json! {{ "type": raw.agg_type }}
        } else {
            json! {{ "type": raw.agg_type, "params": raw.params }}
        };

        Ok(AggConfig {
            id: raw.id,
            enabled: raw.enabled,
            kind: serde_json::from_value(tagged)?,
        })
    }
}

impl AggConfig {
    pub fn new(id: &str, kind: AggKind) -> Self {
        AggConfig {
            id: id.to_string(),
            enabled: true,
            kind,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The filter that selects the documents of the bucket keyed `key`.
    pub fn create_filter(&self, key: &Value) -> Option<Filter> {
        match &self.kind {
            AggKind::Terms(terms) => {
                if key.as_str() == Some(MISSING_BUCKET_KEY) {
                    Some(build_exists_filter(&terms.field).negated())
                } else {
                    Some(filter_builder_for(&terms.field).phrase_filter(&terms.field, key))
                }
            }
            AggKind::Filters(filters) => {
                let key = json_to_string(key)?;
                filters
                    .filters
                    .iter()
                    .find(|entry| entry.key() == key)
                    .map(|entry| Filter::custom(&key, entry.query()))
            }
            AggKind::Histogram(histogram) => {
                let from = key.as_f64()?;
                Some(build_range_filter(
                    &histogram.field,
                    from,
                    from + histogram.interval,
                ))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum AggKind {
    Terms(TermsParams),
    Filters(FiltersParams),
    Histogram(HistogramParams),
    Count,
    Avg(MetricParams),
    Sum(MetricParams),
    Min(MetricParams),
    Max(MetricParams),
    Cardinality(MetricParams),
}

impl AggKind {
    pub fn is_bucket(&self) -> bool {
        matches!(
            self,
            AggKind::Terms(_) | AggKind::Filters(_) | AggKind::Histogram(_)
        )
    }

    pub fn as_terms(&self) -> Option<&TermsParams> {
        match self {
            AggKind::Terms(terms) => Some(terms),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "FieldRepr")]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: Option<String>,
    pub scripted: bool,
    pub script: Option<String>,
    pub lang: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Name(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        field_type: Option<String>,
        #[serde(default)]
        scripted: bool,
        #[serde(default)]
        script: Option<String>,
        #[serde(default)]
        lang: Option<String>,
    },
}

impl From<FieldRepr> for FieldDescriptor {
    fn from(repr: FieldRepr) -> Self {
        match repr {
            FieldRepr::Name(name) => FieldDescriptor::new(&name),
            FieldRepr::Full {
                name,
                field_type,
                scripted,
                script,
                lang,
            } => FieldDescriptor {
                name,
                field_type,
                scripted,
                script,
                lang,
            },
        }
    }
}

impl FieldDescriptor {
    pub fn new(name: &str) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            field_type: None,
            scripted: false,
            script: None,
            lang: None,
        }
    }

    pub fn scripted(name: &str, script: &str, lang: Option<&str>) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            field_type: None,
            scripted: true,
            script: Some(script.to_string()),
            lang: lang.map(str::to_string),
        }
    }

    pub fn with_type(mut self, field_type: &str) -> Self {
        self.field_type = Some(field_type.to_string());
        self
    }

    pub fn is_painless(&self) -> bool {
        self.lang.as_deref() == Some("painless")
    }

    /// The `script` object used wherever a scripted field replaces `field`.
    pub fn script_dsl(&self) -> Value {
        let mut script = json! {{ "source": self.script.as_deref().unwrap_or_default() }};
        if let Some(lang) = &self.lang {
            script["lang"] = json!(lang);
        }
        script
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// The `order` param, `{ "value": "asc" | "desc", "text": ... }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct TermsOrder {
    #[serde(default)]
    pub value: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsParams {
    pub field: FieldDescriptor,
    #[serde(default = "default_terms_size")]
    pub size: u32,
    /// `_key`, `_count`, or the id of the metric aggregation to order by.
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order: TermsOrder,
    #[serde(default)]
    pub other_bucket: bool,
    #[serde(default)]
    pub missing_bucket: bool,
    /// Display labels, carried through untouched.
    #[serde(default)]
    pub other_bucket_label: Option<String>,
    #[serde(default)]
    pub missing_bucket_label: Option<String>,
}

fn default_terms_size() -> u32 {
    5
}

impl TermsParams {
    pub fn new(field: FieldDescriptor, size: u32) -> Self {
        TermsParams {
            field,
            size,
            order_by: None,
            order: TermsOrder::default(),
            other_bucket: false,
            missing_bucket: false,
            other_bucket_label: None,
            missing_bucket_label: None,
        }
    }

    pub fn with_other_bucket(mut self, other_bucket: bool) -> Self {
        self.other_bucket = other_bucket;
        self
    }

    pub fn with_order(mut self, order_by: &str, direction: SortDirection) -> Self {
        self.order_by = Some(order_by.to_string());
        self.order = TermsOrder { value: direction };
        self
    }

    pub fn with_missing_bucket(mut self, missing_bucket: bool) -> Self {
        self.missing_bucket = missing_bucket;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FiltersParams {
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub input: FilterInput,
    #[serde(default)]
    pub query_dsl: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FilterInput {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl FilterEntry {
    pub fn new(label: &str, query: &str) -> Self {
        FilterEntry {
            label: label.to_string(),
            input: FilterInput {
                query: query.to_string(),
                language: None,
            },
            query_dsl: None,
        }
    }

    /// The bucket key this entry produces in a `filters` response.
    pub fn key(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.input.query.is_empty() {
            &self.input.query
        } else {
            "*"
        }
    }

    pub fn query(&self) -> Value {
        match &self.query_dsl {
            Some(query_dsl) => query_dsl.clone(),
            None if self.input.query.trim().is_empty() => {
                // an empty query means to match everything
                json! {{ "match_all": {} }}
            }
            None => json! {{ "query_string": { "query": self.input.query } }},
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramParams {
    pub field: FieldDescriptor,
    pub interval: f64,
    #[serde(default)]
    pub min_doc_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricParams {
    pub field: FieldDescriptor,
}

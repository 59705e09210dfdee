use crate::url::DomainKey;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Attribute added to every record holding its dedup key
pub const DOMAIN_FIELD: &str = "normalized_domain";

/// Attribute added to every record holding the query that produced it
pub const QUERY_FIELD: &str = "query";

/// Position of a query in the submitted list
pub type QueryId = usize;

/// One input query
///
/// Query strings are not required to be unique; the id tells duplicates apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub id: QueryId,
    pub text: Arc<str>,
}

impl Query {
    pub fn new(id: QueryId, text: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Builds queries from an ordered list, numbering them from zero
    pub fn from_list<I, S>(queries: I) -> Vec<Query>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        queries
            .into_iter()
            .enumerate()
            .map(|(id, text)| Query::new(id, text))
            .collect()
    }
}

/// One entry from a search API response page
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The query whose page contained this result
    pub query: Query,

    /// Result URL, taken from the `link` (or `url`) attribute
    ///
    /// `None` when the entry has neither. Such a result still counts toward
    /// its page but can never be admitted.
    pub url: Option<String>,

    /// Every attribute of the API entry, in response order
    pub attributes: Map<String, Value>,
}

impl SearchResult {
    /// Builds a result from a raw API entry
    pub fn from_entry(query: Query, attributes: Map<String, Value>) -> Self {
        let url = ["link", "url"]
            .iter()
            .find_map(|key| attributes.get(*key).and_then(Value::as_str))
            .map(str::to_string);

        Self {
            query,
            url,
            attributes,
        }
    }
}

/// A search result accepted by the aggregator
///
/// The field map holds the original attributes plus the provenance fields
/// [`DOMAIN_FIELD`] and [`QUERY_FIELD`].
#[derive(Debug, Clone)]
pub struct Record {
    pub domain: DomainKey,
    pub query: Query,
    pub fields: Map<String, Value>,
}

impl Record {
    pub(crate) fn admit(result: SearchResult, domain: DomainKey) -> Self {
        let mut fields = result.attributes;
        fields.insert(
            DOMAIN_FIELD.to_string(),
            Value::String(domain.as_str().to_string()),
        );
        fields.insert(
            QUERY_FIELD.to_string(),
            Value::String(result.query.text.to_string()),
        );

        Self {
            domain,
            query: result.query,
            fields,
        }
    }
}

use serde::Serialize;
use std::collections::BTreeMap;

pub const SEARCH_TERM: &str = "searchTerm";
pub const SORT: &str = "sort";
pub const LIMIT: &str = "limit";
pub const PAGE: &str = "page";
pub const FIELDS: &str = "fields";
pub const EXCLUDE: &str = "exclude";

/// Keys consumed by the builder itself; every other key is a filter predicate.
pub const RESERVED_KEYS: &[&str] = &[SEARCH_TERM, SORT, LIMIT, PAGE, FIELDS, EXCLUDE];

/// A single query-string value: either a plain string or an operator map
/// such as `price[gte]=10&price[lte]=50`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Scalar(String),
    Nested(BTreeMap<String, String>),
}

impl QueryValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Nested(_) => None,
        }
    }
}

/// Query-string mapping of one incoming request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryParams {
    entries: BTreeMap<String, QueryValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from decoded key/value pairs in request order.
    ///
    /// Keys written as `name[op]` are grouped into a nested operator map under
    /// `name`. A repeated plain key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            match split_bracket_key(key) {
                Some((outer, operator)) => {
                    params.insert_nested(outer, operator, value);
                }
                None => {
                    params.insert(key, value);
                }
            }
        }

        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries
            .insert(key.into(), QueryValue::Scalar(value.into()));
        self
    }

    pub fn insert_nested(
        &mut self,
        key: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let entry = self
            .entries
            .entry(key.into())
            .or_insert_with(|| QueryValue::Nested(BTreeMap::new()));

        if let QueryValue::Scalar(_) = entry {
            *entry = QueryValue::Nested(BTreeMap::new());
        }
        if let QueryValue::Nested(operators) = entry {
            operators.insert(operator.into(), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// Scalar value for `key`; nested values read as absent.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_scalar)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the mapping with the builder's own keys removed.
    pub fn without_reserved(&self) -> Self {
        let mut copy = self.clone();
        for key in RESERVED_KEYS {
            copy.entries.remove(*key);
        }
        copy
    }
}

/// `price[gte]` -> `("price", "gte")`
fn split_bracket_key(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    let outer = &key[..open];

    if outer.is_empty() || inner.is_empty() || inner.contains('[') {
        return None;
    }
    Some((outer, inner))
}

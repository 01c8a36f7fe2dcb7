use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Predicate key holding the disjunction produced by a search.
pub const OR_KEY: &str = "OR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One ordering entry, serialized as `{"<field>": "asc" | "desc"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// `-name` is descending, `name` ascending. A bare `-` names no field.
    pub fn parse(raw: &str) -> Option<Self> {
        let order = match raw.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(raw),
        };
        if order.field.is_empty() {
            None
        } else {
            Some(order)
        }
    }
}

impl Serialize for OrderBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.direction)?;
        map.end()
    }
}

/// Case-insensitive substring match on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCondition {
    pub field: String,
    pub term: String,
}

impl SearchCondition {
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
        }
    }
}

#[derive(Serialize)]
struct Contains<'a> {
    contains: &'a str,
    mode: &'static str,
}

impl Serialize for SearchCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.field,
            &Contains {
                contains: &self.term,
                mode: "insensitive",
            },
        )?;
        map.end()
    }
}

/// Value stored under one predicate key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Condition {
    /// Any of the search conditions (stored under [`OR_KEY`])
    Any(Vec<SearchCondition>),
    /// Exact match against the raw query-string value
    Equals(String),
    /// Numeric comparisons keyed by operator (`gte`, `lt`, ...)
    Operators(BTreeMap<String, f64>),
}

/// Predicate clause; keys are field names or [`OR_KEY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WhereClause(BTreeMap<String, Condition>);

impl WhereClause {
    pub fn insert(&mut self, key: impl Into<String>, condition: Condition) {
        self.0.insert(key.into(), condition);
    }

    pub fn get(&self, key: &str) -> Option<&Condition> {
        self.0.get(key)
    }

    /// Entries of `other` replace entries with the same key.
    pub fn merge(&mut self, other: WhereClause) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Field selection mapping; `true` includes a field, `false` leaves it out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, bool>);

impl Selection {
    pub fn set(&mut self, field: impl Into<String>, included: bool) {
        self.0.insert(field.into(), included);
    }

    pub fn get(&self, field: &str) -> Option<bool> {
        self.0.get(field).copied()
    }

    pub fn has_included(&self) -> bool {
        self.0.values().any(|included| *included)
    }

    pub fn all_included(&self) -> bool {
        self.0.values().all(|included| *included)
    }

    /// Force `fallback` on when nothing is included; the ORM rejects an
    /// all-false selection.
    pub fn ensure_included(&mut self, fallback: &str) {
        if !self.has_included() {
            self.set(fallback, true);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &bool)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Selection {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Options handed to [`ModelDelegate::find_many`](crate::model::ModelDelegate::find_many)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Selection>,
}

/// Options handed to [`ModelDelegate::count`](crate::model::ModelDelegate::count)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountOptions {
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
}

/// Pagination summary returned next to a page of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: u64,
    /// Records per page
    pub limit: u64,
    /// Records matching the predicate across all pages
    pub total: u64,
    /// Number of pages
    pub total_page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_by_parse() {
        assert_eq!(OrderBy::parse("name"), Some(OrderBy::asc("name")));
        assert_eq!(OrderBy::parse("-age"), Some(OrderBy::desc("age")));
        assert_eq!(OrderBy::parse("-"), None);
        assert_eq!(OrderBy::parse(""), None);
    }

    #[test]
    fn test_query_options_wire_shape() {
        let mut where_clause = WhereClause::default();
        where_clause.insert(
            OR_KEY,
            Condition::Any(vec![SearchCondition::new("title", "rust")]),
        );
        where_clause.insert("status", Condition::Equals("active".to_string()));
        where_clause.insert(
            "price",
            Condition::Operators(BTreeMap::from([("gte".to_string(), 10.0)])),
        );

        let options = QueryOptions {
            where_clause: Some(where_clause),
            order_by: Some(vec![OrderBy::desc("createdAt")]),
            skip: Some(0),
            take: Some(10),
            select: Some([("title", true), ("secret", false)].into_iter().collect()),
        };

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({
                "where": {
                    "OR": [{"title": {"contains": "rust", "mode": "insensitive"}}],
                    "price": {"gte": 10.0},
                    "status": "active"
                },
                "orderBy": [{"createdAt": "desc"}],
                "skip": 0,
                "take": 10,
                "select": {"secret": false, "title": true}
            })
        );
    }

    #[test]
    fn test_empty_options_serialize_to_empty_object() {
        let value = serde_json::to_value(QueryOptions::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_where_merge_overwrites_overlapping_keys() {
        let mut base = WhereClause::default();
        base.insert(OR_KEY, Condition::Any(vec![SearchCondition::new("name", "a")]));
        base.insert("status", Condition::Equals("draft".to_string()));

        let mut incoming = WhereClause::default();
        incoming.insert("status", Condition::Equals("published".to_string()));

        base.merge(incoming);
        assert_eq!(base.len(), 2);
        assert_eq!(
            base.get("status"),
            Some(&Condition::Equals("published".to_string()))
        );
        assert!(matches!(base.get(OR_KEY), Some(Condition::Any(_))));
    }

    #[test]
    fn test_selection_ensure_included() {
        let mut selection: Selection = [("email", false)].into_iter().collect();
        selection.ensure_included("id");
        assert_eq!(selection.get("id"), Some(true));
        assert_eq!(selection.get("email"), Some(false));

        let mut selection: Selection = [("name", true)].into_iter().collect();
        selection.ensure_included("id");
        assert_eq!(selection.get("id"), None);
    }

    #[test]
    fn test_pagination_meta_camel_case() {
        let meta = PaginationMeta {
            page: 1,
            limit: 10,
            total: 3,
            total_page: 1,
        };
        let value = serde_json::to_value(meta).unwrap();
        assert_eq!(value["totalPage"], 1);
    }
}

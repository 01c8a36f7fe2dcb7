use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

use crate::model::{ModelDelegate, Record};
use crate::query::options::{
    Condition, CountOptions, OrderBy, QueryOptions, SearchCondition, Selection, SortDirection,
    WhereClause,
};

/// Model handle over records held in memory.
///
/// Interprets the same options shape an ORM would receive: `OR` search
/// conditions, scalar equality, numeric operators, ordering, skip/take and
/// selection.
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    records: Vec<Record>,
}

impl MemoryModel {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Build from JSON values; every value must be an object.
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Object(record) => Ok(record),
                other => bail!("Record {} is not an object: {}", index, other),
            })
            .collect::<Result<Vec<_>>>()
            .context("Failed to build in-memory model")?;
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Union of record keys in first-seen order
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }
        names
    }

    fn matching(&self, clause: Option<&WhereClause>) -> Result<Vec<&Record>> {
        let mut matched = Vec::new();
        for record in &self.records {
            if matches_clause(record, clause)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl ModelDelegate for MemoryModel {
    async fn find_many(&self, options: &QueryOptions) -> Result<Vec<Record>> {
        let mut matched = self.matching(options.where_clause.as_ref())?;

        if let Some(order_by) = &options.order_by {
            matched.sort_by(|a, b| compare_records(a, b, order_by));
        }

        let skip = usize::try_from(options.skip.unwrap_or(0)).unwrap_or(usize::MAX);
        let take = options
            .take
            .map(|take| usize::try_from(take).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|record| project(record, options.select.as_ref()))
            .collect())
    }

    async fn count(&self, options: &CountOptions) -> Result<u64> {
        let matched = self.matching(options.where_clause.as_ref())?;
        Ok(matched.len() as u64)
    }
}

fn matches_clause(record: &Record, clause: Option<&WhereClause>) -> Result<bool> {
    let clause = match clause {
        Some(clause) => clause,
        None => return Ok(true),
    };

    for (key, condition) in clause.iter() {
        let matched = match condition {
            Condition::Any(conditions) => conditions.iter().any(|c| matches_search(record, c)),
            Condition::Equals(expected) => record
                .get(key)
                .map(|value| equals_raw(value, expected))
                .unwrap_or(false),
            Condition::Operators(operators) => {
                let actual = record.get(key).and_then(Value::as_f64);
                let mut all = true;
                for (operator, operand) in operators {
                    if !compare_numeric(operator, actual, *operand)
                        .with_context(|| format!("Invalid filter on field `{}`", key))?
                    {
                        all = false;
                    }
                }
                all
            }
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn matches_search(record: &Record, condition: &SearchCondition) -> bool {
    match record.get(&condition.field) {
        Some(Value::String(text)) => text
            .to_lowercase()
            .contains(&condition.term.to_lowercase()),
        _ => false,
    }
}

/// Compare a stored value with a raw query-string value
fn equals_raw(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(text) => text == expected,
        Value::Number(number) => expected
            .trim()
            .parse::<f64>()
            .ok()
            .zip(number.as_f64())
            .map(|(a, b)| a == b)
            .unwrap_or(false),
        Value::Bool(flag) => expected == flag.to_string(),
        _ => false,
    }
}

fn compare_numeric(operator: &str, actual: Option<f64>, operand: f64) -> Result<bool> {
    let matched = match (operator, actual) {
        ("equals", Some(v)) => v == operand,
        ("not", Some(v)) => v != operand,
        ("not", None) => true,
        ("gt", Some(v)) => v > operand,
        ("gte", Some(v)) => v >= operand,
        ("lt", Some(v)) => v < operand,
        ("lte", Some(v)) => v <= operand,
        ("equals" | "gt" | "gte" | "lt" | "lte", None) => false,
        (unknown, _) => bail!("Unknown filter operator `{}`", unknown),
    };
    Ok(matched)
}

fn compare_records(a: &Record, b: &Record, order_by: &[OrderBy]) -> Ordering {
    for order in order_by {
        let ordering = compare_values(a.get(&order.field), b.get(&order.field));
        let ordering = match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Nulls and missing values sort after everything else in ascending order.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Bool(_)) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 3,
        Some(Value::Null) | None => 4,
    }
}

fn project(record: &Record, selection: Option<&Selection>) -> Record {
    match selection {
        None => record.clone(),
        Some(selection) => record
            .iter()
            .filter(|(key, _)| selection.get(key) == Some(true))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}

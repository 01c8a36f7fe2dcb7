use std::collections::BTreeMap;
use tracing::debug;

use crate::model::{Model, Record};
use crate::query::defaults::QueryDefaults;
use crate::query::error::QueryError;
use crate::query::options::{
    Condition, CountOptions, OrderBy, PaginationMeta, QueryOptions, SearchCondition, Selection,
    WhereClause, OR_KEY,
};
use crate::query::params::{
    QueryParams, QueryValue, EXCLUDE, FIELDS, LIMIT, PAGE, SEARCH_TERM, SORT,
};
use crate::query::parse::{parse_leading_number, parse_positive_or, split_list};

/// Turns one request's query-string mapping into [`QueryOptions`] and runs
/// them against a model.
///
/// Steps must run in this order: `search`, `filter`, `sort`, `paginate`,
/// `fields`/`exclude`, then `execute` and `count_total`. `filter` replaces
/// predicate keys written by `search`, and `fields`/`exclude` rebuild the
/// selection.
///
/// ```ignore
/// let mut builder = QueryBuilder::new(model, params, ["name", "email"])
///     .search(&["name"])
///     .filter()?
///     .sort()
///     .paginate()
///     .fields()
///     .exclude();
/// let data = builder.execute().await?;
/// let meta = builder.count_total().await?;
/// ```
pub struct QueryBuilder {
    model: Model,
    params: QueryParams,
    model_keys: Vec<String>,
    defaults: QueryDefaults,
    options: QueryOptions,
}

impl QueryBuilder {
    pub fn new<I, S>(model: Model, params: QueryParams, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_defaults(model, params, keys, QueryDefaults::default())
    }

    pub fn with_defaults<I, S>(
        model: Model,
        params: QueryParams,
        keys: I,
        defaults: QueryDefaults,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut model_keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if !model_keys.contains(&defaults.primary_key) {
            model_keys.push(defaults.primary_key.clone());
        }

        Self {
            model,
            params,
            model_keys,
            defaults,
            options: QueryOptions::default(),
        }
    }

    /// Options accumulated so far
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Known model fields, primary key included
    pub fn model_keys(&self) -> &[String] {
        &self.model_keys
    }

    /// Match `searchTerm` case-insensitively against any of `searchable_fields`
    pub fn search<S: AsRef<str>>(mut self, searchable_fields: &[S]) -> Self {
        let term = match self.params.scalar(SEARCH_TERM) {
            Some(term) if !term.is_empty() => term.to_string(),
            _ => return self,
        };

        let conditions = searchable_fields
            .iter()
            .map(|field| SearchCondition::new(field.as_ref(), term.as_str()))
            .collect();

        self.where_mut().insert(OR_KEY, Condition::Any(conditions));
        self
    }

    /// Turn every non-reserved key into a predicate entry.
    ///
    /// Nested operator values must be numeric.
    pub fn filter(mut self) -> Result<Self, QueryError> {
        let mut filters = WhereClause::default();

        for (key, value) in self.params.without_reserved().iter() {
            let condition = match value {
                QueryValue::Nested(operators) => {
                    let mut parsed = BTreeMap::new();
                    for (operator, raw) in operators {
                        let number = parse_leading_number(raw).ok_or_else(|| {
                            debug!(
                                field = %key,
                                operator = %operator,
                                value = %raw,
                                "Non-numeric filter value"
                            );
                            QueryError::InvalidFilterValue {
                                operator: operator.clone(),
                            }
                        })?;
                        parsed.insert(operator.clone(), number);
                    }
                    Condition::Operators(parsed)
                }
                QueryValue::Scalar(raw) => Condition::Equals(raw.clone()),
            };
            filters.insert(key.clone(), condition);
        }

        self.where_mut().merge(filters);
        Ok(self)
    }

    /// Order by the comma-separated `sort` list; `-field` sorts descending
    pub fn sort(mut self) -> Self {
        let mut order_by: Vec<OrderBy> = self
            .params
            .scalar(SORT)
            .map(split_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|field| OrderBy::parse(field))
            .collect();

        if order_by.is_empty() {
            order_by.push(OrderBy::desc(self.defaults.sort_field.as_str()));
        }

        self.options.order_by = Some(order_by);
        self
    }

    pub fn paginate(mut self) -> Self {
        let (page, limit) = self.page_and_limit();
        self.options.skip = Some(page.saturating_sub(1).saturating_mul(limit));
        self.options.take = Some(limit);
        self
    }

    /// Select only the fields named in `fields`; `-field` leaves one out
    pub fn fields(mut self) -> Self {
        let requested = self.requested_fields();
        if requested.is_empty() {
            return self;
        }

        let mut selection = Selection::default();
        for field in &requested {
            match field.strip_prefix('-') {
                Some(excluded) => selection.set(excluded, false),
                None => selection.set(field.as_str(), true),
            }
        }
        selection.ensure_included(&self.defaults.primary_key);

        self.options.select = Some(selection);
        self
    }

    /// Leave out the fields named in `exclude`, keeping every other model field
    pub fn exclude(mut self) -> Self {
        let excluded = self.excluded_fields();
        if excluded.is_empty() {
            return self;
        }

        let selection = self.options.select.get_or_insert_with(Selection::default);
        if selection.is_empty() {
            for key in &self.model_keys {
                selection.set(key.as_str(), true);
            }
        }
        for field in excluded {
            selection.set(field, false);
        }
        selection.ensure_included(&self.defaults.primary_key);

        self
    }

    /// Run the list query.
    ///
    /// When `fields` was requested without naming the primary key, the key is
    /// stripped from every record even if the model returned it.
    pub async fn execute(&mut self) -> Result<Vec<Record>, QueryError> {
        self.finalize_selection();

        debug!(
            "Executing list query: {}",
            serde_json::to_string(&self.options).unwrap_or_default()
        );

        let mut records = self.model.find_many(&self.options).await?;

        let requested = self.requested_fields();
        if self.fields_given() && !requested.contains(&self.defaults.primary_key) {
            for record in &mut records {
                record.remove(&self.defaults.primary_key);
            }
        }

        debug!("Query returned {} records", records.len());
        Ok(records)
    }

    /// Count records matching the predicate and summarize pagination.
    ///
    /// Ordering, selection and skip/take are not passed to the model.
    pub async fn count_total(&self) -> Result<PaginationMeta, QueryError> {
        let count_options = CountOptions {
            where_clause: self.options.where_clause.clone(),
        };
        let total = self.model.count(&count_options).await?;
        let (page, limit) = self.page_and_limit();

        debug!("Query matched {} records", total);
        Ok(PaginationMeta {
            page,
            limit,
            total,
            total_page: total.div_ceil(limit),
        })
    }

    fn where_mut(&mut self) -> &mut WhereClause {
        self.options
            .where_clause
            .get_or_insert_with(WhereClause::default)
    }

    fn page_and_limit(&self) -> (u64, u64) {
        (
            parse_positive_or(self.params.scalar(PAGE), self.defaults.page.max(1)),
            parse_positive_or(self.params.scalar(LIMIT), self.defaults.limit.max(1)),
        )
    }

    fn requested_fields(&self) -> Vec<String> {
        self.params.scalar(FIELDS).map(split_list).unwrap_or_default()
    }

    /// A non-empty raw `fields` value counts as a request even when it
    /// names nothing after splitting.
    fn fields_given(&self) -> bool {
        self.params.scalar(FIELDS).is_some_and(|raw| !raw.is_empty())
    }

    fn excluded_fields(&self) -> Vec<String> {
        self.params.scalar(EXCLUDE).map(split_list).unwrap_or_default()
    }

    /// Bring the selection into a shape the model accepts
    fn finalize_selection(&mut self) {
        let fields_requested = self.fields_given();
        let exclude_requested = !self.excluded_fields().is_empty();
        let primary_key = self.defaults.primary_key.clone();

        let drop_selection = match self.options.select.as_mut() {
            None => false,
            Some(selection) if selection.is_empty() => true,
            Some(selection) if fields_requested => {
                selection.ensure_included(&primary_key);
                false
            }
            Some(_) if exclude_requested => false,
            // Selecting everything is the same as no selection
            Some(selection) => selection.all_included(),
        };

        if drop_selection {
            self.options.select = None;
        }
    }
}

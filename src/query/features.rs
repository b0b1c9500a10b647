//! # Query Features
//!
//! Stage-by-stage narrowing of a not-yet-executed collection query from
//! request parameters. The four stages run in a fixed order (filter, sort,
//! field selection, pagination) and none of them can fail: unusable numeric
//! input falls back to defaults instead of erroring.

use super::predicate::{build_predicate, Predicate};
use super::request::RawQuery;

/// Default page number when `page` is absent or unusable.
pub const DEFAULT_PAGE: usize = 1;

/// Default page size when `limit` is absent or unusable.
pub const DEFAULT_LIMIT: usize = 100;

/// Field used for the default ordering of results.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Store-internal optimistic versioning field, hidden from clients unless
/// explicitly requested.
pub const VERSION_FIELD: &str = "_version";

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parses `-price` into a descending key and `price` into an ascending
    /// one. Empty tokens parse to nothing.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(field) = token.strip_prefix('-') {
            if field.is_empty() {
                return None;
            }
            return Some(Self::desc(field));
        }
        if token.is_empty() {
            return None;
        }
        Some(Self::asc(token))
    }
}

/// Field projection: either an allow-list or a deny-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

/// A not-yet-executed query that can be progressively narrowed.
///
/// Every operation consumes the handle and returns the narrowed one, so a
/// handle never aliases partially applied state.
pub trait Queryable: Sized {
    fn filter(self, predicate: Predicate) -> Self;
    fn sort(self, keys: Vec<SortKey>) -> Self;
    fn select(self, projection: Projection) -> Self;
    fn skip(self, count: usize) -> Self;
    fn limit(self, count: usize) -> Self;
}

/// Applies request parameters to a [`Queryable`] in four fixed stages.
///
/// The caller executes the narrowed query afterwards; this builder performs
/// no I/O and never inspects results.
#[derive(Debug)]
pub struct QueryFeatures<'a, Q: Queryable> {
    query: Q,
    raw: &'a RawQuery,
}

impl<'a, Q: Queryable> QueryFeatures<'a, Q> {
    pub fn new(query: Q, raw: &'a RawQuery) -> Self {
        Self { query, raw }
    }

    /// Narrows by every non-reserved parameter.
    pub fn filter(mut self) -> Self {
        self.query = self.query.filter(build_predicate(self.raw));
        self
    }

    /// Orders by the `sort` parameter; newest-first when absent or empty, so
    /// pagination stays reproducible across calls.
    pub fn sort(mut self) -> Self {
        let mut keys: Vec<SortKey> = match self.raw.get("sort") {
            Some(list) => list.split(',').filter_map(SortKey::parse).collect(),
            None => Vec::new(),
        };
        if keys.is_empty() {
            keys.push(SortKey::desc(CREATED_AT_FIELD));
        }
        self.query = self.query.sort(keys);
        self
    }

    /// Projects to the `fields` allow-list; without one, only the store's
    /// version bookkeeping field is denied.
    pub fn limit_fields(mut self) -> Self {
        let fields: Vec<String> = match self.raw.get("fields") {
            Some(list) => split_fields(list),
            None => Vec::new(),
        };
        let projection = if fields.is_empty() {
            Projection::Exclude(vec![VERSION_FIELD.to_string()])
        } else {
            Projection::Include(fields)
        };
        self.query = self.query.select(projection);
        self
    }

    /// Applies `page`/`limit` with lenient fallback: non-numeric,
    /// non-positive or absent values coerce to the defaults.
    pub fn paginate(mut self) -> Self {
        let page = positive_or(self.raw.get("page"), DEFAULT_PAGE);
        let limit = positive_or(self.raw.get("limit"), DEFAULT_LIMIT);
        let skip = (page - 1) * limit;
        self.query = self.query.skip(skip).limit(limit);
        self
    }

    /// All four stages in their fixed order.
    pub fn apply(self) -> Self {
        self.filter().sort().limit_fields().paginate()
    }

    /// Hands the narrowed query back for execution.
    pub fn into_query(self) -> Q {
        self.query
    }
}

fn positive_or(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn split_fields(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Records every operation applied to it, for asserting on stage output.
    #[derive(Debug, Default, Clone)]
    struct Recording {
        predicate: Option<Predicate>,
        sort_keys: Option<Vec<SortKey>>,
        projection: Option<Projection>,
        skipped: Option<usize>,
        limited: Option<usize>,
    }

    impl Queryable for Recording {
        fn filter(mut self, predicate: Predicate) -> Self {
            self.predicate = Some(predicate);
            self
        }

        fn sort(mut self, keys: Vec<SortKey>) -> Self {
            self.sort_keys = Some(keys);
            self
        }

        fn select(mut self, projection: Projection) -> Self {
            self.projection = Some(projection);
            self
        }

        fn skip(mut self, count: usize) -> Self {
            self.skipped = Some(count);
            self
        }

        fn limit(mut self, count: usize) -> Self {
            self.limited = Some(count);
            self
        }
    }

    fn applied(pairs: &[(&str, &str)]) -> Recording {
        let raw = RawQuery::from_pairs(pairs.iter().copied());
        QueryFeatures::new(Recording::default(), &raw)
            .apply()
            .into_query()
    }

    #[test]
    fn test_filter_excludes_reserved_keys() {
        let recording = applied(&[
            ("difficulty", "easy"),
            ("page", "2"),
            ("sort", "-price"),
            ("limit", "3"),
            ("fields", "name"),
        ]);

        let predicate = recording.predicate.unwrap();
        assert_eq!(predicate.len(), 1);
        assert_eq!(predicate.get("difficulty"), Some(&json!("easy")));
    }

    #[test]
    fn test_sort_parses_direction_per_field() {
        let recording = applied(&[("sort", "-price,ratings_average")]);

        assert_eq!(
            recording.sort_keys.unwrap(),
            vec![SortKey::desc("price"), SortKey::asc("ratings_average")]
        );
    }

    #[test]
    fn test_sort_defaults_to_newest_first() {
        let recording = applied(&[("difficulty", "easy")]);

        assert_eq!(
            recording.sort_keys.unwrap(),
            vec![SortKey::desc(CREATED_AT_FIELD)]
        );
    }

    #[test]
    fn test_fields_become_allow_list() {
        let recording = applied(&[("fields", "name, price")]);

        assert_eq!(
            recording.projection.unwrap(),
            Projection::Include(vec!["name".to_string(), "price".to_string()])
        );
    }

    #[test]
    fn test_default_projection_denies_only_version_field() {
        let recording = applied(&[]);

        assert_eq!(
            recording.projection.unwrap(),
            Projection::Exclude(vec![VERSION_FIELD.to_string()])
        );
    }

    #[test]
    fn test_paginate_computes_skip_from_page() {
        let recording = applied(&[("page", "2"), ("limit", "10")]);

        assert_eq!(recording.skipped, Some(10));
        assert_eq!(recording.limited, Some(10));
    }

    #[test]
    fn test_paginate_falls_back_on_garbage() {
        let recording = applied(&[("page", "two"), ("limit", "-3")]);

        assert_eq!(recording.skipped, Some(0));
        assert_eq!(recording.limited, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn test_paginate_treats_zero_as_unusable() {
        let recording = applied(&[("page", "0"), ("limit", "0")]);

        assert_eq!(recording.skipped, Some(0));
        assert_eq!(recording.limited, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn test_stages_never_touch_the_raw_query() {
        let raw = RawQuery::from_pairs([("difficulty", "easy"), ("page", "2")]);
        let before = raw.clone();

        let _ = QueryFeatures::new(Recording::default(), &raw)
            .apply()
            .into_query();

        assert_eq!(raw, before);
    }
}

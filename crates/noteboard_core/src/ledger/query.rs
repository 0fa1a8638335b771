//! Query builder over one ledger with an optional left join.
//!
//! # Invariants
//! - `where_eq` is evaluated in SQL; `filter` runs in Rust afterwards.
//! - Joins are left joins: an unmatched left row yields `right: None`, and
//!   the first matching right document (insertion order) wins.
//! - Sorting is stable in both directions.
//! - A joined query orders and limits its left side first, then the join.

use super::store::Ledger;
use super::{Document, LedgerResult};
use chrono::{DateTime, Utc};

type Predicate<'q> = Box<dyn Fn(&Document) -> bool + 'q>;
type KeyFn<'q> = Box<dyn Fn(&Document) -> Vec<SortKey> + 'q>;
type JoinPredicate<'q> = Box<dyn Fn(&Document, &Document) -> bool + 'q>;
type JoinKeyFn<'q> = Box<dyn Fn(&Document, Option<&Document>) -> Vec<SortKey> + 'q>;

/// One component of a composite ordering key.
///
/// Variant order defines cross-type ordering: a missing value sorts below
/// every present value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Missing,
    Int(i64),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    /// Integer field of an optional document, `Missing` when absent.
    pub fn int_field(doc: Option<&Document>, name: &str) -> Self {
        doc.and_then(|doc| doc.i64_field(name))
            .map_or(Self::Missing, Self::Int)
    }

    /// RFC 3339 field of an optional document, `Missing` when unparsable.
    pub fn time_field(doc: Option<&Document>, name: &str) -> Self {
        doc.and_then(|doc| doc.time_field(name))
            .map_or(Self::Missing, Self::Time)
    }

    pub fn text_field(doc: Option<&Document>, name: &str) -> Self {
        doc.and_then(|doc| doc.str_field(name))
            .map_or(Self::Missing, |value| Self::Text(value.to_string()))
    }
}

/// A left-joined result row.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub left: Document,
    pub right: Option<Document>,
}

/// Single-ledger query.
pub struct Select<'conn, 'q> {
    ledger: Ledger<'conn>,
    fields: Option<Vec<String>>,
    eq: Option<(String, String)>,
    filter: Option<Predicate<'q>>,
    order_by: Option<KeyFn<'q>>,
    descending: bool,
    limit: Option<usize>,
}

impl<'conn, 'q> Select<'conn, 'q> {
    pub(crate) fn new(ledger: Ledger<'conn>) -> Self {
        Self {
            ledger,
            fields: None,
            eq: None,
            filter: None,
            order_by: None,
            descending: false,
            limit: None,
        }
    }

    /// Projects result documents to the given fields (`_id` is always kept).
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Narrows to documents whose top-level string `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.eq = Some((field.into(), value.into()));
        self
    }

    /// Arbitrary row predicate, the `where` clause.
    pub fn filter(mut self, predicate: impl Fn(&Document) -> bool + 'q) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    pub fn order_by(mut self, key: impl Fn(&Document) -> Vec<SortKey> + 'q) -> Self {
        self.order_by = Some(Box::new(key));
        self
    }

    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Joins another ledger; the join predicate is supplied via `on`.
    ///
    /// Ordering and limit set on this query pick and order the left rows
    /// before joining; the join's own ordering is applied on top, stably.
    pub fn join(self, right: Ledger<'conn>) -> JoinBuilder<'conn, 'q> {
        JoinBuilder { left: self, right }
    }

    pub fn rows(self) -> LedgerResult<Vec<Document>> {
        let fields = self.fields.clone();
        Ok(self
            .ordered()?
            .into_iter()
            .map(|doc| match fields.as_deref() {
                Some(fields) => doc.project(fields),
                None => doc,
            })
            .collect())
    }

    /// Matching documents, sorted and limited, before projection.
    fn ordered(self) -> LedgerResult<Vec<Document>> {
        let Self {
            ledger,
            fields: _,
            eq,
            filter,
            order_by,
            descending,
            limit,
        } = self;
        let matched = self_matches(&ledger, eq.as_ref(), filter.as_ref())?;

        let mut keyed = matched
            .into_iter()
            .map(|doc| {
                let key = order_by.as_ref().map(|key| key(&doc)).unwrap_or_default();
                (key, doc)
            })
            .collect::<Vec<_>>();
        if order_by.is_some() {
            sort_keyed(&mut keyed, descending);
        }

        Ok(keyed
            .into_iter()
            .map(|(_, doc)| doc)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    pub fn first(self) -> LedgerResult<Option<Document>> {
        Ok(self.limit(1).rows()?.into_iter().next())
    }
}

/// Intermediate state between `join` and `on`.
pub struct JoinBuilder<'conn, 'q> {
    left: Select<'conn, 'q>,
    right: Ledger<'conn>,
}

impl<'conn, 'q> JoinBuilder<'conn, 'q> {
    pub fn on(self, predicate: impl Fn(&Document, &Document) -> bool + 'q) -> Join<'conn, 'q> {
        Join {
            left: self.left,
            right: self.right,
            on: Box::new(predicate),
            order_by: None,
            descending: false,
            limit: None,
        }
    }
}

/// Left join of a filtered ledger query with a second ledger.
pub struct Join<'conn, 'q> {
    left: Select<'conn, 'q>,
    right: Ledger<'conn>,
    on: JoinPredicate<'q>,
    order_by: Option<JoinKeyFn<'q>>,
    descending: bool,
    limit: Option<usize>,
}

impl<'conn, 'q> Join<'conn, 'q> {
    pub fn order_by(
        mut self,
        key: impl Fn(&Document, Option<&Document>) -> Vec<SortKey> + 'q,
    ) -> Self {
        self.order_by = Some(Box::new(key));
        self
    }

    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn rows(self) -> LedgerResult<Vec<JoinedRow>> {
        let fields = self.left.fields.clone();
        let left = self.left.ordered()?;
        let right = self.right.scan(None)?;

        let mut keyed = left
            .into_iter()
            .map(|left| {
                let matched = right.iter().find(|candidate| (self.on)(&left, *candidate));
                let key = self
                    .order_by
                    .as_ref()
                    .map(|key| key(&left, matched))
                    .unwrap_or_default();
                let row = JoinedRow {
                    right: matched.cloned(),
                    left,
                };
                (key, row)
            })
            .collect::<Vec<_>>();
        if self.order_by.is_some() {
            sort_keyed(&mut keyed, self.descending);
        }

        Ok(keyed
            .into_iter()
            .map(|(_, row)| match fields.as_deref() {
                Some(fields) => JoinedRow {
                    left: row.left.project(fields),
                    right: row.right,
                },
                None => row,
            })
            .take(self.limit.unwrap_or(usize::MAX))
            .collect())
    }
}

fn self_matches(
    ledger: &Ledger<'_>,
    eq: Option<&(String, String)>,
    filter: Option<&Predicate<'_>>,
) -> LedgerResult<Vec<Document>> {
    let scanned = ledger.scan(eq.map(|(field, value)| (field.as_str(), value.as_str())))?;
    Ok(match filter {
        Some(filter) => scanned.into_iter().filter(|doc| filter(doc)).collect(),
        None => scanned,
    })
}

fn sort_keyed<T>(keyed: &mut [(Vec<SortKey>, T)], descending: bool) {
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.cmp(b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

use std::cmp::Ordering;

use serde_json::Value;

use crate::{CollectionPath, Document};

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// Ordering on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Builder for constructing document queries.
///
/// A query targets one collection and can filter on field equality, order
/// by a single field and limit the number of results. Documents with equal
/// sort keys are ordered by id so results are deterministic across stores.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Collection to read from.
    pub collection: CollectionPath,

    /// Equality filters, all of which must match.
    pub filters: Vec<Filter>,

    /// Optional ordering.
    pub order_by: Option<OrderBy>,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a query returning every document of a collection.
    pub fn collection(collection: impl Into<CollectionPath>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Adds an equality filter.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Orders results by a field.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the document satisfies every filter.
    ///
    /// Does not check the collection; callers select documents by
    /// collection first.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|filter| document.get(&filter.field) == Some(&filter.value))
    }

    /// Sorts documents according to this query's ordering, then applies the
    /// limit.
    pub fn sort_and_limit(&self, documents: &mut Vec<Document>) {
        documents.sort_by(|a, b| {
            let by_field = match &self.order_by {
                Some(order) => {
                    let ord = compare_values(a.get(&order.field), b.get(&order.field));
                    match order.direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    }
                }
                None => Ordering::Equal,
            };
            by_field.then_with(|| a.path.id.cmp(&b.path.id))
        });

        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
    }
}

/// Orders JSON values: missing < null < bool < number < string; other
/// kinds compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentPath, Version, to_fields};
    use chrono::Utc;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            path: DocumentPath::new("orders", id),
            data: to_fields(&data).unwrap(),
            version: Version::first(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn filters_require_every_field_to_match() {
        let query = Query::collection("orders")
            .where_eq("consumer_id", "u-1")
            .where_eq("status", "Pending");

        assert!(query.matches(&doc("a", json!({"consumer_id": "u-1", "status": "Pending"}))));
        assert!(!query.matches(&doc("b", json!({"consumer_id": "u-1", "status": "Selesai"}))));
        assert!(!query.matches(&doc("c", json!({"status": "Pending"}))));
    }

    #[test]
    fn orders_descending_with_id_tiebreak() {
        let query = Query::collection("orders").order_by("timestamp", Direction::Descending);
        let mut docs = vec![
            doc("a", json!({"timestamp": 10})),
            doc("c", json!({"timestamp": 30})),
            doc("b", json!({"timestamp": 30})),
        ];
        query.sort_and_limit(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let query = Query::collection("orders")
            .order_by("timestamp", Direction::Ascending)
            .limit(2);
        let mut docs = vec![
            doc("a", json!({"timestamp": 3})),
            doc("b", json!({"timestamp": 1})),
            doc("c", json!({"timestamp": 2})),
        ];
        query.sort_and_limit(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn missing_fields_sort_first() {
        let query = Query::collection("orders").order_by("timestamp", Direction::Ascending);
        let mut docs = vec![doc("a", json!({"timestamp": 1})), doc("b", json!({}))];
        query.sort_and_limit(&mut docs);
        assert_eq!(docs[0].id(), "b");
    }
}

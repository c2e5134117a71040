use std::marker::PhantomData;

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, Postgres};

use crate::config;
use crate::database::manager::DbExecutor;

use super::convert::FieldValue;
use super::error::FilterError;
use super::fields::{ConditionSet, FilterFields};
use super::request::FilterRequest;
use super::types::ResultPage;

/// The compiled query pair. Count and data share one parameter list; paging
/// is inlined since it never comes from user-controlled strings.
#[derive(Debug)]
pub struct CompiledQuery {
    pub count_sql: String,
    pub data_sql: String,
    pub params: Vec<FieldValue>,
}

/// Compiles one [`FilterRequest`] against an endpoint's field catalog and
/// runs the paginated count/data query pair.
pub struct PagedQuery<'a, E> {
    table: &'static str,
    fields: &'static FilterFields,
    request: &'a FilterRequest,
    scope: Option<(&'static str, FieldValue)>,
    _entity: PhantomData<E>,
}

impl<'a, E> PagedQuery<'a, E>
where
    E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(
        table: &'static str,
        fields: &'static FilterFields,
        request: &'a FilterRequest,
    ) -> Self {
        Self {
            table,
            fields,
            request,
            scope: None,
            _entity: PhantomData,
        }
    }

    /// Conjoin an externally resolved scope condition (tenant isolation).
    /// The engine itself has no notion of tenancy; whoever resolves access
    /// supplies the column and value to pin every query to.
    pub fn scope(mut self, column: &'static str, value: FieldValue) -> Self {
        self.scope = Some((column, value));
        self
    }

    /// Pure compilation step. Every schema and conversion failure surfaces
    /// here, before any query reaches the store.
    pub fn compile(&self) -> Result<CompiledQuery, FilterError> {
        let mut conditions = ConditionSet::default();
        if let Some((column, value)) = &self.scope {
            let clause = conditions.compare(column, "=", value);
            conditions.add(clause);
        }
        for predicate in &self.request.predicates {
            self.fields.apply_predicate(predicate, &mut conditions)?;
        }

        let order_by = self.fields.order_by(self.request.sort.as_ref())?;
        let where_clause = conditions.where_clause();

        let count_sql = format!(
            "SELECT count(*) FROM \"{}\" WHERE {}",
            self.table, where_clause
        );

        let offset = (self.request.page_number as i64 - 1) * self.request.page_size as i64;
        let mut data_sql = format!(
            "SELECT * FROM \"{}\" WHERE {}",
            self.table, where_clause
        );
        if !order_by.is_empty() {
            data_sql.push(' ');
            data_sql.push_str(&order_by);
        }
        data_sql.push_str(&format!(
            " LIMIT {} OFFSET {}",
            self.request.page_size, offset
        ));

        Ok(CompiledQuery {
            count_sql,
            data_sql,
            params: conditions.into_params(),
        })
    }

    /// Run the count query, then the data query, each on a checked-out
    /// query worker.
    ///
    /// The two queries do not share a snapshot: under concurrent writes
    /// `total_elements` may disagree with the page boundary. Accepted
    /// best-effort consistency; callers needing more open their own
    /// transaction around the whole call.
    pub async fn fetch_page(&self, db: &DbExecutor) -> Result<ResultPage<E>, FilterError> {
        let compiled = self.compile()?;
        if config::config().filter.debug_logging {
            tracing::debug!(
                count_sql = %compiled.count_sql,
                data_sql = %compiled.data_sql,
                "executing filtered listing"
            );
        }

        let total_elements: i64 = {
            let _worker = db.checkout().await?;
            let mut query = sqlx::query_as::<_, (i64,)>(&compiled.count_sql);
            for value in &compiled.params {
                query = bind_value(query, value);
            }
            query.fetch_one(db.pool()).await?.0
        };

        let data = {
            let _worker = db.checkout().await?;
            let mut query = sqlx::query_as::<_, E>(&compiled.data_sql);
            for value in &compiled.params {
                query = bind_value(query, value);
            }
            query.fetch_all(db.pool()).await?
        };

        Ok(ResultPage {
            page_number: self.request.page_number,
            page_size: self.request.page_size,
            total_elements,
            data,
        })
    }
}

fn bind_value<'q, O>(
    query: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    value: &FieldValue,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match value {
        FieldValue::String(v) => query.bind(v.clone()),
        FieldValue::Long(v) => query.bind(*v),
        FieldValue::Date(v) => query.bind(*v),
        FieldValue::Timestamp(v) => query.bind(*v),
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use sqlx::FromRow;

    use crate::filter::convert::ValueKind;
    use crate::filter::types::{Operator, Predicate, SortDirection, SortRequest};

    use super::*;

    #[derive(Debug, FromRow)]
    struct Row {
        #[allow(dead_code)]
        id: i64,
    }

    static FIELDS: Lazy<FilterFields> = Lazy::new(|| {
        crate::filter::fields::FilterFields::builder()
            .field("freeSearchText", ValueKind::String, |field| {
                field.op(Operator::Eq, |value, conditions| {
                    conditions.contains_ignore_case(&["title", "notes"], value)
                })
            })
            .field("datePaid", ValueKind::Date, |field| {
                field
                    .op(Operator::Goe, |value, conditions| {
                        conditions.compare("date_paid", ">=", value)
                    })
                    .op(Operator::Loe, |value, conditions| {
                        conditions.compare("date_paid", "<=", value)
                    })
            })
            .sort_by("datePaid", r#""date_paid""#)
            .default_sort(r#""date_paid""#, SortDirection::Desc)
            .default_sort(r#""id""#, SortDirection::Desc)
            .build()
    });

    fn request_with(predicates: Vec<Predicate>) -> FilterRequest {
        FilterRequest {
            predicates,
            ..FilterRequest::default()
        }
    }

    #[test]
    fn compiles_unfiltered_listing_with_default_sort() {
        let request = FilterRequest::default();
        let compiled = PagedQuery::<Row>::new("expenses", &FIELDS, &request)
            .compile()
            .unwrap();
        assert_eq!(compiled.count_sql, r#"SELECT count(*) FROM "expenses" WHERE 1=1"#);
        assert_eq!(
            compiled.data_sql,
            r#"SELECT * FROM "expenses" WHERE 1=1 ORDER BY "date_paid" DESC, "id" DESC LIMIT 10 OFFSET 0"#
        );
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn scope_condition_is_bound_first_and_conjoined() {
        let request = request_with(vec![Predicate {
            field: "datePaid".to_string(),
            operator: Operator::Goe,
            raw_value: "2024-01-01".to_string(),
        }]);
        let compiled = PagedQuery::<Row>::new("expenses", &FIELDS, &request)
            .scope("workspace_id", FieldValue::Long(17))
            .compile()
            .unwrap();
        assert_eq!(
            compiled.count_sql,
            r#"SELECT count(*) FROM "expenses" WHERE "workspace_id" = $1 AND "date_paid" >= $2"#
        );
        assert_eq!(compiled.params[0], FieldValue::Long(17));
    }

    #[test]
    fn offset_is_derived_from_page_number_and_size() {
        let request = FilterRequest {
            page_number: 4,
            page_size: 25,
            ..FilterRequest::default()
        };
        let compiled = PagedQuery::<Row>::new("expenses", &FIELDS, &request)
            .compile()
            .unwrap();
        assert!(compiled.data_sql.ends_with("LIMIT 25 OFFSET 75"));
    }

    #[test]
    fn explicit_sort_replaces_the_default_ordering() {
        let request = FilterRequest {
            sort: Some(SortRequest {
                field: "datePaid".to_string(),
                direction: SortDirection::Asc,
            }),
            ..FilterRequest::default()
        };
        let compiled = PagedQuery::<Row>::new("expenses", &FIELDS, &request)
            .compile()
            .unwrap();
        assert!(compiled.data_sql.contains(r#"ORDER BY "date_paid" ASC"#));
        assert!(!compiled.data_sql.contains("DESC"));
    }

    #[test]
    fn compilation_fails_before_any_query_for_unknown_field() {
        let request = request_with(vec![Predicate {
            field: "unknownField".to_string(),
            operator: Operator::Eq,
            raw_value: "1".to_string(),
        }]);
        let err = PagedQuery::<Row>::new("expenses", &FIELDS, &request)
            .compile()
            .unwrap_err();
        assert_eq!(err.to_string(), "Filtering by 'unknownField' is not supported");
        assert!(err.is_validation());
    }

    #[test]
    fn count_and_data_share_the_parameter_list() {
        let request = request_with(vec![
            Predicate {
                field: "freeSearchText".to_string(),
                operator: Operator::Eq,
                raw_value: "pizza".to_string(),
            },
            Predicate {
                field: "datePaid".to_string(),
                operator: Operator::Loe,
                raw_value: "2024-06-30".to_string(),
            },
        ]);
        let compiled = PagedQuery::<Row>::new("expenses", &FIELDS, &request)
            .compile()
            .unwrap();
        assert_eq!(compiled.params.len(), 2);
        assert_eq!(
            compiled.count_sql,
            r#"SELECT count(*) FROM "expenses" WHERE ("title" ILIKE $1 OR "notes" ILIKE $1) AND "date_paid" <= $2"#
        );
        assert!(compiled.data_sql.starts_with(
            r#"SELECT * FROM "expenses" WHERE ("title" ILIKE $1 OR "notes" ILIKE $1) AND "date_paid" <= $2"#
        ));
    }
}

use std::collections::HashMap;

use super::convert::{FieldValue, ValueKind};
use super::error::FilterError;
use super::types::{Operator, Predicate, SortDirection, SortRequest};

type SingleCondition = Box<dyn Fn(&FieldValue, &mut ConditionSet) -> String + Send + Sync>;
type ListCondition = Box<dyn Fn(&[FieldValue], &mut ConditionSet) -> String + Send + Sync>;

enum ConditionBuilder {
    Single(SingleCondition),
    List(ListCondition),
}

struct FieldSpec {
    kind: ValueKind,
    operators: HashMap<Operator, ConditionBuilder>,
}

/// Per-endpoint catalog of filterable and sortable fields.
///
/// Built once at startup by the list endpoint and shared read-only across
/// requests. Fields not declared here are neither filterable nor sortable;
/// operators not declared for a field are rejected per request.
pub struct FilterFields {
    filters: HashMap<&'static str, FieldSpec>,
    sort_columns: HashMap<&'static str, &'static str>,
    default_sort: Vec<(&'static str, SortDirection)>,
}

impl FilterFields {
    pub fn builder() -> FilterFieldsBuilder {
        FilterFieldsBuilder {
            filters: HashMap::new(),
            sort_columns: HashMap::new(),
            default_sort: Vec::new(),
        }
    }

    /// Resolve one predicate into a condition and add it to the set.
    ///
    /// Lookup failures and conversion failures surface here, before any
    /// query is built.
    pub fn apply_predicate(
        &self,
        predicate: &Predicate,
        conditions: &mut ConditionSet,
    ) -> Result<(), FilterError> {
        let spec = self
            .filters
            .get(predicate.field.as_str())
            .ok_or_else(|| FilterError::FieldNotFilterable(predicate.field.clone()))?;
        let builder = spec.operators.get(&predicate.operator).ok_or_else(|| {
            FilterError::OperatorNotSupported {
                field: predicate.field.clone(),
                operator: predicate.operator.as_str(),
            }
        })?;

        let clause = match builder {
            ConditionBuilder::Single(build) => {
                let value = spec.kind.convert(&predicate.field, &predicate.raw_value)?;
                build(&value, conditions)
            }
            ConditionBuilder::List(build) => {
                let values = spec
                    .kind
                    .convert_list(&predicate.field, &predicate.raw_value)?;
                build(&values, conditions)
            }
        };
        conditions.add(clause);
        Ok(())
    }

    /// ORDER BY clause for the request: the explicit sort translated through
    /// the sort mapping, or the declared default sorting.
    pub fn order_by(&self, sort: Option<&SortRequest>) -> Result<String, FilterError> {
        let expressions: Vec<String> = match sort {
            Some(request) => {
                let column = self
                    .sort_columns
                    .get(request.field.as_str())
                    .ok_or_else(|| FilterError::FieldNotSortable(request.field.clone()))?;
                vec![format!("{} {}", column, request.direction.to_sql())]
            }
            None => self
                .default_sort
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction.to_sql()))
                .collect(),
        };

        if expressions.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("ORDER BY {}", expressions.join(", ")))
    }
}

pub struct FilterFieldsBuilder {
    filters: HashMap<&'static str, FieldSpec>,
    sort_columns: HashMap<&'static str, &'static str>,
    default_sort: Vec<(&'static str, SortDirection)>,
}

impl FilterFieldsBuilder {
    /// Declare a filterable field: its value kind plus the supported
    /// operators with their condition builders.
    pub fn field<F>(mut self, name: &'static str, kind: ValueKind, configure: F) -> Self
    where
        F: FnOnce(FieldSpecBuilder) -> FieldSpecBuilder,
    {
        let spec = configure(FieldSpecBuilder {
            kind,
            operators: HashMap::new(),
        });
        self.filters.insert(
            name,
            FieldSpec {
                kind: spec.kind,
                operators: spec.operators,
            },
        );
        self
    }

    /// Declare a sortable field and the SQL order expression it maps to.
    /// Independent of the filter mapping for the same name.
    pub fn sort_by(mut self, name: &'static str, order_expression: &'static str) -> Self {
        self.sort_columns.insert(name, order_expression);
        self
    }

    /// Append a default sort expression, applied in declaration order when
    /// the request carries no explicit `sortBy`.
    pub fn default_sort(
        mut self,
        order_expression: &'static str,
        direction: SortDirection,
    ) -> Self {
        self.default_sort.push((order_expression, direction));
        self
    }

    pub fn build(self) -> FilterFields {
        FilterFields {
            filters: self.filters,
            sort_columns: self.sort_columns,
            default_sort: self.default_sort,
        }
    }
}

pub struct FieldSpecBuilder {
    kind: ValueKind,
    operators: HashMap<Operator, ConditionBuilder>,
}

impl FieldSpecBuilder {
    /// Bind a single-argument operator to a condition builder.
    pub fn op<F>(mut self, operator: Operator, build: F) -> Self
    where
        F: Fn(&FieldValue, &mut ConditionSet) -> String + Send + Sync + 'static,
    {
        assert!(
            !operator.takes_value_list(),
            "'{}' takes a value list; register it with op_list",
            operator
        );
        self.operators
            .insert(operator, ConditionBuilder::Single(Box::new(build)));
        self
    }

    /// Bind a multi-argument operator to a condition builder.
    pub fn op_list<F>(mut self, operator: Operator, build: F) -> Self
    where
        F: Fn(&[FieldValue], &mut ConditionSet) -> String + Send + Sync + 'static,
    {
        assert!(
            operator.takes_value_list(),
            "'{}' takes a single value; register it with op",
            operator
        );
        self.operators
            .insert(operator, ConditionBuilder::List(Box::new(build)));
        self
    }
}

/// Collects condition fragments and the parameters they bind.
///
/// Placeholders are allocated in bind order, so fragments can be assembled
/// incrementally and the final parameter list handed to the store as-is.
#[derive(Debug, Default)]
pub struct ConditionSet {
    clauses: Vec<String>,
    params: Vec<FieldValue>,
}

impl ConditionSet {
    /// Register a parameter and return its `$n` placeholder.
    pub fn bind(&mut self, value: FieldValue) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    pub fn add(&mut self, clause: String) {
        self.clauses.push(clause);
    }

    /// `"column" <op> $n`
    pub fn compare(&mut self, column: &str, sql_operator: &str, value: &FieldValue) -> String {
        let placeholder = self.bind(value.clone());
        format!("\"{}\" {} {}", column, sql_operator, placeholder)
    }

    /// Case-insensitive containment over one or more columns, OR-joined.
    /// `columns` must not be empty.
    pub fn contains_ignore_case(&mut self, columns: &[&str], value: &FieldValue) -> String {
        let placeholder = self.bind(FieldValue::String(like_pattern(&value.as_text())));
        let mut clauses: Vec<String> = columns
            .iter()
            .map(|column| format!("\"{}\" ILIKE {}", column, placeholder))
            .collect();
        if clauses.len() == 1 {
            clauses.swap_remove(0)
        } else {
            format!("({})", clauses.join(" OR "))
        }
    }

    /// `"column" IN ($n, ...)`. The converter guarantees a non-empty list.
    pub fn one_of(&mut self, column: &str, values: &[FieldValue]) -> String {
        let placeholders: Vec<String> = values
            .iter()
            .map(|value| self.bind(value.clone()))
            .collect();
        format!("\"{}\" IN ({})", column, placeholders.join(", "))
    }

    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            "1=1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }

    pub fn into_params(self) -> Vec<FieldValue> {
        self.params
    }
}

/// Escape LIKE metacharacters and wrap the value for containment matching.
fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> FilterFields {
        FilterFields::builder()
            .field("userName", ValueKind::String, |field| {
                field.op(Operator::Eq, |value, conditions| {
                    conditions.contains_ignore_case(&["user_name"], value)
                })
            })
            .field("customerId", ValueKind::Long, |field| {
                field
                    .op(Operator::Eq, |value, conditions| {
                        conditions.compare("customer_id", "=", value)
                    })
                    .op_list(Operator::In, |values, conditions| {
                        conditions.one_of("customer_id", values)
                    })
            })
            .sort_by("userName", r#"lower("user_name")"#)
            .default_sort(r#"lower("user_name")"#, SortDirection::Asc)
            .default_sort(r#""id""#, SortDirection::Desc)
            .build()
    }

    fn predicate(field: &str, operator: Operator, raw_value: &str) -> Predicate {
        Predicate {
            field: field.to_string(),
            operator,
            raw_value: raw_value.to_string(),
        }
    }

    #[test]
    fn undeclared_field_is_rejected() {
        let fields = catalog();
        let mut conditions = ConditionSet::default();
        let err = fields
            .apply_predicate(&predicate("unknownField", Operator::Eq, "1"), &mut conditions)
            .unwrap_err();
        assert_eq!(err.to_string(), "Filtering by 'unknownField' is not supported");
    }

    #[test]
    fn undeclared_operator_is_rejected_naming_field_and_operator() {
        let fields = catalog();
        let mut conditions = ConditionSet::default();
        let err = fields
            .apply_predicate(&predicate("userName", Operator::In, "a,b"), &mut conditions)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'in' operator is not supported for 'userName' filter"
        );
    }

    #[test]
    fn free_text_eq_builds_an_ilike_containment() {
        let fields = catalog();
        let mut conditions = ConditionSet::default();
        fields
            .apply_predicate(&predicate("userName", Operator::Eq, "Admin"), &mut conditions)
            .unwrap();
        assert_eq!(conditions.where_clause(), r#""user_name" ILIKE $1"#);
        assert_eq!(
            conditions.into_params(),
            vec![FieldValue::String("%Admin%".to_string())]
        );
    }

    #[test]
    fn exact_and_list_conditions_share_placeholder_numbering() {
        let fields = catalog();
        let mut conditions = ConditionSet::default();
        fields
            .apply_predicate(&predicate("customerId", Operator::Eq, "7"), &mut conditions)
            .unwrap();
        fields
            .apply_predicate(&predicate("customerId", Operator::In, "1,2"), &mut conditions)
            .unwrap();
        assert_eq!(
            conditions.where_clause(),
            r#""customer_id" = $1 AND "customer_id" IN ($2, $3)"#
        );
        assert_eq!(
            conditions.into_params(),
            vec![
                FieldValue::Long(7),
                FieldValue::Long(1),
                FieldValue::Long(2)
            ]
        );
    }

    #[test]
    fn conversion_failure_aborts_the_predicate() {
        let fields = catalog();
        let mut conditions = ConditionSet::default();
        let err = fields
            .apply_predicate(&predicate("customerId", Operator::Eq, "abc"), &mut conditions)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert 'abc' to Long ('customerId')");
        assert_eq!(conditions.where_clause(), "1=1");
    }

    #[test]
    fn explicit_sort_goes_through_the_sort_mapping() {
        let fields = catalog();
        let sort = SortRequest {
            field: "userName".to_string(),
            direction: SortDirection::Desc,
        };
        assert_eq!(
            fields.order_by(Some(&sort)).unwrap(),
            r#"ORDER BY lower("user_name") DESC"#
        );
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let fields = catalog();
        let sort = SortRequest {
            field: "customerId".to_string(),
            direction: SortDirection::Asc,
        };
        let err = fields.order_by(Some(&sort)).unwrap_err();
        assert_eq!(err.to_string(), "Sorting by 'customerId' is not supported");
    }

    #[test]
    fn absent_sort_uses_the_default_ordering() {
        let fields = catalog();
        assert_eq!(
            fields.order_by(None).unwrap(),
            r#"ORDER BY lower("user_name") ASC, "id" DESC"#
        );
    }

    #[test]
    fn like_patterns_escape_metacharacters() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}

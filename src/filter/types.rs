use serde::Serialize;

/// Public filtering operator vocabulary.
///
/// An operator token only names the comparison the client asked for; what it
/// means for a given field is decided by that field's spec (`eq` on a
/// free-text field is a case-insensitive contains, `eq` on an id field is
/// exact equality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Goe,
    Loe,
    In,
}

impl Operator {
    pub fn parse(token: &str) -> Option<Operator> {
        match token {
            "eq" => Some(Operator::Eq),
            "goe" => Some(Operator::Goe),
            "loe" => Some(Operator::Loe),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Goe => "goe",
            Operator::Loe => "loe",
            Operator::In => "in",
        }
    }

    /// `in` carries a comma-separated value list; the rest take one value.
    pub fn takes_value_list(&self) -> bool {
        matches!(self, Operator::In)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(token: &str) -> Option<SortDirection> {
        match token {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Explicit sort requested via `sortBy=<field> <direction>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    pub field: String,
    pub direction: SortDirection,
}

/// One `field[operator]=value` filter instance, still untyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub raw_value: String,
}

/// One page of a filtered listing.
///
/// `page_number` and `page_size` always echo the request (or its defaults);
/// they are never derived from the result set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<T> {
    pub page_number: i32,
    pub page_size: i32,
    pub total_elements: i64,
    pub data: Vec<T>,
}

impl<T> ResultPage<T> {
    pub fn map<U, F>(self, to: F) -> ResultPage<U>
    where
        F: FnMut(T) -> U,
    {
        ResultPage {
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            data: self.data.into_iter().map(to).collect(),
        }
    }
}

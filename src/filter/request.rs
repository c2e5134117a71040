use crate::config;

use super::error::FilterError;
use super::types::{Operator, Predicate, SortDirection, SortRequest};

pub const DEFAULT_PAGE_NUMBER: i32 = 1;
pub const DEFAULT_PAGE_SIZE: i32 = 10;

const PARAM_PAGE: &str = "page";
const PARAM_LIMIT: &str = "limit";
const PARAM_SORT_BY: &str = "sortBy";

/// A parsed, still-untyped list request: pagination, optional sort and the
/// ordered predicate list. Immutable once parsed; values are typed later
/// against the endpoint's field catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub page_number: i32,
    pub page_size: i32,
    pub sort: Option<SortRequest>,
    pub predicates: Vec<Predicate>,
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            predicates: Vec::new(),
        }
    }
}

impl FilterRequest {
    /// Parse the raw query string of a list endpoint.
    pub fn parse(query: &str) -> Result<Self, FilterError> {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self::from_pairs(&pairs)
    }

    /// Pure parse over decoded name/value pairs; no store access.
    ///
    /// `page`, `limit` and `sortBy` accept at most one occurrence - a repeat
    /// is an error, never a silent first/last pick. Every other parameter
    /// must be a `field[operator]` predicate; a repeated predicate parameter
    /// yields one predicate per value, order preserved.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FilterError> {
        let mut page: Option<&str> = None;
        let mut limit: Option<&str> = None;
        let mut sort_by: Option<&str> = None;
        let mut predicates = Vec::new();

        for (name, value) in pairs {
            match name.as_str() {
                PARAM_PAGE => set_single(PARAM_PAGE, &mut page, value)?,
                PARAM_LIMIT => set_single(PARAM_LIMIT, &mut limit, value)?,
                PARAM_SORT_BY => set_single(PARAM_SORT_BY, &mut sort_by, value)?,
                _ => predicates.push(parse_predicate(name, value)?),
            }
        }

        let page_number = match page {
            Some(raw) => parse_positive(PARAM_PAGE, raw)?,
            None => DEFAULT_PAGE_NUMBER,
        };
        let page_size = match limit {
            Some(raw) => parse_positive(PARAM_LIMIT, raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if let Some(max) = config::config().filter.max_page_size {
            if page_size > max {
                return Err(FilterError::PageSizeTooLarge {
                    requested: page_size,
                    max,
                });
            }
        }

        let sort = sort_by.map(parse_sort).transpose()?;

        Ok(Self {
            page_number,
            page_size,
            sort,
            predicates,
        })
    }
}

fn set_single<'a>(
    name: &'static str,
    slot: &mut Option<&'a str>,
    value: &'a str,
) -> Result<(), FilterError> {
    if slot.replace(value).is_some() {
        return Err(FilterError::RepeatedParameter(name));
    }
    Ok(())
}

fn parse_positive(param: &'static str, raw: &str) -> Result<i32, FilterError> {
    match raw.parse::<i32>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(FilterError::InvalidPagingValue {
            param,
            value: raw.to_string(),
        }),
    }
}

/// `"<field> <direction>"`: exactly two tokens, single space separator.
fn parse_sort(raw: &str) -> Result<SortRequest, FilterError> {
    let mut tokens = raw.split(' ');
    let (field, direction_token) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(field), Some(direction), None) if !field.is_empty() => (field, direction),
        _ => return Err(FilterError::InvalidSortExpression(raw.to_string())),
    };
    let direction = SortDirection::parse(direction_token)
        .ok_or_else(|| FilterError::InvalidSortDirection(direction_token.to_string()))?;
    Ok(SortRequest {
        field: field.to_string(),
        direction,
    })
}

/// Predicate parameter grammar: `<field>[<operator>]` with field = ASCII
/// letters and operator = lowercase ASCII letters from the known vocabulary.
fn parse_predicate(name: &str, value: &str) -> Result<Predicate, FilterError> {
    let malformed = || FilterError::MalformedParameter(name.to_string());

    let without_bracket = name.strip_suffix(']').ok_or_else(malformed)?;
    let (field, operator_token) = without_bracket.split_once('[').ok_or_else(malformed)?;

    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(malformed());
    }
    if operator_token.is_empty() || !operator_token.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(malformed());
    }

    let operator = Operator::parse(operator_token)
        .ok_or_else(|| FilterError::UnknownOperator(operator_token.to_string()))?;

    Ok(Predicate {
        field: field.to_string(),
        operator,
        raw_value: value.to_string(),
    })
}

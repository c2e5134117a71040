use chrono::{DateTime, NaiveDate, Utc};

use super::error::FilterError;

/// Declared value type of a filterable field.
///
/// A closed set keyed by tag, so conversion failures stay exhaustive and
/// testable. Enum kinds carry their public vocabulary; matching raw values
/// pass through as strings.
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    String,
    Long,
    Date,
    Timestamp,
    Enum {
        name: &'static str,
        values: &'static [&'static str],
    },
}

/// A raw predicate value converted to its field's declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Long(i64),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Long => "Long",
            ValueKind::Date => "Date",
            ValueKind::Timestamp => "Timestamp",
            ValueKind::Enum { name, .. } => name,
        }
    }

    pub fn convert(&self, field: &str, raw: &str) -> Result<FieldValue, FilterError> {
        let conversion_failed = || FilterError::ValueConversion {
            field: field.to_string(),
            value: raw.to_string(),
            kind: self.name(),
        };

        match self {
            ValueKind::String => Ok(FieldValue::String(raw.to_string())),
            ValueKind::Long => raw
                .parse::<i64>()
                .map(FieldValue::Long)
                .map_err(|_| conversion_failed()),
            ValueKind::Date => raw
                .parse::<NaiveDate>()
                .map(FieldValue::Date)
                .map_err(|_| conversion_failed()),
            ValueKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|instant| FieldValue::Timestamp(instant.with_timezone(&Utc)))
                .map_err(|_| conversion_failed()),
            ValueKind::Enum { values, .. } => {
                if values.contains(&raw) {
                    Ok(FieldValue::String(raw.to_string()))
                } else {
                    Err(conversion_failed())
                }
            }
        }
    }

    /// Conversion for multi-argument operators: the raw value is split on
    /// `,` and every element converted independently. An empty value or any
    /// failing element fails the whole predicate.
    pub fn convert_list(&self, field: &str, raw: &str) -> Result<Vec<FieldValue>, FilterError> {
        if raw.trim().is_empty() {
            return Err(FilterError::EmptyValueList(field.to_string()));
        }
        raw.split(',').map(|part| self.convert(field, part)).collect()
    }
}

impl FieldValue {
    /// Textual rendering used by pattern-building condition helpers.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::String(value) => value.clone(),
            FieldValue::Long(value) => value.to_string(),
            FieldValue::Date(value) => value.to_string(),
            FieldValue::Timestamp(value) => value.to_rfc3339(),
        }
    }
}

use std::collections::BTreeMap;

use forms_core::FormRecord;

use crate::store::StoreError;

/// Attribute holding the submission timestamp.
pub const TIMESTAMP_ATTRIBUTE: &str = "ts";
const TIMESTAMP_NAME: &str = "#ts";
const FROM_DATE_VALUE: &str = ":fromDate";
const TO_DATE_VALUE: &str = ":toDate";

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
        }
    }

    pub fn holds(self, actual: i64, bound: i64) -> bool {
        match self {
            Comparison::GreaterOrEqual => actual >= bound,
            Comparison::LessOrEqual => actual <= bound,
        }
    }
}

/// `{name_placeholder} {op} {value_placeholder}`, e.g. `#ts >= :fromDate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub name_placeholder: String,
    pub comparison: Comparison,
    pub value_placeholder: String,
}

impl Condition {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.name_placeholder,
            self.comparison.operator(),
            self.value_placeholder
        )
    }
}

// ---------------------------------------------------------------------------
// FilterExpression
// ---------------------------------------------------------------------------

/// A boolean filter over scanned records, expressed with placeholders.
///
/// `expression` is the rendered condition string; `attribute_names` maps
/// name placeholders to attributes and `attribute_values` maps value
/// placeholders to bounds. `conditions` keeps the structured form the
/// string was rendered from so stores never re-parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    pub expression: String,
    pub attribute_names: BTreeMap<String, String>,
    pub attribute_values: BTreeMap<String, i64>,
    pub conditions: Vec<Condition>,
}

impl FilterExpression {
    /// Inclusive submission-time range. `None` when neither bound is given.
    pub fn timestamp_range(from: Option<i64>, to: Option<i64>) -> Option<Self> {
        let mut builder = FilterBuilder::new();
        if let Some(from) = from {
            builder = builder.condition(
                TIMESTAMP_NAME,
                TIMESTAMP_ATTRIBUTE,
                Comparison::GreaterOrEqual,
                FROM_DATE_VALUE,
                from,
            );
        }
        if let Some(to) = to {
            builder = builder.condition(
                TIMESTAMP_NAME,
                TIMESTAMP_ATTRIBUTE,
                Comparison::LessOrEqual,
                TO_DATE_VALUE,
                to,
            );
        }
        builder.build()
    }

    /// Attribute a condition reads, resolved through `attribute_names`.
    pub fn attribute_of<'a>(&'a self, condition: &'a Condition) -> &'a str {
        self.attribute_names
            .get(&condition.name_placeholder)
            .map_or(condition.name_placeholder.as_str(), String::as_str)
    }

    pub fn value_of(&self, condition: &Condition) -> Result<i64, StoreError> {
        self.attribute_values
            .get(&condition.value_placeholder)
            .copied()
            .ok_or_else(|| StoreError::UnboundPlaceholder(condition.value_placeholder.clone()))
    }

    /// Evaluate all conditions (conjoined) against a record.
    pub fn matches(&self, record: &FormRecord) -> Result<bool, StoreError> {
        for condition in &self.conditions {
            let actual = match self.attribute_of(condition) {
                TIMESTAMP_ATTRIBUTE => record.ts,
                other => return Err(StoreError::UnsupportedAttribute(other.to_string())),
            };
            if !condition.comparison.holds(actual, self.value_of(condition)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Accumulates conditions joined with `AND`.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    attribute_names: BTreeMap<String, String>,
    attribute_values: BTreeMap<String, i64>,
    conditions: Vec<Condition>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(
        mut self,
        name_placeholder: &str,
        attribute: &str,
        comparison: Comparison,
        value_placeholder: &str,
        value: i64,
    ) -> Self {
        self.attribute_names
            .insert(name_placeholder.to_string(), attribute.to_string());
        self.attribute_values
            .insert(value_placeholder.to_string(), value);
        self.conditions.push(Condition {
            name_placeholder: name_placeholder.to_string(),
            comparison,
            value_placeholder: value_placeholder.to_string(),
        });
        self
    }

    pub fn build(self) -> Option<FilterExpression> {
        if self.conditions.is_empty() {
            return None;
        }
        let expression = self
            .conditions
            .iter()
            .map(Condition::render)
            .collect::<Vec<_>>()
            .join(" AND ");
        Some(FilterExpression {
            expression,
            attribute_names: self.attribute_names,
            attribute_values: self.attribute_values,
            conditions: self.conditions,
        })
    }
}

// ---------------------------------------------------------------------------
// ScanRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub table_name: String,
    pub filter: Option<FilterExpression>,
}

impl ScanRequest {
    pub fn new(table_name: impl Into<String>, filter: Option<FilterExpression>) -> Self {
        Self {
            table_name: table_name.into(),
            filter,
        }
    }

    pub fn matches(&self, record: &FormRecord) -> Result<bool, StoreError> {
        match &self.filter {
            Some(filter) => filter.matches(record),
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bounds_no_filter() {
        assert!(FilterExpression::timestamp_range(None, None).is_none());
    }

    #[test]
    fn test_lower_bound_only() {
        let filter = FilterExpression::timestamp_range(Some(100), None).unwrap();
        assert_eq!(filter.expression, "#ts >= :fromDate");
        assert_eq!(filter.attribute_names.get("#ts").map(String::as_str), Some("ts"));
        assert_eq!(filter.attribute_values.get(":fromDate"), Some(&100));
        assert!(!filter.attribute_values.contains_key(":toDate"));
    }

    #[test]
    fn test_upper_bound_only() {
        let filter = FilterExpression::timestamp_range(None, Some(200)).unwrap();
        assert_eq!(filter.expression, "#ts <= :toDate");
        assert_eq!(filter.attribute_values.len(), 1);
    }

    #[test]
    fn test_both_bounds_conjoined() {
        let filter = FilterExpression::timestamp_range(Some(100), Some(200)).unwrap();
        assert_eq!(filter.expression, "#ts >= :fromDate AND #ts <= :toDate");
        assert_eq!(filter.attribute_names.len(), 1);
        assert_eq!(filter.attribute_values.get(":fromDate"), Some(&100));
        assert_eq!(filter.attribute_values.get(":toDate"), Some(&200));
    }

    #[test]
    fn test_matches_inclusive_bounds() {
        let filter = FilterExpression::timestamp_range(Some(100), Some(200)).unwrap();
        let at = |ts| FormRecord::new("f", ts, "e");
        assert!(filter.matches(&at(100)).unwrap());
        assert!(filter.matches(&at(200)).unwrap());
        assert!(!filter.matches(&at(99)).unwrap());
        assert!(!filter.matches(&at(201)).unwrap());
    }

    #[test]
    fn test_unsupported_attribute() {
        let filter = FilterBuilder::new()
            .condition("#age", "age", Comparison::GreaterOrEqual, ":minAge", 18)
            .build()
            .unwrap();
        let err = filter.matches(&FormRecord::new("f", 0, "e")).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedAttribute(a) if a == "age"));
    }

    #[test]
    fn test_scan_request_without_filter_matches_all() {
        let request = ScanRequest::new("forms", None);
        assert!(request.matches(&FormRecord::new("f", -5, "e")).unwrap());
    }
}

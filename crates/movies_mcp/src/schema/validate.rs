//! Recursive-descent validation of a `serde_json::Value` against a
//! `SchemaNode`. Every violation is recorded, not just the first, so
//! callers see the complete error list in one round trip.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::node::{ArraySchema, NumberSchema, ObjectSchema, SchemaNode, StringFormat, StringSchema};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: String,
    pub message: String,
    pub value: Value,
}

impl ValidationError {
    fn new(field: impl Into<String>, code: &'static str, message: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            code: code.to_string(),
            message: message.into(),
            value,
        }
    }
}

/// Validates `value` against `schema` rooted at `root_path`. Pass `""` to
/// report bare top-level field names (e.g. `"rating"`, matching spec.md
/// §8 scenario 3); a non-empty root is joined with a `.` for callers that
/// want a qualified prefix.
pub fn validate(schema: &SchemaNode, value: &Value, root_path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    walk(schema, value, root_path, &mut errors);
    errors
}

/// Joins a path prefix and a segment, omitting the `.` when `path` is empty
/// so a root call of `validate(schema, value, "")` yields bare field names.
fn join(path: &str, segment: impl std::fmt::Display) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn walk(schema: &SchemaNode, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match schema {
        SchemaNode::String(s) => validate_string(s, value, path, errors),
        SchemaNode::Integer(n) => validate_integer(n, value, path, errors),
        SchemaNode::Number(n) => validate_number(n, value, path, errors),
        SchemaNode::Boolean => validate_boolean(value, path, errors),
        SchemaNode::Array(a) => validate_array(a, value, path, errors),
        SchemaNode::Object(o) => validate_object(o, value, path, errors),
    }
}

fn validate_string(s: &StringSchema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(text) = value.as_str() else {
        errors.push(ValidationError::new(path, "TYPE_MISMATCH", "expected a string", value.clone()));
        return;
    };

    if let Some(values) = &s.enum_values {
        if !values.iter().any(|v| v == text) {
            errors.push(ValidationError::new(
                path,
                "ENUM_MISMATCH",
                format!("must be one of {values:?}"),
                value.clone(),
            ));
        }
    }
    if let Some(min) = s.min_length {
        if text.chars().count() < min {
            errors.push(ValidationError::new(
                path,
                "MIN_LENGTH",
                format!("must be at least {min} characters"),
                value.clone(),
            ));
        }
    }
    if let Some(max) = s.max_length {
        if text.chars().count() > max {
            errors.push(ValidationError::new(
                path,
                "MAX_LENGTH",
                format!("must be at most {max} characters"),
                value.clone(),
            ));
        }
    }
    if let Some(pattern) = &s.pattern {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(text) => {
                errors.push(ValidationError::new(
                    path,
                    "PATTERN_MISMATCH",
                    format!("must match pattern {pattern}"),
                    value.clone(),
                ));
            }
            Ok(_) => {}
            Err(_) => {
                errors.push(ValidationError::new(
                    path,
                    "PATTERN_MISMATCH",
                    format!("schema pattern {pattern} is not a valid regex"),
                    value.clone(),
                ));
            }
        }
    }
    if let Some(format) = s.format {
        if !format_matches(format, text) {
            errors.push(ValidationError::new(
                path,
                "FORMAT_MISMATCH",
                format!("does not match format {}", format_name(format)),
                value.clone(),
            ));
        }
    }
}

fn format_name(format: StringFormat) -> &'static str {
    match format {
        StringFormat::Email => "email",
        StringFormat::Date => "date",
        StringFormat::DateTime => "date-time",
        StringFormat::Uri => "uri",
    }
}

fn format_matches(format: StringFormat, text: &str) -> bool {
    match format {
        StringFormat::Email => email_regex().is_match(text),
        StringFormat::Date => date_regex().is_match(text) && chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        StringFormat::DateTime => chrono::DateTime::parse_from_rfc3339(text).is_ok(),
        StringFormat::Uri => {
            let Some((scheme, rest)) = text.split_once("://") else {
                return false;
            };
            !scheme.is_empty() && !rest.is_empty()
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

fn validate_integer(n: &NumberSchema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(number) = value.as_f64() else {
        errors.push(ValidationError::new(path, "TYPE_MISMATCH", "expected an integer", value.clone()));
        return;
    };
    if number.fract() != 0.0 {
        errors.push(ValidationError::new(path, "NOT_INTEGER", "must be a whole number", value.clone()));
        return;
    }
    validate_range(n, number, path, value, errors);
}

fn validate_number(n: &NumberSchema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(number) = value.as_f64() else {
        errors.push(ValidationError::new(path, "TYPE_MISMATCH", "expected a number", value.clone()));
        return;
    };
    validate_range(n, number, path, value, errors);
}

fn validate_range(n: &NumberSchema, number: f64, path: &str, value: &Value, errors: &mut Vec<ValidationError>) {
    if let Some(min) = n.minimum {
        if number < min {
            errors.push(ValidationError::new(
                path,
                "VALUE_TOO_SMALL",
                format!("must be >= {min}"),
                value.clone(),
            ));
        }
    }
    if let Some(max) = n.maximum {
        if number > max {
            errors.push(ValidationError::new(
                path,
                "VALUE_TOO_LARGE",
                format!("must be <= {max}"),
                value.clone(),
            ));
        }
    }
}

fn validate_boolean(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    if !value.is_boolean() {
        errors.push(ValidationError::new(path, "TYPE_MISMATCH", "expected a boolean", value.clone()));
    }
}

fn validate_array(a: &ArraySchema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(items) = value.as_array() else {
        errors.push(ValidationError::new(path, "TYPE_MISMATCH", "expected an array", value.clone()));
        return;
    };
    if let Some(min) = a.min_items {
        if items.len() < min {
            errors.push(ValidationError::new(
                path,
                "MIN_ITEMS",
                format!("must have at least {min} items"),
                value.clone(),
            ));
        }
    }
    if let Some(max) = a.max_items {
        if items.len() > max {
            errors.push(ValidationError::new(
                path,
                "MAX_ITEMS",
                format!("must have at most {max} items"),
                value.clone(),
            ));
        }
    }
    for (i, item) in items.iter().enumerate() {
        walk(&a.items, item, &format!("{path}[{i}]"), errors);
    }
}

fn validate_object(o: &ObjectSchema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(map) = value.as_object() else {
        errors.push(ValidationError::new(path, "TYPE_MISMATCH", "expected an object", value.clone()));
        return;
    };

    for required in &o.required {
        if !map.contains_key(required) {
            errors.push(ValidationError::new(
                join(path, required),
                "REQUIRED",
                format!("{required} is required"),
                Value::Null,
            ));
        }
    }

    let known: std::collections::HashSet<&str> = o.properties.iter().map(|(n, _)| n.as_str()).collect();
    for key in map.keys() {
        if !known.contains(key.as_str()) {
            errors.push(ValidationError::new(
                join(path, key),
                "UNKNOWN_FIELD",
                format!("unexpected field {key}"),
                map[key].clone(),
            ));
        }
    }

    for (name, node) in &o.properties {
        if let Some(field_value) = map.get(name) {
            walk(node, field_value, &join(path, name), errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::StringFormat;

    fn sample_schema() -> SchemaNode {
        SchemaNode::object()
            .property("title", SchemaNode::string().min_length(1).build())
            .property("year", SchemaNode::integer().minimum(1888.0).build_integer())
            .property(
                "rating",
                SchemaNode::number().minimum(0.0).maximum(10.0).build_number(),
            )
            .required(&["title", "year"])
            .build()
    }

    #[test]
    fn missing_required_field_is_reported() {
        let errors = validate(&sample_schema(), &serde_json::json!({"year": 2000}), "");
        assert!(errors.iter().any(|e| e.code == "REQUIRED" && e.field == "title"));
    }

    #[test]
    fn unknown_field_is_rejected_strict() {
        let errors = validate(
            &sample_schema(),
            &serde_json::json!({"title": "X", "year": 2000, "bogus": 1}),
            "",
        );
        assert!(errors.iter().any(|e| e.code == "UNKNOWN_FIELD"));
    }

    #[test]
    fn rating_out_of_range_is_value_too_large() {
        let errors = validate(
            &sample_schema(),
            &serde_json::json!({"title": "X", "year": 2000, "rating": 11}),
            "",
        );
        assert!(errors.iter().any(|e| e.code == "VALUE_TOO_LARGE" && e.field == "rating"));
    }

    #[test]
    fn integer_rejects_fractional_value() {
        let errors = validate(
            &sample_schema(),
            &serde_json::json!({"title": "X", "year": 2000.5}),
            "",
        );
        assert!(errors.iter().any(|e| e.code == "NOT_INTEGER"));
    }

    #[test]
    fn valid_payload_has_no_errors() {
        let errors = validate(
            &sample_schema(),
            &serde_json::json!({"title": "X", "year": 2000, "rating": 8.5}),
            "",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn date_format_rejects_malformed_string() {
        let schema = SchemaNode::object()
            .property("decade", SchemaNode::string().format(StringFormat::Date).build())
            .build();
        let errors = validate(&schema, &serde_json::json!({"decade": "not-a-date"}), "");
        assert!(errors.iter().any(|e| e.code == "FORMAT_MISMATCH"));
    }

    #[test]
    fn array_recurses_into_items() {
        let schema = SchemaNode::object()
            .property(
                "genres",
                SchemaNode::array(SchemaNode::string().min_length(1).build()).build(),
            )
            .build();
        let errors = validate(&schema, &serde_json::json!({"genres": ["sci-fi", ""]}), "");
        assert!(errors.iter().any(|e| e.field == "genres[1]" && e.code == "MIN_LENGTH"));
    }
}

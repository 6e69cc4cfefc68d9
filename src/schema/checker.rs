//! Path-tracking structural checks over raw JSON.
//!
//! Every check records an issue at the current path and keeps going, so a
//! single pass reports every violation rather than the first.

use crate::domain::date::is_valid_ymd;
use serde_json::{Map, Value};

use super::ValidationIssue;

pub(crate) struct Checker {
    path: Vec<String>,
    issues: Vec<ValidationIssue>,
}

fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Checker {
    pub(crate) fn new() -> Self {
        Self {
            path: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub(crate) fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(self.path.join("."), message));
    }

    /// Record an issue one segment below the current path.
    pub(crate) fn issue_at(&mut self, segment: impl ToString, message: impl Into<String>) {
        self.at(segment, |checker| checker.issue(message));
    }

    pub(crate) fn at<R>(&mut self, segment: impl ToString, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    pub(crate) fn object<'v>(&mut self, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.issue(format!("Expected object, received {}", received(other)));
                None
            }
        }
    }

    /// Run `check` on a required field, or record `Required`.
    pub(crate) fn required<'v, R>(
        &mut self,
        map: &'v Map<String, Value>,
        key: &str,
        check: impl FnOnce(&mut Self, &'v Value) -> Option<R>,
    ) -> Option<R> {
        self.at(key, |checker| match map.get(key) {
            Some(value) => check(checker, value),
            None => {
                checker.issue("Required");
                None
            }
        })
    }

    /// Run `check` on a field only when present.
    pub(crate) fn optional<'v, R>(
        &mut self,
        map: &'v Map<String, Value>,
        key: &str,
        check: impl FnOnce(&mut Self, &'v Value) -> Option<R>,
    ) -> Option<R> {
        let value = map.get(key)?;
        self.at(key, |checker| check(checker, value))
    }

    pub(crate) fn number(&mut self, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(number) if value.is_number() => Some(number),
            _ => {
                self.issue(format!("Expected number, received {}", received(value)));
                None
            }
        }
    }

    pub(crate) fn non_negative(&mut self, value: &Value) -> Option<f64> {
        self.between(value, 0.0, f64::MAX)
    }

    pub(crate) fn positive(&mut self, value: &Value) -> Option<f64> {
        let number = self.number(value)?;
        if number <= 0.0 {
            self.issue("Number must be greater than 0");
            return None;
        }
        Some(number)
    }

    pub(crate) fn between(&mut self, value: &Value, min: f64, max: f64) -> Option<f64> {
        let number = self.number(value)?;
        if number < min {
            self.issue(format!("Number must be greater than or equal to {min}"));
            return None;
        }
        if number > max {
            self.issue(format!("Number must be less than or equal to {max}"));
            return None;
        }
        Some(number)
    }

    pub(crate) fn integer(&mut self, value: &Value, min: u64, max: Option<u64>) -> Option<u64> {
        let number = self.number(value)?;
        let Some(integer) = value.as_u64() else {
            if number < 0.0 {
                self.issue(format!("Number must be greater than or equal to {min}"));
            } else {
                self.issue("Expected integer, received float");
            }
            return None;
        };
        if integer < min {
            self.issue(format!("Number must be greater than or equal to {min}"));
            return None;
        }
        if let Some(max) = max.filter(|max| integer > *max) {
            self.issue(format!("Number must be less than or equal to {max}"));
            return None;
        }
        Some(integer)
    }

    pub(crate) fn string<'v>(&mut self, value: &'v Value) -> Option<&'v str> {
        match value {
            Value::String(text) => Some(text),
            other => {
                self.issue(format!("Expected string, received {}", received(other)));
                None
            }
        }
    }

    pub(crate) fn non_empty<'v>(&mut self, value: &'v Value) -> Option<&'v str> {
        let text = self.string(value)?;
        if text.is_empty() {
            self.issue("String must contain at least 1 character(s)");
            return None;
        }
        Some(text)
    }

    pub(crate) fn date<'v>(&mut self, value: &'v Value) -> Option<&'v str> {
        let text = self.string(value)?;
        if !is_valid_ymd(text) {
            self.issue("Invalid YYYY-MM-DD date");
            return None;
        }
        Some(text)
    }

    pub(crate) fn boolean(&mut self, value: &Value) -> Option<bool> {
        match value {
            Value::Bool(flag) => Some(*flag),
            other => {
                self.issue(format!("Expected boolean, received {}", received(other)));
                None
            }
        }
    }

    pub(crate) fn one_of<'v>(&mut self, value: &'v Value, allowed: &[&str]) -> Option<&'v str> {
        let text = self.string(value)?;
        if !allowed.contains(&text) {
            let expected = allowed
                .iter()
                .map(|option| format!("'{option}'"))
                .collect::<Vec<_>>()
                .join(" | ");
            self.issue(format!("Invalid enum value. Expected {expected}, received '{text}'"));
            return None;
        }
        Some(text)
    }

    pub(crate) fn literal(&mut self, value: &Value, expected: &str) -> Option<()> {
        if value.as_str() == Some(expected) {
            return Some(());
        }
        self.issue(format!("Invalid literal value, expected \"{expected}\""));
        None
    }

    pub(crate) fn array<'v>(&mut self, value: &'v Value, max: Option<usize>) -> Option<&'v [Value]> {
        let Value::Array(items) = value else {
            self.issue(format!("Expected array, received {}", received(value)));
            return None;
        };
        if let Some(max) = max.filter(|max| items.len() > *max) {
            self.issue(format!("Array must contain at most {max} element(s)"));
        }
        Some(items)
    }

    /// Check each element of an array under its index.
    pub(crate) fn each<'v>(
        &mut self,
        value: &'v Value,
        max: Option<usize>,
        mut check: impl FnMut(&mut Self, &'v Value),
    ) -> Option<&'v [Value]> {
        let items = self.array(value, max)?;
        for (index, item) in items.iter().enumerate() {
            self.at(index, |checker| check(checker, item));
        }
        Some(items)
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

//! Declarative validation for submitted HTML forms.
//!
//! Rules are independent: each one inspects a single field and appends its
//! message to that field's error list. Nothing short-circuits, so a form can
//! report several problems for the same field at once. Every rule except
//! [`Form::required`] ignores fields whose trimmed value is empty, which keeps
//! a blank field down to the single "cannot be blank" message.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Loose shape check for email addresses, anchored on both ends.
pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Submitted values, keyed by field name, in submission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormValues(HashMap<String, Vec<String>>);

impl FormValues {
    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        Ok(pairs.into_iter().collect())
    }

    /// First value submitted for `field`, or the empty string.
    pub fn get(&self, field: &str) -> &str {
        self.0
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get_all(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (field, value) in iter {
            values.entry(field.into()).or_default().push(value.into());
        }
        Self(values)
    }
}

/// Validation messages, keyed by field name, in the order they were added.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// A submission together with the errors found in it.
#[derive(Debug, Default, Clone)]
pub struct Form {
    values: FormValues,
    errors: FormErrors,
}

impl Form {
    pub fn new(values: FormValues) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        FormValues::parse(body).map(Self::new)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field)
    }

    /// Record an error that no rule can detect, e.g. a duplicate email.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn required(&mut self, fields: &[&str]) -> &mut Self {
        for field in fields {
            if self.values.get(field).trim().is_empty() {
                self.errors.add(*field, "This field cannot be blank");
            }
        }
        self
    }

    pub fn max_length(&mut self, field: &str, n: usize) -> &mut Self {
        if let Some(value) = self.non_blank(field) {
            if value.chars().count() > n {
                let message = format!("This field is too long (maximum is {} characters)", n);
                self.errors.add(field, message);
            }
        }
        self
    }

    pub fn min_length(&mut self, field: &str, n: usize) -> &mut Self {
        if let Some(value) = self.non_blank(field) {
            if value.chars().count() < n {
                let message = format!("This field is too short (minimum is {} characters)", n);
                self.errors.add(field, message);
            }
        }
        self
    }

    pub fn permitted_values(&mut self, field: &str, allowed: &[&str]) -> &mut Self {
        if let Some(value) = self.non_blank(field) {
            if !allowed.contains(&value) {
                self.errors.add(field, "This field is invalid");
            }
        }
        self
    }

    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) -> &mut Self {
        if let Some(value) = self.non_blank(field) {
            if !pattern.is_match(value) {
                self.errors.add(field, "This field is invalid");
            }
        }
        self
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn non_blank(&self, field: &str) -> Option<&str> {
        let value = self.values.get(field);
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

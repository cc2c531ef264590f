//! Declarative field rules for entity forms.
//!
//! A [`Schema`] checks raw form values (as typed, so numbers may still be
//! strings) and produces the coerced JSON body that is sent to the API.
//! Messages follow the wording users already know from the web forms,
//! e.g. `name is a required field`.

use regex::Regex;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    NumberArray,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::Number(i.into()),
            DefaultValue::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// A format check: a precompiled regex and the message shown on mismatch.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: &'static Regex,
    pub message: &'static str,
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.message == other.message
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub min: Option<f64>,
    pub one_of: Option<&'static [&'static str]>,
    pub pattern: Option<PatternRule>,
    pub default: Option<DefaultValue>,
}

impl FieldRule {
    fn of(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
            min: None,
            one_of: None,
            pattern: None,
            default: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::of(name, FieldKind::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::of(name, FieldKind::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::of(name, FieldKind::Boolean)
    }

    pub fn number_array(name: &'static str) -> Self {
        Self::of(name, FieldKind::NumberArray)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = Some(values);
        self
    }

    pub fn matches(mut self, regex: &'static Regex, message: &'static str) -> Self {
        self.pattern = Some(PatternRule { regex, message });
        self
    }

    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    fn check(&self, raw: Option<&Value>) -> Result<Option<Value>, String> {
        let absent = match raw {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty() && (self.kind != FieldKind::String || self.required),
            _ => false,
        };

        if absent {
            if let Some(default) = self.default {
                return Ok(Some(default.to_value()));
            }
            if self.required {
                return Err(format!("{} is a required field", self.name));
            }
            if self.nullable && matches!(raw, Some(Value::Null)) {
                return Ok(Some(Value::Null));
            }
            return Ok(None);
        }

        // `absent` covers None above.
        let raw = match raw {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let value = match self.kind {
            FieldKind::String => Value::String(self.coerce_string(raw)?),
            FieldKind::Number => Value::Number(self.coerce_number(raw)?),
            FieldKind::Boolean => Value::Bool(self.coerce_bool(raw)?),
            FieldKind::NumberArray => Value::Array(
                self.coerce_array(raw)?
                    .into_iter()
                    .map(Value::Number)
                    .collect(),
            ),
        };

        Ok(Some(value))
    }

    fn type_error(&self, kind: &str) -> String {
        format!("{} must be a `{}` type", self.name, kind)
    }

    fn coerce_string(&self, raw: &Value) -> Result<String, String> {
        let s = match raw {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(self.type_error("string")),
        };

        if let Some(allowed) = self.one_of {
            if !allowed.contains(&s.as_str()) {
                return Err(format!(
                    "{} must be one of the following values: {}",
                    self.name,
                    allowed.join(", ")
                ));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.regex.is_match(&s) {
                return Err(pattern.message.to_string());
            }
        }

        Ok(s)
    }

    fn coerce_number(&self, raw: &Value) -> Result<Number, String> {
        let n = parse_number(raw).ok_or_else(|| self.type_error("number"))?;

        if let Some(min) = self.min {
            if n < min {
                return Err(format!(
                    "{} must be greater than or equal to {}",
                    self.name, min
                ));
            }
        }

        to_json_number(n).ok_or_else(|| self.type_error("number"))
    }

    fn coerce_bool(&self, raw: &Value) -> Result<bool, String> {
        match raw {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(self.type_error("boolean")),
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(true),
                Some(0) => Ok(false),
                _ => Err(self.type_error("boolean")),
            },
            _ => Err(self.type_error("boolean")),
        }
    }

    /// Accepts a JSON array or a comma-separated string like `1,2`.
    fn coerce_array(&self, raw: &Value) -> Result<Vec<Number>, String> {
        let items: Vec<Value> = match raw {
            Value::Array(items) => items.clone(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
            Value::Number(_) => vec![raw.clone()],
            _ => return Err(self.type_error("array")),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                parse_number(item)
                    .and_then(to_json_number)
                    .ok_or_else(|| format!("{}[{}] must be a `number` type", self.name, i))
            })
            .collect()
    }
}

fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Whole numbers go out as integers so ids stay `3`, not `3.0`.
fn to_json_number(n: f64) -> Option<Number> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Number::from(n as i64))
    } else {
        Number::from_f64(n)
    }
}

/// Per-field messages, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.errors.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = message,
            None => self.errors.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate `values` and build the request body. Values for names
    /// outside the schema are not sent.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<Map<String, Value>, FieldErrors> {
        let mut body = Map::new();
        let mut errors = FieldErrors::default();

        for rule in &self.fields {
            match rule.check(values.get(rule.name)) {
                Ok(Some(value)) => {
                    body.insert(rule.name.to_string(), value);
                }
                Ok(None) => {}
                Err(message) => errors.insert(rule.name, message),
            }
        }

        if errors.is_empty() {
            Ok(body)
        } else {
            Err(errors)
        }
    }
}

use serde::Serialize;
use serde_json::{Map, Value};

use crate::city::normalize_city;
use crate::types::{Occupation, UserProfile};

/// Typed client input before any range checks.
#[derive(Debug, Clone)]
pub struct RawProfile {
    pub age: i64,
    pub weight: f64,
    pub height: f64,
    pub income: f64,
    pub smoker: bool,
    pub city: String,
    pub occupation: String,
}

/// A single rejected field. An empty `field` means the body as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub kind: &'static str,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, kind: &'static str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid input: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

pub const MAX_AGE_EXCLUSIVE: i64 = 120;
pub const MAX_HEIGHT_EXCLUSIVE_M: f64 = 2.5;

// ---------- Range checks ----------

fn check_age(errors: &mut Vec<FieldError>, age: i64) -> Option<u32> {
    if age <= 0 {
        errors.push(FieldError::new("age", "Input should be greater than 0", "greater_than"));
        None
    } else if age >= MAX_AGE_EXCLUSIVE {
        errors.push(FieldError::new(
            "age",
            format!("Input should be less than {}", MAX_AGE_EXCLUSIVE),
            "less_than",
        ));
        None
    } else {
        u32::try_from(age).ok()
    }
}

fn check_positive(errors: &mut Vec<FieldError>, field: &str, v: f64) -> Option<f64> {
    if !v.is_finite() {
        errors.push(FieldError::new(field, "Input should be a finite number", "finite_number"));
        None
    } else if v <= 0.0 {
        errors.push(FieldError::new(field, "Input should be greater than 0", "greater_than"));
        None
    } else {
        Some(v)
    }
}

fn check_height(errors: &mut Vec<FieldError>, height: f64) -> Option<f64> {
    // Heights of 2.5m and up are almost always centimeters typed into a meters field.
    if height.is_finite() && height >= MAX_HEIGHT_EXCLUSIVE_M {
        errors.push(FieldError::new(
            "height",
            format!("Input should be less than {}", MAX_HEIGHT_EXCLUSIVE_M),
            "less_than",
        ));
        None
    } else {
        check_positive(errors, "height", height)
    }
}

fn check_city(errors: &mut Vec<FieldError>, city: &str) -> Option<String> {
    let city = normalize_city(city);
    if city.is_empty() {
        errors.push(FieldError::new(
            "city",
            "String should have at least 1 character",
            "string_too_short",
        ));
        None
    } else {
        Some(city)
    }
}

fn check_occupation(errors: &mut Vec<FieldError>, occupation: &str) -> Option<Occupation> {
    let parsed = Occupation::parse(occupation);
    if parsed.is_none() {
        let allowed = Occupation::ALL
            .iter()
            .map(|o| format!("'{}'", o.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        errors.push(FieldError::new(
            "occupation",
            format!("Input should be one of {}", allowed),
            "literal_error",
        ));
    }
    parsed
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    errors: Vec<FieldError>,
    age: Option<u32>,
    weight: Option<f64>,
    height: Option<f64>,
    income: Option<f64>,
    smoker: Option<bool>,
    city: Option<String>,
    occupation: Option<Occupation>,
) -> Result<UserProfile, ValidationError> {
    match (age, weight, height, income, smoker, city, occupation) {
        (Some(age), Some(weight), Some(height), Some(income), Some(smoker), Some(city), Some(occupation))
            if errors.is_empty() =>
        {
            Ok(UserProfile {
                age,
                weight,
                height,
                income,
                smoker,
                city,
                occupation,
            })
        }
        _ => Err(ValidationError { errors }),
    }
}

/// Check every field of `raw`, collecting all failures before returning.
pub fn validate(raw: RawProfile) -> Result<UserProfile, ValidationError> {
    let mut errors = Vec::new();
    let age = check_age(&mut errors, raw.age);
    let weight = check_positive(&mut errors, "weight", raw.weight);
    let height = check_height(&mut errors, raw.height);
    let income = check_positive(&mut errors, "income", raw.income);
    let city = check_city(&mut errors, &raw.city);
    let occupation = check_occupation(&mut errors, &raw.occupation);
    assemble(errors, age, weight, height, income, Some(raw.smoker), city, occupation)
}

// ---------- JSON bodies ----------

fn field<'a>(errors: &mut Vec<FieldError>, obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let v = obj.get(name);
    if v.is_none() {
        errors.push(FieldError::new(name, "Field required", "missing"));
    }
    v
}

/// Integers, integral floats (`30.0`) and numeric strings are accepted.
fn json_int(errors: &mut Vec<FieldError>, name: &str, v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(f as i64),
                Some(f) if f.is_finite() && f.abs() < 9.0e15 => {
                    errors.push(FieldError::new(
                        name,
                        "Input should be a valid integer, got a number with a fractional part",
                        "int_from_float",
                    ));
                    None
                }
                _ => {
                    // u64 above i64::MAX and the like are simply too big to be an age
                    errors.push(FieldError::new(name, "Input should be a valid integer", "int_type"));
                    None
                }
            }
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Some(i),
            Err(_) => {
                errors.push(FieldError::new(
                    name,
                    "Input should be a valid integer, unable to parse string as an integer",
                    "int_parsing",
                ));
                None
            }
        },
        _ => {
            errors.push(FieldError::new(name, "Input should be a valid integer", "int_type"));
            None
        }
    }
}

fn json_float(errors: &mut Vec<FieldError>, name: &str, v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => Some(f),
            Err(_) => {
                errors.push(FieldError::new(
                    name,
                    "Input should be a valid number, unable to parse string as a number",
                    "float_parsing",
                ));
                return None;
            }
        },
        _ => None,
    };
    if parsed.is_none() {
        errors.push(FieldError::new(name, "Input should be a valid number", "float_type"));
    }
    parsed
}

fn json_bool(errors: &mut Vec<FieldError>, name: &str, v: &Value) -> Option<bool> {
    let parsed = match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "off" | "f" | "false" | "n" | "no" => Some(false),
            "1" | "on" | "t" | "true" | "y" | "yes" => Some(true),
            _ => None,
        },
        _ => None,
    };
    if parsed.is_none() {
        errors.push(FieldError::new(name, "Input should be a valid boolean", "bool_type"));
    }
    parsed
}

fn json_str<'a>(errors: &mut Vec<FieldError>, name: &str, v: &'a Value) -> Option<&'a str> {
    let s = v.as_str();
    if s.is_none() {
        errors.push(FieldError::new(name, "Input should be a valid string", "string_type"));
    }
    s
}

/// Validate a decoded `POST /predict` body. Missing fields, wrong JSON types
/// and range failures are all collected into one error.
pub fn validate_json(body: &Value) -> Result<UserProfile, ValidationError> {
    let Some(obj) = body.as_object() else {
        return Err(ValidationError {
            errors: vec![FieldError::new("", "Input should be a valid dictionary", "model_type")],
        });
    };

    let mut errors = Vec::new();
    let e = &mut errors;

    let age = field(e, obj, "age")
        .and_then(|v| json_int(e, "age", v))
        .and_then(|v| check_age(e, v));
    let weight = field(e, obj, "weight")
        .and_then(|v| json_float(e, "weight", v))
        .and_then(|v| check_positive(e, "weight", v));
    let height = field(e, obj, "height")
        .and_then(|v| json_float(e, "height", v))
        .and_then(|v| check_height(e, v));
    let income = field(e, obj, "income")
        .and_then(|v| json_float(e, "income", v))
        .and_then(|v| check_positive(e, "income", v));
    let smoker = field(e, obj, "smoker").and_then(|v| json_bool(e, "smoker", v));
    let city = field(e, obj, "city")
        .and_then(|v| json_str(e, "city", v))
        .and_then(|v| check_city(e, v));
    let occupation = field(e, obj, "occupation")
        .and_then(|v| json_str(e, "occupation", v))
        .and_then(|v| check_occupation(e, v));

    assemble(errors, age, weight, height, income, smoker, city, occupation)
}

use crate::error::{MissingRequiredFieldsSnafu, StudentsResult};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use snafu::OptionExt;

const YEAR_LABELS: [&str; 5] = [
    "First Year",
    "Second Year",
    "Third Year",
    "Fourth Year",
    "Fifth Year",
];

/// One row of `public.students`, serialised with the camelCase keys clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub year: String,
    pub enrolled: i32,
}

/// A validated set of the writable columns, used for both inserts and full updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub year: String,
    pub enrolled: i32,
}

/// Raw JSON body of a create or update, before any validation.
///
/// Every field is kept as an untyped [`Value`] so that wrongly-typed input is treated as missing
/// rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentForm {
    pub id: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub course: Option<Value>,
    pub year: Option<Value>,
    pub enrolled: Option<Value>,
}

impl StudentForm {
    /// Anything that isn't a JSON object decodes to an empty form.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// `0` when absent, matching a row that can never exist.
    pub fn id(&self) -> i64 {
        self.id.as_ref().map_or(0, loose_int_from_value)
    }

    pub fn validate(self, label_numeric_years: bool) -> StudentsResult<NewStudent> {
        let year = required_text(self.year.as_ref()).map(|text| match &self.year {
            Some(number @ Value::Number(_)) if label_numeric_years => {
                year_label(loose_int_from_value(number)).to_owned()
            }
            _ => text,
        });

        Ok(NewStudent {
            first_name: required_text(self.first_name.as_ref())
                .context(MissingRequiredFieldsSnafu)?,
            last_name: required_text(self.last_name.as_ref()).context(MissingRequiredFieldsSnafu)?,
            course: required_text(self.course.as_ref()).context(MissingRequiredFieldsSnafu)?,
            year: year.context(MissingRequiredFieldsSnafu)?,
            enrolled: i32::from(self.enrolled.as_ref().is_some_and(is_truthy)),
        })
    }
}

/// Label for a numeric year of study, anything outside `1..=5` is a first year.
pub fn year_label(year: i64) -> &'static str {
    usize::try_from(year)
        .ok()
        .and_then(|year| year.checked_sub(1))
        .and_then(|index| YEAR_LABELS.get(index))
        .copied()
        .unwrap_or(YEAR_LABELS[0])
}

/// Leading-integer parse: optional whitespace and sign, then digits. Garbage is `0`, overflow saturates.
pub fn loose_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

#[allow(clippy::cast_possible_truncation)]
fn loose_int_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(0),
        Value::String(raw) => loose_int(raw),
        Value::Bool(flag) => i64::from(*flag),
        _ => 0,
    }
}

/// Present means non-empty: `""`, `"0"` and zero count as missing, like every other falsy value.
fn required_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() && text != "0" => Some(text.clone()),
        Value::Number(number) if number.as_f64().is_some_and(|float| float != 0.0) => {
            Some(number_text(number))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

//! Field rules for book payloads.
//!
//! Validation runs in two steps so the create flow can check for duplicates
//! between them: [`BookPayload::require`] enforces presence, coerces loosely
//! typed values and trims, then [`BookDraft::validate`] enforces types,
//! lengths and the year range and collects every violation.

use libris_http::AppError;
use serde_json::Value;

use super::models::{BookPayload, NewBook};

pub const DEFAULT_IMAGE: &str = "assets/libro.jpg";
pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;
pub const MIN_PUBLISHED_YEAR: i64 = 1000;

const REQUIRED_MESSAGE: &str = "Title and author are required";
const TITLE_NOT_TEXT: &str = "Title must be text";
const AUTHOR_NOT_TEXT: &str = "Author name must be text";
const YEAR_NOT_NUMBER: &str = "Published year must be a number";
const YEAR_NOT_WHOLE: &str = "Published year must be a whole number";
const IMAGE_NOT_TEXT: &str = "Image must be text";

/// A coerced field value, or the message reported when it has the wrong type.
pub type Field<T> = Result<T, &'static str>;

/// Payload with required fields present and trimmed, not yet range-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: Field<String>,
    pub author: Field<String>,
    pub published_year: Field<Option<i64>>,
    pub image: Field<String>,
}

impl BookPayload {
    pub fn require(self) -> Result<BookDraft, AppError> {
        let title = required_text(self.title, TITLE_NOT_TEXT);
        let author = required_text(self.author, AUTHOR_NOT_TEXT);

        let (Some(title), Some(author)) = (title, author) else {
            return Err(AppError::bad_request(REQUIRED_MESSAGE));
        };

        Ok(BookDraft {
            title,
            author,
            published_year: year(self.published_year),
            image: text(self.image, IMAGE_NOT_TEXT)
                .unwrap_or_else(|| Ok(DEFAULT_IMAGE.to_string())),
        })
    }
}

impl BookDraft {
    /// Title and author, when both could be read as text.
    pub fn identity(&self) -> Option<(&str, &str)> {
        match (&self.title, &self.author) {
            (Ok(title), Ok(author)) => Some((title.as_str(), author.as_str())),
            _ => None,
        }
    }

    /// `current_year` bounds `publishedYear` from above (`current_year + 1`).
    pub fn validate(self, current_year: i32) -> Result<NewBook, AppError> {
        let mut errors = Vec::new();

        let title = accept(self.title, &mut errors);
        if title.chars().count() > TITLE_MAX_CHARS {
            errors.push(format!(
                "Title cannot be more than {TITLE_MAX_CHARS} characters"
            ));
        }

        let author = accept(self.author, &mut errors);
        if author.chars().count() > AUTHOR_MAX_CHARS {
            errors.push(format!(
                "Author name cannot be more than {AUTHOR_MAX_CHARS} characters"
            ));
        }

        let max_year = i64::from(current_year) + 1;
        let published_year = match accept(self.published_year, &mut errors) {
            Some(year) if year < MIN_PUBLISHED_YEAR => {
                errors.push(format!(
                    "Published year must be at least {MIN_PUBLISHED_YEAR}"
                ));
                None
            }
            Some(year) if year > max_year => {
                errors.push("Published year cannot be in the future".to_string());
                None
            }
            Some(year) => i32::try_from(year).ok(),
            None => None,
        };

        let image = accept(self.image, &mut errors);

        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        Ok(NewBook {
            title,
            author,
            published_year,
            image,
        })
    }
}

fn accept<T: Default>(field: Field<T>, errors: &mut Vec<String>) -> T {
    field.unwrap_or_else(|message| {
        errors.push(message.to_string());
        T::default()
    })
}

/// Strings pass through; numbers and `true` are read in their display form.
/// Absent, null, empty, zero and `false` count as not provided.
fn text(value: Option<Value>, invalid: &'static str) -> Option<Field<String>> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(Ok(s)),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(Ok(n.to_string())),
        Value::Bool(true) => Some(Ok("true".to_string())),
        Value::Array(_) | Value::Object(_) => Some(Err(invalid)),
    }
}

fn required_text(value: Option<Value>, invalid: &'static str) -> Option<Field<String>> {
    match text(value, invalid)? {
        Ok(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| Ok(trimmed.to_string()))
        }
        Err(message) => Some(Err(message)),
    }
}

/// Integers and numeric strings are accepted. Absent, null, empty, `false`
/// and a numeric zero mean "no year".
fn year(value: Option<Value>) -> Field<Option<i64>> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(None),
            Some(year) => Ok(Some(year)),
            None => n.as_f64().map_or(Err(YEAR_NOT_NUMBER), whole).map(Some),
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            match s.parse::<i64>() {
                Ok(year) => Ok(Some(year)),
                Err(_) => match s.parse::<f64>() {
                    Ok(year) if year.is_finite() => whole(year).map(Some),
                    _ => Err(YEAR_NOT_NUMBER),
                },
            }
        }
        Some(_) => Err(YEAR_NOT_NUMBER),
    }
}

fn whole(year: f64) -> Field<i64> {
    if year.fract() == 0.0 {
        // Saturates far outside the accepted range, which the range check rejects
        Ok(year as i64)
    } else {
        Err(YEAR_NOT_WHOLE)
    }
}

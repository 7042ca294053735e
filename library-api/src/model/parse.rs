use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
    hash::Hash,
    str::FromStr,
};

use itertools::Itertools;
use thiserror::Error;
use tonic::{Code, Status};

pub const MAX_NAME_LENGTH: usize = 512;

pub trait RequestParse<T>: Sized {
    type Error;

    fn parse(value: T) -> Result<Self, Self::Error>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid `{name}` request")]
    BadRequest {
        name: &'static str,
        violations: Vec<FieldError>,
    },
    #[error(transparent)]
    Field(FieldError),
}

pub type RequestResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub error: CommonError,
    pub index: Option<usize>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("requested field is missing")]
    RequiredFieldMissing,
    #[error("invalid ID format")]
    InvalidId,
    #[error("duplicate ID")]
    DuplicateId,
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("length must be between {min} and {max} characters")]
    InvalidLength { min: usize, max: usize },
    #[error("contains unsupported characters")]
    InvalidCharacters,
}

impl RequestError {
    pub fn bad_request<I>(name: &'static str, violations: I) -> Self
    where
        I: IntoIterator<Item = FieldError>,
    {
        Self::BadRequest {
            name,
            violations: violations.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn wrap_request(self, name: &'static str) -> Self {
        match self {
            Self::Field(error) => Self::bad_request(name, [error]),
            error => error,
        }
    }

    pub fn code(&self) -> Code {
        Code::InvalidArgument
    }

    pub fn violations(&self) -> &[FieldError] {
        match self {
            Self::BadRequest { violations, .. } => violations,
            Self::Field(error) => std::slice::from_ref(error),
        }
    }
}

impl From<RequestError> for Status {
    fn from(err: RequestError) -> Self {
        Status::from(&err)
    }
}

impl From<&RequestError> for Status {
    fn from(err: &RequestError) -> Self {
        match err {
            RequestError::BadRequest { violations, .. } => Status::new(
                err.code(),
                format!("{err}: {}", violations.iter().join("; ")),
            ),
            RequestError::Field(_) => Status::new(err.code(), err.to_string()),
        }
    }
}

impl FieldError {
    pub fn new<F: ToString>(field: F, error: CommonError) -> Self {
        Self {
            field: field.to_string(),
            error,
            index: None,
        }
    }

    pub fn new_index<F: ToString>(field: F, index: usize, error: CommonError) -> Self {
        Self {
            field: field.to_string(),
            error,
            index: Some(index),
        }
    }
}

impl std::error::Error for FieldError {}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.index {
            write!(
                f,
                "field `{}[{}]` error: `{}`",
                self.field, index, self.error
            )
        } else {
            write!(f, "field `{}` error: `{}`", self.field, self.error)
        }
    }
}

impl From<FieldError> for RequestError {
    fn from(err: FieldError) -> Self {
        RequestError::Field(err)
    }
}

/// Collects field violations of a single request.
#[derive(Debug)]
pub struct RequestValidator {
    name: &'static str,
    violations: Vec<FieldError>,
}

impl RequestValidator {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            violations: Vec::new(),
        }
    }

    pub fn field<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.violations.push(error);
                None
            }
        }
    }

    pub fn fields<T>(&mut self, result: Result<T, Vec<FieldError>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.violations.extend(errors);
                None
            }
        }
    }

    pub fn into_error(self) -> RequestError {
        RequestError::bad_request(self.name, self.violations)
    }
}

/// Parses a required identifier field.
///
/// # Errors
///
/// Returns an error if the value is empty or not a valid identifier.
pub fn parse_id<T>(field: &str, value: &str) -> Result<T, FieldError>
where
    T: FromStr<Err = CommonError>,
{
    if value.is_empty() {
        return Err(FieldError::new(field, CommonError::RequiredFieldMissing));
    }
    value
        .parse()
        .map_err(|error| FieldError::new(field, error))
}

/// Parses a non-empty list of distinct identifiers.
///
/// # Errors
///
/// Returns one error per invalid or duplicate entry, or a single error if the
/// list is empty.
pub fn parse_ids<T>(field: &str, values: &[String]) -> Result<Vec<T>, Vec<FieldError>>
where
    T: FromStr<Err = CommonError> + Eq + Hash + Copy,
{
    if values.is_empty() {
        return Err(vec![FieldError::new(
            field,
            CommonError::RequiredFieldMissing,
        )]);
    }

    let mut ids = Vec::with_capacity(values.len());
    let mut seen = HashSet::with_capacity(values.len());
    let mut errors = Vec::new();
    for (index, value) in values.iter().enumerate() {
        match value.parse::<T>() {
            Ok(id) if seen.insert(id) => ids.push(id),
            Ok(_) => errors.push(FieldError::new_index(
                field,
                index,
                CommonError::DuplicateId,
            )),
            Err(error) => errors.push(FieldError::new_index(field, index, error)),
        }
    }

    if errors.is_empty() {
        Ok(ids)
    } else {
        Err(errors)
    }
}

/// Parses an author name.
///
/// Author names consist of ASCII letters and digits, with single spaces
/// between words.
///
/// # Errors
///
/// Returns an error if the name is too short, too long or contains
/// unsupported characters.
pub fn parse_author_name(field: &str, value: String) -> Result<String, FieldError> {
    check_name_length(field, &value)?;
    if !regex!(r"^[A-Za-z0-9]+( [A-Za-z0-9]+)*$").is_match(&value) {
        return Err(FieldError::new(field, CommonError::InvalidCharacters));
    }
    Ok(value)
}

/// Parses a book name.
///
/// # Errors
///
/// Returns an error if the name is blank or too long.
pub fn parse_book_name(field: &str, value: String) -> Result<String, FieldError> {
    check_name_length(field, &value)?;
    if value.trim().is_empty() {
        return Err(FieldError::new(field, CommonError::InvalidCharacters));
    }
    Ok(value)
}

fn check_name_length(field: &str, value: &str) -> Result<(), FieldError> {
    let length = value.chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(FieldError::new(
            field,
            CommonError::InvalidLength {
                min: 1,
                max: MAX_NAME_LENGTH,
            },
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::author::AuthorId;

    #[test]
    fn author_names() {
        assert_eq!(
            parse_author_name("name", "Alice Smith".into()).unwrap(),
            "Alice Smith"
        );
        assert_eq!(
            parse_author_name("name", "@".into()).unwrap_err().error,
            CommonError::InvalidCharacters
        );
        assert_eq!(
            parse_author_name("name", "Alice  Smith".into())
                .unwrap_err()
                .error,
            CommonError::InvalidCharacters
        );
        assert!(matches!(
            parse_author_name("name", String::new()).unwrap_err().error,
            CommonError::InvalidLength { .. }
        ));
        assert!(matches!(
            parse_author_name("name", "a".repeat(1000)).unwrap_err().error,
            CommonError::InvalidLength { .. }
        ));
        assert!(parse_author_name("name", "a".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn book_names() {
        assert!(parse_book_name("name", "Go in Practice, 2e".into()).is_ok());
        assert!(parse_book_name("name", "   ".into()).is_err());
        assert!(parse_book_name("name", String::new()).is_err());
    }

    #[test]
    fn ids() {
        let a = AuthorId::generate();
        let b = AuthorId::generate();

        assert_eq!(
            parse_ids::<AuthorId>("author_ids", &[a.to_string(), b.to_string()]).unwrap(),
            vec![a, b]
        );
        assert_eq!(
            parse_ids::<AuthorId>("author_ids", &[]).unwrap_err(),
            vec![FieldError::new(
                "author_ids",
                CommonError::RequiredFieldMissing
            )]
        );
        assert_eq!(
            parse_ids::<AuthorId>(
                "author_ids",
                &[a.to_string(), "invalid-uuid".into(), a.to_string()]
            )
            .unwrap_err(),
            vec![
                FieldError::new_index("author_ids", 1, CommonError::InvalidId),
                FieldError::new_index("author_ids", 2, CommonError::DuplicateId),
            ]
        );
        assert_eq!(
            parse_id::<AuthorId>("id", "").unwrap_err().error,
            CommonError::RequiredFieldMissing
        );
    }

    #[test]
    fn status_message() {
        let err = RequestError::bad_request(
            "GetAuthorInfo",
            [FieldError::new("id", CommonError::InvalidId)],
        );
        assert_eq!(err.to_string(), "invalid `GetAuthorInfo` request");

        let status = Status::from(err);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(
            status.message(),
            "invalid `GetAuthorInfo` request: field `id` error: `invalid ID format`"
        );
    }
}

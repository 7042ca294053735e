use prost_types::Timestamp;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    model::{author::AuthorId, parse::CommonError},
    v1::Book,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(pub Uuid);

impl_uuid_id!(BookId);

/// A book with its full set of authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookModel {
    pub id: BookId,
    pub name: String,
    /// Authors of the book, in no particular order.
    pub author_ids: Vec<AuthorId>,
    pub create_time: OffsetDateTime,
    pub update_time: OffsetDateTime,
}

impl From<BookModel> for Book {
    fn from(book: BookModel) -> Self {
        Self {
            id: book.id.to_string(),
            name: book.name,
            author_id: book
                .author_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: Some(date_time_to_timestamp(book.create_time)),
            updated_at: Some(date_time_to_timestamp(book.update_time)),
        }
    }
}

impl TryFrom<Book> for BookModel {
    type Error = CommonError;

    fn try_from(book: Book) -> Result<Self, Self::Error> {
        Ok(Self {
            id: book.id.parse()?,
            name: book.name,
            author_ids: book
                .author_id
                .iter()
                .map(|author_id| author_id.parse())
                .collect::<Result<_, _>>()?,
            create_time: timestamp_to_date_time(
                book.created_at.ok_or(CommonError::RequiredFieldMissing)?,
            )?,
            update_time: timestamp_to_date_time(
                book.updated_at.ok_or(CommonError::RequiredFieldMissing)?,
            )?,
        })
    }
}

pub fn date_time_to_timestamp(value: OffsetDateTime) -> Timestamp {
    Timestamp {
        seconds: value.unix_timestamp(),
        nanos: i32::try_from(value.nanosecond()).unwrap_or_default(),
    }
}

/// Converts a protobuf timestamp into a UTC date time.
///
/// # Errors
///
/// Returns [`CommonError::InvalidTimestamp`] if the timestamp is out of range.
pub fn timestamp_to_date_time(value: Timestamp) -> Result<OffsetDateTime, CommonError> {
    let nanos = i128::from(value.seconds) * 1_000_000_000 + i128::from(value.nanos);
    OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| CommonError::InvalidTimestamp)
}

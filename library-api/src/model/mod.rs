//! Model definitions for the library service.
//!
//! This module contains the entity models, request parsing and the domain
//! errors shared by the service and its clients.

/// Creates a static `regex::Regex` instance from a string literal.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static REGEX: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
        REGEX.get_or_init(|| ::regex::Regex::new($re).unwrap())
    }};
}

/// Implements identifier conversions for a UUID newtype.
macro_rules! impl_uuid_id {
    ($name:ident) => {
        impl $name {
            /// Generates a new random identifier.
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::model::parse::CommonError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                ::uuid::Uuid::try_parse(s)
                    .map(Self)
                    .map_err(|_| $crate::model::parse::CommonError::InvalidId)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::postgres_types::ToSql for $name {
            fn to_sql(
                &self,
                ty: &::postgres_types::Type,
                out: &mut ::bytes::BytesMut,
            ) -> Result<::postgres_types::IsNull, Box<dyn ::std::error::Error + Sync + Send>>
            where
                Self: Sized,
            {
                <::uuid::Uuid as ::postgres_types::ToSql>::to_sql(&self.0, ty, out)
            }

            ::postgres_types::accepts!(UUID);

            ::postgres_types::to_sql_checked!();
        }

        #[cfg(feature = "postgres")]
        impl<'a> ::postgres_types::FromSql<'a> for $name {
            fn from_sql(
                ty: &::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<Self, Box<dyn ::std::error::Error + Sync + Send>> {
                <::uuid::Uuid as ::postgres_types::FromSql>::from_sql(ty, raw).map(Self)
            }

            ::postgres_types::accepts!(UUID);
        }
    };
}

/// Author model definitions.
pub mod author;
/// Author service request parsing.
pub mod author_service;
/// Book model definitions.
pub mod book;
/// Book service request parsing.
pub mod book_service;
/// Domain errors of the library service.
pub mod error;
/// Request parsing and validation primitives.
pub mod parse;

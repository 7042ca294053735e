//! Library API.
//!
//! Shared contract of the library catalog service:
//!
//! - Messages and stubs generated from `proto/library.proto`
//! - Entity models for authors and books
//! - Domain errors and request parsing
//!
//! # Features
//!
//! - `server`: Generates the `library_server` module
//! - `client`: Generates the `library_client` module
//! - `postgres`: `ToSql`/`FromSql` for identifiers

pub mod model;

#[allow(
    unused_qualifications,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::clone_on_ref_ptr
)]
pub mod v1 {
    include!(concat!(env!("OUT_DIR"), "/library.rs"));
}

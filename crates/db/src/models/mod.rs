//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod category;
pub mod comment;
pub mod genre;
pub mod review;
pub mod session;
pub mod title;
pub mod user;

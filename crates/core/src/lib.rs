//! Domain rules for the YaMDb rating service.
//!
//! This crate has no I/O. It holds the role model, the access-control
//! policies, the field validators and the confirmation-code scheme shared
//! by the API server and the bulk loader.

pub mod clock;
pub mod confirmation;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod review;
pub mod roles;
pub mod types;
pub mod validation;

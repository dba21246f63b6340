//! Token issuance and verification.

pub mod jwt;

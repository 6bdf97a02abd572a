//! Core domain concepts shared across all subdomains.
//!
//! - [`role::Role`]: author of a message (user, moderator, context, specialist)
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod role;

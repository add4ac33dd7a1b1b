//! Contactgate - Rate-limited contact form relay
//!
//! This crate implements the backend for a portfolio site's contact form.
//! Submissions are checked against a per-client fixed-window rate limiter
//! that escalates repeat offenders into a long block, validated, and then
//! forwarded to an email provider.

pub mod config;
pub mod contact;
pub mod error;
pub mod http;
pub mod i18n;
pub mod ratelimit;

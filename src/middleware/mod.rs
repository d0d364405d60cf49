//! Middleware
//!
//! Capas HTTP transversales del router.

pub mod cors;

//! Request middleware.

pub mod trace;

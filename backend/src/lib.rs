//! REST backend for the admin dashboard.
//!
//! Serves the `users` and `notifications` collections under `/api`, wrapping
//! every payload in the shared response envelope. Handlers talk to storage
//! only through the ports in [`domain::ports`].

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use domain::TraceId;
pub use middleware::trace::Trace;

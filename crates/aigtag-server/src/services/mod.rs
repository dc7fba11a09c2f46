//! Request-independent services used by the handlers.

pub mod upload;

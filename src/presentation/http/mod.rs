//! HTTP Surface
//!
//! Routing for plain requests and the entry point of upgrade requests.

pub mod extractors;
pub mod handlers;
pub mod routes;

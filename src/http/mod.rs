//! HTTP surface - router and handlers

mod routes;

pub use routes::build_router;

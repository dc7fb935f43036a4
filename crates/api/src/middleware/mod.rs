//! Middleware for protected routes.

pub mod job_auth;

pub use job_auth::job_auth_middleware;

//! Insider: a small self-hosted social feed server.
//!
//! Layers mirror the request path: `domain` holds entities and pure
//! validation, `application` the services and repository traits, `infra`
//! the Postgres adapters and HTTP surfaces, `presentation` the askama
//! view types.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

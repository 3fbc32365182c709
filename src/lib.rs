//! Bloglist - blog list service with like statistics
//!
//! This library provides the core functionality of the bloglist service:
//! statistics over blog collections, token-gated blog mutations and user
//! registration, served over an axum HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

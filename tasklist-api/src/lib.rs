//! # Tasklist API Server Library
//!
//! HTTP surface of the task-list backend. Business rules live in
//! `tasklist-shared`; this crate wires them to Axum.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;

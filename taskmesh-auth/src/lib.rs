//! # Taskmesh Authentication Service Library
//!
//! This library provides the core functionality for the taskmesh
//! authentication service: the authoritative account store, the token store,
//! and account lifecycle event publication.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `models`: Account and token storage
//! - `publisher`: After-commit event publication
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod publisher;
pub mod routes;

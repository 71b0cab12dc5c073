//! TechSpec admin library.
//!
//! This crate provides the admin API as a library, allowing it to be
//! tested and reused by the CLI.
//!
//! # Security
//!
//! This crate holds the backend SERVICE key, which bypasses row level
//! security. Every endpoint except `/health` requires the admin bearer
//! token.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

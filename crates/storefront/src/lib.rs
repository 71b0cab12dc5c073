//! TechSpec storefront library.
//!
//! This crate provides the public catalog API as a library, allowing it to
//! be tested and reused (the admin service shares its backend clients).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod images;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;

//! Moto Parts Core - Shared domain types.
//!
//! This crate provides the types used across all Moto Parts components:
//! - `storefront` - Customer-facing client (catalog, cart, checkout, account)
//! - `admin` - Back-office client (CRUD over the remote store API)
//! - `cli` - Command-line front end driving both
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and validation - no I/O
//! and no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, emails, statuses and roles
//! - [`validation`] - Local form validation run before any write hits the API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;

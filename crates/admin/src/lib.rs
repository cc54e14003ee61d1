//! Moto Parts back-office library.
//!
//! Catalog, user, review and order management over the store API, plus the
//! order-list PDF export.
//!
//! # Security
//!
//! Every operation here is privileged. An [`AdminClient`] can only be built
//! for a session whose role grants [`Capability::ManageStore`]; the store
//! API checks the same thing again on its side.
//!
//! [`Capability::ManageStore`]: moto_parts_core::Capability::ManageStore

#![cfg_attr(not(test), forbid(unsafe_code))]

mod catalog;
pub mod client;
pub mod error;
pub mod forms;
pub mod orders;
mod reviews;
mod users;

pub use client::AdminClient;
pub use error::AdminError;

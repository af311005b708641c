//! # dockhound-core
//!
//! The host-table event core: the authoritative Host Store, its single
//! writer event loop and subscription bus, and the pure Naming Engine that
//! turns a container/network attachment into a domain name.
//!
//! This crate has no network I/O of its own; it is consumed by
//! `dockhound-dns` (answers) and `dockhound-docker` (writes).

#![warn(missing_docs)]

pub mod naming;
pub mod record;
pub mod store;

pub use naming::{DerivedName, NamingInput};
pub use record::{Host, HostId, is_global_unicast};
pub use store::{HostStore, Subscription, fqdn, public_view, reverse_form};

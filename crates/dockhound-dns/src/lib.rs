//! # dockhound-dns
//!
//! The DNS Answer Engine: paired UDP and TCP listeners on port 53 serving A
//! and PTR answers out of a [`dockhound_core::HostStore`].

#![warn(missing_docs)]

mod handler;
mod server;

pub use server::DnsEngine;

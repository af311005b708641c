//! Library half of `dockhoundd`: the HTTP/WebSocket façade and the dnsmasq
//! forwarder writer, split out of the binary so they can be integration
//! tested directly.

#![warn(missing_docs)]

pub mod api;
pub mod dnsmasq;

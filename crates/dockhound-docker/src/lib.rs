//! # dockhound-docker
//!
//! The Container Ingestor: lists running containers at startup, inspects
//! their network attachments, and keeps the [`dockhound_core::HostStore`] in
//! sync with `start`/`die` events from the Docker daemon.

#![warn(missing_docs)]

mod client;
mod ingest;

pub use client::{ContainerInfo, ContainerSource, DockerClient, EventStream};
pub use ingest::Ingestor;

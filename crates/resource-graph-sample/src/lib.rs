//! # Blog Graph Sample
//!
//! This library exposes the blog domain built on `resource_graph` for the demo binary
//! and for integration testing.

pub mod lifecycle;
pub mod loaders;
pub mod model;
pub mod producers;
pub mod services;
pub mod store;

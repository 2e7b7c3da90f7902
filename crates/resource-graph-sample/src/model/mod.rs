//! Typed rows of the blog tables.
//!
//! The engine only sees [`Record`](resource_graph::Record)s; these structs exist so the
//! seed data and tests stay readable. Each row converts into the record stored in its
//! table.

pub mod article;
pub mod author;
pub mod comment;

pub use article::*;
pub use author::*;
pub use comment::*;

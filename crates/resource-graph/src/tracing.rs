//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Builds**: one `build` span per [`GraphBuilder::build`](crate::GraphBuilder::build) call,
//!   carrying the root producer tag and depth budget
//! - **Cache**: hits, misses and saves, with the cache key
//! - **Relationships**: skipped optional relationships and fetch failures, with the
//!   relationship name and data function
//!
//! ## Usage Examples
//!
//! ```bash
//! # Build summaries only
//! RUST_LOG=info cargo run
//!
//! # Every fetch and bound argument list
//! RUST_LOG=debug cargo run
//!
//! # Only the engine
//! RUST_LOG=resource_graph=debug cargo run
//! ```
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! INFO build{producer=article depth=2}: Cache miss key=article:1
//! DEBUG build{producer=article depth=2}: Root records fetched source=articles records=1
//! DEBUG build{producer=article depth=2}: Resolving relationship relationship="comments" depth=1 arguments=1
//! DEBUG build{producer=article depth=2}: Cache save key=article:1 bytes=412
//! INFO build{producer=article depth=2}: Cached key=article:1 nodes=1
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Module paths add noise; spans already name the build
        .compact()
        .init();
}

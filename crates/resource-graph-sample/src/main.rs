//! # Blog Graph Demo
//!
//! Builds the graph of one article for a signed-in author, twice. The first build walks
//! the store and fills the cache; the second is answered from the cache.
//!
//! ## 🚀 Core Components
//!
//! - **[producers](resource_graph_sample::producers)**: one producer per blog entity and the relationships between them.
//! - **[store](resource_graph_sample::store)** / **[loaders](resource_graph_sample::loaders)**: the table store and the statistics loader the engine fetches from.
//! - **[lifecycle](resource_graph_sample::lifecycle)**: the [`BlogSystem`] that wires everything into a
//!   [`GraphBuilder`](resource_graph::GraphBuilder).
//!
//! ```bash
//! RUST_LOG=info cargo run -p resource-graph-sample
//! RUST_LOG=debug cargo run -p resource-graph-sample
//! ```

use resource_graph::tracing::setup_tracing;
use resource_graph_sample::lifecycle::{BlogSystem, Viewer};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting blog graph demo");
    let system = BlogSystem::new();

    let span = tracing::info_span!("first_build");
    let graph = async {
        info!("Building article graph");
        system.article_graph(1, 2, Viewer::Author(2)).await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("second_build");
    let cached = async {
        info!("Building article graph again");
        system.article_graph(1, 2, Viewer::Author(2)).await
    }
    .instrument(span)
    .await;

    match cached {
        Ok(cached) if cached == graph => info!(
            reads = system.cache.reads(),
            saves = system.cache.saves(),
            "Second build answered from cache"
        ),
        Ok(_) => error!("Cached graph differs from the built one"),
        Err(e) => error!(error = %e, "Second build failed"),
    }

    let json = serde_json::to_string_pretty(&graph).map_err(|e| e.to_string())?;
    println!("{}", json);

    info!("Demo completed successfully");
    Ok(())
}

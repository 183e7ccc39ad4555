//! Thin JSON surface over the engine. Persistence and client push live elsewhere.

use crate::data::registry::TableCache;

pub mod api;
pub mod routes;

pub fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let cache = TableCache::global().map_err(std::io::Error::other)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("dls server listening on http://{bind_addr}");
        axum::serve(listener, routes::router(cache)).await
    })
}

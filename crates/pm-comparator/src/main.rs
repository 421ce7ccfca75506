mod bookmarks;
mod catalog;
mod comparison;
mod config;
mod error;
mod finder;
mod knowledge;
mod model;
mod relevance;
mod server;
mod toc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bookmarks::BookmarkStore;
use catalog::CatalogState;
use config::Config;
use knowledge::KnowledgeBase;
use pm_common::http::StandardsApiClient;
use server::ComparatorServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting pm-comparator MCP server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        api = %config.api.base_url,
        redis = config.redis_url.is_some(),
        knowledge = ?config.knowledge_path,
        "configuration loaded"
    );

    // 2. Curated comparison knowledge
    let knowledge = KnowledgeBase::load(config.knowledge_path.as_deref())?;
    info!(
        topics = knowledge.topics().len(),
        standards = knowledge.known_slugs().count(),
        "knowledge base loaded"
    );

    // 3. Bookmarks live in Redis when it is reachable, in memory otherwise
    let redis_store = pm_common::redis::RedisStore::new(config.redis_url.as_deref());
    if redis_store.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, bookmarks will not survive restarts");
    }
    let bookmarks = BookmarkStore::open(redis_store, config.bookmarks_key.clone()).await;

    // 4. Initial catalog fetch. A failure is served as an error until reload_standards succeeds.
    let client = StandardsApiClient::new(config.api.clone())?;
    let state = CatalogState::from_result(catalog::load(&client).await);
    if let CatalogState::Failed(message) = &state {
        warn!(error = %message, "starting without standards data");
    }

    let server = ComparatorServer::new(state, knowledge, bookmarks, client);

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}

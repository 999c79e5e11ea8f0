use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use lex_rag::agents::{ChatPipeline, ReplyAgent, RetrievalAgent};
use lex_rag::embeddings::{build_and_publish, google::GoogleEmbedder, Embedder, IndexHandle};
use lex_rag::llm::create_generator;
use lex_rag::utils::init_logger;
use lex_rag::{config::Config, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let _log_guard = init_logger(&config.logging);
    info!("Configuration loaded: {:?}", config.server);

    // Optional conversation log
    let store = lex_rag::db::connect_store(&config.database).await;

    let generator = create_generator(&config.llm);
    let embedder: Arc<dyn Embedder> = Arc::new(GoogleEmbedder::with_base_url(
        &config.llm.google_api_key,
        &config.llm.embedding_model,
        &config.llm.api_base,
    ));
    let index = IndexHandle::new();

    let reply = if config.retrieval.enabled {
        ReplyAgent::with_retrieval(
            generator,
            RetrievalAgent::new(embedder.clone(), index.clone()),
            &config.llm,
        )
    } else {
        info!("Retrieval disabled, running in conversation mode");
        ReplyAgent::conversational(generator, &config.llm)
    };

    // Create shared state
    let state = AppState {
        config: config.clone(),
        index: index.clone(),
        pipeline: Arc::new(ChatPipeline::new(reply, store)),
    };

    // Create router
    let app = create_router(state);

    // Start server before the index exists; chat requests get 503 until it is published
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid HOST/PORT")?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    if !config.retrieval.enabled {
        server.await.map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        return Ok(());
    }

    let retrieval = config.retrieval.clone();
    let build = tokio::spawn(async move {
        info!(dir = %retrieval.documents_dir.display(), "Building document index");
        build_and_publish(&retrieval, embedder.as_ref(), &index).await
    });

    tokio::pin!(server);
    tokio::select! {
        result = &mut server => {
            result.map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        built = build => {
            if let Err(e) = built.context("index build task panicked")? {
                error!(error = %e, "Failed to build document index");
                return Err(e.into());
            }
            server.await.map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

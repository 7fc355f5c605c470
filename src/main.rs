use std::sync::Arc;

use anyhow::Context;
use service_bot::channels::{ConsoleSender, MessageSender, WebhookState, WhatsAppSender, cli};
use service_bot::config::BotConfig;
use service_bot::dispatcher::Dispatcher;
use service_bot::flow::LanguageRouter;
use service_bot::llm::{AnswerProvider, NoAnswers, create_provider};
use service_bot::store::{LibSqlBackend, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let console = std::env::args().any(|arg| arg == "--cli");
    let config = if console {
        BotConfig::console_from_env()
    } else {
        BotConfig::from_env()
    }
    .context("Invalid configuration")?;

    eprintln!("🤖 Service Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Business: {}", config.flow.business_name);

    // ── AI answers ───────────────────────────────────────────────────────
    let answers: Arc<dyn AnswerProvider> = match &config.llm {
        Some(llm) => {
            eprintln!("   AI: {:?} ({})", llm.backend, llm.model);
            create_provider(llm)?
        }
        None => {
            eprintln!("   AI: disabled (canned answers)");
            Arc::new(NoAnswers)
        }
    };

    // ── Database ─────────────────────────────────────────────────────────
    let backend = if console {
        eprintln!("   Database: in-memory");
        Arc::new(LibSqlBackend::new_memory().await?)
    } else {
        eprintln!("   Database: {}", config.db_path.display());
        Arc::new(
            LibSqlBackend::new_local(&config.db_path)
                .await
                .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
        )
    };

    if let Err(e) = backend.purge_expired_sessions().await {
        tracing::warn!(error = %e, "Failed to purge expired sessions");
    }

    let sender: Arc<dyn MessageSender> = if console {
        Arc::new(ConsoleSender)
    } else {
        Arc::new(WhatsAppSender::new(&config.whatsapp))
    };

    let dispatcher = Arc::new(Dispatcher::new(
        backend.clone(),
        backend,
        sender,
        answers,
        LanguageRouter::standard()?,
        config.flow.clone(),
        config.dispatcher.clone(),
    ));

    if console {
        eprintln!("   Type a message and press Enter. /quit to exit.\n");
        cli::run_repl(&dispatcher).await?;
        return Ok(());
    }

    let app = service_bot::channels::webhook_routes(WebhookState {
        dispatcher,
        verify_token: config.whatsapp.verify_token.clone(),
    });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook\n", config.port);
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}

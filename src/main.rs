use std::sync::Arc;

use refia_aviation::config::AppConfig;
use refia_aviation::flow::{FlowRouteState, flow_routes};
use refia_aviation::gateway::{GenerationGateway, LlmGateway};
use refia_aviation::llm::{LlmConfig, create_provider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export ANTHROPIC_API_KEY=sk-ant-...  (or OPENAI_API_KEY with REFIA_BACKEND=openai)");
        std::process::exit(1);
    });

    eprintln!("✈️  RefIA Aviation v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   API: http://0.0.0.0:{}/api/flow/status", config.port);

    // Control tower: LLM provider behind the generation gateway
    let llm_config = LlmConfig {
        backend: config.backend,
        api_key: config.api_key.clone(),
        model: config.model.clone(),
    };
    let llm = create_provider(&llm_config)?;
    let gateway: Arc<dyn GenerationGateway> = Arc::new(LlmGateway::new(llm));

    let app = flow_routes(FlowRouteState::new(gateway));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "flow server started");
    axum::serve(listener, app).await?;

    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use notion_avatar_server::{
    api,
    config,
    gemini,
    prompt,
    storage,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    config::Config::dotenv_load();
    let config = config::Config::new().expect("Failed to load configuration");
    config::Config::print_env_vars();

    // The server starts without a credential; /convert reports the client as
    // uninitialized until GEMINI_API_KEY is provided.
    let gemini_client = config.gemini_api_key.clone().map(|key| {
        gemini::client::GeminiClient::new(
            config.gemini_base_url.clone(),
            key,
            config.gemini_model.clone(),
        )
    });
    if gemini_client.is_none() {
        tracing::error!("GEMINI_API_KEY not found in environment variables");
    }

    let references = prompt::references::load_reference_images(&config.public_dir).await;
    let outputs = storage::outputs::OutputStore::new(config.output_dir.clone())
        .await
        .expect("Failed to create output directory");

    let state = Arc::new(api::routes::AppState {
        gemini: gemini_client,
        composer: prompt::composer::PromptComposer::new(references),
        outputs,
        public_dir: config.public_dir.clone().into(),
    });

    let app = api::routes::build_router(state);

    // Run our application with safe parsing
    let host_str = config.api_host.clone();
    let port_str = config.api_port.clone();
    let ip: std::net::IpAddr = host_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_HOST '{}', falling back to 0.0.0.0", host_str);
        std::net::IpAddr::from([0, 0, 0, 0])
    });
    let port: u16 = port_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid FLASK_PORT '{}', falling back to 5000", port_str);
        5000
    });
    let socket_address = SocketAddr::new(ip, port);
    tracing::info!("listening on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fueldepot_observability::init();

    let api_token = std::env::var("API_TOKEN").unwrap_or_else(|_| {
        tracing::warn!("API_TOKEN not set; using insecure dev default");
        "dev-token".to_string()
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = fueldepot_api::app::build_app(api_token).await;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}



use campus_concierge::toolkit::conversation::recommend::FeatureMap;
use campus_concierge::{ChatRequest, ConciergeConfig, ConciergeEngine};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;


/// One stdin line. `session_id` may be omitted to continue the run's default session.
#[derive(Deserialize)]
struct InboundLine {
    session_id: Option<String>,
    user_query: String,
    #[serde(default)]
    user_features: Option<FeatureMap>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,campus_concierge=info")),
        )
        .init();

    let config = ConciergeConfig::load()?;
    let engine = ConciergeEngine::from_config(&config)?;
    let default_session = Uuid::new_v4().to_string();
    info!("concierge-chat ready (default session {})", default_session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let output = match serde_json::from_str::<InboundLine>(&line) {
            Ok(inbound) => {
                let request = ChatRequest {
                    session_id: inbound.session_id.unwrap_or_else(|| default_session.clone()),
                    user_query: inbound.user_query,
                    user_features: inbound.user_features,
                };
                serde_json::to_string(&engine.handle_turn(&request).await)?
            }
            Err(e) => {
                warn!("Skipping malformed request line: {}", e);
                serde_json::json!({ "error": format!("invalid request: {e}") }).to_string()
            }
        };

        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

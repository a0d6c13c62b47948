use playgate::prelude::*;

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// Stands in for a real identity provider SDK: signs in a fixed player,
/// or declines when asked to.
struct ScriptedProvider {
    decline: bool,
}

impl IdentityProvider for ScriptedProvider {
    async fn sign_in(&self) -> SignIn {
        if self.decline {
            return SignIn::Cancelled;
        }
        SignIn::Connected(LoginInfo {
            account_name: "demo@example.com".into(),
            display_name: "Demo Player".into(),
            player_id: "g-demo".into(),
        })
    }

    async fn fetch_token(&self, account: &str, scope: &str) -> Result<String, SessionError> {
        tracing::info!(%account, %scope, "issuing scripted token");
        Ok(format!("demo-token-for-{account}"))
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Runs one attempt and waits for its outcome.
async fn run(
    server_url: &str,
    client_id: &str,
    decline: bool,
) -> Result<(LoginResult, SessionSnapshot), PlaygateError> {
    let (sink, mut events) = ChannelSink::new();
    let service = AuthService::builder().build(ScriptedProvider { decline }, sink)?;

    service
        .begin(AttemptParams::new(client_id, server_url))
        .await?;

    let result = loop {
        match events.recv().await {
            Some(SinkMessage::Event(HostEvent::LoginResult(result))) => break result,
            Some(SinkMessage::Event(event)) => tracing::info!(%event, "host event"),
            Some(SinkMessage::Resolution(resolution)) => {
                // Nobody to ask in a demo.
                tracing::warn!(%resolution, "declining resolution");
                service.resolution_finished(false).await?;
            }
            None => return Err(PlaygateError::Engine(playgate::engine::EngineError::Unavailable)),
        }
    };

    let snapshot = service.snapshot().await?;
    service.shutdown().await?;
    Ok((result, snapshot))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let server_url = std::env::var("PLAYGATE_SERVER_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080/auth".to_string());
    let client_id =
        std::env::var("PLAYGATE_CLIENT_ID").unwrap_or_else(|_| "demo-client".to_string());
    let decline = std::env::args().any(|arg| arg == "--decline");

    eprintln!("authenticating against {server_url}");

    let (result, snapshot) = run(&server_url, &client_id, decline).await?;

    println!("result:           {result}");
    println!("server player id: {}", snapshot.server_player_id.unwrap_or_default());
    println!("player name:      {}", snapshot.player_name.unwrap_or_default());
    println!("anonymous:        {}", snapshot.anonymous);
    if let Some(detail) = snapshot.failure_error {
        println!("failure:          {detail}");
    }
    Ok(())
}

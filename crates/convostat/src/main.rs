//! convostat CLI - Chat Archive Statistics
//!
//! A command-line tool for exploring exported chat archives.

mod handlers;
mod state;

use handlers::{histogram, list, streaks, timeline};
use sen::Router;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize application state
    let state = match AppState::new() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize convostat: {:#}", e);
            std::process::exit(1);
        }
    };

    // Build router
    let router = Router::new()
        // Archive-wide listings
        .route("conversations", list::conversations())
        .route("counts", list::counts())
        .route("days", list::days())

        // Per-conversation queries
        .route("streaks", streaks::streaks())
        .route("daily", histogram::daily())
        .route("minutes", histogram::minutes())
        .route("timeline", timeline::timeline())

        .with_state(state)
        .with_agent_mode(); // JSON envelope for scripted use

    // Execute
    let response = router.execute().await;

    // Output
    if response.agent_mode {
        println!("{}", response.to_agent_json());
    } else if !response.output.is_empty() {
        println!("{}", response.output);
    }

    std::process::exit(response.exit_code);
}

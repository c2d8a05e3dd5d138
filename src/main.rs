use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chess_engine::{Color, GameObserver, PieceKind, Severity, Square};
use netchess::NetworkSession;

/// Observer that routes game callbacks to the log. Promotion keeps the
/// Queen default from the trait.
struct TraceView;

impl GameObserver for TraceView {
    fn turn_changed(&self, turn: Color) {
        info!("[GAME] {turn} to move");
    }

    fn message(&self, text: &str, title: &str, severity: Severity) {
        match severity {
            Severity::Info => info!("[GAME] {title}: {text}"),
            Severity::Warning => warn!("[GAME] {title}: {text}"),
            Severity::Error => error!("[GAME] {title}: {text}"),
        }
    }

    fn choose_promotion(&self, side: Color) -> PieceKind {
        info!("[GAME] {side} pawn promoted to queen");
        PieceKind::Queen
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let addr = std::env::var("NETCHESS_ADDR").unwrap_or_else(|_| "127.0.0.1:6000".to_string());
    let name = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("NETCHESS_NAME").ok())
        .unwrap_or_else(|| "player".to_string());

    let session = NetworkSession::connect(&addr, &name, Arc::new(TraceView)).await?;
    info!("[CLIENT] joined as {name}; enter moves like \"e2 e4\", or \"quit\"");

    let mut runner = {
        let session = session.clone();
        tokio::spawn(async move { session.run().await })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            result = &mut runner => {
                if let Ok(Err(err)) = result {
                    error!("[CLIENT] connection ended: {err}");
                }
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    session.disconnect().await;
                    break;
                };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
                    session.disconnect().await;
                    break;
                }

                match parse_move(input) {
                    Some((from, to)) => {
                        if session.submit_move(from, to).await? {
                            info!("[CLIENT] played {from} {to}");
                        } else {
                            warn!("[CLIENT] move {input:?} was not accepted");
                        }
                    }
                    None => {
                        warn!("[CLIENT] could not read {input:?}; moves look like \"e2 e4\"");
                    }
                }
            }
        }
    }

    runner.abort();
    Ok(())
}

/// Accept "e2 e4" and "e2,e4".
fn parse_move(input: &str) -> Option<(Square, Square)> {
    let mut parts = input.split(|c: char| c == ',' || c.is_whitespace()).filter(|part| !part.is_empty());
    let from = parts.next()?.parse().ok()?;
    let to = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((from, to))
}

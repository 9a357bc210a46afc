//! Stdin/stdout JSON bridge for the engine.
//!
//! Reads newline-delimited JSON [`InputEvent`] messages from stdin,
//! feeds them to the engine loop, and writes [`EngineEvent`] messages
//! as newline-delimited JSON to stdout.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::messages::InputEvent;
use crate::saved::SavedTurnStore;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Input channel capacity for the bridge.
const INPUT_CAPACITY: usize = 64;

/// Run the stdin/stdout JSON bridge until stdin closes.
///
/// Three tasks cooperate:
///
/// 1. **Reader** (current task) -- parses input events from stdin lines;
///    malformed lines are logged and skipped, never fatal.
/// 2. **Event forwarder** -- writes broadcast engine events as JSON
///    lines to stdout.
/// 3. **Engine loop** -- processes input events to completion, one at a
///    time.
///
/// When stdin reaches EOF the input channel closes, the engine loop
/// drains and exits, and the forwarder ends once the event stream
/// closes.
pub async fn run_stdio_bridge(config: EngineConfig) -> crate::Result<()> {
    let mut engine = Engine::new(config);
    match SavedTurnStore::open_default() {
        Ok(store) => engine = engine.with_saved_store(store),
        Err(e) => warn!(error = %e, "saved-turn store unavailable; save requests will be ignored"),
    }

    let mut events_rx = engine.subscribe();
    let (input_tx, input_rx) = mpsc::channel::<InputEvent>(INPUT_CAPACITY);
    let cancel = CancellationToken::new();

    let engine_handle = tokio::spawn(engine.run(input_rx, cancel.clone()));

    let writer_handle = tokio::spawn(async move {
        let mut writer = BufWriter::new(tokio::io::stdout());
        loop {
            match events_rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if write_line(&mut writer, &json).await.is_err() {
                            warn!("stdout closed; stopping event forwarder");
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to serialize engine event; skipping"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged = n, "event forwarder lagged; some events were dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("engine event channel closed; stopping event forwarder");
                    break;
                }
            }
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = LinesStream::new(tokio::io::AsyncBufReadExt::lines(stdin));
    while let Some(line) = lines.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InputEvent>(&line) {
            Ok(event) => {
                if input_tx.send(event).await.is_err() {
                    warn!("engine input channel closed; stopping reader");
                    break;
                }
            }
            Err(e) => warn!(error = %e, "dropping malformed input line"),
        }
    }
    info!("stdin closed; shutting down bridge");

    // Closing the input channel lets the engine loop drain and exit.
    drop(input_tx);
    let _ = engine_handle.await;
    cancel.cancel();
    let _ = writer_handle.await;
    Ok(())
}

async fn write_line<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    json: &str,
) -> std::io::Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

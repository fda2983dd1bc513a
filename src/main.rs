use std::io::{Error, ErrorKind};
use std::sync::Arc;

use clap::Parser;
use dominoes_engine::{PieceTable, PlayRequest, Recommender, SearchConfig};
use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Thinking time per request, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    budget_ms: u64,
    #[arg(long, default_value_t = 1000)]
    max_sample_retries: usize,
    #[arg(long)]
    max_samples: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            budget_ms: self.budget_ms,
            max_sample_retries: self.max_sample_retries,
            max_samples: self.max_samples,
            seed: self.seed,
        }
    }
}

/// Read-only state shared by every connection.
struct Shared {
    table: PieceTable,
    config: SearchConfig,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let level = args.log_level.parse().unwrap_or(log::Level::Info);
    simple_logger::init_with_level(level)
        .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;

    let address = format!("{}:{}", args.host, args.port);
    let shared = Arc::new(Shared {
        table: PieceTable::new(),
        config: args.search_config(),
    });

    let listener = TcpListener::bind(address.clone()).await?;
    info!("Listening on: {} (budget {} ms)", address, shared.config.budget_ms);

    while let Ok((stream, _)) = listener.accept().await {
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            if let Err(e) = accept_connection(stream, shared).await {
                error!("Connection closed with error: {:?}", e);
            }
        });
    }

    Ok(())
}

async fn accept_connection(stream: TcpStream, shared: Arc<Shared>) -> Result<(), Error> {
    let addr = stream.peer_addr()?;
    info!("Peer address: {}", addr);

    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(|e| Error::new(ErrorKind::ConnectionAborted, e))?;
    info!("New WebSocket connection: {}", addr);

    let (mut write, mut read) = ws_stream.split();

    while let Some(raw_message) = read.next().await {
        match raw_message {
            Ok(message) => {
                if !message.is_text() && !message.is_binary() {
                    continue;
                }
                match serde_json::from_slice::<Value>(&message.into_data()) {
                    Ok(data) => {
                        info!("Received: {}", data);
                        let response = match handle_message(&shared, data).await {
                            Ok(resp) => resp,
                            Err(e) => {
                                error!("Error handling message: {:?}", e);
                                json!({ "error": e.to_string() })
                            }
                        };
                        let response_str = response.to_string();
                        write
                            .send(Message::text(response_str.clone()))
                            .await
                            .map_err(|e| Error::new(ErrorKind::BrokenPipe, e))?;
                        info!("Sent: {}", response_str);
                    }
                    Err(e) => {
                        error!("Error parsing JSON: {:?}", e);
                    }
                }
            }
            Err(e) => {
                error!("Error reading websocket message: {:?}", e);
            }
        }
    }

    info!("Peer disconnected: {}", addr);
    Ok(())
}

async fn handle_message(shared: &Arc<Shared>, data: Value) -> Result<Value, Error> {
    let request: PlayRequest = serde_json::from_value(data)?;
    let shared = Arc::clone(shared);

    // the search holds the thread for the whole budget
    let response = tokio::task::spawn_blocking(move || {
        Recommender::new(&shared.table, shared.config.clone()).recommend(&request)
    })
    .await?
    .map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;

    Ok(serde_json::to_value(response)?)
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use packman_sim::config::SimConfig;
use packman_sim::constants::HIGH_SCORE_DEFAULT_PATH;
use packman_sim::engine::GameEngine;
use packman_sim::high_score::HighScoreStore;
use packman_sim::server_protocol::{parse_client_message, ParsedClientMessage};
use packman_sim::types::Lifecycle;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ServerState {
    clients: HashMap<String, mpsc::Sender<String>>,
    game: GameEngine,
    high_scores: HighScoreStore,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let high_score_path = std::env::var("HIGH_SCORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(HIGH_SCORE_DEFAULT_PATH));

    let mut config = SimConfig::load();
    config.seed = std::env::var("SEED")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(rand::random::<u32>);
    let tick_ms = config.tick_ms;

    let game = match GameEngine::classic(config) {
        Ok(game) => game,
        Err(err) => {
            error!(%err, "cannot build the classic game");
            std::process::exit(2);
        }
    };
    info!(seed = game.config.seed, tick_ms, "game ready");

    let state = Arc::new(Mutex::new(ServerState {
        clients: HashMap::new(),
        game,
        high_scores: HighScoreStore::open(high_score_path),
    }));
    start_tick_loop(state.clone(), tick_ms);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/high-score", get(high_score_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.display(), "serving static files");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %bind_addr, "failed to bind server socket");
            std::process::exit(1);
        }
    };

    info!(port, "listening");
    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "server runtime failed");
        std::process::exit(1);
    }
}

fn resolve_static_dir() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var("STATIC_DIR").ok()?);
    if path.join("index.html").is_file() {
        Some(path)
    } else {
        warn!(root = %path.display(), "STATIC_DIR has no index.html, not serving it");
        None
    }
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn high_score_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(guard.high_scores.build_response())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<String>(256);

    {
        let mut guard = state.lock().await;
        guard.clients.insert(client_id.clone(), tx.clone());
        send_welcome(&mut guard, &client_id);
    }
    info!(client = %client_id, "client connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(state.clone(), &client_id, raw.as_str()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = std::str::from_utf8(&raw) {
                    handle_client_message(state.clone(), &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.lock().await.clients.remove(&client_id);
    info!(client = %client_id, "client disconnected");
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: SharedState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error_to_client(&state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    match message {
        ParsedClientMessage::Input { dir } => {
            guard.game.set_requested_direction(dir);
        }
        ParsedClientMessage::Start => {
            guard.game.start();
            broadcast_state(&mut guard);
        }
        ParsedClientMessage::Pause => {
            guard.game.pause();
            broadcast_state(&mut guard);
        }
        ParsedClientMessage::Resume => {
            guard.game.resume();
            broadcast_state(&mut guard);
        }
        ParsedClientMessage::Reset => {
            guard.game.reset();
            broadcast_state(&mut guard);
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                    "serverTime": now_ms(),
                }),
                QueuePolicy::DropOnFull,
            );
        }
    }
}

fn send_welcome(state: &mut ServerState, client_id: &str) {
    let snapshot = state.game.build_snapshot(false);
    let message = json!({
        "type": "welcome",
        "clientId": client_id,
        "tickMs": state.game.config.tick_ms,
        "highScore": state.high_scores.best(),
        "snapshot": snapshot,
    });
    send_to_client(state, client_id, &message, QueuePolicy::DisconnectOnFull);
}

fn start_tick_loop(state: SharedState, tick_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_game(&mut guard);
        }
    });
}

fn tick_game(state: &mut ServerState) {
    if state.game.lifecycle() != Lifecycle::Running || state.game.is_ended() {
        return;
    }
    state.game.tick();
    broadcast_state(state);

    let Some(is_new_high_score) = state.game.offer_high_score(&mut state.high_scores) else {
        return;
    };
    let message = json!({
        "type": "game_over",
        "summary": state.game.build_summary(),
        "highScore": state.high_scores.best(),
        "newHighScore": is_new_high_score,
    });
    broadcast(state, &message, QueuePolicy::DisconnectOnFull);
}

fn broadcast_state(state: &mut ServerState) {
    let snapshot = state.game.build_snapshot(true);
    broadcast(
        state,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
        QueuePolicy::DropOnFull,
    );
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = state
        .clients
        .get(client_id)
        .map(|tx| tx.try_send(message.to_string()).is_err())
        .unwrap_or(false);
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        warn!(client = %client_id, "outbound queue full, dropping client");
        state.clients.remove(client_id);
    }
}

fn broadcast(state: &mut ServerState, message: &Value, policy: QueuePolicy) {
    let payload = message.to_string();
    let mut failed_clients = Vec::new();
    for (client_id, tx) in &state.clients {
        if tx.try_send(payload.clone()).is_err() && policy == QueuePolicy::DisconnectOnFull {
            failed_clients.push(client_id.clone());
        }
    }
    for client_id in failed_clients {
        warn!(client = %client_id, "outbound queue full, dropping client");
        state.clients.remove(&client_id);
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

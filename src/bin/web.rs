//! Single binary web server: leaderboard, history search and session settlement via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, DATA_DIR,
//! RECORDS_FILE, STATS_FILE, BASELINE_FILE, STATIC_DIR.

use actix_files::Files;
use actix_web::{
    get, post,
    http::StatusCode,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use poker_ledger_web::{
    check_session, find_by_date, finish_commit, format_canonical_date, latest_date,
    parse_canonical_date, prepare_commit, settle, CommitRequest, CommitResponse, CommitSink,
    CsvStore, Ledger, LedgerError, ServerConfig, Session, SessionDraft, SessionId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A settled session waiting for the operator to commit it.
struct PendingSession {
    session: Session,
    last_activity: Instant,
}

/// Committed ledger plus settled-but-uncommitted sessions by id.
struct AppState {
    ledger: Ledger,
    pending: HashMap<SessionId, PendingSession>,
}

/// One operator at a time: commits hold the lock until the tables are written.
type SharedState = Data<Mutex<AppState>>;

/// Pending sessions not touched for this long are dropped.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(6 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct HistoryParams {
    date: String,
}

#[derive(Deserialize)]
struct CommitBody {
    /// Operator's answer to "records already exist on this date, continue?".
    #[serde(default)]
    confirm: bool,
}

/// Path segment: pending session id (e.g. /api/sessions/{id}/commit)
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

fn failure(status: StatusCode, message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "message": message.to_string(),
    }))
}

fn ledger_failure(e: &LedgerError) -> HttpResponse {
    let status = match e {
        LedgerError::ExactDuplicate { .. } | LedgerError::ConfirmationDeclined => {
            StatusCode::CONFLICT
        }
        LedgerError::RemoteCommitFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    failure(status, e)
}

/// Run a sink commit off the async executor.
async fn commit_blocking(store: &CsvStore, request: CommitRequest) -> CommitResponse {
    let mut store = store.clone();
    match tokio::task::spawn_blocking(move || store.commit(&request)).await {
        Ok(response) => response,
        Err(e) => CommitResponse::rejected(format!("commit task failed: {}", e)),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "poker-ledger-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Leaderboard rows in rank order plus the latest recorded session date.
#[get("/api/leaderboard")]
async fn api_leaderboard(state: SharedState) -> HttpResponse {
    let g = state.lock().await;
    let last_update = latest_date(g.ledger.history())
        .or_else(|| g.ledger.stats().iter().filter_map(|p| p.date).max());
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "lastUpdate": last_update,
        "playerStats": g.ledger.stats(),
    }))
}

/// History records on one date (either date notation accepted).
#[get("/api/history")]
async fn api_history(state: SharedState, params: Query<HistoryParams>) -> HttpResponse {
    let g = state.lock().await;
    let records = find_by_date(g.ledger.history(), &params.date);
    let date = parse_canonical_date(&params.date).map(format_canonical_date);
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "date": date,
        "records": records,
    }))
}

/// Add a player to the roster; persisted before it becomes visible.
#[post("/api/players")]
async fn api_add_player(
    state: SharedState,
    store: Data<CsvStore>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    let mut g = state.lock().await;
    let mut next = g.ledger.clone();
    if let Err(e) = next.add_player(body.name.trim()) {
        return ledger_failure(&e);
    }
    let stats = next.stats().to_vec();
    let store = store.get_ref().clone();
    match tokio::task::spawn_blocking(move || store.write_stats(&stats)).await {
        Ok(Ok(())) => {
            log::info!("Added player {}", body.name.trim());
            g.ledger = next;
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "playerStats": g.ledger.stats(),
            }))
        }
        Ok(Err(e)) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Validate a session and allocate its service fee. The settled session is kept
/// pending under the returned id; nothing is recorded yet.
#[post("/api/sessions")]
async fn api_settle_session(state: SharedState, body: Json<SessionDraft>) -> HttpResponse {
    let session = match settle(&body) {
        Ok(s) => s,
        Err(e) => {
            log::info!("Session for {} rejected: {}", body.date, e);
            return ledger_failure(&e);
        }
    };
    let mut g = state.lock().await;
    let mut preview = session.clone();
    let report = match check_session(&g.ledger, &mut preview) {
        Ok(r) => r,
        Err(e) => return ledger_failure(&e),
    };
    let id = session.id;
    g.pending.insert(
        id,
        PendingSession {
            session,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "session": preview,
        "duplicate": report,
    }))
}

/// Commit a pending session: duplicate gate against the current history, then
/// write through the CSV store and adopt what it returns.
#[post("/api/sessions/{id}/commit")]
async fn api_commit_session(
    state: SharedState,
    store: Data<CsvStore>,
    path: Path<SessionPath>,
    body: Option<Json<CommitBody>>,
) -> HttpResponse {
    let confirm = body.map(|b| b.confirm).unwrap_or_default();
    let mut g = state.lock().await;
    let mut session = match g.pending.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            entry.session.clone()
        }
        None => return failure(StatusCode::NOT_FOUND, "No pending session"),
    };

    let report = match check_session(&g.ledger, &mut session) {
        Ok(r) => r,
        Err(e) => return ledger_failure(&e),
    };
    let request = match prepare_commit(&session, |_| confirm) {
        Ok(r) => r,
        Err(LedgerError::ConfirmationDeclined) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "success": false,
                "needsConfirmation": true,
                "sameDateRecords": report.same_date_records,
                "message": format!(
                    "There are already {} records with the date {}. Confirm to continue.",
                    report.same_date_records, session.date
                ),
            }));
        }
        Err(e) => {
            if matches!(e, LedgerError::ExactDuplicate { .. }) {
                g.pending.remove(&path.id);
            }
            return ledger_failure(&e);
        }
    };

    let response = commit_blocking(&store, request).await;
    let app = &mut *g;
    match finish_commit(&mut app.ledger, &mut session, response) {
        Ok(()) => {
            app.pending.remove(&path.id);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "gameRecords": app.ledger.history(),
                "playerStats": app.ledger.stats(),
            }))
        }
        Err(e) => ledger_failure(&e),
    }
}

/// Raw commit sink: append already-settled records, answer with the new tables.
#[post("/update_leaderboard")]
async fn api_update_leaderboard(
    state: SharedState,
    store: Data<CsvStore>,
    body: Json<CommitRequest>,
) -> HttpResponse {
    log::info!("Received {} new game records", body.new_records.len());
    let mut g = state.lock().await;
    let response = commit_blocking(&store, body.into_inner()).await;
    if let Err(e) = g.ledger.adopt(response.clone()) {
        log::warn!("Update rejected: {}", e);
    }
    HttpResponse::Ok().json(response)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let store = config.store();
    let ledger = store
        .load_ledger()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    log::info!(
        "Tables: {} / {}",
        store.records_path().display(),
        store.stats_path().display()
    );

    let state = Data::new(Mutex::new(AppState {
        ledger,
        pending: HashMap::new(),
    }));
    let store = Data::new(store);

    // Background task: every 30 minutes, drop pending sessions idle for 6+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = state_cleanup.lock().await;
            let before = g.pending.len();
            g.pending.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.pending.len();
            if removed > 0 {
                log::info!("Dropped {} idle pending session(s)", removed);
            }
        }
    });

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(store.clone())
            .service(api_health)
            .service(favicon)
            .service(api_leaderboard)
            .service(api_history)
            .service(api_add_player)
            .service(api_settle_session)
            .service(api_commit_session)
            .service(api_update_leaderboard)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await
}

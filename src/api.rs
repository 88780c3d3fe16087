//! Read-only HTTP API over the seeded directory.
//!
//! Two endpoints reconstruct the bank/branch join for clients; the store is
//! never written after startup, so every handler is a pure read.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::db::{self, Bank, Branch};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }
}

/// Structured error body: `{"error": "..."}`
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Bank with its branches nested, as returned by `GET /api/banks`
#[derive(Serialize)]
struct BankWithBranches {
    id: i64,
    name: String,
    branches: Vec<Branch>,
}

/// Branch with its owning bank nested, as returned by `GET /api/branches/:ifsc`
#[derive(Serialize)]
struct BranchDetail {
    #[serde(flatten)]
    branch: Branch,
    bank: BankRef,
}

#[derive(Serialize)]
struct BankRef {
    id: i64,
    name: String,
}

impl From<Bank> for BankRef {
    fn from(bank: Bank) -> Self {
        Self {
            id: bank.id,
            name: bank.name,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn collect_banks(conn: &Connection) -> anyhow::Result<Vec<BankWithBranches>> {
    let mut result = Vec::new();
    for bank in db::get_all_banks(conn)? {
        let branches = db::get_branches_for_bank(conn, bank.id)?;
        result.push(BankWithBranches {
            id: bank.id,
            name: bank.name,
            branches,
        });
    }
    Ok(result)
}

/// GET /api/banks - Every bank with its branches nested
async fn list_banks(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match collect_banks(&conn) {
        Ok(banks) => (StatusCode::OK, Json(banks)).into_response(),
        Err(e) => {
            eprintln!("Error listing banks: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal server error")),
            )
                .into_response()
        }
    }
}

/// GET /api/branches/:ifsc - One branch with its owning bank nested
async fn get_branch(
    State(state): State<AppState>,
    Path(ifsc): Path<String>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    // Decode URL-encoded routing code
    let ifsc = urlencoding::decode(&ifsc)
        .unwrap_or_else(|_| ifsc.clone().into())
        .into_owned();

    let branch = match db::get_branch(&conn, &ifsc) {
        Ok(Some(branch)) => branch,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new("Branch not found")),
            )
                .into_response()
        }
        Err(e) => {
            eprintln!("Error getting branch {}: {}", ifsc, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal server error")),
            )
                .into_response();
        }
    };

    // The loader guarantees every branch points at a bank; an unresolvable
    // reference here means the store is corrupt, which is not a 404.
    match db::get_bank(&conn, branch.bank_id) {
        Ok(Some(bank)) => (
            StatusCode::OK,
            Json(BranchDetail {
                branch,
                bank: bank.into(),
            }),
        )
            .into_response(),
        Ok(None) => {
            eprintln!("Branch {} has invalid bank_id: {}", ifsc, branch.bank_id);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Branch has invalid bank reference")),
            )
                .into_response()
        }
        Err(e) => {
            eprintln!("Error resolving bank for branch {}: {}", ifsc, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal server error")),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/banks", get(list_banks))
        .route("/branches/:ifsc", get(get_branch))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

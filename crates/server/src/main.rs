// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clap::Parser;
use crewsync_domain::{ActorId, RealId, RoleType, SubjectId};
use crewsync_remote::{
    CreateBindingRequest, CreateBindingResponse, CreateSlotRequest, CreateSlotResponse,
    ErrorResponse, InMemoryRemote, RemoteError, RemoteStore, SubjectRecord, UpdateBindingRequest,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Crewsync Server - HTTP reference collaborator for crew assignment editing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Number of empty subjects to create at startup
    #[arg(short, long, default_value_t = 3)]
    seed_subjects: u16,
}

/// Application state shared across handlers.
///
/// The collaborator handle is cheap to clone; every clone sees the same tables.
#[derive(Clone)]
struct AppState {
    /// The in-memory store behind every route.
    remote: InMemoryRemote,
}

/// One entry of the subject listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubjectSummary {
    /// The subject's key.
    id: i64,
    /// Display name.
    name: String,
    /// Number of slots.
    slots: usize,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<RemoteError> for HttpError {
    fn from(err: RemoteError) -> Self {
        let status: StatusCode = match err {
            RemoteError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RemoteError::NotFound { .. } => StatusCode::NOT_FOUND,
            RemoteError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            RemoteError::Network { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        warn!(status = %status, error = %err, "Request failed");
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for GET `/subjects` endpoint.
async fn handle_list_subjects(
    AxumState(app_state): AxumState<AppState>,
) -> Json<Vec<SubjectSummary>> {
    let summaries: Vec<SubjectSummary> = app_state
        .remote
        .subject_ids()
        .into_iter()
        .filter_map(|id| app_state.remote.snapshot(id))
        .map(|record| SubjectSummary {
            id: record.id,
            name: record.name,
            slots: record.slots.len(),
        })
        .collect();
    Json(summaries)
}

/// Handler for GET `/subjects/{subject_id}` endpoint.
async fn handle_fetch_subject(
    AxumState(app_state): AxumState<AppState>,
    Path(subject_id): Path<i64>,
) -> Result<Json<SubjectRecord>, HttpError> {
    let record: SubjectRecord = app_state
        .remote
        .fetch_subject(SubjectId::new(subject_id))
        .await?;
    Ok(Json(record))
}

/// Handler for POST `/subjects/{subject_id}/slots` endpoint.
async fn handle_create_slot(
    AxumState(app_state): AxumState<AppState>,
    Path(subject_id): Path<i64>,
    Json(req): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<CreateSlotResponse>), HttpError> {
    let slot: RealId = app_state
        .remote
        .create_slot(
            SubjectId::new(subject_id),
            req.role_label,
            RoleType::new(&req.role_type),
        )
        .await?;
    info!(subject = subject_id, slot = %slot, "Created slot");
    Ok((
        StatusCode::CREATED,
        Json(CreateSlotResponse {
            slot_id: slot.value(),
        }),
    ))
}

/// Handler for DELETE `/slots/{slot_id}` endpoint.
async fn handle_delete_slot(
    AxumState(app_state): AxumState<AppState>,
    Path(slot_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    app_state.remote.delete_slot(RealId::new(slot_id)).await?;
    info!(slot = slot_id, "Deleted slot");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/slots/{slot_id}/bindings` endpoint.
async fn handle_create_binding(
    AxumState(app_state): AxumState<AppState>,
    Path(slot_id): Path<i64>,
    Json(req): Json<CreateBindingRequest>,
) -> Result<(StatusCode, Json<CreateBindingResponse>), HttpError> {
    let binding: RealId = app_state
        .remote
        .create_binding(RealId::new(slot_id), ActorId::new(req.actor_id))
        .await?;
    info!(slot = slot_id, binding = %binding, actor = req.actor_id, "Created binding");
    Ok((
        StatusCode::CREATED,
        Json(CreateBindingResponse {
            binding_id: binding.value(),
        }),
    ))
}

/// Handler for DELETE `/bindings/{binding_id}` endpoint.
async fn handle_delete_binding(
    AxumState(app_state): AxumState<AppState>,
    Path(binding_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    app_state
        .remote
        .delete_binding(RealId::new(binding_id))
        .await?;
    info!(binding = binding_id, "Deleted binding");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for PATCH `/bindings/{binding_id}` endpoint.
async fn handle_update_binding(
    AxumState(app_state): AxumState<AppState>,
    Path(binding_id): Path<i64>,
    Json(req): Json<UpdateBindingRequest>,
) -> Result<StatusCode, HttpError> {
    app_state
        .remote
        .update_binding(RealId::new(binding_id), req.status)
        .await?;
    info!(binding = binding_id, status = %req.status, "Updated binding");
    Ok(StatusCode::NO_CONTENT)
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/subjects", get(handle_list_subjects))
        .route("/subjects/{subject_id}", get(handle_fetch_subject))
        .route("/subjects/{subject_id}/slots", post(handle_create_slot))
        .route("/slots/{slot_id}", delete(handle_delete_slot))
        .route("/slots/{slot_id}/bindings", post(handle_create_binding))
        .route(
            "/bindings/{binding_id}",
            delete(handle_delete_binding).patch(handle_update_binding),
        )
        .with_state(app_state)
}

/// Creates the collaborator with `count` empty subjects.
fn seed_remote(count: u16) -> InMemoryRemote {
    let remote: InMemoryRemote = InMemoryRemote::new();
    for n in 1..=count {
        remote.seed_subject(&format!("Subject {n}"));
    }
    remote
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Crewsync Server");

    let app_state: AppState = AppState {
        remote: seed_remote(args.seed_subjects),
    };
    info!(subjects = args.seed_subjects, "Seeded in-memory store");

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

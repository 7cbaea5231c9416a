//! HTTP routes for the profile service
//!
//! Handlers decode requests into [`ProfileCommand`]s, hand them to the
//! orchestrator and render the resulting [`ProfileOutcome`]. No decisions
//! are made here.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use profile_core::{
    Profile, ProfileCommand, ProfileOrchestrator, ProfileOutcome, PutProfileRequest,
    validate_username,
};
use tracing::{debug, error, warn};

/// Build the service router
pub fn router(orchestrator: ProfileOrchestrator) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/Profile", post(create_profile))
        .route("/Profile/{username}", get(get_profile).put(update_profile))
        .with_state(orchestrator)
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// `GET /Profile/{username}`
pub async fn get_profile(
    State(orchestrator): State<ProfileOrchestrator>,
    Path(username): Path<String>,
) -> Response {
    if let Err(e) = validate_username(&username) {
        return bad_request(e.to_string());
    }

    let outcome = orchestrator.handle(ProfileCommand::Fetch { username }).await;
    render(outcome)
}

/// `POST /Profile`
pub async fn create_profile(
    State(orchestrator): State<ProfileOrchestrator>,
    payload: Result<Json<Profile>, JsonRejection>,
) -> Response {
    let Json(profile) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };
    if let Err(e) = profile.validate() {
        return bad_request(e.to_string());
    }

    let outcome = orchestrator.handle(ProfileCommand::Create(profile)).await;
    render(outcome)
}

/// `PUT /Profile/{username}`
///
/// The body holds names only; the username is taken from the path.
pub async fn update_profile(
    State(orchestrator): State<ProfileOrchestrator>,
    Path(username): Path<String>,
    payload: Result<Json<PutProfileRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };
    if let Err(e) = validate_username(&username) {
        return bad_request(e.to_string());
    }

    let outcome = orchestrator
        .handle(ProfileCommand::Update { username, request })
        .await;
    render(outcome)
}

/// Map an outcome to its HTTP response
fn render(outcome: ProfileOutcome) -> Response {
    debug!("Rendering {} outcome", outcome.kind());

    match outcome {
        ProfileOutcome::Found(profile) | ProfileOutcome::Updated(profile) => {
            (StatusCode::OK, Json(profile)).into_response()
        }
        ProfileOutcome::Created(profile) => {
            let location = format!("/Profile/{}", urlencoding::encode(&profile.username));
            match HeaderValue::from_str(&location) {
                Ok(location) => (
                    StatusCode::CREATED,
                    [(header::LOCATION, location)],
                    Json(profile),
                )
                    .into_response(),
                Err(_) => {
                    warn!("Cannot express {} as a Location header", location);
                    (StatusCode::CREATED, Json(profile)).into_response()
                }
            }
        }
        ProfileOutcome::NotFound(username) => (
            StatusCode::NOT_FOUND,
            format!("A User with username {} was not found", username),
        )
            .into_response(),
        ProfileOutcome::Conflict(username) => (
            StatusCode::CONFLICT,
            format!("A user with username {} already exists", username),
        )
            .into_response(),
        ProfileOutcome::StorageFailure(e) => {
            error!("Request failed on storage: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The profile store is unavailable",
            )
                .into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

/// Malformed or incomplete bodies are client errors; content-type problems
/// keep axum's own status.
fn reject_body(rejection: JsonRejection) -> Response {
    let status = match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            StatusCode::BAD_REQUEST
        }
        ref other => other.status(),
    };
    (status, rejection.body_text()).into_response()
}

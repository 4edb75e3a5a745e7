use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate, Utc};
use log::{error, warn};
use serde::Deserialize;
use serde_json::json;
use tokio::{
    sync::{Mutex, RwLock},
    task,
};

use htn_schedule::{
    aggregate::Overview,
    calendar::{initial_month, MonthGrid},
    detail::{resolve_event, EventDetail},
    session::{KeyValueStore, SessionContext},
    source::{EventSource, HttpEventSource},
    to_ics, Event, EventId, FetchError, SessionError, TypeFilter,
};

use crate::cache::{self, Snapshot};

const CALENDAR_NAME: &str = "Hack the North";

pub type Store = Box<dyn KeyValueStore + Send + Sync>;

pub struct AppState {
    source: HttpEventSource,
    events: Snapshot<Vec<Event>>,
    loading: Mutex<()>,
    session: RwLock<SessionContext<Store>>,
}

impl AppState {
    pub fn new(source: HttpEventSource, store: Store, cache: cache::Config) -> Self {
        Self {
            source,
            events: Snapshot::new(cache),
            loading: Mutex::new(()),
            session: RwLock::new(SessionContext::restore(store)),
        }
    }

    /// The full event list, fetched on first use and kept for the run unless
    /// refreshing is enabled. A failed refresh falls back to the previous
    /// snapshot when there is one.
    async fn events(&self) -> Result<Arc<Vec<Event>>, FetchError> {
        if let Some(events) = self.events.fresh().await {
            return Ok(events);
        }

        let _loading = self.loading.lock().await;
        // Another request may have stored the list while this one waited.
        if let Some(events) = self.events.fresh().await {
            return Ok(events);
        }

        match self.source.all_events().await {
            Ok(events) => Ok(self.events.store(events).await),
            Err(err) => {
                error!("Failed to refresh events from {}: {err:?}", self.source.base_url());
                match self.events.last().await {
                    Some(events) => {
                        warn!("Serving the previous schedule snapshot");
                        Ok(events)
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }
}

type Shared = Arc<AppState>;

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/events", get(handle_events))
        .route("/events/:id", get(handle_event))
        .route("/overview", get(handle_overview))
        .route("/calendar", get(handle_calendar))
        .route("/calendar.ics", get(handle_ics))
        .route(
            "/session",
            get(handle_session).post(handle_login).delete(handle_logout),
        )
        .fallback(|| async { Redirect::permanent(env!("CARGO_PKG_REPOSITORY")) })
        .with_state(state)
}

fn fetch_failed(err: &FetchError) -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() }))).into_response()
}

#[derive(Debug, Default, Deserialize)]
struct ListingQuery {
    #[serde(rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    q: String,
    month: Option<String>,
}

impl ListingQuery {
    fn to_query(&self, is_authenticated: bool) -> Result<htn_schedule::Query, Response> {
        let type_filter = match &self.event_type {
            Some(raw) => raw
                .parse::<TypeFilter>()
                .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()).into_response())?,
            None => TypeFilter::All,
        };

        Ok(htn_schedule::Query::new(is_authenticated)
            .with_type(type_filter)
            .with_text(self.q.as_str()))
    }
}

/// Runs the listing pipeline for one request. Returns the full list next to
/// the filtered, viewer-redacted one.
async fn listing(
    state: &AppState,
    params: &ListingQuery,
) -> Result<(Arc<Vec<Event>>, Vec<Event>), Response> {
    let is_authenticated = state.is_authenticated().await;
    let query = params.to_query(is_authenticated)?;
    let all = state.events().await.map_err(|err| fetch_failed(&err))?;

    let filtered = query
        .apply(&all)
        .into_iter()
        .map(|event| event.for_viewer(is_authenticated))
        .collect();

    Ok((all, filtered))
}

async fn handle_events(
    State(state): State<Shared>,
    Query(params): Query<ListingQuery>,
) -> Response {
    match listing(&state, &params).await {
        Ok((_, filtered)) => Json(filtered).into_response(),
        Err(response) => response,
    }
}

async fn handle_overview(
    State(state): State<Shared>,
    Query(params): Query<ListingQuery>,
) -> Response {
    let (all, filtered) = match listing(&state, &params).await {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    Json(Overview::new(&all, &filtered, Utc::now(), &Local)).into_response()
}

async fn handle_calendar(
    State(state): State<Shared>,
    Query(params): Query<ListingQuery>,
) -> Response {
    let (_, filtered) = match listing(&state, &params).await {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    let today = Local::now().date_naive();
    let month = match &params.month {
        Some(raw) => match NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
            Ok(month) => month,
            Err(_) => {
                return (StatusCode::BAD_REQUEST, "month must look like YYYY-MM").into_response();
            }
        },
        None => initial_month(&filtered, &Local, today),
    };

    Json(MonthGrid::new(month, &filtered, &Local, today)).into_response()
}

async fn handle_ics(
    State(state): State<Shared>,
    Query(params): Query<ListingQuery>,
) -> Response {
    match listing(&state, &params).await {
        Ok((_, filtered)) => (
            [("content-type", "text/calendar")],
            to_ics(CALENDAR_NAME, &filtered).to_string(),
        )
            .into_response(),
        Err(response) => response,
    }
}

async fn handle_event(State(state): State<Shared>, Path(id): Path<EventId>) -> Response {
    let is_authenticated = state.is_authenticated().await;

    // The detail view still works for ids the bulk fetch could not deliver.
    let loaded = match state.events().await {
        Ok(events) => events,
        Err(err) => {
            warn!("Resolving event {id} without a schedule: {err}");
            Arc::new(Vec::new())
        }
    };

    match resolve_event(&loaded, id, &state.source).await {
        Ok(event) => Json(EventDetail::new(event, &loaded, is_authenticated)).into_response(),
        Err(err) => {
            error!("Failed to fetch event {id}: {err:?}");
            fetch_failed(&err)
        }
    }
}

async fn handle_session(State(state): State<Shared>) -> Response {
    let session = state.session.read().await;
    match session.current() {
        Some(current) => Json(current).into_response(),
        None => Json(json!({ "isAuthenticated": false })).into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginRequest {
    Demo { demo: bool },
    Credentials { username: String, password: String },
}

// Session changes write through the store with blocking file I/O, so they
// run on the blocking pool.
async fn handle_login(State(state): State<Shared>, Json(request): Json<LoginRequest>) -> Response {
    let result = task::spawn_blocking(move || {
        let mut session = state.session.blocking_write();
        match &request {
            LoginRequest::Demo { demo: true } => session.demo_login().cloned(),
            LoginRequest::Demo { demo: false } => Err(SessionError::InvalidCredentials),
            LoginRequest::Credentials { username, password } => {
                session.login(username, password).cloned()
            }
        }
    })
    .await;

    match result {
        Ok(Ok(current)) => Json(current).into_response(),
        Ok(Err(SessionError::InvalidCredentials)) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": SessionError::InvalidCredentials.to_string() })),
        )
            .into_response(),
        Ok(Err(err)) => {
            error!("Failed to persist session: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            error!("Session update did not complete: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn handle_logout(State(state): State<Shared>) -> Response {
    match task::spawn_blocking(move || state.session.blocking_write().logout()).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(err)) => {
            error!("Failed to clear session: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            error!("Session update did not complete: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

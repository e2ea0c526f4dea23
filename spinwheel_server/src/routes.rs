use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use spinwheel_core::{GameConfig, SessionError};
use spinwheel_shared::{
    ApiError, BalanceResponse, BetRequest, BetResponse, CloseSessionResponse,
    CreateSessionRequest, CreditPrizeRequest, ErrorBody, ModeResponse, PrizeOverrideRequest,
    RoundKind, SessionView, SettleRequest, SpinLogEntry, SpinResponse, WheelDrawResponse,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::store::{SessionEntry, SessionStore};

pub struct AppState {
    pub store: SessionStore,
    pub config: Arc<GameConfig>,
    pub api_key: String,
}

impl AppState {
    pub fn new(config: GameConfig, api_key: impl Into<String>) -> Self {
        Self {
            store: SessionStore::new(),
            config: Arc::new(config),
            api_key: api_key.into(),
        }
    }
}

pub struct AppError(ApiError);

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let api = match &err {
            SessionError::InsufficientFunds { .. } => ApiError::InsufficientFunds(err.to_string()),
            SessionError::Protocol(violation) => ApiError::Conflict(violation.to_string()),
            SessionError::Overflow | SessionError::Config(_) => {
                error!(%err, "engine failure");
                ApiError::Internal
            }
        };
        Self(api)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type Handler<T> = Result<Json<T>, AppError>;

async fn session_op<T>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut SessionEntry) -> Result<T, AppError>,
) -> Result<T, AppError> {
    state
        .store
        .with(&id, f)
        .await
        .unwrap_or(Err(AppError(ApiError::NotFound)))
}

fn require_admin(state: &AppState, bearer: &Bearer) -> Result<(), AppError> {
    if bearer.token() != state.api_key {
        return Err(ApiError::Unauthorized.into());
    }
    Ok(())
}

async fn route_healthz() -> &'static str {
    "ok"
}

async fn route_create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    if req.client_seed.as_deref().is_some_and(str::is_empty) {
        return Err(ApiError::Invalid("client_seed must not be empty".into()).into());
    }
    let entry = SessionEntry::new(state.config.clone(), req.client_seed);
    let id = state.store.insert(entry).await;
    let view = session_op(&state, id, |entry| Ok(entry.view(id))).await?;
    info!(session = %id, hash = %view.server_seed_hash, "session created");
    Ok((StatusCode::CREATED, Json(view)))
}

async fn route_get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Handler<SessionView> {
    session_op(&state, id, |entry| Ok(Json(entry.view(id)))).await
}

async fn route_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Handler<Vec<SpinLogEntry>> {
    session_op(&state, id, |entry| Ok(Json(entry.history.clone()))).await
}

async fn route_close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Handler<CloseSessionResponse> {
    let entry = state
        .store
        .remove(&id)
        .await
        .ok_or(AppError(ApiError::NotFound))?;
    info!(session = %id, balance = %entry.session.current_balance(), "session closed");
    Ok(Json(CloseSessionResponse {
        server_seed: entry.server_seed().to_string(),
        server_seed_hash: entry.server_seed_hash.clone(),
        client_seed: entry.client_seed.clone(),
        final_balance: entry.session.current_balance(),
        history: entry.history,
    }))
}

async fn route_bet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<BetRequest>,
) -> Handler<BetResponse> {
    session_op(&state, id, |entry| {
        let amount = match req.amount {
            Some(amount) => amount,
            None => {
                let mut rng = entry.next_rng();
                entry.session.select_bet(&mut rng)
            }
        };
        entry.session.place_bet(amount)?;
        Ok(Json(BetResponse {
            bet: amount,
            balance: entry.session.current_balance(),
        }))
    })
    .await
}

async fn route_spin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Handler<SpinResponse> {
    session_op(&state, id, |entry| {
        let mut rng = entry.next_rng();
        let nonce = entry.nonce;
        let outcome = entry.session.spin_base_game(&mut rng)?;
        entry.log(
            Some(nonce),
            RoundKind::Spin {
                stops: outcome.stops.clone(),
                bet: outcome.bet,
                total_win: outcome.total_win,
            },
        );
        Ok(Json(SpinResponse {
            server_seed_hash: entry.server_seed_hash.clone(),
            nonce,
            window: outcome.window.iter().map(|column| column.to_vec()).collect(),
            stops: outcome.stops,
            bet: outcome.bet,
            wins: outcome.wins,
            total_win: outcome.total_win,
            balance: entry.session.current_balance(),
        }))
    })
    .await
}

async fn route_settle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SettleRequest>,
) -> Handler<BalanceResponse> {
    session_op(&state, id, |entry| {
        let balance = entry.session.credit_winnings(req.total_win)?;
        Ok(Json(BalanceResponse { balance }))
    })
    .await
}

async fn route_toggle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Handler<ModeResponse> {
    session_op(&state, id, |entry| {
        let mode = entry.session.toggle_game_mode()?;
        Ok(Json(ModeResponse { mode }))
    })
    .await
}

async fn route_wheel_draw(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Handler<WheelDrawResponse> {
    session_op(&state, id, |entry| {
        let mut rng = entry.next_rng();
        let draw = entry.session.draw_bonus_prize(&mut rng)?;
        let nonce = (!draw.forced).then_some(entry.nonce);
        entry.log(
            nonce,
            RoundKind::Wheel {
                prize_index: draw.index,
                prize_value: draw.value,
                forced: draw.forced,
            },
        );
        Ok(Json(WheelDrawResponse {
            server_seed_hash: entry.server_seed_hash.clone(),
            nonce,
            prize_index: draw.index,
            prize_value: draw.value,
        }))
    })
    .await
}

async fn route_credit_prize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreditPrizeRequest>,
) -> Handler<BalanceResponse> {
    session_op(&state, id, |entry| {
        let balance = entry.session.credit_bonus_prize(req.prize_value)?;
        Ok(Json(BalanceResponse { balance }))
    })
    .await
}

async fn route_set_override(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<PrizeOverrideRequest>,
) -> Result<StatusCode, AppError> {
    require_admin(&state, &bearer)?;
    session_op(&state, id, |entry| {
        entry.session.set_prize_override(req.index)?;
        Ok(StatusCode::NO_CONTENT)
    })
    .await
}

async fn route_clear_override(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<StatusCode, AppError> {
    require_admin(&state, &bearer)?;
    session_op(&state, id, |entry| {
        entry.session.clear_prize_override();
        Ok(StatusCode::NO_CONTENT)
    })
    .await
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(route_healthz))
        .route("/sessions", post(route_create_session))
        .route(
            "/sessions/:id",
            get(route_get_session).delete(route_close_session),
        )
        .route("/sessions/:id/history", get(route_history))
        .route("/sessions/:id/bet", post(route_bet))
        .route("/sessions/:id/spin", post(route_spin))
        .route("/sessions/:id/settle", post(route_settle))
        .route("/sessions/:id/toggle", post(route_toggle))
        .route("/sessions/:id/wheel", post(route_wheel_draw))
        .route("/sessions/:id/wheel/credit", post(route_credit_prize))
        .route(
            "/sessions/:id/wheel/override",
            put(route_set_override).delete(route_clear_override),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

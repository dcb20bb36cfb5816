use crate::domain::models::{NewWorkOrder, WorkOrder};
use crate::domain::views::WorkOrderFilter;
use crate::domain::work_order::{CustomerDecision, WorkOrderAction};
use crate::error::PortalResult;
use crate::services::work_orders;
use crate::state::SharedState;
use crate::web::session::Session;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub action: WorkOrderAction,
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: CustomerDecision,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id/transition", post(transition_order))
        .with_state(state)
}

/// Customer approval queue.
pub fn approvals_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(pending_approvals))
        .route("/:id", post(decide))
        .with_state(state)
}

async fn list_orders(
    Session(_ctx): Session,
    State(state): State<SharedState>,
    Query(filter): Query<WorkOrderFilter>,
) -> PortalResult<Json<Vec<WorkOrder>>> {
    Ok(Json(work_orders::list(state.store.as_ref(), &filter).await?))
}

async fn create_order(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Json(payload): Json<NewWorkOrder>,
) -> PortalResult<impl IntoResponse> {
    let order = work_orders::create(state.store.as_ref(), &ctx, &payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn transition_order(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> PortalResult<Json<WorkOrder>> {
    let order = work_orders::transition(state.store.as_ref(), &ctx, id, req.action).await?;
    Ok(Json(order))
}

async fn pending_approvals(
    Session(_ctx): Session,
    State(state): State<SharedState>,
) -> PortalResult<Json<Vec<WorkOrder>>> {
    Ok(Json(work_orders::pending_approvals(state.store.as_ref()).await?))
}

async fn decide(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> PortalResult<Json<WorkOrder>> {
    let order =
        work_orders::decide(state.store.as_ref(), &ctx, id, req.decision, req.notes).await?;
    Ok(Json(order))
}

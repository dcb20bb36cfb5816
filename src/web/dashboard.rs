use crate::domain::models::{AssetStatus, PmSchedule, PmSummary};
use crate::domain::pm_summary::PmSummaryPatch;
use crate::domain::views::AssetFilter;
use crate::error::PortalResult;
use crate::services::dashboard::{self, Dashboard};
use crate::state::SharedState;
use crate::web::session::Session;
use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub search: Option<String>,
    pub asset_type: Option<String>,
    pub status: Option<AssetStatus>,
}

#[derive(Deserialize)]
pub struct CycleRequest {
    pub asset_type_id: Uuid,
    pub month: i16,
    pub year: i32,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(overview))
        .route("/pm-summaries/:id", patch(update_summary))
        .route("/schedule/cycle", post(cycle_schedule))
        .with_state(state)
}

async fn overview(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Query(query): Query<DashboardQuery>,
) -> PortalResult<Json<Dashboard>> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let filter = AssetFilter {
        search: query.search,
        asset_type: query.asset_type,
        status: query.status,
    };
    let view = dashboard::load(state.store.as_ref(), &ctx, year, &filter, today).await?;
    Ok(Json(view))
}

async fn update_summary(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<PmSummaryPatch>,
) -> PortalResult<Json<PmSummary>> {
    let summary = dashboard::update_summary(state.store.as_ref(), &ctx, id, &changes).await?;
    Ok(Json(summary))
}

async fn cycle_schedule(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Json(req): Json<CycleRequest>,
) -> PortalResult<Json<PmSchedule>> {
    let cell = dashboard::cycle_schedule(
        state.store.as_ref(),
        &ctx,
        req.asset_type_id,
        req.month,
        req.year,
    )
    .await?;
    Ok(Json(cell))
}

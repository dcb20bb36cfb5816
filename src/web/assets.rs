use crate::domain::models::{Asset, Attachment, NewAsset};
use crate::domain::views::AssetFilter;
use crate::error::{PortalError, PortalResult};
use crate::export;
use crate::services::{assets, attachments};
use crate::state::SharedState;
use crate::web::session::Session;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/export", get(export_assets))
        .route("/:id", get(asset_detail))
        .route("/:id/attachments", get(asset_attachments))
        .with_state(state)
}

async fn list_assets(
    Session(_ctx): Session,
    State(state): State<SharedState>,
    Query(filter): Query<AssetFilter>,
) -> PortalResult<Json<Vec<Asset>>> {
    Ok(Json(assets::list(state.store.as_ref(), &filter).await?))
}

async fn create_asset(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Json(payload): Json<NewAsset>,
) -> PortalResult<impl IntoResponse> {
    let asset = assets::create(state.store.as_ref(), &ctx, &payload).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Exports whatever the current filter shows.
async fn export_assets(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Query(filter): Query<AssetFilter>,
) -> PortalResult<impl IntoResponse> {
    let rows = assets::list(state.store.as_ref(), &filter).await?;
    let body = export::assets_csv(&rows)?;
    let filename = export::asset_export_filename(Utc::now().date_naive());
    tracing::info!("User {} exported {} assets", ctx.user_id, rows.len());

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

async fn asset_detail(
    Session(_ctx): Session,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<assets::AssetDetail>> {
    Ok(Json(assets::detail(state.store.as_ref(), id).await?))
}

async fn asset_attachments(
    Session(_ctx): Session,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Attachment>>, PortalError> {
    Ok(Json(attachments::for_asset(state.store.as_ref(), id).await?))
}

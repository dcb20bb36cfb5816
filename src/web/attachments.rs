use crate::domain::models::NewAttachment;
use crate::error::PortalResult;
use crate::services::attachments;
use crate::state::SharedState;
use crate::web::session::Session;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(register_attachment))
        .with_state(state)
}

async fn register_attachment(
    Session(ctx): Session,
    State(state): State<SharedState>,
    Json(payload): Json<NewAttachment>,
) -> PortalResult<impl IntoResponse> {
    let attachment = attachments::register(state.store.as_ref(), &ctx, &payload).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

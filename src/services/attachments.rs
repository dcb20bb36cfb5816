use crate::db::PortalStore;
use crate::domain::capabilities::SessionContext;
use crate::domain::models::{Attachment, NewAttachment};
use crate::error::{PortalError, PortalResult};
use crate::services::require_approver;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage path for an uploaded file. The bytes themselves live elsewhere.
pub fn storage_path(file_name: &str, at: DateTime<Utc>) -> String {
    format!("uploads/{}_{}", at.timestamp_millis(), file_name)
}

pub async fn register(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    new: &NewAttachment,
) -> PortalResult<Attachment> {
    require_approver(ctx)?;

    let file_name = new.file_name.trim();
    if file_name.is_empty() {
        return Err(PortalError::Validation("please select a file".to_string()));
    }
    if new.file_size.is_some_and(|size| size < 0) {
        return Err(PortalError::Validation("file size cannot be negative".to_string()));
    }
    if let Some(asset_id) = new.asset_id {
        if store.find_asset(asset_id).await?.is_none() {
            return Err(PortalError::NotFound("asset"));
        }
    }
    if let Some(work_order_id) = new.work_order_id {
        if store.find_work_order(work_order_id).await?.is_none() {
            return Err(PortalError::NotFound("work order"));
        }
    }

    let now = Utc::now();
    let attachment = Attachment {
        id: Uuid::new_v4(),
        file_name: file_name.to_string(),
        file_path: storage_path(file_name, now),
        file_type: new.file_type.clone(),
        file_size: new.file_size,
        category: new.category,
        asset_id: new.asset_id,
        work_order_id: new.work_order_id,
        uploaded_at: now,
    };
    store.insert_attachment(&attachment).await?;
    tracing::info!(
        "Attachment {} ({:?}) registered by {}",
        attachment.file_path,
        attachment.category,
        ctx.user_id
    );
    Ok(attachment)
}

pub async fn for_asset(store: &dyn PortalStore, asset_id: Uuid) -> PortalResult<Vec<Attachment>> {
    if store.find_asset(asset_id).await?.is_none() {
        return Err(PortalError::NotFound("asset"));
    }
    Ok(store.list_attachments_for_asset(asset_id).await?)
}

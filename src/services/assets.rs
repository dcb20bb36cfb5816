use crate::db::{AssetInsert, PortalStore, WorkOrderQuery};
use crate::domain::capabilities::SessionContext;
use crate::domain::models::{Asset, AssetStatus, Attachment, NewAsset, WorkOrder};
use crate::domain::views::{self, AssetFilter, AssetWorkSummary};
use crate::error::{PortalError, PortalResult};
use crate::services::require_edit;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct AssetDetail {
    pub asset: Asset,
    pub work_summary: AssetWorkSummary,
    pub work_orders: Vec<WorkOrder>,
    pub attachments: Vec<Attachment>,
}

pub async fn list(store: &dyn PortalStore, filter: &AssetFilter) -> PortalResult<Vec<Asset>> {
    let assets = store.list_assets().await?;
    Ok(filter.apply(&assets).into_iter().cloned().collect())
}

fn validate(new: &NewAsset) -> PortalResult<AssetInsert> {
    let asset_number = new.asset_number.trim();
    if asset_number.is_empty() {
        return Err(PortalError::Validation("asset number is required".to_string()));
    }
    let location = new.location.trim();
    if location.is_empty() {
        return Err(PortalError::Validation("location is required".to_string()));
    }
    Ok(AssetInsert {
        asset_number: asset_number.to_string(),
        asset_type_id: new.asset_type_id,
        location: location.to_string(),
        status: new.status.unwrap_or(AssetStatus::Active),
    })
}

/// Inserts the asset; the store bumps its type's serviced-unit counter in the
/// same write.
pub async fn create(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    new: &NewAsset,
) -> PortalResult<Asset> {
    require_edit(ctx)?;
    let insert = validate(new)?;

    if !store
        .list_asset_types()
        .await?
        .iter()
        .any(|t| t.id == insert.asset_type_id)
    {
        return Err(PortalError::NotFound("asset type"));
    }
    if store
        .list_assets()
        .await?
        .iter()
        .any(|a| a.asset_number.eq_ignore_ascii_case(&insert.asset_number))
    {
        return Err(PortalError::Conflict(format!(
            "asset number {} already exists",
            insert.asset_number
        )));
    }

    let asset = store.insert_asset(&insert).await?;
    tracing::info!("Asset {} created by {}", asset.asset_number, ctx.user_id);
    Ok(asset)
}

pub async fn detail(store: &dyn PortalStore, id: Uuid) -> PortalResult<AssetDetail> {
    let (asset, work_orders, attachments) = tokio::try_join!(
        store.find_asset(id),
        store.list_work_orders(WorkOrderQuery {
            asset_id: Some(id),
            ..Default::default()
        }),
        store.list_attachments_for_asset(id),
    )?;
    let asset = asset.ok_or(PortalError::NotFound("asset"))?;

    Ok(AssetDetail {
        asset,
        work_summary: views::asset_work_summary(&work_orders),
        work_orders,
        attachments,
    })
}

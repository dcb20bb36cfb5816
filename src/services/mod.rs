pub mod assets;
pub mod attachments;
pub mod dashboard;
pub mod work_orders;

use crate::domain::capabilities::SessionContext;
use crate::error::{PortalError, PortalResult};

pub(crate) fn require_edit(ctx: &SessionContext) -> PortalResult<()> {
    if ctx.capabilities.can_edit {
        Ok(())
    } else {
        tracing::warn!("User {} attempted an edit without permission", ctx.user_id);
        Err(PortalError::Forbidden)
    }
}

pub(crate) fn require_approver(ctx: &SessionContext) -> PortalResult<()> {
    if ctx.capabilities.can_approve_repairs {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::db::{AssetInsert, MemoryStore, PortalStore};
    use crate::domain::capabilities::SessionContext;
    use crate::domain::models::{AssetStatus, PmSummary, ServiceFrequency, UserProfile, UserRole};
    use chrono::Utc;
    use uuid::Uuid;

    pub fn profile(role: UserRole) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            organization: None,
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn session(role: Option<UserRole>) -> SessionContext {
        let profile = role.map(profile);
        let user_id = profile.as_ref().map(|p| p.id).unwrap_or_else(Uuid::new_v4);
        SessionContext::resolve(user_id, profile)
    }

    pub struct Fleet {
        pub store: MemoryStore,
        pub forklift_type: Uuid,
        pub forklift: Uuid,
        pub summary: Uuid,
    }

    pub async fn fleet() -> Fleet {
        let store = MemoryStore::new();
        let forklift = store.insert_asset_type("Forklift").await.unwrap();
        store.insert_asset_type("Dock Door").await.unwrap();
        let summary = PmSummary {
            id: Uuid::new_v4(),
            asset_type_id: forklift.id,
            asset_type_name: forklift.name.clone(),
            service_frequency: ServiceFrequency::Monthly,
            total_units_serviced: 0,
            compliance_percentage: 80.0,
            next_service_due: None,
            updated_at: Utc::now(),
        };
        store.insert_pm_summary(&summary).await.unwrap();
        let asset = store
            .insert_asset(&AssetInsert {
                asset_number: "FL-001".to_string(),
                asset_type_id: forklift.id,
                location: "Warehouse A".to_string(),
                status: AssetStatus::Active,
            })
            .await
            .unwrap();
        Fleet {
            store,
            forklift_type: forklift.id,
            forklift: asset.id,
            summary: summary.id,
        }
    }
}

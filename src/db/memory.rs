//! In-process store used by tests and by `STORE=memory` demo runs.

use crate::db::{AssetInsert, PortalStore, StoreError, WorkOrderQuery};
use crate::domain::models::{
    Asset, AssetType, Attachment, CustomerApprovalStatus, NewWorkOrder, PmSchedule, PmSummary,
    Priority, ScheduleStatus, UserProfile, WorkOrder, WorkOrderStatus,
};
use crate::domain::work_order::WorkOrderUpdate;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    profiles: Vec<UserProfile>,
    asset_types: Vec<AssetType>,
    assets: Vec<Asset>,
    summaries: Vec<PmSummary>,
    schedules: Vec<PmSchedule>,
    work_orders: Vec<WorkOrder>,
    attachments: Vec<Attachment>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn type_name(&self, id: Uuid) -> Result<String> {
        self.asset_types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .ok_or_else(|| anyhow!("asset type {} does not exist", id))
    }
}

#[async_trait]
impl PortalStore for MemoryStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables
            .profiles
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&profile.email))
        {
            tables.profiles.push(profile.clone());
        }
        Ok(())
    }

    async fn list_asset_types(&self) -> Result<Vec<AssetType>> {
        let tables = self.tables.read().await;
        let mut types = tables.asset_types.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn insert_asset_type(&self, name: &str) -> Result<AssetType> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.asset_types.iter().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let row = AssetType {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        tables.asset_types.push(row.clone());
        Ok(row)
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let tables = self.tables.read().await;
        let mut assets = tables.assets.clone();
        assets.sort_by(|a, b| a.asset_number.cmp(&b.asset_number));
        Ok(assets)
    }

    async fn find_asset(&self, id: Uuid) -> Result<Option<Asset>> {
        let tables = self.tables.read().await;
        Ok(tables.assets.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_asset(&self, asset: &AssetInsert) -> Result<Asset> {
        let mut tables = self.tables.write().await;
        if tables
            .assets
            .iter()
            .any(|a| a.asset_number.eq_ignore_ascii_case(&asset.asset_number))
        {
            return Err(StoreError::Duplicate(format!("asset number {}", asset.asset_number)).into());
        }
        let row = Asset {
            id: Uuid::new_v4(),
            asset_number: asset.asset_number.clone(),
            asset_type_id: asset.asset_type_id,
            asset_type_name: tables.type_name(asset.asset_type_id)?,
            location: asset.location.clone(),
            status: asset.status,
            created_at: Utc::now(),
        };
        tables.assets.push(row.clone());
        if let Some(summary) = tables
            .summaries
            .iter_mut()
            .find(|s| s.asset_type_id == asset.asset_type_id)
        {
            summary.total_units_serviced += 1;
        }
        Ok(row)
    }

    async fn list_pm_summaries(&self) -> Result<Vec<PmSummary>> {
        let tables = self.tables.read().await;
        let mut rows = tables.summaries.clone();
        rows.sort_by(|a, b| a.asset_type_name.cmp(&b.asset_type_name));
        Ok(rows)
    }

    async fn find_pm_summary(&self, id: Uuid) -> Result<Option<PmSummary>> {
        let tables = self.tables.read().await;
        Ok(tables.summaries.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_pm_summary(&self, summary: &PmSummary) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables
            .summaries
            .iter()
            .any(|s| s.asset_type_id == summary.asset_type_id)
        {
            tables.summaries.push(summary.clone());
        }
        Ok(())
    }

    async fn update_pm_summary(&self, summary: &PmSummary) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables.summaries.iter_mut().find(|s| s.id == summary.id) {
            row.service_frequency = summary.service_frequency;
            row.compliance_percentage = summary.compliance_percentage;
            row.next_service_due = summary.next_service_due;
            row.updated_at = summary.updated_at;
        }
        Ok(())
    }

    async fn list_schedules(&self, year: i32) -> Result<Vec<PmSchedule>> {
        let tables = self.tables.read().await;
        Ok(tables
            .schedules
            .iter()
            .filter(|s| s.year == year)
            .cloned()
            .collect())
    }

    async fn find_schedule(
        &self,
        asset_type_id: Uuid,
        month: i16,
        year: i32,
    ) -> Result<Option<PmSchedule>> {
        let tables = self.tables.read().await;
        Ok(tables
            .schedules
            .iter()
            .find(|s| s.asset_type_id == asset_type_id && s.month == month && s.year == year)
            .cloned())
    }

    async fn upsert_schedule(
        &self,
        asset_type_id: Uuid,
        month: i16,
        year: i32,
        status: ScheduleStatus,
    ) -> Result<PmSchedule> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if let Some(row) = tables
            .schedules
            .iter_mut()
            .find(|s| s.asset_type_id == asset_type_id && s.month == month && s.year == year)
        {
            row.status = status;
            row.updated_at = now;
            return Ok(row.clone());
        }
        let row = PmSchedule {
            id: Uuid::new_v4(),
            asset_type_id,
            month,
            year,
            status,
            updated_at: now,
        };
        tables.schedules.push(row.clone());
        Ok(row)
    }

    async fn list_work_orders(&self, query: WorkOrderQuery) -> Result<Vec<WorkOrder>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<WorkOrder> = tables
            .work_orders
            .iter()
            .filter(|w| query.asset_id.map_or(true, |id| w.asset_id == id))
            .filter(|w| query.status.map_or(true, |s| w.status == s))
            .filter(|w| !query.awaiting_customer || w.awaiting_customer())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_work_order(&self, id: Uuid) -> Result<Option<WorkOrder>> {
        let tables = self.tables.read().await;
        Ok(tables.work_orders.iter().find(|w| w.id == id).cloned())
    }

    async fn insert_work_order(&self, order: &NewWorkOrder) -> Result<WorkOrder> {
        let mut tables = self.tables.write().await;
        let asset = tables
            .assets
            .iter()
            .find(|a| a.id == order.asset_id)
            .cloned()
            .ok_or_else(|| anyhow!("asset {} does not exist", order.asset_id))?;
        let now = Utc::now();
        let row = WorkOrder {
            id: Uuid::new_v4(),
            asset_id: asset.id,
            asset_number: asset.asset_number,
            asset_type_id: asset.asset_type_id,
            asset_type_name: asset.asset_type_name,
            asset_location: asset.location,
            title: order.title.clone(),
            description: order.description.clone(),
            priority: order.priority.unwrap_or(Priority::Medium),
            status: WorkOrderStatus::PendingApproval,
            requires_customer_approval: order.requires_customer_approval,
            customer_approval_status: order
                .requires_customer_approval
                .then_some(CustomerApprovalStatus::Pending),
            customer_approved_by: None,
            customer_approved_at: None,
            customer_approval_notes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        tables.work_orders.push(row.clone());
        Ok(row)
    }

    async fn update_work_order(&self, id: Uuid, update: &WorkOrderUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        let row = tables
            .work_orders
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| anyhow!("work order {} does not exist", id))?;
        row.apply(update);
        Ok(())
    }

    async fn insert_attachment(&self, attachment: &Attachment) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.attachments.push(attachment.clone());
        Ok(())
    }

    async fn list_attachments_for_asset(&self, asset_id: Uuid) -> Result<Vec<Attachment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Attachment> = tables
            .attachments
            .iter()
            .filter(|a| a.asset_id == Some(asset_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AssetStatus, ServiceFrequency};

    #[tokio::test]
    async fn schedule_upsert_updates_in_place() {
        let store = MemoryStore::new();
        let forklift = store.insert_asset_type("Forklift").await.unwrap();

        let first = store
            .upsert_schedule(forklift.id, 3, 2026, ScheduleStatus::Completed)
            .await
            .unwrap();
        let second = store
            .upsert_schedule(forklift.id, 3, 2026, ScheduleStatus::Scheduled)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let rows = store.list_schedules(2026).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ScheduleStatus::Scheduled);
        assert!(store.list_schedules(2025).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_asset_number_rejected_ignoring_case() {
        let store = MemoryStore::new();
        let forklift = store.insert_asset_type("Forklift").await.unwrap();
        let mut insert = AssetInsert {
            asset_number: "FL-001".to_string(),
            asset_type_id: forklift.id,
            location: "Warehouse A".to_string(),
            status: AssetStatus::Active,
        };
        store.insert_asset(&insert).await.unwrap();

        insert.asset_number = "fl-001".to_string();
        let err = store.insert_asset(&insert).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("asset number fl-001".to_string()))
        );
        assert_eq!(store.list_assets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_asset_counts_unit_on_summary() {
        let store = MemoryStore::new();
        let forklift = store.insert_asset_type("Forklift").await.unwrap();
        let summary = PmSummary {
            id: Uuid::new_v4(),
            asset_type_id: forklift.id,
            asset_type_name: forklift.name.clone(),
            service_frequency: ServiceFrequency::Monthly,
            total_units_serviced: 3,
            compliance_percentage: 95.0,
            next_service_due: None,
            updated_at: Utc::now(),
        };
        store.insert_pm_summary(&summary).await.unwrap();

        let mut insert = AssetInsert {
            asset_number: "FL-010".to_string(),
            asset_type_id: forklift.id,
            location: "Yard".to_string(),
            status: AssetStatus::Active,
        };
        store.insert_asset(&insert).await.unwrap();
        let row = store.find_pm_summary(summary.id).await.unwrap().unwrap();
        assert_eq!(row.total_units_serviced, 4);

        // A rejected insert leaves the counter alone.
        insert.asset_number = "fl-010".to_string();
        assert!(store.insert_asset(&insert).await.is_err());
        let row = store.find_pm_summary(summary.id).await.unwrap().unwrap();
        assert_eq!(row.total_units_serviced, 4);
    }

    #[tokio::test]
    async fn awaiting_customer_query() {
        let store = MemoryStore::new();
        let forklift = store.insert_asset_type("Forklift").await.unwrap();
        let asset = store
            .insert_asset(&AssetInsert {
                asset_number: "FL-001".to_string(),
                asset_type_id: forklift.id,
                location: "Warehouse A".to_string(),
                status: AssetStatus::Active,
            })
            .await
            .unwrap();
        for requires in [true, false] {
            store
                .insert_work_order(&NewWorkOrder {
                    asset_id: asset.id,
                    title: "Mast chain".to_string(),
                    description: None,
                    priority: None,
                    requires_customer_approval: requires,
                })
                .await
                .unwrap();
        }

        let pending = store
            .list_work_orders(WorkOrderQuery {
                awaiting_customer: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].asset_type_name, "Forklift");
        assert_eq!(pending[0].priority, Priority::Medium);
    }
}

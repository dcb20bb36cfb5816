pub mod memory;
pub mod postgres;
pub mod seed;

use crate::domain::models::{
    Asset, AssetStatus, AssetType, Attachment, NewWorkOrder, PmSchedule, PmSummary,
    ScheduleStatus, UserProfile, WorkOrder, WorkOrderStatus,
};
use crate::domain::work_order::WorkOrderUpdate;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store failures callers can act on. Everything else stays an opaque
/// `anyhow::Error`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(String),
}

/// Equality predicates for work-order reads. Results are newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkOrderQuery {
    pub asset_id: Option<Uuid>,
    pub status: Option<WorkOrderStatus>,
    pub awaiting_customer: bool,
}

/// Validated asset ready for insertion.
#[derive(Debug, Clone)]
pub struct AssetInsert {
    pub asset_number: String,
    pub asset_type_id: Uuid,
    pub location: String,
    pub status: AssetStatus,
}

/// Storage boundary. Every read returns typed, already-joined records.
#[async_trait]
pub trait PortalStore: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>>;
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>>;
    async fn insert_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Ordered by name.
    async fn list_asset_types(&self) -> Result<Vec<AssetType>>;
    async fn insert_asset_type(&self, name: &str) -> Result<AssetType>;

    /// Ordered by asset number.
    async fn list_assets(&self) -> Result<Vec<Asset>>;
    async fn find_asset(&self, id: Uuid) -> Result<Option<Asset>>;
    /// Inserts the asset and bumps its type's `total_units_serviced` in one
    /// write. Asset numbers are unique ignoring case.
    async fn insert_asset(&self, asset: &AssetInsert) -> Result<Asset>;

    /// Ordered by asset type name.
    async fn list_pm_summaries(&self) -> Result<Vec<PmSummary>>;
    async fn find_pm_summary(&self, id: Uuid) -> Result<Option<PmSummary>>;
    async fn insert_pm_summary(&self, summary: &PmSummary) -> Result<()>;
    async fn update_pm_summary(&self, summary: &PmSummary) -> Result<()>;

    async fn list_schedules(&self, year: i32) -> Result<Vec<PmSchedule>>;
    async fn find_schedule(
        &self,
        asset_type_id: Uuid,
        month: i16,
        year: i32,
    ) -> Result<Option<PmSchedule>>;
    /// Keyed by (asset type, month, year).
    async fn upsert_schedule(
        &self,
        asset_type_id: Uuid,
        month: i16,
        year: i32,
        status: ScheduleStatus,
    ) -> Result<PmSchedule>;

    async fn list_work_orders(&self, query: WorkOrderQuery) -> Result<Vec<WorkOrder>>;
    async fn find_work_order(&self, id: Uuid) -> Result<Option<WorkOrder>>;
    async fn insert_work_order(&self, order: &NewWorkOrder) -> Result<WorkOrder>;
    async fn update_work_order(&self, id: Uuid, update: &WorkOrderUpdate) -> Result<()>;

    async fn insert_attachment(&self, attachment: &Attachment) -> Result<()>;
    /// Newest first.
    async fn list_attachments_for_asset(&self, asset_id: Uuid) -> Result<Vec<Attachment>>;
}

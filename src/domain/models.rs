use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Customer,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "asset_status")]
pub enum AssetStatus {
    Active,
    Inactive,
    Maintenance,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "Active",
            AssetStatus::Inactive => "Inactive",
            AssetStatus::Maintenance => "Maintenance",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "service_frequency")]
pub enum ServiceFrequency {
    Monthly,
    Quarterly,
    Annually,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "schedule_status")]
pub enum ScheduleStatus {
    Scheduled,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sqlx(rename = "Customer Delayed")]
    #[serde(rename = "Customer Delayed")]
    CustomerDelayed,
    Completed,
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        ScheduleStatus::Scheduled
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "work_order_status")]
pub enum WorkOrderStatus {
    #[sqlx(rename = "Pending Approval")]
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Completed,
    Declined,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::PendingApproval => "Pending Approval",
            WorkOrderStatus::Approved => "Approved",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::Declined => "Declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderStatus::Completed | WorkOrderStatus::Declined)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "work_order_priority")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "customer_approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomerApprovalStatus {
    Pending,
    Approved,
    Declined,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "attachment_category")]
pub enum AttachmentCategory {
    #[sqlx(rename = "PM Report")]
    #[serde(rename = "PM Report")]
    PmReport,
    #[sqlx(rename = "Repair Recommendation")]
    #[serde(rename = "Repair Recommendation")]
    RepairRecommendation,
    Photo,
    Document,
    Other,
}

impl Default for AttachmentCategory {
    fn default() -> Self {
        AttachmentCategory::Document
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub organization: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct AssetType {
    pub id: Uuid,
    pub name: String,
}

/// Asset joined with the name of its type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub asset_number: String,
    pub asset_type_id: Uuid,
    pub asset_type_name: String,
    pub location: String,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PmSummary {
    pub id: Uuid,
    pub asset_type_id: Uuid,
    pub asset_type_name: String,
    pub service_frequency: ServiceFrequency,
    pub total_units_serviced: i32,
    pub compliance_percentage: f64,
    pub next_service_due: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PmSchedule {
    pub id: Uuid,
    pub asset_type_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub status: ScheduleStatus,
    pub updated_at: DateTime<Utc>,
}

/// Work order joined with the asset it targets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkOrder {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset_number: String,
    pub asset_type_id: Uuid,
    pub asset_type_name: String,
    pub asset_location: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    pub requires_customer_approval: bool,
    pub customer_approval_status: Option<CustomerApprovalStatus>,
    pub customer_approved_by: Option<Uuid>,
    pub customer_approved_at: Option<DateTime<Utc>>,
    pub customer_approval_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub category: AttachmentCategory,
    pub asset_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    pub asset_number: String,
    pub asset_type_id: Uuid,
    pub location: String,
    pub status: Option<AssetStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkOrder {
    pub asset_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub requires_customer_approval: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    #[serde(default)]
    pub category: AttachmentCategory,
    pub asset_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
}

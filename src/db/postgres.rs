use crate::db::{AssetInsert, PortalStore, StoreError, WorkOrderQuery};
use crate::domain::models::{
    Asset, AssetType, Attachment, CustomerApprovalStatus, NewWorkOrder, PmSchedule, PmSummary,
    Priority, ScheduleStatus, UserProfile, WorkOrder, WorkOrderStatus,
};
use crate::domain::work_order::WorkOrderUpdate;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str = r#"
    id, full_name, email, organization, role, password_hash, created_at
"#;

const ASSET_SELECT: &str = r#"
    SELECT
        a.id,
        a.asset_number,
        a.asset_type_id,
        t.name AS asset_type_name,
        a.location,
        a.status,
        a.created_at
    FROM assets a
    JOIN asset_types t ON t.id = a.asset_type_id
"#;

const SUMMARY_SELECT: &str = r#"
    SELECT
        s.id,
        s.asset_type_id,
        t.name AS asset_type_name,
        s.service_frequency,
        s.total_units_serviced,
        s.compliance_percentage,
        s.next_service_due,
        s.updated_at
    FROM pm_summary s
    JOIN asset_types t ON t.id = s.asset_type_id
"#;

const WORK_ORDER_SELECT: &str = r#"
    SELECT
        w.id,
        w.asset_id,
        a.asset_number,
        a.asset_type_id,
        t.name AS asset_type_name,
        a.location AS asset_location,
        w.title,
        w.description,
        w.priority,
        w.status,
        w.requires_customer_approval,
        w.customer_approval_status,
        w.customer_approved_by,
        w.customer_approved_at,
        w.customer_approval_notes,
        w.created_at,
        w.updated_at,
        w.completed_at
    FROM work_orders w
    JOIN assets a ON a.id = w.asset_id
    JOIN asset_types t ON t.id = a.asset_type_id
"#;

/// Unique violations become `StoreError::Duplicate` so callers can answer
/// with a conflict instead of a server error.
fn duplicate_or(err: sqlx::Error, what: impl FnOnce() -> String) -> anyhow::Error {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        StoreError::Duplicate(what()).into()
    } else {
        err.into()
    }
}

#[async_trait]
impl PortalStore for PgStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM user_profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM user_profiles WHERE lower(email) = lower($1)",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, full_name, email, organization, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.organization)
        .bind(profile.role)
        .bind(&profile.password_hash)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_asset_types(&self) -> Result<Vec<AssetType>> {
        let types = sqlx::query_as::<_, AssetType>("SELECT id, name FROM asset_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    async fn insert_asset_type(&self, name: &str) -> Result<AssetType> {
        let row = sqlx::query_as::<_, AssetType>(
            r#"
            INSERT INTO asset_types (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let assets = sqlx::query_as::<_, Asset>(&format!("{} ORDER BY a.asset_number", ASSET_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(assets)
    }

    async fn find_asset(&self, id: Uuid) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!("{} WHERE a.id = $1", ASSET_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(asset)
    }

    async fn insert_asset(&self, asset: &AssetInsert) -> Result<Asset> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO assets (id, asset_number, asset_type_id, location, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&asset.asset_number)
        .bind(asset.asset_type_id)
        .bind(&asset.location)
        .bind(asset.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_or(e, || format!("asset number {}", asset.asset_number)))?;

        sqlx::query(
            "UPDATE pm_summary SET total_units_serviced = total_units_serviced + 1 WHERE asset_type_id = $1",
        )
        .bind(asset.asset_type_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.find_asset(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("asset {} missing after insert", id))
    }

    async fn list_pm_summaries(&self) -> Result<Vec<PmSummary>> {
        let rows = sqlx::query_as::<_, PmSummary>(&format!("{} ORDER BY t.name", SUMMARY_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_pm_summary(&self, id: Uuid) -> Result<Option<PmSummary>> {
        let row = sqlx::query_as::<_, PmSummary>(&format!("{} WHERE s.id = $1", SUMMARY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_pm_summary(&self, summary: &PmSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pm_summary
                (id, asset_type_id, service_frequency, total_units_serviced,
                 compliance_percentage, next_service_due, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (asset_type_id) DO NOTHING
            "#,
        )
        .bind(summary.id)
        .bind(summary.asset_type_id)
        .bind(summary.service_frequency)
        .bind(summary.total_units_serviced)
        .bind(summary.compliance_percentage)
        .bind(summary.next_service_due)
        .bind(summary.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_pm_summary(&self, summary: &PmSummary) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE pm_summary
            SET service_frequency = $2,
                compliance_percentage = $3,
                next_service_due = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(summary.id)
        .bind(summary.service_frequency)
        .bind(summary.compliance_percentage)
        .bind(summary.next_service_due)
        .bind(summary.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_schedules(&self, year: i32) -> Result<Vec<PmSchedule>> {
        let rows = sqlx::query_as::<_, PmSchedule>(
            "SELECT id, asset_type_id, month, year, status, updated_at FROM pm_schedules WHERE year = $1",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_schedule(
        &self,
        asset_type_id: Uuid,
        month: i16,
        year: i32,
    ) -> Result<Option<PmSchedule>> {
        let row = sqlx::query_as::<_, PmSchedule>(
            r#"
            SELECT id, asset_type_id, month, year, status, updated_at
            FROM pm_schedules
            WHERE asset_type_id = $1 AND month = $2 AND year = $3
            "#,
        )
        .bind(asset_type_id)
        .bind(month)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_schedule(
        &self,
        asset_type_id: Uuid,
        month: i16,
        year: i32,
        status: ScheduleStatus,
    ) -> Result<PmSchedule> {
        let row = sqlx::query_as::<_, PmSchedule>(
            r#"
            INSERT INTO pm_schedules (id, asset_type_id, month, year, status, updated_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (asset_type_id, month, year)
            DO UPDATE SET status = EXCLUDED.status, updated_at = now()
            RETURNING id, asset_type_id, month, year, status, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(asset_type_id)
        .bind(month)
        .bind(year)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_work_orders(&self, query: WorkOrderQuery) -> Result<Vec<WorkOrder>> {
        let rows = sqlx::query_as::<_, WorkOrder>(&format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR w.asset_id = $1)
              AND ($2::work_order_status IS NULL OR w.status = $2)
              AND (NOT $3 OR (w.requires_customer_approval AND w.customer_approval_status = 'pending'))
            ORDER BY w.created_at DESC
            "#,
            WORK_ORDER_SELECT
        ))
        .bind(query.asset_id)
        .bind(query.status)
        .bind(query.awaiting_customer)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_work_order(&self, id: Uuid) -> Result<Option<WorkOrder>> {
        let row = sqlx::query_as::<_, WorkOrder>(&format!("{} WHERE w.id = $1", WORK_ORDER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_work_order(&self, order: &NewWorkOrder) -> Result<WorkOrder> {
        let id = Uuid::new_v4();
        let approval = order
            .requires_customer_approval
            .then_some(CustomerApprovalStatus::Pending);
        sqlx::query(
            r#"
            INSERT INTO work_orders
                (id, asset_id, title, description, priority, status,
                 requires_customer_approval, customer_approval_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(order.asset_id)
        .bind(&order.title)
        .bind(&order.description)
        .bind(order.priority.unwrap_or(Priority::Medium))
        .bind(WorkOrderStatus::PendingApproval)
        .bind(order.requires_customer_approval)
        .bind(approval)
        .execute(&self.pool)
        .await?;

        self.find_work_order(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("work order {} missing after insert", id))
    }

    async fn update_work_order(&self, id: Uuid, update: &WorkOrderUpdate) -> Result<()> {
        let approval = update.customer_approval.as_ref();
        sqlx::query(
            r#"
            UPDATE work_orders
            SET status = $2,
                updated_at = $3,
                completed_at = $4,
                customer_approval_status = COALESCE($5, customer_approval_status),
                customer_approved_by = COALESCE($6, customer_approved_by),
                customer_approved_at = COALESCE($7, customer_approved_at),
                customer_approval_notes = CASE WHEN $5 IS NULL THEN customer_approval_notes ELSE $8 END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(update.updated_at)
        .bind(update.completed_at)
        .bind(approval.map(|a| a.status))
        .bind(approval.map(|a| a.approved_by))
        .bind(approval.map(|a| a.approved_at))
        .bind(approval.and_then(|a| a.notes.clone()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_attachment(&self, attachment: &Attachment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attachments
                (id, file_name, file_path, file_type, file_size, category,
                 asset_id, work_order_id, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(attachment.id)
        .bind(&attachment.file_name)
        .bind(&attachment.file_path)
        .bind(&attachment.file_type)
        .bind(attachment.file_size)
        .bind(attachment.category)
        .bind(attachment.asset_id)
        .bind(attachment.work_order_id)
        .bind(attachment.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_attachments_for_asset(&self, asset_id: Uuid) -> Result<Vec<Attachment>> {
        let rows = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, file_name, file_path, file_type, file_size, category,
                   asset_id, work_order_id, uploaded_at
            FROM attachments
            WHERE asset_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

use crate::db::{PortalStore, WorkOrderQuery};
use crate::domain::capabilities::{Capabilities, SessionContext};
use crate::domain::models::{Asset, PmSchedule, PmSummary};
use crate::domain::pm_summary::{compliance_band, ComplianceBand, PmSummaryPatch};
use crate::domain::schedule::{self, AnnualSchedule};
use crate::domain::views::{self, AssetFilter, StatusCounts};
use crate::error::{PortalError, PortalResult};
use crate::services::require_edit;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SummaryRow {
    #[serde(flatten)]
    pub summary: PmSummary,
    pub pending_repairs: usize,
    pub compliance_band: ComplianceBand,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub capabilities: Capabilities,
    pub pm_summaries: Vec<SummaryRow>,
    pub due_within_30_days: usize,
    pub schedule: AnnualSchedule,
    pub work_order_counts: Vec<StatusCounts>,
    pub assets: Vec<Asset>,
}

pub async fn load(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    year: i32,
    filter: &AssetFilter,
    today: NaiveDate,
) -> PortalResult<Dashboard> {
    let (asset_types, summaries, assets, schedules, orders) = tokio::try_join!(
        store.list_asset_types(),
        store.list_pm_summaries(),
        store.list_assets(),
        store.list_schedules(year),
        store.list_work_orders(WorkOrderQuery::default()),
    )?;

    let pending = views::pending_repairs_by_type(&asset_types, &orders);
    let due_within_30_days = views::due_within_window(&summaries, today);
    let pm_summaries = summaries
        .into_iter()
        .map(|summary| SummaryRow {
            pending_repairs: pending.get(&summary.asset_type_id).copied().unwrap_or(0),
            compliance_band: compliance_band(summary.compliance_percentage),
            summary,
        })
        .collect();

    Ok(Dashboard {
        capabilities: ctx.capabilities,
        pm_summaries,
        due_within_30_days,
        schedule: schedule::annual_schedule(
            &asset_types,
            &schedules,
            year,
            ctx.capabilities.can_edit,
        ),
        work_order_counts: views::status_counts_by_type(&asset_types, &orders),
        assets: filter.apply(&assets).into_iter().cloned().collect(),
    })
}

/// Rejects the whole patch when any field is invalid; the stored row is
/// left as it was.
pub async fn update_summary(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    id: Uuid,
    patch: &PmSummaryPatch,
) -> PortalResult<PmSummary> {
    require_edit(ctx)?;
    patch.validate()?;

    let mut summary = store
        .find_pm_summary(id)
        .await?
        .ok_or(PortalError::NotFound("PM summary"))?;
    patch.apply_to(&mut summary)?;
    summary.updated_at = Utc::now();
    store.update_pm_summary(&summary).await?;

    tracing::info!("PM summary {} updated by {}", id, ctx.user_id);
    store
        .find_pm_summary(id)
        .await?
        .ok_or(PortalError::NotFound("PM summary"))
}

/// Advances one schedule cell by one step of the cycle.
pub async fn cycle_schedule(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    asset_type_id: Uuid,
    month: i16,
    year: i32,
) -> PortalResult<PmSchedule> {
    require_edit(ctx)?;
    if !schedule::is_valid_month(month) {
        return Err(PortalError::Validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if !store
        .list_asset_types()
        .await?
        .iter()
        .any(|t| t.id == asset_type_id)
    {
        return Err(PortalError::NotFound("asset type"));
    }

    let current = store
        .find_schedule(asset_type_id, month, year)
        .await?
        .map(|s| s.status)
        .unwrap_or_default();
    let next = current.next();
    let row = store.upsert_schedule(asset_type_id, month, year, next).await?;

    tracing::info!(
        "Schedule {}/{} for type {} moved {:?} -> {:?}",
        month,
        year,
        asset_type_id,
        current,
        next
    );
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NewWorkOrder, ScheduleStatus, UserRole};
    use crate::services::fixtures::{fleet, session};

    #[tokio::test]
    async fn cycling_from_empty_cell_follows_literal_order() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));

        let mut seen = Vec::new();
        for _ in 0..4 {
            let row = cycle_schedule(&f.store, &admin, f.forklift_type, 3, 2026)
                .await
                .unwrap();
            seen.push(row.status);
        }
        assert_eq!(
            seen,
            vec![
                ScheduleStatus::CustomerDelayed,
                ScheduleStatus::InProgress,
                ScheduleStatus::Completed,
                ScheduleStatus::Scheduled,
            ]
        );
        assert_eq!(f.store.list_schedules(2026).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn read_only_users_cannot_cycle_or_patch() {
        let f = fleet().await;
        for ctx in [session(Some(UserRole::Customer)), session(None)] {
            assert!(matches!(
                cycle_schedule(&f.store, &ctx, f.forklift_type, 3, 2026).await,
                Err(PortalError::Forbidden)
            ));
            let patch = PmSummaryPatch {
                compliance_percentage: Some(50.0),
                ..Default::default()
            };
            assert!(matches!(
                update_summary(&f.store, &ctx, f.summary, &patch).await,
                Err(PortalError::Forbidden)
            ));
        }
        assert!(f.store.list_schedules(2026).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_month_rejected() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        assert!(matches!(
            cycle_schedule(&f.store, &admin, f.forklift_type, 13, 2026).await,
            Err(PortalError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn out_of_range_compliance_keeps_stored_value() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        let patch = PmSummaryPatch {
            compliance_percentage: Some(120.0),
            ..Default::default()
        };
        assert!(matches!(
            update_summary(&f.store, &admin, f.summary, &patch).await,
            Err(PortalError::Validation(_))
        ));
        let stored = f.store.find_pm_summary(f.summary).await.unwrap().unwrap();
        assert_eq!(stored.compliance_percentage, 80.0);

        let patch = PmSummaryPatch {
            compliance_percentage: Some(97.5),
            ..Default::default()
        };
        let updated = update_summary(&f.store, &admin, f.summary, &patch).await.unwrap();
        assert_eq!(updated.compliance_percentage, 97.5);
    }

    #[tokio::test]
    async fn next_service_date_can_be_set_and_cleared() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        let due = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();

        let set = PmSummaryPatch {
            next_service_due: Some(Some(due)),
            ..Default::default()
        };
        let updated = update_summary(&f.store, &admin, f.summary, &set).await.unwrap();
        assert_eq!(updated.next_service_due, Some(due));

        let clear = PmSummaryPatch {
            next_service_due: Some(None),
            ..Default::default()
        };
        let updated = update_summary(&f.store, &admin, f.summary, &clear).await.unwrap();
        assert_eq!(updated.next_service_due, None);
        assert_eq!(updated.compliance_percentage, 80.0);
    }

    #[tokio::test]
    async fn non_admin_dashboard_is_read_only() {
        let f = fleet().await;
        f.store
            .insert_work_order(&NewWorkOrder {
                asset_id: f.forklift,
                title: "Brake inspection".to_string(),
                description: None,
                priority: None,
                requires_customer_approval: false,
            })
            .await
            .unwrap();

        let customer = session(Some(UserRole::Customer));
        let today = Utc::now().date_naive();
        let dash = load(&f.store, &customer, 2026, &AssetFilter::default(), today)
            .await
            .unwrap();

        assert!(!dash.schedule.editable);
        assert!(!dash.capabilities.can_edit);
        assert_eq!(dash.schedule.rows.len(), 2);
        let forklift = dash
            .pm_summaries
            .iter()
            .find(|r| r.summary.asset_type_id == f.forklift_type)
            .unwrap();
        assert_eq!(forklift.pending_repairs, 1);
        assert_eq!(forklift.compliance_band, ComplianceBand::Warning);

        let admin = session(Some(UserRole::Admin));
        let dash = load(&f.store, &admin, 2026, &AssetFilter::default(), today)
            .await
            .unwrap();
        assert!(dash.schedule.editable);
    }
}

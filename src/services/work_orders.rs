use crate::db::{PortalStore, WorkOrderQuery};
use crate::domain::capabilities::SessionContext;
use crate::domain::models::{NewWorkOrder, WorkOrder};
use crate::domain::views::WorkOrderFilter;
use crate::domain::work_order::{self, CustomerDecision, WorkOrderAction};
use crate::error::{PortalError, PortalResult};
use crate::services::{require_approver, require_edit};
use chrono::Utc;
use uuid::Uuid;

pub async fn list(store: &dyn PortalStore, filter: &WorkOrderFilter) -> PortalResult<Vec<WorkOrder>> {
    let orders = store.list_work_orders(WorkOrderQuery::default()).await?;
    Ok(filter.apply(&orders).into_iter().cloned().collect())
}

pub async fn create(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    new: &NewWorkOrder,
) -> PortalResult<WorkOrder> {
    require_edit(ctx)?;
    let title = new.title.trim();
    if title.is_empty() {
        return Err(PortalError::Validation("title is required".to_string()));
    }
    if store.find_asset(new.asset_id).await?.is_none() {
        return Err(PortalError::NotFound("asset"));
    }

    let new = NewWorkOrder {
        title: title.to_string(),
        description: new
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        ..new.clone()
    };
    let order = store.insert_work_order(&new).await?;
    tracing::info!(
        "Work order {} opened on asset {} by {}",
        order.id,
        order.asset_number,
        ctx.user_id
    );
    Ok(order)
}

async fn fetch(store: &dyn PortalStore, id: Uuid) -> PortalResult<WorkOrder> {
    store
        .find_work_order(id)
        .await?
        .ok_or(PortalError::NotFound("work order"))
}

/// Admin-driven move along the main status machine.
pub async fn transition(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    id: Uuid,
    action: WorkOrderAction,
) -> PortalResult<WorkOrder> {
    require_edit(ctx)?;
    let order = fetch(store, id).await?;
    let update = work_order::transition(&order, action, &ctx.capabilities, Utc::now())?;
    store.update_work_order(id, &update).await?;

    tracing::info!(
        "Work order {} {} -> {} by {}",
        id,
        order.status.as_str(),
        update.status.as_str(),
        ctx.user_id
    );
    fetch(store, id).await
}

pub async fn pending_approvals(store: &dyn PortalStore) -> PortalResult<Vec<WorkOrder>> {
    let orders = store
        .list_work_orders(WorkOrderQuery {
            awaiting_customer: true,
            ..Default::default()
        })
        .await?;
    Ok(orders)
}

pub async fn decide(
    store: &dyn PortalStore,
    ctx: &SessionContext,
    id: Uuid,
    decision: CustomerDecision,
    notes: Option<String>,
) -> PortalResult<WorkOrder> {
    require_approver(ctx)?;
    let order = fetch(store, id).await?;
    let update = work_order::decide_customer_approval(
        &order,
        decision,
        notes,
        ctx.user_id,
        &ctx.capabilities,
        Utc::now(),
    )?;
    store.update_work_order(id, &update).await?;

    tracing::info!("Work order {} customer decision {:?} by {}", id, decision, ctx.user_id);
    fetch(store, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CustomerApprovalStatus, Priority, UserRole, WorkOrderStatus};
    use crate::domain::work_order::WorkOrderAction;
    use crate::services::fixtures::{fleet, session};

    fn request(asset_id: Uuid, requires_approval: bool) -> NewWorkOrder {
        NewWorkOrder {
            asset_id,
            title: "  Replace mast chain ".to_string(),
            description: Some("   ".to_string()),
            priority: Some(Priority::Critical),
            requires_customer_approval: requires_approval,
        }
    }

    #[tokio::test]
    async fn admin_drives_order_to_completion() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        let order = create(&f.store, &admin, &request(f.forklift, false)).await.unwrap();
        assert_eq!(order.title, "Replace mast chain");
        assert_eq!(order.description, None);
        assert_eq!(order.status, WorkOrderStatus::PendingApproval);
        assert!(order.completed_at.is_none());

        let order = transition(&f.store, &admin, order.id, WorkOrderAction::Approve)
            .await
            .unwrap();
        assert_eq!(order.status, WorkOrderStatus::Approved);
        assert!(order.completed_at.is_none());

        let order = transition(&f.store, &admin, order.id, WorkOrderAction::Complete)
            .await
            .unwrap();
        assert_eq!(order.status, WorkOrderStatus::Completed);
        assert!(order.completed_at.is_some());

        assert!(matches!(
            transition(&f.store, &admin, order.id, WorkOrderAction::Decline).await,
            Err(PortalError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn customer_declines_with_notes() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        let customer = session(Some(UserRole::Customer));
        let order = create(&f.store, &admin, &request(f.forklift, true)).await.unwrap();

        let pending = pending_approvals(&f.store).await.unwrap();
        assert_eq!(pending.len(), 1);

        assert!(matches!(
            transition(&f.store, &customer, order.id, WorkOrderAction::Approve).await,
            Err(PortalError::Forbidden)
        ));

        let order = decide(
            &f.store,
            &customer,
            order.id,
            CustomerDecision::Declined,
            Some("wrong part".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(order.customer_approval_status, Some(CustomerApprovalStatus::Declined));
        assert_eq!(order.status, WorkOrderStatus::Declined);
        assert_eq!(order.customer_approval_notes.as_deref(), Some("wrong part"));
        assert!(order.customer_approved_at.is_some());
        assert_eq!(order.customer_approved_by, Some(customer.user_id));
        assert!(order.completed_at.is_none());
        assert!(pending_approvals(&f.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flagged_order_waits_for_customer_before_admin_moves() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        let customer = session(Some(UserRole::Customer));
        let order = create(&f.store, &admin, &request(f.forklift, true)).await.unwrap();

        for action in [WorkOrderAction::Approve, WorkOrderAction::Complete] {
            assert!(matches!(
                transition(&f.store, &admin, order.id, action).await,
                Err(PortalError::Conflict(_))
            ));
        }
        let unchanged = fetch(&f.store, order.id).await.unwrap();
        assert_eq!(unchanged.status, WorkOrderStatus::PendingApproval);
        assert_eq!(unchanged.customer_approval_status, Some(CustomerApprovalStatus::Pending));

        let order = decide(&f.store, &customer, order.id, CustomerDecision::Approved, None)
            .await
            .unwrap();
        assert_eq!(order.status, WorkOrderStatus::Approved);
        assert!(pending_approvals(&f.store).await.unwrap().is_empty());

        let order = transition(&f.store, &admin, order.id, WorkOrderAction::Complete)
            .await
            .unwrap();
        assert_eq!(order.status, WorkOrderStatus::Completed);
        assert_eq!(order.customer_approval_status, Some(CustomerApprovalStatus::Approved));
        assert!(pending_approvals(&f.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_without_profile_cannot_decide() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        let order = create(&f.store, &admin, &request(f.forklift, true)).await.unwrap();
        assert!(matches!(
            decide(&f.store, &session(None), order.id, CustomerDecision::Approved, None).await,
            Err(PortalError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let f = fleet().await;
        let admin = session(Some(UserRole::Admin));
        create(&f.store, &admin, &request(f.forklift, false)).await.unwrap();

        let hits = list(
            &f.store,
            &WorkOrderFilter {
                search: Some("MAST".to_string()),
                status: Some(WorkOrderStatus::PendingApproval),
                priority: Some(Priority::Critical),
            },
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = list(
            &f.store,
            &WorkOrderFilter {
                priority: Some(Priority::Low),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(misses.is_empty());
    }
}

use crate::domain::capabilities::Capabilities;
use crate::domain::models::{CustomerApprovalStatus, WorkOrder, WorkOrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Admin actions on the main status machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderAction {
    Approve,
    Decline,
    Complete,
}

impl WorkOrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderAction::Approve => "approve",
            WorkOrderAction::Decline => "decline",
            WorkOrderAction::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustomerDecision {
    Approved,
    Declined,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} a work order in status {from}")]
    Invalid { from: &'static str, action: &'static str },
    #[error("work order does not require customer approval")]
    ApprovalNotRequired,
    #[error("customer approval already recorded")]
    AlreadyDecided,
    #[error("work order is awaiting customer approval")]
    AwaitingCustomer,
    #[error("not permitted")]
    Forbidden,
}

/// Field changes produced by a transition, applied by the store as one update.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderUpdate {
    pub status: WorkOrderStatus,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub customer_approval: Option<CustomerApprovalRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerApprovalRecord {
    pub status: CustomerApprovalStatus,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub notes: Option<String>,
}

pub fn next_status(
    from: WorkOrderStatus,
    action: WorkOrderAction,
) -> Result<WorkOrderStatus, TransitionError> {
    use WorkOrderAction::*;
    use WorkOrderStatus::*;
    if from.is_terminal() {
        return Err(TransitionError::Invalid {
            from: from.as_str(),
            action: action.as_str(),
        });
    }
    match (from, action) {
        (PendingApproval, Approve) => Ok(Approved),
        (PendingApproval, Decline) => Ok(Declined),
        (Approved, Complete) => Ok(Completed),
        _ => Err(TransitionError::Invalid {
            from: from.as_str(),
            action: action.as_str(),
        }),
    }
}

pub fn transition(
    order: &WorkOrder,
    action: WorkOrderAction,
    caps: &Capabilities,
    now: DateTime<Utc>,
) -> Result<WorkOrderUpdate, TransitionError> {
    if !caps.is_admin {
        return Err(TransitionError::Forbidden);
    }
    // A flagged order leaves Pending Approval only through the customer decision.
    if order.awaiting_customer() {
        return Err(TransitionError::AwaitingCustomer);
    }
    let status = next_status(order.status, action)?;
    Ok(WorkOrderUpdate {
        status,
        updated_at: now,
        completed_at: (status == WorkOrderStatus::Completed).then_some(now),
        customer_approval: None,
    })
}

/// Customer sign-off. Mirrors the decision into the main status.
pub fn decide_customer_approval(
    order: &WorkOrder,
    decision: CustomerDecision,
    notes: Option<String>,
    approver: Uuid,
    caps: &Capabilities,
    now: DateTime<Utc>,
) -> Result<WorkOrderUpdate, TransitionError> {
    if !caps.can_approve_repairs {
        return Err(TransitionError::Forbidden);
    }
    if !order.requires_customer_approval {
        return Err(TransitionError::ApprovalNotRequired);
    }
    if order.customer_approval_status != Some(CustomerApprovalStatus::Pending) {
        return Err(TransitionError::AlreadyDecided);
    }
    let (sub_status, action) = match decision {
        CustomerDecision::Approved => (CustomerApprovalStatus::Approved, WorkOrderAction::Approve),
        CustomerDecision::Declined => (CustomerApprovalStatus::Declined, WorkOrderAction::Decline),
    };
    let status = next_status(order.status, action)?;
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    Ok(WorkOrderUpdate {
        status,
        updated_at: now,
        completed_at: None,
        customer_approval: Some(CustomerApprovalRecord {
            status: sub_status,
            approved_by: approver,
            approved_at: now,
            notes,
        }),
    })
}

impl WorkOrder {
    pub fn apply(&mut self, update: &WorkOrderUpdate) {
        self.status = update.status;
        self.updated_at = update.updated_at;
        self.completed_at = update.completed_at;
        if let Some(record) = &update.customer_approval {
            self.customer_approval_status = Some(record.status);
            self.customer_approved_by = Some(record.approved_by);
            self.customer_approved_at = Some(record.approved_at);
            self.customer_approval_notes = record.notes.clone();
        }
    }

    pub fn awaiting_customer(&self) -> bool {
        self.requires_customer_approval
            && self.customer_approval_status == Some(CustomerApprovalStatus::Pending)
    }
}

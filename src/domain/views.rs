//! Read-side projections over fetched snapshots. Everything here is recomputed
//! from scratch on every request.

use crate::domain::models::{
    Asset, AssetStatus, AssetType, PmSummary, Priority, WorkOrder, WorkOrderStatus,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const DUE_SOON_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    pub search: Option<String>,
    /// Asset type name.
    pub asset_type: Option<String>,
    pub status: Option<AssetStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    pub search: Option<String>,
    pub status: Option<WorkOrderStatus>,
    pub priority: Option<Priority>,
}

fn normalized_search(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        let matches_search = match normalized_search(&self.search) {
            Some(needle) => {
                contains_ci(&asset.asset_number, &needle)
                    || contains_ci(&asset.location, &needle)
                    || contains_ci(&asset.asset_type_name, &needle)
            }
            None => true,
        };
        let matches_type = self
            .asset_type
            .as_deref()
            .map_or(true, |name| asset.asset_type_name == name);
        let matches_status = self.status.map_or(true, |s| asset.status == s);
        matches_search && matches_type && matches_status
    }

    pub fn apply<'a>(&self, assets: &'a [Asset]) -> Vec<&'a Asset> {
        assets.iter().filter(|a| self.matches(a)).collect()
    }
}

impl WorkOrderFilter {
    pub fn matches(&self, order: &WorkOrder) -> bool {
        let matches_search = match normalized_search(&self.search) {
            Some(needle) => {
                contains_ci(&order.title, &needle)
                    || contains_ci(&order.asset_number, &needle)
                    || order
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ci(d, &needle))
            }
            None => true,
        };
        let matches_status = self.status.map_or(true, |s| order.status == s);
        let matches_priority = self.priority.map_or(true, |p| order.priority == p);
        matches_search && matches_status && matches_priority
    }

    pub fn apply<'a>(&self, orders: &'a [WorkOrder]) -> Vec<&'a WorkOrder> {
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}

pub fn count_with(orders: &[WorkOrder], status: WorkOrderStatus, asset_type_id: Uuid) -> usize {
    orders
        .iter()
        .filter(|o| o.status == status && o.asset_type_id == asset_type_id)
        .count()
}

/// Pending-approval work orders per asset type; every type gets an entry.
pub fn pending_repairs_by_type(
    asset_types: &[AssetType],
    orders: &[WorkOrder],
) -> HashMap<Uuid, usize> {
    asset_types
        .iter()
        .map(|t| (t.id, count_with(orders, WorkOrderStatus::PendingApproval, t.id)))
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub asset_type_id: Uuid,
    pub asset_type_name: String,
    pub pending_approval: usize,
    pub approved: usize,
    pub completed: usize,
    pub declined: usize,
}

/// Raw per-status counts per asset type. Which statuses count as "open" is
/// left to the client.
pub fn status_counts_by_type(asset_types: &[AssetType], orders: &[WorkOrder]) -> Vec<StatusCounts> {
    asset_types
        .iter()
        .map(|t| StatusCounts {
            asset_type_id: t.id,
            asset_type_name: t.name.clone(),
            pending_approval: count_with(orders, WorkOrderStatus::PendingApproval, t.id),
            approved: count_with(orders, WorkOrderStatus::Approved, t.id),
            completed: count_with(orders, WorkOrderStatus::Completed, t.id),
            declined: count_with(orders, WorkOrderStatus::Declined, t.id),
        })
        .collect()
}

/// Summaries whose next service falls in `[today, today + 30 days]`.
pub fn due_within_window(summaries: &[PmSummary], today: NaiveDate) -> usize {
    summaries
        .iter()
        .filter_map(|s| s.next_service_due)
        .filter(|due| {
            let days = (*due - today).num_days();
            (0..=DUE_SOON_DAYS).contains(&days)
        })
        .count()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AssetWorkSummary {
    pub total: usize,
    pub completed: usize,
    pub pending_approval: usize,
}

pub fn asset_work_summary(orders: &[WorkOrder]) -> AssetWorkSummary {
    AssetWorkSummary {
        total: orders.len(),
        completed: orders
            .iter()
            .filter(|o| o.status == WorkOrderStatus::Completed)
            .count(),
        pending_approval: orders
            .iter()
            .filter(|o| o.status == WorkOrderStatus::PendingApproval)
            .count(),
    }
}

// src/domains/record/projector.rs
//
// Stateless derivations over a record collection. Every function takes the
// records and explicit filter parameters and is fully re-derivable on each
// call; nothing here holds state.

use crate::domains::record::types::{MaintenanceRecord, MaintenanceStatus, ServiceType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Combined filter parameters for the report search. All supplied criteria
/// are AND-combined; absent criteria pass everything through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportCriteria {
    pub search_text: Option<String>,
    pub municipality_id: Option<String>,
    pub service_type: Option<ServiceType>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

/// Tab counters shown on the dashboard header. Always computed over the full
/// collection: the active municipality filter never narrows these numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub pending: usize,
    pub completed: usize,
}

/// Status partition used by the municipality drill-down view.
#[derive(Debug, Default)]
pub struct StatusPartition<'a> {
    pub pending: Vec<&'a MaintenanceRecord>,
    pub completed: Vec<&'a MaintenanceRecord>,
}

/// Aggregates for the operational status panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub completion_percent: f64,
}

/// Records on the active dashboard tab: status must match, and when a
/// municipality filter is set the record must belong to it.
pub fn by_status_and_municipality<'a>(
    records: &'a [MaintenanceRecord],
    status: MaintenanceStatus,
    municipality_id: Option<&str>,
) -> Vec<&'a MaintenanceRecord> {
    records
        .iter()
        .filter(|r| r.status == status)
        .filter(|r| municipality_id.map_or(true, |m| r.municipality_id == m))
        .collect()
}

/// Pending/completed counts over the whole collection.
pub fn tab_counts(records: &[MaintenanceRecord]) -> TabCounts {
    let pending = records
        .iter()
        .filter(|r| r.status == MaintenanceStatus::Pending)
        .count();
    TabCounts {
        pending,
        completed: records.len() - pending,
    }
}

/// Partition of one municipality's records by status, preserving order.
pub fn by_municipality_grouped<'a>(
    records: &'a [MaintenanceRecord],
    municipality_id: &str,
) -> StatusPartition<'a> {
    let mut partition = StatusPartition::default();
    for record in records.iter().filter(|r| r.municipality_id == municipality_id) {
        match record.status {
            MaintenanceStatus::Pending => partition.pending.push(record),
            MaintenanceStatus::Completed => partition.completed.push(record),
        }
    }
    partition
}

/// Records matching the combined report criteria, preserving order.
pub fn by_report_criteria<'a>(
    records: &'a [MaintenanceRecord],
    criteria: &ReportCriteria,
) -> Vec<&'a MaintenanceRecord> {
    records
        .iter()
        .filter(|r| matches_criteria(r, criteria))
        .collect()
}

fn matches_criteria(record: &MaintenanceRecord, criteria: &ReportCriteria) -> bool {
    if let Some(text) = &criteria.search_text {
        let needle = text.to_lowercase();
        if !needle.is_empty() && !contains_text(record, &needle) {
            return false;
        }
    }
    if let Some(municipality_id) = &criteria.municipality_id {
        if &record.municipality_id != municipality_id {
            return false;
        }
    }
    if let Some(service_type) = criteria.service_type {
        if record.title.service_type() != Some(service_type) {
            return false;
        }
    }
    if let Some(start) = criteria.date_start {
        if record.date < start {
            return false;
        }
    }
    if let Some(end) = criteria.date_end {
        if record.date > end {
            return false;
        }
    }
    true
}

/// Case-insensitive substring match over technician, title and description;
/// any one field containing the needle is a match.
fn contains_text(record: &MaintenanceRecord, needle: &str) -> bool {
    record.technician.to_lowercase().contains(needle)
        || record.display_title().to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
}

/// Totals for the operational status panel.
pub fn dashboard_stats(records: &[MaintenanceRecord]) -> DashboardStats {
    let counts = tab_counts(records);
    let completion_percent = if records.is_empty() {
        0.0
    } else {
        counts.completed as f64 / records.len() as f64 * 100.0
    };
    DashboardStats {
        total: records.len(),
        pending: counts.pending,
        completed: counts.completed,
        completion_percent,
    }
}

/// The first `n` records in repository order, for the report-archive listing.
pub fn recent(records: &[MaintenanceRecord], n: usize) -> &[MaintenanceRecord] {
    &records[..records.len().min(n)]
}

//! # Attendance Commands
//!
//! ## Marking
//! ```text
//! date 2025-03-14, entries [Asha: present, Ravi: absent, Asha: half-day]
//!      │
//!      ▼  one entry per employee (last one wins)
//! [Asha: half-day, Ravi: absent]
//!      │
//!      ▼  one transaction, upsert on (shop, employee, date)
//! existing row updated, otherwise created
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use shopdesk_core::validation::{normalize_optional, parse_date, validate_required};
use shopdesk_core::{AttendanceRecord, AttendanceStatus, UNKNOWN_EMPLOYEE};
use shopdesk_db::repository::attendance::AttendanceMark;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDto {
    pub id: String,
    pub employee_id: String,
    /// "Unknown Employee" when the employee record is gone.
    pub employee_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceDto {
    fn new(record: AttendanceRecord, names: &HashMap<String, String>) -> Self {
        AttendanceDto {
            employee_name: names
                .get(&record.employee_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string()),
            id: record.id,
            employee_id: record.employee_id,
            date: record.date,
            status: record.status,
            check_in: record.check_in,
            check_out: record.check_out,
            notes: record.notes,
            updated_at: record.updated_at,
        }
    }
}

/// One row of the attendance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub employee_id: String,
    /// Defaults to present.
    pub status: Option<AttendanceStatus>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
}

async fn employee_names(state: &AppState) -> ApiResult<HashMap<String, String>> {
    Ok(state
        .db()
        .employees()
        .list_by_shop(state.shop_id())
        .await?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect())
}

fn resolve_date(state: &AppState, date: Option<&str>) -> ApiResult<NaiveDate> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Ok(parse_date("date", raw)?),
        None => Ok(state.analytics().today()),
    }
}

/// Saves the attendance sheet for `date` (today when `None`).
pub async fn mark_attendance(
    state: &AppState,
    date: Option<&str>,
    entries: Vec<AttendanceEntry>,
) -> ApiResult<Vec<AttendanceDto>> {
    let date = resolve_date(state, date)?;
    let names = employee_names(state).await?;

    let mut sheet: Vec<AttendanceEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let employee_id = validate_required("employee", &entry.employee_id)?;
        if !names.contains_key(&employee_id) {
            return Err(ApiError::not_found("Employee", &employee_id));
        }
        let entry = AttendanceEntry { employee_id, ..entry };
        match sheet.iter_mut().find(|e| e.employee_id == entry.employee_id) {
            Some(existing) => *existing = entry,
            None => sheet.push(entry),
        }
    }

    let marks: Vec<AttendanceMark> = sheet
        .into_iter()
        .map(|entry| AttendanceMark {
            check_in: normalize_optional(entry.check_in),
            check_out: normalize_optional(entry.check_out),
            notes: normalize_optional(entry.notes),
            ..AttendanceMark::new(entry.employee_id, date, entry.status.unwrap_or_default())
        })
        .collect();
    debug!(date = %date, marks = marks.len(), "Saving attendance sheet");

    let saved: Vec<AttendanceDto> = state
        .db()
        .attendance()
        .upsert_sheet(state.shop_id(), &marks)
        .await?
        .into_iter()
        .map(|record| AttendanceDto::new(record, &names))
        .collect();

    info!(date = %date, count = saved.len(), "Attendance marked");
    Ok(saved)
}

/// Attendance for `date` (today when `None`), optionally one employee.
pub async fn list_attendance(
    state: &AppState,
    date: Option<&str>,
    employee_id: Option<&str>,
) -> ApiResult<Vec<AttendanceDto>> {
    let date = resolve_date(state, date)?;
    let names = employee_names(state).await?;

    let records = state
        .db()
        .attendance()
        .list_by_date(state.shop_id(), date, employee_id)
        .await?;

    Ok(records
        .into_iter()
        .map(|r| AttendanceDto::new(r, &names))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::employee::{add_employee, delete_employee, EmployeeForm};
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    async fn employee(state: &AppState, name: &str) -> String {
        add_employee(
            state,
            EmployeeForm {
                name: name.into(),
                position: "Cashier".into(),
                contact: "555-0101".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    fn entry(employee_id: &str, status: Option<AttendanceStatus>) -> AttendanceEntry {
        AttendanceEntry {
            employee_id: employee_id.to_string(),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mark_dedupes_and_defaults_to_present() {
        let state = test_support::state().await;
        let asha = employee(&state, "Asha").await;
        let ravi = employee(&state, "Ravi").await;

        let saved = mark_attendance(
            &state,
            Some("2025-03-14"),
            vec![
                entry(&asha, None),
                entry(&ravi, Some(AttendanceStatus::Absent)),
                entry(&asha, Some(AttendanceStatus::HalfDay)),
            ],
        )
        .await
        .unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].employee_name, "Asha");
        assert_eq!(saved[0].status, AttendanceStatus::HalfDay);

        let defaulted = mark_attendance(&state, Some("2025-03-15"), vec![entry(&ravi, None)])
            .await
            .unwrap();
        assert_eq!(defaulted[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_remark_updates_existing_row() {
        let state = test_support::state().await;
        let asha = employee(&state, "Asha").await;

        let first = mark_attendance(&state, Some("2025-03-14"), vec![entry(&asha, None)])
            .await
            .unwrap();
        let second = mark_attendance(
            &state,
            Some("2025-03-14"),
            vec![entry(&asha, Some(AttendanceStatus::Leave))],
        )
        .await
        .unwrap();

        assert_eq!(first[0].id, second[0].id);
        let listed = list_attendance(&state, Some("2025-03-14"), None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, AttendanceStatus::Leave);
    }

    #[tokio::test]
    async fn test_unknown_employee_rejected() {
        let state = test_support::state().await;
        let err = mark_attendance(&state, None, vec![entry("ghost", None)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_filters_by_employee() {
        let state = test_support::state().await;
        let asha = employee(&state, "Asha").await;
        let ravi = employee(&state, "Ravi").await;
        mark_attendance(&state, None, vec![entry(&asha, None), entry(&ravi, None)])
            .await
            .unwrap();

        let today_all = list_attendance(&state, None, None).await.unwrap();
        assert_eq!(today_all.len(), 2);

        let only_ravi = list_attendance(&state, None, Some(&ravi)).await.unwrap();
        assert_eq!(only_ravi.len(), 1);
        assert_eq!(only_ravi[0].employee_name, "Ravi");

        // History outlives the employee
        delete_employee(&state, &ravi).await.unwrap();
        let after_delete = list_attendance(&state, None, Some(&ravi)).await.unwrap();
        assert_eq!(after_delete.len(), 1);
        assert_eq!(after_delete[0].employee_name, UNKNOWN_EMPLOYEE);
        assert_eq!(list_attendance(&state, None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_orphan_row_reads_as_unknown_employee() {
        let state = test_support::state().await;
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        state
            .db()
            .attendance()
            .upsert(
                state.shop_id(),
                &AttendanceMark::new("gone", date, AttendanceStatus::Present),
            )
            .await
            .unwrap();

        let listed = list_attendance(&state, Some("2025-03-14"), None).await.unwrap();
        assert_eq!(listed[0].employee_name, UNKNOWN_EMPLOYEE);
    }
}

//! # Dashboard Command
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────┬────────────────────────┐
//! │ Receipts     │ Recent receipts  │ Employees    │ Today's attendance     │
//! │ count        │ newest N (5)     │ count        │ present / absent / all │
//! └──────────────┴──────────────────┴──────────────┴────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use shopdesk_core::AttendanceSummary;

use super::receipt::ReceiptDto;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub receipt_count: i64,
    pub recent_receipts: Vec<ReceiptDto>,
    pub employee_count: i64,
    /// Half days count as present, leave as absent.
    pub attendance_today: AttendanceSummary,
}

pub async fn dashboard(state: &AppState) -> ApiResult<DashboardDto> {
    let shop_id = state.shop_id();
    let db = state.db();
    let today = state.analytics().today();
    debug!(shop_id = %shop_id, %today, "dashboard command");

    let receipt_count = db.receipts().count_by_shop(shop_id).await?;
    let recent = db
        .receipts()
        .recent(shop_id, state.config().reports.recent_receipts)
        .await?;
    let employee_count = db.employees().count_by_shop(shop_id).await?;
    let attendance = db.attendance().list_by_date(shop_id, today, None).await?;

    Ok(DashboardDto {
        receipt_count,
        recent_receipts: recent.into_iter().map(ReceiptDto::from).collect(),
        employee_count,
        attendance_today: AttendanceSummary::tally(&attendance),
    })
}

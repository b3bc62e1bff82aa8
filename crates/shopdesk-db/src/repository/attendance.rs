//! # Attendance Repository
//!
//! One attendance row per (shop, employee, date). Marking the same
//! employee twice on a date updates the existing row.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{generate_id, ts};
use crate::error::{DbError, DbResult};
use shopdesk_core::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: String,
    shop_id: String,
    employee_id: String,
    date: NaiveDate,
    status: AttendanceStatus,
    check_in: Option<String>,
    check_out: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: row.id,
            shop_id: row.shop_id,
            employee_id: row.employee_id,
            date: row.date,
            status: row.status,
            check_in: row.check_in,
            check_out: row.check_out,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One employee's mark for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceMark {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Free-form time text, e.g. `09:05`.
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
}

impl AttendanceMark {
    /// A mark with no times or notes.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        AttendanceMark {
            employee_id: employee_id.into(),
            date,
            status,
            check_in: None,
            check_out: None,
            notes: None,
        }
    }
}

/// Repository for attendance database operations.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AttendanceRepository { pool }
    }

    /// Creates the (employee, date) row or updates the existing one.
    ///
    /// The row keeps its original `id` and `created_at` on update.
    ///
    /// ## Returns
    /// The record as stored.
    pub async fn upsert(&self, shop_id: &str, mark: &AttendanceMark) -> DbResult<AttendanceRecord> {
        let mut conn = self.pool.acquire().await?;
        upsert_on(&mut conn, shop_id, mark).await
    }

    /// Saves a whole day's sheet. Either every mark is stored or none is.
    pub async fn upsert_sheet(
        &self,
        shop_id: &str,
        marks: &[AttendanceMark],
    ) -> DbResult<Vec<AttendanceRecord>> {
        let mut tx = self.pool.begin().await?;

        let mut records = Vec::with_capacity(marks.len());
        for mark in marks {
            records.push(upsert_on(&mut tx, shop_id, mark).await?);
        }

        tx.commit().await?;
        debug!(shop_id = %shop_id, count = records.len(), "Attendance sheet saved");
        Ok(records)
    }

    /// Records for one date, optionally for a single employee.
    pub async fn list_by_date(
        &self,
        shop_id: &str,
        date: NaiveDate,
        employee_id: Option<&str>,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, shop_id, employee_id, date, status,
                   check_in, check_out, notes, created_at, updated_at
            FROM attendance
            WHERE shop_id = ?1 AND date = ?2
              AND (?3 IS NULL OR employee_id = ?3)
            ORDER BY created_at, id
            "#,
        )
        .bind(shop_id)
        .bind(date)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    /// All records of a shop, newest date first.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, shop_id, employee_id, date, status,
                   check_in, check_out, notes, created_at, updated_at
            FROM attendance
            WHERE shop_id = ?1
            ORDER BY date DESC, created_at
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}

async fn upsert_on(
    conn: &mut SqliteConnection,
    shop_id: &str,
    mark: &AttendanceMark,
) -> DbResult<AttendanceRecord> {
    debug!(
        shop_id = %shop_id,
        employee_id = %mark.employee_id,
        date = %mark.date,
        status = %mark.status,
        "Marking attendance"
    );

    let now = ts(&Utc::now());
    sqlx::query(
        r#"
        INSERT INTO attendance (
            id, shop_id, employee_id, date, status,
            check_in, check_out, notes, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        ON CONFLICT (shop_id, employee_id, date) DO UPDATE SET
            status = excluded.status,
            check_in = excluded.check_in,
            check_out = excluded.check_out,
            notes = excluded.notes,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(generate_id())
    .bind(shop_id)
    .bind(&mark.employee_id)
    .bind(mark.date)
    .bind(mark.status)
    .bind(&mark.check_in)
    .bind(&mark.check_out)
    .bind(&mark.notes)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT id, shop_id, employee_id, date, status,
               check_in, check_out, notes, created_at, updated_at
        FROM attendance
        WHERE shop_id = ?1 AND employee_id = ?2 AND date = ?3
        "#,
    )
    .bind(shop_id)
    .bind(&mark.employee_id)
    .bind(mark.date)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(AttendanceRecord::from)
        .ok_or_else(|| DbError::not_found("Attendance", &mark.employee_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::{AttendanceMark, AttendanceRepository};
    use crate::{migrations, Database, DbConfig};
    use sqlx::sqlite::SqlitePoolOptions;
    use chrono::NaiveDate;
    use shopdesk_core::AttendanceStatus;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.attendance();

        let first = repo
            .upsert("shop-1", &AttendanceMark::new("emp-1", date(14), AttendanceStatus::Present))
            .await
            .unwrap();

        let mut late = AttendanceMark::new("emp-1", date(14), AttendanceStatus::HalfDay);
        late.check_in = Some("13:00".to_string());
        let second = repo.upsert("shop-1", &late).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.status, AttendanceStatus::HalfDay);
        assert_eq!(second.check_in.as_deref(), Some("13:00"));
        assert_eq!(repo.list_by_shop("shop-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_date_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.attendance();

        for (employee, day, status) in [
            ("emp-1", 14, AttendanceStatus::Present),
            ("emp-2", 14, AttendanceStatus::Leave),
            ("emp-1", 15, AttendanceStatus::Absent),
        ] {
            repo.upsert("shop-1", &AttendanceMark::new(employee, date(day), status))
                .await
                .unwrap();
        }
        repo.upsert("shop-2", &AttendanceMark::new("emp-9", date(14), AttendanceStatus::Present))
            .await
            .unwrap();

        assert_eq!(repo.list_by_date("shop-1", date(14), None).await.unwrap().len(), 2);

        let one = repo.list_by_date("shop-1", date(14), Some("emp-2")).await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].status, AttendanceStatus::Leave);

        let all = repo.list_by_shop("shop-1").await.unwrap();
        assert_eq!(all[0].date, date(15));
    }

    #[tokio::test]
    async fn test_sheet_is_saved_together() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.attendance();

        let sheet = vec![
            AttendanceMark::new("emp-1", date(14), AttendanceStatus::Present),
            AttendanceMark::new("emp-2", date(14), AttendanceStatus::Absent),
        ];
        let saved = repo.upsert_sheet("shop-1", &sheet).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].status, AttendanceStatus::Absent);
        assert_eq!(repo.list_by_date("shop-1", date(14), None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_sheet_leaves_day_untouched() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_emp_3 BEFORE INSERT ON attendance \
             WHEN NEW.employee_id = 'emp-3' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(&pool)
        .await
        .unwrap();
        let repo = AttendanceRepository::new(pool);

        let sheet = vec![
            AttendanceMark::new("emp-1", date(14), AttendanceStatus::Present),
            AttendanceMark::new("emp-3", date(14), AttendanceStatus::Present),
        ];
        assert!(repo.upsert_sheet("shop-1", &sheet).await.is_err());
        assert!(repo.list_by_date("shop-1", date(14), None).await.unwrap().is_empty());
    }
}

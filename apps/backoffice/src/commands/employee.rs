//! # Employee Commands

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use shopdesk_core::validation::{normalize_optional, parse_date, validate_name, validate_non_negative, validate_required};
use shopdesk_core::Employee;
use shopdesk_db::repository::employee::NewEmployee;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: String,
    pub name: String,
    pub position: String,
    pub contact: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub salary_cents: i64,
    pub joining_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        EmployeeDto {
            id: e.id,
            name: e.name,
            position: e.position,
            contact: e.contact,
            email: e.email,
            address: e.address,
            salary_cents: e.salary_cents,
            joining_date: e.joining_date,
            created_at: e.created_at,
        }
    }
}

/// The add-employee form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    pub name: String,
    pub position: String,
    pub contact: String,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Defaults to 0.
    pub salary_cents: Option<i64>,
    /// `YYYY-MM-DD`; defaults to today in the shop's offset.
    pub joining_date: Option<String>,
}

/// Adds an employee.
///
/// ## Rules
/// - name, position and contact are required
/// - salary must not be negative
pub async fn add_employee(state: &AppState, form: EmployeeForm) -> ApiResult<EmployeeDto> {
    let salary_cents = form.salary_cents.unwrap_or(0);
    validate_non_negative("salary", salary_cents)?;

    let joining_date = match normalize_optional(form.joining_date) {
        Some(raw) => parse_date("joining date", &raw)?,
        None => state.analytics().today(),
    };

    let employee = NewEmployee {
        name: validate_name("name", &form.name)?,
        position: validate_required("position", &form.position)?,
        contact: validate_required("contact", &form.contact)?,
        email: normalize_optional(form.email),
        address: normalize_optional(form.address),
        salary_cents,
        joining_date,
    };

    let created = state.db().employees().insert(state.shop_id(), &employee).await?;
    info!(id = %created.id, name = %created.name, "Employee added");
    Ok(EmployeeDto::from(created))
}

/// Employees of the shop, by name.
pub async fn list_employees(state: &AppState) -> ApiResult<Vec<EmployeeDto>> {
    let employees = state.db().employees().list_by_shop(state.shop_id()).await?;
    Ok(employees.into_iter().map(EmployeeDto::from).collect())
}

/// Deletes an employee. Attendance already marked for them is kept.
pub async fn delete_employee(state: &AppState, id: &str) -> ApiResult<()> {
    state.db().employees().delete(state.shop_id(), id).await?;
    info!(id = %id, "Employee deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    fn form(name: &str) -> EmployeeForm {
        EmployeeForm {
            name: name.to_string(),
            position: "Cashier".to_string(),
            contact: "555-0101".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_defaults() {
        let state = test_support::state().await;
        let employee = add_employee(&state, form("Asha")).await.unwrap();
        assert_eq!(employee.salary_cents, 0);
        assert_eq!(employee.joining_date, state.analytics().today());
        assert_eq!(employee.email, None);
    }

    #[tokio::test]
    async fn test_required_fields() {
        let state = test_support::state().await;

        let mut missing_position = form("Asha");
        missing_position.position = " ".into();
        let err = add_employee(&state, missing_position).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "position is required");

        let mut bad_date = form("Asha");
        bad_date.joining_date = Some("March 3".into());
        assert!(add_employee(&state, bad_date).await.is_err());

        let mut negative = form("Asha");
        negative.salary_cents = Some(-5);
        assert!(add_employee(&state, negative).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let state = test_support::state().await;
        let ravi = add_employee(&state, form("Ravi")).await.unwrap();
        let mut asha = form("Asha");
        asha.joining_date = Some("2024-06-01".into());
        asha.salary_cents = Some(250_000);
        add_employee(&state, asha).await.unwrap();

        let names: Vec<String> = list_employees(&state).await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Asha", "Ravi"]);

        delete_employee(&state, &ravi.id).await.unwrap();
        assert_eq!(list_employees(&state).await.unwrap().len(), 1);

        let err = delete_employee(&state, &ravi.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

//! # Settings Commands
//!
//! The shop profile: name, address, phone numbers and the cashier and
//! manager names offered on the receipt form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use shopdesk_core::validation::{validate_name, validate_phone_numbers, validate_unique_list};
use shopdesk_core::ShopProfile;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDto {
    pub shop_name: String,
    pub address: String,
    pub phone_numbers: Vec<String>,
    pub cashier_names: Vec<String>,
    pub manager_names: Vec<String>,
    /// `None` until the profile is first saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ShopProfile> for SettingsDto {
    fn from(p: ShopProfile) -> Self {
        SettingsDto {
            shop_name: p.shop_name,
            address: p.address,
            phone_numbers: p.phone_numbers,
            cashier_names: p.cashier_names,
            manager_names: p.manager_names,
            updated_at: Some(p.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    pub shop_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub cashier_names: Vec<String>,
    #[serde(default)]
    pub manager_names: Vec<String>,
}

/// The saved profile, or blank settings for a new shop.
pub async fn get_settings(state: &AppState) -> ApiResult<SettingsDto> {
    let profile = state.db().shops().get_profile(state.shop_id()).await?;
    Ok(profile.map(SettingsDto::from).unwrap_or_default())
}

/// Saves the profile.
///
/// ## Rules
/// - shop name required
/// - list entries are trimmed, must not be blank and must not repeat
pub async fn save_settings(state: &AppState, form: SettingsForm) -> ApiResult<SettingsDto> {
    let profile = ShopProfile {
        shop_id: state.shop_id().to_string(),
        shop_name: validate_name("shop name", &form.shop_name)?,
        address: form.address.trim().to_string(),
        phone_numbers: validate_phone_numbers(&form.phone_numbers)?,
        cashier_names: validate_unique_list("cashier name", &form.cashier_names)?,
        manager_names: validate_unique_list("manager name", &form.manager_names)?,
        updated_at: Utc::now(),
    };

    let saved = state.db().shops().upsert_profile(&profile).await?;
    info!(shop_id = %saved.shop_id, "Shop settings saved");
    Ok(SettingsDto::from(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    fn form() -> SettingsForm {
        SettingsForm {
            shop_name: " Corner Store ".into(),
            address: "1 Main St".into(),
            phone_numbers: vec!["555-0100".into()],
            cashier_names: vec![" Asha".into(), "Ravi".into()],
            manager_names: vec!["Mina".into()],
        }
    }

    #[tokio::test]
    async fn test_defaults_then_save() {
        let state = test_support::state().await;
        assert_eq!(get_settings(&state).await.unwrap(), SettingsDto::default());

        let saved = save_settings(&state, form()).await.unwrap();
        assert_eq!(saved.shop_name, "Corner Store");
        assert_eq!(saved.cashier_names, vec!["Asha", "Ravi"]);
        assert!(saved.updated_at.is_some());

        let loaded = get_settings(&state).await.unwrap();
        assert_eq!(loaded.manager_names, vec!["Mina"]);
        assert_eq!(loaded.phone_numbers, vec!["555-0100"]);
    }

    #[tokio::test]
    async fn test_validation() {
        let state = test_support::state().await;

        let mut no_name = form();
        no_name.shop_name = "".into();
        let err = save_settings(&state, no_name).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut duplicate = form();
        duplicate.cashier_names = vec!["Asha".into(), "Asha ".into()];
        let err = save_settings(&state, duplicate).await.unwrap_err();
        assert_eq!(err.message, "cashier name 'Asha' already exists");

        let mut blank_phone = form();
        blank_phone.phone_numbers = vec!["  ".into()];
        assert!(save_settings(&state, blank_phone).await.is_err());
    }
}

//! Per-module settings.
//!
//! Every setting carries its own typed value, so validation and the admin form
//! renderer both match exhaustively on [`SettingValue`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingValue {
    String {
        value: Option<String>,
    },
    Number {
        value: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean {
        value: bool,
    },
    Enum {
        options: Vec<String>,
        value: Option<String>,
    },
}

/// 管理端表单控件类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Number,
    Switch,
    Select,
}

impl SettingValue {
    pub fn input_kind(&self) -> InputKind {
        match self {
            SettingValue::String { .. } => InputKind::Text,
            SettingValue::Number { .. } => InputKind::Number,
            SettingValue::Boolean { .. } => InputKind::Switch,
            SettingValue::Enum { .. } => InputKind::Select,
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            SettingValue::String { value } => value.as_deref().is_some_and(|v| !v.is_empty()),
            SettingValue::Number { value, .. } => value.is_some(),
            SettingValue::Boolean { .. } => true,
            SettingValue::Enum { value, .. } => value.is_some(),
        }
    }

    fn validate(&self, key: &str) -> AppResult<()> {
        match self {
            SettingValue::String { .. } | SettingValue::Boolean { .. } => Ok(()),
            SettingValue::Number { value, min, max } => {
                if let (Some(min), Some(max)) = (min, max)
                    && min > max
                {
                    return Err(AppError::InvalidInput(format!(
                        "Setting '{key}' has min greater than max"
                    )));
                }
                if let Some(v) = value {
                    if !v.is_finite() {
                        return Err(AppError::InvalidInput(format!(
                            "Setting '{key}' must be a finite number"
                        )));
                    }
                    if min.is_some_and(|m| *v < m) || max.is_some_and(|m| *v > m) {
                        return Err(AppError::InvalidInput(format!(
                            "Setting '{key}' is out of range"
                        )));
                    }
                }
                Ok(())
            }
            SettingValue::Enum { options, value } => {
                if options.is_empty() {
                    return Err(AppError::InvalidInput(format!(
                        "Setting '{key}' must declare at least one option"
                    )));
                }
                if let Some(v) = value
                    && !options.contains(v)
                {
                    return Err(AppError::InvalidInput(format!(
                        "Setting '{key}' value '{v}' is not one of its options"
                    )));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ModuleSetting {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub value: SettingValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ModuleConfig {
    pub module_id: Uuid,
    pub settings: Vec<ModuleSetting>,
    pub updated_at: DateTime<Utc>,
}

/// 校验整组设置：key 唯一且非空、必填项有值、数值与枚举合法
pub fn validate_settings(settings: &[ModuleSetting]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for setting in settings {
        let key = setting.key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidInput("Setting key must not be empty".into()));
        }
        if !seen.insert(key) {
            return Err(AppError::InvalidInput(format!("Duplicate setting key '{key}'")));
        }
        if setting.required && !setting.value.is_set() {
            return Err(AppError::InvalidInput(format!("Setting '{key}' is required")));
        }
        setting.value.validate(key)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateModuleConfigRequest {
    pub settings: Vec<ModuleSetting>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleSettingView {
    #[serde(flatten)]
    pub setting: ModuleSetting,
    pub input: InputKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleConfigResponse {
    pub module_id: Uuid,
    pub settings: Vec<ModuleSettingView>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ModuleConfigResponse {
    pub fn empty(module_id: Uuid) -> Self {
        Self {
            module_id,
            settings: Vec::new(),
            updated_at: None,
        }
    }
}

impl From<ModuleConfig> for ModuleConfigResponse {
    fn from(c: ModuleConfig) -> Self {
        ModuleConfigResponse {
            module_id: c.module_id,
            settings: c
                .settings
                .into_iter()
                .map(|setting| ModuleSettingView {
                    input: setting.value.input_kind(),
                    setting,
                })
                .collect(),
            updated_at: Some(c.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, required: bool, value: SettingValue) -> ModuleSetting {
        ModuleSetting {
            key: key.to_string(),
            label: key.to_string(),
            description: None,
            required,
            value,
        }
    }

    #[test]
    fn test_tagged_value_deserializes() {
        let raw = r#"{"key":"theme","label":"Theme","required":true,
            "value":{"type":"enum","options":["light","dark"],"value":"dark"}}"#;
        let s: ModuleSetting = serde_json::from_str(raw).unwrap();
        assert_eq!(s.value.input_kind(), InputKind::Select);
        assert!(validate_settings(&[s]).is_ok());
    }

    #[test]
    fn test_enum_value_must_be_an_option() {
        let s = setting(
            "theme",
            false,
            SettingValue::Enum {
                options: vec!["light".into()],
                value: Some("dark".into()),
            },
        );
        assert!(validate_settings(&[s]).is_err());
    }

    #[test]
    fn test_required_and_range_checks() {
        let missing = setting("title", true, SettingValue::String { value: None });
        assert!(validate_settings(&[missing]).is_err());

        let out_of_range = setting(
            "limit",
            false,
            SettingValue::Number {
                value: Some(11.0),
                min: Some(0.0),
                max: Some(10.0),
            },
        );
        assert!(validate_settings(&[out_of_range]).is_err());

        let flag = setting("enabled", true, SettingValue::Boolean { value: false });
        assert!(validate_settings(&[flag]).is_ok());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let a = setting("k", false, SettingValue::Boolean { value: true });
        let b = setting("k", false, SettingValue::Boolean { value: false });
        assert!(validate_settings(&[a, b]).is_err());
    }
}

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ModuleConfig, ModuleConfigResponse, UpdateModuleConfigRequest, validate_settings};
use crate::store::{ModuleConfigStore, SharedStore};

#[derive(Clone)]
pub struct ModuleConfigService {
    store: SharedStore,
}

impl ModuleConfigService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 尚未配置过的模块返回空设置列表
    pub async fn get_config(&self, module_id: Uuid) -> AppResult<ModuleConfigResponse> {
        Ok(self
            .store
            .find_module_config(module_id)
            .await?
            .map(ModuleConfigResponse::from)
            .unwrap_or_else(|| ModuleConfigResponse::empty(module_id)))
    }

    /// 整组替换模块设置
    pub async fn update_config(
        &self,
        module_id: Uuid,
        req: UpdateModuleConfigRequest,
    ) -> AppResult<ModuleConfigResponse> {
        validate_settings(&req.settings)?;

        let config = ModuleConfig {
            module_id,
            settings: req
                .settings
                .into_iter()
                .map(|mut s| {
                    s.key = s.key.trim().to_string();
                    s
                })
                .collect(),
            updated_at: Utc::now(),
        };
        self.store.save_module_config(&config).await?;
        log::info!(
            "Module {module_id} settings updated ({} entries)",
            config.settings.len()
        );
        Ok(config.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{InputKind, ModuleSetting, SettingValue};
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn service() -> ModuleConfigService {
        ModuleConfigService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_unconfigured_module_is_empty() {
        let id = Uuid::new_v4();
        let res = service().get_config(id).await.unwrap();
        assert_eq!(res.module_id, id);
        assert!(res.settings.is_empty());
        assert!(res.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_update_then_read() {
        let svc = service();
        let id = Uuid::new_v4();
        let req = UpdateModuleConfigRequest {
            settings: vec![
                ModuleSetting {
                    key: " max_winners ".into(),
                    label: "Max winners".into(),
                    description: None,
                    required: true,
                    value: SettingValue::Number {
                        value: Some(3.0),
                        min: Some(1.0),
                        max: Some(10.0),
                    },
                },
                ModuleSetting {
                    key: "notify".into(),
                    label: "Send emails".into(),
                    description: Some("Email winners".into()),
                    required: false,
                    value: SettingValue::Boolean { value: true },
                },
            ],
        };
        svc.update_config(id, req).await.unwrap();

        let res = svc.get_config(id).await.unwrap();
        assert_eq!(res.settings.len(), 2);
        assert_eq!(res.settings[0].setting.key, "max_winners");
        assert_eq!(res.settings[0].input, InputKind::Number);
        assert_eq!(res.settings[1].input, InputKind::Switch);
        assert!(res.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_settings_are_not_saved() {
        let svc = service();
        let id = Uuid::new_v4();
        let req = UpdateModuleConfigRequest {
            settings: vec![ModuleSetting {
                key: "mode".into(),
                label: "Mode".into(),
                description: None,
                required: false,
                value: SettingValue::Enum {
                    options: vec!["a".into()],
                    value: Some("b".into()),
                },
            }],
        };
        assert!(matches!(
            svc.update_config(id, req).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(svc.get_config(id).await.unwrap().settings.is_empty());
    }
}

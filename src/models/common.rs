use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应体中的 error 字段: {"success": false, "error": {...}}
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

pub mod employee;
pub mod event;
pub mod module_config;
pub mod raffle;

pub use employee::employee_config;
pub use event::event_config;
pub use module_config::module_config_config;
pub use raffle::raffle_config;

use actix_web::{HttpRequest, HttpResponse, Result};
use serde_json::json;

use crate::middlewares::current_operator;

/// 日志中的操作员标识
pub(crate) fn operator_label(req: &HttpRequest) -> String {
    current_operator(req)
        .map(|op| format!("operator {} <{}>", op.id, op.email))
        .unwrap_or_else(|| "anonymous".to_string())
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "服务正常")
    )
)]
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

/// /api/v1 下的全部业务路由
pub fn api_config(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(raffle_config)
        .configure(event_config)
        .configure(employee_config)
        .configure(module_config_config);
}

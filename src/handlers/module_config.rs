use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use super::operator_label;
use crate::models::*;
use crate::services::ModuleConfigService;

#[utoipa::path(
    get,
    path = "/modules/{module_id}/config",
    tag = "module",
    params(
        ("module_id" = Uuid, Path, description = "模块ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取模块设置成功", body = ModuleConfigResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_module_config(
    module_config_service: web::Data<ModuleConfigService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match module_config_service.get_config(path.into_inner()).await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/modules/{module_id}/config",
    tag = "module",
    request_body = UpdateModuleConfigRequest,
    params(
        ("module_id" = Uuid, Path, description = "模块ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "保存模块设置成功", body = ModuleConfigResponse),
        (status = 400, description = "设置校验失败")
    )
)]
pub async fn update_module_config(
    module_config_service: web::Data<ModuleConfigService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateModuleConfigRequest>,
) -> Result<HttpResponse> {
    let module_id = path.into_inner();
    log::info!("{} updates settings of module {module_id}", operator_label(&req));

    match module_config_service
        .update_config(module_id, request.into_inner())
        .await
    {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn module_config_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/modules")
            .route("/{module_id}/config", web::get().to(get_module_config))
            .route("/{module_id}/config", web::put().to(update_module_config)),
    );
}

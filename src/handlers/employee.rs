use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use crate::models::*;
use crate::services::EmployeeService;

#[utoipa::path(
    post,
    path = "/employees",
    tag = "employee",
    request_body = CreateEmployeeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建员工成功", body = Employee),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "工号或邮箱已存在")
    )
)]
pub async fn create_employee(
    employee_service: web::Data<EmployeeService>,
    request: web::Json<CreateEmployeeRequest>,
) -> Result<HttpResponse> {
    match employee_service.create_employee(request.into_inner()).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": employee
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employee",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("status" = Option<EmployeeStatus>, Query, description = "员工状态"),
        ("department" = Option<String>, Query, description = "部门")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取员工列表成功", body = EmployeePage),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_employees(
    employee_service: web::Data<EmployeeService>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse> {
    match employee_service.list_employees(query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employee",
    params(
        ("id" = Uuid, Path, description = "员工ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取员工成功", body = Employee),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn get_employee(
    employee_service: web::Data<EmployeeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match employee_service.get_employee(path.into_inner()).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": employee
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employee",
    request_body = UpdateEmployeeRequest,
    params(
        ("id" = Uuid, Path, description = "员工ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新员工成功", body = Employee),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "员工不存在"),
        (status = 409, description = "邮箱已存在")
    )
)]
pub async fn update_employee(
    employee_service: web::Data<EmployeeService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateEmployeeRequest>,
) -> Result<HttpResponse> {
    match employee_service
        .update_employee(path.into_inner(), request.into_inner())
        .await
    {
        Ok(employee) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": employee
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/employees/{id}/history",
    tag = "employee",
    params(
        ("id" = Uuid, Path, description = "员工ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取参与记录成功", body = [HistoryEntry]),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn employee_history(
    employee_service: web::Data<EmployeeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match employee_service.history(path.into_inner()).await {
        Ok(history) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": history
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn employee_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            .route("", web::post().to(create_employee))
            .route("", web::get().to(list_employees))
            .route("/{id}", web::get().to(get_employee))
            .route("/{id}", web::put().to(update_employee))
            .route("/{id}/history", web::get().to(employee_history)),
    );
}

use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use super::operator_label;
use crate::models::*;
use crate::services::EventService;

#[utoipa::path(
    post,
    path = "/events",
    tag = "event",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建活动成功", body = Event),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_event(
    event_service: web::Data<EventService>,
    request: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    match event_service.create_event(request.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events",
    tag = "event",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动列表成功", body = [Event]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_events(event_service: web::Data<EventService>) -> Result<HttpResponse> {
    match event_service.list_events().await {
        Ok(events) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": events
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "event",
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动成功", body = Event),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_event(
    event_service: web::Data<EventService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match event_service.get_event(path.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "event",
    request_body = UpdateEventRequest,
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新活动成功", body = Event),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn update_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("{} updates event {id}", operator_label(&req));

    match event_service.update_event(id, request.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/events/{id}/guests/{guest_id}/rsvp",
    tag = "event",
    request_body = UpdateRsvpRequest,
    params(
        ("id" = Uuid, Path, description = "活动ID"),
        ("guest_id" = Uuid, Path, description = "嘉宾ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "回复已记录", body = EventGuest),
        (status = 404, description = "活动不存在或嘉宾不在名单中")
    )
)]
pub async fn update_rsvp(
    event_service: web::Data<EventService>,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateRsvpRequest>,
) -> Result<HttpResponse> {
    let (id, guest_id) = path.into_inner();
    match event_service
        .update_rsvp(id, guest_id, request.into_inner())
        .await
    {
        Ok(entry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entry
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{id}/guests",
    tag = "event",
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取嘉宾列表成功", body = [EventGuestView]),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn list_guests(
    event_service: web::Data<EventService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match event_service.list_guests(path.into_inner()).await {
        Ok(guests) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": guests
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/guests",
    tag = "event",
    request_body = AddGuestRequest,
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "添加嘉宾成功", body = EventGuestView),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "活动或员工不存在")
    )
)]
pub async fn add_guest(
    event_service: web::Data<EventService>,
    path: web::Path<Uuid>,
    request: web::Json<AddGuestRequest>,
) -> Result<HttpResponse> {
    match event_service
        .add_guest(path.into_inner(), request.into_inner())
        .await
    {
        Ok(guest) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": guest
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{id}/participants",
    tag = "event",
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取已签到嘉宾成功", body = [EventGuestView]),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn list_participants(
    event_service: web::Data<EventService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match event_service.list_participants(path.into_inner()).await {
        Ok(guests) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": guests
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/guests/{guest_id}/remind",
    tag = "event",
    params(
        ("id" = Uuid, Path, description = "活动ID"),
        ("guest_id" = Uuid, Path, description = "嘉宾ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提醒已发送"),
        (status = 404, description = "嘉宾不在名单中"),
        (status = 502, description = "邮件发送失败")
    )
)]
pub async fn remind_guest(
    event_service: web::Data<EventService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, guest_id) = path.into_inner();
    match event_service.remind_guest(id, guest_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Reminder sent"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/check-in",
    tag = "event",
    request_body = CheckInRequest,
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "签到成功", body = CheckInResponse),
        (status = 400, description = "guest_id 与 employee_id 必须二选一"),
        (status = 404, description = "嘉宾不在名单中")
    )
)]
pub async fn check_in(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CheckInRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::debug!("{} checks in a guest at event {id}", operator_label(&req));

    match event_service.check_in(id, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/scan",
    tag = "event",
    request_body = ScanCheckInRequest,
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "扫码签到成功", body = CheckInResponse),
        (status = 400, description = "签到码无效或不属于本活动"),
        (status = 404, description = "嘉宾不在名单中")
    )
)]
pub async fn scan_check_in(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<ScanCheckInRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::debug!("{} scans a check-in code at event {id}", operator_label(&req));

    match event_service.scan_check_in(id, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/bulk-check-in",
    tag = "event",
    request_body = BulkCheckInRequest,
    params(
        ("id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "批量签到成功", body = BulkCheckInResponse),
        (status = 400, description = "员工列表为空"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn bulk_check_in(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<BulkCheckInRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("{} runs bulk check-in at event {id}", operator_label(&req));

    match event_service.bulk_check_in(id, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn event_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::post().to(create_event))
            .route("", web::get().to(list_events))
            .route("/{id}", web::get().to(get_event))
            .route("/{id}", web::put().to(update_event))
            .route("/{id}/guests", web::get().to(list_guests))
            .route("/{id}/guests", web::post().to(add_guest))
            .route("/{id}/guests/{guest_id}/remind", web::post().to(remind_guest))
            .route("/{id}/guests/{guest_id}/rsvp", web::put().to(update_rsvp))
            .route("/{id}/participants", web::get().to(list_participants))
            .route("/{id}/check-in", web::post().to(check_in))
            .route("/{id}/scan", web::post().to(scan_check_in))
            .route("/{id}/bulk-check-in", web::post().to(bulk_check_in)),
    );
}

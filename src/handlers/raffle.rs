use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use super::operator_label;
use crate::models::*;
use crate::services::RaffleService;

#[utoipa::path(
    post,
    path = "/raffles",
    tag = "raffle",
    request_body = CreateRaffleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建抽奖成功", body = Raffle),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "活动不存在"),
        (status = 409, description = "活动已绑定其它抽奖")
    )
)]
pub async fn create_raffle(
    raffle_service: web::Data<RaffleService>,
    req: HttpRequest,
    request: web::Json<CreateRaffleRequest>,
) -> Result<HttpResponse> {
    log::info!("{} creates raffle", operator_label(&req));

    match raffle_service.create_raffle(request.into_inner()).await {
        Ok(raffle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": raffle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/raffles",
    tag = "raffle",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽奖列表成功", body = [RaffleResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_raffles(raffle_service: web::Data<RaffleService>) -> Result<HttpResponse> {
    match raffle_service.list_raffles().await {
        Ok(raffles) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": raffles
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/raffles/{id}",
    tag = "raffle",
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽奖详情成功", body = RaffleResponse),
        (status = 404, description = "抽奖不存在")
    )
)]
pub async fn get_raffle(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match raffle_service.get_raffle(path.into_inner()).await {
        Ok(raffle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": raffle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/participants",
    tag = "raffle",
    request_body = AddParticipantsRequest,
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "添加参与者成功", body = AddParticipantsResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "抽奖或员工不存在")
    )
)]
pub async fn add_participants(
    raffle_service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<AddParticipantsRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("{} adds participants to raffle {id}", operator_label(&req));

    match raffle_service.add_participants(id, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/attendance",
    tag = "raffle",
    request_body = UpdateAttendanceRequest,
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新出席状态成功", body = Raffle),
        (status = 404, description = "抽奖或参与者不存在"),
        (status = 409, description = "状态冲突")
    )
)]
pub async fn update_attendance(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateAttendanceRequest>,
) -> Result<HttpResponse> {
    match raffle_service
        .update_attendance(path.into_inner(), request.into_inner())
        .await
    {
        Ok(raffle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": raffle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/draw",
    tag = "raffle",
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖成功", body = DrawResponse),
        (status = 400, description = "没有符合条件的参与者"),
        (status = 404, description = "抽奖不存在"),
        (status = 409, description = "已有待确认的中奖者或抽奖已结束")
    )
)]
pub async fn draw(
    raffle_service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("{} draws raffle {id}", operator_label(&req));

    match raffle_service.draw(id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/claim",
    tag = "raffle",
    request_body = ClaimRequest,
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "领奖或放弃已处理", body = ClaimOutcome),
        (status = 400, description = "没有可领取的奖品"),
        (status = 404, description = "抽奖不存在"),
        (status = 409, description = "没有待确认的中奖者")
    )
)]
pub async fn claim(
    raffle_service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<ClaimRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let claimed = request.claimed;
    log::info!(
        "{} resolves claim on raffle {id} (claimed: {claimed})",
        operator_label(&req)
    );

    match raffle_service.claim(id, claimed).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/remind",
    tag = "raffle",
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提醒已发送", body = ReminderResponse),
        (status = 404, description = "抽奖不存在")
    )
)]
pub async fn send_reminders(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match raffle_service.send_reminders(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/prizes",
    tag = "raffle",
    request_body = PrizeInput,
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "添加奖品成功", body = Prize),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "抽奖已结束")
    )
)]
pub async fn add_prize(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<Uuid>,
    request: web::Json<PrizeInput>,
) -> Result<HttpResponse> {
    match raffle_service
        .add_prize(path.into_inner(), request.into_inner())
        .await
    {
        Ok(prize) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prize
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/raffles/{id}/prizes/{prize_id}",
    tag = "raffle",
    request_body = PrizeInput,
    params(
        ("id" = Uuid, Path, description = "抽奖ID"),
        ("prize_id" = Uuid, Path, description = "奖品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新奖品成功", body = Prize),
        (status = 404, description = "奖品不存在"),
        (status = 409, description = "奖品已被领取")
    )
)]
pub async fn update_prize(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<PrizeInput>,
) -> Result<HttpResponse> {
    let (id, prize_id) = path.into_inner();
    match raffle_service
        .update_prize(id, prize_id, request.into_inner())
        .await
    {
        Ok(prize) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prize
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/raffles/{id}/prizes/{prize_id}",
    tag = "raffle",
    params(
        ("id" = Uuid, Path, description = "抽奖ID"),
        ("prize_id" = Uuid, Path, description = "奖品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除奖品成功"),
        (status = 404, description = "奖品不存在"),
        (status = 409, description = "奖品已被领取")
    )
)]
pub async fn delete_prize(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, prize_id) = path.into_inner();
    match raffle_service.delete_prize(id, prize_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Prize deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/raffles/{id}/complete",
    tag = "raffle",
    params(
        ("id" = Uuid, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖已结束", body = Raffle),
        (status = 409, description = "仍有待确认的中奖者")
    )
)]
pub async fn complete_raffle(
    raffle_service: web::Data<RaffleService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("{} completes raffle {id}", operator_label(&req));

    match raffle_service.complete_raffle(id).await {
        Ok(raffle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": raffle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn raffle_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/raffles")
            .route("", web::post().to(create_raffle))
            .route("", web::get().to(list_raffles))
            .route("/{id}", web::get().to(get_raffle))
            .route("/{id}/participants", web::post().to(add_participants))
            .route("/{id}/attendance", web::post().to(update_attendance))
            .route("/{id}/draw", web::post().to(draw))
            .route("/{id}/claim", web::post().to(claim))
            .route("/{id}/remind", web::post().to(send_reminders))
            .route("/{id}/prizes", web::post().to(add_prize))
            .route("/{id}/prizes/{prize_id}", web::put().to(update_prize))
            .route("/{id}/prizes/{prize_id}", web::delete().to(delete_prize))
            .route("/{id}/complete", web::post().to(complete_raffle)),
    );
}

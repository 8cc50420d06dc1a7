use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::config::RaffleConfig;
use crate::error::{AppError, AppResult};
use crate::external::Notifier;
use crate::models::{
    AddParticipantsRequest, AddParticipantsResponse, ClaimOutcome, CreateRaffleRequest,
    DrawResponse, Participant, Prize, PrizeInput, Raffle, RaffleResponse, RaffleStatus,
    ReminderResponse, SkippedParticipant, UpdateAttendanceRequest, raffle_check_in_code,
};
use crate::store::{EmployeeStore, EventStore, RaffleStore, SharedStore};
use crate::utils::require_text;
use crate::workflow::{self, WorkflowError};

/// 活动绑定抽奖时的乐观锁重试次数
const EVENT_LINK_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct RaffleService {
    store: SharedStore,
    notifier: Notifier,
    claim_window: Duration,
}

impl RaffleService {
    pub fn new(store: SharedStore, notifier: Notifier, config: &RaffleConfig) -> Self {
        Self {
            store,
            notifier,
            claim_window: Duration::seconds(config.claim_window_secs),
        }
    }

    /// 创建抽奖（状态直接为 active）；指定 event_id 时同时把活动绑定到该抽奖
    pub async fn create_raffle(&self, req: CreateRaffleRequest) -> AppResult<Raffle> {
        let name = require_text("name", &req.name)?;
        let prizes = req
            .prizes
            .into_iter()
            .map(validate_prize_input)
            .collect::<AppResult<Vec<_>>>()?;

        let mut raffle = Raffle::new(name, req.description, req.event_id);
        raffle.prizes = prizes.into_iter().map(workflow::prize_from_input).collect();

        // 先占住活动再落库抽奖，并发创建时只有一个能绑定成功
        if let Some(event_id) = req.event_id {
            self.link_event(event_id, raffle.id).await?;
        }

        if let Err(e) = self.store.insert_raffle(&raffle).await {
            if let Some(event_id) = req.event_id {
                self.unlink_event(event_id, raffle.id).await;
            }
            return Err(e);
        }

        log::info!(
            "Raffle {} created with {} prizes (event: {:?})",
            raffle.id,
            raffle.prizes.len(),
            raffle.event_id
        );
        Ok(raffle)
    }

    async fn link_event(&self, event_id: Uuid, raffle_id: Uuid) -> AppResult<()> {
        let mut last_err = None;
        for _ in 0..EVENT_LINK_ATTEMPTS {
            let mut event = self
                .store
                .find_event(event_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;
            // 每次重读后都要重新检查，save_event 的版本校验保证检查与写入之间没有插队
            match event.raffle_id {
                Some(existing) if existing == raffle_id => return Ok(()),
                Some(existing) => {
                    return Err(AppError::StateConflict(format!(
                        "Event {event_id} is already linked to raffle {existing}"
                    )));
                }
                None => {}
            }
            event.raffle_id = Some(raffle_id);
            match self.store.save_event(&mut event).await {
                Ok(()) => return Ok(()),
                Err(AppError::StateConflict(msg)) => last_err = Some(AppError::StateConflict(msg)),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::InternalError("Failed to link event".into())))
    }

    /// 抽奖写入失败后撤销活动绑定
    async fn unlink_event(&self, event_id: Uuid, raffle_id: Uuid) {
        for _ in 0..EVENT_LINK_ATTEMPTS {
            let mut event = match self.store.find_event(event_id).await {
                Ok(Some(event)) => event,
                Ok(None) => return,
                Err(e) => {
                    log::error!("Event {event_id}: failed to reload for unlink: {e}");
                    return;
                }
            };
            if event.raffle_id != Some(raffle_id) {
                return;
            }
            event.raffle_id = None;
            match self.store.save_event(&mut event).await {
                Ok(()) => return,
                Err(AppError::StateConflict(_)) => continue,
                Err(e) => {
                    log::error!("Event {event_id}: failed to unlink raffle {raffle_id}: {e}");
                    return;
                }
            }
        }
        log::error!("Event {event_id}: gave up unlinking raffle {raffle_id}");
    }

    pub async fn list_raffles(&self) -> AppResult<Vec<RaffleResponse>> {
        let now = Utc::now();
        let list = self.store.list_raffles().await?;
        Ok(list.into_iter().map(|r| to_response(r, now)).collect())
    }

    /// 读取抽奖；领奖窗口已过期时先按放弃处理并保存
    pub async fn get_raffle(&self, id: Uuid) -> AppResult<RaffleResponse> {
        let now = Utc::now();
        let raffle = self.load_current(id, now).await?;
        Ok(to_response(raffle, now))
    }

    async fn load(&self, id: Uuid) -> AppResult<Raffle> {
        self.store
            .find_raffle(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Raffle {id} not found")))
    }

    async fn load_current(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Raffle> {
        let mut raffle = self.load(id).await?;
        if let Some(winner) = workflow::expire_if_due(&mut raffle, now) {
            self.store.save_raffle(&mut raffle).await?;
            log::info!("Raffle {id}: claim window of {winner} expired, treated as forfeit");
        }
        Ok(raffle)
    }

    /// 添加参与者:
    /// - 员工不存在 -> NotFound
    /// - 已在名单中 / 离职 / 被排除 -> 跳过并返回原因
    /// - 新参与者收到带签到码的邀请邮件
    pub async fn add_participants(
        &self,
        id: Uuid,
        req: AddParticipantsRequest,
    ) -> AppResult<AddParticipantsResponse> {
        if req.employee_ids.is_empty() {
            return Err(AppError::InvalidInput("employee_ids must not be empty".into()));
        }

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = req
            .employee_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let employees = self.store.find_employees(&ids).await?;
        if let Some(missing) = ids
            .iter()
            .find(|id| !employees.iter().any(|e| e.id == **id))
        {
            return Err(AppError::NotFound(format!("Employee {missing} not found")));
        }

        let mut raffle = self.load(id).await?;
        if raffle.status == RaffleStatus::Completed {
            return Err(WorkflowError::RaffleCompleted.into());
        }

        let mut added = Vec::new();
        let mut skipped = Vec::new();
        for employee in ids
            .iter()
            .filter_map(|id| employees.iter().find(|e| e.id == *id))
        {
            if raffle.participant(employee.id).is_some() {
                skipped.push(SkippedParticipant {
                    employee_id: employee.id,
                    reason: "Already a participant".into(),
                });
            } else if let Some(reason) = employee.raffle_ineligibility() {
                skipped.push(SkippedParticipant {
                    employee_id: employee.id,
                    reason,
                });
            } else {
                raffle.participants.push(Participant::new(employee.id));
                added.push(employee);
            }
        }

        if !added.is_empty() {
            self.store.save_raffle(&mut raffle).await?;
        }

        for employee in &added {
            let code = raffle_check_in_code(raffle.id, employee.id);
            self.notifier
                .send_participant_invitation(employee, &raffle, &code)
                .await;
        }

        log::info!(
            "Raffle {id}: {} participants added, {} skipped",
            added.len(),
            skipped.len()
        );
        Ok(AddParticipantsResponse {
            added: added.iter().map(|e| e.id).collect(),
            skipped,
        })
    }

    /// 手动修改出席状态
    pub async fn update_attendance(
        &self,
        id: Uuid,
        req: UpdateAttendanceRequest,
    ) -> AppResult<Raffle> {
        let mut raffle = self.load_current(id, Utc::now()).await?;
        let participant = raffle
            .participant_mut(req.employee_id)
            .ok_or(WorkflowError::ParticipantNotFound(req.employee_id))?;
        participant.attended = req.attended;
        self.store.save_raffle(&mut raffle).await?;
        Ok(raffle)
    }

    /// 抽奖:
    /// 1. 处理已过期的领奖窗口
    /// 2. 在出席且未中奖的参与者中等概率选出一人
    /// 3. 条件更新 current_winner (current_winner IS NULL AND version 未变)，失败说明有并发抽奖
    pub async fn draw(&self, id: Uuid) -> AppResult<DrawResponse> {
        let now = Utc::now();
        let raffle = self.load_current(id, now).await?;

        let winner = {
            let mut rng = rand::thread_rng();
            workflow::draw_winner(&raffle, &mut rng)
        };
        let winner = match winner {
            Ok(w) => w,
            Err(e) => {
                log::warn!("Raffle {id}: draw rejected: {e}");
                return Err(e.into());
            }
        };

        let deadline = now + self.claim_window;
        let assigned = self
            .store
            .assign_pending_winner(id, raffle.version, winner, deadline)
            .await?;
        if !assigned {
            log::warn!("Raffle {id}: concurrent draw detected, winner not assigned");
            return Err(AppError::StateConflict(
                "Raffle was modified by another request; please retry the draw".into(),
            ));
        }

        log::info!("Raffle {id}: drew winner {winner}, claim deadline {deadline}");
        Ok(DrawResponse {
            winner,
            claim_deadline: deadline,
        })
    }

    /// 领奖 (claimed = true) 或放弃 (claimed = false)
    ///
    /// 领奖成功后通知中奖者；通知失败只记录日志，不影响已保存的结果。
    pub async fn claim(&self, id: Uuid, claimed: bool) -> AppResult<ClaimOutcome> {
        let now = Utc::now();
        let mut raffle = self.load(id).await?;

        let outcome = match workflow::resolve_claim(&mut raffle, claimed, now) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Raffle {id}: claim rejected: {e}");
                return Err(e.into());
            }
        };
        self.store.save_raffle(&mut raffle).await?;

        match &outcome {
            ClaimOutcome::Claimed { winner, prize } => {
                log::info!("Raffle {id}: {winner} claimed prize {}", prize.id);
                if raffle.status == RaffleStatus::Completed {
                    log::info!("Raffle {id}: all prizes claimed, raffle completed");
                }
                match self.store.find_employee(*winner).await {
                    Ok(Some(employee)) => {
                        self.notifier
                            .send_winner_notification(&employee, &raffle, prize)
                            .await;
                    }
                    Ok(None) => log::warn!("Raffle {id}: winner {winner} has no employee record"),
                    Err(e) => log::error!("Raffle {id}: failed to load winner {winner}: {e}"),
                }
            }
            ClaimOutcome::Forfeited { winner } => {
                log::info!("Raffle {id}: {winner} forfeited");
            }
            ClaimOutcome::Expired { winner } => {
                log::info!("Raffle {id}: claim by {winner} arrived after the deadline");
            }
        }
        Ok(outcome)
    }

    /// 提醒未签到的参与者，返回成功发送的数量
    pub async fn send_reminders(&self, id: Uuid) -> AppResult<ReminderResponse> {
        let raffle = self.load(id).await?;
        let absent: Vec<Uuid> = raffle
            .participants
            .iter()
            .filter(|p| !p.attended)
            .map(|p| p.employee_id)
            .collect();

        let employees = self.store.find_employees(&absent).await?;
        let mut sent = 0;
        for employee in &employees {
            if self.notifier.send_raffle_reminder(employee, &raffle).await {
                sent += 1;
            }
        }
        log::info!("Raffle {id}: sent {sent}/{} reminders", absent.len());
        Ok(ReminderResponse { sent })
    }

    pub async fn add_prize(&self, id: Uuid, input: PrizeInput) -> AppResult<Prize> {
        let input = validate_prize_input(input)?;
        let mut raffle = self.load(id).await?;
        let prize = workflow::add_prize(&mut raffle, input)?;
        self.store.save_raffle(&mut raffle).await?;
        Ok(prize)
    }

    pub async fn update_prize(
        &self,
        id: Uuid,
        prize_id: Uuid,
        input: PrizeInput,
    ) -> AppResult<Prize> {
        let input = validate_prize_input(input)?;
        let mut raffle = self.load(id).await?;
        let prize = workflow::update_prize(&mut raffle, prize_id, input)?;
        self.store.save_raffle(&mut raffle).await?;
        Ok(prize)
    }

    pub async fn delete_prize(&self, id: Uuid, prize_id: Uuid) -> AppResult<()> {
        let mut raffle = self.load(id).await?;
        workflow::remove_prize(&mut raffle, prize_id)?;
        self.store.save_raffle(&mut raffle).await?;
        Ok(())
    }

    /// 操作员手动结束抽奖（仍有待确认中奖者时拒绝）
    pub async fn complete_raffle(&self, id: Uuid) -> AppResult<Raffle> {
        let mut raffle = self.load_current(id, Utc::now()).await?;
        workflow::complete_raffle(&mut raffle)?;
        self.store.save_raffle(&mut raffle).await?;
        log::info!("Raffle {id} completed by operator");
        Ok(raffle)
    }

    /// 后台任务：处理所有已过期的领奖窗口，返回处理数量
    pub async fn expire_stale_claims(&self) -> AppResult<usize> {
        let now = Utc::now();
        let due = self.store.raffles_with_expired_claims(now).await?;
        let mut expired = 0;
        for mut raffle in due {
            let Some(winner) = workflow::expire_if_due(&mut raffle, now) else {
                continue;
            };
            match self.store.save_raffle(&mut raffle).await {
                Ok(()) => {
                    expired += 1;
                    log::info!(
                        "Raffle {}: claim window of {winner} expired, treated as forfeit",
                        raffle.id
                    );
                }
                // 并发请求已处理过该抽奖，下一轮再检查
                Err(AppError::StateConflict(_)) => {}
                Err(e) => log::error!("Raffle {}: failed to expire claim: {e}", raffle.id),
            }
        }
        Ok(expired)
    }
}

fn validate_prize_input(mut input: PrizeInput) -> AppResult<PrizeInput> {
    input.name = require_text("prize name", &input.name)?;
    if input.value_cents.is_some_and(|v| v < 0) {
        return Err(AppError::InvalidInput("value_cents must not be negative".into()));
    }
    Ok(input)
}

fn to_response(raffle: Raffle, now: DateTime<Utc>) -> RaffleResponse {
    let claim_state = workflow::claim_state(&raffle, now);
    let eligible_count = raffle
        .participants
        .iter()
        .filter(|p| workflow::is_eligible(p))
        .count();
    RaffleResponse {
        raffle,
        claim_state,
        eligible_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{FailingTransport, RecordingTransport};
    use crate::models::{
        ClaimState, CreateEmployeeRequest, CreateEventRequest, Employee, EmployeeStatus,
    };
    use crate::services::{EmployeeService, EventService};
    use crate::store::{MemoryStore, RaffleStore};
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        mail: Arc<RecordingTransport>,
        raffles: RaffleService,
        employees: EmployeeService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mail = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(mail.clone());
        Fixture {
            raffles: RaffleService::new(store.clone(), notifier, &RaffleConfig::default()),
            employees: EmployeeService::new(store.clone()),
            store,
            mail,
        }
    }

    async fn hire(f: &Fixture, code: &str) -> Employee {
        f.employees
            .create_employee(CreateEmployeeRequest {
                employee_code: code.into(),
                name: format!("Employee {code}"),
                email: format!("{}@example.com", code.to_lowercase()),
                department: "R&D".into(),
                position: "Engineer".into(),
                join_date: NaiveDate::from_ymd_opt(2021, 4, 1).unwrap(),
                status: None,
                raffle_eligible: None,
                raffle_exclusion_reason: None,
            })
            .await
            .unwrap()
    }

    fn prize(name: &str) -> PrizeInput {
        PrizeInput {
            name: name.into(),
            description: String::new(),
            tier: None,
            value_cents: Some(1000),
        }
    }

    async fn raffle_with(f: &Fixture, prizes: Vec<PrizeInput>) -> Raffle {
        f.raffles
            .create_raffle(CreateRaffleRequest {
                name: "Year-end".into(),
                description: String::new(),
                event_id: None,
                prizes,
            })
            .await
            .unwrap()
    }

    async fn enroll_attending(f: &Fixture, raffle_id: Uuid, employees: &[&Employee]) {
        f.raffles
            .add_participants(
                raffle_id,
                AddParticipantsRequest {
                    employee_ids: employees.iter().map(|e| e.id).collect(),
                },
            )
            .await
            .unwrap();
        for e in employees {
            f.raffles
                .update_attendance(
                    raffle_id,
                    UpdateAttendanceRequest {
                        employee_id: e.id,
                        attended: true,
                    },
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_add_participants_skips_and_invites() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let b = hire(&f, "B1").await;
        f.employees
            .update_employee(
                b.id,
                crate::models::UpdateEmployeeRequest {
                    status: Some(EmployeeStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let raffle = raffle_with(&f, vec![prize("Mug")]).await;

        let res = f
            .raffles
            .add_participants(
                raffle.id,
                AddParticipantsRequest {
                    employee_ids: vec![a.id, b.id, a.id],
                },
            )
            .await
            .unwrap();
        assert_eq!(res.added, vec![a.id]);
        assert_eq!(res.skipped.len(), 1);
        assert_eq!(res.skipped[0].employee_id, b.id);

        // 再次添加被跳过
        let again = f
            .raffles
            .add_participants(
                raffle.id,
                AddParticipantsRequest {
                    employee_ids: vec![a.id],
                },
            )
            .await
            .unwrap();
        assert!(again.added.is_empty());
        assert_eq!(again.skipped[0].reason, "Already a participant");

        let sent = f.mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, a.email);
        assert!(sent[0].body_text.contains(&raffle.id.to_string()));

        let stored = f.store.find_raffle(raffle.id).await.unwrap().unwrap();
        let p = stored.participant(a.id).unwrap();
        assert!(!p.attended && !p.won_prize);
    }

    #[tokio::test]
    async fn test_unknown_employee_is_not_found() {
        let f = fixture();
        let raffle = raffle_with(&f, vec![]).await;
        let err = f
            .raffles
            .add_participants(
                raffle.id,
                AddParticipantsRequest {
                    employee_ids: vec![Uuid::new_v4()],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_draw_claim_round_trip() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let raffle = raffle_with(&f, vec![prize("Bike")]).await;
        enroll_attending(&f, raffle.id, &[&a]).await;

        let drawn = f.raffles.draw(raffle.id).await.unwrap();
        assert_eq!(drawn.winner, a.id);

        // 待确认期间不能再次抽奖
        let again = f.raffles.draw(raffle.id).await.unwrap_err();
        assert!(matches!(again, AppError::StateConflict(_)));

        let outcome = f.raffles.claim(raffle.id, true).await.unwrap();
        assert!(matches!(outcome, ClaimOutcome::Claimed { winner, .. } if winner == a.id));

        let view = f.raffles.get_raffle(raffle.id).await.unwrap();
        assert!(view.raffle.prizes[0].claimed);
        assert_eq!(view.raffle.prizes[0].winner, Some(a.id));
        assert!(view.raffle.current_winner.is_none());
        assert_eq!(view.raffle.status, RaffleStatus::Completed);
        assert_eq!(view.claim_state, ClaimState::NoPendingWinner);

        let winner_mail = f.mail.sent().into_iter().last().unwrap();
        assert!(winner_mail.subject.contains("Congratulations"));
    }

    #[tokio::test]
    async fn test_draw_with_nobody_eligible() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let raffle = raffle_with(&f, vec![prize("Bike")]).await;
        f.raffles
            .add_participants(
                raffle.id,
                AddParticipantsRequest {
                    employee_ids: vec![a.id],
                },
            )
            .await
            .unwrap();

        let err = f.raffles.draw(raffle.id).await.unwrap_err();
        assert!(matches!(err, AppError::NoEligibleParticipants));
        let stored = f.store.find_raffle(raffle.id).await.unwrap().unwrap();
        assert!(stored.current_winner.is_none());
    }

    #[tokio::test]
    async fn test_claim_without_prize_keeps_winner() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let raffle = raffle_with(&f, vec![]).await;
        enroll_attending(&f, raffle.id, &[&a]).await;
        f.raffles.draw(raffle.id).await.unwrap();

        let err = f.raffles.claim(raffle.id, true).await.unwrap_err();
        assert!(matches!(err, AppError::NoPrizesAvailable));
        let stored = f.store.find_raffle(raffle.id).await.unwrap().unwrap();
        assert_eq!(stored.current_winner, Some(a.id));

        // 放弃不需要奖品
        let outcome = f.raffles.claim(raffle.id, false).await.unwrap();
        assert_eq!(outcome, ClaimOutcome::Forfeited { winner: a.id });
    }

    #[tokio::test]
    async fn test_expired_window_is_forfeited_on_read_and_sweep() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let b = hire(&f, "B1").await;
        let raffle = raffle_with(&f, vec![prize("Mug")]).await;
        enroll_attending(&f, raffle.id, &[&a, &b]).await;
        let drawn = f.raffles.draw(raffle.id).await.unwrap();

        // 把截止时间改到过去
        let mut stored = f.store.find_raffle(raffle.id).await.unwrap().unwrap();
        stored.claim_deadline = Some(Utc::now() - Duration::seconds(1));
        f.store.save_raffle(&mut stored).await.unwrap();

        assert_eq!(f.raffles.expire_stale_claims().await.unwrap(), 1);
        let view = f.raffles.get_raffle(raffle.id).await.unwrap();
        assert_eq!(view.claim_state, ClaimState::NoPendingWinner);
        assert!(!view.raffle.participant(drawn.winner).unwrap().attended);
        assert_eq!(view.eligible_count, 1);

        // 下一轮只能抽到另一人
        let next = f.raffles.draw(raffle.id).await.unwrap();
        assert_ne!(next.winner, drawn.winner);
    }

    #[tokio::test]
    async fn test_late_claim_reports_expired() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let raffle = raffle_with(&f, vec![prize("Mug")]).await;
        enroll_attending(&f, raffle.id, &[&a]).await;
        f.raffles.draw(raffle.id).await.unwrap();

        let mut stored = f.store.find_raffle(raffle.id).await.unwrap().unwrap();
        stored.claim_deadline = Some(Utc::now() - Duration::seconds(5));
        f.store.save_raffle(&mut stored).await.unwrap();

        let outcome = f.raffles.claim(raffle.id, true).await.unwrap();
        assert_eq!(outcome, ClaimOutcome::Expired { winner: a.id });
        let stored = f.store.find_raffle(raffle.id).await.unwrap().unwrap();
        assert!(!stored.prizes[0].claimed);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_roll_back_claim() {
        let store = Arc::new(MemoryStore::new());
        let employees = EmployeeService::new(store.clone());
        let raffles = RaffleService::new(
            store.clone(),
            Notifier::new(Arc::new(FailingTransport)),
            &RaffleConfig::default(),
        );
        let a = employees
            .create_employee(CreateEmployeeRequest {
                employee_code: "A1".into(),
                name: "Ann".into(),
                email: "ann@example.com".into(),
                department: "Ops".into(),
                position: "Lead".into(),
                join_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                status: None,
                raffle_eligible: None,
                raffle_exclusion_reason: None,
            })
            .await
            .unwrap();
        let raffle = raffles
            .create_raffle(CreateRaffleRequest {
                name: "R".into(),
                description: String::new(),
                event_id: None,
                prizes: vec![prize("Mug")],
            })
            .await
            .unwrap();
        raffles
            .add_participants(raffle.id, AddParticipantsRequest { employee_ids: vec![a.id] })
            .await
            .unwrap();
        raffles
            .update_attendance(
                raffle.id,
                UpdateAttendanceRequest {
                    employee_id: a.id,
                    attended: true,
                },
            )
            .await
            .unwrap();
        raffles.draw(raffle.id).await.unwrap();

        assert!(raffles.claim(raffle.id, true).await.is_ok());
        let stored = store.find_raffle(raffle.id).await.unwrap().unwrap();
        assert!(stored.prizes[0].claimed);
    }

    #[tokio::test]
    async fn test_reminders_go_to_absent_participants() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let b = hire(&f, "B1").await;
        let raffle = raffle_with(&f, vec![]).await;
        f.raffles
            .add_participants(
                raffle.id,
                AddParticipantsRequest {
                    employee_ids: vec![a.id, b.id],
                },
            )
            .await
            .unwrap();
        f.raffles
            .update_attendance(
                raffle.id,
                UpdateAttendanceRequest {
                    employee_id: a.id,
                    attended: true,
                },
            )
            .await
            .unwrap();

        let res = f.raffles.send_reminders(raffle.id).await.unwrap();
        assert_eq!(res.sent, 1);
        let last = f.mail.sent().into_iter().last().unwrap();
        assert_eq!(last.to, b.email);
    }

    #[tokio::test]
    async fn test_prize_management_and_completion() {
        let f = fixture();
        let raffle = raffle_with(&f, vec![prize("Mug")]).await;

        let bad = PrizeInput {
            value_cents: Some(-1),
            ..prize("Broken")
        };
        assert!(matches!(
            f.raffles.add_prize(raffle.id, bad).await.unwrap_err(),
            AppError::InvalidInput(_)
        ));

        let added = f.raffles.add_prize(raffle.id, prize("Bag")).await.unwrap();
        let updated = f
            .raffles
            .update_prize(raffle.id, added.id, prize("Backpack"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Backpack");
        f.raffles.delete_prize(raffle.id, added.id).await.unwrap();

        let done = f.raffles.complete_raffle(raffle.id).await.unwrap();
        assert_eq!(done.status, RaffleStatus::Completed);
        assert!(matches!(
            f.raffles.add_prize(raffle.id, prize("Late")).await.unwrap_err(),
            AppError::StateConflict(_)
        ));
        assert!(matches!(
            f.raffles.draw(raffle.id).await.unwrap_err(),
            AppError::StateConflict(_)
        ));
    }

    #[tokio::test]
    async fn test_create_raffle_links_event() {
        let f = fixture();
        let events = EventService::new(f.store.clone(), Notifier::new(f.mail.clone()));
        let event = events
            .create_event(CreateEventRequest {
                name: "Gala".into(),
                description: String::new(),
                date: Utc::now() + Duration::days(3),
                location: "Hall".into(),
            })
            .await
            .unwrap();

        let raffle = f
            .raffles
            .create_raffle(CreateRaffleRequest {
                name: "Gala raffle".into(),
                description: String::new(),
                event_id: Some(event.id),
                prizes: vec![],
            })
            .await
            .unwrap();
        assert_eq!(raffle.status, RaffleStatus::Active);
        assert_eq!(events.get_event(event.id).await.unwrap().raffle_id, Some(raffle.id));

        let second = f
            .raffles
            .create_raffle(CreateRaffleRequest {
                name: "Another".into(),
                description: String::new(),
                event_id: Some(event.id),
                prizes: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(second, AppError::StateConflict(_)));
        // 失败的创建不会留下抽奖记录
        assert_eq!(f.store.list_raffles().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_links_event_once() {
        let f = fixture();
        let events = EventService::new(f.store.clone(), Notifier::new(f.mail.clone()));

        for round in 0..20 {
            let event = events
                .create_event(CreateEventRequest {
                    name: format!("Gala {round}"),
                    description: String::new(),
                    date: Utc::now() + Duration::days(3),
                    location: "Hall".into(),
                })
                .await
                .unwrap();

            let request = || CreateRaffleRequest {
                name: "Gala raffle".into(),
                description: String::new(),
                event_id: Some(event.id),
                prizes: vec![],
            };
            let (a, b) = (f.raffles.clone(), f.raffles.clone());
            let (ra, rb) = (request(), request());
            let first = tokio::spawn(async move { a.create_raffle(ra).await });
            let second = tokio::spawn(async move { b.create_raffle(rb).await });
            let results = [first.await.unwrap(), second.await.unwrap()];

            let created: Vec<&Raffle> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(created.len(), 1, "round {round}");
            assert!(results.iter().any(|r| matches!(r, Err(AppError::StateConflict(_)))));

            let linked = events.get_event(event.id).await.unwrap().raffle_id;
            assert_eq!(linked, Some(created[0].id));
            let pointing: Vec<Uuid> = f
                .store
                .list_raffles()
                .await
                .unwrap()
                .into_iter()
                .filter(|r| r.event_id == Some(event.id))
                .map(|r| r.id)
                .collect();
            assert_eq!(pointing, vec![created[0].id]);
        }
    }
}

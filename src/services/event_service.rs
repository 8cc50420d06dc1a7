use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::Notifier;
use crate::models::{
    AddGuestRequest, BulkCheckInRequest, BulkCheckInResponse, CheckInPayload, CheckInRequest,
    CheckInResponse, CheckInSubject, CreateEventRequest, Event, EventGuest, EventGuestView, Guest,
    GuestType, ScanCheckInRequest, UpdateEventRequest, UpdateRsvpRequest,
};
use crate::store::{EmployeeStore, EventStore, GuestStore, RaffleStore, SharedStore};
use crate::utils::{normalize_email, require_text, validate_email};
use crate::workflow;

/// 文档保存遇到版本冲突时的重试次数
const SAVE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct EventService {
    store: SharedStore,
    notifier: Notifier,
}

impl EventService {
    pub fn new(store: SharedStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn create_event(&self, req: CreateEventRequest) -> AppResult<Event> {
        let name = require_text("name", &req.name)?;
        let location = require_text("location", &req.location)?;
        let mut event = Event::new(name, req.description, req.date, location);
        self.store.insert_event(&mut event).await?;
        log::info!("Event {} created ({:?})", event.id, event.status);
        Ok(event)
    }

    pub async fn get_event(&self, id: Uuid) -> AppResult<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))
    }

    /// 按活动日期倒序
    pub async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.store.list_events().await
    }

    /// 部分更新活动资料；状态由保存时的日期重新推导
    pub async fn update_event(&self, id: Uuid, req: UpdateEventRequest) -> AppResult<Event> {
        let name = req.name.as_deref().map(|n| require_text("name", n)).transpose()?;
        let location = req
            .location
            .as_deref()
            .map(|l| require_text("location", l))
            .transpose()?;

        let mut last_err = None;
        for _ in 0..SAVE_ATTEMPTS {
            let mut event = self.get_event(id).await?;
            if let Some(name) = &name {
                event.name = name.clone();
            }
            if let Some(description) = &req.description {
                event.description = description.clone();
            }
            if let Some(date) = req.date {
                event.date = date;
            }
            if let Some(location) = &location {
                event.location = location.clone();
            }
            match self.store.save_event(&mut event).await {
                Ok(()) => {
                    log::info!("Event {id} updated ({:?})", event.status);
                    return Ok(event);
                }
                Err(AppError::StateConflict(msg)) => last_err = Some(AppError::StateConflict(msg)),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::InternalError("Failed to update event".into())))
    }

    /// 记录嘉宾回复（confirmed / declined / pending）
    pub async fn update_rsvp(
        &self,
        id: Uuid,
        guest_id: Uuid,
        req: UpdateRsvpRequest,
    ) -> AppResult<EventGuest> {
        let mut last_err = None;
        for _ in 0..SAVE_ATTEMPTS {
            let mut event = self.get_event(id).await?;
            let changed = workflow::set_invitation_status(&mut event, guest_id, req.status)?;
            if changed {
                match self.store.save_event(&mut event).await {
                    Ok(()) => log::info!("Event {id}: guest {guest_id} replied {:?}", req.status),
                    Err(AppError::StateConflict(msg)) => {
                        last_err = Some(AppError::StateConflict(msg));
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            return event
                .guest_entry(guest_id)
                .cloned()
                .ok_or_else(|| workflow::WorkflowError::GuestNotInEvent(guest_id).into());
        }
        Err(last_err.unwrap_or_else(|| AppError::InternalError("Failed to save reply".into())))
    }

    /// 嘉宾条目 + 嘉宾资料（按嘉宾列表顺序）
    pub async fn list_guests(&self, id: Uuid) -> AppResult<Vec<EventGuestView>> {
        let event = self.get_event(id).await?;
        self.join_guests(event.guests).await
    }

    /// 已签到的嘉宾
    pub async fn list_participants(&self, id: Uuid) -> AppResult<Vec<EventGuestView>> {
        let event = self.get_event(id).await?;
        let checked_in = event.guests.into_iter().filter(|g| g.checked_in).collect();
        self.join_guests(checked_in).await
    }

    async fn join_guests(&self, entries: Vec<EventGuest>) -> AppResult<Vec<EventGuestView>> {
        let ids: Vec<Uuid> = entries.iter().map(|g| g.guest_id).collect();
        let mut guests: HashMap<Uuid, Guest> = self
            .store
            .find_guests(&ids)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();
        Ok(entries
            .into_iter()
            .map(|entry| EventGuestView {
                guest: guests.remove(&entry.guest_id),
                entry,
            })
            .collect())
    }

    /// 添加嘉宾:
    /// - 按邮箱 upsert 嘉宾资料
    /// - employee 类型必须关联已存在的员工，external 类型不能关联员工
    /// - 新加入名单时发送带签到码的邀请
    pub async fn add_guest(&self, id: Uuid, req: AddGuestRequest) -> AppResult<EventGuestView> {
        let name = require_text("name", &req.name)?;
        let email = normalize_email(&req.email);
        validate_email(&email)?;

        match (req.guest_type, req.employee_id) {
            (GuestType::Employee, None) => {
                return Err(AppError::InvalidInput(
                    "employee_id is required for employee guests".into(),
                ));
            }
            (GuestType::Employee, Some(employee_id)) => {
                if self.store.find_employee(employee_id).await?.is_none() {
                    return Err(AppError::NotFound(format!("Employee {employee_id} not found")));
                }
            }
            (GuestType::External, Some(_)) => {
                return Err(AppError::InvalidInput(
                    "external guests cannot reference an employee".into(),
                ));
            }
            (GuestType::External, None) => {}
        }

        // 先确认活动存在，避免产生孤立的嘉宾资料
        self.get_event(id).await?;

        let now = Utc::now();
        let guest = self
            .store
            .upsert_guest(&Guest {
                id: Uuid::new_v4(),
                name,
                email,
                phone: req.phone,
                organization: req.organization,
                guest_type: req.guest_type,
                employee_id: req.employee_id,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let mut last_err = None;
        for _ in 0..SAVE_ATTEMPTS {
            let mut event = self.get_event(id).await?;
            if let Some(entry) = event.guest_entry(guest.id) {
                return Ok(EventGuestView {
                    entry: entry.clone(),
                    guest: Some(guest),
                });
            }

            let entry = EventGuest::invited(guest.id);
            event.guests.push(entry.clone());
            match self.store.save_event(&mut event).await {
                Ok(()) => {
                    let code = CheckInPayload::for_event(event.id, guest.id).encode();
                    self.notifier
                        .send_event_invitation(&guest, &event, &code)
                        .await;
                    log::info!("Event {id}: guest {} invited", guest.id);
                    return Ok(EventGuestView {
                        entry,
                        guest: Some(guest),
                    });
                }
                Err(AppError::StateConflict(msg)) => last_err = Some(AppError::StateConflict(msg)),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::InternalError("Failed to add guest".into())))
    }

    pub async fn remind_guest(&self, id: Uuid, guest_id: Uuid) -> AppResult<()> {
        let event = self.get_event(id).await?;
        if event.guest_entry(guest_id).is_none() {
            return Err(workflow::WorkflowError::GuestNotInEvent(guest_id).into());
        }
        let guest = self
            .store
            .find_guest(guest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Guest {guest_id} not found")))?;
        if !self.notifier.send_event_reminder(&guest, &event).await {
            return Err(AppError::ExternalApiError("Failed to send reminder".into()));
        }
        Ok(())
    }

    /// 单人签到（guest_id 与 employee_id 二选一）
    pub async fn check_in(&self, id: Uuid, req: CheckInRequest) -> AppResult<CheckInResponse> {
        let subject = CheckInSubject::from_ids(req.guest_id, req.employee_id)?;
        self.check_in_subject(id, subject).await
    }

    /// 扫码签到：签到码必须属于本活动（或本活动绑定的抽奖）
    pub async fn scan_check_in(
        &self,
        id: Uuid,
        req: ScanCheckInRequest,
    ) -> AppResult<CheckInResponse> {
        let payload = CheckInPayload::decode(&req.payload)?;
        let event = self.get_event(id).await?;
        if let Err(e) = payload.ensure_belongs_to(event.id, event.raffle_id) {
            log::warn!("Event {id}: rejected foreign check-in code");
            return Err(e);
        }
        let subject = payload.subject()?;
        self.check_in_subject(id, subject).await
    }

    /// 批量签到：已签到或不在名单中的员工被跳过，返回新签到的数量
    pub async fn bulk_check_in(
        &self,
        id: Uuid,
        req: BulkCheckInRequest,
    ) -> AppResult<BulkCheckInResponse> {
        if req.employee_ids.is_empty() {
            return Err(AppError::InvalidInput("employee_ids must not be empty".into()));
        }

        let event = self.get_event(id).await?;
        let guests = self.event_guests(&event).await?;
        let guest_ids = workflow::guest_ids_for_employees(&event, &guests, &req.employee_ids);

        let (event, newly) = self.apply_check_ins(id, &guest_ids).await?;
        let employees: Vec<Uuid> = guests
            .iter()
            .filter(|g| newly.contains(&g.id))
            .filter_map(Guest::linked_employee)
            .collect();
        self.link_raffle_attendance(event.raffle_id, &employees).await;

        log::info!(
            "Event {id}: bulk check-in of {} employees, {} newly checked in",
            req.employee_ids.len(),
            newly.len()
        );
        Ok(BulkCheckInResponse { count: newly.len() })
    }

    async fn check_in_subject(
        &self,
        id: Uuid,
        subject: CheckInSubject,
    ) -> AppResult<CheckInResponse> {
        let event = self.get_event(id).await?;
        let guests = self.event_guests(&event).await?;

        let guest_id = match subject {
            CheckInSubject::Guest(guest_id) => guest_id,
            CheckInSubject::Employee(employee_id) => guests
                .iter()
                .find(|g| g.linked_employee() == Some(employee_id))
                .map(|g| g.id)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Employee {employee_id} is not on the guest list of event {id}"
                    ))
                })?,
        };

        let (event, newly) = self.apply_check_ins(id, &[guest_id]).await?;
        let newly_checked_in = !newly.is_empty();

        let mut raffle_attendance_updated = false;
        if newly_checked_in {
            let employee = guests
                .iter()
                .find(|g| g.id == guest_id)
                .and_then(Guest::linked_employee);
            if let Some(employee_id) = employee {
                raffle_attendance_updated = self
                    .link_raffle_attendance(event.raffle_id, &[employee_id])
                    .await;
            }
            log::info!("Event {id}: guest {guest_id} checked in");
        }

        Ok(CheckInResponse {
            guest_id,
            newly_checked_in,
            raffle_attendance_updated,
            event,
        })
    }

    async fn event_guests(&self, event: &Event) -> AppResult<Vec<Guest>> {
        let ids: Vec<Uuid> = event.guests.iter().map(|g| g.guest_id).collect();
        self.store.find_guests(&ids).await
    }

    /// 标记签到并保存；返回最新的活动文档与本次新签到的 guest_id
    async fn apply_check_ins(&self, id: Uuid, guest_ids: &[Uuid]) -> AppResult<(Event, Vec<Uuid>)> {
        let mut last_err = None;
        for _ in 0..SAVE_ATTEMPTS {
            let mut event = self.get_event(id).await?;
            let now = Utc::now();
            let mut newly = Vec::new();
            for guest_id in guest_ids {
                if workflow::mark_checked_in(&mut event, *guest_id, now)? {
                    newly.push(*guest_id);
                }
            }
            if newly.is_empty() {
                return Ok((event, newly));
            }
            match self.store.save_event(&mut event).await {
                Ok(()) => return Ok((event, newly)),
                Err(AppError::StateConflict(msg)) => {
                    log::warn!("Event {id}: check-in save conflict, retrying");
                    last_err = Some(AppError::StateConflict(msg));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::InternalError("Failed to save check-in".into())))
    }

    /// 把签到同步到活动绑定的抽奖；失败只记录日志，签到结果不受影响
    async fn link_raffle_attendance(&self, raffle_id: Option<Uuid>, employee_ids: &[Uuid]) -> bool {
        let Some(raffle_id) = raffle_id else {
            return false;
        };
        if employee_ids.is_empty() {
            return false;
        }

        for attempt in 1..=SAVE_ATTEMPTS {
            let mut raffle = match self.store.find_raffle(raffle_id).await {
                Ok(Some(r)) => r,
                Ok(None) => {
                    log::warn!("Linked raffle {raffle_id} not found, attendance not updated");
                    return false;
                }
                Err(e) => {
                    log::error!("Failed to load raffle {raffle_id}: {e}");
                    return false;
                }
            };

            let mut changed = false;
            for employee_id in employee_ids {
                changed |= workflow::link_attendance(&mut raffle, *employee_id);
            }
            if !changed {
                return false;
            }

            match self.store.save_raffle(&mut raffle).await {
                Ok(()) => return true,
                Err(AppError::StateConflict(_)) => {
                    log::warn!("Raffle {raffle_id}: attendance update conflict (attempt {attempt})");
                }
                Err(e) => {
                    log::error!("Raffle {raffle_id}: failed to update attendance: {e}");
                    return false;
                }
            }
        }
        log::error!("Raffle {raffle_id}: gave up updating attendance after {SAVE_ATTEMPTS} attempts");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaffleConfig;
    use crate::external::RecordingTransport;
    use crate::models::{
        AddParticipantsRequest, CreateEmployeeRequest, CreateRaffleRequest, Employee,
        InvitationStatus,
    };
    use crate::services::{EmployeeService, RaffleService};
    use crate::store::{MemoryStore, RaffleStore};
    use chrono::{Duration, NaiveDate};
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        mail: Arc<RecordingTransport>,
        events: EventService,
        raffles: RaffleService,
        employees: EmployeeService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mail = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(mail.clone());
        Fixture {
            events: EventService::new(store.clone(), notifier.clone()),
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
                department: "Sales".into(),
                position: "Rep".into(),
                join_date: NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
                status: None,
                raffle_eligible: None,
                raffle_exclusion_reason: None,
            })
            .await
            .unwrap()
    }

    async fn gala(f: &Fixture) -> Event {
        f.events
            .create_event(CreateEventRequest {
                name: "Gala".into(),
                description: String::new(),
                date: Utc::now() + Duration::days(2),
                location: "Hall".into(),
            })
            .await
            .unwrap()
    }

    async fn invite_employee(f: &Fixture, event: &Event, employee: &Employee) -> Uuid {
        f.events
            .add_guest(
                event.id,
                AddGuestRequest {
                    name: employee.name.clone(),
                    email: employee.email.clone(),
                    phone: None,
                    organization: None,
                    guest_type: GuestType::Employee,
                    employee_id: Some(employee.id),
                },
            )
            .await
            .unwrap()
            .entry
            .guest_id
    }

    /// 活动 + 绑定抽奖 + 员工参与者
    async fn linked_setup(f: &Fixture, employee: &Employee) -> (Event, Uuid, Uuid) {
        let event = gala(f).await;
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
        f.raffles
            .add_participants(
                raffle.id,
                AddParticipantsRequest {
                    employee_ids: vec![employee.id],
                },
            )
            .await
            .unwrap();
        let guest_id = invite_employee(f, &event, employee).await;
        let event = f.events.get_event(event.id).await.unwrap();
        (event, raffle.id, guest_id)
    }

    #[tokio::test]
    async fn test_status_is_derived_on_create() {
        let f = fixture();
        let past = f
            .events
            .create_event(CreateEventRequest {
                name: "Kickoff".into(),
                description: String::new(),
                date: Utc::now() - Duration::days(10),
                location: "Hall".into(),
            })
            .await
            .unwrap();
        assert_eq!(past.status, crate::models::EventStatus::Completed);
        assert_eq!(gala(&f).await.status, crate::models::EventStatus::Upcoming);
    }

    #[tokio::test]
    async fn test_add_guest_validation_and_invitation() {
        let f = fixture();
        let event = gala(&f).await;

        let missing_employee = f
            .events
            .add_guest(
                event.id,
                AddGuestRequest {
                    name: "Bob".into(),
                    email: "bob@example.com".into(),
                    phone: None,
                    organization: None,
                    guest_type: GuestType::Employee,
                    employee_id: None,
                },
            )
            .await;
        assert!(matches!(missing_employee, Err(AppError::InvalidInput(_))));

        let external = AddGuestRequest {
            name: "Partner".into(),
            email: " Partner@Example.com ".into(),
            phone: Some("+1 555 0100".into()),
            organization: Some("Acme".into()),
            guest_type: GuestType::External,
            employee_id: None,
        };
        let first = f.events.add_guest(event.id, external.clone()).await.unwrap();
        let second = f.events.add_guest(event.id, external).await.unwrap();
        assert_eq!(first.entry.guest_id, second.entry.guest_id);

        let guests = f.events.list_guests(event.id).await.unwrap();
        assert_eq!(guests.len(), 1);
        assert_eq!(
            guests[0].guest.as_ref().unwrap().email,
            "partner@example.com"
        );

        // 只在首次加入名单时发送邀请
        let sent = f.mail.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body_text.contains(&first.entry.guest_id.to_string()));
    }

    #[tokio::test]
    async fn test_check_in_links_raffle_attendance_once() {
        let f = fixture();
        let employee = hire(&f, "E1").await;
        let (event, raffle_id, guest_id) = linked_setup(&f, &employee).await;

        let first = f
            .events
            .check_in(
                event.id,
                CheckInRequest {
                    guest_id: Some(guest_id),
                    employee_id: None,
                },
            )
            .await
            .unwrap();
        assert!(first.newly_checked_in);
        assert!(first.raffle_attendance_updated);
        let raffle = f.store.find_raffle(raffle_id).await.unwrap().unwrap();
        assert!(raffle.participant(employee.id).unwrap().attended);

        let stamp = first.event.guest_entry(guest_id).unwrap().check_in_time;
        let second = f
            .events
            .check_in(
                event.id,
                CheckInRequest {
                    guest_id: None,
                    employee_id: Some(employee.id),
                },
            )
            .await
            .unwrap();
        assert!(!second.newly_checked_in);
        assert!(!second.raffle_attendance_updated);
        assert_eq!(second.event.guest_entry(guest_id).unwrap().check_in_time, stamp);
        assert_eq!(second.event.checked_in_count(), 1);
    }

    #[tokio::test]
    async fn test_external_guest_never_links() {
        let f = fixture();
        let employee = hire(&f, "E1").await;
        let (event, raffle_id, _) = linked_setup(&f, &employee).await;

        let outsider = f
            .events
            .add_guest(
                event.id,
                AddGuestRequest {
                    name: "Vendor".into(),
                    email: "vendor@example.com".into(),
                    phone: None,
                    organization: None,
                    guest_type: GuestType::External,
                    employee_id: None,
                },
            )
            .await
            .unwrap();

        let res = f
            .events
            .check_in(
                event.id,
                CheckInRequest {
                    guest_id: Some(outsider.entry.guest_id),
                    employee_id: None,
                },
            )
            .await
            .unwrap();
        assert!(res.newly_checked_in);
        assert!(!res.raffle_attendance_updated);
        let raffle = f.store.find_raffle(raffle_id).await.unwrap().unwrap();
        assert!(!raffle.participant(employee.id).unwrap().attended);
    }

    #[tokio::test]
    async fn test_check_in_without_participant_still_succeeds() {
        let f = fixture();
        let enrolled = hire(&f, "E1").await;
        let walk_in = hire(&f, "E2").await;
        let (event, _, _) = linked_setup(&f, &enrolled).await;
        let guest_id = invite_employee(&f, &event, &walk_in).await;

        let res = f
            .events
            .check_in(
                event.id,
                CheckInRequest {
                    guest_id: Some(guest_id),
                    employee_id: None,
                },
            )
            .await
            .unwrap();
        assert!(res.newly_checked_in);
        assert!(!res.raffle_attendance_updated);
    }

    #[tokio::test]
    async fn test_scan_validates_event_context() {
        let f = fixture();
        let employee = hire(&f, "E1").await;
        let (event, raffle_id, guest_id) = linked_setup(&f, &employee).await;
        let other = gala(&f).await;

        let foreign = CheckInPayload::for_event(other.id, guest_id).encode();
        let err = f
            .events
            .scan_check_in(event.id, ScanCheckInRequest { payload: foreign })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(f.events.get_event(event.id).await.unwrap().checked_in_count(), 0);

        let garbage = f
            .events
            .scan_check_in(
                event.id,
                ScanCheckInRequest {
                    payload: "not a code".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(garbage, AppError::InvalidInput(_)));

        // 抽奖邀请中的签到码同样可用于绑定的活动
        let raffle_code = crate::models::raffle_check_in_code(raffle_id, employee.id);
        let res = f
            .events
            .scan_check_in(event.id, ScanCheckInRequest { payload: raffle_code })
            .await
            .unwrap();
        assert_eq!(res.guest_id, guest_id);
        assert!(res.raffle_attendance_updated);
    }

    #[tokio::test]
    async fn test_bulk_check_in_counts_new_transitions() {
        let f = fixture();
        let a = hire(&f, "A1").await;
        let b = hire(&f, "B1").await;
        let (event, raffle_id, _) = linked_setup(&f, &a).await;
        invite_employee(&f, &event, &b).await;

        let empty = f
            .events
            .bulk_check_in(event.id, BulkCheckInRequest { employee_ids: vec![] })
            .await;
        assert!(matches!(empty, Err(AppError::InvalidInput(_))));

        f.events
            .check_in(
                event.id,
                CheckInRequest {
                    guest_id: None,
                    employee_id: Some(b.id),
                },
            )
            .await
            .unwrap();

        let res = f
            .events
            .bulk_check_in(
                event.id,
                BulkCheckInRequest {
                    employee_ids: vec![a.id, b.id, Uuid::new_v4()],
                },
            )
            .await
            .unwrap();
        assert_eq!(res.count, 1);

        let raffle = f.store.find_raffle(raffle_id).await.unwrap().unwrap();
        assert!(raffle.participant(a.id).unwrap().attended);
        assert_eq!(f.events.list_participants(event.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_link_after_raffle_was_edited() {
        let f = fixture();
        let employee = hire(&f, "E1").await;
        let (event, raffle_id, guest_id) = linked_setup(&f, &employee).await;

        // 抽奖在签到前已被修改过，链接步骤必须基于最新版本保存
        let mut raffle = f.store.find_raffle(raffle_id).await.unwrap().unwrap();
        raffle.description = "updated".into();
        f.store.save_raffle(&mut raffle).await.unwrap();

        let res = f
            .events
            .check_in(
                event.id,
                CheckInRequest {
                    guest_id: Some(guest_id),
                    employee_id: None,
                },
            )
            .await
            .unwrap();
        assert!(res.raffle_attendance_updated);
    }

    #[tokio::test]
    async fn test_remind_guest() {
        let f = fixture();
        let employee = hire(&f, "E1").await;
        let (event, _, guest_id) = linked_setup(&f, &employee).await;

        f.events.remind_guest(event.id, guest_id).await.unwrap();
        let last = f.mail.sent().into_iter().last().unwrap();
        assert!(last.subject.starts_with("Reminder"));

        let err = f.events.remind_guest(event.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_event_rederives_status() {
        let f = fixture();
        let event = gala(&f).await;
        assert_eq!(event.status, crate::models::EventStatus::Upcoming);

        let moved = f
            .events
            .update_event(
                event.id,
                UpdateEventRequest {
                    date: Some(Utc::now() - Duration::days(7)),
                    location: Some("  Rooftop ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.status, crate::models::EventStatus::Completed);
        assert_eq!(moved.location, "Rooftop");
        assert_eq!(moved.name, "Gala");
        assert_eq!(moved.version, event.version + 1);

        let stored = f.events.get_event(event.id).await.unwrap();
        assert_eq!(stored.status, crate::models::EventStatus::Completed);

        let blank = f
            .events
            .update_event(
                event.id,
                UpdateEventRequest {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(blank, AppError::InvalidInput(_)));

        let missing = f
            .events
            .update_event(Uuid::new_v4(), UpdateEventRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_events_newest_first() {
        let f = fixture();
        let soon = gala(&f).await;
        let later = f
            .events
            .create_event(CreateEventRequest {
                name: "Summit".into(),
                description: String::new(),
                date: Utc::now() + Duration::days(30),
                location: "Hall".into(),
            })
            .await
            .unwrap();

        let ids: Vec<Uuid> = f.events.list_events().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![later.id, soon.id]);
    }

    #[tokio::test]
    async fn test_rsvp_updates_guest_entry() {
        let f = fixture();
        let employee = hire(&f, "E1").await;
        let event = gala(&f).await;
        let guest_id = invite_employee(&f, &event, &employee).await;

        let entry = f
            .events
            .update_rsvp(
                event.id,
                guest_id,
                UpdateRsvpRequest {
                    status: InvitationStatus::Confirmed,
                },
            )
            .await
            .unwrap();
        assert_eq!(entry.status, InvitationStatus::Confirmed);
        let stored = f.events.get_event(event.id).await.unwrap();
        assert_eq!(
            stored.guest_entry(guest_id).unwrap().status,
            InvitationStatus::Confirmed
        );

        // 回复不影响签到
        assert!(!stored.guest_entry(guest_id).unwrap().checked_in);

        let err = f
            .events
            .update_rsvp(
                event.id,
                Uuid::new_v4(),
                UpdateRsvpRequest {
                    status: InvitationStatus::Declined,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

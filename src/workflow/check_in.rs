use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use super::WorkflowError;
use crate::models::{Event, Guest, InvitationStatus, Raffle};

/// 将活动嘉宾标记为已签到
///
/// 返回 true 表示本次由未签到变为已签到；已签到的条目保持不变（包括签到时间），返回 false。
pub fn mark_checked_in(
    event: &mut Event,
    guest_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool, WorkflowError> {
    let entry = event
        .guests
        .iter_mut()
        .find(|g| g.guest_id == guest_id)
        .ok_or(WorkflowError::GuestNotInEvent(guest_id))?;

    if entry.checked_in {
        return Ok(false);
    }
    entry.checked_in = true;
    entry.check_in_time = Some(now);
    Ok(true)
}

/// 记录嘉宾的回复；状态确实变化时返回 true
pub fn set_invitation_status(
    event: &mut Event,
    guest_id: Uuid,
    status: InvitationStatus,
) -> Result<bool, WorkflowError> {
    let entry = event
        .guests
        .iter_mut()
        .find(|g| g.guest_id == guest_id)
        .ok_or(WorkflowError::GuestNotInEvent(guest_id))?;
    if entry.status == status {
        return Ok(false);
    }
    entry.status = status;
    Ok(true)
}

/// 把活动出席同步到抽奖参与者；只有状态确实发生变化时返回 true
pub fn link_attendance(raffle: &mut Raffle, employee_id: Uuid) -> bool {
    match raffle.participant_mut(employee_id) {
        Some(participant) if !participant.attended => {
            participant.attended = true;
            true
        }
        _ => false,
    }
}

/// 批量签到：把员工 ID 映射为本活动嘉宾列表中的 guest_id
///
/// 不在嘉宾列表中的员工被忽略；结果按嘉宾列表顺序排列且不重复。
pub fn guest_ids_for_employees(event: &Event, guests: &[Guest], employee_ids: &[Uuid]) -> Vec<Uuid> {
    let wanted: HashSet<Uuid> = employee_ids.iter().copied().collect();
    let matching: HashSet<Uuid> = guests
        .iter()
        .filter(|g| g.linked_employee().is_some_and(|e| wanted.contains(&e)))
        .map(|g| g.id)
        .collect();

    event
        .guests
        .iter()
        .map(|entry| entry.guest_id)
        .filter(|id| matching.contains(id))
        .collect()
}

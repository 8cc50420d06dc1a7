//! Check-in codes carried by QR codes.
//!
//! Two payload shapes are printed: event invitations carry `{eventId, guestId}`
//! and raffle invitations carry `{raffleId, employeeId}`. Keys stay camelCase so
//! codes already handed out keep scanning.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raffle_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Uuid>,
}

/// 签到对象：活动嘉宾或员工
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInSubject {
    Guest(Uuid),
    Employee(Uuid),
}

impl CheckInSubject {
    /// 请求体里 guest_id / employee_id 必须且只能提供一个
    pub fn from_ids(guest_id: Option<Uuid>, employee_id: Option<Uuid>) -> AppResult<Self> {
        match (guest_id, employee_id) {
            (Some(g), None) => Ok(CheckInSubject::Guest(g)),
            (None, Some(e)) => Ok(CheckInSubject::Employee(e)),
            (Some(_), Some(_)) => Err(AppError::InvalidInput(
                "Provide either guest_id or employee_id, not both".into(),
            )),
            (None, None) => Err(AppError::InvalidInput(
                "guest_id or employee_id is required".into(),
            )),
        }
    }
}

impl CheckInPayload {
    pub fn for_event(event_id: Uuid, guest_id: Uuid) -> Self {
        Self {
            event_id: Some(event_id),
            raffle_id: None,
            guest_id: Some(guest_id),
            employee_id: None,
        }
    }

    pub fn for_raffle(raffle_id: Uuid, employee_id: Uuid) -> Self {
        Self {
            event_id: None,
            raffle_id: Some(raffle_id),
            guest_id: None,
            employee_id: Some(employee_id),
        }
    }

    pub fn encode(&self) -> String {
        // 只包含 Option<Uuid> 字段，序列化不会失败
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw.trim())
            .map_err(|_| AppError::InvalidInput("This QR code is not valid for attendance".into()))
    }

    pub fn subject(&self) -> AppResult<CheckInSubject> {
        CheckInSubject::from_ids(self.guest_id, self.employee_id)
    }

    /// 校验签到码属于当前活动（或活动绑定的抽奖）
    pub fn ensure_belongs_to(&self, event_id: Uuid, event_raffle_id: Option<Uuid>) -> AppResult<()> {
        let matches = match (self.event_id, self.raffle_id) {
            (Some(eid), _) => eid == event_id,
            (None, Some(rid)) => event_raffle_id == Some(rid),
            (None, None) => false,
        };
        if matches {
            Ok(())
        } else {
            Err(AppError::InvalidInput(
                "This QR code belongs to a different event".into(),
            ))
        }
    }
}

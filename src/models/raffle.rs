use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::CheckInPayload;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl std::fmt::Display for RaffleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaffleStatus::Pending => write!(f, "pending"),
            RaffleStatus::Active => write!(f, "active"),
            RaffleStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrizeTier {
    Platinum,
    Gold,
    Silver,
    #[default]
    Bronze,
}

/// 奖品（内嵌在抽奖文档中）
/// - 声明顺序即发放顺序（与等级无关）
/// - 已领取的奖品不可修改名称 / 描述，也不可删除
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Prize {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tier: PrizeTier,
    /// 奖品价值（美分）
    #[serde(default)]
    pub value_cents: i64,
    #[serde(default)]
    pub claimed: bool,
    /// 领奖员工 ID
    pub winner: Option<Uuid>,
}

/// 抽奖参与者（内嵌在抽奖文档中）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Participant {
    pub employee_id: Uuid,
    #[serde(default)]
    pub attended: bool,
    #[serde(default)]
    pub won_prize: bool,
}

impl Participant {
    pub fn new(employee_id: Uuid) -> Self {
        Self {
            employee_id,
            attended: false,
            won_prize: false,
        }
    }
}

/// 抽奖文档
///
/// `current_winner` 非空即表示存在待确认的中奖者；`claim_deadline` 为服务端记录的
/// 领奖截止时间。`version` 用于整文档保存时的乐观并发控制。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Raffle {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub event_id: Option<Uuid>,
    pub status: RaffleStatus,
    pub prizes: Vec<Prize>,
    pub participants: Vec<Participant>,
    pub current_winner: Option<Uuid>,
    pub claim_deadline: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Raffle {
    pub fn new(name: String, description: String, event_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            event_id,
            status: RaffleStatus::Active,
            prizes: Vec::new(),
            participants: Vec::new(),
            current_winner: None,
            claim_deadline: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn participant(&self, employee_id: Uuid) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.employee_id == employee_id)
    }

    pub fn participant_mut(&mut self, employee_id: Uuid) -> Option<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.employee_id == employee_id)
    }

    pub fn prize_mut(&mut self, prize_id: Uuid) -> Option<&mut Prize> {
        self.prizes.iter_mut().find(|p| p.id == prize_id)
    }

    pub fn claimed_prize_count(&self) -> usize {
        self.prizes.iter().filter(|p| p.claimed).count()
    }

    pub fn has_unclaimed_prize(&self) -> bool {
        self.prizes.iter().any(|p| !p.claimed)
    }
}

// -----------------------------
// 请求 / 响应
// -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrizeInput {
    #[schema(example = "Noise-cancelling headphones")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tier: Option<PrizeTier>,
    #[serde(default)]
    pub value_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRaffleRequest {
    #[schema(example = "Year-end raffle")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub event_id: Option<Uuid>,
    #[serde(default)]
    pub prizes: Vec<PrizeInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddParticipantsRequest {
    pub employee_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkippedParticipant {
    pub employee_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddParticipantsResponse {
    pub added: Vec<Uuid>,
    pub skipped: Vec<SkippedParticipant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAttendanceRequest {
    pub employee_id: Uuid,
    pub attended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimRequest {
    /// true = 领奖，false = 放弃（倒计时结束或操作员手动放弃）
    pub claimed: bool,
}

/// 抽奖轮次的领奖状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClaimState {
    NoPendingWinner,
    WinnerPendingClaim {
        winner: Uuid,
        deadline: Option<DateTime<Utc>>,
    },
    /// 截止时间已过但尚未处理，下一次访问时按放弃处理
    ClaimExpired { winner: Uuid },
}

/// 领奖 / 放弃请求的处理结果
#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Claimed { winner: Uuid, prize: Prize },
    Forfeited { winner: Uuid },
    /// 领奖请求到达时窗口已过期，已按放弃处理
    Expired { winner: Uuid },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResponse {
    /// 中奖员工 ID
    pub winner: Uuid,
    pub claim_deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RaffleResponse {
    #[serde(flatten)]
    pub raffle: Raffle,
    pub claim_state: ClaimState,
    pub eligible_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReminderResponse {
    pub sent: usize,
}

/// 抽奖邀请中的签到码（{raffleId, employeeId}）
pub fn raffle_check_in_code(raffle_id: Uuid, employee_id: Uuid) -> String {
    CheckInPayload::for_raffle(raffle_id, employee_id).encode()
}

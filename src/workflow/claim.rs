use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::WorkflowError;
use crate::models::{ClaimOutcome, ClaimState, Prize, Raffle, RaffleStatus};

/// 当前领奖状态；截止时间已过的待确认中奖者视为 ClaimExpired
pub fn claim_state(raffle: &Raffle, now: DateTime<Utc>) -> ClaimState {
    match (raffle.current_winner, raffle.claim_deadline) {
        (None, _) => ClaimState::NoPendingWinner,
        (Some(winner), Some(deadline)) if now > deadline => ClaimState::ClaimExpired { winner },
        (Some(winner), deadline) => ClaimState::WinnerPendingClaim { winner, deadline },
    }
}

/// NoPendingWinner -> WinnerPendingClaim，返回领奖截止时间
pub fn begin_claim_window(
    raffle: &mut Raffle,
    winner: Uuid,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<DateTime<Utc>, WorkflowError> {
    if let Some(pending) = raffle.current_winner {
        return Err(WorkflowError::WinnerPending(pending));
    }
    if raffle.participant(winner).is_none() {
        return Err(WorkflowError::ParticipantNotFound(winner));
    }
    let deadline = now + window;
    raffle.current_winner = Some(winner);
    raffle.claim_deadline = Some(deadline);
    Ok(deadline)
}

/// WinnerPendingClaim -> Claimed
///
/// 发放声明顺序中第一个未领取的奖品。没有可发放奖品时返回 NoPrizesAvailable，
/// 文档保持不变（current_winner 仍然保留，等待操作员处理）。
/// 最后一个奖品被领取后抽奖自动结束。
pub fn claim_prize(raffle: &mut Raffle) -> Result<(Uuid, Prize), WorkflowError> {
    let winner = raffle
        .current_winner
        .ok_or(WorkflowError::NoPendingWinner)?;
    let prize = raffle
        .prizes
        .iter_mut()
        .find(|p| !p.claimed)
        .ok_or(WorkflowError::NoPrizesAvailable)?;

    prize.claimed = true;
    prize.winner = Some(winner);
    let prize = prize.clone();

    if let Some(participant) = raffle.participant_mut(winner) {
        participant.won_prize = true;
    }
    raffle.current_winner = None;
    raffle.claim_deadline = None;

    if !raffle.has_unclaimed_prize() {
        raffle.status = RaffleStatus::Completed;
    }
    Ok((winner, prize))
}

/// WinnerPendingClaim -> Forfeited
///
/// 只把中奖者移出本轮（attended = false），不标记 won_prize，重新签到后仍可被抽中。
pub fn forfeit_claim(raffle: &mut Raffle) -> Result<Uuid, WorkflowError> {
    let winner = raffle
        .current_winner
        .ok_or(WorkflowError::NoPendingWinner)?;
    if let Some(participant) = raffle.participant_mut(winner) {
        participant.attended = false;
    }
    raffle.current_winner = None;
    raffle.claim_deadline = None;
    Ok(winner)
}

/// 领奖窗口已过期则按放弃处理，返回被放弃的中奖者
pub fn expire_if_due(raffle: &mut Raffle, now: DateTime<Utc>) -> Option<Uuid> {
    match claim_state(raffle, now) {
        ClaimState::ClaimExpired { .. } => forfeit_claim(raffle).ok(),
        _ => None,
    }
}

/// 处理客户端的领奖 / 放弃请求
pub fn resolve_claim(
    raffle: &mut Raffle,
    claimed: bool,
    now: DateTime<Utc>,
) -> Result<ClaimOutcome, WorkflowError> {
    if let Some(winner) = expire_if_due(raffle, now) {
        return Ok(ClaimOutcome::Expired { winner });
    }
    if claimed {
        let (winner, prize) = claim_prize(raffle)?;
        Ok(ClaimOutcome::Claimed { winner, prize })
    } else {
        let winner = forfeit_claim(raffle)?;
        Ok(ClaimOutcome::Forfeited { winner })
    }
}

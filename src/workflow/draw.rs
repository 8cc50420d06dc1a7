use rand::Rng;

use super::{WorkflowError, eligible_participants};
use crate::models::{Participant, Raffle, RaffleStatus};

/// 从可抽奖名单中等概率选出一人（无副作用）
pub fn pick_winner<'a, R>(
    eligible: &[&'a Participant],
    rng: &mut R,
) -> Result<&'a Participant, WorkflowError>
where
    R: Rng + ?Sized,
{
    if eligible.is_empty() {
        return Err(WorkflowError::NoEligibleParticipants);
    }
    let index = rng.gen_range(0..eligible.len());
    Ok(eligible[index])
}

/// 抽奖:
/// 1. 已完成的抽奖不能再抽
/// 2. 仍有待确认的中奖者时不能再抽
/// 3. 筛选出席且未中奖的参与者并随机选出一人
///
/// 只返回中奖员工 ID，不修改抽奖文档；由调用方通过条件更新写入 current_winner。
pub fn draw_winner<R>(raffle: &Raffle, rng: &mut R) -> Result<uuid::Uuid, WorkflowError>
where
    R: Rng + ?Sized,
{
    if raffle.status == RaffleStatus::Completed {
        return Err(WorkflowError::RaffleCompleted);
    }
    if let Some(pending) = raffle.current_winner {
        return Err(WorkflowError::WinnerPending(pending));
    }
    let eligible = eligible_participants(&raffle.participants)?;
    let winner = pick_winner(&eligible, rng)?;
    Ok(winner.employee_id)
}

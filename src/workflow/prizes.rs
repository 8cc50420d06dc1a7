use uuid::Uuid;

use super::WorkflowError;
use crate::models::{Prize, PrizeInput, Raffle, RaffleStatus};

pub fn prize_from_input(input: PrizeInput) -> Prize {
    Prize {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
        tier: input.tier.unwrap_or_default(),
        value_cents: input.value_cents.unwrap_or(0),
        claimed: false,
        winner: None,
    }
}

/// 追加奖品（只允许进行中的抽奖）
pub fn add_prize(raffle: &mut Raffle, input: PrizeInput) -> Result<Prize, WorkflowError> {
    if raffle.status != RaffleStatus::Active {
        return Err(WorkflowError::RaffleNotActive);
    }
    let prize = prize_from_input(input);
    raffle.prizes.push(prize.clone());
    Ok(prize)
}

/// 修改未领取的奖品；id / claimed / winner 不变
pub fn update_prize(
    raffle: &mut Raffle,
    prize_id: Uuid,
    input: PrizeInput,
) -> Result<Prize, WorkflowError> {
    let prize = raffle
        .prize_mut(prize_id)
        .ok_or(WorkflowError::PrizeNotFound(prize_id))?;
    if prize.claimed {
        return Err(WorkflowError::PrizeClaimed(prize_id));
    }
    prize.name = input.name;
    prize.description = input.description;
    if let Some(tier) = input.tier {
        prize.tier = tier;
    }
    if let Some(value) = input.value_cents {
        prize.value_cents = value;
    }
    Ok(prize.clone())
}

pub fn remove_prize(raffle: &mut Raffle, prize_id: Uuid) -> Result<Prize, WorkflowError> {
    let index = raffle
        .prizes
        .iter()
        .position(|p| p.id == prize_id)
        .ok_or(WorkflowError::PrizeNotFound(prize_id))?;
    if raffle.prizes[index].claimed {
        return Err(WorkflowError::PrizeClaimed(prize_id));
    }
    Ok(raffle.prizes.remove(index))
}

/// 操作员手动结束抽奖；存在待确认中奖者时拒绝
pub fn complete_raffle(raffle: &mut Raffle) -> Result<(), WorkflowError> {
    if let Some(pending) = raffle.current_winner {
        return Err(WorkflowError::WinnerPending(pending));
    }
    raffle.status = RaffleStatus::Completed;
    Ok(())
}

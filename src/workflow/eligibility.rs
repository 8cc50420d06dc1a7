use super::WorkflowError;
use crate::models::Participant;

/// 出席且未中过奖的参与者才能进入下一轮抽奖
pub fn is_eligible(participant: &Participant) -> bool {
    participant.attended && !participant.won_prize
}

/// 按原顺序筛选可抽奖的参与者；为空时返回 NoEligibleParticipants
pub fn eligible_participants(
    participants: &[Participant],
) -> Result<Vec<&Participant>, WorkflowError> {
    let eligible: Vec<&Participant> = participants.iter().filter(|p| is_eligible(p)).collect();
    if eligible.is_empty() {
        return Err(WorkflowError::NoEligibleParticipants);
    }
    Ok(eligible)
}

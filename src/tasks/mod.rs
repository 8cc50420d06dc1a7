//! Background jobs.
//!
//! Currently only the claim-window sweep: raffles whose pending winner let the
//! claim deadline pass are moved back to "no pending winner" even when nobody
//! opens them. Call `spawn_all` once during startup.

use std::time::Duration;

use crate::services::RaffleService;

/// Spawn all background tasks (detached via `tokio::spawn`).
pub fn spawn_all(raffle_service: RaffleService, sweep_interval_secs: u64) {
    // 领奖超时清理
    {
        let svc = raffle_service.clone();
        let period = Duration::from_secs(sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match svc.expire_stale_claims().await {
                    Ok(n) if n > 0 => log::info!("Expired claim windows processed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to expire claim windows: {e:?}"),
                }
            }
        });
    }
}

use soroban_sdk::contracttype;

use crate::storage::PoolState;
use crate::ContractError;

/// Lifecycle of the reward period.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PeriodStatus {
    /// Never funded.
    Idle = 0,
    /// `now < period_finish`.
    Active = 1,
    /// `now >= period_finish` after at least one funding.
    Expired = 2,
}

/// Undistributed remainder of the running period, `(finish − now) × rate`.
/// Zero once the period has ended.
pub fn leftover(pool: &PoolState, now: u64) -> Result<i128, ContractError> {
    if now >= pool.period_finish {
        return Ok(0);
    }
    i128::from(pool.period_finish - now)
        .checked_mul(pool.reward_rate)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// The rate `notify_reward_amount(amount)` would set at `now`.
///
/// Once the period has ended the new amount is spread over a fresh
/// `rewards_duration`. Mid-period, the undistributed remainder of the current
/// period is rolled into the new one. Both branches floor.
pub fn next_reward_rate(pool: &PoolState, amount: i128, now: u64) -> Result<i128, ContractError> {
    if pool.rewards_duration == 0 {
        return Err(ContractError::InvalidDuration);
    }
    let duration = i128::from(pool.rewards_duration);

    Ok(amount
        .checked_add(leftover(pool, now)?)
        .ok_or(ContractError::ArithmeticOverflow)?
        / duration)
}

/// Obligations that survive a re-notify at `now`: everything owed except the
/// leftover, which the new rate takes over.
pub fn outstanding_obligations(pool: &PoolState, now: u64) -> Result<i128, ContractError> {
    let remaining = pool
        .reward_obligations
        .checked_sub(leftover(pool, now)?)
        .ok_or(ContractError::ArithmeticOverflow)?;
    Ok(remaining.max(0))
}

/// Reward balance not yet promised to anyone.
pub fn unreserved_balance(balance: i128, obligations: i128) -> i128 {
    balance.saturating_sub(obligations).max(0)
}

/// True if `rate` over a full `duration` is covered by `available`.
pub fn is_funded(rate: i128, available: i128, duration: u64) -> bool {
    if duration == 0 {
        return false;
    }
    rate <= available / i128::from(duration)
}

/// `reward_rate × rewards_duration`.
pub fn reward_for_duration(pool: &PoolState) -> Result<i128, ContractError> {
    pool.reward_rate
        .checked_mul(i128::from(pool.rewards_duration))
        .ok_or(ContractError::ArithmeticOverflow)
}

pub fn status(pool: &PoolState, now: u64) -> PeriodStatus {
    if pool.period_finish == 0 {
        PeriodStatus::Idle
    } else if now < pool.period_finish {
        PeriodStatus::Active
    } else {
        PeriodStatus::Expired
    }
}

impl PoolState {
    /// Start (or extend) a reward period. The caller must have checkpointed
    /// the pool at `now` and checked funding beforehand.
    ///
    /// The leftover of a running period is replaced by the full emission of
    /// the new one in `reward_obligations`.
    pub fn start_period(&mut self, reward_rate: i128, now: u64) -> Result<(), ContractError> {
        let finish = now
            .checked_add(self.rewards_duration)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let emission = reward_rate
            .checked_mul(i128::from(self.rewards_duration))
            .ok_or(ContractError::ArithmeticOverflow)?;
        let obligations = outstanding_obligations(self, now)?
            .checked_add(emission)
            .ok_or(ContractError::ArithmeticOverflow)?;

        self.reward_rate = reward_rate;
        self.last_update_time = now;
        self.period_finish = finish;
        self.reward_obligations = obligations;
        Ok(())
    }

    /// Drop `amount` from the obligations after it was paid out or proven
    /// unclaimable.
    pub fn release_obligation(&mut self, amount: i128) {
        self.reward_obligations = self.reward_obligations.saturating_sub(amount).max(0);
    }
}

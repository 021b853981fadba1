use soroban_sdk::{Env, I256};

use crate::storage::{AccountRewardState, PoolState};
use crate::ContractError;

/// Fixed-point scaling factor.
///
/// All reward-per-token values are multiplied by this constant before storage
/// to preserve sub-unit precision without floating-point arithmetic.
/// 10^18 leaves 18 decimal places; every division below floors.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

// ── Core reward engine ──────────────────────────────────────────────────────

/// `min(now, period_finish)`: accrual stops at the end of the period.
pub fn last_time_reward_applicable(now: u64, period_finish: u64) -> u64 {
    now.min(period_finish)
}

/// `a × b / divisor` with a 256-bit intermediate product, floored.
///
/// Any two `i128` factors fit in `I256`, so only the narrowing back to
/// `i128` can fail.
fn mul_div(env: &Env, a: i128, b: i128, divisor: i128) -> Result<i128, ContractError> {
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, divisor))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Cumulative reward per staked unit as of `applicable_until`.
///
/// ```text
/// Δrpt = (applicable_until − last_update) × reward_rate × PRECISION / total_staked
/// rpt  = stored + Δrpt
/// ```
///
/// When `total_staked` is zero the stored value is returned unchanged, so an
/// empty pool never divides by zero and emits nothing.
pub fn compute_reward_per_token(
    env: &Env,
    stored: i128,
    reward_rate: i128,
    applicable_until: u64,
    last_update: u64,
    total_staked: i128,
) -> Result<i128, ContractError> {
    if total_staked <= 0 {
        return Ok(stored);
    }

    // `last_update` is always a previous `applicable_until`, so this never
    // clamps in practice.
    let elapsed = i128::from(applicable_until.saturating_sub(last_update));

    // elapsed < 2^64, so elapsed × rate stays below 2^191 and the product
    // with PRECISION below 2^251.
    let scaled_rate = I256::from_i128(env, elapsed)
        .mul(&I256::from_i128(env, reward_rate))
        .mul(&I256::from_i128(env, PRECISION));
    let delta = scaled_rate
        .div(&I256::from_i128(env, total_staked))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)?;

    stored
        .checked_add(delta)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Total reward owed to one account.
///
/// ```text
/// earned = staked × (current_rpt − user_rpt_paid) / PRECISION + user_rewards
/// ```
///
/// The subtraction isolates the accumulation since the account's last
/// checkpoint, so nothing is counted twice.
pub fn earned(
    env: &Env,
    staked: i128,
    current_rpt: i128,
    user_rpt_paid: i128,
    user_rewards: i128,
) -> Result<i128, ContractError> {
    let delta = current_rpt
        .checked_sub(user_rpt_paid)
        .ok_or(ContractError::ArithmeticOverflow)?;
    let new_rewards = mul_div(env, staked, delta, PRECISION)?;

    user_rewards
        .checked_add(new_rewards)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Reward emitted into an empty pool between `last_update` and
/// `applicable_until`. Nobody can ever claim it.
pub fn unallocated_reward(
    reward_rate: i128,
    applicable_until: u64,
    last_update: u64,
    total_staked: i128,
) -> Result<i128, ContractError> {
    if total_staked > 0 {
        return Ok(0);
    }
    i128::from(applicable_until.saturating_sub(last_update))
        .checked_mul(reward_rate)
        .ok_or(ContractError::ArithmeticOverflow)
}

// ── Pool-level wrappers ─────────────────────────────────────────────────────

impl PoolState {
    pub fn last_time_reward_applicable(&self, now: u64) -> u64 {
        last_time_reward_applicable(now, self.period_finish)
    }

    pub fn reward_per_token(&self, env: &Env, now: u64) -> Result<i128, ContractError> {
        compute_reward_per_token(
            env,
            self.reward_per_token_stored,
            self.reward_rate,
            self.last_time_reward_applicable(now),
            self.last_update_time,
            self.total_staked,
        )
    }

    pub fn earned(
        &self,
        env: &Env,
        now: u64,
        staked: i128,
        account: &AccountRewardState,
    ) -> Result<i128, ContractError> {
        earned(
            env,
            staked,
            self.reward_per_token(env, now)?,
            account.reward_per_token_paid,
            account.rewards,
        )
    }

    /// Checkpoint the global accumulator and, if given, one account.
    ///
    /// Must run before any mutation of stake balances or the reward rate:
    /// the checkpoint is taken against the pre-mutation stake and window.
    /// Reward emitted while the pool was empty is released from
    /// `reward_obligations`. Nothing is modified if an overflow is reported.
    pub fn update_reward(
        &mut self,
        env: &Env,
        now: u64,
        account: Option<(i128, &mut AccountRewardState)>,
    ) -> Result<(), ContractError> {
        let rpt = self.reward_per_token(env, now)?;
        let applicable = self.last_time_reward_applicable(now);
        let unallocated = unallocated_reward(
            self.reward_rate,
            applicable,
            self.last_update_time,
            self.total_staked,
        )?;

        if let Some((staked, state)) = account {
            let rewards = earned(env, staked, rpt, state.reward_per_token_paid, state.rewards)?;
            state.rewards = rewards;
            state.reward_per_token_paid = rpt;
        }

        self.reward_per_token_stored = rpt;
        self.last_update_time = applicable;
        self.release_obligation(unallocated);
        Ok(())
    }
}

// ── Unit tests ──────────────────────────────────────────────────────────────

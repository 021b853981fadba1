#![no_std]

pub mod events;
pub mod period;
pub mod rewards;
pub mod storage;

use common::ownership;
use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

pub use period::PeriodStatus;
pub use storage::{AccountRewardState, PoolConfig, PoolState, DEFAULT_REWARDS_DURATION};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    PermissionDenied = 3,
    InvalidAmount = 4,
    InsufficientStaked = 5,
    InsufficientAllowance = 6,
    InsufficientBalance = 7,
    InsufficientRewardFunding = 8,
    PeriodNotFinished = 9,
    ArithmeticOverflow = 10,
    TokensIdentical = 11,
    InvalidDuration = 12,
    CannotRecoverStakeToken = 13,
}

impl ContractError {
    /// Human-readable reason, for off-chain tooling and logs.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotInitialized => "contract not initialized",
            Self::AlreadyInitialized => "contract already initialized",
            Self::PermissionDenied => "Not owner",
            Self::InvalidAmount => "invalid amount",
            Self::InsufficientStaked => "withdraw amount exceeds staked balance",
            Self::InsufficientAllowance => "insufficient allowance",
            Self::InsufficientBalance => "insufficient balance",
            Self::InsufficientRewardFunding => "provided reward too high",
            Self::PeriodNotFinished => {
                "previous rewards period must be complete before changing the duration for the new period"
            }
            Self::ArithmeticOverflow => "arithmetic overflow",
            Self::TokensIdentical => "stake and reward tokens must differ",
            Self::InvalidDuration => "rewards duration must be greater than zero",
            Self::CannotRecoverStakeToken => "cannot withdraw the staking token",
        }
    }
}

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Snapshot of an account's position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub staked: i128,
    pub earned: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingRewardsContract;

#[contractimpl]
impl StakingRewardsContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `owner`        – the only identity allowed to fund or reconfigure.
    /// * `stake_token`  – SAC address of the token users stake.
    /// * `reward_token` – SAC address of the token distributed as rewards.
    ///
    /// The pool starts idle with a 7-day `rewards_duration`.
    pub fn initialize(
        env: Env,
        owner: Address,
        stake_token: Address,
        reward_token: Address,
    ) -> Result<(), ContractError> {
        if storage::has_config(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        owner.require_auth();

        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if !ownership::set_owner(&env, &owner) {
            return Err(ContractError::AlreadyInitialized);
        }

        storage::save_config(
            &env,
            &PoolConfig {
                stake_token: stake_token.clone(),
                reward_token: reward_token.clone(),
            },
        );
        // total_staked, rate, period_finish, last_update and RPT start at zero.
        storage::save_pool(&env, &PoolState::new(DEFAULT_REWARDS_DURATION));

        events::publish_initialized(
            &env,
            owner,
            stake_token,
            reward_token,
            DEFAULT_REWARDS_DURATION,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// The staker must have approved the pool for at least `amount`. The
    /// reward checkpoint is taken against the pre-deposit balance so the new
    /// tokens never earn retroactively.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        // 1. Make sure the pull will succeed before touching any state.
        let stake_token = token::Client::new(&env, &config.stake_token);
        let pool_address = env.current_contract_address();
        if stake_token.allowance(&staker, &pool_address) < amount {
            return Err(ContractError::InsufficientAllowance);
        }
        if stake_token.balance(&staker) < amount {
            return Err(ContractError::InsufficientBalance);
        }

        // 2. Checkpoint, then grow the balances.
        let mut pool = Self::pool(&env)?;
        let prev_stake = storage::staked_of(&env, &staker);
        let mut account = storage::reward_state_of(&env, &staker);
        pool.update_reward(&env, Self::now(&env), Some((prev_stake, &mut account)))?;

        let new_stake = prev_stake
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        // 3. Commit, then pull the tokens (checks-effects-interactions).
        storage::set_reward_state(&env, &staker, &account);
        storage::set_staked(&env, &staker, new_stake);
        storage::save_pool(&env, &pool);

        stake_token.transfer_from(&pool_address, &staker, &pool_address, &amount);

        events::publish_staked(&env, staker, amount, pool.total_staked);

        Ok(())
    }

    /// Return `amount` staked tokens to `staker`.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::config(&env)?;
        staker.require_auth();

        Self::withdraw_stake(&env, &config, &staker, amount)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything `staker` has accrued.
    ///
    /// Returns the amount paid. Nothing pending is a successful no-op
    /// returning zero.
    pub fn get_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::config(&env)?;
        staker.require_auth();

        Self::pay_reward(&env, &config, &staker)
    }

    /// Withdraw the full stake and claim all rewards in one call.
    ///
    /// Returns the reward paid.
    pub fn exit(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::config(&env)?;
        staker.require_auth();

        let staked = storage::staked_of(&env, &staker);
        Self::withdraw_stake(&env, &config, &staker, staked)?;
        Self::pay_reward(&env, &config, &staker)
    }

    // ── Owner functions ──────────────────────────────────────────────────────

    /// Fund a reward period with `amount` reward tokens.
    ///
    /// The tokens must already be held by the pool. If the period is still
    /// running, its undistributed remainder is rolled into the new period.
    /// Fails with `InsufficientRewardFunding` if the part of the pool's reward
    /// balance not already owed to stakers cannot cover the resulting rate
    /// for a full duration.
    pub fn notify_reward_amount(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let config = Self::config(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = Self::now(&env);
        let mut pool = Self::pool(&env)?;

        // Flush accumulator at the old rate before changing it.
        pool.update_reward(&env, now, None)?;

        let new_rate = period::next_reward_rate(&pool, amount, now)?;
        let balance = token::Client::new(&env, &config.reward_token)
            .balance(&env.current_contract_address());
        let available =
            period::unreserved_balance(balance, period::outstanding_obligations(&pool, now)?);
        if !period::is_funded(new_rate, available, pool.rewards_duration) {
            return Err(ContractError::InsufficientRewardFunding);
        }

        pool.start_period(new_rate, now)?;
        storage::save_pool(&env, &pool);

        log!(&env, "reward period funded", new_rate, pool.period_finish);
        events::publish_reward_added(&env, amount, new_rate, pool.period_finish);

        Ok(())
    }

    /// Change the length of future reward periods.
    ///
    /// Only allowed while no period is running.
    pub fn set_rewards_duration(
        env: Env,
        caller: Address,
        new_duration: u64,
    ) -> Result<(), ContractError> {
        Self::config(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let now = Self::now(&env);
        let mut pool = Self::pool(&env)?;
        if now < pool.period_finish {
            return Err(ContractError::PeriodNotFinished);
        }
        if new_duration == 0 {
            return Err(ContractError::InvalidDuration);
        }

        pool.update_reward(&env, now, None)?;
        pool.rewards_duration = new_duration;
        storage::save_pool(&env, &pool);

        log!(&env, "rewards duration updated", new_duration);
        events::publish_rewards_duration_updated(&env, new_duration);

        Ok(())
    }

    /// Sweep tokens sent to the pool by mistake back to the owner.
    ///
    /// The stake token can never be recovered. Reward tokens can only be
    /// recovered down to what is still owed to stakers.
    pub fn recover_token(
        env: Env,
        caller: Address,
        token_address: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let config = Self::config(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if token_address == config.stake_token {
            return Err(ContractError::CannotRecoverStakeToken);
        }
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let client = token::Client::new(&env, &token_address);
        let pool_address = env.current_contract_address();
        let balance = client.balance(&pool_address);
        if token_address == config.reward_token {
            let mut pool = Self::pool(&env)?;
            pool.update_reward(&env, Self::now(&env), None)?;
            if period::unreserved_balance(balance, pool.reward_obligations) < amount {
                return Err(ContractError::InsufficientBalance);
            }
            storage::save_pool(&env, &pool);
        } else if balance < amount {
            return Err(ContractError::InsufficientBalance);
        }
        client.transfer(&pool_address, &caller, &amount);

        events::publish_recovered(&env, token_address, amount);

        Ok(())
    }

    /// Reward-token balance held by the pool. Owner only.
    pub fn get_rewards_balance(env: Env, caller: Address) -> Result<i128, ContractError> {
        let config = Self::config(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        Ok(token::Client::new(&env, &config.reward_token).balance(&env.current_contract_address()))
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Sum of all currently staked tokens.
    pub fn get_total_staked(env: Env) -> i128 {
        Self::pool_or_default(&env).total_staked
    }

    /// The account's current staked balance.
    pub fn get_staked(env: Env, staker: Address) -> i128 {
        storage::staked_of(&env, &staker)
    }

    /// Reward units emitted per second while the period runs.
    pub fn get_reward_rate(env: Env) -> i128 {
        Self::pool_or_default(&env).reward_rate
    }

    /// Length in seconds of the next reward period.
    pub fn get_rewards_duration(env: Env) -> u64 {
        Self::pool_or_default(&env).rewards_duration
    }

    /// Timestamp at which the current period stops emitting.
    pub fn get_period_finish(env: Env) -> u64 {
        Self::pool_or_default(&env).period_finish
    }

    /// Timestamp of the last global checkpoint.
    pub fn get_last_update_time(env: Env) -> u64 {
        Self::pool_or_default(&env).last_update_time
    }

    /// Reward-per-token as of the last checkpoint, scaled by 10^18.
    pub fn get_reward_per_token_stored(env: Env) -> i128 {
        Self::pool_or_default(&env).reward_per_token_stored
    }

    /// Reward units still promised to stakers, as of the last checkpoint.
    pub fn get_reward_obligations(env: Env) -> i128 {
        Self::pool_or_default(&env).reward_obligations
    }

    /// `min(now, period_finish)`.
    pub fn last_time_reward_applicable(env: Env) -> u64 {
        Self::pool_or_default(&env).last_time_reward_applicable(Self::now(&env))
    }

    /// Live reward-per-token, including accrual since the last checkpoint.
    pub fn reward_per_token(env: Env) -> Result<i128, ContractError> {
        Self::pool_or_default(&env).reward_per_token(&env, Self::now(&env))
    }

    /// Real-time pending rewards for `staker`, without mutating state.
    pub fn earned(env: Env, staker: Address) -> Result<i128, ContractError> {
        let staked = storage::staked_of(&env, &staker);
        let account = storage::reward_state_of(&env, &staker);
        Self::pool_or_default(&env).earned(&env, Self::now(&env), staked, &account)
    }

    /// Combined position of one account.
    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let staked = storage::staked_of(&env, &staker);
        let account = storage::reward_state_of(&env, &staker);
        let earned = Self::pool_or_default(&env).earned(&env, Self::now(&env), staked, &account)?;
        Ok(StakerInfo { staked, earned })
    }

    /// Total reward emitted over one full period at the current rate.
    pub fn get_reward_for_duration(env: Env) -> Result<i128, ContractError> {
        period::reward_for_duration(&Self::pool_or_default(&env))
    }

    /// The rate `notify_reward_amount(amount)` would set right now.
    pub fn preview_reward_rate(env: Env, amount: i128) -> Result<i128, ContractError> {
        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }
        period::next_reward_rate(&Self::pool(&env)?, amount, Self::now(&env))
    }

    /// Idle before the first funding, then Active or Expired.
    pub fn get_period_status(env: Env) -> PeriodStatus {
        period::status(&Self::pool_or_default(&env), Self::now(&env))
    }

    /// The immutable owner set at initialisation.
    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        ownership::get_owner(&env).ok_or(ContractError::NotInitialized)
    }

    /// Token users lock in the pool.
    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        Ok(Self::config(&env)?.stake_token)
    }

    /// Token paid out as rewards.
    pub fn get_reward_token(env: Env) -> Result<Address, ContractError> {
        Ok(Self::config(&env)?.reward_token)
    }

    /// True once `initialize` has succeeded.
    pub fn is_initialized(env: Env) -> bool {
        storage::has_config(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn now(env: &Env) -> u64 {
        env.ledger().timestamp()
    }

    fn config(env: &Env) -> Result<PoolConfig, ContractError> {
        storage::load_config(env).ok_or(ContractError::NotInitialized)
    }

    fn pool(env: &Env) -> Result<PoolState, ContractError> {
        storage::load_pool(env).ok_or(ContractError::NotInitialized)
    }

    fn pool_or_default(env: &Env) -> PoolState {
        storage::load_pool(env).unwrap_or_default()
    }

    /// Guard: revert if `caller` is not the owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
        if !ownership::is_owner(env, caller) {
            return Err(ContractError::PermissionDenied);
        }
        Ok(())
    }

    /// Checkpoint `staker`, shrink the balances, then push the tokens back.
    /// Authentication is done by the caller.
    fn withdraw_stake(
        env: &Env,
        config: &PoolConfig,
        staker: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let prev_stake = storage::staked_of(env, staker);
        if amount > prev_stake {
            return Err(ContractError::InsufficientStaked);
        }

        let mut pool = Self::pool(env)?;
        let mut account = storage::reward_state_of(env, staker);
        pool.update_reward(env, Self::now(env), Some((prev_stake, &mut account)))?;

        let new_stake = prev_stake - amount;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        storage::set_reward_state(env, staker, &account);
        storage::set_staked(env, staker, new_stake);
        storage::save_pool(env, &pool);

        token::Client::new(env, &config.stake_token).transfer(
            &env.current_contract_address(),
            staker,
            &amount,
        );

        events::publish_withdrawn(env, staker.clone(), amount, pool.total_staked);

        Ok(())
    }

    /// Checkpoint `staker` and pay out whatever is pending.
    /// Authentication is done by the caller.
    fn pay_reward(env: &Env, config: &PoolConfig, staker: &Address) -> Result<i128, ContractError> {
        let mut pool = Self::pool(env)?;
        let staked = storage::staked_of(env, staker);
        let mut account = storage::reward_state_of(env, staker);
        pool.update_reward(env, Self::now(env), Some((staked, &mut account)))?;

        let amount = account.rewards;
        let reward_token = token::Client::new(env, &config.reward_token);
        let pool_address = env.current_contract_address();
        if amount > 0 && reward_token.balance(&pool_address) < amount {
            return Err(ContractError::InsufficientBalance);
        }

        // Reset before transfer (checks-effects-interactions).
        if amount > 0 {
            account.rewards = 0;
            pool.release_obligation(amount);
        }
        storage::set_reward_state(env, staker, &account);
        storage::save_pool(env, &pool);

        if amount > 0 {
            reward_token.transfer(&pool_address, staker, &amount);
            events::publish_reward_paid(env, staker.clone(), amount);
        }

        Ok(amount)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_events;

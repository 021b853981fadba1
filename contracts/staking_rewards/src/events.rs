#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the pool is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub rewards_duration: u64,
    pub timestamp: u64,
}

/// Fired when an account deposits stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when an account takes stake back out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when accrued rewards are paid out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub staker: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when the owner funds a reward period.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardAddedEvent {
    pub amount: i128,
    pub reward_rate: i128,
    pub period_finish: u64,
    pub timestamp: u64,
}

/// Fired when the owner changes the length of future periods.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsDurationUpdatedEvent {
    pub new_duration: u64,
    pub timestamp: u64,
}

/// Fired when the owner sweeps stray tokens out of the pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoveredEvent {
    pub token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    stake_token: Address,
    reward_token: Address,
    rewards_duration: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            stake_token,
            reward_token,
            rewards_duration,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone()),
        WithdrawnEvent {
            staker,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_paid(env: &Env, staker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), staker.clone()),
        RewardPaidEvent {
            staker,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_added(env: &Env, amount: i128, reward_rate: i128, period_finish: u64) {
    env.events().publish(
        (symbol_short!("RWD_ADDED"),),
        RewardAddedEvent {
            amount,
            reward_rate,
            period_finish,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_duration_updated(env: &Env, new_duration: u64) {
    env.events().publish(
        (symbol_short!("DUR_UPD"),),
        RewardsDurationUpdatedEvent {
            new_duration,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_recovered(env: &Env, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RECOVERED"), token.clone()),
        RecoveredEvent {
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

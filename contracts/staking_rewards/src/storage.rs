use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage key constants ────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const POOL: Symbol = symbol_short!("POOL");

// Per-account persistent storage uses tuple keys:  (prefix, account)
const USER_STAKE: Symbol = symbol_short!("STK");
const USER_REWARD: Symbol = symbol_short!("RWD_ST");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Seconds in the default reward period (7 days).
pub const DEFAULT_REWARDS_DURATION: u64 = 604_800;

// ── Stored types ─────────────────────────────────────────────────────────────

/// Token pair fixed at initialisation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Token users lock in the pool.
    pub stake_token: Address,
    /// Token paid out as rewards. Funded by the owner.
    pub reward_token: Address,
}

/// Global accrual state of the pool.
///
/// Loaded once per call, mutated in memory, and written back as a unit
/// once every check of the call has passed.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    pub total_staked: i128,
    /// Reward units emitted per second across all stakers.
    pub reward_rate: i128,
    pub rewards_duration: u64,
    pub period_finish: u64,
    pub last_update_time: u64,
    /// Cumulative reward per staked unit, scaled by `rewards::PRECISION`.
    pub reward_per_token_stored: i128,
    /// Reward units promised to stakers and not yet paid out: the
    /// undistributed rest of the current period plus accrued, unclaimed
    /// rewards. Never below what the pool actually owes.
    pub reward_obligations: i128,
}

impl PoolState {
    pub fn new(rewards_duration: u64) -> Self {
        Self {
            rewards_duration,
            ..Self::default()
        }
    }
}

/// Per-account reward checkpoint.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountRewardState {
    /// `reward_per_token_stored` as of the account's last checkpoint.
    pub reward_per_token_paid: i128,
    /// Accrued, unclaimed reward.
    pub rewards: i128,
}

// ── Instance storage ─────────────────────────────────────────────────────────

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn load_config(env: &Env) -> Option<PoolConfig> {
    env.storage().instance().get(&CONFIG)
}

pub fn save_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&CONFIG, config);
}

pub fn load_pool(env: &Env) -> Option<PoolState> {
    env.storage().instance().get(&POOL)
}

pub fn save_pool(env: &Env, pool: &PoolState) {
    env.storage().instance().set(&POOL, pool);
}

// ── Persistent storage ───────────────────────────────────────────────────────

fn stake_key(account: &Address) -> (Symbol, Address) {
    (USER_STAKE, account.clone())
}

fn reward_key(account: &Address) -> (Symbol, Address) {
    (USER_REWARD, account.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn staked_of(env: &Env, account: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&stake_key(account))
        .unwrap_or(0)
}

pub fn set_staked(env: &Env, account: &Address, amount: i128) {
    let key = stake_key(account);
    env.storage().persistent().set(&key, &amount);
    extend_ttl(env, &key);
}

pub fn reward_state_of(env: &Env, account: &Address) -> AccountRewardState {
    env.storage()
        .persistent()
        .get(&reward_key(account))
        .unwrap_or_default()
}

pub fn set_reward_state(env: &Env, account: &Address, state: &AccountRewardState) {
    let key = reward_key(account);
    env.storage().persistent().set(&key, state);
    extend_ttl(env, &key);
}

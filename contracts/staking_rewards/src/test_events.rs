extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    xdr::{ContractEventBody, ContractEventV0, ScVal},
    Address, Env, IntoVal, Symbol, TryFromVal, Val, Vec,
};

use crate::events::{
    RewardAddedEvent, RewardPaidEvent, RewardsDurationUpdatedEvent, StakedEvent, WithdrawnEvent,
};
use crate::{StakingRewardsContract, StakingRewardsContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Env, StakingRewardsContractClient<'static>, Address, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let reward_token = env.register_stellar_asset_contract_v2(Address::generate(&env));

    let contract_id = env.register(StakingRewardsContract, ());
    let client = StakingRewardsContractClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    client.initialize(&owner, &stake_token.address(), &reward_token.address());

    (env, client, owner, stake_token.address(), reward_token.address())
}

fn mint_and_approve(
    env: &Env,
    client: &StakingRewardsContractClient,
    stake_token: &Address,
    staker: &Address,
    amount: i128,
) {
    StellarAssetClient::new(env, stake_token).mint(staker, &amount);
    TokenClient::new(env, stake_token).approve(
        staker,
        &client.address,
        &amount,
        &(env.ledger().sequence() + 10_000),
    );
}

fn to_scval<T: IntoVal<Env, Val>>(env: &Env, value: T) -> ScVal {
    let val: Val = value.into_val(env);
    ScVal::try_from_val(env, &val).unwrap()
}

fn topics_of<T: IntoVal<Env, Vec<Val>>>(env: &Env, topics: T) -> std::vec::Vec<ScVal> {
    let topics: Vec<Val> = topics.into_val(env);
    topics
        .iter()
        .map(|topic| ScVal::try_from_val(env, &topic).unwrap())
        .collect()
}

/// Bodies of the recorded events whose first topic is `name`.
fn events_named(env: &Env, name: Symbol) -> std::vec::Vec<ContractEventV0> {
    let first = to_scval(env, name);
    env.events()
        .all()
        .events()
        .iter()
        .filter_map(|event| {
            let ContractEventBody::V0(body) = &event.body;
            (body.topics.as_slice().first() == Some(&first)).then(|| body.clone())
        })
        .collect()
}

// ── Staking events ───────────────────────────────────────────────────────────

#[test]
fn test_stake_publishes_staked_event() {
    let (env, client, _owner, stake_token, _) = setup();
    let staker = Address::generate(&env);
    mint_and_approve(&env, &client, &stake_token, &staker, 1_000);

    env.ledger().set_timestamp(10);
    client.stake(&staker, &1_000);

    let staked = events_named(&env, symbol_short!("STAKED"));
    let body = staked.last().unwrap();
    assert_eq!(
        body.topics.as_slice(),
        topics_of(&env, (symbol_short!("STAKED"), staker.clone())).as_slice()
    );
    let expected = StakedEvent {
        staker: staker.clone(),
        amount: 1_000,
        new_total_staked: 1_000,
        timestamp: 10,
    };
    assert_eq!(body.data, to_scval(&env, expected));
}

#[test]
fn test_withdraw_publishes_withdrawn_event() {
    let (env, client, _owner, stake_token, _) = setup();
    let staker = Address::generate(&env);
    mint_and_approve(&env, &client, &stake_token, &staker, 1_000);
    client.stake(&staker, &1_000);

    env.ledger().set_timestamp(20);
    client.withdraw(&staker, &400);

    let withdrawn = events_named(&env, symbol_short!("WITHDRAWN"));
    let body = withdrawn.last().unwrap();
    assert_eq!(
        body.topics.as_slice(),
        topics_of(&env, (symbol_short!("WITHDRAWN"), staker.clone())).as_slice()
    );
    let expected = WithdrawnEvent {
        staker: staker.clone(),
        amount: 400,
        new_total_staked: 600,
        timestamp: 20,
    };
    assert_eq!(body.data, to_scval(&env, expected));
}

// ── Reward events ────────────────────────────────────────────────────────────

#[test]
fn test_get_reward_publishes_reward_paid_event() {
    let (env, client, owner, stake_token, reward_token) = setup();
    let staker = Address::generate(&env);
    mint_and_approve(&env, &client, &stake_token, &staker, 1_000);

    client.set_rewards_duration(&owner, &100);
    StellarAssetClient::new(&env, &reward_token).mint(&client.address, &1_000);
    client.notify_reward_amount(&owner, &1_000);
    client.stake(&staker, &1_000);

    env.ledger().set_timestamp(30);
    assert_eq!(client.get_reward(&staker), 300);

    let paid = events_named(&env, symbol_short!("RWD_PAID"));
    let body = paid.last().unwrap();
    assert_eq!(
        body.topics.as_slice(),
        topics_of(&env, (symbol_short!("RWD_PAID"), staker.clone())).as_slice()
    );
    let expected = RewardPaidEvent {
        staker: staker.clone(),
        amount: 300,
        timestamp: 30,
    };
    assert_eq!(body.data, to_scval(&env, expected));
}

#[test]
fn test_zero_reward_claim_publishes_no_reward_paid() {
    let (env, client, _owner, stake_token, _) = setup();
    let staker = Address::generate(&env);
    mint_and_approve(&env, &client, &stake_token, &staker, 1_000);
    client.stake(&staker, &1_000);

    env.ledger().set_timestamp(50);
    assert_eq!(client.get_reward(&staker), 0);

    assert!(events_named(&env, symbol_short!("RWD_PAID")).is_empty());
}

#[test]
fn test_notify_publishes_reward_added_event() {
    let (env, client, owner, _, reward_token) = setup();

    client.set_rewards_duration(&owner, &100);
    StellarAssetClient::new(&env, &reward_token).mint(&client.address, &1_057);

    env.ledger().set_timestamp(7);
    client.notify_reward_amount(&owner, &1_057);

    let added = events_named(&env, symbol_short!("RWD_ADDED"));
    let body = added.last().unwrap();
    let expected = RewardAddedEvent {
        amount: 1_057,
        reward_rate: 10,
        period_finish: 107,
        timestamp: 7,
    };
    assert_eq!(body.data, to_scval(&env, expected));
}

// ── Owner events ─────────────────────────────────────────────────────────────

#[test]
fn test_set_rewards_duration_publishes_duration_updated_event() {
    let (env, client, owner, _, _) = setup();

    env.ledger().set_timestamp(5);
    client.set_rewards_duration(&owner, &42);

    let updated = events_named(&env, symbol_short!("DUR_UPD"));
    let body = updated.last().unwrap();
    assert_eq!(
        body.topics.as_slice(),
        topics_of(&env, (symbol_short!("DUR_UPD"),)).as_slice()
    );
    let expected = RewardsDurationUpdatedEvent {
        new_duration: 42,
        timestamp: 5,
    };
    assert_eq!(body.data, to_scval(&env, expected));
}

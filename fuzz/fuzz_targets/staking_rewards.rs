#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use staking_rewards::{StakingRewardsContract, StakingRewardsContractClient};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { amount: u64 },
    Withdraw { amount: u64 },
    GetReward,
    Exit,
    Advance { secs: u32 },
    Notify { amount: u32 },
    SetDuration { duration: u32 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(StakingRewardsContract, ());
    let client = StakingRewardsContractClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    client.initialize(&owner, &stake_token, &reward_token);

    let mut users = vec![owner.clone()];
    for _ in 0..4 {
        users.push(Address::generate(&env));
    }
    for user in &users {
        StellarAssetClient::new(&env, &stake_token).mint(user, &i128::from(u64::MAX));
        TokenClient::new(&env, &stake_token).approve(
            user,
            &contract_id,
            &i128::from(u64::MAX),
            &(env.ledger().sequence() + 10_000),
        );
    }

    let mut last_rpt = 0i128;

    // Errors are expected; panics and broken invariants are not.
    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % users.len()];
        match action {
            FuzzAction::Stake { amount } => {
                let _ = client.try_stake(caller, &i128::from(amount));
            }
            FuzzAction::Withdraw { amount } => {
                let _ = client.try_withdraw(caller, &i128::from(amount));
            }
            FuzzAction::GetReward => {
                let _ = client.try_get_reward(caller);
            }
            FuzzAction::Exit => {
                let _ = client.try_exit(caller);
            }
            FuzzAction::Advance { secs } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now.saturating_add(u64::from(secs)));
            }
            FuzzAction::Notify { amount } => {
                StellarAssetClient::new(&env, &reward_token)
                    .mint(&contract_id, &i128::from(amount));
                let _ = client.try_notify_reward_amount(caller, &i128::from(amount));
            }
            FuzzAction::SetDuration { duration } => {
                let _ = client.try_set_rewards_duration(caller, &u64::from(duration));
            }
        }

        let sum: i128 = users.iter().map(|u| client.get_staked(u)).sum();
        assert_eq!(client.get_total_staked(), sum);

        if let Ok(Ok(rpt)) = client.try_reward_per_token() {
            assert!(rpt >= last_rpt);
            last_rpt = rpt;
        }
    }

    // Principal must always be withdrawable, whatever the reward history.
    for user in &users {
        let staked = client.get_staked(user);
        if staked > 0 {
            let result = client.try_withdraw(user, &staked);
            assert!(matches!(result, Ok(Ok(()))), "withdraw failed: {:?}", result);
        }
    }
    assert_eq!(client.get_total_staked(), 0);
    assert_eq!(TokenClient::new(&env, &stake_token).balance(&contract_id), 0);
});

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests driving the contract with random operation sequences.
//!
//! Invariants tested after every operation:
//! - `total_staked` equals the sum of every account's staked balance
//! - `reward_per_token` never decreases
//! - `earned` is never negative
//! - Rewards owed plus rewards paid never exceed rewards funded
//! - Rewards owed never exceed the recorded obligations, which the pool's
//!   reward balance always covers

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};
use staking_rewards::{StakingRewardsContract, StakingRewardsContractClient};

const STAKERS: usize = 3;
const DURATION: u64 = 1_000;

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    Stake { who: u8, amount: u16 },
    Withdraw { who: u8, amount: u16 },
    Claim { who: u8 },
    Exit { who: u8 },
    Advance { secs: u16 },
    Fund { amount: u32 },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Pool {
    env: Env,
    client: StakingRewardsContractClient<'static>,
    owner: Address,
    reward_token: Address,
    stakers: Vec<Address>,
    funded: i128,
}

fn setup() -> Pool {
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
    client.set_rewards_duration(&owner, &DURATION);

    let stakers: Vec<Address> = (0..STAKERS).map(|_| Address::generate(&env)).collect();
    for staker in &stakers {
        StellarAssetClient::new(&env, &stake_token).mint(staker, &1_000_000_000);
        TokenClient::new(&env, &stake_token).approve(
            staker,
            &contract_id,
            &1_000_000_000,
            &(env.ledger().sequence() + 10_000),
        );
    }

    Pool {
        env,
        client,
        owner,
        reward_token,
        stakers,
        funded: 0,
    }
}

impl Pool {
    fn staker(&self, who: u8) -> &Address {
        &self.stakers[usize::from(who) % STAKERS]
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Stake { who, amount } => {
                let _ = self.client.try_stake(self.staker(*who), &i128::from(*amount));
            }
            Op::Withdraw { who, amount } => {
                let _ = self
                    .client
                    .try_withdraw(self.staker(*who), &i128::from(*amount));
            }
            Op::Claim { who } => {
                let _ = self.client.try_get_reward(self.staker(*who));
            }
            Op::Exit { who } => {
                let _ = self.client.try_exit(self.staker(*who));
            }
            Op::Advance { secs } => {
                let now = self.env.ledger().timestamp();
                self.env.ledger().set_timestamp(now + u64::from(*secs));
            }
            Op::Fund { amount } => {
                let amount = i128::from(*amount);
                StellarAssetClient::new(&self.env, &self.reward_token)
                    .mint(&self.client.address, &amount);
                if self
                    .client
                    .try_notify_reward_amount(&self.owner, &amount)
                    .is_ok()
                {
                    self.funded += amount;
                }
            }
        }
    }

    fn paid_out(&self) -> i128 {
        let token = TokenClient::new(&self.env, &self.reward_token);
        self.stakers.iter().map(|s| token.balance(s)).sum()
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_ledger_invariants_hold(ops in proptest::collection::vec(any::<Op>(), 1..40)) {
        let mut pool = setup();
        let mut last_rpt = pool.client.reward_per_token();

        for op in &ops {
            pool.apply(op);

            let sum: i128 = pool.stakers.iter().map(|s| pool.client.get_staked(s)).sum();
            prop_assert_eq!(pool.client.get_total_staked(), sum);

            let rpt = pool.client.reward_per_token();
            prop_assert!(rpt >= last_rpt, "reward_per_token decreased after {:?}", op);
            last_rpt = rpt;

            let mut owed = 0i128;
            for staker in &pool.stakers {
                let e = pool.client.earned(staker);
                prop_assert!(e >= 0);
                owed += e;
            }
            prop_assert!(owed + pool.paid_out() <= pool.funded);

            let obligations = pool.client.get_reward_obligations();
            prop_assert!(owed <= obligations, "owed {} > obligations {}", owed, obligations);
            prop_assert!(obligations <= pool.client.get_rewards_balance(&pool.owner));
        }
    }

    #[test]
    fn prop_claim_twice_pays_once(amount in 1u16..=u16::MAX, secs in 1u16..=2_000) {
        let mut pool = setup();
        pool.apply(&Op::Fund { amount: 1_000_000 });
        pool.apply(&Op::Stake { who: 0, amount });
        pool.apply(&Op::Advance { secs });

        let staker = pool.staker(0).clone();
        let first = pool.client.get_reward(&staker);
        let second = pool.client.get_reward(&staker);

        prop_assert!(first > 0);
        prop_assert_eq!(second, 0);
        prop_assert_eq!(pool.paid_out(), first);
    }
}

//! Integration tests for the prize-linked savings pool.
//!
//! The pool, money market and block hash oracle each live in their own mock
//! dependencies. Messages the pool emits towards the market are executed
//! against the real money-market contract, and before every pool call the
//! pool's querier is re-synced with the market's and oracle's current answers
//! via `MockQuerier::update_wasm`.
//!
//! Run:
//! ```bash
//! cargo test -p prize-pool-integration-tests
//! ```

use std::collections::BTreeMap;

use cosmwasm_std::testing::{message_info, mock_env, mock_dependencies, MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    coins, from_json, to_json_binary, Addr, BankMsg, Binary, Coin, ContractResult, CosmosMsg,
    Decimal, Env, OwnedDeps, Response, SubMsg, SystemError, SystemResult, Uint128, WasmMsg,
    WasmQuery,
};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use prize_pool::msg::{PoolStateResponse, UserBalanceResponse};
use prize_pool::state::Draw;
use prize_pool::ContractError;
use prize_pool_common::entropy::entropy_from_u128;
use prize_pool_common::{derive_entropy, reward_digest, secret_commitment, DrawStatus};

type MockDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

// ─── Constants ───

const DENOM: &str = "uusd";
/// 1e-6 per block
const SUPPLY_RATE: u128 = 1_000_000_000_000;
const LOCK_BLOCKS: u64 = 10_000;
const REVEAL_WINDOW: u64 = 300;
const SIGNER_KEY: [u8; 32] = [0x5a; 32];
const SECRET: [u8; 32] = [0x3c; 32];

// ─── Helpers ───

fn addr(name: &str) -> Addr {
    MockApi::default().addr_make(name)
}

fn signing_key() -> SigningKey {
    SigningKey::from_slice(&SIGNER_KEY).unwrap()
}

fn sign(draw_id: u64, block_hash: &[u8; 32], secret: &[u8; 32]) -> Binary {
    let digest = reward_digest(draw_id, block_hash, secret);
    let signature: Signature = signing_key().sign_prehash(&digest).unwrap();
    Binary::from(signature.to_bytes().to_vec())
}

/// Block hash that yields `entropy == target` once XORed with `SECRET`.
fn hash_for_entropy(target: u128) -> [u8; 32] {
    derive_entropy(&entropy_from_u128(target), &SECRET)
}

/// Three contracts and the bank payouts they produce, at a shared height.
struct Chain {
    height: u64,
    pool: MockDeps,
    market: MockDeps,
    oracle: MockDeps,
    /// Funds paid out by the market, per recipient.
    wallets: BTreeMap<String, u128>,
}

impl Chain {
    fn new() -> Self {
        let mut chain = Chain {
            height: mock_env().block.height,
            pool: mock_dependencies(),
            market: mock_dependencies(),
            oracle: mock_dependencies(),
            wallets: BTreeMap::new(),
        };

        let admin = addr("admin");
        let env = chain.env();

        prize_pool_money_market::contract::instantiate(
            chain.market.as_mut(),
            env.clone(),
            message_info(&admin, &[]),
            prize_pool_money_market::msg::InstantiateMsg {
                denom: DENOM.to_string(),
                supply_rate_mantissa: Uint128::new(SUPPLY_RATE),
            },
        )
        .unwrap();

        prize_pool_block_hash_oracle::contract::instantiate(
            chain.oracle.as_mut(),
            env.clone(),
            message_info(&admin, &[]),
            prize_pool_block_hash_oracle::msg::InstantiateMsg {
                operators: vec![addr("operator").to_string()],
                retention_blocks: None,
            },
        )
        .unwrap();

        chain.sync_pool_querier();
        prize_pool::contract::instantiate(
            chain.pool.as_mut(),
            env,
            message_info(&admin, &[]),
            prize_pool::msg::InstantiateMsg {
                money_market: addr("market").to_string(),
                denom: DENOM.to_string(),
                fee_fraction: Decimal::percent(1),
                fee_beneficiary: Some(addr("treasury").to_string()),
                block_hash_oracle: addr("oracle").to_string(),
                signer_pubkey: Binary::from(
                    signing_key()
                        .verifying_key()
                        .to_encoded_point(true)
                        .as_bytes()
                        .to_vec(),
                ),
                lock_duration_blocks: LOCK_BLOCKS,
                reveal_window_blocks: REVEAL_WINDOW,
            },
        )
        .unwrap();

        chain
    }

    fn env(&self) -> Env {
        let mut env = mock_env();
        env.block.height = self.height;
        env
    }

    fn advance(&mut self, blocks: u64) {
        self.height += blocks;
    }

    fn pool_addr(&self) -> Addr {
        self.env().contract.address
    }

    /// Point the pool's querier at the market's and oracle's current answers.
    fn sync_pool_querier(&mut self) {
        let env = self.env();
        let market_balance = prize_pool_money_market::contract::query(
            self.market.as_ref(),
            env.clone(),
            prize_pool_money_market::msg::QueryMsg::BalanceOf {
                address: env.contract.address.to_string(),
            },
        )
        .unwrap();
        let supply_rate = prize_pool_money_market::contract::query(
            self.market.as_ref(),
            env.clone(),
            prize_pool_money_market::msg::QueryMsg::SupplyRateMantissa {},
        )
        .unwrap();

        let commit_block = prize_pool::state::POOL_STATE
            .may_load(self.pool.as_ref().storage)
            .unwrap()
            .and_then(|state| {
                prize_pool::state::DRAWS
                    .load(self.pool.as_ref().storage, state.current_draw_id)
                    .ok()
            })
            .and_then(|draw| draw.commit_block);
        let recorded_hash = commit_block.map(|height| {
            let bin = prize_pool_block_hash_oracle::contract::query(
                self.oracle.as_ref(),
                env.clone(),
                prize_pool_block_hash_oracle::msg::QueryMsg::BlockHash { height },
            )
            .unwrap();
            (height, bin)
        });

        let market = addr("market").to_string();
        let oracle = addr("oracle").to_string();
        self.pool.querier.update_wasm(move |query| match query {
            WasmQuery::Smart { contract_addr, msg } if *contract_addr == market => {
                let parsed: prize_pool::msg::MoneyMarketQueryMsg = from_json(msg).unwrap();
                let bin = match parsed {
                    prize_pool::msg::MoneyMarketQueryMsg::BalanceOf { .. } => {
                        market_balance.clone()
                    }
                    prize_pool::msg::MoneyMarketQueryMsg::SupplyRateMantissa {} => {
                        supply_rate.clone()
                    }
                };
                SystemResult::Ok(ContractResult::Ok(bin))
            }
            WasmQuery::Smart { contract_addr, msg } if *contract_addr == oracle => {
                let prize_pool::msg::OracleQueryMsg::BlockHash { height } =
                    from_json(msg).unwrap();
                let bin = match &recorded_hash {
                    Some((h, bin)) if *h == height => bin.clone(),
                    _ => to_json_binary(&None::<prize_pool::msg::BlockHashResponse>).unwrap(),
                };
                SystemResult::Ok(ContractResult::Ok(bin))
            }
            _ => SystemResult::Err(SystemError::UnsupportedRequest {
                kind: "wasm".to_string(),
            }),
        });
    }

    /// Run the pool's outgoing market messages against the market contract.
    fn dispatch(&mut self, messages: Vec<SubMsg>) {
        let market = addr("market").to_string();
        for sub in messages {
            match sub.msg {
                CosmosMsg::Wasm(WasmMsg::Execute {
                    contract_addr,
                    msg,
                    funds,
                }) if contract_addr == market => {
                    let parsed: prize_pool_money_market::msg::ExecuteMsg =
                        from_json(&msg).unwrap();
                    let env = self.env();
                    let info = message_info(&env.contract.address, &funds);
                    let res = prize_pool_money_market::contract::execute(
                        self.market.as_mut(),
                        env,
                        info,
                        parsed,
                    )
                    .unwrap();
                    self.pay_out(res);
                }
                other => panic!("unexpected pool message: {other:?}"),
            }
        }
    }

    fn pay_out(&mut self, res: Response) {
        for sub in res.messages {
            if let CosmosMsg::Bank(BankMsg::Send { to_address, amount }) = sub.msg {
                let paid: u128 = amount.iter().map(|c| c.amount.u128()).sum();
                *self.wallets.entry(to_address).or_default() += paid;
            }
        }
    }

    fn execute_pool(
        &mut self,
        sender: &str,
        funds: &[Coin],
        msg: prize_pool::msg::ExecuteMsg,
    ) -> Result<Response, ContractError> {
        self.sync_pool_querier();
        let env = self.env();
        let info = message_info(&addr(sender), funds);
        let res = prize_pool::contract::execute(self.pool.as_mut(), env, info, msg)?;
        self.dispatch(res.messages.clone());
        Ok(res)
    }

    fn deposit(&mut self, user: &str, amount: u128) {
        self.execute_pool(
            user,
            &coins(amount, DENOM),
            prize_pool::msg::ExecuteMsg::DepositPool {},
        )
        .unwrap();
    }

    fn withdraw(&mut self, user: &str) -> Result<Response, ContractError> {
        self.execute_pool(user, &[], prize_pool::msg::ExecuteMsg::WithdrawPool {})
    }

    fn commit(&mut self) {
        self.execute_pool(
            "admin",
            &[],
            prize_pool::msg::ExecuteMsg::Commit {
                secret_hash: hex::encode(secret_commitment(&SECRET)),
            },
        )
        .unwrap();
    }

    fn submit_block_hash(&mut self, height: u64, hash: &[u8; 32]) {
        let env = self.env();
        prize_pool_block_hash_oracle::contract::execute(
            self.oracle.as_mut(),
            env,
            message_info(&addr("operator"), &[]),
            prize_pool_block_hash_oracle::msg::ExecuteMsg::SubmitBlockHash {
                height,
                hash_hex: hex::encode(hash),
            },
        )
        .unwrap();
    }

    fn reward(&mut self, draw_id: u64, hash: &[u8; 32]) -> Result<Response, ContractError> {
        self.execute_pool(
            "admin",
            &[],
            prize_pool::msg::ExecuteMsg::RewardAndCommit {
                commit_block_hash: hex::encode(hash),
                secret: hex::encode(SECRET),
                signature: sign(draw_id, hash, &SECRET),
            },
        )
    }

    fn cancel(&mut self, sender: &str) -> Result<Response, ContractError> {
        self.execute_pool(sender, &[], prize_pool::msg::ExecuteMsg::CancelDraw {})
    }

    fn pool_state(&self) -> PoolStateResponse {
        let bin = prize_pool::contract::query(
            self.pool.as_ref(),
            self.env(),
            prize_pool::msg::QueryMsg::PoolState {},
        )
        .unwrap();
        from_json(bin).unwrap()
    }

    fn draw(&self, draw_id: u64) -> Draw {
        let bin = prize_pool::contract::query(
            self.pool.as_ref(),
            self.env(),
            prize_pool::msg::QueryMsg::Draw { draw_id },
        )
        .unwrap();
        from_json(bin).unwrap()
    }

    fn user_balance(&self, user: &str) -> UserBalanceResponse {
        let bin = prize_pool::contract::query(
            self.pool.as_ref(),
            self.env(),
            prize_pool::msg::QueryMsg::UserBalance {
                address: addr(user).to_string(),
            },
        )
        .unwrap();
        from_json(bin).unwrap()
    }

    fn market_balance_of_pool(&self) -> Uint128 {
        let bin = prize_pool_money_market::contract::query(
            self.market.as_ref(),
            self.env(),
            prize_pool_money_market::msg::QueryMsg::BalanceOf {
                address: self.pool_addr().to_string(),
            },
        )
        .unwrap();
        from_json(bin).unwrap()
    }

    fn wallet(&self, user: &str) -> u128 {
        self.wallets
            .get(addr(user).as_str())
            .copied()
            .unwrap_or_default()
    }
}

fn event_attr(res: &Response, ty: &str, key: &str) -> String {
    res.events
        .iter()
        .find(|e| e.ty == ty)
        .and_then(|e| e.attributes.iter().find(|a| a.key == key))
        .map(|a| a.value.clone())
        .unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_deposit_draw_withdraw_cycle() {
    let mut chain = Chain::new();

    // 1. Deposits during draw 1 are pending.
    chain.deposit("alice", 100_000_000);
    chain.deposit("bob", 300_000_000);
    let state = chain.pool_state();
    assert_eq!(state.pending_supply, Uint128::new(400_000_000));
    assert!(state.eligible_supply.is_zero());
    assert_eq!(chain.market_balance_of_pool(), Uint128::new(400_000_000));

    // 2. Bootstrap: draw 1 has nothing eligible, cancel it.
    let res = chain.cancel("admin").unwrap();
    assert_eq!(event_attr(&res, "Opened", "starting_total"), "400000000");

    // 3. Let interest accrue, then commit draw 2.
    chain.advance(LOCK_BLOCKS);
    chain.commit();
    let commit_block = chain.height;
    assert_eq!(chain.draw(2).status, DrawStatus::Committed);

    // 4. Reveal one block later. Entropy 150M lands in bob's range [100M, 400M).
    chain.advance(1);
    let hash = hash_for_entropy(150_000_000);
    chain.submit_block_hash(commit_block, &hash);
    let market_before = chain.market_balance_of_pool();
    let principal_before = chain.pool_state().total_supply;

    let res = chain.reward(2, &hash).unwrap();
    assert_eq!(event_attr(&res, "Rewarded", "winner"), addr("bob").to_string());

    let draw = chain.draw(2);
    assert_eq!(draw.status, DrawStatus::Rewarded);
    assert_eq!(draw.accrued_interest, market_before - principal_before);
    assert_eq!(draw.winnings + draw.fee, draw.accrued_interest);
    assert_eq!(draw.fee, draw.accrued_interest.multiply_ratio(1u128, 100u128));

    // Conservation: every unit the market holds for the pool is owed to someone.
    assert_eq!(chain.pool_state().total_supply, chain.market_balance_of_pool());
    assert_eq!(
        chain.user_balance("bob").eligible,
        Uint128::new(300_000_000) + draw.winnings
    );
    assert_eq!(chain.user_balance("treasury").sponsorship, draw.fee);

    // 5. Everyone exits in the same block.
    chain.withdraw("alice").unwrap();
    chain.withdraw("bob").unwrap();
    chain
        .execute_pool(
            "treasury",
            &[],
            prize_pool::msg::ExecuteMsg::WithdrawSponsorship { amount: None },
        )
        .unwrap();

    assert_eq!(chain.wallet("alice"), 100_000_000);
    assert_eq!(chain.wallet("bob"), 300_000_000 + draw.winnings.u128());
    assert_eq!(chain.wallet("treasury"), draw.fee.u128());
    assert!(chain.market_balance_of_pool().is_zero());
    assert!(chain.pool_state().total_supply.is_zero());
}

#[test]
fn test_locked_funds_and_late_deposits() {
    let mut chain = Chain::new();
    chain.deposit("alice", 50_000_000);
    chain.cancel("admin").unwrap();

    chain.advance(100);
    chain.commit();
    let commit_block = chain.height;

    // Alice's eligible funds are locked.
    let err = chain.withdraw("alice").unwrap_err();
    assert!(matches!(err, ContractError::DrawLocked { draw_id: 2 }));

    // Carol joins while draw 2 is committed and can leave again.
    chain.deposit("carol", 20_000_000);
    chain.withdraw("carol").unwrap();
    assert_eq!(chain.wallet("carol"), 20_000_000);

    // Dave stays; he is eligible only from draw 3.
    chain.deposit("dave", 30_000_000);
    assert_eq!(chain.user_balance("dave").pending, Uint128::new(30_000_000));

    chain.advance(1);
    let hash = [0x77u8; 32];
    chain.submit_block_hash(commit_block, &hash);
    let res = chain.reward(2, &hash).unwrap();
    assert_eq!(event_attr(&res, "Rewarded", "winner"), addr("alice").to_string());

    let dave = chain.user_balance("dave");
    assert_eq!(dave.eligible, Uint128::new(30_000_000));
    assert!(dave.pending.is_zero());
    assert_eq!(chain.draw(3).starting_total, chain.pool_state().eligible_supply);

    // Funds from the rewarded draw are free again.
    chain.withdraw("alice").unwrap();
    assert!(chain.wallet("alice") > 50_000_000);
    assert_eq!(chain.pool_state().total_supply, chain.market_balance_of_pool());
}

#[test]
fn test_expired_block_hash_is_recovered_by_cancellation() {
    let mut chain = Chain::new();
    chain.deposit("alice", 10_000_000);
    chain.cancel("admin").unwrap();

    chain.advance(500);
    chain.commit();
    let commit_block = chain.height;
    chain.advance(1);
    chain.submit_block_hash(commit_block, &[0x11; 32]);

    // The oracle keeps 256 blocks; the reveal window is longer.
    chain.advance(260);
    let err = chain.reward(2, &[0x11; 32]).unwrap_err();
    assert!(matches!(err, ContractError::BlockHashUnavailable { .. }));

    let err = chain.cancel("anyone").unwrap_err();
    assert!(matches!(err, ContractError::RevealWindowOpen { .. }));

    chain.advance(REVEAL_WINDOW);
    let res = chain.cancel("anyone").unwrap();
    assert_eq!(event_attr(&res, "DrawCancelled", "draw_id"), "2");
    assert_eq!(chain.draw(2).status, DrawStatus::Cancelled);
    assert_eq!(chain.draw(2).winner, None);

    // Interest from the cancelled draw rolls into draw 3's prize.
    chain.commit();
    let commit_block = chain.height;
    chain.advance(1);
    let hash = [0x22u8; 32];
    chain.submit_block_hash(commit_block, &hash);
    let expected_interest = chain.market_balance_of_pool() - chain.pool_state().total_supply;
    chain.reward(3, &hash).unwrap();

    let draw = chain.draw(3);
    assert_eq!(draw.accrued_interest, expected_interest);
    assert_eq!(draw.winner, Some(addr("alice")));
    assert_eq!(chain.pool_state().total_supply, chain.market_balance_of_pool());
}

#[test]
fn test_selection_matches_query() {
    let mut chain = Chain::new();
    chain.deposit("alice", 100);
    chain.deposit("bob", 300);
    chain.cancel("admin").unwrap();

    for (entropy, expected) in [(50u128, "alice"), (150, "bob"), (399, "bob")] {
        let bin = prize_pool::contract::query(
            chain.pool.as_ref(),
            chain.env(),
            prize_pool::msg::QueryMsg::CalculateWinner {
                entropy: hex::encode(entropy_from_u128(entropy)),
            },
        )
        .unwrap();
        let winner: Option<Addr> = from_json(bin).unwrap();
        assert_eq!(winner, Some(addr(expected)));
    }

    chain.advance(10);
    chain.commit();
    let commit_block = chain.height;
    chain.advance(1);
    let hash = hash_for_entropy(50);
    chain.submit_block_hash(commit_block, &hash);
    let res = chain.reward(2, &hash).unwrap();
    assert_eq!(event_attr(&res, "Rewarded", "winner"), addr("alice").to_string());
}

// ─── Mixed operation sequences ───

const SAVERS: [&str; 5] = ["alice", "bob", "carol", "dave", "erin"];
const ACTORS: [&str; 8] = [
    "anchor", "alice", "bob", "carol", "dave", "erin", "sponsor", "treasury",
];

/// xorshift64, so every run replays the same sequence.
struct Sequence(u64);

impl Sequence {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn amount(&mut self) -> u128 {
        1 + self.below(5_000_000) as u128
    }

    fn pick<'a>(&mut self, names: &[&'a str]) -> &'a str {
        names[self.below(names.len() as u64) as usize]
    }

    fn hash(&mut self) -> [u8; 32] {
        let mut hash = [0u8; 32];
        for chunk in hash.chunks_mut(8) {
            chunk.copy_from_slice(&self.next().to_be_bytes());
        }
        hash
    }
}

/// Every aggregate matches the per-user ledger, the market covers all
/// principal, and no value appears or disappears: what went in plus the
/// interest handed out equals what was paid out plus what is still owed.
fn assert_conserved(chain: &Chain, deposited: u128, step: &str) {
    let state = chain.pool_state();

    let mut eligible = Uint128::zero();
    let mut pending = Uint128::zero();
    let mut sponsorship = Uint128::zero();
    for actor in ACTORS {
        let balance = chain.user_balance(actor);
        eligible += balance.eligible;
        pending += balance.pending;
        sponsorship += balance.sponsorship;
    }
    assert_eq!(eligible, state.eligible_supply, "eligible after {step}");
    assert_eq!(pending, state.pending_supply, "pending after {step}");
    assert_eq!(sponsorship, state.sponsorship_supply, "sponsorship after {step}");
    assert_eq!(
        state.total_supply,
        eligible + pending + sponsorship,
        "total after {step}"
    );

    let paid_out: u128 = chain.wallets.values().sum();
    let awarded = (state.total_winnings_paid + state.total_fees_collected).u128();
    assert_eq!(
        deposited + awarded,
        paid_out + state.total_supply.u128(),
        "value after {step}"
    );
    assert!(
        chain.market_balance_of_pool() >= state.total_supply,
        "solvency after {step}"
    );
}

/// One random saver action. While a draw is committed, eligible funds must
/// stay locked.
fn saver_step(chain: &mut Chain, seq: &mut Sequence, deposited: &mut u128, committed: bool) {
    let user = seq.pick(&SAVERS);
    let balance = chain.user_balance(user);
    match seq.below(4) {
        2 if !balance.pending.is_zero() => {
            chain
                .execute_pool(user, &[], prize_pool::msg::ExecuteMsg::WithdrawPending {})
                .unwrap();
        }
        3 if committed && !balance.eligible.is_zero() => {
            let err = chain.withdraw(user).unwrap_err();
            assert!(matches!(err, ContractError::DrawLocked { .. }));
        }
        3 if !(balance.eligible + balance.pending).is_zero() => {
            chain.withdraw(user).unwrap();
        }
        _ => {
            let amount = seq.amount();
            chain.deposit(user, amount);
            *deposited += amount;
        }
    }
}

/// One random sponsorship action, topping up when there is nothing to take.
fn sponsor_step(chain: &mut Chain, seq: &mut Sequence, deposited: &mut u128) {
    let sponsor = seq.pick(&["sponsor", "treasury"]);
    let available = chain.user_balance(sponsor).sponsorship;
    if seq.below(2) == 0 && !available.is_zero() {
        let part = Uint128::new((available.u128() / 2).max(1));
        chain
            .execute_pool(
                sponsor,
                &[],
                prize_pool::msg::ExecuteMsg::WithdrawSponsorship { amount: Some(part) },
            )
            .unwrap();
    } else {
        let amount = seq.amount();
        chain
            .execute_pool(
                "sponsor",
                &coins(amount, DENOM),
                prize_pool::msg::ExecuteMsg::DepositSponsorship {},
            )
            .unwrap();
        *deposited += amount;
    }
}

#[test]
fn test_conservation_across_mixed_operations() {
    let mut chain = Chain::new();
    let mut seq = Sequence(0x9e37_79b9_7f4a_7c15);
    let mut deposited = 0u128;
    let mut rewarded = 0;
    let mut expired = 0;

    // The anchor never withdraws, so every draw has something eligible.
    chain.deposit("anchor", 1_000_000);
    deposited += 1_000_000;
    assert_conserved(&chain, deposited, "anchor deposit");
    chain.cancel("admin").unwrap();
    assert_conserved(&chain, deposited, "bootstrap");

    for round in 0..6u64 {
        for i in 0..8 {
            chain.advance(1 + seq.below(50));
            saver_step(&mut chain, &mut seq, &mut deposited, false);
            assert_conserved(&chain, deposited, &format!("round {round} open step {i}"));
        }
        for i in 0..2 {
            sponsor_step(&mut chain, &mut seq, &mut deposited);
            assert_conserved(&chain, deposited, &format!("round {round} sponsor step {i}"));
        }

        chain.advance(100 + seq.below(1_000));
        chain.commit();
        let commit_block = chain.height;
        let draw_id = chain.pool_state().current_draw_id;
        assert_conserved(&chain, deposited, &format!("round {round} commit"));

        // A late deposit is pending and can always leave again.
        let late = seq.pick(&SAVERS);
        let amount = seq.amount();
        chain.deposit(late, amount);
        deposited += amount;
        assert_conserved(&chain, deposited, &format!("round {round} late deposit"));
        chain
            .execute_pool(late, &[], prize_pool::msg::ExecuteMsg::WithdrawPending {})
            .unwrap();
        assert_conserved(&chain, deposited, &format!("round {round} late withdrawal"));

        for i in 0..4 {
            saver_step(&mut chain, &mut seq, &mut deposited, true);
            assert_conserved(&chain, deposited, &format!("round {round} committed step {i}"));
        }

        if round % 3 == 2 {
            chain.advance(REVEAL_WINDOW + 1);
            chain.cancel("anyone").unwrap();
            assert_eq!(chain.draw(draw_id).status, DrawStatus::Cancelled);
            expired += 1;
        } else {
            chain.advance(1);
            let hash = seq.hash();
            chain.submit_block_hash(commit_block, &hash);
            chain.reward(draw_id, &hash).unwrap();
            assert_eq!(chain.draw(draw_id).status, DrawStatus::Rewarded);
            // Everything accrued so far has been handed out.
            assert_eq!(chain.pool_state().total_supply, chain.market_balance_of_pool());
            rewarded += 1;
        }
        assert_conserved(&chain, deposited, &format!("round {round} finalized"));
    }
    assert_eq!(rewarded, 4);
    assert_eq!(expired, 2);
    assert!(!chain.pool_state().total_winnings_paid.is_zero());

    // Everyone exits.
    for actor in ACTORS {
        let balance = chain.user_balance(actor);
        if !(balance.eligible + balance.pending).is_zero() {
            chain.withdraw(actor).unwrap();
        }
        if !balance.sponsorship.is_zero() {
            chain
                .execute_pool(
                    actor,
                    &[],
                    prize_pool::msg::ExecuteMsg::WithdrawSponsorship { amount: None },
                )
                .unwrap();
        }
        assert_conserved(&chain, deposited, &format!("{actor} exit"));
    }
    let state = chain.pool_state();
    assert!(state.total_supply.is_zero());
    assert_eq!(state.depositor_count, 0);
    let awarded = (state.total_winnings_paid + state.total_fees_collected).u128();
    assert_eq!(chain.wallets.values().sum::<u128>(), deposited + awarded);
}

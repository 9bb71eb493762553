//! Delegated-execution flows
//!
//! Real Ed25519 keys end to end: deposit, sign, relay, execute, replay.

use cartel_core::error::CartelError;
use cartel_core::event::Event;
use cartel_core::types::{ActionKind, Address};
use cartel_crypto::authorization::sign_action;
use cartel_crypto::keys::KeyPair;
use cartel_engine::{EngineConfig, GameEngine};
use cartel_vault::{ActionRequest, Vault};

const OPERATOR: Address = Address::ZERO;
const VAULT_ADDR: Address = Address::new([0xAA; 32]);

struct Fixture {
    engine: GameEngine,
    vault: Vault,
    member: KeyPair,
    target: KeyPair,
}

fn fixture() -> Fixture {
    let mut engine = GameEngine::new(OPERATOR, EngineConfig::default()).unwrap();
    let vault = Vault::new(VAULT_ADDR);
    engine.set_agent(OPERATOR, VAULT_ADDR, true).unwrap();

    let member = KeyPair::from_seed([1u8; 32]);
    let target = KeyPair::from_seed([2u8; 32]);
    for key in [&member, &target] {
        engine
            .fund_settlement(OPERATOR, key.address(), 1_000)
            .unwrap();
        engine.join(key.address(), None, 0).unwrap();
    }

    Fixture {
        engine,
        vault,
        member,
        target,
    }
}

fn raid_request(member: &KeyPair, target: &KeyPair, deadline: i64) -> ActionRequest {
    ActionRequest {
        member: member.address(),
        action: ActionKind::Raid,
        target: Some(target.address()),
        deadline,
    }
}

#[test]
fn signed_raid_executes_and_consumes_nonce() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 100)
        .unwrap();

    let request = raid_request(&fx.member, &fx.target, 1_000);
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        0, // current nonce
        1_000,
    );

    let fee = fx
        .vault
        .execute_action(&mut fx.engine, &request, &signature, 500)
        .unwrap();

    assert_eq!(fee, 5);
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 1);
    assert_eq!(fx.vault.vault_balance_of(&fx.member.address()), 95);
    // The raid itself happened: 10% of 100 moved over
    assert_eq!(fx.engine.balance_of(&fx.member.address()), 110);
    assert_eq!(fx.engine.balance_of(&fx.target.address()), 90);
    // Fee flowed into the treasury, not back to the member
    assert_eq!(
        fx.engine.settlement_balance_of(&fx.member.address()),
        1_000 - 10 - 100
    );

    // The log records the delegated execution after the raid
    let events = fx.engine.events();
    assert!(matches!(
        events[events.len() - 2].event,
        Event::Raided { stolen: 10, .. }
    ));
    assert!(matches!(
        events[events.len() - 1].event,
        Event::ActionExecuted {
            action: ActionKind::Raid,
            fee_charged: 5,
            ..
        }
    ));
}

#[test]
fn replayed_signature_is_rejected() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 100)
        .unwrap();

    let request = raid_request(&fx.member, &fx.target, 1_000);
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        0,
        1_000,
    );

    fx.vault
        .execute_action(&mut fx.engine, &request, &signature, 500)
        .unwrap();

    // Identical submission: the reconstructed payload now carries nonce 1
    let balance_before = fx.engine.balance_of(&fx.member.address());
    let err = fx
        .vault
        .execute_action(&mut fx.engine, &request, &signature, 501)
        .unwrap_err();
    assert_eq!(err, CartelError::InvalidSignature);
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 1);
    assert_eq!(fx.engine.balance_of(&fx.member.address()), balance_before);

    // A fresh signature over the current nonce works again
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        1,
        1_000,
    );
    fx.vault
        .execute_action(&mut fx.engine, &request, &signature, 502)
        .unwrap();
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 2);
}

#[test]
fn expired_authorization_is_rejected() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 100)
        .unwrap();

    let request = raid_request(&fx.member, &fx.target, 400);
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        0,
        400,
    );

    let err = fx
        .vault
        .execute_action(&mut fx.engine, &request, &signature, 500)
        .unwrap_err();
    assert_eq!(
        err,
        CartelError::Expired {
            deadline: 400,
            now: 500
        }
    );
    // Nothing was consumed
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 0);
    assert_eq!(fx.vault.vault_balance_of(&fx.member.address()), 100);
}

#[test]
fn wrong_signer_is_rejected() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 100)
        .unwrap();

    // The target signs a payload claiming to be the member
    let request = raid_request(&fx.member, &fx.target, 1_000);
    let forged = sign_action(
        &fx.target,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        0,
        1_000,
    );

    let err = fx
        .vault
        .execute_action(&mut fx.engine, &request, &forged, 500)
        .unwrap_err();
    assert_eq!(err, CartelError::InvalidSignature);
    assert_eq!(fx.engine.balance_of(&fx.target.address()), 100);
}

#[test]
fn unfunded_vault_balance_is_rejected() {
    let mut fx = fixture();
    // No deposit: a raid fee cannot be covered
    let request = raid_request(&fx.member, &fx.target, 1_000);
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        0,
        1_000,
    );

    let err = fx
        .vault
        .execute_action(&mut fx.engine, &request, &signature, 500)
        .unwrap_err();
    assert!(matches!(err, CartelError::InsufficientVaultBalance { .. }));
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 0);
}

#[test]
fn deauthorized_vault_cannot_execute() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 100)
        .unwrap();
    fx.engine.set_agent(OPERATOR, VAULT_ADDR, false).unwrap();

    let request = raid_request(&fx.member, &fx.target, 1_000);
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::Raid,
        Some(&fx.target.address()),
        0,
        1_000,
    );

    let err = fx
        .vault
        .execute_action(&mut fx.engine, &request, &signature, 500)
        .unwrap_err();
    assert_eq!(err, CartelError::NotAuthorizedAgent(VAULT_ADDR));

    // Complete rollback: nonce unconsumed, prepaid balance intact, no
    // ledger movement
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 0);
    assert_eq!(fx.vault.vault_balance_of(&fx.member.address()), 100);
    assert_eq!(fx.engine.balance_of(&fx.member.address()), 100);
    assert_eq!(fx.engine.balance_of(&fx.target.address()), 100);
}

#[test]
fn delegated_claim_after_distribution() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 10)
        .unwrap();

    fx.engine.sponsor_revenue(OPERATOR, 500).unwrap();
    fx.engine.distribute_daily_profits(1_000).unwrap();
    let pending = fx.engine.pending_profit(&fx.member.address());
    assert!(pending > 0);

    let request = ActionRequest {
        member: fx.member.address(),
        action: ActionKind::ClaimProfit,
        target: None,
        deadline: 2_000,
    };
    let signature = sign_action(
        &fx.member,
        &VAULT_ADDR,
        ActionKind::ClaimProfit,
        None,
        0,
        2_000,
    );

    let balance_before = fx.engine.settlement_balance_of(&fx.member.address());
    let fee = fx
        .vault
        .execute_action(&mut fx.engine, &request, &signature, 1_500)
        .unwrap();

    assert_eq!(fee, 0);
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 1);
    assert_eq!(
        fx.engine.settlement_balance_of(&fx.member.address()),
        balance_before + pending
    );
    assert_eq!(fx.engine.pending_profit(&fx.member.address()), 0);
}

#[test]
fn delegated_retire_is_terminal() {
    let mut fx = fixture();
    fx.vault
        .deposit(&mut fx.engine, fx.member.address(), 10)
        .unwrap();

    let request = ActionRequest {
        member: fx.member.address(),
        action: ActionKind::Retire,
        target: None,
        deadline: 2_000,
    };
    let signature = sign_action(&fx.member, &VAULT_ADDR, ActionKind::Retire, None, 0, 2_000);

    fx.vault
        .execute_action(&mut fx.engine, &request, &signature, 1_000)
        .unwrap();

    assert_eq!(fx.engine.balance_of(&fx.member.address()), 0);
    assert_eq!(fx.vault.nonce_of(&fx.member.address()), 1);
    // The prepaid balance survives exit and remains withdrawable
    assert_eq!(fx.vault.vault_balance_of(&fx.member.address()), 10);
    fx.vault
        .withdraw(&mut fx.engine, fx.member.address(), 10)
        .unwrap();
}

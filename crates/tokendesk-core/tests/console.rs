// Integration tests driving the console core against the in-memory ledger:
// enumeration termination, registry round-trips, precondition gating, and
// the guarded dispatch cycle.

use tokendesk_core::{
    enumerate, enumerate_all, ActionOutcome, ActionRequest, Confirmation, ConsoleError,
    Dispatcher, IneligibleReason, Session, WHITELIST_VALIDITY_SECS,
};
use tokendesk_ledger::{LedgerClient, MemoryLedger, PreparedCall, TokenDetails};
use tokendesk_types::{Address, ModuleType, Timestamp, TokenAmount};

const GAS_PRICE: u64 = 50_000_000_000;

fn issuer() -> Address {
    Address([0x11; 20])
}

fn investor() -> Address {
    Address([0x77; 20])
}

fn seed_token(ledger: &MemoryLedger, symbol: &str) -> Address {
    let address = Address([0x42; 20]);
    ledger.register_token(TokenDetails {
        address,
        symbol: symbol.to_string(),
        issuer: issuer(),
        total_supply: TokenAmount::ZERO,
        decimals: 18,
    });
    address
}

async fn open_session(ledger: &MemoryLedger) -> Session {
    Session::open(ledger, "ACME", issuer(), GAS_PRICE)
        .await
        .expect("session should open for the seeded token")
}

#[tokio::test]
async fn enumeration_stops_at_the_sentinel_and_never_probes_beyond() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.attach_module(token, ModuleType::Transfer, "GeneralTransferManager", false, false);
    ledger.attach_module(token, ModuleType::Transfer, "CountTransferManager", true, false);
    let session = open_session(&ledger).await;

    let records = enumerate(&ledger, &session, ModuleType::Transfer).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "GeneralTransferManager");
    assert_eq!(records[1].name, "CountTransferManager");
    assert!(records[1].locked);

    let transfer_probes: Vec<u64> = ledger
        .probed_slots()
        .into_iter()
        .filter(|(ty, _)| *ty == ModuleType::Transfer)
        .map(|(_, index)| index)
        .collect();
    // Slot 2 is the sentinel; nothing past it is ever touched
    assert_eq!(transfer_probes, vec![0, 1, 2]);
}

#[tokio::test]
async fn truncated_scans_are_indistinguishable_from_exhausted_scans() {
    let truncated = MemoryLedger::new();
    let token = seed_token(&truncated, "ACME");
    truncated.attach_module(token, ModuleType::Permission, "GeneralPermissionManager", false, false);
    truncated.attach_module(token, ModuleType::Permission, "Unreachable", false, false);
    truncated.fail_slot(token, ModuleType::Permission, 1);
    let session = open_session(&truncated).await;
    let from_failure = enumerate(&truncated, &session, ModuleType::Permission).await;

    let exhausted = MemoryLedger::new();
    let token = seed_token(&exhausted, "ACME");
    exhausted.attach_module(token, ModuleType::Permission, "GeneralPermissionManager", false, false);
    let session = open_session(&exhausted).await;
    let from_sentinel = enumerate(&exhausted, &session, ModuleType::Permission).await;

    assert_eq!(from_failure, from_sentinel);
    assert_eq!(from_failure.len(), 1);
}

#[tokio::test]
async fn the_slot_cap_bounds_an_overlong_scan() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    for i in 0..5 {
        ledger.attach_module(token, ModuleType::Checkpoint, &format!("Checkpoint{i}"), false, false);
    }
    let session = open_session(&ledger).await.with_max_slots(3);

    let records = enumerate(&ledger, &session, ModuleType::Checkpoint).await;

    assert_eq!(records.len(), 3);
    let checkpoint_probes = ledger
        .probed_slots()
        .into_iter()
        .filter(|(ty, _)| *ty == ModuleType::Checkpoint)
        .count();
    assert_eq!(checkpoint_probes, 3);
}

#[tokio::test]
async fn the_acme_scenario_counts_two_transfer_modules() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.attach_module(token, ModuleType::Transfer, "GeneralTransferManager", false, false);
    ledger.attach_module(token, ModuleType::Transfer, "PercentageTransferManager", false, false);
    let session = open_session(&ledger).await;

    let registry = enumerate_all(&ledger, &session).await;

    assert_eq!(registry.count_of(ModuleType::Transfer), 2);
    assert_eq!(registry.count_of(ModuleType::Offering), 0);
    assert_eq!(registry.total(), 2);
}

#[tokio::test]
async fn pause_status_is_read_for_pausable_types_only() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.attach_module(token, ModuleType::Transfer, "GeneralTransferManager", false, true);
    // Seeded paused, but checkpoints carry no pause flag on the wire
    ledger.attach_module(token, ModuleType::Checkpoint, "DividendCheckpoint", false, true);
    let session = open_session(&ledger).await;

    let registry = enumerate_all(&ledger, &session).await;

    assert!(registry.at(ModuleType::Transfer, 0).unwrap().paused);
    assert!(!registry.at(ModuleType::Checkpoint, 0).unwrap().paused);
}

#[tokio::test]
async fn mint_is_refused_once_minting_is_finished() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.set_minting_finished(token, true);
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Mint {
                to: investor(),
                amount: "100".to_string(),
            },
        )
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Ineligible(IneligibleReason::MintingFinished)
    );
    assert_eq!(
        IneligibleReason::MintingFinished.to_string(),
        "minting has been permanently disabled by issuer"
    );
    assert!(ledger.submitted().is_empty(), "no remote write may occur");
}

#[tokio::test]
async fn mint_is_refused_while_an_offering_is_attached() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.attach_module(token, ModuleType::Offering, "CappedSTO", false, false);
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Mint {
                to: investor(),
                amount: "100".to_string(),
            },
        )
        .await;

    // Independent of the finished flag, which is still false here
    assert_eq!(
        outcome,
        ActionOutcome::Ineligible(IneligibleReason::OfferingAttached)
    );
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn mint_converts_the_entered_amount_to_base_units() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.seed_whitelist(token, investor(), Timestamp(u64::MAX));
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Mint {
                to: investor(),
                amount: "100.5".to_string(),
            },
        )
        .await;

    let expected = TokenAmount::from_base_units(1005 * 10u128.pow(17));
    assert_eq!(
        outcome,
        ActionOutcome::Confirmed(Confirmation::Minted {
            to: investor(),
            amount: expected,
        })
    );
    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0].call,
        PreparedCall::Mint {
            token,
            to: investor(),
            amount: expected,
        }
    );
    assert_eq!(submitted[0].gas_price, GAS_PRICE);
    // 1.2x margin over the backend's base cost
    assert_eq!(submitted[0].gas_limit, 90_000);
}

#[tokio::test]
async fn malformed_mint_amounts_surface_through_the_failure_path() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.seed_whitelist(token, investor(), Timestamp(u64::MAX));
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Mint {
                to: investor(),
                amount: "12abc".to_string(),
            },
        )
        .await;

    assert!(matches!(
        outcome,
        ActionOutcome::Failed(ConsoleError::Submission(_))
    ));
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn whitelist_grants_a_one_year_window_from_the_remote_clock() {
    let ledger = MemoryLedger::with_clock(Timestamp(1_000_000));
    let token = seed_token(&ledger, "ACME");
    let manager = ledger.attach_module(token, ModuleType::Transfer, "GeneralTransferManager", false, false);
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Whitelist {
                investor: investor(),
            },
        )
        .await;

    let now = Timestamp(1_000_000);
    let expiry = Timestamp(1_000_000 + WHITELIST_VALIDITY_SECS);
    assert_eq!(
        outcome,
        ActionOutcome::Confirmed(Confirmation::Whitelisted {
            investor: investor(),
            until: expiry,
        })
    );
    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0].call,
        PreparedCall::ModifyWhitelist {
            manager,
            investor: investor(),
            from_time: now,
            to_time: now,
            expiry,
            can_transfer: true,
        }
    );
}

#[tokio::test]
async fn whitelist_without_a_transfer_manager_is_refused() {
    let ledger = MemoryLedger::new();
    seed_token(&ledger, "ACME");
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Whitelist {
                investor: investor(),
            },
        )
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Ineligible(IneligibleReason::NoTransferManager)
    );
    assert_eq!(
        IneligibleReason::NoTransferManager.to_string(),
        "GeneralTransferManager is not attached"
    );
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn removal_submits_type_and_slot_not_the_flattened_position() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.attach_module(token, ModuleType::Permission, "GeneralPermissionManager", false, false);
    ledger.attach_module(token, ModuleType::Permission, "SecondPermissionManager", false, false);
    ledger.attach_module(token, ModuleType::Transfer, "GeneralTransferManager", false, false);
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    // Flattened position 2 is the transfer manager at its own slot 0
    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::RemoveModule { position: 2 },
        )
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Confirmed(Confirmation::ModuleRemoved {
            name: "GeneralTransferManager".to_string(),
        })
    );
    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0].call,
        PreparedCall::RemoveModule {
            token,
            module_type: ModuleType::Transfer,
            slot: 0,
        }
    );
    // 2x margin over the backend's base cost
    assert_eq!(submitted[0].gas_limit, 240_000);
}

#[tokio::test]
async fn end_minting_actions_submit_their_calls() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;
    let dispatcher = Dispatcher::new(&ledger);

    let sto = dispatcher
        .dispatch(&session, &registry, ActionRequest::EndMintingSto)
        .await;
    assert_eq!(
        sto,
        ActionOutcome::Confirmed(Confirmation::StoMintingEnded)
    );

    let issuer_end = dispatcher
        .dispatch(&session, &registry, ActionRequest::EndMintingIssuer)
        .await;
    assert_eq!(
        issuer_end,
        ActionOutcome::Confirmed(Confirmation::IssuerMintingEnded)
    );

    let calls: Vec<PreparedCall> = ledger.submitted().into_iter().map(|s| s.call).collect();
    assert_eq!(
        calls,
        vec![
            PreparedCall::FinishMintingSto { token },
            PreparedCall::FinishMintingIssuer { token },
        ]
    );
    assert!(ledger.minting_finished(token).await.unwrap());
}

#[tokio::test]
async fn estimation_failure_aborts_before_submission() {
    let ledger = MemoryLedger::new();
    let token = seed_token(&ledger, "ACME");
    ledger.attach_module(token, ModuleType::Transfer, "GeneralTransferManager", false, false);
    ledger.fail_estimates("gas required exceeds allowance");
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(
            &session,
            &registry,
            ActionRequest::Whitelist {
                investor: investor(),
            },
        )
        .await;

    match outcome {
        ActionOutcome::Failed(ConsoleError::Estimation(message)) => {
            assert!(message.contains("gas required exceeds allowance"));
        }
        other => panic!("expected an estimation failure, got {other:?}"),
    }
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn failed_submissions_surface_the_raw_message() {
    let ledger = MemoryLedger::new();
    seed_token(&ledger, "ACME");
    ledger.fail_next_submit("nonce too low");
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;

    let outcome = Dispatcher::new(&ledger)
        .dispatch(&session, &registry, ActionRequest::EndMintingIssuer)
        .await;

    match outcome {
        ActionOutcome::Failed(ConsoleError::Submission(message)) => {
            assert!(message.contains("nonce too low"));
        }
        other => panic!("expected a submission failure, got {other:?}"),
    }
}

#[tokio::test]
async fn stubbed_actions_never_touch_the_ledger() {
    let ledger = MemoryLedger::new();
    seed_token(&ledger, "ACME");
    let session = open_session(&ledger).await;
    let registry = enumerate_all(&ledger, &session).await;
    let dispatcher = Dispatcher::new(&ledger);

    for request in [
        ActionRequest::AddModule,
        ActionRequest::PauseModule,
        ActionRequest::ChangeBudget,
    ] {
        let outcome = dispatcher.dispatch(&session, &registry, request).await;
        assert_eq!(outcome, ActionOutcome::NotAvailable);
    }
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn sessions_reject_unknown_symbols_and_foreign_issuers() {
    let ledger = MemoryLedger::new();
    seed_token(&ledger, "ACME");

    let unknown = Session::open(&ledger, "NOPE", issuer(), GAS_PRICE).await;
    assert_eq!(
        unknown.unwrap_err(),
        ConsoleError::TokenNotFound("NOPE".to_string())
    );

    let foreign = Session::open(&ledger, "ACME", investor(), GAS_PRICE).await;
    assert_eq!(
        foreign.unwrap_err(),
        ConsoleError::NotAuthorized {
            symbol: "ACME".to_string(),
        }
    );
}

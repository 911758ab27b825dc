//! Integration tests driving the wallet core against nullable collaborators:
//! staking submission → confirmation polling, multi-shard balances,
//! shard-bound key generation → vault files on disk.

use std::sync::Arc;
use std::time::Duration;

use itc_crypto::{AccountKey, BlsKeyPair, VaultKdf};
use itc_nullables::{NullHardwareSigner, NullPassphrases, NullTransport};
use itc_rpc::methods;
use itc_rpc::{EndpointRewrites, NodeClient};
use itc_transactions::{
    CommissionRates, CreateValidator, Delegate, Description, IntrinsicGas,
    SignedStakingTransaction, StakingIntent, StakingTransaction,
};
use itc_types::{Address, ChainId, Dec};
use itc_wallet_core::keystore::pass_file_path;
use itc_wallet_core::{
    await_confirmation, balances_across_shards, default_key_path, generate_shard_keys,
    read_key_file, send_staking_transaction, shard_for_bls_key, submit_and_confirm,
    write_key_file, ConfirmationPolicy, FixedPassphrase, LocalSigner, NoncePolicy, SearchBudget,
    SubmissionOutcome, TransactionSigner, WalletConfig, WalletError,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ONE_ITC_HEX: &str = "0xde0b6b3a7640000";

fn node(transport: &Arc<NullTransport>) -> NodeClient {
    NodeClient::with_rewrites(transport.clone(), EndpointRewrites::none())
}

fn shard_url(shard: u32) -> String {
    format!("https://s{shard}.example")
}

fn topology(shards: u32) -> Value {
    Value::Array(
        (0..shards)
            .map(|i| json!({"shardID": i, "http": shard_url(i), "ws": format!("wss://s{i}.example")}))
            .collect(),
    )
}

fn dec(s: &str) -> Dec {
    s.parse().unwrap()
}

fn delegate(from: Address) -> StakingIntent {
    StakingIntent::Delegate(Delegate {
        delegator_address: from,
        validator_address: Address::new([0x42; 20]),
        amount: dec("100"),
    })
}

async fn signed_delegation() -> SignedStakingTransaction {
    let signer = LocalSigner::new(AccountKey::generate());
    let tx = StakingTransaction {
        nonce: 1,
        gas_price: 100_000_000_000,
        gas_limit: 50_000,
        intent: delegate(signer.address()),
    };
    signer.sign(tx, ChainId::Testnet).await.unwrap().0
}

/// A transport that accepts a submission and serves the given receipt polls.
fn submitting(signed: &SignedStakingTransaction, receipts: Vec<Value>) -> Arc<NullTransport> {
    let transport = Arc::new(NullTransport::new());
    transport
        .respond(
            methods::SEND_RAW_STAKING_TRANSACTION,
            json!(signed.hash().unwrap().to_string()),
        )
        .respond_sequence(methods::GET_TRANSACTION_RECEIPT, receipts)
        .respond(methods::GET_CURRENT_STAKING_ERROR_SINK, json!([]));
    transport
}

fn three_misses_then_receipt() -> Vec<Value> {
    vec![Value::Null, Value::Null, Value::Null, json!({"status": "0x1"})]
}

// ---------------------------------------------------------------------------
// Submission and confirmation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn receipt_on_fourth_poll_confirms_with_eight_second_budget() {
    let signed = signed_delegation().await;
    let transport = submitting(&signed, three_misses_then_receipt());

    let outcome = submit_and_confirm(
        &node(&transport),
        "https://s0.example",
        &signed,
        ConfirmationPolicy::new(Duration::from_secs(8)),
    )
    .await
    .unwrap();

    match outcome {
        SubmissionOutcome::Confirmed { hash, receipt } => {
            assert_eq!(hash, signed.hash().unwrap());
            assert_eq!(receipt, json!({"status": "0x1"}));
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
    assert_eq!(transport.count(methods::SEND_RAW_STAKING_TRANSACTION), 1);
    assert_eq!(transport.count(methods::GET_TRANSACTION_RECEIPT), 4);
}

#[tokio::test(start_paused = true)]
async fn receipt_on_fourth_poll_expires_with_five_second_budget() {
    let signed = signed_delegation().await;
    let transport = submitting(&signed, three_misses_then_receipt());

    let err = submit_and_confirm(
        &node(&transport),
        "https://s0.example",
        &signed,
        ConfirmationPolicy::new(Duration::from_secs(5)),
    )
    .await
    .unwrap_err();

    assert!(err.is_recoverable());
    match err {
        WalletError::ConfirmationTimeout { hash, .. } => assert_eq!(hash, signed.hash().unwrap()),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(transport.count(methods::GET_TRANSACTION_RECEIPT), 3);
}

#[tokio::test(start_paused = true)]
async fn reported_error_ends_wait_immediately() {
    let signed = signed_delegation().await;
    let hash = signed.hash().unwrap();
    let transport = submitting(&signed, vec![Value::Null]);
    transport.respond(
        methods::GET_CURRENT_STAKING_ERROR_SINK,
        json!([
            {"tx-hash-id": "0x00", "error-message": "unrelated"},
            {"tx-hash-id": hash.to_string(), "error-message": "insufficient balance for stake"},
        ]),
    );

    let err = submit_and_confirm(
        &node(&transport),
        "https://s0.example",
        &signed,
        ConfirmationPolicy::new(Duration::from_secs(40)),
    )
    .await
    .unwrap_err();

    assert!(!err.is_recoverable());
    match err {
        WalletError::TransactionRejected { errors, .. } => {
            assert_eq!(errors, vec!["insufficient balance for stake".to_string()])
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(transport.count(methods::GET_TRANSACTION_RECEIPT), 1);
}

#[tokio::test]
async fn zero_timeout_returns_submission_reply_without_polling() {
    let signed = signed_delegation().await;
    let transport = submitting(&signed, vec![Value::Null]);

    let outcome = submit_and_confirm(
        &node(&transport),
        "https://s0.example",
        &signed,
        ConfirmationPolicy::fire_and_forget(),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::Submitted { .. }));
    assert_eq!(transport.count(methods::GET_TRANSACTION_RECEIPT), 0);
}

#[tokio::test]
async fn failed_submission_surfaces_without_retry() {
    let signed = signed_delegation().await;
    let transport = submitting(&signed, vec![Value::Null]);
    transport.fail_endpoint("https://s0.example");

    let err = submit_and_confirm(
        &node(&transport),
        "https://s0.example",
        &signed,
        ConfirmationPolicy::new(Duration::from_secs(40)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WalletError::Network(_)));
    assert_eq!(transport.count(methods::SEND_RAW_STAKING_TRANSACTION), 1);
    assert_eq!(transport.count(methods::GET_TRANSACTION_RECEIPT), 0);
}

#[tokio::test(start_paused = true)]
async fn failing_receipt_polls_count_as_pending() {
    let signed = signed_delegation().await;
    let hash = signed.hash().unwrap();
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::GET_CURRENT_STAKING_ERROR_SINK, json!([]));

    // No receipt method scripted: every poll errors.
    let err = await_confirmation(
        &node(&transport),
        "https://s0.example",
        &hash,
        ConfirmationPolicy::new(Duration::from_secs(4)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WalletError::ConfirmationTimeout { .. }));
    assert_eq!(transport.count(methods::GET_TRANSACTION_RECEIPT), 3);
}

// ---------------------------------------------------------------------------
// Staking pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hardware_signer_reporting_other_account_is_rejected() {
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::GET_TRANSACTION_COUNT, json!("0x5"));
    let key = AccountKey::generate();
    let sender = key.address();
    let signer = NullHardwareSigner::new(key).reporting(Address::new([7; 20]));

    let config = WalletConfig {
        node: "http://127.0.0.1:9500".into(),
        ..WalletConfig::default()
    };
    let err = send_staking_transaction(
        &config,
        &node(&transport),
        delegate(sender),
        &signer,
        &FixedPassphrase::default(),
        &IntrinsicGas,
    )
    .await
    .unwrap_err();

    match err {
        WalletError::SignerMismatch { expected, actual } => {
            assert_eq!(expected, sender);
            assert_eq!(actual, Address::new([7; 20]));
        }
        other => panic!("expected signer mismatch, got {other:?}"),
    }
    assert_eq!(transport.count(methods::SEND_RAW_STAKING_TRANSACTION), 0);
}

#[tokio::test]
async fn invalid_intent_fails_before_any_network_call() {
    let transport = Arc::new(NullTransport::new());
    let signer = LocalSigner::new(AccountKey::generate());
    let intent = StakingIntent::Delegate(Delegate {
        delegator_address: signer.address(),
        validator_address: Address::new([1; 20]),
        amount: dec("-1"),
    });

    let err = send_staking_transaction(
        &WalletConfig::default(),
        &node(&transport),
        intent,
        &signer,
        &FixedPassphrase::default(),
        &IntrinsicGas,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WalletError::Validation(m) if m == "amount can not be negative"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn create_validator_loads_proofs_and_submits_to_beacon_shard() {
    let dir = tempfile::tempdir().unwrap();
    let bls = BlsKeyPair::generate().unwrap();
    let hex = bls.public_key().to_hex();
    write_key_file(&bls, "slot-pass", &default_key_path(dir.path(), &hex), VaultKdf::Legacy)
        .unwrap();
    std::fs::write(pass_file_path(dir.path(), &hex), "slot-pass\n").unwrap();

    let signer = LocalSigner::new(AccountKey::generate());
    let intent = StakingIntent::CreateValidator(CreateValidator {
        validator_address: signer.address(),
        description: Description {
            name: "validator".into(),
            ..Description::default()
        },
        commission_rates: CommissionRates {
            rate: dec("0.1"),
            max_rate: dec("0.2"),
            max_change_rate: dec("0.05"),
        },
        min_self_delegation: dec("10000"),
        max_total_delegation: dec("100000"),
        slot_pub_keys: vec![bls.public_key()],
        slot_key_sigs: Vec::new(),
        amount: dec("10000"),
    });

    let transport = Arc::new(NullTransport::new());
    transport
        .respond(methods::GET_SHARDING_STRUCTURE, topology(2))
        .respond(methods::GET_TRANSACTION_COUNT, json!("0x3"))
        .respond(methods::SEND_RAW_STAKING_TRANSACTION, json!("not a hash"));

    let config = WalletConfig {
        node: "https://api.example".into(),
        timeout_secs: 0,
        bls_key_dir: Some(dir.path().to_path_buf()),
        nonce: NoncePolicy::Pending,
        ..WalletConfig::default()
    };
    let outcome = send_staking_transaction(
        &config,
        &node(&transport),
        intent,
        &signer,
        &FixedPassphrase::default(),
        &IntrinsicGas,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::Submitted { reply, .. } if reply == json!("not a hash")));
    let calls = transport.calls();
    let nonce_call = calls
        .iter()
        .find(|c| c.method == methods::GET_TRANSACTION_COUNT)
        .unwrap();
    assert_eq!(nonce_call.endpoint, shard_url(0));
    assert_eq!(nonce_call.params[1], json!("pending"));
    let send = calls
        .iter()
        .find(|c| c.method == methods::SEND_RAW_STAKING_TRANSACTION)
        .unwrap();
    assert_eq!(send.endpoint, shard_url(0));
    assert!(send.params[0].as_str().unwrap().starts_with("0x"));
}

#[tokio::test]
async fn explicit_nonce_skips_nonce_query() {
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::SEND_RAW_STAKING_TRANSACTION, json!("0x01"));
    let signer = LocalSigner::new(AccountKey::generate());
    let config = WalletConfig {
        node: "http://10.1.2.3:9500".into(),
        timeout_secs: 0,
        nonce: NoncePolicy::Explicit(11),
        ..WalletConfig::default()
    };

    send_staking_transaction(
        &config,
        &node(&transport),
        delegate(signer.address()),
        &signer,
        &FixedPassphrase::default(),
        &IntrinsicGas,
    )
    .await
    .unwrap();

    assert_eq!(transport.count(methods::GET_TRANSACTION_COUNT), 0);
    assert_eq!(transport.count(methods::GET_SHARDING_STRUCTURE), 0);
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_shard_skipped() {
    let transport = Arc::new(NullTransport::new());
    transport
        .respond(methods::GET_SHARDING_STRUCTURE, topology(4))
        .respond(methods::GET_BALANCE, json!(ONE_ITC_HEX))
        .fail_endpoint(&shard_url(2));

    let report = balances_across_shards(&node(&transport), "https://api.example", &Address::new([1; 20]))
        .await
        .unwrap();

    let shards: Vec<u32> = report.balances.iter().map(|b| b.shard_id).collect();
    assert_eq!(shards, vec![0, 1, 3]);
    assert!(report.balances.iter().all(|b| b.amount == Dec::ONE));
    assert_eq!(report.failed, vec![2]);
    assert!(!report.all_unreachable());
}

#[tokio::test]
async fn every_shard_failing_gives_empty_report_with_diagnostic() {
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::GET_SHARDING_STRUCTURE, topology(3));
    for shard in 0..3 {
        transport.fail_endpoint(&shard_url(shard));
    }

    let report = balances_across_shards(&node(&transport), "https://api.example", &Address::new([1; 20]))
        .await
        .unwrap();

    assert!(report.balances.is_empty());
    assert!(report.all_unreachable());
    assert_eq!(report.queried, 3);
}

#[tokio::test]
async fn ip_node_queried_alone() {
    let transport = Arc::new(NullTransport::new());
    transport
        .respond(methods::GET_BALANCE, json!("0x0"))
        .respond(methods::GET_SHARD_ID, json!(1));

    let report = balances_across_shards(&node(&transport), "http://10.0.0.5:9500", &Address::new([1; 20]))
        .await
        .unwrap();

    assert_eq!(report.balances.len(), 1);
    assert_eq!(report.balances[0].shard_id, 1);
    assert_eq!(report.balances[0].amount, Dec::ZERO);
    assert_eq!(transport.count(methods::GET_SHARDING_STRUCTURE), 0);
}

#[tokio::test]
async fn topology_failure_propagates() {
    let transport = Arc::new(NullTransport::new());
    let result =
        balances_across_shards(&node(&transport), "https://api.example", &Address::new([1; 20]))
            .await;
    assert!(matches!(result, Err(WalletError::Network(_))));
}

// ---------------------------------------------------------------------------
// Shard-bound key generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn out_of_range_shard_fails_before_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::GET_SHARDING_STRUCTURE, topology(4));
    let passphrases = NullPassphrases::new(["unused"]);

    let err = generate_shard_keys(
        &node(&transport),
        "https://api.example",
        4,
        1,
        SearchBudget::unbounded(),
        &passphrases,
        Some(dir.path()),
        VaultKdf::Legacy,
    )
    .await
    .unwrap_err();

    match err {
        WalletError::InvalidShard {
            shard_id,
            shard_count,
            ..
        } => {
            assert_eq!((shard_id, shard_count), (4, 4));
        }
        other => panic!("expected invalid shard, got {other:?}"),
    }
    assert!(passphrases.asked().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn invalid_shard_message_names_node_and_shard_count() {
    let err = WalletError::InvalidShard {
        node: Some("https://api.example".into()),
        shard_id: 4,
        shard_count: 4,
    };
    assert_eq!(
        err.to_string(),
        "node https://api.example only supports a total of 4 shards - supplied shard id 4 isn't valid"
    );
}

#[tokio::test]
async fn keys_written_per_shard_with_one_passphrase_each() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::GET_SHARDING_STRUCTURE, topology(4));
    let passphrases = NullPassphrases::new(["first", "second"]);

    let keys = generate_shard_keys(
        &node(&transport),
        "https://api.example",
        2,
        2,
        SearchBudget::unbounded(),
        &passphrases,
        Some(dir.path()),
        VaultKdf::Legacy,
    )
    .await
    .unwrap();

    assert_eq!(keys.len(), 2);
    assert_eq!(passphrases.asked().len(), 2);
    for (generated, passphrase) in keys.iter().zip(["first", "second"]) {
        let public_key = generated.assignment.key.public_key();
        assert_eq!(generated.assignment.shard_id, 2);
        assert_eq!(public_key.shard_id(4), 2);
        assert_eq!(generated.path, default_key_path(dir.path(), &public_key.to_hex()));

        let back: BlsKeyPair = read_key_file(&generated.path, passphrase).unwrap();
        assert_eq!(back.public_key(), public_key);
    }
}

#[tokio::test]
async fn shard_of_existing_key_follows_topology() {
    let transport = Arc::new(NullTransport::new());
    transport.respond(methods::GET_SHARDING_STRUCTURE, topology(4));
    let key = BlsKeyPair::generate().unwrap().public_key();

    let shard = shard_for_bls_key(&node(&transport), "https://api.example", &key)
        .await
        .unwrap();
    assert_eq!(shard, key.shard_id(4));
}

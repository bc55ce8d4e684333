//! Withdraw flow against a local stub Horizon server
//!
//! The stub serves `GET /accounts/{id}` for a fixed set of accounts and
//! answers 404 for everything else, the same way Horizon does.

use alloy::primitives::{TxHash, U256};
use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Mutex;
use tft_bridge::error::{AddressError, AmountError, NetworkError, WithdrawError};
use tft_bridge::horizon::{AccountLookup, Asset, HorizonClient};
use tft_bridge::withdraw::{
    FieldState, WithdrawDispatcher, WithdrawForm, WithdrawalReceipt, WithdrawalRequest,
};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

const ISSUER: &str = "GBOVQKJYHXRR3DX6NOX2RRYFRCUMSADGDESTDNBDS6CDVLGVESRTAC47";
const TRUSTING: &str = "GDTRUSTINGACCOUNTXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
const NATIVE_ONLY: &str = "GDNATIVEONLYACCOUNTXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

async fn account(Path(id): Path<String>) -> impl IntoResponse {
    let native = json!({ "balance": "100.0000000", "asset_type": "native" });
    let tft = json!({
        "balance": "0.0000000",
        "limit": "922337203685.4775807",
        "asset_type": "credit_alphanum4",
        "asset_code": "TFT",
        "asset_issuer": ISSUER,
    });

    match id.as_str() {
        TRUSTING => (
            StatusCode::OK,
            Json(json!({ "id": id, "account_id": id, "balances": [tft, native] })),
        ),
        NATIVE_ONLY => (
            StatusCode::OK,
            Json(json!({ "id": id, "account_id": id, "balances": [native] })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "type": "https://stellar.org/horizon-errors/not_found", "status": 404 })),
        ),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start the stub and return its base URL
async fn spawn_horizon() -> String {
    init_tracing();
    let app = Router::new().route("/accounts/{id}", get(account));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[derive(Default)]
struct RecordingDispatcher {
    requests: Mutex<Vec<WithdrawalRequest>>,
}

#[async_trait]
impl WithdrawDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalReceipt, NetworkError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(WithdrawalReceipt {
            tx_hash: TxHash::repeat_byte(0x11),
        })
    }
}

fn form_with_balance(raw: u64) -> WithdrawForm {
    let mut form = WithdrawForm::new(Asset::tft(ISSUER));
    form.set_balance(U256::from(raw));
    form
}

#[tokio::test]
async fn test_horizon_client_lookups() {
    let horizon = HorizonClient::new(&spawn_horizon().await).unwrap();

    let record = assert_ok!(horizon.load_account(TRUSTING).await);
    assert!(record.has_trust_line(&Asset::tft(ISSUER)));

    let record = assert_ok!(horizon.load_account(NATIVE_ONLY).await);
    assert!(!record.has_trust_line(&Asset::tft(ISSUER)));

    let err = assert_err!(horizon.load_account("GUNKNOWN").await);
    assert_eq!(err, NetworkError::AccountMissing("GUNKNOWN".to_string()));
}

#[tokio::test]
async fn test_unknown_destination_is_not_found() {
    let horizon = HorizonClient::new(&spawn_horizon().await).unwrap();
    let mut form = form_with_balance(20_000_000);

    form.edit_destination("GUNKNOWN");
    let err = form.validate_destination(&horizon).await.unwrap_err();
    assert!(matches!(err, AddressError::AccountNotFound(_)));
    assert_eq!(
        form.destination_state().error_message().as_deref(),
        Some("Address not found")
    );
}

#[tokio::test]
async fn test_destination_without_trust_line() {
    let horizon = HorizonClient::new(&spawn_horizon().await).unwrap();
    let mut form = form_with_balance(20_000_000);

    form.edit_destination(NATIVE_ONLY);
    let err = form.validate_destination(&horizon).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Address does not have a valid trustline to TFT"
    );
}

#[tokio::test]
async fn test_unreachable_horizon_is_not_found() {
    // nothing listens on port 1
    let horizon = HorizonClient::new("http://127.0.0.1:1").unwrap();
    let mut form = form_with_balance(20_000_000);

    form.edit_destination(TRUSTING);
    assert!(matches!(
        form.validate_destination(&horizon).await,
        Err(AddressError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn test_valid_withdrawal_is_dispatched_once() {
    let horizon = HorizonClient::new(&spawn_horizon().await).unwrap();
    let dispatcher = RecordingDispatcher::default();
    let mut form = form_with_balance(20_000_000);

    form.edit_destination(format!("  {}  ", TRUSTING));
    form.edit_amount("1.5");
    let (request, receipt) = form
        .validate_and_submit(&horizon, &dispatcher)
        .await
        .unwrap();

    assert_eq!(request.destination, TRUSTING);
    assert_eq!(request.raw_amount().unwrap(), U256::from(15_000_000u64));
    assert_eq!(receipt.tx_hash, TxHash::repeat_byte(0x11));
    assert_eq!(dispatcher.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_amount_blocks_dispatch() {
    let horizon = HorizonClient::new(&spawn_horizon().await).unwrap();
    let dispatcher = RecordingDispatcher::default();
    let mut form = form_with_balance(20_000_000);

    form.edit_destination(TRUSTING);
    form.edit_amount("3");
    let err = form
        .validate_and_submit(&horizon, &dispatcher)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WithdrawError::Amount(AmountError::InsufficientBalance { .. })
    ));
    // the destination result survives the amount failure
    assert!(form.destination_state().is_valid());
    assert!(matches!(form.amount_state(), FieldState::Invalid(_)));
    assert!(dispatcher.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_during_lookup_discards_result() {
    let horizon = HorizonClient::new(&spawn_horizon().await).unwrap();
    let mut form = form_with_balance(20_000_000);

    form.edit_destination("GUNKNOWN");
    let check = form.begin_destination_check().unwrap();
    form.edit_destination(TRUSTING);

    let stale = check.run(&horizon).await;
    assert!(!form.apply_destination_check(stale));
    assert_eq!(form.destination_state(), &FieldState::Empty);

    assert_ok!(form.validate_destination(&horizon).await);
    assert!(form.destination_state().is_valid());
}

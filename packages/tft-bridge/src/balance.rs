//! Token balance tracking
//!
//! The balance is fetched when a wallet connects, whenever the account or
//! chain changes, after each withdrawal and on a fixed poll interval. The
//! latest value is published on a watch channel for display.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::amount::format_balance;
use crate::error::NetworkError;
use crate::wallet::{WalletEvent, WalletSession};

/// Default poll interval, matching the wallet provider's polling
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(12_000);

/// Anything that can report an account's raw token balance
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance_of(&self, account: Address) -> Result<U256, NetworkError>;
}

/// What the balance display shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceView {
    /// No wallet connected, or not fetched yet
    Unknown,
    Loaded(U256),
    /// Last fetch failed
    Error(String),
}

impl BalanceView {
    pub fn raw(&self) -> Option<U256> {
        match self {
            BalanceView::Loaded(raw) => Some(*raw),
            _ => None,
        }
    }

    /// Text for the balance line
    pub fn display(&self) -> String {
        match self {
            BalanceView::Unknown => "Connect your wallet to continue".to_string(),
            BalanceView::Loaded(raw) => format!("Your TFT Balance {}", format_balance(*raw)),
            BalanceView::Error(_) => "Error".to_string(),
        }
    }
}

/// Publishes the connected account's balance
pub struct BalanceTracker<S: ?Sized> {
    source: Arc<S>,
    view: watch::Sender<BalanceView>,
}

impl<S: BalanceSource + ?Sized> BalanceTracker<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (view, _) = watch::channel(BalanceView::Unknown);
        Self { source, view }
    }

    /// Receiver following every published balance
    pub fn watch(&self) -> watch::Receiver<BalanceView> {
        self.view.subscribe()
    }

    pub fn current(&self) -> BalanceView {
        self.view.borrow().clone()
    }

    /// Fetch and publish the balance of `account`
    pub async fn refresh(&self, account: Address) -> Result<U256, NetworkError> {
        match self.source.balance_of(account).await {
            Ok(raw) => {
                debug!(account = %account, balance = %format_balance(raw), "Balance refreshed");
                self.view.send_replace(BalanceView::Loaded(raw));
                Ok(raw)
            }
            Err(e) => {
                warn!(account = %account, error = %e, "Balance refresh failed");
                self.view.send_replace(BalanceView::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn clear(&self) {
        self.view.send_replace(BalanceView::Unknown);
    }

    async fn refresh_connected(&self, session: &WalletSession) {
        if let Some(account) = session.account() {
            // failures are already published
            let _ = self.refresh(account).await;
        }
    }

    /// Follow `session` until shutdown or until the session goes away
    pub async fn run(
        &self,
        session: &WalletSession,
        poll_interval: Duration,
        mut shutdown: mpsc::Receiver<()>,
    ) {
        let mut events = session.subscribe();
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(poll_interval_ms = poll_interval.as_millis() as u64, "Balance tracker started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Balance tracker shutting down");
                    break;
                }
                event = events.recv() => match event {
                    None => break,
                    Some(WalletEvent::Connected { account, .. })
                    | Some(WalletEvent::AccountChanged(account)) => {
                        let _ = self.refresh(account).await;
                    }
                    Some(WalletEvent::ChainChanged(_)) => self.refresh_connected(session).await,
                    Some(WalletEvent::Disconnected) => self.clear(),
                },
                _ = ticker.tick() => self.refresh_connected(session).await,
            }
        }

        events.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBalances {
        balances: Mutex<HashMap<Address, U256>>,
        calls: Mutex<u32>,
    }

    impl MockBalances {
        fn set(&self, account: Address, raw: u64) {
            self.balances
                .lock()
                .unwrap()
                .insert(account, U256::from(raw));
        }
    }

    #[async_trait]
    impl BalanceSource for MockBalances {
        async fn balance_of(&self, account: Address) -> Result<U256, NetworkError> {
            *self.calls.lock().unwrap() += 1;
            self.balances
                .lock()
                .unwrap()
                .get(&account)
                .copied()
                .ok_or_else(|| NetworkError::ContractCall("execution reverted".into()))
        }
    }

    fn alice() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
    }

    #[test]
    fn test_view_display() {
        assert_eq!(BalanceView::Unknown.display(), "Connect your wallet to continue");
        assert_eq!(
            BalanceView::Loaded(U256::from(12_345_678u64)).display(),
            "Your TFT Balance 1.2345678"
        );
        assert_eq!(BalanceView::Error("x".into()).display(), "Error");
    }

    #[tokio::test]
    async fn test_refresh_publishes() {
        let source = Arc::new(MockBalances::default());
        source.set(alice(), 20_000_000);
        let tracker = BalanceTracker::new(source.clone());
        let mut rx = tracker.watch();

        let raw = tracker.refresh(alice()).await.unwrap();
        assert_eq!(raw, U256::from(20_000_000u64));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), BalanceView::Loaded(raw));
    }

    #[tokio::test]
    async fn test_refresh_failure_publishes_error() {
        let source = Arc::new(MockBalances::default());
        let tracker = BalanceTracker::new(source);

        assert!(tracker.refresh(alice()).await.is_err());
        assert!(matches!(tracker.current(), BalanceView::Error(_)));
    }

    async fn wait_for(rx: &mut watch::Receiver<BalanceView>, expected: BalanceView) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if *rx.borrow_and_update() == expected {
                    break;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("balance view never reached expected value");
    }

    #[tokio::test]
    async fn test_run_follows_wallet() {
        let source = Arc::new(MockBalances::default());
        source.set(alice(), 10_000_000);
        let tracker = Arc::new(BalanceTracker::new(source.clone()));
        let session = Arc::new(WalletSession::default());
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = {
            let tracker = tracker.clone();
            let session = session.clone();
            tokio::spawn(async move {
                tracker
                    .run(&session, Duration::from_millis(50), shutdown_rx)
                    .await
            })
        };

        let mut rx = tracker.watch();
        while session.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }

        session.connect(alice(), 56).unwrap();
        wait_for(&mut rx, BalanceView::Loaded(U256::from(10_000_000u64))).await;

        // picked up by polling, no wallet event involved
        source.set(alice(), 4_000_000);
        wait_for(&mut rx, BalanceView::Loaded(U256::from(4_000_000u64))).await;

        session.disconnect();
        wait_for(&mut rx, BalanceView::Unknown).await;

        shutdown_tx.send(()).await.unwrap();
        task.await.unwrap();
        assert_eq!(session.subscriber_count(), 0);
        assert!(*source.calls.lock().unwrap() >= 2);
    }

    fn bob() -> Address {
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap()
    }

    #[tokio::test]
    async fn test_run_refreshes_on_account_and_chain_change() {
        let source = Arc::new(MockBalances::default());
        source.set(alice(), 10_000_000);
        source.set(bob(), 7_000_000);
        let tracker = Arc::new(BalanceTracker::new(source.clone()));
        let session = Arc::new(WalletSession::new(vec![56, 97]));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        // polling never fires again within the test, only wallet events refresh
        let task = {
            let tracker = tracker.clone();
            let session = session.clone();
            tokio::spawn(async move {
                tracker
                    .run(&session, Duration::from_secs(3600), shutdown_rx)
                    .await
            })
        };

        let mut rx = tracker.watch();
        while session.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }

        session.connect(alice(), 56).unwrap();
        wait_for(&mut rx, BalanceView::Loaded(U256::from(10_000_000u64))).await;

        session.change_account(bob());
        wait_for(&mut rx, BalanceView::Loaded(U256::from(7_000_000u64))).await;

        source.set(bob(), 3_000_000);
        session.change_chain(97).unwrap();
        wait_for(&mut rx, BalanceView::Loaded(U256::from(3_000_000u64))).await;

        shutdown_tx.send(()).await.unwrap();
        task.await.unwrap();
    }
}

//! Wallet connection state
//!
//! Tracks which EVM account is connected and on which chain, and lets
//! components follow changes through explicit subscriptions. A
//! [`WalletSubscription`] stops receiving events as soon as it is
//! unsubscribed or dropped, so a torn-down component cannot leak a listener.

use alloy::primitives::Address;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 32;

/// Why a wallet connection could not be established
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("No Ethereum browser extension detected, install MetaMask on desktop or visit from a dApp browser on mobile.")]
    NoProvider,

    #[error("You're connected to an unsupported network.")]
    UnsupportedChain(u64),

    #[error("Please authorize this website to access your Ethereum account.")]
    UserRejected,

    #[error("An unknown error occurred. Check the console for more details.")]
    Unknown(String),
}

/// Current connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected { account: Address, chain_id: u64 },
    Failed(ConnectError),
}

impl ConnectionState {
    pub fn account(&self) -> Option<Address> {
        match self {
            ConnectionState::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }
}

/// Change notifications delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Connected { account: Address, chain_id: u64 },
    AccountChanged(Address),
    ChainChanged(u64),
    Disconnected,
}

/// Connection state of one wallet
pub struct WalletSession {
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<WalletEvent>,
    supported_chains: Vec<u64>,
}

impl WalletSession {
    /// Create a session accepting the given chain ids (empty accepts any)
    pub fn new(supported_chains: Vec<u64>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state,
            events,
            supported_chains,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn account(&self) -> Option<Address> {
        self.state.borrow().account()
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.state.borrow(), ConnectionState::Connected { .. })
    }

    fn is_supported(&self, chain_id: u64) -> bool {
        self.supported_chains.is_empty() || self.supported_chains.contains(&chain_id)
    }

    fn emit(&self, event: WalletEvent) {
        // No subscribers is not an error
        let delivered = self.events.send(event.clone()).unwrap_or(0);
        debug!(?event, delivered, "Wallet event");
    }

    /// Mark the wallet connected
    pub fn connect(&self, account: Address, chain_id: u64) -> Result<(), ConnectError> {
        if !self.is_supported(chain_id) {
            return Err(self.fail(ConnectError::UnsupportedChain(chain_id)));
        }

        self.state
            .send_replace(ConnectionState::Connected { account, chain_id });
        info!(account = %short_address(&account), chain_id, "Wallet connected");
        self.emit(WalletEvent::Connected { account, chain_id });
        Ok(())
    }

    /// Record a failed connection attempt and return the error
    pub fn fail(&self, error: ConnectError) -> ConnectError {
        warn!(error = %error, "Wallet connection failed");
        let was_connected = self.is_connected();
        self.state.send_replace(ConnectionState::Failed(error.clone()));
        if was_connected {
            self.emit(WalletEvent::Disconnected);
        }
        error
    }

    /// The wallet switched accounts
    pub fn change_account(&self, account: Address) {
        let changed = self.state.send_if_modified(|state| match state {
            ConnectionState::Connected {
                account: current, ..
            } if *current != account => {
                *current = account;
                true
            }
            _ => false,
        });
        if changed {
            self.emit(WalletEvent::AccountChanged(account));
        }
    }

    /// The wallet switched chains
    pub fn change_chain(&self, chain_id: u64) -> Result<(), ConnectError> {
        if !self.is_supported(chain_id) {
            return Err(self.fail(ConnectError::UnsupportedChain(chain_id)));
        }

        let changed = self.state.send_if_modified(|state| match state {
            ConnectionState::Connected {
                chain_id: current, ..
            } if *current != chain_id => {
                *current = chain_id;
                true
            }
            _ => false,
        });
        if changed {
            self.emit(WalletEvent::ChainChanged(chain_id));
        }
        Ok(())
    }

    pub fn disconnect(&self) {
        let previous = self.state.send_replace(ConnectionState::Disconnected);
        if matches!(previous, ConnectionState::Connected { .. }) {
            info!("Wallet disconnected");
            self.emit(WalletEvent::Disconnected);
        }
    }

    /// Start listening for wallet events
    pub fn subscribe(&self) -> WalletSubscription {
        WalletSubscription {
            receiver: self.events.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Handle for receiving [`WalletEvent`]s; detaches on drop
pub struct WalletSubscription {
    receiver: broadcast::Receiver<WalletEvent>,
}

impl WalletSubscription {
    /// Wait for the next event. Returns `None` once the session is gone.
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Wallet subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<WalletEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Stop listening
    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Shorten an address for display, e.g. `0xf39F...2266`
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

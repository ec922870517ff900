//! Live "is the internet reachable" signal.
//!
//! A [`NetworkPlatform`] reports per-network events; the monitor folds them
//! into the set of networks that have validated internet access and emits
//! whether that set is non-empty, skipping repeats.

mod platform;

pub use platform::{ManualPlatform, ProbePlatform};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

/// Opaque identifier of a network known to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(pub u64);

/// Capabilities a platform reports for a network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCapabilities {
  pub internet: bool,
  pub validated: bool,
}

impl NetworkCapabilities {
  pub const ONLINE: NetworkCapabilities = NetworkCapabilities {
    internet: true,
    validated: true,
  };

  /// Whether this network counts as connected
  pub fn has_validated_internet(&self) -> bool {
    self.internet && self.validated
  }
}

/// Network change reported by a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
  Available {
    network: NetworkId,
    capabilities: NetworkCapabilities,
  },
  Lost {
    network: NetworkId,
  },
  CapabilitiesChanged {
    network: NetworkId,
    capabilities: NetworkCapabilities,
  },
}

/// Handle returned by [`NetworkPlatform::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration(pub u64);

pub type NetworkCallback = Arc<dyn Fn(NetworkEvent) + Send + Sync>;

/// Source of network events.
pub trait NetworkPlatform: Send + Sync {
  /// The currently active network and its capabilities, if any.
  fn active_network(&self) -> Option<(NetworkId, NetworkCapabilities)>;

  /// Start delivering events to `callback`.
  fn register(&self, callback: NetworkCallback) -> Registration;

  /// Stop delivering events for `registration`.
  fn unregister(&self, registration: Registration);
}

/// Connectivity state shared between a subscription and its callback
struct Tracker {
  networks: HashSet<NetworkId>,
  last: Option<bool>,
  tx: mpsc::UnboundedSender<bool>,
}

impl Tracker {
  fn apply(&mut self, event: NetworkEvent) {
    match event {
      NetworkEvent::Available {
        network,
        capabilities,
      }
      | NetworkEvent::CapabilitiesChanged {
        network,
        capabilities,
      } => {
        if capabilities.has_validated_internet() {
          self.networks.insert(network);
        } else {
          self.networks.remove(&network);
        }
      }
      NetworkEvent::Lost { network } => {
        self.networks.remove(&network);
      }
    }
    self.emit();
  }

  fn emit(&mut self) {
    let connected = !self.networks.is_empty();
    if self.last == Some(connected) {
      return;
    }
    self.last = Some(connected);
    debug!(connected, "connectivity changed");
    // Receiver gone means the subscription is being dropped
    let _ = self.tx.send(connected);
  }
}

/// Watches a platform for connectivity changes
#[derive(Clone)]
pub struct ConnectivityMonitor {
  platform: Arc<dyn NetworkPlatform>,
}

impl ConnectivityMonitor {
  pub fn new(platform: Arc<dyn NetworkPlatform>) -> Self {
    Self { platform }
  }

  /// Synchronous check of the active network.
  pub fn is_connected(&self) -> bool {
    self
      .platform
      .active_network()
      .is_some_and(|(_, caps)| caps.has_validated_internet())
  }

  /// Subscribe to connectivity changes.
  ///
  /// The current state is queued before this returns, so the first
  /// [`ConnectivitySubscription::next`] resolves immediately.
  pub fn subscribe(&self) -> ConnectivitySubscription {
    let (tx, rx) = mpsc::unbounded_channel();
    let tracker = Arc::new(Mutex::new(Tracker {
      networks: HashSet::new(),
      last: None,
      tx,
    }));

    // Hold the tracker while registering so no event is emitted ahead of
    // the initial state.
    let registration = {
      let mut state = tracker.lock().unwrap_or_else(|e| e.into_inner());

      let callback_tracker = Arc::clone(&tracker);
      let registration = self.platform.register(Arc::new(move |event| {
        let mut state = callback_tracker.lock().unwrap_or_else(|e| e.into_inner());
        state.apply(event);
      }));

      if let Some((network, caps)) = self.platform.active_network() {
        if caps.has_validated_internet() {
          state.networks.insert(network);
        }
      }
      state.emit();
      registration
    };

    ConnectivitySubscription {
      rx,
      platform: Arc::clone(&self.platform),
      registration,
    }
  }
}

/// Stream of deduplicated connectivity states. Dropping it releases the
/// platform registration.
pub struct ConnectivitySubscription {
  rx: mpsc::UnboundedReceiver<bool>,
  platform: Arc<dyn NetworkPlatform>,
  registration: Registration,
}

impl ConnectivitySubscription {
  /// Wait for the next state.
  pub async fn next(&mut self) -> Option<bool> {
    self.rx.recv().await
  }

  /// Take a state if one is already queued.
  pub fn try_next(&mut self) -> Option<bool> {
    self.rx.try_recv().ok()
  }
}

impl Drop for ConnectivitySubscription {
  fn drop(&mut self) {
    self.platform.unregister(self.registration);
  }
}

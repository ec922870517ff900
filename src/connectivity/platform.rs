//! Network platforms: a TCP reachability probe and a manually driven one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::{
  NetworkCallback, NetworkCapabilities, NetworkEvent, NetworkId, NetworkPlatform, Registration,
};

/// Registered callbacks keyed by registration id
#[derive(Default)]
struct Callbacks {
  next_id: AtomicU64,
  registered: Mutex<HashMap<u64, NetworkCallback>>,
}

impl Callbacks {
  fn register(&self, callback: NetworkCallback) -> Registration {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    self
      .registered
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(id, callback);
    Registration(id)
  }

  fn unregister(&self, registration: Registration) {
    self
      .registered
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .remove(&registration.0);
  }

  fn len(&self) -> usize {
    self
      .registered
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .len()
  }

  /// Deliver `event` outside the registry lock so callbacks may unregister.
  fn dispatch(&self, event: NetworkEvent) {
    let callbacks: Vec<NetworkCallback> = self
      .registered
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .values()
      .cloned()
      .collect();
    for callback in callbacks {
      callback(event);
    }
  }
}

// ============================================================================
// Manual platform
// ============================================================================

/// Platform whose events are supplied by the caller.
///
/// With no events it reports no network at all, which is how `--offline`
/// runs are wired.
#[derive(Default)]
pub struct ManualPlatform {
  callbacks: Callbacks,
  /// Known networks in the order they became available; the last one is active
  networks: Mutex<Vec<(NetworkId, NetworkCapabilities)>>,
}

impl ManualPlatform {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `event` and deliver it to every registered callback.
  pub fn emit(&self, event: NetworkEvent) {
    {
      let mut networks = self.networks.lock().unwrap_or_else(|e| e.into_inner());
      match event {
        NetworkEvent::Available {
          network,
          capabilities,
        } => {
          networks.retain(|(id, _)| *id != network);
          networks.push((network, capabilities));
        }
        NetworkEvent::Lost { network } => networks.retain(|(id, _)| *id != network),
        NetworkEvent::CapabilitiesChanged {
          network,
          capabilities,
        } => {
          if let Some(entry) = networks.iter_mut().find(|(id, _)| *id == network) {
            entry.1 = capabilities;
          }
        }
      }
    }
    self.callbacks.dispatch(event);
  }

  /// Number of live registrations
  pub fn registrations(&self) -> usize {
    self.callbacks.len()
  }
}

impl NetworkPlatform for ManualPlatform {
  fn active_network(&self) -> Option<(NetworkId, NetworkCapabilities)> {
    self
      .networks
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .last()
      .copied()
  }

  fn register(&self, callback: NetworkCallback) -> Registration {
    self.callbacks.register(callback)
  }

  fn unregister(&self, registration: Registration) {
    self.callbacks.unregister(registration)
  }
}

// ============================================================================
// Probe platform
// ============================================================================

/// The single synthetic network a probe reports
const PROBE_NETWORK: NetworkId = NetworkId(0);

/// Platform that treats "a TCP connection to the API host succeeds" as
/// validated internet access, re-probing on an interval.
pub struct ProbePlatform {
  callbacks: Callbacks,
  reachable: AtomicBool,
  addr: String,
  timeout: Duration,
}

impl ProbePlatform {
  /// Probe once, then keep probing every `interval` until the platform is dropped.
  pub async fn start(addr: String, interval: Duration, timeout: Duration) -> Arc<Self> {
    let platform = Arc::new(Self {
      callbacks: Callbacks::default(),
      reachable: AtomicBool::new(false),
      addr,
      timeout,
    });

    let reachable = platform.probe().await;
    platform.reachable.store(reachable, Ordering::SeqCst);
    info!(addr = %platform.addr, reachable, "initial connectivity probe");

    let weak = Arc::downgrade(&platform);
    tokio::spawn(probe_loop(weak, interval));

    platform
  }

  async fn probe(&self) -> bool {
    match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
      Ok(Ok(_)) => true,
      Ok(Err(e)) => {
        debug!(addr = %self.addr, error = %e, "probe failed");
        false
      }
      Err(_) => {
        debug!(addr = %self.addr, "probe timed out");
        false
      }
    }
  }

  fn update(&self, reachable: bool) {
    if self.reachable.swap(reachable, Ordering::SeqCst) == reachable {
      return;
    }
    info!(reachable, "connectivity probe changed");
    let event = if reachable {
      NetworkEvent::Available {
        network: PROBE_NETWORK,
        capabilities: NetworkCapabilities::ONLINE,
      }
    } else {
      NetworkEvent::Lost {
        network: PROBE_NETWORK,
      }
    };
    self.callbacks.dispatch(event);
  }
}

async fn probe_loop(platform: Weak<ProbePlatform>, interval: Duration) {
  loop {
    tokio::time::sleep(interval).await;
    let Some(platform) = platform.upgrade() else {
      break;
    };
    let reachable = platform.probe().await;
    platform.update(reachable);
  }
}

impl NetworkPlatform for ProbePlatform {
  fn active_network(&self) -> Option<(NetworkId, NetworkCapabilities)> {
    self
      .reachable
      .load(Ordering::SeqCst)
      .then_some((PROBE_NETWORK, NetworkCapabilities::ONLINE))
  }

  fn register(&self, callback: NetworkCallback) -> Registration {
    self.callbacks.register(callback)
  }

  fn unregister(&self, registration: Registration) {
    self.callbacks.unregister(registration)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::connectivity::ConnectivityMonitor;
  use tokio::net::TcpListener;

  #[tokio::test]
  async fn test_probe_reports_reachable_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let platform = ProbePlatform::start(
      addr,
      Duration::from_secs(60),
      Duration::from_millis(500),
    )
    .await;

    assert_eq!(
      platform.active_network(),
      Some((PROBE_NETWORK, NetworkCapabilities::ONLINE))
    );
  }

  #[tokio::test]
  async fn test_probe_transitions_dispatch_events() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let platform = ProbePlatform::start(
      addr,
      Duration::from_secs(60),
      Duration::from_millis(500),
    )
    .await;

    let monitor = ConnectivityMonitor::new(platform.clone());
    let mut sub = monitor.subscribe();
    assert_eq!(sub.try_next(), Some(true));

    platform.update(false);
    platform.update(false);
    assert_eq!(sub.try_next(), Some(false));
    assert_eq!(sub.try_next(), None);
    assert!(!monitor.is_connected());
  }
}

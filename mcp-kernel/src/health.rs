use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::hub::CoordinationHub;

#[derive(Debug, Serialize, Deserialize)]
pub struct KernelHealth {
    pub uptime_seconds: u64,
    pub clients_tracked: usize,
    pub active_clients: usize,
    pub messages_stored: usize,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn get_health(&self, hub: &CoordinationHub) -> KernelHealth {
        KernelHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            clients_tracked: hub.client_count(),
            active_clients: hub.active_client_count(),
            messages_stored: hub.message_count(),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

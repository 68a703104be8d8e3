//! Memory Monitor Implementation using `sysinfo`

use bridge_traits::MemoryMonitor;
use parking_lot::Mutex;
use sysinfo::System;

/// Reports the memory the OS considers available for new allocations.
pub struct SysinfoMemoryMonitor {
    system: Mutex<System>,
}

impl SysinfoMemoryMonitor {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoMemoryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMonitor for SysinfoMemoryMonitor {
    fn available_bytes(&self) -> u64 {
        let mut system = self.system.lock();
        system.refresh_memory();
        system.available_memory()
    }
}

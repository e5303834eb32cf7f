//! Relay run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;

/// Statistics from a relay run
#[derive(Debug, Clone)]
pub struct RelayStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Number of scheduled jobs
    pub scheduled_jobs: usize,

    /// Registry size at shutdown
    pub registered_chats: usize,

    /// Dispatcher counters after the queue drained
    pub dispatch: MetricsSnapshot,
}

impl RelayStats {
    /// Share of delivery attempts that succeeded, as percentage
    pub fn delivery_rate(&self) -> f64 {
        let total = self.dispatch.deliveries_ok + self.dispatch.deliveries_failed;
        if total > 0 {
            (self.dispatch.deliveries_ok as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Relay Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Scheduled jobs: {}", self.scheduled_jobs);
        println!("   └─ Registered chats: {}", self.registered_chats);

        println!("\nBroadcasts");
        println!("   ├─ Jobs run: {}", self.dispatch.jobs_run);
        println!("   ├─ Jobs failed: {}", self.dispatch.jobs_failed);
        println!("   ├─ Jobs dropped (queue full): {}", self.dispatch.jobs_dropped);
        println!(
            "   ├─ Deliveries: {} ok, {} failed",
            self.dispatch.deliveries_ok, self.dispatch.deliveries_failed
        );
        println!("   └─ Delivery rate: {:.2}%", self.delivery_rate());

        println!();
    }
}

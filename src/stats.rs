//! Process-wide request statistics shared between the dispatcher, the
//! workers and the interrupt listener.
//!
//! `serviced` and `total_service_time` are guarded by two independent
//! mutexes. A completion updates one and then the other, so a snapshot taken
//! between the two updates sees the request as serviced without its latency.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for requests received, requests completed and service time
#[derive(Debug, Default)]
pub struct StatsRegistry {
    requested: AtomicU64,
    serviced: Mutex<u64>,
    /// Sum of completed latencies, in latency units
    total_service_time: Mutex<u64>,
}

/// One read of the registry, rendered as the shutdown report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub requested: u64,
    pub serviced: u64,
    pub total_service_time: u64,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one accepted request. Only the dispatcher loop calls this.
    pub fn increment_requested(&self) {
        self.requested.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a finished request that took `units` of simulated latency
    pub fn record_completion(&self, units: u64) -> Result<()> {
        {
            let mut serviced = self
                .serviced
                .lock()
                .map_err(|_| Error::LockPoisoned("serviced"))?;
            *serviced += 1;
        }

        let mut total = self
            .total_service_time
            .lock()
            .map_err(|_| Error::LockPoisoned("total_service_time"))?;
        *total += units;

        Ok(())
    }

    /// Read the three counters.
    ///
    /// `serviced` is read before `requested`. Every request is counted before
    /// its worker is spawned, so the returned snapshot never shows more
    /// serviced than requested.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let serviced = *self
            .serviced
            .lock()
            .map_err(|_| Error::LockPoisoned("serviced"))?;
        let requested = self.requested.load(Ordering::SeqCst);
        let total_service_time = *self
            .total_service_time
            .lock()
            .map_err(|_| Error::LockPoisoned("total_service_time"))?;

        Ok(Snapshot {
            requested,
            serviced,
            total_service_time,
        })
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total files requested: {}", self.requested)?;
        writeln!(f, "Total files serviced: {}", self.serviced)?;
        writeln!(f, "Total service_time duration: {}", self.total_service_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fresh_registry_is_zero() {
        let stats = StatsRegistry::new();
        assert_eq!(stats.snapshot().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_report_format() {
        let snap = Snapshot {
            requested: 3,
            serviced: 2,
            total_service_time: 11,
        };
        assert_eq!(
            snap.to_string(),
            "Total files requested: 3\n\
             Total files serviced: 2\n\
             Total service_time duration: 11\n"
        );
    }

    #[test]
    fn test_concurrent_completions_lose_no_updates() {
        const WORKERS: u64 = 64;
        const UNITS: u64 = 7;

        let stats = Arc::new(StatsRegistry::new());
        for _ in 0..WORKERS {
            stats.increment_requested();
        }

        let handles: Vec<_> = (0..WORKERS)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || stats.record_completion(UNITS).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snap = stats.snapshot().unwrap();
        assert_eq!(snap.requested, WORKERS);
        assert_eq!(snap.serviced, WORKERS);
        assert_eq!(snap.total_service_time, WORKERS * UNITS);
    }

    #[test]
    fn test_serviced_never_exceeds_requested_while_racing() {
        let stats = Arc::new(StatsRegistry::new());

        let writer = {
            let stats = Arc::clone(&stats);
            thread::spawn(move || {
                for _ in 0..2000 {
                    stats.increment_requested();
                    let stats = Arc::clone(&stats);
                    thread::spawn(move || stats.record_completion(1).unwrap())
                        .join()
                        .unwrap();
                }
            })
        };

        while !writer.is_finished() {
            let snap = stats.snapshot().unwrap();
            assert!(snap.serviced <= snap.requested, "{snap:?}");
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let stats = Arc::new(StatsRegistry::new());
        let poisoner = Arc::clone(&stats);
        let _ = thread::spawn(move || {
            let _guard = poisoner.serviced.lock().unwrap();
            panic!("poison the serviced lock");
        })
        .join();

        assert!(matches!(
            stats.record_completion(1),
            Err(Error::LockPoisoned("serviced"))
        ));
        assert!(matches!(
            stats.snapshot(),
            Err(Error::LockPoisoned("serviced"))
        ));
    }
}

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use std::time::Instant;

/// Counters for one middleware instance.
#[derive(Debug)]
pub struct CspStats {
    request_count: AtomicUsize,
    nonce_generation_count: AtomicUsize,
    header_failure_count: AtomicUsize,
    header_generation_time_ns: AtomicU64,
    start_time: Instant,
}

impl Default for CspStats {
    fn default() -> Self {
        Self {
            request_count: Default::default(),
            nonce_generation_count: Default::default(),
            header_failure_count: Default::default(),
            header_generation_time_ns: Default::default(),
            start_time: Instant::now(),
        }
    }
}

impl CspStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nonce_generation_count(&self) -> usize {
        self.nonce_generation_count.load(Ordering::Relaxed)
    }

    /// Requests refused because no header could be produced.
    #[inline]
    pub fn header_failure_count(&self) -> usize {
        self.header_failure_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn avg_header_generation_time_ns(&self) -> f64 {
        let count = self.request_count.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            self.header_generation_time_ns.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    #[inline]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    #[inline]
    pub(crate) fn increment_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_nonce_generation_count(&self) {
        self.nonce_generation_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_header_failure_count(&self) {
        self.header_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at `u64::MAX` nanoseconds instead of wrapping.
    pub(crate) fn add_header_generation_time(&self, elapsed: Duration) {
        let time_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let _ = self.header_generation_time_ns.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |total| Some(total.saturating_add(time_ns)),
        );
    }

    #[inline]
    pub fn total_header_generation_time_ns(&self) -> u64 {
        self.header_generation_time_ns.load(Ordering::Relaxed)
    }
}

impl fmt::Display for CspStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CSP Middleware Statistics:")?;
        writeln!(f, "  Uptime: {} seconds", self.uptime_secs())?;
        writeln!(f, "  Requests processed: {}", self.request_count())?;
        writeln!(f, "  Nonces generated: {}", self.nonce_generation_count())?;
        writeln!(f, "  Header failures: {}", self.header_failure_count())?;
        writeln!(
            f,
            "  Average header generation time: {:.2} ns",
            self.avg_header_generation_time_ns()
        )?;
        Ok(())
    }
}

//! Injected delay/jitter provider.
//!
//! Every humanizing pause in the pipeline (scroll pacing, settle waits,
//! inter-article throttling) goes through [`Pacer`], so tests can run whole
//! cycles instantly and deterministically.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

#[async_trait]
pub trait Pacer: Send {
    /// Pick a value in `[lo, hi]` (inclusive). Used both for millisecond
    /// delays and for small counts such as scroll passes.
    fn pick(&mut self, lo: u64, hi: u64) -> u64;

    /// Cooperative pause; never a blocking sleep.
    async fn sleep_ms(&mut self, ms: u64);

    /// Pick-and-sleep in one step.
    async fn pause(&mut self, lo_ms: u64, hi_ms: u64) {
        let ms = self.pick(lo_ms, hi_ms);
        self.sleep_ms(ms).await;
    }
}

/// Production pacer: uniform random picks, real tokio sleeps.
#[derive(Debug, Default)]
pub struct JitterPacer;

impl JitterPacer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Pacer for JitterPacer {
    fn pick(&mut self, lo: u64, hi: u64) -> u64 {
        rand::rng().random_range(lo..=hi)
    }

    async fn sleep_ms(&mut self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Test pacer: always picks the lower bound and never actually sleeps.
#[derive(Debug, Default)]
pub struct InstantPacer;

impl InstantPacer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    fn pick(&mut self, lo: u64, _hi: u64) -> u64 {
        lo
    }

    async fn sleep_ms(&mut self, _ms: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_pick_stays_in_range() {
        let mut pacer = JitterPacer::new();
        for _ in 0..50 {
            let v = pacer.pick(800, 1500);
            assert!((800..=1500).contains(&v));
        }
    }

    #[tokio::test]
    async fn instant_pacer_is_deterministic() {
        let mut pacer = InstantPacer::new();
        assert_eq!(pacer.pick(3, 4), 3);
        // Must return without advancing time.
        pacer.pause(1_500, 3_000).await;
    }
}

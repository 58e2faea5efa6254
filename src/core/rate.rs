//! Adaptive pacing for calls to the text generator.
//!
//! The provider's quota is only observable through failures, so the delay
//! grows multiplicatively on failure and decays by 10% on success, always
//! clamped to `[min_delay, max_delay]`.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 抖動幅度 (±15%)
pub const JITTER_RATIO: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub initial_delay_ms: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            min_delay_ms: 1_000,
            max_delay_ms: 60_000,
            initial_delay_ms: 1_000,
        }
    }
}

#[derive(Debug)]
pub struct RateController {
    delay_ms: AtomicU64,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl RateController {
    pub fn new(settings: RateLimitSettings) -> Self {
        let min = settings.min_delay_ms.min(settings.max_delay_ms);
        let max = settings.max_delay_ms.max(min);
        Self {
            delay_ms: AtomicU64::new(settings.initial_delay_ms.clamp(min, max)),
            min_delay_ms: min,
            max_delay_ms: max,
        }
    }

    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::Relaxed))
    }

    /// delay = min(max, max(delay * 2, retry_hint))
    pub fn record_failure(&self, retry_hint_ms: Option<u64>) -> Duration {
        let (min, max) = (self.min_delay_ms, self.max_delay_ms);
        let previous = self
            .delay_ms
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |delay| {
                let doubled = delay.saturating_mul(2).max(min);
                Some(doubled.max(retry_hint_ms.unwrap_or(0)).min(max))
            })
            .unwrap_or(max);
        let next = self.current_delay();
        tracing::debug!(
            previous_ms = previous,
            delay_ms = next.as_millis() as u64,
            "🐢 Rate controller backing off"
        );
        next
    }

    /// delay = max(min, floor(delay * 0.9))
    pub fn record_success(&self) -> Duration {
        let min = self.min_delay_ms;
        let _ = self
            .delay_ms
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |delay| {
                Some((delay.saturating_mul(9) / 10).max(min))
            });
        self.current_delay()
    }

    /// 目前延遲加上 ±15% 均勻雜訊，避免多個批次同時打到供應商
    pub fn jittered_delay(&self) -> Duration {
        jitter(self.current_delay(), &mut rand::thread_rng())
    }
}

pub fn jitter<R: Rng + ?Sized>(delay: Duration, rng: &mut R) -> Duration {
    let base = delay.as_millis() as f64;
    if base <= 0.0 {
        return Duration::ZERO;
    }
    let factor = 1.0 + rng.gen_range(-JITTER_RATIO..=JITTER_RATIO);
    Duration::from_millis((base * factor).round().max(0.0) as u64)
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::providers::AllProviders;

/// Time source for cooldown bookkeeping. Injected so tests can move time
/// forward without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Tracks which providers are benched after signalling a rate limit and
/// until when. Entries are written once per rate limit signal and expire
/// implicitly, the map is never cleaned up.
///
/// Concurrent resolutions race on these writes but a stale
/// `now + window` losing to a fresher one changes nothing observable, so
/// a plain read/write lock is enough.
pub struct CooldownTracker {
    clock: Arc<dyn Clock>,
    until: RwLock<HashMap<AllProviders, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            until: RwLock::new(HashMap::new()),
        }
    }

    /// Whether the provider should be skipped right now
    pub fn cooling_down(&self, provider: AllProviders) -> bool {
        let until = self.until.read();
        until
            .get(&provider)
            .map(|expiry| self.clock.now() < *expiry)
            .unwrap_or(false)
    }

    /// Benches a provider until `now + window`
    pub fn begin(&self, provider: AllProviders, window: Duration) {
        let expiry = self.clock.now() + window;
        self.until.write().insert(provider, expiry);
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    #[test]
    fn fresh_tracker_has_no_cooldowns() {
        let tracker = CooldownTracker::default();
        assert!(!tracker.cooling_down(AllProviders::UnsplashSearch));
    }

    #[test]
    fn cooldowns_expire_with_the_clock() {
        let clock = Arc::new(ManualClock::starting_now());
        let tracker = CooldownTracker::new(Arc::clone(&clock) as Arc<dyn Clock>);

        tracker.begin(AllProviders::UnsplashSearch, Duration::hours(1));
        assert!(tracker.cooling_down(AllProviders::UnsplashSearch));
        // other providers are unaffected
        assert!(!tracker.cooling_down(AllProviders::PexelsSearch));

        clock.advance(Duration::minutes(59));
        assert!(tracker.cooling_down(AllProviders::UnsplashSearch));

        clock.advance(Duration::minutes(2));
        assert!(!tracker.cooling_down(AllProviders::UnsplashSearch));
    }

    #[test]
    fn newer_windows_overwrite_older_ones() {
        let clock = Arc::new(ManualClock::starting_now());
        let tracker = CooldownTracker::new(Arc::clone(&clock) as Arc<dyn Clock>);

        tracker.begin(AllProviders::PixabaySearch, Duration::hours(1));
        clock.advance(Duration::minutes(30));
        tracker.begin(AllProviders::PixabaySearch, Duration::hours(1));

        clock.advance(Duration::minutes(45));
        assert!(tracker.cooling_down(AllProviders::PixabaySearch));
        clock.advance(Duration::minutes(16));
        assert!(!tracker.cooling_down(AllProviders::PixabaySearch));
    }
}

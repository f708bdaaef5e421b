//! Completion overlay: a visibility flag plus the hide actions scheduled
//! against it.
//!
//! Time is always passed in by the caller, so the same code serves the
//! terminal loop (`Instant::now()`) and the scripted front-end (virtual
//! clock).

use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{debug, instrument, warn};

pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_secs(10);
pub const OVERLAY_TITLE: &str = "Verification Completed";
pub const OVERLAY_ATTRIBUTION: &str = "Made by Abdullah";

/// What happens to an already pending hide when the overlay is armed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RearmPolicy {
    /// Every arming schedules its own hide; whichever fires first hides the
    /// overlay, even if a later arming is still counting down.
    #[default]
    Stack,
    /// Single slot: the pending hide is cancelled and replaced.
    Replace,
}

impl RearmPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RearmPolicy::Replace => "replace",
            RearmPolicy::Stack => "stack",
        }
    }
}

impl std::str::FromStr for RearmPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" | "debounce" => Ok(RearmPolicy::Replace),
            "stack" | "overlap" => Ok(RearmPolicy::Stack),
            other => Err(anyhow!(
                "invalid overlay re-arm policy: {other} (expected replace or stack)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySettings {
    pub delay: Duration,
    pub policy: RearmPolicy,
    pub title: String,
    pub attribution: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_HIDE_DELAY,
            policy: RearmPolicy::default(),
            title: OVERLAY_TITLE.to_string(),
            attribution: OVERLAY_ATTRIBUTION.to_string(),
        }
    }
}

/// Names one scheduled hide so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HideHandle(u64);

#[derive(Debug, Clone, Copy)]
struct PendingHide {
    handle: HideHandle,
    /// `None` when `now + delay` is past what `Instant` can represent; such a
    /// hide never fires.
    due: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct Overlay {
    visible: bool,
    delay: Duration,
    policy: RearmPolicy,
    pending: Vec<PendingHide>,
    next_handle: u64,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_DELAY, RearmPolicy::default())
    }
}

impl Overlay {
    pub fn new(delay: Duration, policy: RearmPolicy) -> Self {
        Self {
            visible: false,
            delay,
            policy,
            pending: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn from_settings(settings: &OverlaySettings) -> Self {
        Self::new(settings.delay, settings.policy)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn policy(&self) -> RearmPolicy {
        self.policy
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Shows the overlay and schedules a hide `delay` after `now`.
    #[instrument(skip(self, now), fields(policy = self.policy.as_str()))]
    pub fn arm(&mut self, now: Instant) -> HideHandle {
        if self.policy == RearmPolicy::Replace {
            let stale: Vec<HideHandle> = self.pending.iter().map(|p| p.handle).collect();
            for handle in stale {
                self.cancel(handle);
            }
        }

        let handle = HideHandle(self.next_handle);
        self.next_handle += 1;
        let due = now.checked_add(self.delay);
        if due.is_none() {
            warn!(handle = handle.0, "hide delay beyond clock range; overlay stays up");
        }
        self.pending.push(PendingHide { handle, due });
        self.visible = true;

        debug!(
            handle = handle.0,
            pending = self.pending.len(),
            delay_ms = self.delay.as_millis() as u64,
            "overlay armed"
        );
        handle
    }

    /// Drops a pending hide. Returns false when it already fired or was
    /// cancelled. Does not change visibility.
    pub fn cancel(&mut self, handle: HideHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        let removed = self.pending.len() != before;
        if removed {
            debug!(handle = handle.0, "cancelled pending hide");
        }
        removed
    }

    /// Fires every hide due at or before `now` and returns how many fired.
    pub fn tick(&mut self, now: Instant) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.due.is_none_or(|due| due > now));
        let fired = before - self.pending.len();
        if fired > 0 {
            self.visible = false;
            debug!(fired, pending = self.pending.len(), "overlay hide fired");
        }
        fired
    }

    /// Time left until the next hide. `None` while hidden, or while visible
    /// with no hide that can ever fire.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if !self.visible {
            return None;
        }
        self.pending
            .iter()
            .filter_map(|p| p.due)
            .map(|due| due.saturating_duration_since(now))
            .min()
    }
}

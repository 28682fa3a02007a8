//! Engine configuration.
//!
//! Every struct has a `Default` matching the tuned values the engine was
//! built around and a `validate()` that rejects values which would break an
//! invariant (zero-length segments, negative penalties, …).  Typically loaded
//! from a TOML/JSON file by the application crate (enable the `serde`
//! feature) and passed to `rn_sim::SimBuilder`.

use crate::{CoreError, CoreResult};

// ── TrackConfig ───────────────────────────────────────────────────────────────

/// Tolerances used by the topology editor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackConfig {
    /// Below this angle (degrees) between a node's direction and the
    /// direction to the requested point, track is laid straight.
    pub straight_tolerance_deg: f64,

    /// Shortest segment the editor will create.  Requests producing anything
    /// shorter are rejected with an empty result.
    pub min_segment_length: f64,

    /// A new signal is only placed if the previous signal behind it is at
    /// least `spacing * min_signal_gap_ratio` away.
    pub min_signal_gap_ratio: f64,

    /// Signal sight searches give up beyond this distance.
    pub max_signal_sight: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            straight_tolerance_deg: 2.0,
            min_segment_length:     0.5,
            min_signal_gap_ratio:   0.5,
            max_signal_sight:       5_000.0,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..90.0).contains(&self.straight_tolerance_deg) {
            return Err(CoreError::Config(format!(
                "straight_tolerance_deg must be in [0, 90), got {}",
                self.straight_tolerance_deg
            )));
        }
        if self.min_segment_length <= 0.0 {
            return Err(CoreError::Config("min_segment_length must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.min_signal_gap_ratio) {
            return Err(CoreError::Config("min_signal_gap_ratio must be in [0, 1]".into()));
        }
        if self.max_signal_sight <= 0.0 {
            return Err(CoreError::Config("max_signal_sight must be positive".into()));
        }
        Ok(())
    }
}

// ── RouterConfig ──────────────────────────────────────────────────────────────

/// Scoring and search limits for block reservation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterConfig {
    /// Added to a candidate path's length when any of its segments is
    /// occupied.
    pub occupancy_penalty: f64,

    /// Depth-first walks abandon branches longer than this.
    pub max_search_length: f64,

    /// Upper bound on scheduling targets chained into one reservation.
    pub max_target_hops: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            occupancy_penalty: 10.0,
            max_search_length: 10_000.0,
            max_target_hops:   32,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.occupancy_penalty < 0.0 {
            return Err(CoreError::Config("occupancy_penalty must be non-negative".into()));
        }
        if self.max_search_length <= 0.0 {
            return Err(CoreError::Config("max_search_length must be positive".into()));
        }
        if self.max_target_hops == 0 {
            return Err(CoreError::Config("max_target_hops must be at least 1".into()));
        }
        Ok(())
    }
}

// ── MotionConfig ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// How far back (simulated seconds) pose history is retained for
    /// render queries.
    pub history_secs: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { history_secs: 10.0 }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.history_secs <= 0.0 {
            return Err(CoreError::Config("history_secs must be positive".into()));
        }
        Ok(())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated seconds per tick.
    pub tick_secs: f64,

    /// Total ticks `Sim::run` executes.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    pub track:  TrackConfig,
    pub router: RouterConfig,
    pub motion: MotionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_secs:   0.1,
            total_ticks: 600,
            seed:        0,
            track:       TrackConfig::default(),
            router:      RouterConfig::default(),
            motion:      MotionConfig::default(),
        }
    }
}

impl SimConfig {
    /// Validate this config and all nested sections.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_secs > 0.0 && self.tick_secs.is_finite()) {
            return Err(CoreError::Config(format!(
                "tick_secs must be positive and finite, got {}",
                self.tick_secs
            )));
        }
        self.track.validate()?;
        self.router.validate()?;
        self.motion.validate()
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> crate::SimClock {
        crate::SimClock::new(self.tick_secs)
    }
}

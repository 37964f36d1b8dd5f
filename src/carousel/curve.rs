//! Easing curves used by the transition controller.

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::debug;

use crate::events::ParameterChange;

pub const PROPERTY_SIGMA: &str = "sigma";
pub const PROPERTY_PHASE: &str = "phase";

/// Maps a raw time fraction in `[0, 1]` to an eased progress fraction.
///
/// Implementations are pure. The output is not guaranteed to stay inside
/// `[0, 1]`; callers clamp.
pub trait AnimationCurve {
    fn compute(&self, t: f64) -> f64;
}

/// Bell-shaped curve `exp(-0.5 * (sigma * (t + phase))^2)`.
///
/// `sigma` narrows the bell, `phase` shifts its peak to `t = -phase`. With
/// the defaults the rising flank covers the whole `[0, 1]` interval, which
/// yields a slow start and a soft landing.
#[derive(Debug)]
pub struct BellCurve {
    sigma: f64,
    phase: f64,
    subscribers: Vec<Sender<ParameterChange>>,
}

impl BellCurve {
    pub const DEFAULT_SIGMA: f64 = 2.8;
    pub const DEFAULT_PHASE: f64 = -0.98;

    pub fn new(sigma: f64, phase: f64) -> Self {
        Self {
            sigma,
            phase,
            subscribers: Vec::new(),
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn set_sigma(&mut self, sigma: f64) {
        let old = std::mem::replace(&mut self.sigma, sigma);
        self.notify(PROPERTY_SIGMA, old, sigma);
    }

    pub fn set_phase(&mut self, phase: f64) {
        let old = std::mem::replace(&mut self.phase, phase);
        self.notify(PROPERTY_PHASE, old, phase);
    }

    /// Register a listener for parameter changes. Dropped receivers are
    /// pruned on the next notification.
    pub fn subscribe(&mut self) -> Receiver<ParameterChange> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, name: &'static str, old: f64, new: f64) {
        debug!(parameter = name, old, new, "curve parameter changed");
        self.subscribers
            .retain(|tx| tx.send(ParameterChange { name, old, new }).is_ok());
    }
}

impl Default for BellCurve {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIGMA, Self::DEFAULT_PHASE)
    }
}

impl AnimationCurve for BellCurve {
    fn compute(&self, t: f64) -> f64 {
        let x = self.sigma * (t + self.phase);
        (-0.5 * x * x).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bell_rises_across_unit_interval() {
        let curve = BellCurve::default();
        let start = curve.compute(0.0);
        let mid = curve.compute(0.5);
        let end = curve.compute(1.0);
        assert!(start < 0.05, "start = {start}");
        assert!(mid > start && mid < end);
        assert!(end > 0.99, "end = {end}");
        assert!(end <= 1.0);
    }

    #[test]
    fn peak_sits_at_negated_phase() {
        let curve = BellCurve::new(4.0, -0.5);
        assert!((curve.compute(0.5) - 1.0).abs() < 1e-12);
        assert!(curve.compute(0.4) < 1.0);
        assert!(curve.compute(0.6) < 1.0);
    }

    #[test]
    fn parameter_changes_reach_subscribers() {
        let mut curve = BellCurve::default();
        let rx = curve.subscribe();
        curve.set_sigma(3.5);
        curve.set_phase(-1.0);
        let first = rx.try_recv().unwrap();
        assert_eq!(first.name, PROPERTY_SIGMA);
        assert_eq!(first.old, BellCurve::DEFAULT_SIGMA);
        assert_eq!(first.new, 3.5);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.name, PROPERTY_PHASE);
        assert_eq!(second.old, BellCurve::DEFAULT_PHASE);
        assert_eq!(second.new, -1.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut curve = BellCurve::default();
        drop(curve.subscribe());
        let live = curve.subscribe();
        curve.set_sigma(1.0);
        assert_eq!(curve.subscribers.len(), 1);
        assert!(live.try_recv().is_ok());
    }
}

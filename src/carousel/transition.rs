//! Time-driven slide and zoom sessions over a [`CarouselWindow`].
//!
//! Only one session runs at a time. A slide requested while the selected
//! picture is zoomed becomes a plan of three sessions (zoom out, slide,
//! zoom in) that the render tick advances one after another; no other
//! request is accepted until the whole plan has finished.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, trace};

use super::CarouselWindow;
use super::curve::{AnimationCurve, BellCurve};
use crate::events::{Direction, NavigationCommand, SessionKind, TransitionEvent};
use crate::picture::{PictureCatalog, QuadProducer};

pub const DEFAULT_SLIDE_DURATION: Duration = Duration::from_millis(800);
pub const DEFAULT_ZOOM_DURATION: Duration = Duration::from_millis(400);

/// A running session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub kind: SessionKind,
    pub start: Instant,
    pub duration: Duration,
    /// Eased progress, clamped to `[0, 1]`.
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Running(Session),
}

/// Progress of the session observed during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub kind: SessionKind,
    /// Elapsed time over duration, clamped to `[0, 1]`.
    pub raw: f64,
    pub eased: f64,
}

/// What happened during one call to [`TransitionController::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    pub progress: Option<Progress>,
    pub completed: Option<SessionKind>,
    /// A queued session that began right after `completed`.
    pub started: Option<SessionKind>,
}

#[derive(Debug)]
pub struct TransitionController {
    curve: BellCurve,
    slide_duration: Duration,
    zoom_duration: Duration,
    state: State,
    plan: VecDeque<SessionKind>,
    subscribers: Vec<Sender<TransitionEvent>>,
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(
            BellCurve::default(),
            DEFAULT_SLIDE_DURATION,
            DEFAULT_ZOOM_DURATION,
        )
    }
}

impl TransitionController {
    pub fn new(curve: BellCurve, slide_duration: Duration, zoom_duration: Duration) -> Self {
        Self {
            curve,
            slide_duration,
            zoom_duration,
            state: State::Idle,
            plan: VecDeque::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn curve(&self) -> &BellCurve {
        &self.curve
    }

    pub fn curve_mut(&mut self) -> &mut BellCurve {
        &mut self.curve
    }

    /// True while a session runs or a plan still has sessions queued.
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Running(_)) || !self.plan.is_empty()
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Running(session) => Some(session),
            State::Idle => None,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<TransitionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, event: TransitionEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn duration_for(&self, kind: SessionKind) -> Duration {
        match kind {
            SessionKind::Slide(_) => self.slide_duration,
            SessionKind::Zoom { .. } => self.zoom_duration,
        }
    }

    /// Try to start the sessions for `command`. Returns the session that
    /// started, or `None` when the request was ignored.
    pub fn request(
        &mut self,
        command: NavigationCommand,
        window: &mut CarouselWindow,
        len: usize,
        now: Instant,
    ) -> Option<SessionKind> {
        if self.is_active() {
            trace!(?command, "transition active; request ignored");
            return None;
        }
        let plan: Vec<SessionKind> = match command {
            NavigationCommand::Next | NavigationCommand::Previous => {
                let direction = if command == NavigationCommand::Next {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                let allowed = match direction {
                    Direction::Forward => window.can_next(len),
                    Direction::Backward => window.can_previous(),
                };
                if !allowed {
                    trace!(?command, "navigation out of range; request ignored");
                    return None;
                }
                if window.is_showing() {
                    vec![
                        SessionKind::Zoom { opening: false },
                        SessionKind::Slide(direction),
                        SessionKind::Zoom { opening: true },
                    ]
                } else {
                    vec![SessionKind::Slide(direction)]
                }
            }
            NavigationCommand::ToggleShow => {
                if !window.can_show() {
                    return None;
                }
                vec![SessionKind::Zoom {
                    opening: !window.is_showing(),
                }]
            }
        };
        self.plan.extend(plan);
        self.start_queued(window, len, now)
    }

    fn start_queued(
        &mut self,
        window: &mut CarouselWindow,
        len: usize,
        now: Instant,
    ) -> Option<SessionKind> {
        while let Some(kind) = self.plan.pop_front() {
            let ready = match kind {
                SessionKind::Slide(Direction::Forward) => window.can_next(len),
                SessionKind::Slide(Direction::Backward) => window.can_previous(),
                SessionKind::Zoom { .. } => window.can_show(),
            };
            if !ready {
                debug!(?kind, "queued session no longer possible; skipped");
                continue;
            }
            if let SessionKind::Zoom { opening } = kind {
                window.set_showing(opening);
            }
            let duration = self.duration_for(kind);
            debug!(?kind, ?duration, "session started");
            self.state = State::Running(Session {
                kind,
                start: now,
                duration,
                progress: 0.0,
            });
            return Some(kind);
        }
        None
    }

    /// Advance the running session to `now`.
    ///
    /// Progress comes from wall-clock time, so a late tick jumps ahead
    /// instead of slowing the animation down. When the duration has passed
    /// the final pose is applied exactly, slot ownership rotates for slides,
    /// and one `Completed` event is published.
    pub fn tick(
        &mut self,
        now: Instant,
        window: &mut CarouselWindow,
        catalog: &PictureCatalog,
        producer: &QuadProducer,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let State::Running(session) = &mut self.state else {
            return outcome;
        };
        let kind = session.kind;
        let elapsed = now.saturating_duration_since(session.start);

        if elapsed < session.duration {
            let raw = elapsed.as_secs_f64() / session.duration.as_secs_f64();
            let eased = self.curve.compute(raw).clamp(0.0, 1.0);
            session.progress = eased;
            apply(window, kind, eased);
            outcome.progress = Some(Progress { kind, raw, eased });
            return outcome;
        }

        session.progress = 1.0;
        apply(window, kind, 1.0);
        if let SessionKind::Slide(direction) = kind {
            window.finish_slide(direction, catalog, producer);
        }
        self.state = State::Idle;
        outcome.progress = Some(Progress {
            kind,
            raw: 1.0,
            eased: 1.0,
        });
        outcome.completed = Some(kind);

        let navigation = window.navigation(catalog.len());
        debug!(?kind, ?navigation, "session completed");
        self.publish(TransitionEvent::Completed { kind, navigation });

        outcome.started = self.start_queued(window, catalog.len(), now);
        outcome
    }
}

fn apply(window: &mut CarouselWindow, kind: SessionKind, progress: f64) {
    match kind {
        SessionKind::Slide(direction) => window.apply_slide(direction, progress),
        SessionKind::Zoom { opening } => window.apply_zoom(progress, opening),
    }
}

/// Caption opacity at raw slide fraction `raw`: fades out over the first
/// half and back in over the second. The second value is true once the
/// opacity has hit its 0.1 floor, which is when the incoming caption should
/// replace the outgoing one.
pub fn caption_alpha(raw: f64) -> (f32, bool) {
    let alpha = if raw < 0.5 {
        1.0 - 2.0 * raw
    } else {
        ((raw - 0.5) * 2.0).min(1.0)
    };
    if alpha < 0.1 {
        (0.1, true)
    } else {
        (alpha as f32, false)
    }
}

use crate::config::BotConfig;
use crate::geom::{CellPos, Vec3};
use crate::host::{release_all_inputs, AimConfirmer, HostWorld};
use crate::motion::{aim_and_interact, AimOutcome};
use crate::ordering::order;
use crate::scanner::{scan, Candidate, TargetMatcher};
use crate::visibility::is_visible;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// Consecutive cycle resets with no interaction progress before the
/// session gives up instead of spinning.
const MAX_IDLE_RESETS: u32 = 3;

// ── Session state ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SessionState {
    pub processed: HashSet<CellPos>,
    pub obstructed: HashSet<CellPos>,
    pub total_interacted: u64,
}

impl SessionState {
    fn is_fresh(&self, cell: CellPos) -> bool {
        !self.processed.contains(&cell) && !self.obstructed.contains(&cell)
    }

    fn cycle_reset(&mut self) {
        self.processed.clear();
        self.obstructed.clear();
    }
}

enum Phase {
    Idle,
    Scanning,
    Ordering(Vec<Candidate>),
    Visiting(Candidate),
    Cooldown,
    Reset,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Ordering(_) => "ordering",
            Self::Visiting(_) => "visiting",
            Self::Cooldown => "cooldown",
            Self::Reset => "reset",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// A foreground overlay took over the host.
    OverlayInterrupt,
    /// The scan-pass safety valve tripped.
    CycleLimit,
    /// Repeated cycle resets produced nothing new to visit.
    Exhausted,
}

impl SessionEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OverlayInterrupt => "overlay_interrupt",
            Self::CycleLimit => "cycle_limit",
            Self::Exhausted => "exhausted",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub total_interacted: u64,
    pub cells_visited: u64,
    pub scan_passes: u32,
    pub obstructed_marks: u32,
    pub end: SessionEnd,
}

// ── Session loop ────────────────────────────────────────────────────

/// Drive the perception-action loop until the host interrupts, the cycle
/// cap trips, or resets stop producing work.
///
/// Every pass re-scans and re-orders, then visits exactly the head of the
/// ordered sequence, so cells removed or revealed between passes are picked
/// up immediately. All inputs are released on every exit path.
pub fn run_session(
    host: &mut dyn HostWorld,
    confirmer: &dyn AimConfirmer,
    cfg: &BotConfig,
) -> SessionSummary {
    let matcher = TargetMatcher::new(cfg.target_label.clone(), cfg.ignore_state);
    let mut state = SessionState::default();
    let mut scan_passes = 0u32;
    let mut cells_visited = 0u64;
    let mut obstructed_marks = 0u32;
    let mut idle_resets = 0u32;
    let mut interacted_at_last_reset = 0u64;

    let mut phase = if cfg.start_immediately {
        Phase::Scanning
    } else {
        Phase::Idle
    };

    host.emit_message(&format!(
        "targeting {} within {:.1} ({} mode)",
        cfg.target_label,
        cfg.scan_radius,
        cfg.mode.as_str()
    ));

    let end = loop {
        if host.overlay_active() {
            break SessionEnd::OverlayInterrupt;
        }
        log::trace!("phase: {}", phase.name());

        phase = match phase {
            Phase::Idle => {
                if host.activation_pending() {
                    host.emit_message("activation trigger received, starting");
                    Phase::Scanning
                } else {
                    host.sleep(Duration::from_secs_f64(cfg.idle_poll_s));
                    Phase::Idle
                }
            }

            Phase::Scanning => {
                if scan_passes >= cfg.max_cycles {
                    break SessionEnd::CycleLimit;
                }
                scan_passes += 1;

                let origin = host.viewpoint_position();
                let found = scan(host, origin, cfg.scan_radius, &matcher);
                let fresh: Vec<Candidate> = found
                    .into_iter()
                    .filter(|c| state.is_fresh(c.position))
                    .collect();

                if fresh.is_empty() {
                    Phase::Reset
                } else {
                    Phase::Ordering(fresh)
                }
            }

            Phase::Ordering(candidates) => {
                let position = host.viewpoint_position();
                let eye = Vec3::new(position.x, position.y + cfg.eye_height, position.z);
                let remaining = candidates.len();
                let mut ordered = order(candidates, eye, cfg.mode, cfg.link_threshold);
                let head = ordered.swap_remove(0);
                host.emit_message(&format!(
                    "visiting {} ({:.1} away, {} candidate{} this pass)",
                    head.position,
                    head.distance,
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                ));
                Phase::Visiting(head)
            }

            Phase::Visiting(candidate) => {
                // The environment may have changed during ordering; check the
                // overlay once more before committing to the swing.
                if host.overlay_active() {
                    break SessionEnd::OverlayInterrupt;
                }

                let position = host.viewpoint_position();
                let eye = Vec3::new(position.x, position.y + cfg.eye_height, position.z);
                if !is_visible(host, eye, candidate.position, cfg.ray_step, cfg.ignore_last) {
                    host.emit_message(&format!("{} is occluded, deferring", candidate.position));
                    state.obstructed.insert(candidate.position);
                    obstructed_marks += 1;
                    Phase::Cooldown
                } else {
                    match aim_and_interact(host, confirmer, candidate.position, cfg) {
                        AimOutcome::Completed => {
                            state.processed.insert(candidate.position);
                            cells_visited += 1;
                            if cfg.interact {
                                state.total_interacted += 1;
                            }
                        }
                        AimOutcome::Obstructed => {
                            host.emit_message(&format!(
                                "could not lock {}, deferring",
                                candidate.position
                            ));
                            state.obstructed.insert(candidate.position);
                            obstructed_marks += 1;
                        }
                    }
                    Phase::Cooldown
                }
            }

            Phase::Cooldown => {
                host.sleep(Duration::from_secs_f64(cfg.cooldown_s));
                Phase::Scanning
            }

            Phase::Reset => {
                if state.total_interacted == interacted_at_last_reset {
                    idle_resets += 1;
                } else {
                    idle_resets = 0;
                }
                interacted_at_last_reset = state.total_interacted;
                if idle_resets >= MAX_IDLE_RESETS {
                    break SessionEnd::Exhausted;
                }

                log::debug!(
                    "cycle reset: clearing {} processed / {} obstructed",
                    state.processed.len(),
                    state.obstructed.len()
                );
                state.cycle_reset();
                host.sleep(Duration::from_secs_f64(cfg.reset_delay_s));
                Phase::Scanning
            }
        };
    };

    release_all_inputs(host);
    host.emit_message(&format!(
        "session over ({}): {} visited, {} interaction{} across {} scan pass{}",
        end.as_str(),
        cells_visited,
        state.total_interacted,
        if state.total_interacted == 1 { "" } else { "s" },
        scan_passes,
        if scan_passes == 1 { "" } else { "es" }
    ));

    SessionSummary {
        total_interacted: state.total_interacted,
        cells_visited,
        scan_passes,
        obstructed_marks,
        end,
    }
}

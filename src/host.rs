//! Capability seam between the targeting core and the host world.
//!
//! The core never talks to a concrete environment; everything it needs is on
//! `HostWorld`. The crate ships one implementation (`sim::SimWorld`), a real
//! adapter would be another.

use crate::geom::{CellPos, Vec3};
use std::time::Duration;

// ── Query results ───────────────────────────────────────────────────

/// Outcome of one batched classification query.
///
/// `Data` carries one label slot per queried cell, in order. `Empty` means
/// the host answered with nothing, `Failed` that the query itself broke.
/// Callers decide locally what either means; neither is an error.
#[derive(Clone, Debug)]
pub enum ClassifyResult {
    Data(Vec<Option<String>>),
    Empty,
    Failed,
}

/// Cell currently under the crosshair, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetedCell {
    pub position: CellPos,
    pub label: String,
}

// ── Input actions ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Attack,
    Use,
    Forward,
    Backward,
    Left,
    Right,
    Sprint,
}

impl InputAction {
    pub const ALL: [InputAction; 7] = [
        InputAction::Attack,
        InputAction::Use,
        InputAction::Forward,
        InputAction::Backward,
        InputAction::Left,
        InputAction::Right,
        InputAction::Sprint,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Use => "use",
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Left => "left",
            Self::Right => "right",
            Self::Sprint => "sprint",
        }
    }
}

// ── Host capability trait ───────────────────────────────────────────

pub trait HostWorld {
    fn viewpoint_position(&self) -> Vec3;
    /// Current (yaw, pitch) in degrees.
    fn viewpoint_orientation(&self) -> (f64, f64);
    fn set_viewpoint_orientation(&mut self, yaw: f64, pitch: f64);

    /// One batched classification over `cells`; the performance contract is
    /// one host round-trip per call regardless of cell count.
    fn classify_cells(&mut self, cells: &[CellPos]) -> ClassifyResult;

    /// Cell under the crosshair within `max_distance`, if the host can tell.
    fn targeted_cell(&mut self, max_distance: f64) -> Option<TargetedCell>;

    fn set_input(&mut self, action: InputAction, pressed: bool);

    /// User-facing status line (chat/console, not diagnostics).
    fn emit_message(&mut self, text: &str);

    /// True while a foreground overlay (menu, screen) owns the session.
    fn overlay_active(&mut self) -> bool;

    /// True once the activation trigger has fired.
    fn activation_pending(&mut self) -> bool;

    /// Cooperative wait. The sim advances a virtual clock; a live adapter
    /// blocks the calling thread.
    fn sleep(&mut self, duration: Duration);
}

/// Release every input action. Run on all session exit paths so no key is
/// left held.
pub fn release_all_inputs(host: &mut dyn HostWorld) {
    for action in InputAction::ALL {
        host.set_input(action, false);
    }
}

/// Holds one input action pressed, releasing it on drop — including drops
/// from early returns and unwinds mid-interaction.
pub struct InputGuard<'a> {
    host: &'a mut dyn HostWorld,
    action: InputAction,
}

impl<'a> InputGuard<'a> {
    pub fn press(host: &'a mut dyn HostWorld, action: InputAction) -> Self {
        host.set_input(action, true);
        Self { host, action }
    }

    pub fn host(&mut self) -> &mut dyn HostWorld {
        self.host
    }
}

impl Drop for InputGuard<'_> {
    fn drop(&mut self) {
        self.host.set_input(self.action, false);
    }
}

// ── Aim confirmation ────────────────────────────────────────────────

/// One post-rotation probe: is `cell` the thing we are actually aimed at?
///
/// Two implementations cover hosts with and without a crosshair query; the
/// session picks one at startup and never branches on capability again.
pub trait AimConfirmer {
    fn confirm(&self, host: &mut dyn HostWorld, cell: CellPos, max_distance: f64) -> bool;
}

/// Asks the host what the crosshair is on.
pub struct CrosshairConfirmer;

impl AimConfirmer for CrosshairConfirmer {
    fn confirm(&self, host: &mut dyn HostWorld, cell: CellPos, max_distance: f64) -> bool {
        match host.targeted_cell(max_distance) {
            Some(targeted) => targeted.position == cell,
            None => false,
        }
    }
}

/// For hosts without a crosshair probe: trust that the finished rotation is
/// on target.
pub struct TrustingConfirmer;

impl AimConfirmer for TrustingConfirmer {
    fn confirm(&self, _host: &mut dyn HostWorld, _cell: CellPos, _max_distance: f64) -> bool {
        true
    }
}

//! Deterministic in-memory host world.
//!
//! Reference implementation of `HostWorld` used by the CLI, the benchmark
//! harness and the tests. Time is a virtual clock advanced by `sleep`, so
//! sessions run instantly; a live adapter would block instead.

use crate::geom::{CellPos, Vec3};
use crate::host::{ClassifyResult, HostWorld, InputAction, TargetedCell};
use crate::visibility::is_passable;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

// ── Seeded RNG ──────────────────────────────────────────────────────

/// xorshift32 with a fixed non-zero fallback state.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    pub fn next_int(&mut self, max: u32) -> u32 {
        self.next() % max
    }

    pub fn next_range(&mut self, min: i32, max_exclusive: i32) -> i32 {
        debug_assert!(max_exclusive > min);
        let span = (max_exclusive - min) as u32;
        min + self.next_int(span) as i32
    }
}

// ── Simulated world ─────────────────────────────────────────────────

const FLOOR_EXTENT: i32 = 12;
const FLOOR_DEPTH: i32 = 4;
const SIM_REACH: f64 = 6.0;
const EYE_HEIGHT: f64 = 1.62;
const CROSSHAIR_STEP: f64 = 0.05;

pub struct SimWorld {
    /// Absent cells are air.
    cells: HashMap<CellPos, String>,
    position: Vec3,
    yaw: f64,
    pitch: f64,
    clock: Duration,
    held: HashSet<InputAction>,
    messages: Vec<String>,
    removed: Vec<CellPos>,
    overlay_after: Option<Duration>,
    activation_at: Duration,
    fail_classifies: u32,
}

impl SimWorld {
    /// Flat stone floor under an air column, viewpoint standing at the
    /// center of the floor.
    pub fn flat() -> Self {
        let mut cells = HashMap::new();
        for x in -FLOOR_EXTENT..=FLOOR_EXTENT {
            for z in -FLOOR_EXTENT..=FLOOR_EXTENT {
                for y in -FLOOR_DEPTH..0 {
                    cells.insert(CellPos::new(x, y, z), "stone".to_string());
                }
            }
        }
        Self {
            cells,
            position: Vec3::new(0.5, 0.0, 0.5),
            yaw: 0.0,
            pitch: 0.0,
            clock: Duration::ZERO,
            held: HashSet::new(),
            messages: Vec::new(),
            removed: Vec::new(),
            overlay_after: None,
            activation_at: Duration::ZERO,
            fail_classifies: 0,
        }
    }

    /// Flat world seeded with ore veins on the floor surface: short random
    /// walks of 1-3 cells each, all within `radius` of the viewpoint.
    pub fn with_surface_veins(seed: u32, vein_count: u32, radius: i32, label: &str) -> Self {
        let mut world = Self::flat();
        let mut rng = SeededRng::new(seed);
        let radius = radius.clamp(1, FLOOR_EXTENT - 1);
        for _ in 0..vein_count {
            let mut x = rng.next_range(-radius, radius + 1);
            let mut z = rng.next_range(-radius, radius + 1);
            let size = 1 + rng.next_int(3);
            for _ in 0..size {
                world
                    .cells
                    .insert(CellPos::new(x, -1, z), label.to_string());
                match rng.next_int(4) {
                    0 => x += 1,
                    1 => x -= 1,
                    2 => z += 1,
                    _ => z -= 1,
                }
                x = x.clamp(-radius, radius);
                z = z.clamp(-radius, radius);
            }
        }
        world
    }

    pub fn set_cell(&mut self, pos: CellPos, label: &str) {
        self.cells.insert(pos, label.to_string());
    }

    pub fn cell(&self, pos: CellPos) -> Option<&str> {
        self.cells.get(&pos).map(String::as_str)
    }

    pub fn count_cells_with(&self, label: &str) -> usize {
        self.cells.values().filter(|l| *l == label).count()
    }

    pub fn removed_cells(&self) -> &[CellPos] {
        &self.removed
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Open a blocking overlay once the virtual clock passes `after`.
    pub fn open_overlay_after(&mut self, after: Duration) {
        self.overlay_after = Some(after);
    }

    /// Delay the activation trigger until the virtual clock passes `at`.
    pub fn arm_activation_at(&mut self, at: Duration) {
        self.activation_at = at;
    }

    /// Make the next `count` classification queries fail.
    pub fn fail_next_classifies(&mut self, count: u32) {
        self.fail_classifies = count;
    }

    fn crosshair_hit(&self, max_distance: f64) -> Option<(CellPos, String)> {
        let eye = Vec3::new(
            self.position.x,
            self.position.y + EYE_HEIGHT,
            self.position.z,
        );
        let pitch = self.pitch.to_radians();
        let yaw = self.yaw.to_radians();
        let horizontal = pitch.cos();
        let dir = Vec3::new(-yaw.sin() * horizontal, -pitch.sin(), yaw.cos() * horizontal);

        let mut t = CROSSHAIR_STEP;
        while t <= max_distance {
            let point = Vec3::new(eye.x + dir.x * t, eye.y + dir.y * t, eye.z + dir.z * t);
            let cell = CellPos::containing(point);
            if let Some(label) = self.cells.get(&cell) {
                if !is_passable(label) {
                    return Some((cell, label.clone()));
                }
            }
            t += CROSSHAIR_STEP;
        }
        None
    }
}

impl HostWorld for SimWorld {
    fn viewpoint_position(&self) -> Vec3 {
        self.position
    }

    fn viewpoint_orientation(&self) -> (f64, f64) {
        (self.yaw, self.pitch)
    }

    fn set_viewpoint_orientation(&mut self, yaw: f64, pitch: f64) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    fn classify_cells(&mut self, cells: &[CellPos]) -> ClassifyResult {
        if self.fail_classifies > 0 {
            self.fail_classifies -= 1;
            return ClassifyResult::Failed;
        }
        ClassifyResult::Data(
            cells
                .iter()
                .map(|cell| Some(self.cells.get(cell).cloned().unwrap_or_else(|| "air".to_string())))
                .collect(),
        )
    }

    fn targeted_cell(&mut self, max_distance: f64) -> Option<TargetedCell> {
        self.crosshair_hit(max_distance.min(SIM_REACH))
            .map(|(position, label)| TargetedCell { position, label })
    }

    fn set_input(&mut self, action: InputAction, pressed: bool) {
        if pressed {
            // A fresh attack press removes whatever the crosshair rests on.
            if action == InputAction::Attack && self.held.insert(action) {
                if let Some((cell, _)) = self.crosshair_hit(SIM_REACH) {
                    self.cells.remove(&cell);
                    self.removed.push(cell);
                }
            } else {
                self.held.insert(action);
            }
        } else {
            self.held.remove(&action);
        }
    }

    fn emit_message(&mut self, text: &str) {
        log::info!("[host] {text}");
        self.messages.push(text.to_string());
    }

    fn overlay_active(&mut self) -> bool {
        self.overlay_after.is_some_and(|after| self.clock >= after)
    }

    fn activation_pending(&mut self) -> bool {
        self.clock >= self.activation_at
    }

    fn sleep(&mut self, duration: Duration) {
        self.clock += duration;
    }
}

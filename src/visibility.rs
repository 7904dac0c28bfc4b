use crate::geom::{CellPos, Vec3};
use crate::host::{ClassifyResult, HostWorld};
use crate::scanner::base_label;

// ── Passable materials ──────────────────────────────────────────────

/// Materials a sight line may pass through: air variants, liquids, foliage
/// and thin decorations. Compared by base label, so state suffixes never
/// block a ray.
const PASSABLE_LABELS: &[&str] = &[
    "air",
    "cave_air",
    "void_air",
    "water",
    "flowing_water",
    "lava",
    "leaves",
    "grass",
    "tall_grass",
    "fern",
    "vine",
    "torch",
    "snow_layer",
];

pub fn is_passable(label: &str) -> bool {
    PASSABLE_LABELS.contains(&base_label(label))
}

// ── Ray sampling ────────────────────────────────────────────────────

/// Cells sampled along the eye→target ray at `step` increments.
///
/// The trailing `ignore_last` distance nearest the target goes unsampled
/// and the target's own cell is skipped, so the target and its immediately
/// adjacent geometry never read as occluders. Duplicates are left in; the
/// classification is idempotent so they cost nothing but query width.
pub fn sample_ray(eye: Vec3, target: CellPos, step: f64, ignore_last: f64) -> Vec<CellPos> {
    let center = target.center();
    let total = eye.distance_to(center);
    if total <= f64::EPSILON {
        return Vec::new();
    }

    let dir = Vec3::new(
        (center.x - eye.x) / total,
        (center.y - eye.y) / total,
        (center.z - eye.z) / total,
    );

    let mut samples = Vec::new();
    let mut t = step;
    while t < total - ignore_last {
        let point = Vec3::new(eye.x + dir.x * t, eye.y + dir.y * t, eye.z + dir.z * t);
        let cell = CellPos::containing(point);
        if cell != target {
            samples.push(cell);
        }
        t += step;
    }
    samples
}

/// Verdict over the sampled labels: one non-passable material blocks the
/// path. A cell the host had no label for is treated as open.
pub fn path_blocked(labels: &[Option<String>]) -> bool {
    labels
        .iter()
        .any(|label| label.as_deref().is_some_and(|l| !is_passable(l)))
}

// ── Line-of-sight check ─────────────────────────────────────────────

/// Whether `target` is visible from `eye`, by ray-marching and classifying
/// every sampled cell in one batched query.
///
/// A zero-length ray is trivially visible. A failed or empty classification
/// also reads as visible: attempting an interaction beats silently skipping
/// a reachable target.
pub fn is_visible(
    host: &mut dyn HostWorld,
    eye: Vec3,
    target: CellPos,
    step: f64,
    ignore_last: f64,
) -> bool {
    let samples = sample_ray(eye, target, step, ignore_last);
    if samples.is_empty() {
        return true;
    }

    match host.classify_cells(&samples) {
        ClassifyResult::Data(labels) => !path_blocked(&labels),
        ClassifyResult::Empty | ClassifyResult::Failed => {
            log::debug!("visibility classify returned no data for {target}, assuming clear");
            true
        }
    }
}

use crate::geom::{CellPos, Vec3};
use crate::host::{ClassifyResult, HostWorld};

// ── Candidates ──────────────────────────────────────────────────────

/// One cell matching the target predicate, with its distance to the
/// viewpoint frozen at scan time.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub position: CellPos,
    pub distance: f64,
    pub label: String,
}

// ── Label matching ──────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TargetMatcher {
    label: String,
    ignore_state: bool,
}

/// Label with any bracketed state suffix removed: `crop:wheat[age=7]` →
/// `crop:wheat`.
pub fn base_label(label: &str) -> &str {
    match label.find('[') {
        Some(idx) => &label[..idx],
        None => label,
    }
}

impl TargetMatcher {
    pub fn new(label: impl Into<String>, ignore_state: bool) -> Self {
        Self {
            label: label.into(),
            ignore_state,
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        if self.ignore_state {
            base_label(label) == base_label(&self.label)
        } else {
            label == self.label
        }
    }
}

// ── Scan ────────────────────────────────────────────────────────────

/// Every target-matching cell within `radius` of `origin`.
///
/// Enumerates the cube bounding the sphere, drops corners outside the
/// radius, then classifies all survivors in a single batched host query so
/// the round-trip cost stays constant per scan. A failed or empty query
/// yields no candidates rather than an error.
pub fn scan(
    host: &mut dyn HostWorld,
    origin: Vec3,
    radius: f64,
    matcher: &TargetMatcher,
) -> Vec<Candidate> {
    let mut positions = Vec::new();
    let (px, py, pz) = (origin.x, origin.y, origin.z);

    for x in (px - radius).floor() as i32..=(px + radius).ceil() as i32 {
        for y in (py - radius).floor() as i32..=(py + radius).ceil() as i32 {
            for z in (pz - radius).floor() as i32..=(pz + radius).ceil() as i32 {
                let dx = x as f64 - px;
                let dy = y as f64 - py;
                let dz = z as f64 - pz;
                let distance = (dx * dx + dy * dy + dz * dz).sqrt();
                if distance <= radius {
                    positions.push((CellPos::new(x, y, z), distance));
                }
            }
        }
    }

    if positions.is_empty() {
        return Vec::new();
    }

    let cells: Vec<CellPos> = positions.iter().map(|(cell, _)| *cell).collect();
    let labels = match host.classify_cells(&cells) {
        ClassifyResult::Data(labels) => labels,
        ClassifyResult::Empty | ClassifyResult::Failed => {
            log::debug!("scan classify returned no data, treating as empty pass");
            return Vec::new();
        }
    };

    positions
        .into_iter()
        .zip(labels)
        .filter_map(|((position, distance), label)| {
            let label = label?;
            matcher.matches(&label).then(|| Candidate {
                position,
                distance,
                label,
            })
        })
        .collect()
}

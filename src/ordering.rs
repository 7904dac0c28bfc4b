use crate::geom::{angular_distance, look_angles, Vec3};
use crate::scanner::Candidate;
use serde::{Deserialize, Serialize};

// ── Modes ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Nearest candidate first.
    Distance,
    /// Single-linkage clusters, tight near groups swept core-outward.
    Cluster,
    /// Greedy nearest-angle walk for a perceptually smooth pan.
    AngularTour,
}

impl OrderingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Cluster => "cluster",
            Self::AngularTour => "angular_tour",
        }
    }
}

/// Visit order over `candidates` as seen from `eye`.
///
/// Always a permutation of the input: every candidate appears exactly once.
pub fn order(
    mut candidates: Vec<Candidate>,
    eye: Vec3,
    mode: OrderingMode,
    link_threshold: f64,
) -> Vec<Candidate> {
    if candidates.len() <= 1 {
        return candidates;
    }
    match mode {
        OrderingMode::Distance => {
            candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
            candidates
        }
        OrderingMode::Cluster => cluster_order(candidates, eye, link_threshold),
        OrderingMode::AngularTour => angular_tour(candidates, eye),
    }
}

// ── Cluster mode ────────────────────────────────────────────────────

struct Cluster {
    members: Vec<Candidate>,
    /// Max pairwise distance among members; 0 for a singleton.
    tightness: f64,
    centroid_dist: f64,
}

/// Single-linkage partition: two candidates share a cluster iff a chain of
/// pairwise distances each within `threshold` connects them.
fn link_clusters(candidates: &[Candidate], threshold: f64) -> Vec<Vec<usize>> {
    let n = candidates.len();
    let mut assigned = vec![false; n];
    let mut groups = Vec::new();

    for seed in 0..n {
        if assigned[seed] {
            continue;
        }
        let mut group = vec![seed];
        assigned[seed] = true;
        let mut frontier = vec![seed];
        while let Some(current) = frontier.pop() {
            let here = candidates[current].position.center();
            for other in 0..n {
                if assigned[other] {
                    continue;
                }
                if here.distance_to(candidates[other].position.center()) <= threshold {
                    assigned[other] = true;
                    group.push(other);
                    frontier.push(other);
                }
            }
        }
        groups.push(group);
    }
    groups
}

fn cluster_order(candidates: Vec<Candidate>, eye: Vec3, threshold: f64) -> Vec<Candidate> {
    let groups = link_clusters(&candidates, threshold);

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let mut clusters = Vec::with_capacity(groups.len());

    for group in groups {
        // Each index appears in exactly one group, so every take succeeds.
        let members: Vec<Candidate> = group
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();

        let mut tightness = 0.0f64;
        for i in 0..members.len() {
            for j in i + 1..members.len() {
                let d = members[i]
                    .position
                    .center()
                    .distance_to(members[j].position.center());
                tightness = tightness.max(d);
            }
        }

        let len = members.len() as f64;
        let centroid = members.iter().fold(Vec3::new(0.0, 0.0, 0.0), |acc, m| {
            let c = m.position.center();
            Vec3::new(acc.x + c.x / len, acc.y + c.y / len, acc.z + c.z / len)
        });

        // Sweep each cluster from its core outward.
        let mut members = members;
        members.sort_by(|a, b| {
            a.position
                .center()
                .distance_to(centroid)
                .total_cmp(&b.position.center().distance_to(centroid))
        });

        clusters.push(Cluster {
            members,
            tightness,
            centroid_dist: eye.distance_to(centroid),
        });
    }

    // Tight clusters (every member within the link threshold of the rest)
    // come first, closer centroids break the tie. Chained, spread-out
    // clusters go last regardless of proximity.
    clusters.sort_by(|a, b| {
        (a.tightness > threshold)
            .cmp(&(b.tightness > threshold))
            .then(a.centroid_dist.total_cmp(&b.centroid_dist))
            .then(a.tightness.total_cmp(&b.tightness))
    });

    clusters
        .into_iter()
        .flat_map(|cluster| cluster.members)
        .collect()
}

// ── Angular tour ────────────────────────────────────────────────────

/// Greedy nearest-angle walk: start at the nearest candidate, then always
/// move to the remaining candidate cheapest to pan to from the last one.
///
/// O(n²) over the candidate count, which the scan radius caps at a few
/// hundred cells in practice; optimal tours are not the goal, avoiding
/// back-and-forth camera jumps is.
fn angular_tour(mut remaining: Vec<Candidate>, eye: Vec3) -> Vec<Candidate> {
    let mut ordered = Vec::with_capacity(remaining.len());

    let mut start = 0;
    for idx in 1..remaining.len() {
        if remaining[idx].distance < remaining[start].distance {
            start = idx;
        }
    }
    ordered.push(remaining.remove(start));

    while !remaining.is_empty() {
        let last = &ordered[ordered.len() - 1];
        let (cur_yaw, cur_pitch) = look_angles(eye, last.position.center());

        let mut best_idx = 0;
        let mut best_angle = f64::INFINITY;
        for (idx, candidate) in remaining.iter().enumerate() {
            let (yaw, pitch) = look_angles(eye, candidate.position.center());
            let separation = angular_distance(cur_yaw, cur_pitch, yaw, pitch);
            if separation < best_angle {
                best_angle = separation;
                best_idx = idx;
            }
        }
        ordered.push(remaining.remove(best_idx));
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CellPos;

    fn candidate(x: i32, y: i32, z: i32, eye: Vec3) -> Candidate {
        let position = CellPos::new(x, y, z);
        Candidate {
            position,
            distance: eye.distance_to(Vec3::new(x as f64, y as f64, z as f64)),
            label: "ore:diamond".to_string(),
        }
    }

    fn positions(candidates: &[Candidate]) -> Vec<CellPos> {
        let mut cells: Vec<CellPos> = candidates.iter().map(|c| c.position).collect();
        cells.sort_by_key(|c| (c.x, c.y, c.z));
        cells
    }

    #[test]
    fn empty_and_singleton_pass_through() {
        let eye = Vec3::new(0.0, 1.62, 0.0);
        for mode in [
            OrderingMode::Distance,
            OrderingMode::Cluster,
            OrderingMode::AngularTour,
        ] {
            assert!(order(Vec::new(), eye, mode, 2.0).is_empty());
            let single = vec![candidate(1, 0, 1, eye)];
            let out = order(single, eye, mode, 2.0);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].position, CellPos::new(1, 0, 1));
        }
    }

    #[test]
    fn distance_mode_sorts_ascending() {
        let eye = Vec3::new(0.0, 0.0, 0.0);
        let input = vec![
            candidate(0, 0, 4, eye),
            candidate(0, 0, 1, eye),
            candidate(0, 0, 3, eye),
        ];
        let out = order(input, eye, OrderingMode::Distance, 2.0);
        let dists: Vec<f64> = out.iter().map(|c| c.distance).collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn every_mode_returns_a_permutation() {
        let eye = Vec3::new(0.0, 1.62, 0.0);
        let input = vec![
            candidate(2, 0, 2, eye),
            candidate(2, 1, 2, eye),
            candidate(-3, 0, 1, eye),
            candidate(0, 2, -4, eye),
            candidate(2, 0, 3, eye),
        ];
        let want = positions(&input);
        for mode in [
            OrderingMode::Distance,
            OrderingMode::Cluster,
            OrderingMode::AngularTour,
        ] {
            let out = order(input.clone(), eye, mode, 2.0);
            assert_eq!(positions(&out), want, "{} must not drop or duplicate", mode.as_str());
        }
    }

    #[test]
    fn tight_pair_beats_far_singleton() {
        let eye = Vec3::new(0.0, 0.0, 0.0);
        // Two cells ~2.0 out and one pairwise step apart, one isolated at 5.0.
        let input = vec![
            candidate(0, 0, 5, eye),
            candidate(0, 0, 2, eye),
            candidate(0, 1, 2, eye),
        ];
        let out = order(input, eye, OrderingMode::Cluster, 2.0);
        assert_eq!(out.len(), 3);
        assert!(out[0].position.z == 2 && out[1].position.z == 2);
        assert_eq!(out[2].position, CellPos::new(0, 0, 5));
    }

    #[test]
    fn angular_tour_starts_nearest_and_pans_minimally() {
        let eye = Vec3::new(0.5, 1.62, 0.5);
        // Nearest ahead, one slightly to its left, one far behind-right.
        let input = vec![
            candidate(8, 0, -8, eye),
            candidate(0, 1, 3, eye),
            candidate(-2, 1, 3, eye),
        ];
        let out = order(input, eye, OrderingMode::AngularTour, 2.0);
        assert_eq!(out[0].position, CellPos::new(0, 1, 3));
        assert_eq!(out[1].position, CellPos::new(-2, 1, 3));
        assert_eq!(out[2].position, CellPos::new(8, 0, -8));
    }
}

use crate::ordering::OrderingMode;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    pub id: String,
    pub description: String,

    // Target selection
    pub target_label: String,
    /// Match on the base label, ignoring any bracketed state suffix
    /// (`crop:wheat[age=7]` matches `crop:wheat`).
    pub ignore_state: bool,

    // Scanning
    pub scan_radius: f64,
    pub eye_height: f64,

    // Visit ordering
    pub mode: OrderingMode,
    /// Single-linkage distance for cluster mode.
    pub link_threshold: f64,

    // Motion
    pub rotation_duration_s: f64,
    pub rotation_steps: u32,

    // Interaction
    pub interact: bool,
    pub interact_delay_s: f64,
    pub interact_hold_s: f64,
    pub confirm_max_distance: f64,

    // Visibility ray
    pub ray_step: f64,
    /// Trailing ray distance left unsampled so the target cell and its
    /// immediate neighbors never count as occluders.
    pub ignore_last: f64,

    // Loop timing
    pub cooldown_s: f64,
    pub reset_delay_s: f64,
    pub idle_poll_s: f64,

    // Session
    pub start_immediately: bool,
    pub max_cycles: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        // Reach-range harvest profile: cluster-first ordering at survival
        // reach, half-second swings at 60 interpolation steps.
        Self {
            id: "cluster-harvest".to_string(),
            description: "Cluster-first harvesting at survival reach.".to_string(),
            target_label: "ore:diamond".to_string(),
            ignore_state: false,
            scan_radius: 4.5,
            eye_height: 1.62,
            mode: OrderingMode::Cluster,
            link_threshold: 2.0,
            rotation_duration_s: 0.5,
            rotation_steps: 60,
            interact: true,
            interact_delay_s: 0.0,
            interact_hold_s: 0.05,
            confirm_max_distance: 6.0,
            ray_step: 0.25,
            ignore_last: 1.5,
            cooldown_s: 0.1,
            reset_delay_s: 1.0,
            idle_poll_s: 0.1,
            start_immediately: true,
            max_cycles: 1000,
        }
    }
}

impl BotConfig {
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "cluster-harvest" => Some(Self::default()),
            "near-sweep" => Some(Self {
                id: "near-sweep".to_string(),
                description: "Nearest-first sweep with quick swings.".to_string(),
                mode: OrderingMode::Distance,
                rotation_duration_s: 0.3,
                rotation_steps: 40,
                ..Self::default()
            }),
            "angular-gaze" => Some(Self {
                id: "angular-gaze".to_string(),
                description: "Look-only angular tour, no interaction.".to_string(),
                mode: OrderingMode::AngularTour,
                interact: false,
                rotation_duration_s: 0.8,
                rotation_steps: 90,
                ..Self::default()
            }),
            _ => None,
        }
    }

    pub fn preset_names() -> [&'static str; 3] {
        ["cluster-harvest", "near-sweep", "angular-gaze"]
    }

    pub fn clamp(&mut self) {
        self.scan_radius = self.scan_radius.clamp(1.0, 32.0);
        self.eye_height = self.eye_height.clamp(0.0, 3.0);
        self.link_threshold = self.link_threshold.clamp(0.5, 16.0);
        self.rotation_duration_s = self.rotation_duration_s.clamp(0.05, 5.0);
        self.rotation_steps = self.rotation_steps.clamp(4, 240);
        self.interact_delay_s = self.interact_delay_s.clamp(0.0, 5.0);
        self.interact_hold_s = self.interact_hold_s.clamp(0.0, 10.0);
        self.confirm_max_distance = self.confirm_max_distance.clamp(1.0, 64.0);
        self.ray_step = self.ray_step.clamp(0.05, 1.0);
        self.ignore_last = self.ignore_last.clamp(0.0, 4.0);
        self.cooldown_s = self.cooldown_s.clamp(0.0, 10.0);
        self.reset_delay_s = self.reset_delay_s.clamp(0.1, 30.0);
        self.idle_poll_s = self.idle_poll_s.clamp(0.01, 2.0);
        self.max_cycles = self.max_cycles.clamp(1, 1_000_000);
    }
}

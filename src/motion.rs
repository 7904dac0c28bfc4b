use crate::config::BotConfig;
use crate::geom::{angle_difference, look_angles, smoothstep, CellPos, Vec3};
use crate::host::{AimConfirmer, HostWorld, InputAction, InputGuard};
use std::time::Duration;

// ── Tuning constants ────────────────────────────────────────────────

/// Swings under this total angular distance finish faster than nominal.
const SMALL_SWING_DEG: f64 = 15.0;
/// Floor of the duration scale for near-target refinements.
const MIN_DURATION_SCALE: f64 = 0.3;
/// Post-rotation crosshair confirmation probes.
const CONFIRM_RETRIES: u32 = 3;
const CONFIRM_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AimOutcome {
    Completed,
    Obstructed,
}

// ── Smooth aim + interact ───────────────────────────────────────────

/// Swing the viewpoint onto `target` with smoothstep easing, then confirm
/// the crosshair and perform the interaction.
///
/// Orientation and position are re-read from the host on entry; nothing is
/// cached across loop iterations. The attack press is held behind an RAII
/// guard so every exit path releases it.
pub fn aim_and_interact(
    host: &mut dyn HostWorld,
    confirmer: &dyn AimConfirmer,
    target: CellPos,
    cfg: &BotConfig,
) -> AimOutcome {
    let position = host.viewpoint_position();
    let eye = Vec3::new(position.x, position.y + cfg.eye_height, position.z);
    let (current_yaw, current_pitch) = host.viewpoint_orientation();

    let (target_yaw, target_pitch) = look_angles(eye, target.center());
    let yaw_delta = angle_difference(current_yaw, target_yaw);
    let pitch_delta = angle_difference(current_pitch, target_pitch);

    // Small adjustments complete proportionally faster; large sweeps keep
    // the full nominal duration for smoothness.
    let total_swing = (yaw_delta * yaw_delta + pitch_delta * pitch_delta).sqrt();
    let scale = if total_swing < SMALL_SWING_DEG {
        (total_swing / SMALL_SWING_DEG).clamp(MIN_DURATION_SCALE, 1.0)
    } else {
        1.0
    };
    let duration = cfg.rotation_duration_s * scale;

    log::debug!(
        "aiming at {target}: ({current_yaw:.1}, {current_pitch:.1}) -> ({target_yaw:.1}, {target_pitch:.1}), {total_swing:.1} deg over {duration:.2}s"
    );

    let steps = cfg.rotation_steps.max(1);
    let step_delay = Duration::from_secs_f64(duration / steps as f64);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let s = smoothstep(t);
        host.set_viewpoint_orientation(current_yaw + yaw_delta * s, current_pitch + pitch_delta * s);
        if i < steps {
            host.sleep(step_delay);
        }
    }

    if !cfg.interact {
        return AimOutcome::Completed;
    }

    if cfg.interact_delay_s > 0.0 {
        host.sleep(Duration::from_secs_f64(cfg.interact_delay_s));
    }

    // The host's hit-test can lag the finished rotation by a beat; probe a
    // few times before declaring the cell obstructed.
    let mut confirmed = false;
    for attempt in 0..CONFIRM_RETRIES {
        if confirmer.confirm(host, target, cfg.confirm_max_distance) {
            confirmed = true;
            break;
        }
        if attempt + 1 < CONFIRM_RETRIES {
            host.sleep(CONFIRM_RETRY_DELAY);
        }
    }
    if !confirmed {
        log::debug!("crosshair never settled on {target}");
        return AimOutcome::Obstructed;
    }

    let hold = Duration::from_secs_f64(cfg.interact_hold_s);
    let mut press = InputGuard::press(host, InputAction::Attack);
    press.host().sleep(hold);
    drop(press);

    AimOutcome::Completed
}

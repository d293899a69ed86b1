// Spawn scheduling: when and where new bases appear.

use crate::domain::entity::PlayerPose;
use crate::domain::tuning::SpawnTuning;
use crate::domain::vector::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::debug;

/// Decides base placement on a logical clock relative to the tick stream.
///
/// Deterministic for a given seed and pose sequence, which keeps placement
/// reproducible in tests.
#[derive(Debug)]
pub struct SpawnScheduler {
    rng: Pcg32,
    tuning: SpawnTuning,
    /// Counts down to the first spawn; the first base is placed directly in
    /// front of the player rather than at a random offset.
    startup_timer: f32,
    interval_timer: f32,
    first_spawned: bool,
}

impl SpawnScheduler {
    pub fn new(seed: u64, tuning: SpawnTuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            startup_timer: tuning.startup_delay,
            interval_timer: tuning.interval,
            first_spawned: false,
        }
    }

    /// Rearms all timers, e.g. after a session restart.
    pub fn reset(&mut self) {
        self.startup_timer = self.tuning.startup_delay;
        self.interval_timer = self.tuning.interval;
        self.first_spawned = false;
    }

    /// Advances the schedule by `dt` and returns a spawn position when one
    /// is due. Without a known player pose the schedule holds at zero until
    /// the pose arrives (a normal startup transient, not an error).
    pub fn poll(&mut self, dt: f32, pose: Option<&PlayerPose>) -> Option<Vec3> {
        if !self.first_spawned {
            self.startup_timer = (self.startup_timer - dt).max(0.0);
            if self.startup_timer > 0.0 {
                return None;
            }
            let pose = pose?;
            self.first_spawned = true;
            return Some(pose.position + self.tuning.first_spawn_distance * pose.forward);
        }

        self.interval_timer -= dt;
        if self.interval_timer > 0.0 {
            return None;
        }
        let pose = pose?;
        self.interval_timer = self.tuning.interval;
        Some(pose.position + self.sample_offset())
    }

    /// Samples a spawn offset whose magnitude is at least the configured
    /// minimum player distance. Rejection sampling is capped; after the cap
    /// a fixed offset at exactly the minimum distance is used so the
    /// scheduler can never loop forever on degenerate ranges.
    fn sample_offset(&mut self) -> Vec3 {
        let (xz_min, xz_max) = self.tuning.offset_range_xz;
        let (y_min, y_max) = self.tuning.offset_range_y;
        for _ in 0..self.tuning.max_sample_retries {
            let candidate = Vec3::new(
                self.rng.random_range(xz_min..=xz_max),
                self.rng.random_range(y_min..=y_max),
                self.rng.random_range(xz_min..=xz_max),
            );
            if candidate.magnitude() >= self.tuning.min_player_distance {
                return candidate;
            }
        }

        debug!(
            retries = self.tuning.max_sample_retries,
            "spawn sampling exhausted retries; using fallback offset"
        );
        Vec3::new(0.0, 0.0, self.tuning.min_player_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_at_origin() -> PlayerPose {
        PlayerPose {
            position: Vec3::ZERO,
            forward: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    fn tuning() -> SpawnTuning {
        SpawnTuning::default()
    }

    #[test]
    fn first_spawn_waits_for_startup_delay_and_pose() {
        let mut scheduler = SpawnScheduler::new(7, tuning());
        // Delay not yet elapsed.
        assert!(scheduler.poll(0.5, Some(&pose_at_origin())).is_none());
        // Delay elapsed but no pose known yet.
        assert!(scheduler.poll(0.6, None).is_none());
        // Pose arrives: spawn 3 units in front of the player.
        let position = scheduler.poll(0.0, Some(&pose_at_origin())).unwrap();
        assert_eq!(position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn subsequent_spawns_follow_interval() {
        let mut scheduler = SpawnScheduler::new(7, tuning());
        let pose = pose_at_origin();
        scheduler.poll(1.0, Some(&pose)).unwrap();

        assert!(scheduler.poll(2.9, Some(&pose)).is_none());
        assert!(scheduler.poll(0.2, Some(&pose)).is_some());
    }

    #[test]
    fn offsets_never_closer_than_minimum_distance() {
        let mut scheduler = SpawnScheduler::new(42, tuning());
        let pose = pose_at_origin();
        scheduler.poll(1.0, Some(&pose)).unwrap();

        for _ in 0..500 {
            let position = scheduler.poll(3.0, Some(&pose)).unwrap();
            let offset = position - pose.position;
            assert!(offset.magnitude() >= 1.0, "offset {offset:?} too close");
        }
    }

    #[test]
    fn degenerate_ranges_fall_back_deterministically() {
        let mut cfg = tuning();
        // Every candidate lands inside the exclusion radius.
        cfg.offset_range_xz = (-0.1, 0.1);
        cfg.offset_range_y = (-0.1, 0.1);
        let mut scheduler = SpawnScheduler::new(1, cfg);
        let pose = pose_at_origin();
        scheduler.poll(1.0, Some(&pose)).unwrap();

        let position = scheduler.poll(3.0, Some(&pose)).unwrap();
        assert_eq!(position, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn reset_rearms_startup_schedule() {
        let mut scheduler = SpawnScheduler::new(7, tuning());
        let pose = pose_at_origin();
        scheduler.poll(1.0, Some(&pose)).unwrap();
        scheduler.reset();
        assert!(scheduler.poll(0.5, Some(&pose)).is_none());
        assert!(scheduler.poll(0.5, Some(&pose)).is_some());
    }
}

//! Decaying spatial hazard field
//!
//! A per-tile scalar danger map. Every tick the field decays
//! multiplicatively, re-floors to a static baseline layer (permanent
//! hazards around mines and strongholds), then re-injects all live threat
//! sources as additive falloff disks. Order matters: decay and re-floor
//! run before injection so permanent hazards are stable fixed points.

use crate::core::config::AiConfig;
use crate::core::types::Vec2;
use crate::world::threats::Threat;

/// Queued one-shot danger disk, applied on the next update
#[derive(Debug, Clone, Copy)]
struct Impulse {
    position: Vec2,
    intensity: f32,
    radius: f32,
}

/// Decaying 2D scalar danger grid, one cell per terrain tile
pub struct HazardField {
    width: usize,
    height: usize,
    tile_size: f32,
    values: Vec<f32>,
    /// Permanent floor; cells never decay below this layer
    baseline: Vec<f32>,
    impulses: Vec<Impulse>,
    decay_rate: f32,
    max_value: f32,
    impulse_intensity: f32,
    impulse_radius: f32,
    out_of_bounds_value: f32,
}

impl HazardField {
    pub fn new(width: usize, height: usize, tile_size: f32, config: &AiConfig) -> Self {
        Self {
            width,
            height,
            tile_size,
            values: vec![0.0; width * height],
            baseline: vec![0.0; width * height],
            impulses: Vec::new(),
            decay_rate: config.hazard_decay_rate,
            max_value: config.hazard_max_value,
            impulse_intensity: config.impulse_intensity,
            impulse_radius: config.impulse_radius,
            out_of_bounds_value: config.out_of_bounds_hazard,
        }
    }

    #[inline]
    fn cell_index(&self, pos: Vec2) -> Option<usize> {
        let x = (pos.x / self.tile_size).floor() as i32;
        let y = (pos.y / self.tile_size).floor() as i32;
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Cell center in world coordinates
    fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.tile_size,
            (y as f32 + 0.5) * self.tile_size,
        )
    }

    /// Install a permanent hazard floor disk (mines, enemy strongholds)
    ///
    /// Called at map load; the field never decays below the baseline.
    pub fn set_baseline_disk(&mut self, center: Vec2, radius: f32, value: f32) {
        if radius <= 0.0 {
            return;
        }
        self.apply_disk_to(center, radius, value, true);
    }

    /// Queue a short-lived high-intensity disk: "this location just got
    /// dangerous." Applied during the next `update`.
    pub fn mark_impulse(&mut self, position: Vec2) {
        self.impulses.push(Impulse {
            position,
            intensity: self.impulse_intensity,
            radius: self.impulse_radius * self.tile_size,
        });
    }

    /// Advance the field by `dt` seconds
    ///
    /// Decay, re-floor to baseline, then re-inject live sources and any
    /// queued impulses.
    pub fn update(&mut self, dt: f32, threats: &[Threat]) {
        if dt > 0.0 {
            let decay = self.decay_rate.powf(dt);
            for (value, floor) in self.values.iter_mut().zip(self.baseline.iter()) {
                *value = (*value * decay).max(*floor);
            }
        }

        for threat in threats {
            self.apply_disk_to(threat.position, threat.radius, threat.intensity, false);
        }

        let impulses = std::mem::take(&mut self.impulses);
        for impulse in impulses {
            self.apply_disk_to(impulse.position, impulse.radius, impulse.intensity, false);
        }
    }

    /// Additive falloff disk: `intensity * max(0, 1 - d/radius)`, clamped
    /// to the global cap. When `baseline` is set the disk writes the floor
    /// layer instead (max-merged, floors do not stack).
    fn apply_disk_to(&mut self, center: Vec2, radius: f32, intensity: f32, baseline: bool) {
        if radius <= 0.0 || intensity <= 0.0 {
            return;
        }

        let min_x = (((center.x - radius) / self.tile_size).floor() as i32).max(0);
        let max_x = (((center.x + radius) / self.tile_size).ceil() as i32)
            .min(self.width as i32 - 1);
        let min_y = (((center.y - radius) / self.tile_size).floor() as i32).max(0);
        let max_y = (((center.y + radius) / self.tile_size).ceil() as i32)
            .min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let cell = self.cell_center(x as usize, y as usize);
                let distance = center.distance(&cell);
                let falloff = 1.0 - distance / radius;
                if falloff <= 0.0 {
                    continue;
                }
                let contribution = intensity * falloff;
                let index = y as usize * self.width + x as usize;
                if baseline {
                    self.baseline[index] = self.baseline[index].max(contribution);
                    self.values[index] = self.values[index].max(contribution);
                } else {
                    self.values[index] =
                        (self.values[index] + contribution).min(self.max_value);
                }
            }
        }
    }

    /// Danger at the cell containing `position`, O(1)
    ///
    /// Out-of-bounds samples return the configured conservative default.
    pub fn sample(&self, position: Vec2) -> f32 {
        match self.cell_index(position) {
            Some(index) => self.values[index],
            None => self.out_of_bounds_value,
        }
    }

    /// Center of the minimum-hazard cell within `search_radius` of
    /// `center`; used for retreat behavior.
    pub fn find_safest_point(&self, center: Vec2, search_radius: f32) -> Vec2 {
        let min_x = (((center.x - search_radius) / self.tile_size).floor() as i32).max(0);
        let max_x = (((center.x + search_radius) / self.tile_size).ceil() as i32)
            .min(self.width as i32 - 1);
        let min_y = (((center.y - search_radius) / self.tile_size).floor() as i32).max(0);
        let max_y = (((center.y + search_radius) / self.tile_size).ceil() as i32)
            .min(self.height as i32 - 1);

        let mut best = center;
        let mut best_value = f32::INFINITY;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let value = self.values[y as usize * self.width + x as usize];
                if value < best_value {
                    best_value = value;
                    best = self.cell_center(x as usize, y as usize);
                }
            }
        }
        best
    }

    #[cfg(test)]
    fn cell_value(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::threats::ThreatKind;

    fn field() -> HazardField {
        HazardField::new(32, 32, 1.0, &AiConfig::default())
    }

    fn disk_threat(x: f32, y: f32, radius: f32, intensity: f32) -> Threat {
        Threat::new(1, ThreatKind::Storm, Vec2::new(x, y), radius, intensity)
    }

    #[test]
    fn test_disk_injection_peaks_at_center() {
        let mut field = field();
        field.update(0.1, &[disk_threat(10.5, 10.5, 3.0, 5.0)]);

        let center = field.sample(Vec2::new(10.5, 10.5));
        let edge = field.sample(Vec2::new(12.5, 10.5));
        assert!(center > 0.0 && center <= 5.0);
        assert!(edge < center);
        // Outside the disk stays at baseline zero
        assert_eq!(field.sample(Vec2::new(20.5, 20.5)), 0.0);
    }

    #[test]
    fn test_zero_radius_source_is_ignored() {
        let mut field = field();
        field.update(0.1, &[disk_threat(10.5, 10.5, 0.0, 5.0)]);
        assert_eq!(field.sample(Vec2::new(10.5, 10.5)), 0.0);
    }

    #[test]
    fn test_overlapping_sources_add_then_clamp() {
        let mut field = field();
        let threats = vec![
            disk_threat(10.5, 10.5, 3.0, 6.0),
            disk_threat(10.5, 10.5, 3.0, 6.0),
            disk_threat(10.5, 10.5, 3.0, 6.0),
        ];
        field.update(0.1, &threats);
        let value = field.sample(Vec2::new(10.5, 10.5));
        assert!(value > 6.0, "sources are additive");
        assert!(value <= AiConfig::default().hazard_max_value, "and clamped");
    }

    #[test]
    fn test_decay_toward_baseline_never_below() {
        let mut field = field();
        field.set_baseline_disk(Vec2::new(5.5, 5.5), 2.0, 1.5);
        field.update(0.1, &[disk_threat(5.5, 5.5, 2.0, 5.0)]);
        assert!(field.sample(Vec2::new(5.5, 5.5)) > 1.5);

        // Source removed: decay back down, but never through the floor
        for _ in 0..200 {
            field.update(1.0, &[]);
        }
        let settled = field.sample(Vec2::new(5.5, 5.5));
        assert!((settled - 1.5).abs() < 1e-3);

        // Un-floored cells decay to zero
        assert!(field.sample(Vec2::new(25.5, 25.5)) < 1e-6);
    }

    #[test]
    fn test_update_dt_zero_is_idempotent() {
        let mut field = field();
        field.update(0.1, &[disk_threat(10.5, 10.5, 3.0, 5.0)]);
        let before: Vec<f32> = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .map(|(x, y)| field.cell_value(x, y))
            .collect();

        field.update(0.0, &[]);

        let after: Vec<f32> = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .map(|(x, y)| field.cell_value(x, y))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_impulse_applied_once() {
        let mut field = field();
        field.mark_impulse(Vec2::new(8.5, 8.5));
        field.update(0.1, &[]);
        let spike = field.sample(Vec2::new(8.5, 8.5));
        assert!(spike > 0.0);

        // Impulse queue drained; next tick only decays
        field.update(1.0, &[]);
        assert!(field.sample(Vec2::new(8.5, 8.5)) < spike);
    }

    #[test]
    fn test_out_of_bounds_sample_is_conservative() {
        let field = field();
        let config = AiConfig::default();
        assert_eq!(
            field.sample(Vec2::new(-5.0, 10.0)),
            config.out_of_bounds_hazard
        );
        assert_eq!(
            field.sample(Vec2::new(10.0, 500.0)),
            config.out_of_bounds_hazard
        );
    }

    #[test]
    fn test_find_safest_point_picks_minimum() {
        let mut field = field();
        field.update(0.1, &[disk_threat(10.5, 10.5, 4.0, 8.0)]);

        let safest = field.find_safest_point(Vec2::new(10.5, 10.5), 6.0);
        assert!(
            field.sample(safest) < field.sample(Vec2::new(10.5, 10.5)),
            "retreat point must be safer than current position"
        );
    }
}

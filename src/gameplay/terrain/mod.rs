mod window;

pub use window::TerrainWindow;

use crate::config::TerrainConfig;
use rand::Rng;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainPoint {
    pub x: f32,
    pub y: f32,
}

impl TerrainPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Sample-to-sample generation mode. Carried across segments so a flat run can
/// continue over a seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub enum TerrainMode {
    #[default]
    RollingHills,
    Flat {
        height: f32,
        run: u32,
        run_length: u32,
    },
}

/// Whole-segment override. Drops and rises ease from the segment's first sample
/// toward `target` and always hand back to rolling hills.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SegmentProfile {
    Regular,
    Drop { target: f32, progress: f32 },
    Rise { target: f32, progress: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerrainError {
    InvalidSpan { start_x: f32, end_x: f32 },
    InvalidBounds { min_y: f32, max_y: f32 },
    NonFiniteInput,
    DetachedPrevious { x: f32, y: f32, start_x: f32 },
}

impl Display for TerrainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSpan { start_x, end_x } => {
                write!(f, "terrain segment span is empty: end_x ({end_x}) <= start_x ({start_x})")
            }
            Self::InvalidBounds { min_y, max_y } => {
                write!(f, "terrain bounds leave no playable band between {min_y} and {max_y}")
            }
            Self::NonFiniteInput => write!(f, "terrain generation received a non-finite input"),
            Self::DetachedPrevious { x, y, start_x } => write!(
                f,
                "previous sample ({x}, {y}) does not join a segment starting at x={start_x} inside the band"
            ),
        }
    }
}

impl Error for TerrainError {}

pub struct TerrainGenerator<R: Rng> {
    config: TerrainConfig,
    rng: R,
    mode: TerrainMode,
}

impl<R: Rng> TerrainGenerator<R> {
    pub fn new(config: TerrainConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            mode: TerrainMode::RollingHills,
        }
    }

    pub fn mode(&self) -> TerrainMode {
        self.mode
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Generates samples covering `[start_x, end_x]`. When `previous` is given it
    /// is emitted verbatim as the first sample so consecutive segments share a seam;
    /// it must lie within one sample spacing before `start_x` and inside
    /// `[min_y, max_y]`.
    pub fn generate_segment(
        &mut self,
        start_x: f32,
        end_x: f32,
        min_y: f32,
        max_y: f32,
        previous: Option<TerrainPoint>,
    ) -> Result<Vec<TerrainPoint>, TerrainError> {
        let finite_previous = previous.is_none_or(|point| point.x.is_finite() && point.y.is_finite());
        if ![start_x, end_x, min_y, max_y].iter().all(|value| value.is_finite()) || !finite_previous {
            return Err(TerrainError::NonFiniteInput);
        }
        if end_x <= start_x {
            return Err(TerrainError::InvalidSpan { start_x, end_x });
        }

        let floor_y = min_y + self.config.floor_margin;
        let ceiling_y = max_y - self.config.ceiling_margin;
        if floor_y >= ceiling_y {
            return Err(TerrainError::InvalidBounds { min_y, max_y });
        }
        if let Some(point) = previous {
            let joins_seam = point.x <= start_x && point.x > start_x - self.config.sample_spacing;
            if !joins_seam || !(min_y..=max_y).contains(&point.y) {
                return Err(TerrainError::DetachedPrevious {
                    x: point.x,
                    y: point.y,
                    start_x,
                });
            }
        }

        let width = end_x - start_x;
        let sample_count = (width / self.config.sample_spacing).ceil().max(1.0) as usize;
        let midline = (min_y + max_y) * 0.5;

        let mut points = Vec::with_capacity(sample_count + 1);
        if let Some(point) = previous {
            points.push(point);
        }

        let anchor_y = previous.map_or(midline, |point| point.y);
        let mut previous_y = anchor_y;
        let mut profile = self.roll_segment_profile(previous, midline, min_y, max_y);

        if profile == SegmentProfile::Regular {
            if !matches!(self.mode, TerrainMode::Flat { .. }) && self.rng.random_bool(self.config.flat_chance) {
                self.mode = self.start_flat_run(previous_y);
            }
        } else {
            self.mode = TerrainMode::RollingHills;
        }

        for index in points.len()..=sample_count {
            let x = if index == sample_count {
                end_x
            } else {
                start_x + (index as f32 * width) / sample_count as f32
            };

            let eased = match &mut profile {
                SegmentProfile::Drop { target, progress } => {
                    *progress = (*progress + self.config.drop_progress_step).min(1.0);
                    Some(anchor_y + (*target - anchor_y) * progress.powi(2))
                }
                SegmentProfile::Rise { target, progress } => {
                    *progress = (*progress + self.config.rise_progress_step).min(1.0);
                    Some(anchor_y + (*target - anchor_y) * progress.powi(2))
                }
                SegmentProfile::Regular => None,
            };

            let mut y = match eased {
                Some(y) => y,
                None => {
                    let y = self.next_regular_height(previous_y);
                    let step = y - previous_y;
                    if step.abs() > self.config.max_step_delta {
                        previous_y + step.signum() * self.config.max_step_delta
                    } else {
                        y
                    }
                }
            };

            y = y.clamp(floor_y, ceiling_y);
            if let TerrainMode::Flat { height, .. } = &mut self.mode {
                *height = y;
            }

            points.push(TerrainPoint::new(x, y));
            previous_y = y;
        }

        Ok(points)
    }

    fn roll_segment_profile(
        &mut self,
        previous: Option<TerrainPoint>,
        midline: f32,
        min_y: f32,
        max_y: f32,
    ) -> SegmentProfile {
        let Some(previous) = previous else {
            return SegmentProfile::Regular;
        };

        if previous.y > midline && self.rng.random_bool(self.config.drop_chance) {
            let target = min_y + self.config.drop_target_offset + self.spread(self.config.drop_target_spread);
            return SegmentProfile::Drop {
                target,
                progress: 0.0,
            };
        }

        if previous.y < midline && self.rng.random_bool(self.config.rise_chance) {
            let target = max_y - self.config.rise_target_offset + self.spread(self.config.rise_target_spread);
            return SegmentProfile::Rise {
                target,
                progress: 0.0,
            };
        }

        SegmentProfile::Regular
    }

    fn next_regular_height(&mut self, previous_y: f32) -> f32 {
        match self.mode {
            TerrainMode::Flat {
                height,
                run,
                run_length,
            } => {
                let run = run + 1;
                self.mode = if run < run_length {
                    TerrainMode::Flat {
                        height,
                        run,
                        run_length,
                    }
                } else if self.rng.random_bool(self.config.flat_chance) {
                    self.start_flat_run(height)
                } else {
                    TerrainMode::RollingHills
                };
                height + self.symmetric(self.config.flat_incline)
            }
            TerrainMode::RollingHills => {
                let delta = self.symmetric(self.config.hill_delta);
                if self.rng.random_bool(self.config.hill_to_flat_chance) {
                    self.mode = self.start_flat_run(previous_y);
                }
                previous_y + delta
            }
        }
    }

    fn start_flat_run(&mut self, height: f32) -> TerrainMode {
        let run_length = self
            .rng
            .random_range(self.config.flat_run_min..=self.config.flat_run_max.max(self.config.flat_run_min));
        TerrainMode::Flat {
            height,
            run: 0,
            run_length,
        }
    }

    /// Uniform value in `[-half_width, half_width]`.
    fn symmetric(&mut self, half_width: f32) -> f32 {
        if half_width <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-half_width..=half_width)
    }

    /// Uniform value in `[0, width)`.
    fn spread(&mut self, width: f32) -> f32 {
        if width <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(0.0..width)
    }
}

/// Linear interpolation between the two samples bracketing `x`, or `None` when
/// `x` lies outside the sampled range.
pub fn try_height_at(x: f32, points: &[TerrainPoint]) -> Option<f32> {
    let (first, last) = (points.first()?, points.last()?);
    if points.len() < 2 || !(first.x..=last.x).contains(&x) {
        return None;
    }

    let right = points.partition_point(|point| point.x < x).clamp(1, points.len() - 1);
    let (p1, p2) = (points[right - 1], points[right]);
    let span = p2.x - p1.x;
    if span <= 0.0 {
        return Some(p1.y);
    }

    let t = (x - p1.x) / span;
    Some(p1.y + t * (p2.y - p1.y))
}

pub fn height_at(x: f32, points: &[TerrainPoint]) -> f32 {
    try_height_at(x, points).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator(seed: u64) -> TerrainGenerator<StdRng> {
        TerrainGenerator::new(TerrainConfig::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn segments_are_strictly_increasing_and_inside_band() {
        for seed in 0..64 {
            let mut generator = generator(seed);
            let mut previous = None;
            for segment in 0..6 {
                let start_x = segment as f32 * 800.0;
                let points = generator
                    .generate_segment(start_x, start_x + 800.0, 50.0, 600.0, previous)
                    .expect("segment should generate");

                for pair in points.windows(2) {
                    assert!(pair[1].x > pair[0].x, "seed {seed}: x must increase");
                }
                for point in &points {
                    assert!(
                        (100.0..=500.0).contains(&point.y),
                        "seed {seed}: y {} escaped band",
                        point.y
                    );
                }
                assert!((points.last().map(|p| p.x).unwrap_or_default() - (start_x + 800.0)).abs() < 1e-3);
                previous = points.last().copied();
            }
        }
    }

    #[test]
    fn continuation_starts_exactly_at_previous_point() {
        for seed in 0..32 {
            let mut generator = generator(seed);
            let previous = TerrainPoint::new(800.0, 412.5);
            let points = generator
                .generate_segment(800.0, 1600.0, 50.0, 600.0, Some(previous))
                .expect("segment should generate");
            assert_eq!(points[0], previous);
        }
    }

    #[test]
    fn regular_steps_never_exceed_smoothing_limit() {
        let config = TerrainConfig {
            drop_chance: 0.0,
            rise_chance: 0.0,
            hill_delta: 60.0,
            ..TerrainConfig::default()
        };
        for seed in 0..32 {
            let mut generator = TerrainGenerator::new(config.clone(), StdRng::seed_from_u64(seed));
            let points = generator
                .generate_segment(0.0, 800.0, 50.0, 600.0, None)
                .expect("segment should generate");
            for pair in points.windows(2) {
                assert!((pair[1].y - pair[0].y).abs() <= 25.0 + 1e-3);
            }
        }
    }

    #[test]
    fn guaranteed_drop_eases_toward_upper_target() {
        let config = TerrainConfig {
            drop_chance: 1.0,
            ..TerrainConfig::default()
        };
        let mut generator = TerrainGenerator::new(config, StdRng::seed_from_u64(7));
        let previous = TerrainPoint::new(0.0, 480.0);
        let points = generator
            .generate_segment(0.0, 800.0, 50.0, 600.0, Some(previous))
            .expect("segment should generate");

        let last = points.last().map(|p| p.y).unwrap_or_default();
        assert!((150.0..250.0).contains(&last), "drop should settle near its target, got {last}");
        assert_eq!(generator.mode(), TerrainMode::RollingHills);
    }

    #[test]
    fn rejects_empty_span_and_band() {
        let mut generator = generator(1);
        assert_eq!(
            generator.generate_segment(10.0, 10.0, 50.0, 600.0, None),
            Err(TerrainError::InvalidSpan {
                start_x: 10.0,
                end_x: 10.0
            })
        );
        assert_eq!(
            generator.generate_segment(0.0, 800.0, 300.0, 400.0, None),
            Err(TerrainError::InvalidBounds {
                min_y: 300.0,
                max_y: 400.0
            })
        );
        assert_eq!(
            generator.generate_segment(0.0, f32::NAN, 50.0, 600.0, None),
            Err(TerrainError::NonFiniteInput)
        );
    }

    #[test]
    fn rejects_previous_sample_that_does_not_join_the_seam() {
        let mut generator = generator(2);
        assert_eq!(
            generator.generate_segment(0.0, 800.0, 50.0, 600.0, Some(TerrainPoint::new(500.0, 300.0))),
            Err(TerrainError::DetachedPrevious {
                x: 500.0,
                y: 300.0,
                start_x: 0.0
            })
        );
        assert!(generator
            .generate_segment(800.0, 1600.0, 50.0, 600.0, Some(TerrainPoint::new(700.0, 300.0)))
            .is_err());
        assert!(generator
            .generate_segment(800.0, 1600.0, 50.0, 600.0, Some(TerrainPoint::new(800.0, 640.0)))
            .is_err());

        let points = generator
            .generate_segment(800.0, 1600.0, 50.0, 600.0, Some(TerrainPoint::new(795.0, 300.0)))
            .expect("a seam point just before start_x should be accepted");
        for pair in points.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn guaranteed_rise_eases_toward_lower_target() {
        let config = TerrainConfig {
            rise_chance: 1.0,
            ..TerrainConfig::default()
        };
        for seed in 0..16 {
            let mut generator = TerrainGenerator::new(config.clone(), StdRng::seed_from_u64(seed));
            let previous = TerrainPoint::new(0.0, 150.0);
            let points = generator
                .generate_segment(0.0, 800.0, 50.0, 600.0, Some(previous))
                .expect("segment should generate");

            for pair in points.windows(2) {
                assert!(pair[1].y >= pair[0].y - 1e-3, "seed {seed}: rise must not fall back");
            }
            let last = points.last().map(|p| p.y).unwrap_or_default();
            assert!((450.0..=500.0).contains(&last), "seed {seed}: rise settled at {last}");
            assert_eq!(generator.mode(), TerrainMode::RollingHills);
        }
    }

    #[test]
    fn flat_run_holds_its_height_then_hands_back_to_hills() {
        let config = TerrainConfig {
            flat_chance: 0.0,
            hill_to_flat_chance: 0.0,
            drop_chance: 0.0,
            rise_chance: 0.0,
            hill_delta: 60.0,
            ..TerrainConfig::default()
        };
        for seed in 0..16 {
            let mut generator = TerrainGenerator::new(config.clone(), StdRng::seed_from_u64(seed));
            generator.mode = TerrainMode::Flat {
                height: 300.0,
                run: 0,
                run_length: 5,
            };
            let points = generator
                .generate_segment(0.0, 800.0, 50.0, 600.0, Some(TerrainPoint::new(0.0, 300.0)))
                .expect("segment should generate");

            for pair in points[..=5].windows(2) {
                assert!((pair[1].y - pair[0].y).abs() <= 1.0 + 1e-4, "seed {seed}: flat run drifted");
            }
            assert!(points[6..].windows(2).any(|pair| (pair[1].y - pair[0].y).abs() > 1.0));
            assert_eq!(generator.mode(), TerrainMode::RollingHills);
        }
    }

    #[test]
    fn flat_runs_last_between_three_and_eight_samples() {
        let config = TerrainConfig {
            flat_chance: 1.0,
            hill_delta: 60.0,
            drop_chance: 0.0,
            rise_chance: 0.0,
            ..TerrainConfig::default()
        };
        for seed in 0..64 {
            let mut generator = TerrainGenerator::new(config.clone(), StdRng::seed_from_u64(seed));
            let points = generator
                .generate_segment(0.0, 800.0, 50.0, 600.0, None)
                .expect("segment should generate");

            for pair in points.windows(2) {
                assert!((pair[1].y - pair[0].y).abs() <= 1.0 + 1e-4, "seed {seed}: flat step too steep");
            }
            match generator.mode() {
                TerrainMode::Flat { run, run_length, .. } => {
                    assert!((3..=8).contains(&run_length), "seed {seed}: run length {run_length}");
                    assert!(run < run_length);
                }
                TerrainMode::RollingHills => panic!("seed {seed}: flat mode should persist"),
            }
        }
    }

    #[test]
    fn height_at_interpolates_between_neighbours() {
        let points = [
            TerrainPoint::new(0.0, 100.0),
            TerrainPoint::new(20.0, 140.0),
            TerrainPoint::new(40.0, 120.0),
        ];

        assert_eq!(height_at(10.0, &points), 120.0);
        assert_eq!(height_at(20.0, &points), 140.0);
        assert_eq!(height_at(30.0, &points), 130.0);
        assert_eq!(height_at(40.0, &points), 120.0);
        assert_eq!(height_at(-1.0, &points), 0.0);
        assert_eq!(height_at(41.0, &points), 0.0);
        assert_eq!(height_at(5.0, &points[..1]), 0.0);
    }

    #[test]
    fn height_at_stays_between_bracketing_samples() {
        let mut generator = generator(99);
        let points = generator
            .generate_segment(0.0, 800.0, 50.0, 600.0, None)
            .expect("segment should generate");

        for pair in points.windows(2) {
            let (low, high) = (pair[0].y.min(pair[1].y), pair[0].y.max(pair[1].y));
            for step in 0..=4 {
                let x = pair[0].x + (pair[1].x - pair[0].x) * step as f32 / 4.0;
                let y = height_at(x, &points);
                assert!(y >= low - 1e-3 && y <= high + 1e-3);
            }
        }
    }
}

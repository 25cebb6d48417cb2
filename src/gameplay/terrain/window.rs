use super::{try_height_at, TerrainError, TerrainGenerator, TerrainMode, TerrainPoint};
use crate::config::TerrainConfig;
use bevy::log::{debug, warn_once};
use rand::Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct TerrainSegment {
    start_x: f32,
    end_x: f32,
    points: Vec<TerrainPoint>,
}

/// Fixed number of contiguous segments around the vehicle. Memory stays bounded
/// by `segments_to_keep` no matter how far the vehicle travels.
pub struct TerrainWindow<R: Rng> {
    generator: TerrainGenerator<R>,
    segments: VecDeque<TerrainSegment>,
}

impl<R: Rng> TerrainWindow<R> {
    /// Lays out `segments_to_keep` segments starting at `x = 0`, each continuing
    /// from the last sample of the one before it.
    pub fn new(config: TerrainConfig, rng: R) -> Result<Self, TerrainError> {
        let segment_count = config.segments_to_keep.max(2);
        let segment_width = config.segment_width;
        let mut window = Self {
            generator: TerrainGenerator::new(config, rng),
            segments: VecDeque::with_capacity(segment_count),
        };

        let mut start_x = 0.0;
        for _ in 0..segment_count {
            window.push_segment(start_x, start_x + segment_width)?;
            start_x += segment_width;
        }

        Ok(window)
    }

    /// Slides the window forward while the frontier is within lookahead of `x`.
    /// Returns how many segments were replaced.
    pub fn advance(&mut self, x: f32) -> Result<usize, TerrainError> {
        let lookahead = self.generator.config().lookahead;
        let mut slides = 0;

        while let Some(newest) = self.segments.back() {
            if x + lookahead < newest.start_x {
                break;
            }
            let (start_x, end_x) = (newest.end_x, newest.end_x + self.generator.config().segment_width);
            self.push_segment(start_x, end_x)?;
            self.segments.pop_front();
            slides += 1;
        }

        if slides > 0 {
            let (start_x, end_x) = self.span();
            debug!("Terrain window slid {slides} segment(s); now covers {start_x:.0}..{end_x:.0}.");
        }

        Ok(slides)
    }

    /// Ground height under `x`. Outside the window this falls back to the nearest
    /// boundary sample.
    pub fn height_at(&self, x: f32) -> f32 {
        let index = self
            .segments
            .partition_point(|segment| segment.end_x < x)
            .min(self.segments.len().saturating_sub(1));

        if let Some(height) = self
            .segments
            .get(index)
            .and_then(|segment| try_height_at(x, &segment.points))
        {
            return height;
        }

        let (start_x, end_x) = self.span();
        warn_once!("Terrain query at x={x:.1} fell outside window {start_x:.0}..{end_x:.0}; using boundary height.");
        if x < start_x {
            self.first_point().map_or(0.0, |point| point.y)
        } else {
            self.last_point().map_or(0.0, |point| point.y)
        }
    }

    pub fn span(&self) -> (f32, f32) {
        let start_x = self.segments.front().map_or(0.0, |segment| segment.start_x);
        let end_x = self.segments.back().map_or(0.0, |segment| segment.end_x);
        (start_x, end_x)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn mode(&self) -> TerrainMode {
        self.generator.mode()
    }

    /// All samples in order, without the duplicated seam point each continued
    /// segment starts with.
    pub fn points(&self) -> impl Iterator<Item = TerrainPoint> + '_ {
        self.segments
            .iter()
            .enumerate()
            .flat_map(|(index, segment)| segment.points.iter().skip(usize::from(index > 0)).copied())
    }

    fn first_point(&self) -> Option<TerrainPoint> {
        self.segments.front().and_then(|segment| segment.points.first().copied())
    }

    fn last_point(&self) -> Option<TerrainPoint> {
        self.segments.back().and_then(|segment| segment.points.last().copied())
    }

    fn push_segment(&mut self, start_x: f32, end_x: f32) -> Result<(), TerrainError> {
        let (min_y, max_y) = (self.generator.config().min_y, self.generator.config().max_y);
        let previous = self.last_point();
        let points = self
            .generator
            .generate_segment(start_x, end_x, min_y, max_y, previous)?;
        self.segments.push_back(TerrainSegment {
            start_x,
            end_x,
            points,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn window(seed: u64) -> TerrainWindow<StdRng> {
        TerrainWindow::new(TerrainConfig::default(), StdRng::seed_from_u64(seed))
            .expect("window should build")
    }

    fn assert_contiguous(window: &TerrainWindow<StdRng>) {
        let points: Vec<_> = window.points().collect();
        for pair in points.windows(2) {
            assert!(pair[1].x > pair[0].x, "x must strictly increase across seams");
        }
        for pair in window.segments.iter().collect::<Vec<_>>().windows(2) {
            assert_eq!(pair[0].end_x, pair[1].start_x);
            assert_eq!(pair[0].points.last(), pair[1].points.first());
        }
    }

    #[test]
    fn initial_window_covers_five_segments_from_origin() {
        let window = window(3);
        assert_eq!(window.segment_count(), 5);
        assert_eq!(window.span(), (0.0, 4_000.0));
        assert_contiguous(&window);
    }

    #[test]
    fn advance_keeps_window_bounded_and_ahead_of_vehicle() {
        let mut window = window(11);
        let mut x = 150.0;
        let mut total_slides = 0;
        while x < 50_000.0 {
            total_slides += window.advance(x).expect("advance should succeed");
            let (start_x, end_x) = window.span();
            assert_eq!(window.segment_count(), 5);
            assert!(end_x >= x + 800.0, "window must cover lookahead");
            assert!(start_x <= x - 20.0, "window must cover the rear wheel");
            x += 137.0;
        }
        assert!(total_slides > 50);
        assert_contiguous(&window);
    }

    #[test]
    fn advance_is_a_no_op_while_frontier_is_far_ahead() {
        let mut window = window(5);
        assert_eq!(window.advance(150.0), Ok(0));
        assert_eq!(window.span(), (0.0, 4_000.0));
    }

    #[test]
    fn height_lookup_matches_segment_samples_and_falls_back_at_edges() {
        let window = window(21);
        let points: Vec<_> = window.points().collect();
        let sample = points[57];
        assert!((window.height_at(sample.x) - sample.y).abs() < 1e-3);

        let first = points.first().copied().expect("window has points");
        let last = points.last().copied().expect("window has points");
        assert_eq!(window.height_at(-500.0), first.y);
        assert_eq!(window.height_at(99_999.0), last.y);
    }
}

use crate::config::ScoringConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Score {
    pub total_score: u32,
    pub air_time: f32,
    pub last_trick_score: u32,
}

/// A trick committed on landing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrickLanding {
    pub points: u32,
    pub air_time_s: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Grounded,
    Airborne,
}

/// Converts continuous air time into points, committed on landing.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    config: ScoringConfig,
    score: Score,
    contact: Contact,
}

impl ScoreTracker {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            score: Score::default(),
            contact: Contact::Grounded,
        }
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn update(&mut self, delta_time: f32, grounded: bool) -> Option<TrickLanding> {
        let next = if grounded {
            Contact::Grounded
        } else {
            Contact::Airborne
        };

        let landed = match (self.contact, next) {
            (Contact::Grounded, Contact::Airborne) => {
                self.score.air_time = 0.0;
                self.score.last_trick_score = 0;
                self.accumulate(delta_time);
                None
            }
            (Contact::Airborne, Contact::Airborne) => {
                self.accumulate(delta_time);
                None
            }
            (Contact::Airborne, Contact::Grounded) => {
                let trick = (self.score.air_time > self.config.min_trick_air_time).then(|| TrickLanding {
                    points: self.score.last_trick_score,
                    air_time_s: self.score.air_time,
                });
                if let Some(trick) = trick {
                    self.score.total_score = self.score.total_score.saturating_add(trick.points);
                }
                self.score.air_time = 0.0;
                self.score.last_trick_score = 0;
                trick
            }
            (Contact::Grounded, Contact::Grounded) => None,
        };

        self.contact = next;
        landed
    }

    fn accumulate(&mut self, delta_time: f32) {
        self.score.air_time += delta_time;
        self.score.last_trick_score = score_points_from_duration(self.score.air_time, self.config.points_per_second);
    }
}

fn score_points_from_duration(duration: f32, points_per_unit: f32) -> u32 {
    if duration <= 0.0 || points_per_unit <= 0.0 {
        return 0;
    }

    (duration * points_per_unit).floor() as u32
}

//! Volume fade curves.
//!
//! A fade plan is a time-ordered list of (offset, volume) points sampled
//! as a continuous piecewise-linear ramp. A bare `fadeDuration` D with
//! target volume V is the two-point plan `(0, 0) .. (D, V)`. Explicit
//! steps are sorted by offset here; callers are not trusted to order them.

use std::time::Duration;

use super::VolumeSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
struct FadePoint {
    at: Duration,
    volume: f32,
}

/// A resolved fade curve for one ring.
#[derive(Debug, Clone, PartialEq)]
pub struct FadePlan {
    points: Vec<FadePoint>,
}

impl FadePlan {
    /// Build the plan configured by `settings`, or `None` when the alarm
    /// plays at full volume from the start.
    pub fn from_settings(settings: &VolumeSettings) -> Option<Self> {
        if !settings.fade_steps.is_empty() {
            let mut points: Vec<FadePoint> = settings
                .fade_steps
                .iter()
                .map(|step| FadePoint {
                    at: Duration::from_millis(step.time),
                    volume: step.volume.clamp(0.0, 1.0) as f32,
                })
                .collect();
            points.sort_by_key(|p| p.at);
            return Some(Self { points });
        }

        settings.fade_duration.map(|millis| {
            let target = settings.volume.unwrap_or(1.0).clamp(0.0, 1.0) as f32;
            Self {
                points: vec![
                    FadePoint {
                        at: Duration::ZERO,
                        volume: 0.0,
                    },
                    FadePoint {
                        at: Duration::from_millis(millis),
                        volume: target,
                    },
                ],
            }
        })
    }

    /// Effective playback volume `elapsed` after ring start: linear
    /// interpolation between the surrounding points, clamped to the ends.
    pub fn volume_at(&self, elapsed: Duration) -> f32 {
        let first = match self.points.first() {
            Some(first) => first,
            None => return 1.0,
        };
        if elapsed <= first.at {
            return first.volume;
        }
        for pair in self.points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if elapsed < to.at {
                let span = (to.at - from.at).as_secs_f32();
                if span == 0.0 {
                    return to.volume;
                }
                let progress = (elapsed - from.at).as_secs_f32() / span;
                return from.volume + (to.volume - from.volume) * progress;
            }
        }
        self.points.last().map(|p| p.volume).unwrap_or(1.0)
    }

    /// Offset of the final point; the ramp is flat afterwards.
    pub fn total(&self) -> Duration {
        self.points.last().map(|p| p.at).unwrap_or(Duration::ZERO)
    }
}

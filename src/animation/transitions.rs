//! Camera update protocol.
//!
//! Three mutually exclusive modes converge on the same camera fields: an
//! instant jump, an eased transition over a duration, and a curved fly-to that
//! zooms out and back in along the way. A zero duration always means "jump",
//! whatever mode was requested.

use crate::animation::interpolation::{EasingFunction, Interpolation};
use crate::core::{geo::LatLng, viewport::Viewport};
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Camera fields applied together by jump, ease and fly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    /// Degrees clockwise from north
    pub bearing: f64,
    pub center: LatLng,
    /// Degrees of tilt
    pub pitch: f64,
    pub zoom: f64,
}

impl CameraTarget {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            bearing: 0.0,
            center,
            pitch: 0.0,
            zoom,
        }
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn from_viewport(viewport: &Viewport) -> Self {
        Self {
            bearing: viewport.bearing,
            center: viewport.center,
            pitch: viewport.pitch,
            zoom: viewport.zoom,
        }
    }
}

/// Camera state read back from the engine in one call
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraValues {
    pub center: LatLng,
    pub bearing: f64,
    pub pitch: f64,
    pub zoom: f64,
}

impl CameraValues {
    /// Same values with the center longitude wrapped into `[-180, 180)`
    pub fn wrap(self) -> Self {
        Self {
            center: self.center.wrap(),
            ..self
        }
    }
}

/// Interpolation curve of an eased transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaseCurve {
    Linear,
    Eased,
}

impl EaseCurve {
    pub fn easing(self) -> EasingFunction {
        match self {
            EaseCurve::Linear => EasingFunction::Linear,
            EaseCurve::Eased => EasingFunction::EaseOutCubic,
        }
    }
}

impl From<bool> for EaseCurve {
    fn from(eased: bool) -> Self {
        if eased {
            EaseCurve::Eased
        } else {
            EaseCurve::Linear
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionMode {
    Jump,
    Ease { duration: Duration, curve: EaseCurve },
    Fly { duration: Duration },
}

impl TransitionMode {
    pub fn duration(&self) -> Duration {
        match self {
            TransitionMode::Jump => Duration::ZERO,
            TransitionMode::Ease { duration, .. } | TransitionMode::Fly { duration } => *duration,
        }
    }

    /// Collapses zero-duration modes into `Jump`
    pub fn normalized(self) -> Self {
        if self.duration().is_zero() {
            TransitionMode::Jump
        } else {
            self
        }
    }
}

/// One camera update request, consumed by the engine immediately
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub target: CameraTarget,
    pub mode: TransitionMode,
}

impl Transition {
    pub fn jump(target: CameraTarget) -> Self {
        Self {
            target,
            mode: TransitionMode::Jump,
        }
    }

    pub fn ease(target: CameraTarget, duration: Duration, curve: impl Into<EaseCurve>) -> Self {
        Self {
            target,
            mode: TransitionMode::Ease {
                duration,
                curve: curve.into(),
            },
        }
    }

    pub fn fly(target: CameraTarget, duration: Duration) -> Self {
        Self {
            target,
            mode: TransitionMode::Fly { duration },
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            mode: self.mode.normalized(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AnimationPath {
    Ease(EasingFunction),
    Fly,
}

/// A camera animation in flight, sampled against wall-clock time
#[derive(Debug, Clone)]
pub struct CameraAnimation {
    from: CameraTarget,
    to: CameraTarget,
    path: AnimationPath,
    duration: Duration,
    started: Instant,
}

impl CameraAnimation {
    /// Starts animating from `from`; `None` when the mode is an instant jump
    pub fn start(from: CameraTarget, to: CameraTarget, mode: TransitionMode) -> Option<Self> {
        let path = match mode.normalized() {
            TransitionMode::Jump => return None,
            TransitionMode::Ease { curve, .. } => AnimationPath::Ease(curve.easing()),
            TransitionMode::Fly { .. } => AnimationPath::Fly,
        };

        // travel the short way around the antimeridian
        let mut to = to;
        let delta = to.center.lng - from.center.lng;
        if delta > 180.0 {
            to.center.lng -= 360.0;
        } else if delta < -180.0 {
            to.center.lng += 360.0;
        }

        Some(Self {
            from,
            to,
            path,
            duration: mode.duration(),
            started: Instant::now(),
        })
    }

    pub fn target(&self) -> CameraTarget {
        self.to
    }

    pub fn is_fly(&self) -> bool {
        self.path == AnimationPath::Fly
    }

    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed() >= self.duration
    }

    /// Current interpolated camera
    pub fn sample(&self) -> CameraTarget {
        self.sample_at(self.elapsed())
    }

    pub fn sample_at(&self, elapsed: Duration) -> CameraTarget {
        let progress = self.progress_at(elapsed);
        if progress >= 1.0 {
            return self.to;
        }
        match self.path {
            AnimationPath::Ease(easing) => {
                let t = easing.apply(progress);
                CameraTarget {
                    bearing: Interpolation::angle(self.from.bearing, self.to.bearing, t),
                    center: Interpolation::lat_lng(&self.from.center, &self.to.center, t),
                    pitch: Interpolation::linear(self.from.pitch, self.to.pitch, t),
                    zoom: Interpolation::linear(self.from.zoom, self.to.zoom, t),
                }
            }
            AnimationPath::Fly => self.sample_fly(progress),
        }
    }

    /// Zooms out to a peak altitude and back in while the center follows a great circle
    fn sample_fly(&self, progress: f64) -> CameraTarget {
        let t = EasingFunction::EaseInOutCubic.apply(progress);
        let low_zoom = self.from.zoom.min(self.to.zoom);

        let start_px = Viewport::project(&self.from.center, low_zoom);
        let end_px = Viewport::project(&self.to.center, low_zoom);
        let distance_tiles = start_px.distance_to(&end_px) / crate::core::constants::TILE_SIZE;
        let peak_zoom = (low_zoom - (1.0 + distance_tiles).log2()).max(0.0);

        // parabolic arc, up through the first half and down through the second
        let zoom = if t < 0.5 {
            let s = t * 2.0;
            self.from.zoom - (self.from.zoom - peak_zoom) * (2.0 * s - s * s)
        } else {
            let s = (t - 0.5) * 2.0;
            peak_zoom + (self.to.zoom - peak_zoom) * (s * s)
        };

        CameraTarget {
            bearing: Interpolation::angle(self.from.bearing, self.to.bearing, t),
            center: Interpolation::slerp_lat_lng(&self.from.center, &self.to.center, t),
            pitch: Interpolation::linear(self.from.pitch, self.to.pitch, t),
            zoom,
        }
    }
}

use crate::core::geo::LatLng;

/// Easing curves available to camera transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    Linear,
    EaseOutCubic,
    EaseInOutCubic,
}

impl EasingFunction {
    /// Maps animation progress in `[0, 1]` to curve progress; input is clamped
    pub fn apply(&self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => p,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - p).powi(3),
            EasingFunction::EaseInOutCubic if p < 0.5 => 4.0 * p.powi(3),
            EasingFunction::EaseInOutCubic => 1.0 - (2.0 - 2.0 * p).powi(3) / 2.0,
        }
    }
}

/// Blends between two camera components at a given curve progress
pub struct Interpolation;

impl Interpolation {
    pub fn linear(from: f64, to: f64, t: f64) -> f64 {
        from + (to - from) * t
    }

    /// Degrees, along the shorter way round
    pub fn angle(from: f64, to: f64, t: f64) -> f64 {
        let mut delta = (to - from).rem_euclid(360.0);
        if delta > 180.0 {
            delta -= 360.0;
        }
        from + delta * t
    }

    /// Component-wise blend, used by eased camera moves
    pub fn lat_lng(from: &LatLng, to: &LatLng, t: f64) -> LatLng {
        LatLng::new(
            Self::linear(from.lat, to.lat, t),
            Self::linear(from.lng, to.lng, t),
        )
    }

    /// Great-circle blend, used by fly-to moves
    pub fn slerp_lat_lng(from: &LatLng, to: &LatLng, t: f64) -> LatLng {
        let a = unit_vector(from);
        let b = unit_vector(to);
        let theta = dot(a, b).clamp(-1.0, 1.0).acos();
        if theta < 1e-6 {
            return Self::lat_lng(from, to, t);
        }

        let sin_theta = theta.sin();
        let wa = ((1.0 - t) * theta).sin() / sin_theta;
        let wb = (t * theta).sin() / sin_theta;
        let [x, y, z] = [0, 1, 2].map(|i| wa * a[i] + wb * b[i]);

        LatLng::new(z.asin().to_degrees(), y.atan2(x).to_degrees())
    }
}

fn unit_vector(lat_lng: &LatLng) -> [f64; 3] {
    let (lat, lng) = (lat_lng.lat.to_radians(), lat_lng.lng.to_radians());
    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

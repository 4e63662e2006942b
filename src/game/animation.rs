use std::time::Duration;

use crate::models::view::Transform;

/// Wraps an angle in degrees into `(-180, 180]`.
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Linear move and turn from one transform to another over a fixed duration.
///
/// Rotation always takes the short way around.
#[derive(Debug, Clone)]
pub struct Tween {
    from: Transform,
    to: Transform,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    pub fn new(from: Transform, to: Transform, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    #[cfg(test)]
    pub fn target(&self) -> Transform {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Moves the tween forward and returns where it now stands.
    pub fn advance(&mut self, dt: Duration) -> Transform {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.is_finished() {
            return self.to;
        }

        let t = self.progress();
        let turn = normalize_degrees(self.to.rotation - self.from.rotation);
        Transform::new(
            self.from.position + (self.to.position - self.from.position) * t,
            normalize_degrees(self.from.rotation + turn * t),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::view::Vec2;

    #[test]
    fn normalizes_into_half_open_range() {
        assert_eq!(normalize_degrees(-360.0), 0.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(350.0), -10.0);
        assert_eq!(normalize_degrees(-350.0), 10.0);
    }

    #[test]
    fn moves_linearly_and_lands_exactly() {
        let from = Transform::at(Vec2::new(0.0, 0.0));
        let to = Transform::new(Vec2::new(100.0, -50.0), 20.0);
        let mut tween = Tween::new(from, to, Duration::from_millis(1000));

        let half = tween.advance(Duration::from_millis(500));
        assert!((half.position.x - 50.0).abs() < 1e-3);
        assert!((half.position.y + 25.0).abs() < 1e-3);
        assert!((half.rotation - 10.0).abs() < 1e-3);
        assert!(!tween.is_finished());

        assert_eq!(tween.advance(Duration::from_millis(700)), to);
        assert!(tween.is_finished());
    }

    #[test]
    fn turns_the_short_way() {
        let from = Transform::new(Vec2::default(), 170.0);
        let to = Transform::new(Vec2::default(), -170.0);
        let mut tween = Tween::new(from, to, Duration::from_millis(100));

        let half = tween.advance(Duration::from_millis(50));
        assert!((half.rotation.abs() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_finishes_on_first_advance() {
        let to = Transform::at(Vec2::new(3.0, 4.0));
        let mut tween = Tween::new(Transform::default(), to, Duration::ZERO);
        assert!(tween.is_finished());
        assert_eq!(tween.advance(Duration::ZERO), to);
    }
}

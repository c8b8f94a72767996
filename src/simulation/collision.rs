use super::{physics::wrap_x, Lander, Terrain};

mod defaults {
    pub const MAX_HORIZONTAL_SPEED: f64 = 2.;
    pub const MAX_VERTICAL_SPEED: f64 = 2.;
    pub const MAX_ROTATION: f64 = 5.;
    pub const VERTICAL_SEGMENT_EPS: f64 = 1e-12;
}

/// Indices of the terrain points around an x coordinate. `lower > upper`
/// marks the segment crossing the wrap boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bracket {
    pub lower: usize,
    pub upper: usize,
}

impl Bracket {
    pub fn wraps(&self) -> bool {
        self.lower > self.upper
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Landing {
    Safe,
    NotUpright { error_abs: f64, error_rel: f64 },
    TooFastHorizontal { error_abs: f64, error_rel: f64 },
    TooFastVertical { error_abs: f64, error_rel: f64 },
}

impl Landing {
    pub fn is_safe(&self) -> bool {
        matches!(self, Landing::Safe)
    }
}

/// Last point with `x < point_x` and first point with `x >= point_x`, treating
/// the terrain as cyclic. `point_x` is wrapped into the domain first.
pub fn find_nearest_bracket(terrain: &Terrain, point_x: f64) -> Bracket {
    let points = terrain.points();
    let x = wrap_x(point_x, terrain.max_x());
    let left = points.partition_point(|p| p.x < x);
    Bracket {
        lower: if left == 0 { points.len() - 1 } else { left - 1 },
        upper: if left == points.len() { 0 } else { left },
    }
}

/// Terrain height under `x` along the bracket segment, or `None` for a
/// vertical segment.
pub fn ground_height(terrain: &Terrain, bracket: Bracket, x: f64) -> Option<f64> {
    let points = terrain.points();
    let (p1, p2) = (points[bracket.lower], points[bracket.upper]);
    let x = wrap_x(x, terrain.max_x());

    let (x1, mut x2, mut x) = (p1.x, p2.x, x);
    if bracket.wraps() {
        x2 += terrain.max_x();
        if x < x1 {
            x += terrain.max_x();
        }
    }

    if (x2 - x1).abs() < defaults::VERTICAL_SEGMENT_EPS {
        return None;
    }
    let m = (p2.y - p1.y) / (x2 - x1);
    let b = p1.y - m * x1;
    Some(m * x + b)
}

pub fn collision(terrain: &Terrain, bracket: Bracket, x: f64, y: f64) -> bool {
    match ground_height(terrain, bracket, x) {
        Some(ground) => ground > y,
        None => {
            let points = terrain.points();
            y <= points[bracket.lower].y.min(points[bracket.upper].y)
        }
    }
}

/// Maps a rotation into (-180, 180].
pub fn normalize_rotation(rotation: f64) -> f64 {
    let r = rotation.rem_euclid(360.);
    if r > 180. {
        r - 360.
    } else {
        r
    }
}

#[derive(Clone, Debug)]
pub struct CollisionChecker {
    max_horizontal_speed: f64,
    max_vertical_speed: f64,
    max_rotation: f64,
}

impl Default for CollisionChecker {
    fn default() -> Self {
        Self {
            max_horizontal_speed: defaults::MAX_HORIZONTAL_SPEED,
            max_vertical_speed: defaults::MAX_VERTICAL_SPEED,
            max_rotation: defaults::MAX_ROTATION,
        }
    }
}

impl CollisionChecker {
    pub fn with_max_horizontal_speed(self, max_horizontal_speed: f64) -> Self {
        assert!(max_horizontal_speed > 0.);
        Self {
            max_horizontal_speed,
            ..self
        }
    }

    pub fn with_max_vertical_speed(self, max_vertical_speed: f64) -> Self {
        assert!(max_vertical_speed > 0.);
        Self {
            max_vertical_speed,
            ..self
        }
    }

    pub fn with_max_rotation(self, max_rotation: f64) -> Self {
        assert!(max_rotation > 0.);
        Self {
            max_rotation,
            ..self
        }
    }

    /// Every limit is strict and all of them have to hold for a safe landing.
    pub fn classify(&self, lander: &Lander) -> Landing {
        let rotation = normalize_rotation(lander.rotation).abs();
        if rotation >= self.max_rotation {
            let error_abs = rotation - self.max_rotation;
            Landing::NotUpright {
                error_abs,
                error_rel: error_abs / self.max_rotation,
            }
        } else if lander.vx.abs() >= self.max_horizontal_speed {
            let error_abs = lander.vx.abs() - self.max_horizontal_speed;
            Landing::TooFastHorizontal {
                error_abs,
                error_rel: error_abs / self.max_horizontal_speed,
            }
        } else if lander.vy.abs() >= self.max_vertical_speed {
            let error_abs = lander.vy.abs() - self.max_vertical_speed;
            Landing::TooFastVertical {
                error_abs,
                error_rel: error_abs / self.max_vertical_speed,
            }
        } else {
            Landing::Safe
        }
    }

    pub fn safe_landing(&self, lander: &Lander) -> bool {
        self.classify(lander).is_safe()
    }

    pub fn check(&self, terrain: &Terrain, lander: &Lander) -> Option<Landing> {
        let bracket = find_nearest_bracket(terrain, lander.x);
        if collision(terrain, bracket, lander.x, lander.y) {
            Some(self.classify(lander))
        } else {
            None
        }
    }
}


#[cfg(test)]
mod collision_tests {
    use super::*;
    use crate::TerrainPoint;

    fn terrain() -> Terrain {
        Terrain::try_new(
            vec![
                TerrainPoint::new(0., 10.),
                TerrainPoint::new(10., 20.),
                TerrainPoint::new(20., 20.),
                TerrainPoint::new(30., 0.),
            ],
            40.,
        )
        .unwrap()
    }

    fn collides(x: f64, y: f64) -> bool {
        let terrain = terrain();
        collision(&terrain, find_nearest_bracket(&terrain, x), x, y)
    }

    #[test]
    fn above_ground() {
        assert!(!collides(5., 16.));
        assert!(!collides(15., 21.));
    }

    #[test]
    fn below_ground() {
        assert!(collides(5., 14.));
        assert!(collides(15., 19.));
        assert!(collides(25., 9.));
    }

    #[test]
    fn on_the_line_is_not_collision() {
        assert!(!collides(15., 20.));
    }

    #[test]
    fn interpolates_slope() {
        let terrain = terrain();
        let height = ground_height(&terrain, bracket_at(&terrain, 25.), 25.).unwrap();
        assert!((height - 10.).abs() < 1e-9);
    }

    #[test]
    fn wrap_segment() {
        // Segment (30, 0) -> (40, 10) across the boundary.
        let terrain = terrain();
        let height = ground_height(&terrain, bracket_at(&terrain, 35.), 35.).unwrap();
        assert!((height - 5.).abs() < 1e-9);
        let height = ground_height(&terrain, bracket_at(&terrain, 0.), 0.).unwrap();
        assert!((height - 10.).abs() < 1e-9);
        assert!(collides(35., 4.));
        assert!(!collides(35., 6.));
        assert!(collides(40., 9.));
    }

    #[test]
    fn vertical_segment_fallback() {
        let terrain = Terrain::try_new(
            vec![TerrainPoint::new(0., 10.), TerrainPoint::new(5., 20.)],
            10.,
        )
        .unwrap();
        let bracket = Bracket { lower: 0, upper: 0 };
        assert_eq!(ground_height(&terrain, bracket, 0.), None);
        assert!(collision(&terrain, bracket, 0., 10.));
        assert!(!collision(&terrain, bracket, 0., 10.5));
    }

    #[test]
    fn idempotent() {
        let terrain = terrain();
        let bracket = find_nearest_bracket(&terrain, 12.);
        let first = collision(&terrain, bracket, 12., 19.5);
        let second = collision(&terrain, bracket, 12., 19.5);
        assert_eq!(first, second);
    }

    fn bracket_at(terrain: &Terrain, x: f64) -> Bracket {
        find_nearest_bracket(terrain, x)
    }
}

#[cfg(test)]
mod landing_tests {
    use super::*;

    fn lander(vx: f64, vy: f64, rotation: f64) -> Lander {
        Lander::default()
            .with_vx(vx)
            .with_vy(vy)
            .with_rotation(rotation)
    }

    // Canonical policy: both velocity axes AND rotation must be under their
    // limits. An older variant accepted either velocity axis alone.
    #[test]
    fn gentle_touchdown_is_safe() {
        assert!(CollisionChecker::default().safe_landing(&lander(0.01, -0.02, 1.)));
    }

    #[test]
    fn fast_descent_is_not_safe() {
        let checker = CollisionChecker::default();
        assert!(!checker.safe_landing(&lander(0.01, -3., 1.)));
        assert!(matches!(
            checker.classify(&lander(0.01, -3., 1.)),
            Landing::TooFastVertical { error_abs, .. } if (error_abs - 1.).abs() < 1e-9
        ));
    }

    #[test]
    fn one_slow_axis_is_not_enough() {
        let checker = CollisionChecker::default();
        assert!(!checker.safe_landing(&lander(0.01, -2.5, 0.)));
        assert!(!checker.safe_landing(&lander(2.5, -0.01, 0.)));
    }

    #[test]
    fn horizontal_drift() {
        assert!(matches!(
            CollisionChecker::default().classify(&lander(-3., 0., 0.)),
            Landing::TooFastHorizontal { error_abs, error_rel }
                if (error_abs - 1.).abs() < 1e-9 && (error_rel - 0.5).abs() < 1e-9
        ));
    }

    #[test]
    fn tilted() {
        let checker = CollisionChecker::default();
        assert!(matches!(
            checker.classify(&lander(0., 0., 10.)),
            Landing::NotUpright { error_abs, .. } if (error_abs - 5.).abs() < 1e-9
        ));
        assert!(matches!(
            checker.classify(&lander(0., 0., -10.)),
            Landing::NotUpright { .. }
        ));
    }

    #[test]
    fn full_turn_counts_as_upright() {
        let checker = CollisionChecker::default();
        assert!(checker.safe_landing(&lander(0., 0., 358.)));
        assert!(checker.safe_landing(&lander(0., 0., -359.)));
    }

    #[test]
    fn strict_thresholds() {
        let checker = CollisionChecker::default()
            .with_max_horizontal_speed(0.05)
            .with_max_vertical_speed(0.05)
            .with_max_rotation(3.);
        assert!(checker.safe_landing(&lander(0.01, -0.02, 1.)));
        assert!(!checker.safe_landing(&lander(0.01, -3., 1.)));
        assert!(!checker.safe_landing(&lander(0.01, -0.02, 3.)));
    }

    #[test]
    fn normalizes_rotation() {
        assert_eq!(normalize_rotation(0.), 0.);
        assert_eq!(normalize_rotation(180.), 180.);
        assert_eq!(normalize_rotation(190.), -170.);
        assert_eq!(normalize_rotation(-10.), -10.);
        assert_eq!(normalize_rotation(-190.), 170.);
    }
}

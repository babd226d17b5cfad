//! Natural Earth I pseudo-cylindrical projection on the unit sphere.
//!
//! Polynomial coefficients follow Šavrič et al. (2011), the same form used by
//! d3-geo's `geoNaturalEarth1`. Output is in "raw" units: multiply by the
//! projection scale and flip `y` to get pixels.

use super::Vec2;

const INVERT_EPSILON: f64 = 1e-6;
const INVERT_MAX_ITERATIONS: usize = 25;

/// Projects `(lambda, phi)` in radians to raw planar coordinates (`y` up).
pub fn natural_earth1(lambda: f64, phi: f64) -> Vec2 {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    Vec2::new(
        lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
        phi * (1.007226
            + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
    )
}

/// Inverse of [`natural_earth1`]; Newton iteration on the latitude polynomial.
///
/// Returns `None` when the iteration does not settle or the result lies off
/// the sphere.
pub fn natural_earth1_invert(x: f64, y: f64) -> Option<(f64, f64)> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }

    let mut phi = y;
    let mut converged = false;
    for _ in 0..INVERT_MAX_ITERATIONS {
        let phi2 = phi * phi;
        let phi4 = phi2 * phi2;
        let f = phi
            * (1.007226
                + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)))
            - y;
        let df = 1.007226
            + phi2
                * (0.015085 * 3.0
                    + phi4 * (-0.044475 * 7.0 + 0.028874 * 9.0 * phi2 - 0.005916 * 11.0 * phi4));
        let delta = f / df;
        phi -= delta;
        if delta.abs() <= INVERT_EPSILON {
            converged = true;
            break;
        }
    }
    if !converged || phi.abs() > std::f64::consts::FRAC_PI_2 + INVERT_EPSILON {
        return None;
    }

    let phi2 = phi * phi;
    let poly = phi2 * phi2 * phi2 * (0.003971 - 0.001529 * phi2);
    let lambda = x / (0.8707 + phi2 * (-0.131979 + phi2 * (-0.013791 + poly)));
    if !lambda.is_finite() || lambda.abs() > std::f64::consts::PI + INVERT_EPSILON {
        return None;
    }
    Some((lambda, phi))
}

#[cfg(test)]
mod tests {
    use super::{natural_earth1, natural_earth1_invert};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_origin() {
        let p = natural_earth1(0.0, 0.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn known_extents() {
        let east = natural_earth1(std::f64::consts::PI, 0.0);
        assert_close(east.x, 2.735_384_7, 1e-6);
        let pole = natural_earth1(0.0, std::f64::consts::FRAC_PI_2);
        assert_close(pole.y, 1.422_390_5, 1e-6);
    }

    #[test]
    fn invert_recovers_lagos_region() {
        let (l, f) = (8.6753_f64.to_radians(), 9.082_f64.to_radians());
        let p = natural_earth1(l, f);
        let (l2, f2) = natural_earth1_invert(p.x, p.y).expect("invertible");
        assert_close(l2, l, 1e-6);
        assert_close(f2, f, 1e-6);
    }

    #[test]
    fn invert_rejects_points_off_the_map() {
        assert!(natural_earth1_invert(10.0, 0.0).is_none());
        assert!(natural_earth1_invert(f64::NAN, 0.0).is_none());
    }
}

//! Spherical rotation of the reference meridian/parallel (d3-geo `rotate`
//! without the gamma axis).

use std::f64::consts::{PI, TAU};

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct SphericalRotation {
    /// Rotation about the polar axis, radians.
    pub delta_lambda: f64,
    /// Rotation about the east-west axis, radians.
    pub delta_phi: f64,
}

impl SphericalRotation {
    pub fn from_degrees(lambda_deg: f64, phi_deg: f64) -> Self {
        Self {
            delta_lambda: lambda_deg.to_radians(),
            delta_phi: phi_deg.to_radians(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.delta_lambda == 0.0 && self.delta_phi == 0.0
    }

    pub fn rotate(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let lambda = wrap_lambda(lambda + self.delta_lambda);
        if self.delta_phi == 0.0 {
            return (lambda, phi);
        }

        let (sin_dp, cos_dp) = self.delta_phi.sin_cos();
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * cos_dp + x * sin_dp;
        (y.atan2(x * cos_dp - z * sin_dp), k.clamp(-1.0, 1.0).asin())
    }

    pub fn invert(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let (lambda, phi) = if self.delta_phi == 0.0 {
            (lambda, phi)
        } else {
            let (sin_dp, cos_dp) = self.delta_phi.sin_cos();
            let cos_phi = phi.cos();
            let x = lambda.cos() * cos_phi;
            let y = lambda.sin() * cos_phi;
            let z = phi.sin();
            (
                y.atan2(x * cos_dp + z * sin_dp),
                (z * cos_dp - x * sin_dp).clamp(-1.0, 1.0).asin(),
            )
        };
        (wrap_lambda(lambda - self.delta_lambda), phi)
    }
}

fn wrap_lambda(lambda: f64) -> f64 {
    if lambda > PI {
        lambda - TAU
    } else if lambda < -PI {
        lambda + TAU
    } else {
        lambda
    }
}

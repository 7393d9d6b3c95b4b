//! Refraction and reflectance at a flat interface between two media.
//!
//! Snell's law gives the transmitted angle; the Fresnel equations give the
//! power reflectance for s- and p-polarized light. Transmittance is `1 - R`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    /// Electric field perpendicular to the plane of incidence
    S,
    /// Electric field in the plane of incidence
    P,
}

/// Outcome of light meeting the interface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Past the critical angle: everything is reflected
    TotalInternalReflection,
    Refracted {
        theta_t: f64, // Transmitted angle (radians)
        r_s: f64,
        r_p: f64,
    },
}

impl Interaction {
    pub fn reflectance(&self, polarization: Polarization) -> f64 {
        match (self, polarization) {
            (Interaction::TotalInternalReflection, _) => 1.0,
            (Interaction::Refracted { r_s, .. }, Polarization::S) => *r_s,
            (Interaction::Refracted { r_p, .. }, Polarization::P) => *r_p,
        }
    }

    pub fn transmittance(&self, polarization: Polarization) -> f64 {
        1.0 - self.reflectance(polarization)
    }

    pub fn is_total_internal_reflection(&self) -> bool {
        matches!(self, Interaction::TotalInternalReflection)
    }
}

/// Transmitted angle from Snell's law, `None` under total internal reflection
pub fn refraction_angle(n1: f64, n2: f64, theta_i: f64) -> Option<f64> {
    let sin_t = n1 / n2 * theta_i.sin();
    if sin_t.abs() > 1.0 {
        None
    } else {
        Some(sin_t.asin())
    }
}

/// Critical angle for going from `n1` into `n2`, if one exists
pub fn critical_angle(n1: f64, n2: f64) -> Option<f64> {
    if n1 > n2 {
        Some((n2 / n1).asin())
    } else {
        None
    }
}

pub fn brewster_angle(n1: f64, n2: f64) -> f64 {
    (n2 / n1).atan()
}

/// Full interaction for incidence angle `theta_i` (radians)
pub fn interact(n1: f64, n2: f64, theta_i: f64) -> Interaction {
    let Some(theta_t) = refraction_angle(n1, n2, theta_i) else {
        return Interaction::TotalInternalReflection;
    };

    let cos_i = theta_i.cos();
    let cos_t = theta_t.cos();
    let r_s = ((n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t)).powi(2);
    let r_p = ((n2 * cos_i - n1 * cos_t) / (n2 * cos_i + n1 * cos_t)).powi(2);

    Interaction::Refracted { theta_t, r_s, r_p }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_incidence_air_to_glass() {
        let result = interact(1.0, 1.5, 0.0);
        // ((1 - 1.5) / (1 + 1.5))^2 = 0.04
        assert_relative_eq!(result.reflectance(Polarization::S), 0.04, epsilon = 1e-12);
        assert_relative_eq!(result.reflectance(Polarization::P), 0.04, epsilon = 1e-12);
        assert_relative_eq!(result.transmittance(Polarization::S), 0.96, epsilon = 1e-12);
    }

    #[test]
    fn p_reflectance_vanishes_at_brewster() {
        let theta_b = brewster_angle(1.0, 1.5);
        let result = interact(1.0, 1.5, theta_b);
        assert_relative_eq!(result.reflectance(Polarization::P), 0.0, epsilon = 1e-12);
        assert!(result.reflectance(Polarization::S) > 0.1);
    }

    #[test]
    fn snell_law_holds() {
        let theta_i = 30_f64.to_radians();
        let theta_t = refraction_angle(1.0, 1.33, theta_i).unwrap();
        assert_relative_eq!(1.0 * theta_i.sin(), 1.33 * theta_t.sin(), epsilon = 1e-12);
    }

    #[test]
    fn total_internal_reflection_beyond_critical_angle() {
        let critical = critical_angle(1.5, 1.0).unwrap();
        assert_relative_eq!(critical, (1.0_f64 / 1.5).asin());
        let result = interact(1.5, 1.0, critical + 0.01);
        assert!(result.is_total_internal_reflection());
        assert_eq!(result.reflectance(Polarization::P), 1.0);
        assert_eq!(result.transmittance(Polarization::S), 0.0);
        assert!(critical_angle(1.0, 1.5).is_none());
    }
}

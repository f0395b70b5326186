//! Exact (unpolarized) Fresnel reflectance for a dielectric interface —
//! replaces the Schlick approximation with the literal parallel/perpendicular
//! amplitude average.

/// Fraction of light reflected at a smooth dielectric interface.
/// `eta_i`/`eta_t` are the refractive indices of the incident and
/// transmitted media; `cos_theta_i` may be negative (ray approaching from
/// the back side), in which case the etas are swapped and the cosine is
/// taken as its absolute value, mirroring how a two-sided interface is
/// actually evaluated.
pub fn fr_dielectric(cos_theta_i: f64, eta_i: f64, eta_t: f64) -> f64 {
    let (mut eta_i, mut eta_t, mut cos_theta_i) = (eta_i, eta_t, cos_theta_i);
    if cos_theta_i < 0.0 {
        std::mem::swap(&mut eta_i, &mut eta_t);
        cos_theta_i = cos_theta_i.abs();
    }

    let sin_theta_i = (1.0 - cos_theta_i * cos_theta_i).max(0.0).sqrt();
    let sin_theta_t = eta_i * sin_theta_i / eta_t;
    if sin_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = (1.0 - sin_theta_t * sin_theta_t).max(0.0).sqrt();

    let r_parallel =
        (eta_t * cos_theta_i - eta_i * cos_theta_t) / (eta_t * cos_theta_i + eta_i * cos_theta_t);
    let r_perp =
        (eta_i * cos_theta_i - eta_t * cos_theta_t) / (eta_i * cos_theta_i + eta_t * cos_theta_t);

    (r_parallel * r_parallel + r_perp * r_perp) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_incidence_matches_schlick_r0() {
        let eta = 1.5;
        let r = fr_dielectric(1.0, 1.0, eta);
        let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
        assert!((r - r0).abs() < 1e-9);
    }

    #[test]
    fn total_internal_reflection_returns_one() {
        // Going from glass to air at a steep grazing angle should totally
        // internally reflect.
        let r = fr_dielectric(0.2, 1.5, 1.0);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_under_eta_swap_at_same_geometry() {
        let r_forward = fr_dielectric(0.8, 1.0, 1.5);
        let r_backward = fr_dielectric(-0.8, 1.5, 1.0);
        assert!((r_forward - r_backward).abs() < 1e-9);
    }
}

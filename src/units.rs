//! Small geometry helpers shared by [`crate::criteria`] and [`crate::matcher`].

//fp angular_distance_as
/// Great-circle distance between two RA/DEC points (degrees in, arcseconds out)
///
/// Haversine formula; adequate at the sub-degree separations this engine
/// deals in, and avoids the precision loss of the plain spherical law of
/// cosines at small angles.
pub fn angular_distance_as(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let (ra1, dec1, ra2, dec2) = (
        ra1_deg.to_radians(),
        dec1_deg.to_radians(),
        ra2_deg.to_radians(),
        dec2_deg.to_radians(),
    );
    let d_dec = dec2 - dec1;
    let d_ra = ra2 - ra1;
    let a = (d_dec / 2.0).sin().powi(2) + dec1.cos() * dec2.cos() * (d_ra / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    c.to_degrees() * 3600.0
}

//fp within_box
/// True if the two points are within `d_ra_deg`/`d_dec_deg` of each other on
/// each axis independently (the box criterion, cheaper than the radius one)
pub fn within_box(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64, d_ra_deg: f64, d_dec_deg: f64) -> bool {
    let cos_dec = dec1_deg.to_radians().cos().max(1.0e-6);
    let d_ra = (ra2_deg - ra1_deg).abs() * cos_dec;
    (d_ra <= d_ra_deg) && (dec2_deg - dec1_deg).abs() <= d_dec_deg
}

//fp precess_ra_dec
/// Linearly propagate RA/DEC from `epoch_from` to `epoch_to` (Julian years)
/// given proper motion in mas/yr (`pm_ra` already includes the cos(dec) factor)
pub fn precess_ra_dec(ra_deg: f64, dec_deg: f64, pm_ra_mas: f64, pm_dec_mas: f64, epoch_from: f64, epoch_to: f64) -> (f64, f64) {
    let delta_yr = epoch_to - epoch_from;
    let cos_dec = dec_deg.to_radians().cos().max(1.0e-6);
    let d_ra_deg = (pm_ra_mas * delta_yr / 3_600_000.0) / cos_dec;
    let d_dec_deg = pm_dec_mas * delta_yr / 3_600_000.0;
    let mut new_ra = ra_deg + d_ra_deg;
    if new_ra < 0.0 {
        new_ra += 360.0;
    } else if new_ra >= 360.0 {
        new_ra -= 360.0;
    }
    (new_ra, dec_deg + d_dec_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert!(angular_distance_as(10.0, 20.0, 10.0, 20.0) < 1.0e-9);
    }

    #[test]
    fn one_arcsec_apart_in_declination() {
        let d = angular_distance_as(10.0, 20.0, 10.0, 20.0 + 1.0 / 3600.0);
        assert!((d - 1.0).abs() < 1.0e-6, "d={d}");
    }

    #[test]
    fn precession_is_identity_at_same_epoch() {
        let (ra, dec) = precess_ra_dec(10.0, 20.0, 50.0, -20.0, 2000.0, 2000.0);
        assert!((ra - 10.0).abs() < 1.0e-12);
        assert!((dec - 20.0).abs() < 1.0e-12);
    }
}

//! Matching criteria: the geometric and attribute tests that decide whether
//! two stars may be the same physical object.

use crate::error::{Error, Result};
use crate::property::MetaId;
use crate::star::{Star, StarArena, StarId};
use crate::units::{angular_distance_as, within_box};

//tp Criterion
/// A single test applied between a reference star and a candidate
#[derive(Debug, Clone)]
pub enum Criterion {
    /// Great-circle separation must be within `radius_as` arcseconds
    RaDecRadius { radius_as: f64 },
    /// RA/DEC separation must fit within an axis-aligned box (cheaper, coarser)
    RaDecBox { d_ra_deg: f64, d_dec_deg: f64 },
    /// A string property must be set on both stars and equal
    IdEquality { meta_id: MetaId },
    /// A magnitude property must be within `delta_mag` on both stars, if set
    /// on both; absent on either side, the criterion is considered satisfied
    MagnitudeDelta { meta_id: MetaId, delta_mag: f64 },
    /// Composite Gaia photometric criterion: magnitudes must agree within
    /// `n_sigma` combined standard deviations (errors propagated in quadrature)
    GaiaMagComposite { meta_id: MetaId, n_sigma: f64 },
}

impl Criterion {
    fn is_satisfied(&self, arena: &StarArena, reference: StarId, candidate: StarId) -> bool {
        let (r, c) = (arena.get(reference), arena.get(candidate));
        match self {
            Criterion::RaDecRadius { radius_as } => match (r.ra_dec(), c.ra_dec()) {
                (Some((ra1, dec1)), Some((ra2, dec2))) => angular_distance_as(ra1, dec1, ra2, dec2) <= *radius_as,
                _ => false,
            },
            Criterion::RaDecBox { d_ra_deg, d_dec_deg } => match (r.ra_dec(), c.ra_dec()) {
                (Some((ra1, dec1)), Some((ra2, dec2))) => within_box(ra1, dec1, ra2, dec2, *d_ra_deg, *d_dec_deg),
                _ => false,
            },
            Criterion::IdEquality { meta_id } => {
                match (r.get(*meta_id).value(), c.get(*meta_id).value()) {
                    (Some(a), Some(b)) => a.as_str() == b.as_str() && a.as_str().is_some(),
                    _ => false,
                }
            }
            Criterion::MagnitudeDelta { meta_id, delta_mag } => {
                match (r.get(*meta_id).value().and_then(|v| v.as_f64()), c.get(*meta_id).value().and_then(|v| v.as_f64())) {
                    (Some(a), Some(b)) => (a - b).abs() <= *delta_mag,
                    _ => true,
                }
            }
            Criterion::GaiaMagComposite { meta_id, n_sigma } => {
                let rv = r.get(*meta_id).value().and_then(|v| v.as_f64());
                let cv = c.get(*meta_id).value().and_then(|v| v.as_f64());
                match (rv, cv) {
                    (Some(a), Some(b)) => {
                        let err_r = r.get(*meta_id).error().unwrap_or(0.0);
                        let err_c = c.get(*meta_id).error().unwrap_or(0.0);
                        let combined = (err_r * err_r + err_c * err_c).sqrt().max(1.0e-6);
                        (a - b).abs() <= n_sigma * combined
                    }
                    _ => true,
                }
            }
        }
    }

    //fp radius_as
    /// The effective angular radius this criterion bounds (only meaningful
    /// for `RaDecRadius`/`RaDecBox`), used by the merger to derive the
    /// cross-match threshold score
    pub fn radius_as(&self) -> Option<f64> {
        match self {
            Criterion::RaDecRadius { radius_as } => Some(*radius_as),
            Criterion::RaDecBox { d_ra_deg, d_dec_deg } => Some(d_ra_deg.max(*d_dec_deg) * 3600.0),
            _ => None,
        }
    }
}

//tp CriteriaList
/// An ordered, ANDed list of [`Criterion`]; the first entry must be a
/// geometric one (`RaDecRadius` or `RaDecBox`)
#[derive(Debug, Clone)]
pub struct CriteriaList {
    criteria: Vec<Criterion>,
}

impl CriteriaList {
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        match criteria.first() {
            Some(Criterion::RaDecRadius { .. }) | Some(Criterion::RaDecBox { .. }) => {}
            _ => return Err(Error::InvalidCriteria("first criterion must be a geometric one".into())),
        }
        Ok(CriteriaList { criteria })
    }

    pub fn matches(&self, arena: &StarArena, reference: StarId, candidate: StarId) -> bool {
        self.criteria.iter().all(|c| c.is_satisfied(arena, reference, candidate))
    }

    //fp xmatch_radius_as
    /// The primary geometric radius this list bounds, in arcseconds
    pub fn xmatch_radius_as(&self) -> f64 {
        self.criteria[0].radius_as().unwrap_or(0.0)
    }

    pub fn geometric_distance_as(&self, r: &Star, c: &Star) -> Option<f64> {
        let (ra1, dec1) = r.ra_dec()?;
        let (ra2, dec2) = c.ra_dec()?;
        Some(angular_distance_as(ra1, dec1, ra2, dec2))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ids;
    use crate::value::{Confidence, Origin, PropertyValue};

    fn star_at(ra: f64, dec: f64) -> Star {
        let mut s = Star::new();
        s.set(ids::RA, PropertyValue::Double(ra), Origin::Gaia, Confidence::High, None);
        s.set(ids::DEC, PropertyValue::Double(dec), Origin::Gaia, Confidence::High, None);
        s
    }

    #[test]
    fn radius_criterion_rejects_far_apart_stars() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(10.0, 20.0));
        let b = arena.alloc(star_at(10.0, 20.0 + 10.0 / 3600.0));
        let list = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 1.5 }]).unwrap();
        assert!(!list.matches(&arena, a, b));
    }

    #[test]
    fn radius_criterion_accepts_close_stars() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(10.0, 20.0));
        let b = arena.alloc(star_at(10.0, 20.0 + 1.0 / 3600.0));
        let list = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 1.5 }]).unwrap();
        assert!(list.matches(&arena, a, b));
    }

    #[test]
    fn first_criterion_must_be_geometric() {
        assert!(CriteriaList::new(vec![Criterion::IdEquality { meta_id: ids::ID_HIP }]).is_err());
    }
}

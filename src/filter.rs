//! Composable post-processing filters applied to a [`StarList`] after merging.
//!
//! Grounded in `original_source/SearchCal/vobs/include/vobsFILTER.h`'s
//! enable/disable-able `Apply` contract, expressed here as a trait plus a
//! `.then()`-chainable pipeline in the style of the teacher's `StarFilter`.

use crate::property::{ids, MetaId};
use crate::star::StarArena;
use crate::star_list::StarList;
use crate::value::Origin;

//tp Filter
/// One pass over a [`StarList`] that may remove stars in place
pub trait Filter {
    fn name(&self) -> &str;
    fn apply(&self, list: &mut StarList, arena: &StarArena);
}

fn retain_by(list: &mut StarList, arena: &StarArena, keep: impl Fn(&crate::star::Star) -> bool) {
    let ids: Vec<_> = list.iter().collect();
    let mut pos = 0;
    for id in ids {
        if keep(arena.get(id)) {
            pos += 1;
        } else {
            list.remove(pos);
        }
    }
}

//tp OriginFilter
/// Keep only stars where a given property's origin equals a given catalog
pub struct OriginFilter {
    meta_id: MetaId,
    catalog_id: Origin,
}

impl OriginFilter {
    pub fn new(meta_id: MetaId, catalog_id: Origin) -> Self {
        OriginFilter { meta_id, catalog_id }
    }
}

impl Filter for OriginFilter {
    fn name(&self) -> &str {
        "origin"
    }
    fn apply(&self, list: &mut StarList, arena: &StarArena) {
        retain_by(list, arena, |star| star.get(self.meta_id).origin() == self.catalog_id);
    }
}

//tp MagnitudeFilter
/// Keep only stars brighter than (or equal to) `limit` on the V band
pub struct MagnitudeFilter {
    pub limit: f64,
}

impl Filter for MagnitudeFilter {
    fn name(&self) -> &str {
        "magnitude"
    }
    fn apply(&self, list: &mut StarList, arena: &StarArena) {
        retain_by(list, arena, |star| {
            star.get(ids::MAG_V).value().and_then(|v| v.as_f64()).map(|m| m <= self.limit).unwrap_or(true)
        });
    }
}

//tp DistanceFilter
/// Keep only stars within `radius_deg` of a fixed RA/DEC center
pub struct DistanceFilter {
    pub center_ra_deg: f64,
    pub center_dec_deg: f64,
    pub radius_deg: f64,
}

impl Filter for DistanceFilter {
    fn name(&self) -> &str {
        "distance"
    }
    fn apply(&self, list: &mut StarList, arena: &StarArena) {
        retain_by(list, arena, |star| match star.ra_dec() {
            Some((ra, dec)) => {
                crate::units::angular_distance_as(ra, dec, self.center_ra_deg, self.center_dec_deg) / 3600.0
                    <= self.radius_deg
            }
            None => false,
        });
    }
}

//tp DiameterOkFilter
/// Keep only stars whose angular-diameter estimate is flagged usable
pub struct DiameterOkFilter;

impl Filter for DiameterOkFilter {
    fn name(&self) -> &str {
        "diameter_ok"
    }
    fn apply(&self, list: &mut StarList, arena: &StarArena) {
        retain_by(list, arena, |star| star.get(ids::DIAMETER_OK).value().and_then(|v| v.as_bool()).unwrap_or(false));
    }
}

//tp DuplicateFilter
/// Drop stars within `radius_as` of an earlier entry in the list, keeping
/// the first occurrence of each coordinate cluster
pub struct DuplicateFilter {
    pub radius_as: f64,
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        DuplicateFilter { radius_as: 1.0 }
    }
}

impl Filter for DuplicateFilter {
    fn name(&self) -> &str {
        "duplicate"
    }
    fn apply(&self, list: &mut StarList, arena: &StarArena) {
        list.filter_duplicates(arena, self.radius_as);
    }
}

//tp FilterPipeline
/// An ordered sequence of filters applied in turn
#[derive(Default)]
pub struct FilterPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, filter: impl Filter + 'static) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    pub fn apply(&self, list: &mut StarList, arena: &StarArena) {
        for stage in &self.stages {
            let before = list.len();
            stage.apply(list, arena);
            log::trace!("filter {}: {} -> {}", stage.name(), before, list.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Confidence, Origin, PropertyValue};

    fn star_with_mag(mag: f64) -> crate::star::Star {
        let mut s = crate::star::Star::new();
        s.set(ids::MAG_V, PropertyValue::Double(mag), Origin::Gaia, Confidence::High, None);
        s
    }

    fn star_at_with_mag(ra: f64, dec: f64, mag: f64) -> crate::star::Star {
        let mut s = star_with_mag(mag);
        s.set(ids::RA, PropertyValue::Double(ra), Origin::Gaia, Confidence::High, None);
        s.set(ids::DEC, PropertyValue::Double(dec), Origin::Gaia, Confidence::High, None);
        s
    }

    #[test]
    fn magnitude_filter_drops_fainter_stars() {
        let mut arena = StarArena::new();
        let bright = arena.alloc(star_with_mag(3.0));
        let faint = arena.alloc(star_with_mag(9.0));
        let mut list = StarList::new("test", Origin::Gaia);
        list.add_ref_at_tail(bright);
        list.add_ref_at_tail(faint);
        let pipeline = FilterPipeline::new().then(MagnitudeFilter { limit: 6.0 });
        pipeline.apply(&mut list, &arena);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![bright]);
    }

    #[test]
    fn pipeline_chains_stages_in_order() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at_with_mag(10.0, 0.0, 3.0));
        let b = arena.alloc(star_at_with_mag(10.0, 0.0, 3.0));
        let mut list = StarList::new("test", Origin::Gaia);
        list.add_ref_at_tail(a);
        list.add_ref_at_tail(b);
        let pipeline = FilterPipeline::new().then(MagnitudeFilter { limit: 6.0 }).then(DuplicateFilter::default());
        pipeline.apply(&mut list, &arena);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn origin_filter_checks_a_specific_property() {
        let mut arena = StarArena::new();
        let mut gaia = star_at_with_mag(10.0, 0.0, 5.0);
        gaia.set(ids::MAG_V, PropertyValue::Double(5.0), Origin::Gaia, Confidence::High, None);
        let mut ascc = star_at_with_mag(11.0, 0.0, 5.0);
        ascc.set(ids::MAG_V, PropertyValue::Double(5.0), Origin::Ascc, Confidence::High, None);
        let g = arena.alloc(gaia);
        let a = arena.alloc(ascc);
        let mut list = StarList::new("test", Origin::Mixed);
        list.add_ref_at_tail(g);
        list.add_ref_at_tail(a);
        let pipeline = FilterPipeline::new().then(OriginFilter::new(ids::MAG_V, Origin::Ascc));
        pipeline.apply(&mut list, &arena);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![a]);
    }
}

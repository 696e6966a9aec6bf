//! Ordered list of star references sharing one catalog identity.
//!
//! Grounded in `vobsSTAR_LIST`: an ordered sequence of stars plus a lazily
//! built declination index used to prune candidates before the full
//! criteria list is evaluated. `CopyRefs` keeps the original's
//! ownership-transfer contract, expressed here as a handle move rather than
//! a `free_pointers` flag flip, since the arena (not the list) owns the data.

use std::rc::Rc;

use crate::catalog_meta::CatalogMeta;
use crate::property::MetaId;
use crate::star::{StarArena, StarId};
use crate::value::Origin;

//tp DecIndex
/// Declination-sorted index over a [`StarList`]'s members, used to bound the
/// candidate set before applying the full [`crate::criteria::CriteriaList`]
#[derive(Debug, Default)]
struct DecIndex {
    entries: Vec<(f64, StarId)>,
}

impl DecIndex {
    fn build(stars: &[StarId], arena: &StarArena) -> Self {
        let mut entries: Vec<(f64, StarId)> = stars
            .iter()
            .filter_map(|&id| arena.get(id).ra_dec().map(|(_, dec)| (dec, id)))
            .collect();
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        DecIndex { entries }
    }

    fn candidates(&self, dec: f64, radius_deg: f64) -> impl Iterator<Item = StarId> + '_ {
        let lo = dec - radius_deg;
        let hi = dec + radius_deg;
        let start = self.entries.partition_point(|(d, _)| *d < lo);
        self.entries[start..]
            .iter()
            .take_while(move |(d, _)| *d <= hi)
            .map(|(_, id)| *id)
    }
}

//tp StarList
/// An ordered, named sequence of [`StarId`] handles into a shared [`StarArena`]
#[derive(Debug)]
pub struct StarList {
    name: String,
    catalog_id: Origin,
    catalog_meta: Option<Rc<CatalogMeta>>,
    stars: Vec<StarId>,
    index: Option<DecIndex>,
}

impl StarList {
    pub fn new(name: impl Into<String>, catalog_id: Origin) -> Self {
        StarList {
            name: name.into(),
            catalog_id,
            catalog_meta: None,
            stars: Vec::new(),
            index: None,
        }
    }

    pub fn with_catalog_meta(mut self, meta: Rc<CatalogMeta>) -> Self {
        self.catalog_meta = Some(meta);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog_id(&self) -> Origin {
        self.catalog_id
    }

    pub fn catalog_meta(&self) -> Option<&Rc<CatalogMeta>> {
        self.catalog_meta.as_ref()
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StarId> + '_ {
        self.stars.iter().copied()
    }

    //fp add_ref_at_tail
    /// Append a star handle; invalidates any built index
    pub fn add_ref_at_tail(&mut self, id: StarId) {
        self.stars.push(id);
        self.index = None;
    }

    //fp remove
    /// Remove the star at `pos`, returning its handle if present
    pub fn remove(&mut self, pos: usize) -> Option<StarId> {
        if pos >= self.stars.len() {
            return None;
        }
        self.index = None;
        Some(self.stars.remove(pos))
    }

    pub fn get_star(&self, pos: usize) -> Option<StarId> {
        self.stars.get(pos).copied()
    }

    //fp prepare_index
    /// Build (or rebuild) the declination index used by candidate lookup
    pub fn prepare_index(&mut self, arena: &StarArena) {
        self.index = Some(DecIndex::build(&self.stars, arena));
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    //fp candidates_near
    /// Stars within `radius_deg` declination of `dec`, pulled from the index
    /// if built, falling back to a full scan otherwise
    pub fn candidates_near(&self, dec: f64, radius_deg: f64) -> Vec<StarId> {
        match &self.index {
            Some(idx) => idx.candidates(dec, radius_deg).collect(),
            None => self.stars.clone(),
        }
    }

    //fp sort
    /// Stable sort by a double-valued property, optionally reversed
    pub fn sort(&mut self, arena: &StarArena, meta_id: MetaId, reverse: bool) {
        self.stars.sort_by(|a, b| {
            let va = arena.get(*a).get(meta_id).value().and_then(|v| v.as_f64()).unwrap_or(f64::NAN);
            let vb = arena.get(*b).get(meta_id).value().and_then(|v| v.as_f64()).unwrap_or(f64::NAN);
            let ord = va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal);
            if reverse {
                ord.reverse()
            } else {
                ord
            }
        });
        self.index = None;
    }

    //fp sort_by_target_id
    /// Group stars sharing a `targetId`, used before Path-A merges
    pub fn sort_by_target_id(&mut self, arena: &StarArena) {
        self.stars.sort_by(|a, b| {
            let ta = arena.get(*a).target_id().unwrap_or("");
            let tb = arena.get(*b).target_id().unwrap_or("");
            ta.cmp(tb)
        });
        self.index = None;
    }

    //fp stars_matching_target_id
    /// All stars sharing `target_id`, in list order
    pub fn stars_matching_target_id<'a>(&'a self, arena: &'a StarArena, target_id: &'a str) -> impl Iterator<Item = StarId> + 'a {
        self.stars.iter().copied().filter(move |&id| arena.get(id).target_id() == Some(target_id))
    }

    //fp copy_refs
    /// Append all of `other`'s handles to `self`, adopting its catalog
    /// identity if this list is empty. If `transfer_ownership` is set,
    /// `other` is cleared afterward — the Rust analogue of the original's
    /// `doFreePointers` ownership swap, which matters only for bookkeeping
    /// here since the arena (not either list) owns the underlying `Star`s.
    pub fn copy_refs(&mut self, other: &mut StarList, transfer_ownership: bool) {
        if self.stars.is_empty() {
            self.catalog_id = other.catalog_id;
            self.catalog_meta = other.catalog_meta.clone();
        } else if self.catalog_id != other.catalog_id {
            self.catalog_id = Origin::Mixed;
        }
        self.stars.extend_from_slice(&other.stars);
        self.index = None;
        if transfer_ownership {
            other.stars.clear();
            other.index = None;
        }
    }

    //fp filter_duplicates
    /// Drop stars within `radius_as` of an earlier entry in the list,
    /// keeping the first occurrence of each coordinate cluster. A star
    /// without RA/DEC never matches anything and is always kept.
    pub fn filter_duplicates(&mut self, arena: &StarArena, radius_as: f64) -> usize {
        let mut kept: Vec<(f64, f64)> = Vec::new();
        let before = self.stars.len();
        self.stars.retain(|&id| match arena.get(id).ra_dec() {
            Some((ra, dec)) => {
                let is_dup = kept.iter().any(|&(kra, kdec)| crate::units::angular_distance_as(ra, dec, kra, kdec) <= radius_as);
                if is_dup {
                    false
                } else {
                    kept.push((ra, dec));
                    true
                }
            }
            None => true,
        });
        self.index = None;
        before - self.stars.len()
    }

    pub fn total_group_size(&self, arena: &StarArena) -> i64 {
        self.stars.iter().map(|&id| arena.get(id).group_size()).sum()
    }
}

pub const DEFAULT_DEC_SEARCH_RADIUS_DEG: f64 = 0.01; // looked up per-criteria, widened by caller as needed

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ids;
    use crate::value::{Confidence, PropertyValue};

    fn star_at(ra: f64, dec: f64) -> crate::star::Star {
        let mut s = crate::star::Star::new();
        s.set(ids::RA, PropertyValue::Double(ra), Origin::Gaia, Confidence::High, None);
        s.set(ids::DEC, PropertyValue::Double(dec), Origin::Gaia, Confidence::High, None);
        s
    }

    #[test]
    fn add_and_iterate_preserves_order() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(1.0, 1.0));
        let b = arena.alloc(star_at(2.0, 2.0));
        let mut list = StarList::new("test", Origin::Gaia);
        list.add_ref_at_tail(a);
        list.add_ref_at_tail(b);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn dec_index_bounds_candidates() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(10.0, 0.0));
        let b = arena.alloc(star_at(10.0, 5.0));
        let mut list = StarList::new("test", Origin::Gaia);
        list.add_ref_at_tail(a);
        list.add_ref_at_tail(b);
        list.prepare_index(&arena);
        let near = list.candidates_near(0.0, 0.01);
        assert_eq!(near, vec![a]);
    }

    #[test]
    fn copy_refs_transfers_ownership_when_asked() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(1.0, 1.0));
        let mut src = StarList::new("src", Origin::Gaia);
        src.add_ref_at_tail(a);
        let mut dst = StarList::new("dst", Origin::Gaia);
        dst.copy_refs(&mut src, true);
        assert_eq!(dst.len(), 1);
        assert_eq!(src.len(), 0);
    }

    #[test]
    fn filter_duplicates_keeps_first_occurrence() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(10.0, 0.0));
        let b = arena.alloc(star_at(10.0 + 0.002 / 3600.0, 0.0));
        let mut list = StarList::new("test", Origin::Gaia);
        list.add_ref_at_tail(a);
        list.add_ref_at_tail(b);
        let removed = list.filter_duplicates(&arena, 0.0036);
        assert_eq!(removed, 1);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn filter_duplicates_keeps_distinct_stars_outside_radius() {
        let mut arena = StarArena::new();
        let a = arena.alloc(star_at(10.0, 0.0));
        let b = arena.alloc(star_at(10.01, 0.0));
        let mut list = StarList::new("test", Origin::Gaia);
        list.add_ref_at_tail(a);
        list.add_ref_at_tail(b);
        let removed = list.filter_duplicates(&arena, 0.0036);
        assert_eq!(removed, 0);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![a, b]);
    }
}

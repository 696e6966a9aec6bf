//! Property-bag star record and the arena that owns them.
//!
//! A [`Star`] is a fixed-length array of [`Property`] slots, one per
//! registered [`MetaId`], replacing the C++ model's per-star dynamic
//! property list. Stars live in a [`StarArena`] and are referenced by the
//! [`StarId`] handle rather than by pointer, so [`crate::star_list::StarList`]s
//! can share and re-order references without fighting an ownership flag.

use serde::{Deserialize, Serialize};

use crate::property::{ids, registry, MetaId};
use crate::value::{Confidence, Origin, PropertyValue};

//tp Property
/// One value slot on a [`Star`]: a value with its provenance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    value: Option<PropertyValue>,
    error: Option<f64>,
    origin: Origin,
    confidence: Confidence,
}

impl Property {
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<f64> {
        self.error
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn clear(&mut self) {
        *self = Property::default();
    }

    pub fn set(&mut self, value: PropertyValue, origin: Origin, confidence: Confidence, error: Option<f64>) {
        self.value = Some(value);
        self.origin = origin;
        self.confidence = confidence;
        self.error = error;
    }
}

//tp OverwriteMask
/// Per-property override used by [`Star::update`]: properties listed here
/// are overwritten unconditionally, regardless of confidence
#[derive(Debug, Clone, Default)]
pub struct OverwriteMask(Vec<bool>);

impl OverwriteMask {
    pub fn none() -> Self {
        OverwriteMask(vec![false; registry().len()])
    }

    pub fn from_ids(ids: &[MetaId]) -> Self {
        let mut mask = vec![false; registry().len()];
        for id in ids {
            mask[id.0] = true;
        }
        OverwriteMask(mask)
    }

    pub fn contains(&self, id: MetaId) -> bool {
        self.0.get(id.0).copied().unwrap_or(false)
    }
}

//tp UpdateCounters
/// Per-property count of values changed by [`Star::update`], for merge statistics
#[derive(Debug, Clone, Default)]
pub struct UpdateCounters(Vec<u32>);

impl UpdateCounters {
    pub fn new() -> Self {
        UpdateCounters(vec![0; registry().len()])
    }

    pub fn count(&self, id: MetaId) -> u32 {
        self.0.get(id.0).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    fn bump(&mut self, id: MetaId) {
        self.0[id.0] += 1;
    }
}

//tp Star
/// A fixed-length array of [`Property`] slots indexed by [`MetaId`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    properties: Vec<Property>,
}

impl Default for Star {
    fn default() -> Self {
        Star {
            properties: vec![Property::default(); registry().len()],
        }
    }
}

impl Star {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: MetaId) -> &Property {
        &self.properties[id.0]
    }

    pub fn is_set(&self, id: MetaId) -> bool {
        self.properties[id.0].is_set()
    }

    pub fn set(&mut self, id: MetaId, value: PropertyValue, origin: Origin, confidence: Confidence, error: Option<f64>) {
        self.properties[id.0].set(value, origin, confidence, error);
    }

    pub fn clear_value(&mut self, id: MetaId) {
        self.properties[id.0].clear();
    }

    //fp ra_dec
    /// The star's current RA/DEC in degrees, if both are set
    pub fn ra_dec(&self) -> Option<(f64, f64)> {
        let ra = self.get(ids::RA).value()?.as_f64()?;
        let dec = self.get(ids::DEC).value()?.as_f64()?;
        Some((ra, dec))
    }

    //fp pm_ra_dec
    /// Proper motion in mas/yr, defaulting absent components to zero
    pub fn pm_ra_dec(&self) -> (f64, f64) {
        let pm_ra = self.get(ids::PM_RA).value().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let pm_dec = self.get(ids::PM_DEC).value().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (pm_ra, pm_dec)
    }

    pub fn target_id(&self) -> Option<&str> {
        self.get(ids::TARGET_ID).value().and_then(|v| v.as_str())
    }

    pub fn set_target_id(&mut self, target_id: impl Into<String>) {
        self.set(ids::TARGET_ID, PropertyValue::Str(target_id.into()), Origin::Computed, Confidence::High, None);
    }

    pub fn jd_date(&self) -> Option<f64> {
        self.get(ids::JD_DATE).value().and_then(|v| v.as_f64())
    }

    pub fn group_size(&self) -> i64 {
        self.get(ids::GROUP_SIZE).value().and_then(|v| v.as_i64()).unwrap_or(1)
    }

    pub fn set_group_size(&mut self, n: i64) {
        self.set(ids::GROUP_SIZE, PropertyValue::Int(n), Origin::Computed, Confidence::High, None);
    }

    pub fn xm_log(&self) -> &str {
        self.get(ids::XM_LOG).value().and_then(|v| v.as_str()).unwrap_or("")
    }

    pub fn append_xm_log(&mut self, line: &str) {
        let mut log = self.xm_log().to_string();
        if !log.is_empty() {
            log.push('\n');
        }
        log.push_str(line);
        self.set(ids::XM_LOG, PropertyValue::Str(log), Origin::Computed, Confidence::High, None);
    }

    pub fn xm_main_flag(&self) -> i64 {
        self.get(ids::XM_MAIN_FLAG).value().and_then(|v| v.as_i64()).unwrap_or(0)
    }

    pub fn set_xm_main_flag(&mut self, flag: i64) {
        self.set(ids::XM_MAIN_FLAG, PropertyValue::Int(flag), Origin::Computed, Confidence::High, None);
    }

    pub fn xm_all_flag(&self) -> i64 {
        self.get(ids::XM_ALL_FLAG).value().and_then(|v| v.as_i64()).unwrap_or(0)
    }

    pub fn set_xm_all_flag(&mut self, flag: i64) {
        self.set(ids::XM_ALL_FLAG, PropertyValue::Int(flag), Origin::Computed, Confidence::High, None);
    }

    //fp correct_ra_dec_epoch
    /// Overwrite RA/DEC in place, precessed to `epoch_to` using this star's
    /// own proper motion; no-op if RA/DEC or `jdDate` is not set
    pub fn correct_ra_dec_epoch(&mut self, epoch_to: f64) {
        let Some((ra, dec)) = self.ra_dec() else { return };
        let Some(epoch_from) = self.jd_date() else { return };
        let (pm_ra, pm_dec) = self.pm_ra_dec();
        let (new_ra, new_dec) = crate::units::precess_ra_dec(ra, dec, pm_ra, pm_dec, epoch_from, epoch_to);
        let (origin, confidence) = (self.get(ids::RA).origin(), self.get(ids::RA).confidence());
        self.set(ids::RA, PropertyValue::Double(new_ra), origin, confidence, self.get(ids::RA).error());
        let (origin, confidence) = (self.get(ids::DEC).origin(), self.get(ids::DEC).confidence());
        self.set(ids::DEC, PropertyValue::Double(new_dec), origin, confidence, self.get(ids::DEC).error());
        self.set(ids::JD_DATE, PropertyValue::Double(epoch_to), Origin::Computed, Confidence::High, None);
    }

    //fp snapshot_ra_dec
    /// Clone the RA/DEC property slots, for restoring after a temporary
    /// epoch precession used only to decide a match
    pub fn snapshot_ra_dec(&self) -> (Property, Property) {
        (self.get(ids::RA).clone(), self.get(ids::DEC).clone())
    }

    //fp restore_ra_dec
    /// Overwrite the RA/DEC property slots with a prior [`Star::snapshot_ra_dec`]
    pub fn restore_ra_dec(&mut self, snapshot: (Property, Property)) {
        self.properties[ids::RA.0] = snapshot.0;
        self.properties[ids::DEC.0] = snapshot.1;
    }

    //fp update
    /// Merge `src` into `self` in place: a property is copied when it is set
    /// on `src` and either unset on `self`, listed in `overwrite_mask`, or
    /// set on `self` with strictly lower confidence than `src`.
    ///
    /// Returns true if any property changed.
    pub fn update(&mut self, src: &Star, overwrite_mask: &OverwriteMask, counters: &mut UpdateCounters) -> bool {
        let mut changed = false;
        for i in 0..self.properties.len() {
            let id = MetaId(i);
            let src_prop = &src.properties[i];
            if !src_prop.is_set() {
                continue;
            }
            let dst_prop = &self.properties[i];
            let should_overwrite = !dst_prop.is_set()
                || overwrite_mask.contains(id)
                || src_prop.confidence() > dst_prop.confidence();
            if should_overwrite {
                self.properties[i] = src_prop.clone();
                counters.bump(id);
                changed = true;
            }
        }
        changed
    }
}

//tp StarId
/// Handle into a [`StarArena`]; cheap to copy and compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StarId(pub usize);

//tp StarArena
/// Owns every [`Star`] created during one scenario execution
#[derive(Debug, Default)]
pub struct StarArena {
    stars: Vec<Star>,
}

impl StarArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, star: Star) -> StarId {
        let id = StarId(self.stars.len());
        self.stars.push(star);
        id
    }

    pub fn get(&self, id: StarId) -> &Star {
        &self.stars[id.0]
    }

    pub fn get_mut(&mut self, id: StarId) -> &mut Star {
        &mut self.stars[id.0]
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

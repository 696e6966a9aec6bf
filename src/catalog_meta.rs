//! Per-catalog configuration consulted by the Merger and Matcher.
//!
//! Grounded in the catalog descriptor fields referenced throughout
//! `vobsSTAR_LIST.cpp`'s `Merge()` (`GetOverwritePropertyMask`,
//! `HasMultipleRows`, `GetMatchMode`, `DoPrecessEpoch`, `GetPrecision`).

use crate::star::OverwriteMask;
use crate::value::Origin;

//tp MatchMode
/// Whether a Path-A merge keeps every candidate star sharing a target id,
/// or only the single best match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Best,
    All,
}

//tp MatePolicy
/// How double-star catalogs (WDS, SB9) interact with ambiguity resolution:
/// `MatesBypassAmbiguity` lets a secondary "mate" star through even when it
/// would otherwise be rejected as an ambiguous match, because the catalog is
/// expected to carry more than one physically real entry per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatePolicy {
    Standard,
    MatesBypassAmbiguity,
}

//tp CatalogMeta
/// Static, per-catalog configuration that shapes how its stars are matched
/// and merged into a working list
#[derive(Debug, Clone)]
pub struct CatalogMeta {
    pub catalog_id: Origin,
    /// Astrometric precision of this catalog's coordinates, in arcseconds
    pub precision_as: f64,
    pub epoch: f64,
    pub single_epoch: bool,
    pub multiple_rows: bool,
    pub precess_epoch: bool,
    pub overwrite_mask: OverwriteMask,
    pub match_mode: MatchMode,
    pub mate_policy: MatePolicy,
    /// True for the catalog seeding the whole scenario (e.g. ASCC); its
    /// cross-match threshold score floor is relaxed to zero
    pub is_primary: bool,
}

impl CatalogMeta {
    pub fn new(catalog_id: Origin, precision_as: f64, epoch: f64) -> Self {
        CatalogMeta {
            catalog_id,
            precision_as,
            epoch,
            single_epoch: true,
            multiple_rows: false,
            precess_epoch: false,
            overwrite_mask: OverwriteMask::none(),
            match_mode: MatchMode::Best,
            mate_policy: MatePolicy::Standard,
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn with_overwrite_mask(mut self, mask: OverwriteMask) -> Self {
        self.overwrite_mask = mask;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_mate_policy(mut self, policy: MatePolicy) -> Self {
        self.mate_policy = policy;
        self
    }

    pub fn precessing(mut self) -> Self {
        self.precess_epoch = true;
        self
    }

    pub fn multi_row(mut self) -> Self {
        self.multiple_rows = true;
        self
    }
}

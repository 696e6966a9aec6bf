//! Process-wide property metadata registry.
//!
//! The registry is built once and never mutated again, mirroring the
//! `vobsSTAR_PROPERTY_META_LIST` catalog of property descriptors in the
//! original scenario executor; here it is a plain `Vec` behind a
//! `OnceLock`, addressed by compile-time [`MetaId`] constants on the hot
//! path and by string id for configuration-driven lookups (criteria lists,
//! CLI flags).

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

//tp MetaId
/// Index into the property registry. Stable for the lifetime of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetaId(pub usize);

//tp PropertyType
/// Declared scalar type backing a property's [`crate::value::PropertyValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Int,
    Long,
    Double,
    Bool,
}

//tp PropertyMeta
/// Immutable descriptor for one property slot
#[derive(Debug, Clone)]
pub struct PropertyMeta {
    pub id: MetaId,
    pub name: &'static str,
    pub unit: &'static str,
    pub ty: PropertyType,
    pub description: &'static str,
    /// If set, the id of the property holding this one's error/uncertainty
    pub error_meta_id: Option<MetaId>,
}

// Well-known property ids, fixed at registry-build order. Convenience
// accessors on `Star` (ra, dec, pm_ra, ...) and the Matcher/Merger index
// into the registry through these rather than string lookups.
pub mod ids {
    use super::MetaId;

    pub const RA: MetaId = MetaId(0);
    pub const DEC: MetaId = MetaId(1);
    pub const PM_RA: MetaId = MetaId(2);
    pub const PM_DEC: MetaId = MetaId(3);
    pub const TARGET_ID: MetaId = MetaId(4);
    pub const JD_DATE: MetaId = MetaId(5);
    pub const GROUP_SIZE: MetaId = MetaId(6);
    pub const XM_LOG: MetaId = MetaId(7);
    pub const XM_MAIN_FLAG: MetaId = MetaId(8);
    pub const XM_ALL_FLAG: MetaId = MetaId(9);
    pub const ID_HD: MetaId = MetaId(10);
    pub const ID_HIP: MetaId = MetaId(11);
    pub const ID_GAIA: MetaId = MetaId(12);
    pub const MAG_V: MetaId = MetaId(13);
    pub const MAG_V_ERR: MetaId = MetaId(14);
    pub const MAG_G: MetaId = MetaId(15);
    pub const MAG_G_ERR: MetaId = MetaId(16);
    pub const MAG_B: MetaId = MetaId(17);
    pub const MAG_J: MetaId = MetaId(18);
    pub const MAG_H: MetaId = MetaId(19);
    pub const MAG_K: MetaId = MetaId(20);
    pub const DIAMETER: MetaId = MetaId(21);
    pub const DIAMETER_OK: MetaId = MetaId(22);

    pub const COUNT: usize = 23;
}

//tp PropertyRegistry
/// The process-wide, read-only table of [`PropertyMeta`]
pub struct PropertyRegistry {
    metas: Vec<PropertyMeta>,
    by_name: std::collections::HashMap<&'static str, MetaId>,
}

impl PropertyRegistry {
    fn push(
        metas: &mut Vec<PropertyMeta>,
        by_name: &mut std::collections::HashMap<&'static str, MetaId>,
        id: MetaId,
        name: &'static str,
        unit: &'static str,
        ty: PropertyType,
        description: &'static str,
        error_meta_id: Option<MetaId>,
    ) {
        assert_eq!(id.0, metas.len(), "property ids must be pushed in order");
        by_name.insert(name, id);
        metas.push(PropertyMeta {
            id,
            name,
            unit,
            ty,
            description,
            error_meta_id,
        });
    }

    //fp standard
    /// Build the standard registry used throughout this crate
    pub fn standard() -> Self {
        use ids::*;
        use PropertyType::*;

        let mut metas = Vec::with_capacity(COUNT);
        let mut by_name = std::collections::HashMap::with_capacity(COUNT);
        macro_rules! m {
            ($id:expr, $name:expr, $unit:expr, $ty:expr, $desc:expr) => {
                Self::push(&mut metas, &mut by_name, $id, $name, $unit, $ty, $desc, None)
            };
            ($id:expr, $name:expr, $unit:expr, $ty:expr, $desc:expr, err=$err:expr) => {
                Self::push(
                    &mut metas, &mut by_name, $id, $name, $unit, $ty, $desc, Some($err),
                )
            };
        }

        m!(RA, "RAJ2000", "deg", Double, "Right ascension");
        m!(DEC, "DEJ2000", "deg", Double, "Declination");
        m!(PM_RA, "pmRA", "mas/yr", Double, "Proper motion in RA*cos(DEC)");
        m!(PM_DEC, "pmDE", "mas/yr", Double, "Proper motion in DEC");
        m!(TARGET_ID, "targetId", "", String, "Cross-match group identifier");
        m!(JD_DATE, "jdDate", "d", Double, "Julian date of the astrometric epoch");
        m!(GROUP_SIZE, "groupSize", "", Int, "Number of catalogs contributing to this star");
        m!(XM_LOG, "xmLog", "", String, "Human readable cross-match trace");
        m!(XM_MAIN_FLAG, "xmMainFlag", "", Int, "Match-type bit flags for the primary xmatch");
        m!(XM_ALL_FLAG, "xmAllFlag", "", Int, "Match-type bit flags accumulated across all merges");
        m!(ID_HD, "HD", "", String, "Henry Draper identifier");
        m!(ID_HIP, "HIP", "", String, "Hipparcos identifier");
        m!(ID_GAIA, "GaiaDR3", "", Long, "Gaia DR3 source identifier");
        m!(MAG_V, "Vmag", "mag", Double, "V band magnitude", err = MAG_V_ERR);
        m!(MAG_V_ERR, "e_Vmag", "mag", Double, "V band magnitude error");
        m!(MAG_G, "Gmag", "mag", Double, "Gaia G band magnitude", err = MAG_G_ERR);
        m!(MAG_G_ERR, "e_Gmag", "mag", Double, "Gaia G band magnitude error");
        m!(MAG_B, "Bmag", "mag", Double, "B band magnitude");
        m!(MAG_J, "Jmag", "mag", Double, "2MASS J band magnitude");
        m!(MAG_H, "Hmag", "mag", Double, "2MASS H band magnitude");
        m!(MAG_K, "Kmag", "mag", Double, "2MASS K band magnitude");
        m!(DIAMETER, "diam", "mas", Double, "Angular diameter estimate");
        m!(DIAMETER_OK, "diamFlag", "", Bool, "Whether the diameter estimate is usable");

        assert_eq!(metas.len(), COUNT);
        PropertyRegistry { metas, by_name }
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    pub fn meta(&self, id: MetaId) -> &PropertyMeta {
        &self.metas[id.0]
    }

    pub fn by_name(&self, name: &str) -> Result<MetaId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownPropertyId(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyMeta> {
        self.metas.iter()
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

//fp registry
/// The process-wide registry, built on first use
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(PropertyRegistry::standard)
}

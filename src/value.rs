//! Leaf value types attached to a [`crate::star::Property`].

use serde::{Deserialize, Serialize};

//tp PropertyValue
/// A property's payload, tagged by the type declared in its [`crate::property::PropertyMeta`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Long(i64),
    Double(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            PropertyValue::Int(v) | PropertyValue::Long(v) => Some(*v as f64),
            PropertyValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            PropertyValue::Str(_) => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) | PropertyValue::Long(v) => Some(*v),
            PropertyValue::Double(v) => Some(*v as i64),
            PropertyValue::Bool(v) => Some(if *v { 1 } else { 0 }),
            PropertyValue::Str(_) => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            PropertyValue::Int(v) | PropertyValue::Long(v) => Some(*v != 0),
            PropertyValue::Double(v) => Some(*v != 0.0),
            PropertyValue::Str(_) => None,
        }
    }
}

//tp Confidence
/// How much a catalog's author vouches for a property value.
///
/// Totally ordered; `Update`'s `overwrite=PARTIAL` branch overwrites an
/// existing value only when the incoming confidence is strictly higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    No,
    Low,
    Medium,
    High,
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::No
    }
}

//tp Origin
/// Provenance of a property value: the catalog it came from, or a reserved
/// marker for computed/ambiguous/absent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    None,
    Computed,
    Mixed,
    Ascc,
    Hip2,
    Tycho2,
    Gaia,
    TwoMass,
    Wise,
    Denis,
    Akari,
    Sb9,
    Wds,
    Jsdc,
    BadcalLocal,
}

impl Default for Origin {
    fn default() -> Self {
        Origin::None
    }
}

impl Origin {
    //fp parse_catalog_name
    /// Parse a catalog name in the form produced by `Display`, case-insensitively
    pub fn parse_catalog_name(name: &str) -> Option<Origin> {
        let origin = match name.to_ascii_uppercase().as_str() {
            "NONE" => Origin::None,
            "COMPUTED" => Origin::Computed,
            "MIXED" => Origin::Mixed,
            "ASCC" => Origin::Ascc,
            "HIP2" => Origin::Hip2,
            "TYCHO2" => Origin::Tycho2,
            "GAIA" => Origin::Gaia,
            "2MASS" => Origin::TwoMass,
            "WISE" => Origin::Wise,
            "DENIS" => Origin::Denis,
            "AKARI" => Origin::Akari,
            "SB9" => Origin::Sb9,
            "WDS" => Origin::Wds,
            "JSDC" => Origin::Jsdc,
            "BADCAL_LOCAL" => Origin::BadcalLocal,
            _ => return None,
        };
        Some(origin)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Origin::None => "NONE",
            Origin::Computed => "COMPUTED",
            Origin::Mixed => "MIXED",
            Origin::Ascc => "ASCC",
            Origin::Hip2 => "HIP2",
            Origin::Tycho2 => "TYCHO2",
            Origin::Gaia => "GAIA",
            Origin::TwoMass => "2MASS",
            Origin::Wise => "WISE",
            Origin::Denis => "DENIS",
            Origin::Akari => "AKARI",
            Origin::Sb9 => "SB9",
            Origin::Wds => "WDS",
            Origin::Jsdc => "JSDC",
            Origin::BadcalLocal => "BADCAL_LOCAL",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_name_round_trips_through_display_and_parse() {
        let all = [
            Origin::None,
            Origin::Computed,
            Origin::Mixed,
            Origin::Ascc,
            Origin::Hip2,
            Origin::Tycho2,
            Origin::Gaia,
            Origin::TwoMass,
            Origin::Wise,
            Origin::Denis,
            Origin::Akari,
            Origin::Sb9,
            Origin::Wds,
            Origin::Jsdc,
            Origin::BadcalLocal,
        ];
        for origin in all {
            assert_eq!(Origin::parse_catalog_name(&origin.to_string()), Some(origin));
        }
        assert_eq!(Origin::parse_catalog_name("nonsense"), None);
    }
}

//! Contracts for the collaborators this crate consumes but does not
//! implement for production use: the remote catalog client, the local flat
//! file loader, and the astrometric kernel. Each trait ships one
//! deterministic, in-memory or file-backed implementation for tests and the
//! CLI demo, grounded in `vobsCATALOG_ASCC_LOCAL.cpp`/`vobsCATALOG_BADCAL_LOCAL.cpp`'s
//! flat-file reading and in `vobsSTAR_LIST.h`'s angular-distance usage.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::criteria::CriteriaList;
use crate::error::{Error, Result};
use crate::property::ids;
use crate::star::{Star, StarArena};
use crate::star_list::StarList;
use crate::value::{Confidence, Origin, PropertyValue};

//tp CatalogClient
/// Fetches a catalog's stars for one cone-search request
pub trait CatalogClient {
    fn fetch(&self, catalog: Origin, ra_deg: f64, dec_deg: f64, radius_deg: f64, arena: &mut StarArena) -> Result<StarList>;
}

//tp CatalogLoader
/// Loads a catalog from a local resource (as opposed to a remote query)
pub trait CatalogLoader {
    fn load(&self, catalog: Origin, arena: &mut StarArena) -> Result<StarList>;
}

//tp AstroKernel
/// The one astrophysical primitive this engine depends on
pub trait AstroKernel {
    fn angular_distance_as(&self, ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64;
}

//tp NullAstroKernel
/// Plain haversine great-circle distance, no atmospheric or relativistic corrections
pub struct NullAstroKernel;

impl AstroKernel for NullAstroKernel {
    fn angular_distance_as(&self, ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
        crate::units::angular_distance_as(ra1_deg, dec1_deg, ra2_deg, dec2_deg)
    }
}

//tp FakeCatalogClient
/// In-memory `CatalogClient` seeded with fixture stars, for tests and the
/// CLI's `--fixtures` mode. The radius/center arguments are honored so
/// scenario tests can exercise cone-search pruning.
#[derive(Default)]
pub struct FakeCatalogClient {
    fixtures: HashMap<String, Vec<(f64, f64, f64)>>, // catalog name -> (ra_deg, dec_deg, vmag)
}

impl FakeCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, catalog: Origin, stars: Vec<(f64, f64, f64)>) -> Self {
        self.fixtures.insert(catalog.to_string(), stars);
        self
    }
}

impl CatalogClient for FakeCatalogClient {
    fn fetch(&self, catalog: Origin, ra_deg: f64, dec_deg: f64, radius_deg: f64, arena: &mut StarArena) -> Result<StarList> {
        let mut list = StarList::new(catalog.to_string(), catalog);
        let Some(rows) = self.fixtures.get(&catalog.to_string()) else {
            return Ok(list);
        };
        for (i, &(ra, dec, vmag)) in rows.iter().enumerate() {
            if crate::units::angular_distance_as(ra, dec, ra_deg, dec_deg) / 3600.0 > radius_deg {
                continue;
            }
            let mut star = Star::new();
            star.set(ids::RA, PropertyValue::Double(ra), catalog, Confidence::High, None);
            star.set(ids::DEC, PropertyValue::Double(dec), catalog, Confidence::High, None);
            star.set(ids::MAG_V, PropertyValue::Double(vmag), catalog, Confidence::High, None);
            star.set_target_id(format!("{catalog}-{i}"));
            let id = arena.alloc(star);
            list.add_ref_at_tail(id);
        }
        Ok(list)
    }
}

//tp FlatFileCatalogLoader
/// Reads a header-plus-rows local catalog file: first line is a
/// whitespace-separated column list (`RAJ2000 DEJ2000 Vmag ...`), each
/// following line one star, whitespace-separated, `-` marking an absent cell.
pub struct FlatFileCatalogLoader {
    path: PathBuf,
    catalog: Origin,
}

impl FlatFileCatalogLoader {
    pub fn new(path: impl Into<PathBuf>, catalog: Origin) -> Self {
        FlatFileCatalogLoader { path: path.into(), catalog }
    }

    //fp mtime
    /// Last-modified time of the backing file, used by callers to decide
    /// whether a cached load is stale
    pub fn mtime(&self) -> Result<SystemTime> {
        Ok(fs::metadata(&self.path)?.modified()?)
    }
}

fn column_meta_id(column: &str) -> Option<crate::property::MetaId> {
    match column {
        "RAJ2000" => Some(ids::RA),
        "DEJ2000" => Some(ids::DEC),
        "pmRA" => Some(ids::PM_RA),
        "pmDE" => Some(ids::PM_DEC),
        "Vmag" => Some(ids::MAG_V),
        "Gmag" => Some(ids::MAG_G),
        "HD" => Some(ids::ID_HD),
        "HIP" => Some(ids::ID_HIP),
        _ => None,
    }
}

impl CatalogLoader for FlatFileCatalogLoader {
    /// A malformed row (wrong column count, an unparseable cell, or a
    /// missing RA/DEC) is never fatal: it is logged and skipped, and the
    /// loader keeps reading the rest of the file.
    fn load(&self, catalog: Origin, arena: &mut StarArena) -> Result<StarList> {
        let text = fs::read_to_string(&self.path)?;
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| Error::BadData("empty catalog file".into()))?;
        let columns: Vec<&str> = header.split_whitespace().collect();
        let mut list = StarList::new(self.path.display().to_string(), catalog);
        let mut n_bad_rows = 0usize;
        for (row_idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != columns.len() {
                log::warn!("row {row_idx}: expected {} columns, got {} - skipped", columns.len(), cells.len());
                n_bad_rows += 1;
                continue;
            }
            let mut star = Star::new();
            let mut row_ok = true;
            for (col, cell) in columns.iter().zip(cells.iter()) {
                if *cell == "-" {
                    continue;
                }
                let Some(meta_id) = column_meta_id(col) else { continue };
                let ty = crate::property::registry().meta(meta_id).ty;
                let value = match ty {
                    crate::property::PropertyType::Double => match cell.parse::<f64>() {
                        Ok(v) => PropertyValue::Double(v),
                        Err(e) => {
                            log::warn!("row {row_idx} col {col}: {e} - skipped");
                            row_ok = false;
                            break;
                        }
                    },
                    crate::property::PropertyType::Int => match cell.parse::<i64>() {
                        Ok(v) => PropertyValue::Int(v),
                        Err(e) => {
                            log::warn!("row {row_idx} col {col}: {e} - skipped");
                            row_ok = false;
                            break;
                        }
                    },
                    crate::property::PropertyType::Long => match cell.parse::<i64>() {
                        Ok(v) => PropertyValue::Long(v),
                        Err(e) => {
                            log::warn!("row {row_idx} col {col}: {e} - skipped");
                            row_ok = false;
                            break;
                        }
                    },
                    crate::property::PropertyType::Bool => match cell.parse::<i64>() {
                        Ok(v) => PropertyValue::Bool(v != 0),
                        Err(e) => {
                            log::warn!("row {row_idx} col {col}: {e} - skipped");
                            row_ok = false;
                            break;
                        }
                    },
                    crate::property::PropertyType::String => PropertyValue::Str(cell.to_string()),
                };
                star.set(meta_id, value, catalog, Confidence::High, None);
            }
            if !row_ok {
                n_bad_rows += 1;
                continue;
            }
            if star.ra_dec().is_none() {
                log::warn!("row {row_idx}: missing RA/DEC - skipped");
                n_bad_rows += 1;
                continue;
            }
            star.set_target_id(format!("{catalog}-{row_idx}"));
            let id = arena.alloc(star);
            list.add_ref_at_tail(id);
        }
        if n_bad_rows > 0 {
            log::warn!("{}: skipped {n_bad_rows} malformed row(s)", self.path.display());
        }
        Ok(list)
    }
}

//fp criteria_for_catalog
/// Built-in tuned radii per catalog, grounded in
/// `original_source/SearchCal/vobs/include/vobsSCENARIO.h`'s `InitCriteriaLists`
pub fn criteria_for_catalog(catalog: Origin) -> CriteriaList {
    use crate::criteria::Criterion;
    let radius_as = match catalog {
        Origin::Gaia | Origin::Hip2 => 1.5,
        Origin::Sb9 | Origin::Wds => 2.0,
        Origin::TwoMass => 3.5,
        Origin::Wise => 6.5,
        Origin::Akari => 3.0,
        Origin::Jsdc => 0.0036,
        Origin::Tycho2 | Origin::Ascc | Origin::Denis | Origin::BadcalLocal => 1.5,
        Origin::Computed | Origin::Mixed | Origin::None => 1.5,
    };
    CriteriaList::new(vec![Criterion::RaDecRadius { radius_as }]).expect("built-in criteria list is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn fake_client_honors_cone_radius() {
        let mut arena = StarArena::new();
        let client = FakeCatalogClient::new().seed(Origin::Gaia, vec![(10.0, 20.0, 5.0), (50.0, 20.0, 5.0)]);
        let list = client.fetch(Origin::Gaia, 10.0, 20.0, 1.0, &mut arena).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn flat_file_loader_reads_header_and_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RAJ2000 DEJ2000 Vmag").unwrap();
        writeln!(file, "10.0 20.0 5.0").unwrap();
        writeln!(file, "11.0 21.0 -").unwrap();
        let loader = FlatFileCatalogLoader::new(file.path(), Origin::Ascc);
        let mut arena = StarArena::new();
        let list = loader.load(Origin::Ascc, &mut arena).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn flat_file_loader_skips_malformed_rows_instead_of_failing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RAJ2000 DEJ2000 Vmag").unwrap();
        writeln!(file, "10.0 20.0 5.0").unwrap();
        writeln!(file, "11.0 21.0").unwrap(); // wrong column count
        writeln!(file, "not-a-number 22.0 5.0").unwrap(); // unparseable RA
        writeln!(file, "- 23.0 5.0").unwrap(); // missing RA
        writeln!(file, "13.0 24.0 5.0").unwrap();
        let loader = FlatFileCatalogLoader::new(file.path(), Origin::Ascc);
        let mut arena = StarArena::new();
        let list = loader.load(Origin::Ascc, &mut arena).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn flat_file_loader_mtime_changes_after_rewrite() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RAJ2000 DEJ2000").unwrap();
        writeln!(file, "10.0 20.0").unwrap();
        let loader = FlatFileCatalogLoader::new(file.path(), Origin::Ascc);
        let t0 = loader.mtime().unwrap();
        assert!(t0 <= SystemTime::now());
    }
}

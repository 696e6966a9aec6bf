//! End-to-end merge behavior across catalogs of differing confidence.

use std::error::Error;
use std::rc::Rc;

use vobs_xmatch::criteria::{Criterion, CriteriaList};
use vobs_xmatch::merger::merge;
use vobs_xmatch::property::ids;
use vobs_xmatch::star::StarArena;
use vobs_xmatch::star_list::StarList;
use vobs_xmatch::{CatalogMeta, Confidence, Origin, PropertyValue, Star};

fn star_at(ra: f64, dec: f64, mag: f64) -> Star {
    let mut s = Star::new();
    s.set(ids::RA, PropertyValue::Double(ra), Origin::Ascc, Confidence::High, None);
    s.set(ids::DEC, PropertyValue::Double(dec), Origin::Ascc, Confidence::High, None);
    s.set(ids::MAG_V, PropertyValue::Double(mag), Origin::Ascc, Confidence::Medium, None);
    s
}

#[test]
fn seeding_catalog_populates_the_working_list() -> Result<(), Box<dyn Error>> {
    let mut arena = StarArena::new();
    let a = arena.alloc(star_at(10.0, 20.0, 5.0));
    let b = arena.alloc(star_at(30.0, -5.0, 7.0));
    let meta = Rc::new(CatalogMeta::new(Origin::Ascc, 1.0, 2000.0).primary());
    let mut from = StarList::new("ascc", Origin::Ascc).with_catalog_meta(meta);
    from.add_ref_at_tail(a);
    from.add_ref_at_tail(b);

    let mut into = StarList::new("working", Origin::None);
    let criteria = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 1.5 }])?;
    let stats = merge(&mut into, &mut arena, &mut from, &criteria, false)?;
    assert_eq!(stats.n_added, 2);
    assert_eq!(into.len(), 2);
    Ok(())
}

#[test]
fn high_confidence_secondary_catalog_overwrites_value_when_masked() -> Result<(), Box<dyn Error>> {
    let mut arena = StarArena::new();
    let seed = arena.alloc(star_at(10.0, 20.0, 5.0));
    let mut into = StarList::new("working", Origin::Ascc);
    into.add_ref_at_tail(seed);

    let mut incoming_star = Star::new();
    incoming_star.set(ids::RA, PropertyValue::Double(10.0), Origin::Gaia, Confidence::High, None);
    incoming_star.set(ids::DEC, PropertyValue::Double(20.0 + 0.2 / 3600.0), Origin::Gaia, Confidence::High, None);
    incoming_star.set(ids::MAG_V, PropertyValue::Double(5.05), Origin::Gaia, Confidence::High, None);
    let incoming = arena.alloc(incoming_star);

    let overwrite = vobs_xmatch::star::OverwriteMask::from_ids(&[ids::MAG_V]);
    let meta = Rc::new(CatalogMeta::new(Origin::Gaia, 0.01, 2016.0).with_overwrite_mask(overwrite));
    let mut from = StarList::new("gaia", Origin::Gaia).with_catalog_meta(meta);
    from.add_ref_at_tail(incoming);

    let criteria = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 1.5 }])?;
    let stats = merge(&mut into, &mut arena, &mut from, &criteria, false)?;
    assert_eq!(stats.n_matched, 1);
    assert_eq!(into.len(), 1);
    let merged = into.get_star(0).unwrap();
    assert_eq!(arena.get(merged).get(ids::MAG_V).value().unwrap().as_f64(), Some(5.05));
    Ok(())
}

#[test]
fn symmetry_failure_rejects_the_losing_row_in_a_shared_target_group() -> Result<(), Box<dyn Error>> {
    let mut arena = StarArena::new();
    let seed = arena.alloc(star_at(10.0, 0.0, 5.0));
    let mut into = StarList::new("working", Origin::Ascc);
    into.add_ref_at_tail(seed);

    // Two WDS components of one double star, sharing a target id: one is
    // genuinely the closest match, the other loses the reverse race for the
    // same seed and must be rejected rather than silently merged.
    let mut close = star_at(10.0, 0.2 / 3600.0, 5.0);
    close.set_target_id("HD1-AB");
    let mut far = star_at(10.0, 0.45 / 3600.0, 5.0);
    far.set_target_id("HD1-AB");
    let close_id = arena.alloc(close);
    let far_id = arena.alloc(far);

    let meta = Rc::new(CatalogMeta::new(Origin::Wds, 0.1, 2000.0));
    let mut from = StarList::new("wds", Origin::Wds).with_catalog_meta(meta);
    from.add_ref_at_tail(close_id);
    from.add_ref_at_tail(far_id);

    let criteria = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 3.0 }])?;
    let stats = merge(&mut into, &mut arena, &mut from, &criteria, true)?;
    assert_eq!(stats.n_matched, 1);
    assert_eq!(stats.n_bad_best, 1);
    Ok(())
}

#[test]
fn precessing_catalog_matches_at_its_own_epoch_then_restores_coordinates() -> Result<(), Box<dyn Error>> {
    let mut arena = StarArena::new();
    let seed = arena.alloc(star_at(10.0, 0.0, 5.0));
    let mut into = StarList::new("working", Origin::Ascc);
    into.add_ref_at_tail(seed);

    // Recorded 5" away from the seed at epoch 1991.25, but with a proper
    // motion that brings it within 0.3" of the seed by 2016.0 - the
    // catalog's median epoch. Without precession this candidate falls
    // outside the 1.5" criterion entirely.
    let raw_dec = 5.0 / 3600.0;
    let mut incoming = Star::new();
    incoming.set(ids::RA, PropertyValue::Double(10.0), Origin::Hip2, Confidence::Low, None);
    incoming.set(ids::DEC, PropertyValue::Double(raw_dec), Origin::Hip2, Confidence::Low, None);
    incoming.set(ids::PM_DEC, PropertyValue::Double(-189.9), Origin::Hip2, Confidence::Low, None);
    incoming.set(ids::JD_DATE, PropertyValue::Double(1991.25), Origin::Hip2, Confidence::Low, None);
    let incoming_id = arena.alloc(incoming);

    let meta = Rc::new(CatalogMeta::new(Origin::Hip2, 0.05, 2016.0).precessing());
    let mut from = StarList::new("hip2", Origin::Hip2).with_catalog_meta(meta);
    from.add_ref_at_tail(incoming_id);

    let criteria = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 1.5 }])?;
    let stats = merge(&mut into, &mut arena, &mut from, &criteria, true)?;
    assert_eq!(stats.n_matched, 1);

    let (_, dec_after) = arena.get(incoming_id).ra_dec().unwrap();
    assert!((dec_after - raw_dec).abs() < 1.0e-9, "incoming star's own coordinates must be restored after matching");
    Ok(())
}

#[test]
fn update_only_catalog_never_grows_the_working_list() -> Result<(), Box<dyn Error>> {
    let mut arena = StarArena::new();
    let seed = arena.alloc(star_at(10.0, 20.0, 5.0));
    let mut into = StarList::new("working", Origin::Ascc);
    into.add_ref_at_tail(seed);

    let unrelated = arena.alloc(star_at(200.0, -60.0, 9.0));
    let meta = Rc::new(CatalogMeta::new(Origin::TwoMass, 0.1, 2000.0));
    let mut from = StarList::new("2mass", Origin::TwoMass).with_catalog_meta(meta);
    from.add_ref_at_tail(unrelated);

    let criteria = CriteriaList::new(vec![Criterion::RaDecRadius { radius_as: 3.5 }])?;
    let stats = merge(&mut into, &mut arena, &mut from, &criteria, true)?;
    assert_eq!(stats.n_added, 0);
    assert_eq!(into.len(), 1);
    Ok(())
}

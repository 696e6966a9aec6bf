//! Merges a freshly-fetched catalog's stars into a working [`StarList`].
//!
//! Two paths, mirroring `vobsSTAR_LIST::Merge()`:
//! - Path A ("closest-ref"), used when the working list already has stars
//!   and the merge is update-only: incoming rows are grouped by `targetId`,
//!   each group matched many-to-many against the nearby reference stars via
//!   [`match_closest_ref`], and used only to update existing stars.
//! - Path B (seed/union), used otherwise: every incoming star is matched
//!   against the working list; a match updates the existing star, a miss is
//!   appended as a new one (unless `update_only` forbids it).

use log::debug;

use crate::catalog_meta::{CatalogMeta, MatchMode, MatePolicy};
use crate::criteria::CriteriaList;
use crate::error::Result;
use crate::matcher::{apply_precession, match_closest_ref, match_one, MatchInfo, PrecessMode, MIN_SCORE_TH};
use crate::property::ids;
use crate::star::{OverwriteMask, StarArena, StarId, UpdateCounters};
use crate::star_list::StarList;
use crate::value::Origin;

//tp MergeStats
/// Summary of one `merge` call, used for scenario progress reporting
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeStats {
    pub n_added: usize,
    pub n_matched: usize,
    pub n_updated: usize,
    /// References that lost the reverse symmetry race and were rejected
    pub n_bad_best: usize,
}

//fp threshold_score
/// The cross-match score floor/ceiling a candidate must fall under to count
/// as a match, per spec.md's §4.5 formula
fn threshold_score(is_primary: bool, precision_as: f64, criteria: &CriteriaList) -> f64 {
    let half_res = precision_as / 2.0;
    let half_radius = criteria.xmatch_radius_as() / 2.0;
    let floor = if is_primary { 0.0 } else { MIN_SCORE_TH };
    let ceiling = half_res.min(half_radius).min(1.0);
    floor.max(ceiling)
}

//fp merge
/// Merge `from` into `into`, consuming `from`'s stars; both lists share `arena`
pub fn merge(into: &mut StarList, arena: &mut StarArena, from: &mut StarList, criteria: &CriteriaList, update_only: bool) -> Result<MergeStats> {
    if from.is_empty() {
        return Ok(MergeStats::default());
    }
    let meta = from.catalog_meta().map(|m| (**m).clone()).unwrap_or_else(|| CatalogMeta::new(from.catalog_id(), 0.0, 2000.0));
    let overwrite_mask = meta.overwrite_mask.clone();

    if into.is_empty() {
        let catalog_id = from.catalog_id();
        for (i, id) in from.iter().collect::<Vec<_>>().into_iter().enumerate() {
            let star = arena.get_mut(id);
            if star.target_id().is_none() {
                star.set_target_id(format!("{catalog_id}-{i}"));
            }
        }
        let n = from.len();
        into.copy_refs(from, true);
        debug!("merge: seeded empty list with {n} stars from {catalog_id}");
        return Ok(MergeStats { n_added: n, ..Default::default() });
    }

    into.prepare_index(arena);
    let thresh = threshold_score(meta.is_primary, meta.precision_as, criteria);
    let pm_slack_as = if meta.precess_epoch { (meta.epoch - 2000.0).abs() * 0.1 } else { 0.0 };
    let dec_window_deg = (criteria.xmatch_radius_as() + pm_slack_as) / 3600.0 + 1.0e-4;
    let clear_ref_coords = overwrite_mask.contains(ids::RA);
    let mut stats = MergeStats::default();

    if update_only {
        from.sort_by_target_id(arena);
        let from_ids: Vec<StarId> = from.iter().collect();
        let mut i = 0;
        while i < from_ids.len() {
            let tid = arena.get(from_ids[i]).target_id().map(str::to_string);
            let mut j = i + 1;
            while j < from_ids.len() && arena.get(from_ids[j]).target_id().map(str::to_string) == tid {
                j += 1;
            }
            let group = &from_ids[i..j];
            if meta.multiple_rows {
                apply_multi_row_group(into, arena, group, criteria, thresh, dec_window_deg, &overwrite_mask, &mut stats);
            } else {
                apply_path_a_group(
                    into,
                    arena,
                    group,
                    from.catalog_id(),
                    criteria,
                    thresh,
                    dec_window_deg,
                    &overwrite_mask,
                    meta.mate_policy,
                    meta.match_mode,
                    meta.precess_epoch,
                    meta.single_epoch,
                    meta.epoch,
                    clear_ref_coords,
                    &mut stats,
                );
            }
            i = j;
        }
    } else {
        for id in from.iter().collect::<Vec<_>>() {
            apply_one(into, arena, id, criteria, thresh, dec_window_deg, &overwrite_mask, false, &mut stats);
        }
    }

    into.prepare_index(arena);
    debug!(
        "merge: matched={} updated={} added={} bad_best={}",
        stats.n_matched, stats.n_updated, stats.n_added, stats.n_bad_best
    );
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
fn apply_one(
    into: &mut StarList,
    arena: &mut StarArena,
    incoming: StarId,
    criteria: &CriteriaList,
    thresh: f64,
    dec_window_deg: f64,
    overwrite_mask: &OverwriteMask,
    update_only: bool,
    stats: &mut MergeStats,
) {
    let dec = arena.get(incoming).ra_dec().map(|(_, d)| d).unwrap_or(0.0);
    let candidates = into.candidates_near(dec, dec_window_deg);
    let info = match_one(arena, incoming, candidates.into_iter(), criteria, thresh);
    if info.match_type.is_good() {
        if let Some(target) = info.star {
            let src_star = arena.get(incoming).clone();
            let mut counters = UpdateCounters::new();
            let changed = arena.get_mut(target).update(&src_star, overwrite_mask, &mut counters);
            let flags = arena.get(target).xm_all_flag() as u32 | info.match_type.as_flag();
            arena.get_mut(target).set_xm_all_flag(flags as i64);
            stats.n_matched += 1;
            if changed {
                stats.n_updated += 1;
            }
        }
    } else if !update_only {
        into.add_ref_at_tail(incoming);
        stats.n_added += 1;
    }
}

//fp apply_multi_row_group
/// Simpler path for catalogs flagged `multiple_rows` (e.g. photometry
/// libraries): every matching row updates its reference independently, with
/// no reverse-symmetry check.
#[allow(clippy::too_many_arguments)]
fn apply_multi_row_group(
    into: &mut StarList,
    arena: &mut StarArena,
    group: &[StarId],
    criteria: &CriteriaList,
    thresh: f64,
    dec_window_deg: f64,
    overwrite_mask: &OverwriteMask,
    stats: &mut MergeStats,
) {
    for &incoming in group {
        let dec = arena.get(incoming).ra_dec().map(|(_, d)| d).unwrap_or(0.0);
        let candidates = into.candidates_near(dec, dec_window_deg);
        let info = match_one(arena, incoming, candidates.into_iter(), criteria, thresh);
        if !info.match_type.is_good() {
            continue;
        }
        let Some(target) = info.star else { continue };
        let mut src = arena.get(incoming).clone();
        src.clear_value(ids::TARGET_ID);
        src.clear_value(ids::JD_DATE);
        let mut counters = UpdateCounters::new();
        let changed = arena.get_mut(target).update(&src, overwrite_mask, &mut counters);
        let t = arena.get_mut(target);
        let flags = t.xm_all_flag() as u32 | info.match_type.as_flag();
        t.set_xm_all_flag(flags as i64);
        t.append_xm_log(&format!("multi-row match: {:?} d={:.3}as", info.match_type, info.dist_ang_as));
        stats.n_matched += 1;
        if changed {
            stats.n_updated += 1;
        }
    }
}

//fp apply_path_a_group
/// One targetId group's closest-ref merge: locate the nearby reference stars
/// in `into`, run [`match_closest_ref`] many-to-many, then apply every good
/// match per `match_mode`, recording xmatch metadata on the winning
/// reference star.
#[allow(clippy::too_many_arguments)]
fn apply_path_a_group(
    into: &mut StarList,
    arena: &mut StarArena,
    group: &[StarId],
    catalog_id: Origin,
    criteria: &CriteriaList,
    thresh: f64,
    dec_window_deg: f64,
    overwrite_mask: &OverwriteMask,
    mate_policy: MatePolicy,
    match_mode: MatchMode,
    precess_epoch: bool,
    single_epoch: bool,
    epoch: f64,
    clear_ref_coords: bool,
    stats: &mut MergeStats,
) {
    let mut group_list = StarList::new("xmatch-group", catalog_id);
    for &id in group {
        group_list.add_ref_at_tail(id);
    }

    // A precessing catalog is matched at its own median epoch, then restored
    // to its original coordinates before `Update` copies any other property.
    // The nearby-star search uses the post-precession position, since that
    // is the coordinate actually expected to land near the reference.
    let mut group_snapshots = Vec::new();
    if precess_epoch {
        for &id in group {
            group_snapshots.push((id, arena.get(id).snapshot_ra_dec()));
        }
        apply_precession(PrecessMode::List, &group_list, arena, epoch);
    }

    let Some(center_dec) = group.iter().find_map(|&id| arena.get(id).ra_dec()).map(|(_, d)| d) else {
        if precess_epoch {
            for (id, snap) in group_snapshots {
                arena.get_mut(id).restore_ra_dec(snap);
            }
        }
        return;
    };
    let nearby = into.candidates_near(center_dec, dec_window_deg);
    if nearby.is_empty() {
        if precess_epoch {
            for (id, snap) in group_snapshots {
                arena.get_mut(id).restore_ra_dec(snap);
            }
        }
        return;
    }

    let mut nearby_list = StarList::new("xmatch-nearby", into.catalog_id());
    for &id in &nearby {
        nearby_list.add_ref_at_tail(id);
    }

    let mut nearby_snapshots = Vec::new();
    if precess_epoch && !single_epoch {
        for &id in &nearby {
            nearby_snapshots.push((id, arena.get(id).snapshot_ra_dec()));
        }
        apply_precession(PrecessMode::Both, &nearby_list, arena, epoch);
    }

    let matches = match_closest_ref(arena, &group_list, &nearby_list, criteria, thresh, mate_policy);

    if precess_epoch {
        for (id, snap) in group_snapshots {
            arena.get_mut(id).restore_ra_dec(snap);
        }
        for (id, snap) in nearby_snapshots {
            arena.get_mut(id).restore_ra_dec(snap);
        }
    }

    let mut good: Vec<(StarId, StarId, MatchInfo)> = Vec::new();
    for &incoming in group {
        let Some(info) = matches.get(&incoming).cloned() else { continue };
        if info.match_type == crate::matcher::MatchType::BadBest {
            stats.n_bad_best += 1;
            continue;
        }
        if !info.match_type.is_good() {
            continue;
        }
        let Some(target) = info.star else { continue };
        good.push((incoming, target, info));
    }
    if good.is_empty() {
        return;
    }

    let distinct_targets: std::collections::HashSet<StarId> = good.iter().map(|(_, t, _)| *t).collect();
    let to_apply: Vec<(StarId, StarId, MatchInfo)> = if match_mode == MatchMode::All && distinct_targets.len() <= 1 {
        good
    } else {
        let best = good.into_iter().min_by(|a, b| a.2.score.partial_cmp(&b.2.score).unwrap()).unwrap();
        vec![best]
    };

    let n_mates = to_apply.len() as i64;
    for (incoming, target, info) in to_apply {
        let mut src = arena.get(incoming).clone();
        src.clear_value(ids::TARGET_ID);
        src.clear_value(ids::JD_DATE);

        if clear_ref_coords {
            arena.get_mut(target).clear_value(ids::RA);
            arena.get_mut(target).clear_value(ids::DEC);
        }

        let mut counters = UpdateCounters::new();
        let changed = arena.get_mut(target).update(&src, overwrite_mask, &mut counters);

        let t = arena.get_mut(target);
        t.set_group_size(t.group_size().max(n_mates));
        let flags = t.xm_all_flag() as u32 | info.match_type.as_flag();
        t.set_xm_all_flag(flags as i64);
        t.append_xm_log(&format!("{catalog_id}: {:?} d={:.3}as score={:.3}", info.match_type, info.dist_ang_as, info.score));

        stats.n_matched += 1;
        if changed {
            stats.n_updated += 1;
        }
    }
}

//! Thin CLI exerciser for the cross-match and merge engine: builds a small
//! scenario around a cone search, runs it against fixture and/or local
//! flat-file catalogs, and prints the merged result.

use std::collections::HashMap;

use clap::Command;

use vobs_xmatch::cmdline;
use vobs_xmatch::external::{CatalogClient, CatalogLoader, FakeCatalogClient, FlatFileCatalogLoader};
use vobs_xmatch::filter::{FilterPipeline, MagnitudeFilter};
use vobs_xmatch::property::ids;
use vobs_xmatch::{CancelToken, Entry, MergeAction, Origin, Scenario, StarArena};

fn default_fixture_client() -> FakeCatalogClient {
    FakeCatalogClient::new()
        .seed(Origin::Ascc, vec![(279.2347, 38.7836, 3.89), (310.3580, 45.2803, 2.48)])
        .seed(Origin::Tycho2, vec![(279.2347, 38.7836 + 0.2 / 3600.0, 3.9)])
        .seed(Origin::TwoMass, vec![(279.2347, 38.7836 + 0.5 / 3600.0, 1.5)])
}

/// Load a `--fixtures` file: a JSON object mapping catalog name to an array
/// of `[ra_deg, dec_deg, vmag]` rows, e.g. `{"ASCC": [[10.0, 20.0, 5.0]]}`.
fn fixture_client_from_file(path: &str) -> anyhow::Result<FakeCatalogClient> {
    let text = std::fs::read_to_string(path)?;
    let raw: HashMap<String, Vec<(f64, f64, f64)>> = serde_json::from_str(&text)?;
    let mut client = FakeCatalogClient::new();
    for (name, rows) in raw {
        let catalog = Origin::parse_catalog_name(&name).ok_or_else(|| anyhow::anyhow!("unknown catalog name {name:?} in fixtures file"))?;
        client = client.seed(catalog, rows);
    }
    Ok(client)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cmd = Command::new("calsearch").about("Calibrator-star cross-match and merge engine demo");
    let cmd = cmdline::add_right_ascension_arg(cmd);
    let cmd = cmdline::add_declination_arg(cmd);
    let cmd = cmdline::add_radius_arg(cmd);
    let cmd = cmdline::add_magnitude_arg(cmd);
    let cmd = cmdline::add_fixtures_arg(cmd);
    let cmd = cmdline::add_local_catalog_arg(cmd);
    let cmd = cmdline::add_output_arg(cmd);
    let matches = cmd.get_matches();

    let ra = cmdline::right_ascension(&matches);
    let dec = cmdline::declination(&matches);
    let radius = cmdline::radius(&matches);

    let mut arena = StarArena::new();

    let mut scenario = Scenario::new()
        .add_entry(Entry::new(Origin::Ascc, MergeAction::Copy))
        .add_entry(Entry::new(Origin::Tycho2, MergeAction::Merge))
        .add_entry(Entry::new(Origin::TwoMass, MergeAction::Merge));

    if let Some(limit) = cmdline::magnitude(&matches) {
        scenario = scenario.with_filters(FilterPipeline::new().then(MagnitudeFilter { limit }));
    }

    let mut base_client = match cmdline::fixtures(&matches) {
        Some(path) => fixture_client_from_file(&path)?,
        None => default_fixture_client(),
    };

    if let Some(path) = cmdline::local_catalog(&matches) {
        let loader = FlatFileCatalogLoader::new(path, Origin::Ascc);
        let local = loader.load(Origin::Ascc, &mut arena)?;
        let mut rows = Vec::new();
        for id in local.iter() {
            let star = arena.get(id);
            if let (Some((ra, dec)), Some(mag)) = (star.ra_dec(), star.get(ids::MAG_V).value().and_then(|v| v.as_f64())) {
                rows.push((ra, dec, mag));
            }
        }
        base_client = base_client.seed(Origin::Ascc, rows);
    }
    let client: Box<dyn CatalogClient> = Box::new(base_client);

    let cancel = CancelToken::new();
    let result = scenario.execute(client.as_ref(), &mut arena, ra, dec, radius, &cancel, |p| {
        log::info!("scenario entry {}/{} complete: {:?}", p.catalog_index + 1, p.catalog_count, p.stats);
    })?;

    let mut rows = Vec::new();
    for id in result.iter() {
        let star = arena.get(id);
        rows.push(serde_json::json!({
            "targetId": star.target_id(),
            "ra": star.ra_dec().map(|(ra, _)| ra),
            "dec": star.ra_dec().map(|(_, dec)| dec),
            "vmag": star.get(ids::MAG_V).value().and_then(|v| v.as_f64()),
            "groupSize": star.group_size(),
            "xmAllFlag": star.xm_all_flag(),
        }));
    }
    let json = serde_json::to_string_pretty(&rows)?;

    match cmdline::output(&matches) {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

//! Scenario execution against the in-memory fake catalog client.

use std::error::Error;

use vobs_xmatch::external::FakeCatalogClient;
use vobs_xmatch::filter::{FilterPipeline, MagnitudeFilter};
use vobs_xmatch::star::StarArena;
use vobs_xmatch::{CancelToken, Entry, MergeAction, Origin, Scenario};

#[test]
fn three_catalog_scenario_merges_into_one_star() -> Result<(), Box<dyn Error>> {
    let client = FakeCatalogClient::new()
        .seed(Origin::Ascc, vec![(279.2347, 38.7836, 3.89)])
        .seed(Origin::Tycho2, vec![(279.2347, 38.7836 + 0.2 / 3600.0, 3.9)])
        .seed(Origin::TwoMass, vec![(279.2347, 38.7836 + 0.4 / 3600.0, 1.5)]);

    let scenario = Scenario::new()
        .add_entry(Entry::new(Origin::Ascc, MergeAction::Copy))
        .add_entry(Entry::new(Origin::Tycho2, MergeAction::Merge))
        .add_entry(Entry::new(Origin::TwoMass, MergeAction::Merge));

    let mut arena = StarArena::new();
    let cancel = CancelToken::new();
    let mut entries_seen = 0;
    let result = scenario.execute(&client, &mut arena, 279.2347, 38.7836, 1.0, &cancel, |_| entries_seen += 1)?;

    assert_eq!(result.len(), 1);
    assert_eq!(entries_seen, 3);
    let id = result.get_star(0).unwrap();
    assert_eq!(arena.get(id).get(vobs_xmatch::property::ids::MAG_H).value().and_then(|v| v.as_f64()), None);
    Ok(())
}

#[test]
fn magnitude_filter_drops_faint_results_from_the_scenario() -> Result<(), Box<dyn Error>> {
    let client = FakeCatalogClient::new().seed(Origin::Ascc, vec![(10.0, 0.0, 3.0), (10.1, 0.0, 9.0)]);
    let scenario = Scenario::new()
        .add_entry(Entry::new(Origin::Ascc, MergeAction::Copy))
        .with_filters(FilterPipeline::new().then(MagnitudeFilter { limit: 6.0 }));

    let mut arena = StarArena::new();
    let cancel = CancelToken::new();
    let result = scenario.execute(&client, &mut arena, 10.05, 0.0, 1.0, &cancel, |_| {})?;
    assert_eq!(result.len(), 1);
    Ok(())
}

#[test]
fn missing_secondary_catalog_fixture_is_skipped_without_error() -> Result<(), Box<dyn Error>> {
    let client = FakeCatalogClient::new().seed(Origin::Ascc, vec![(10.0, 0.0, 3.0)]);
    let scenario = Scenario::new()
        .add_entry(Entry::new(Origin::Ascc, MergeAction::Copy))
        .add_entry(Entry::new(Origin::Wise, MergeAction::Merge));

    let mut arena = StarArena::new();
    let cancel = CancelToken::new();
    let result = scenario.execute(&client, &mut arena, 10.0, 0.0, 1.0, &cancel, |_| {})?;
    assert_eq!(result.len(), 1);
    Ok(())
}

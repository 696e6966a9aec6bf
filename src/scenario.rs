//! Scenario engine: an ordered list of catalog queries, each merged into a
//! shared working list as it completes.
//!
//! Grounded in `original_source/SearchCal/vobs/include/vobsSCENARIO.h`'s
//! `vobsSCENARIO::AddEntry`/`Execute` and catalog-specific criteria-list
//! construction.

use log::{debug, warn};

use crate::criteria::CriteriaList;
use crate::error::{Error, Result};
use crate::external::{criteria_for_catalog, CatalogClient};
use crate::filter::FilterPipeline;
use crate::merger::{merge, MergeStats};
use crate::star::StarArena;
use crate::star_list::StarList;
use crate::value::Origin;

//tp MergeAction
/// What a scenario entry does with its fetched stars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// Replace the working list outright (used for the seeding entry)
    Copy,
    /// Discard the fetch result entirely, keeping the working list as-is
    ClearMerge,
    /// Merge, but never add stars that fail to match (`update_only = true`)
    UpdateOnly,
    /// Merge, adding unmatched stars as new entries (`update_only = false`)
    Merge,
}

//tp Entry
/// One step of a [`Scenario`]: fetch a catalog, then merge it in
pub struct Entry {
    pub catalog: Origin,
    pub action: MergeAction,
    pub criteria: CriteriaList,
}

impl Entry {
    pub fn new(catalog: Origin, action: MergeAction) -> Self {
        Entry { catalog, action, criteria: criteria_for_catalog(catalog) }
    }

    pub fn with_criteria(mut self, criteria: CriteriaList) -> Self {
        self.criteria = criteria;
        self
    }
}

//tp Progress
/// Reported after each entry completes
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub catalog_index: usize,
    pub catalog_count: usize,
    pub stats: MergeStats,
}

//tp CancelToken
/// Cooperative cancellation, polled between scenario entries
#[derive(Debug, Clone, Default)]
pub struct CancelToken(std::rc::Rc<std::cell::Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

//tp Scenario
/// An ordered list of [`Entry`] executed against one [`CatalogClient`]
pub struct Scenario {
    entries: Vec<Entry>,
    filters: FilterPipeline,
}

impl Scenario {
    pub fn new() -> Self {
        Scenario { entries: Vec::new(), filters: FilterPipeline::new() }
    }

    pub fn add_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    //fp execute
    /// Run every entry in order against `client`, merging into one working
    /// list, and apply the filter pipeline to the result. A failure on the
    /// first (seeding) entry aborts the scenario; a failure on a later entry
    /// is logged and skipped, leaving the working list as it was.
    pub fn execute(
        &self,
        client: &dyn CatalogClient,
        arena: &mut StarArena,
        ra_deg: f64,
        dec_deg: f64,
        radius_deg: f64,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<StarList> {
        let mut working = StarList::new("result", Origin::None);
        let count = self.entries.len();
        for (index, entry) in self.entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let fetch_result = client.fetch(entry.catalog, ra_deg, dec_deg, radius_deg, arena);
            let mut fetched = match fetch_result {
                Ok(list) => list,
                Err(e) if index == 0 => return Err(e),
                Err(e) => {
                    warn!("scenario entry {} ({}) failed: {e}", index, entry.catalog);
                    continue;
                }
            };
            debug!("scenario entry {}/{}: {} fetched {} stars", index + 1, count, entry.catalog, fetched.len());

            let stats = match entry.action {
                MergeAction::Copy => {
                    let n = fetched.len();
                    working.copy_refs(&mut fetched, true);
                    MergeStats { n_added: n, ..Default::default() }
                }
                MergeAction::ClearMerge => MergeStats::default(),
                MergeAction::UpdateOnly => merge(&mut working, arena, &mut fetched, &entry.criteria, true)?,
                MergeAction::Merge => merge(&mut working, arena, &mut fetched, &entry.criteria, false)?,
            };
            on_progress(Progress { catalog_index: index, catalog_count: count, stats });
        }
        self.filters.apply(&mut working, arena);
        Ok(working)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::FakeCatalogClient;

    #[test]
    fn seed_then_merge_two_catalogs() {
        let mut arena = StarArena::new();
        let client = FakeCatalogClient::new()
            .seed(Origin::Ascc, vec![(10.0, 20.0, 5.0)])
            .seed(Origin::Tycho2, vec![(10.0, 20.0 + 0.3 / 3600.0, 5.0)]);
        let scenario = Scenario::new()
            .add_entry(Entry::new(Origin::Ascc, MergeAction::Copy))
            .add_entry(Entry::new(Origin::Tycho2, MergeAction::Merge));
        let cancel = CancelToken::new();
        let mut progresses = Vec::new();
        let result = scenario.execute(&client, &mut arena, 10.0, 20.0, 1.0, &cancel, |p| progresses.push(p)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(progresses.len(), 2);
    }

    #[test]
    fn cancellation_before_first_entry_aborts() {
        let mut arena = StarArena::new();
        let client = FakeCatalogClient::new();
        let scenario = Scenario::new().add_entry(Entry::new(Origin::Ascc, MergeAction::Copy));
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = scenario.execute(&client, &mut arena, 10.0, 20.0, 1.0, &cancel, |_| {});
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}

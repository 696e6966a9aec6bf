/*!
Calibrator-star cross-match and merge engine.

Fetches candidate calibrator stars from several astrometric/photometric
catalogs, cross-identifies them against a working list by angular distance
and (where applicable) magnitude, and merges matching rows into a single
property-bag [`Star`] per physical object. See `SPEC_FULL.md` for the full
component breakdown.
*/

pub mod catalog_meta;
pub mod cmdline;
pub mod criteria;
pub mod error;
pub mod external;
pub mod filter;
pub mod matcher;
pub mod merger;
pub mod property;
pub mod scenario;
pub mod star;
pub mod star_list;
pub mod units;
pub mod value;

pub use catalog_meta::{CatalogMeta, MatePolicy, MatchMode};
pub use criteria::{Criterion, CriteriaList};
pub use error::{Error, Result};
pub use matcher::{match_closest_ref, match_one, MatchInfo, MatchType};
pub use merger::{merge, MergeStats};
pub use property::{registry, MetaId, PropertyMeta, PropertyRegistry};
pub use scenario::{CancelToken, Entry, MergeAction, Progress, Scenario};
pub use star::{Property, Star, StarArena, StarId};
pub use star_list::StarList;
pub use value::{Confidence, Origin, PropertyValue};

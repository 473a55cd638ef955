/*!
Lookup of election candidates, constituencies and parties over a frozen data
snapshot.

The datasets are loaded once through a [DatasetCache], then every page is a
pure function of a dataset and a filter:

```no_run
use election_lookup::*;

# async fn run() -> Result<(), LoadError> {
let cache = LoaderConfig::Directory("public/data".into()).cache();
let candidates: Vec<FptpCandidate> = cache.load().await?;
let state = UrlFilterState::from_query("state=3&badges=educated,loyal");
let view = compute_filtered_view(&candidates, &state.fptp_filter());
println!("{} candidates", view.candidates.len());
# Ok(())
# }
```

See the [manual] for the data formats and the query parameters.
*/

mod badges;
mod cascade;
mod legacy;
mod loader;
pub mod manual;
mod metrics;
mod model;
mod pr;
mod selection;
mod url_state;
mod view;

pub use crate::badges::*;
pub use crate::cascade::{CascadeOptions, GeoFilter, GeoOption, Placed};
pub use crate::legacy::parse_results;
pub use crate::loader::*;
pub use crate::metrics::*;
pub use crate::model::*;
pub use crate::pr::{GroupOption, PartyOption, PrFilter};
pub use crate::selection::*;
pub use crate::url_state::*;
pub use crate::view::*;

/// The geographic cascade, exposed as functions over any [Placed] data.
pub mod geo {
    pub use crate::cascade::{
        apply, constituency_options, district_options, options, party_options, reconcile,
        state_options,
    };
}

/// The proportional list filter.
pub mod pr_list {
    pub use crate::pr::{apply, badge_options, group_options, party_options, reconcile};
}

use log::debug;
use serde::Serialize;

use crate::model::{FptpCandidate, PrCandidate};

/// An entity that can be selected through the `candidate` URL parameter.
pub trait Identified {
    fn entity_id(&self) -> u32;
}

impl Identified for FptpCandidate {
    fn entity_id(&self) -> u32 {
        self.candidate_id
    }
}

impl Identified for PrCandidate {
    fn entity_id(&self) -> u32 {
        self.serial_no
    }
}

/// The outcome of resolving the selected entity against a filtered set.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    None,
    /// The requested entity is in the filtered set (or the data is not loaded
    /// yet and the request is kept).
    Requested(u32),
    /// The filters narrowed the set down to this single entity.
    Auto(u32),
    /// The requested entity is not in the filtered set. The caller should
    /// drop it from the URL.
    Cleared(u32),
}

impl Selection {
    /// The selected id, 0 if nothing is selected.
    pub fn id(&self) -> u32 {
        match self {
            Selection::Requested(id) | Selection::Auto(id) => *id,
            Selection::None | Selection::Cleared(_) => 0,
        }
    }

    /// True if the URL no longer reflects the selection.
    pub fn needs_write(&self) -> bool {
        matches!(self, Selection::Auto(_) | Selection::Cleared(_))
    }
}

/// Resolves the selection.
///
/// * `requested` is the id from the URL, 0 for none.
/// * `filters_active` is true when at least one filter is set.
/// * `loaded` is false while the dataset is still loading. Nothing is cleared
///   or picked until then.
pub fn resolve_selection<T: Identified>(
    filtered: &[&T],
    requested: u32,
    filters_active: bool,
    loaded: bool,
) -> Selection {
    resolve(filtered, requested, filters_active, loaded, true)
}

fn resolve<T: Identified>(
    filtered: &[&T],
    requested: u32,
    filters_active: bool,
    loaded: bool,
    allow_auto: bool,
) -> Selection {
    if !loaded {
        return if requested == 0 {
            Selection::None
        } else {
            Selection::Requested(requested)
        };
    }
    if requested != 0 && filtered.iter().any(|e| e.entity_id() == requested) {
        return Selection::Requested(requested);
    }
    if allow_auto && filters_active && filtered.len() == 1 {
        let id = filtered[0].entity_id();
        debug!("resolve_selection: single match {}", id);
        return Selection::Auto(id);
    }
    if requested != 0 {
        debug!("resolve_selection: {} is not in the filtered set", requested);
        Selection::Cleared(requested)
    } else {
        Selection::None
    }
}

/// Keeps the selection state of one page across filter changes.
///
/// After [SelectionResolver::dismiss], the single remaining entity is not
/// selected again until the filter changes.
#[derive(Debug, Clone)]
pub struct SelectionResolver<F> {
    last_filter: Option<F>,
    dismissed: bool,
}

impl<F> Default for SelectionResolver<F> {
    fn default() -> Self {
        SelectionResolver {
            last_filter: None,
            dismissed: false,
        }
    }
}

impl<F: PartialEq + Clone> SelectionResolver<F> {
    pub fn new() -> SelectionResolver<F> {
        SelectionResolver::default()
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn resolve<T: Identified>(
        &mut self,
        filter: &F,
        filtered: &[&T],
        requested: u32,
        filters_active: bool,
        loaded: bool,
    ) -> Selection {
        if self.last_filter.as_ref() != Some(filter) {
            self.last_filter = Some(filter.clone());
            self.dismissed = false;
        }
        resolve(filtered, requested, filters_active, loaded, !self.dismissed)
    }
}

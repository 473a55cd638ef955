// ********* Filtered views *********
//
// Each view is a pure function of a dataset and a filter: reconcile the
// filter, compute the options, filter, then resolve the selection.

use serde::{Deserialize, Serialize};

use crate::badges::{available_badges, canonicalize_tags, matches_all};
use crate::cascade::{self, CascadeOptions, GeoFilter};
use crate::metrics::ElectionComparison;
use crate::model::{Constituency, FptpCandidate, PrCandidate};
use crate::pr::{self, GroupOption, PartyOption, PrFilter};
use crate::selection::{resolve_selection, Selection};

/// The filter of the FPTP candidate list.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateFilter {
    #[serde(flatten)]
    pub geo: GeoFilter,
    pub badges: Vec<String>,
    pub candidate: u32,
}

impl CandidateFilter {
    pub fn is_active(&self) -> bool {
        !self.geo.is_empty() || !self.badges.is_empty()
    }

    pub fn select_state(&mut self, state: u32) {
        self.geo.select_state(state);
        self.candidate = 0;
    }

    pub fn select_district(&mut self, district: u32) {
        self.geo.select_district(district);
        self.candidate = 0;
    }

    pub fn select_constituency(&mut self, constituency: u32) {
        self.geo.select_constituency(constituency);
        self.candidate = 0;
    }

    pub fn select_party(&mut self, party: &str) {
        self.geo.select_party(party);
        self.candidate = 0;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateView<'a> {
    pub filter: CandidateFilter,
    pub options: CascadeOptions,
    pub available_badges: Vec<&'static str>,
    pub candidates: Vec<&'a FptpCandidate>,
    pub selection: Selection,
    pub selected: Option<&'a FptpCandidate>,
}

pub fn compute_filtered_view<'a>(
    candidates: &'a [FptpCandidate],
    filter: &CandidateFilter,
) -> CandidateView<'a> {
    let geo = cascade::reconcile(candidates, &filter.geo);
    let badges = canonicalize_tags(&filter.badges);
    let options = cascade::options(candidates, &geo);
    let upstream = cascade::apply(candidates, &geo);
    let available = available_badges(upstream.iter().copied());
    let results: Vec<&FptpCandidate> = upstream
        .into_iter()
        .filter(|c| matches_all(&badges, &c.tags))
        .collect();

    let mut f = CandidateFilter {
        geo,
        badges,
        candidate: filter.candidate,
    };
    let selection = resolve_selection(&results, f.candidate, f.is_active(), true);
    f.candidate = selection.id();
    let selected = results
        .iter()
        .copied()
        .find(|c| c.candidate_id == f.candidate);

    CandidateView {
        filter: f,
        options,
        available_badges: available,
        candidates: results,
        selection,
        selected,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstituencyView<'a> {
    pub filter: GeoFilter,
    pub options: CascadeOptions,
    pub constituencies: Vec<&'a Constituency>,
    /// Set when the filter narrows the list down to one constituency.
    pub selected: Option<&'a Constituency>,
    pub comparison: Option<ElectionComparison>,
}

pub fn compute_constituency_view<'a>(
    constituencies: &'a [Constituency],
    filter: &GeoFilter,
) -> ConstituencyView<'a> {
    let geo = cascade::reconcile(constituencies, filter);
    let options = cascade::options(constituencies, &geo);
    let results = cascade::apply(constituencies, &geo);
    let selected = if !geo.is_empty() && results.len() == 1 {
        Some(results[0])
    } else {
        None
    };
    ConstituencyView {
        comparison: selected.map(ElectionComparison::new),
        filter: geo,
        options,
        constituencies: results,
        selected,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrView<'a> {
    pub filter: PrFilter,
    pub parties: Vec<PartyOption>,
    pub groups: Vec<GroupOption>,
    pub available_badges: Vec<&'static str>,
    pub candidates: Vec<&'a PrCandidate>,
    pub selection: Selection,
    pub selected: Option<&'a PrCandidate>,
}

pub fn compute_pr_view<'a>(candidates: &'a [PrCandidate], filter: &PrFilter) -> PrView<'a> {
    let mut f = pr::reconcile(candidates, filter);
    f.badges = canonicalize_tags(&f.badges);
    let results = pr::apply(candidates, &f);
    // Only a party or a group narrows the list enough to auto-select; badges
    // alone do not.
    let narrowed = !f.party.is_empty() || !f.group.is_empty();
    let selection = resolve_selection(&results, f.candidate, narrowed, true);
    f.candidate = selection.id();
    let selected = results.iter().copied().find(|c| c.serial_no == f.candidate);
    PrView {
        parties: pr::party_options(candidates),
        groups: pr::group_options(candidates, &f),
        available_badges: pr::badge_options(candidates, &f),
        candidates: results,
        selection,
        selected,
        filter: f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{constituency, fptp, pr};

    const KOSHI: (u32, &str) = (1, "कोशी");
    const BAGMATI: (u32, &str) = (3, "बागमती");
    const JHAPA: (u32, &str) = (4, "झापा");
    const KATHMANDU: (u32, &str) = (27, "काठमाडौं");

    fn candidates() -> Vec<FptpCandidate> {
        vec![
            fptp(1, KOSHI, JHAPA, 1, "A", &["educated"]),
            fptp(2, KOSHI, JHAPA, 1, "B", &["educated", "loyal"]),
            fptp(3, KOSHI, JHAPA, 2, "A", &["loyal"]),
            fptp(4, BAGMATI, KATHMANDU, 1, "A", &["educated", "loyal", "nepo"]),
            fptp(5, BAGMATI, KATHMANDU, 2, "C", &[]),
        ]
    }

    fn ids(v: &CandidateView) -> Vec<u32> {
        v.candidates.iter().map(|c| c.candidate_id).collect()
    }

    #[test]
    fn badge_conjunction() {
        let cs = candidates();
        let f = CandidateFilter {
            badges: vec!["educated".to_string(), "loyal".to_string()],
            ..Default::default()
        };
        let v = compute_filtered_view(&cs, &f);
        assert_eq!(ids(&v), vec![2, 4]);
        assert_eq!(v.selection, Selection::None);
        assert_eq!(v.available_badges, vec!["educated", "loyal", "nepo"]);
    }

    #[test]
    fn badges_offered_within_geography() {
        let cs = candidates();
        let f = CandidateFilter {
            geo: GeoFilter {
                state: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let v = compute_filtered_view(&cs, &f);
        assert_eq!(v.filter.geo.district, 4);
        assert_eq!(v.available_badges, vec!["educated", "loyal"]);
        assert_eq!(ids(&v), vec![1, 2, 3]);
    }

    #[test]
    fn legacy_badge_in_filter() {
        let cs = candidates();
        let f = CandidateFilter {
            badges: vec!["नातावाद".to_string()],
            ..Default::default()
        };
        let v = compute_filtered_view(&cs, &f);
        assert_eq!(v.filter.badges, vec!["nepo".to_string()]);
        assert_eq!(v.selection, Selection::Auto(4));
        assert_eq!(v.selected.map(|c| c.candidate_id), Some(4));
    }

    #[test]
    fn url_candidate_outside_the_set_is_dropped() {
        let cs = candidates();
        let f = CandidateFilter {
            geo: GeoFilter {
                state: 3,
                ..Default::default()
            },
            candidate: 1,
            ..Default::default()
        };
        let v = compute_filtered_view(&cs, &f);
        assert_eq!(v.selection, Selection::Cleared(1));
        assert_eq!(v.filter.candidate, 0);
        assert!(v.selected.is_none());

        let f = CandidateFilter {
            candidate: 5,
            ..f
        };
        let v = compute_filtered_view(&cs, &f);
        assert_eq!(v.selected.map(|c| c.candidate_id), Some(5));
    }

    #[test]
    fn filter_edits_clear_the_candidate() {
        let mut f = CandidateFilter {
            geo: GeoFilter {
                state: 1,
                district: 4,
                constituency: 1,
                party: String::new(),
            },
            badges: vec![],
            candidate: 2,
        };
        f.select_party("A");
        assert_eq!(f.candidate, 0);
        f.candidate = 1;
        f.select_state(3);
        assert_eq!((f.geo.district, f.geo.constituency, f.candidate), (0, 0, 0));
    }

    #[test]
    fn constituency_view_selects_single_seat() {
        let cs = vec![
            constituency(KOSHI, JHAPA, 1),
            constituency(KOSHI, JHAPA, 2),
            constituency(BAGMATI, KATHMANDU, 1),
        ];
        let v = compute_constituency_view(&cs, &GeoFilter::default());
        assert_eq!(v.constituencies.len(), 3);
        assert!(v.selected.is_none());

        let f = GeoFilter {
            state: 1,
            district: 4,
            constituency: 2,
            party: String::new(),
        };
        let v = compute_constituency_view(&cs, &f);
        assert_eq!(v.selected.map(|c| c.constituency_id), Some(2));
        assert!(v.comparison.is_some());

        // Bagmati has a single seat in this data: it is picked.
        let f = GeoFilter {
            state: 3,
            ..Default::default()
        };
        let v = compute_constituency_view(&cs, &f);
        assert_eq!((v.filter.district, v.filter.constituency), (27, 1));
        assert!(v.selected.is_some());
    }

    #[test]
    fn pr_view() {
        let cs = vec![
            pr(1, (7, "Beta"), Some(2), 1, Some((1, "खस आर्य")), &["top-rank"]),
            pr(2, (5, "Alpha"), Some(1), 1, Some((3, "मधेशी")), &["women"]),
            pr(3, (5, "Alpha"), Some(1), 2, Some((1, "खस आर्य")), &["women"]),
        ];
        let f = PrFilter {
            party: "Alpha".to_string(),
            badges: vec!["महिला".to_string()],
            ..Default::default()
        };
        let v = compute_pr_view(&cs, &f);
        let serials: Vec<u32> = v.candidates.iter().map(|c| c.serial_no).collect();
        assert_eq!(serials, vec![2, 3]);
        assert_eq!(v.filter.badges, vec!["women".to_string()]);
        assert_eq!(v.groups.len(), 2);
        assert_eq!(v.parties[0].name, "Alpha");

        let f = PrFilter {
            group: "3".to_string(),
            ..f
        };
        let v = compute_pr_view(&cs, &f);
        assert_eq!(v.selection, Selection::Auto(2));

        let f = PrFilter {
            badges: vec!["top-rank".to_string()],
            ..Default::default()
        };
        let v = compute_pr_view(&cs, &f);
        assert_eq!(v.candidates.len(), 1);
        assert_eq!(v.selection, Selection::None);
    }
}

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Constituency, FptpCandidate};

/// Anything located in the state > district > constituency hierarchy.
///
/// `party` is `None` for entities without a party level (constituencies).
pub trait Placed {
    fn state(&self) -> (u32, &str);
    fn district(&self) -> (u32, &str);
    fn constituency(&self) -> u32;
    fn party(&self) -> Option<&str> {
        None
    }
}

impl Placed for FptpCandidate {
    fn state(&self) -> (u32, &str) {
        (self.state_id, &self.state_name)
    }
    fn district(&self) -> (u32, &str) {
        (self.district_id, &self.district_name)
    }
    fn constituency(&self) -> u32 {
        self.constituency_id
    }
    fn party(&self) -> Option<&str> {
        Some(&self.political_party_name)
    }
}

impl Placed for Constituency {
    fn state(&self) -> (u32, &str) {
        (self.state_id, &self.state_name)
    }
    fn district(&self) -> (u32, &str) {
        (self.district_id, &self.district_name)
    }
    fn constituency(&self) -> u32 {
        self.constituency_id
    }
}

/// The geographic filter. `0` and `""` mean unset.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoFilter {
    pub state: u32,
    pub district: u32,
    pub constituency: u32,
    pub party: String,
}

impl GeoFilter {
    pub fn is_empty(&self) -> bool {
        self.state == 0 && self.district == 0 && self.constituency == 0 && self.party.is_empty()
    }

    /// True if the entity satisfies every set field.
    pub fn matches<P: Placed>(&self, e: &P) -> bool {
        self.matches_geo(e)
            && (self.party.is_empty() || e.party().map(|p| p == self.party).unwrap_or(true))
    }

    fn matches_geo<P: Placed>(&self, e: &P) -> bool {
        (self.state == 0 || e.state().0 == self.state)
            && (self.district == 0 || e.district().0 == self.district)
            && (self.constituency == 0 || e.constituency() == self.constituency)
    }

    // The cascade reset: a change at one geographic level clears every level
    // below it, the party included.

    pub fn select_state(&mut self, state: u32) {
        if self.state != state {
            self.state = state;
            self.district = 0;
            self.constituency = 0;
            self.party.clear();
        }
    }

    pub fn select_district(&mut self, district: u32) {
        if self.district != district {
            self.district = district;
            self.constituency = 0;
            self.party.clear();
        }
    }

    pub fn select_constituency(&mut self, constituency: u32) {
        if self.constituency != constituency {
            self.constituency = constituency;
            self.party.clear();
        }
    }

    pub fn select_party(&mut self, party: &str) {
        self.party = party.to_string();
    }
}

/// One entry of a select box.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct GeoOption {
    pub id: u32,
    pub name: String,
}

/// The options offered at every level, given the current filter.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
pub struct CascadeOptions {
    pub states: Vec<GeoOption>,
    pub districts: Vec<GeoOption>,
    pub constituencies: Vec<u32>,
    pub parties: Vec<String>,
}

fn sorted_by_name(m: BTreeMap<u32, String>) -> Vec<GeoOption> {
    let mut res: Vec<GeoOption> = m
        .into_iter()
        .map(|(id, name)| GeoOption { id, name })
        .collect();
    res.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    res
}

pub fn state_options<P: Placed>(entities: &[P]) -> Vec<GeoOption> {
    let m: BTreeMap<u32, String> = entities
        .iter()
        .map(|e| (e.state().0, e.state().1.to_string()))
        .collect();
    sorted_by_name(m)
}

/// Districts of the chosen state. Empty while no state is chosen.
pub fn district_options<P: Placed>(entities: &[P], state: u32) -> Vec<GeoOption> {
    if state == 0 {
        return Vec::new();
    }
    let m: BTreeMap<u32, String> = entities
        .iter()
        .filter(|e| e.state().0 == state)
        .map(|e| (e.district().0, e.district().1.to_string()))
        .collect();
    sorted_by_name(m)
}

/// Constituency numbers of the chosen district. Empty while no district is
/// chosen.
pub fn constituency_options<P: Placed>(entities: &[P], state: u32, district: u32) -> Vec<u32> {
    if district == 0 {
        return Vec::new();
    }
    let s: BTreeSet<u32> = entities
        .iter()
        .filter(|e| (state == 0 || e.state().0 == state) && e.district().0 == district)
        .map(|e| e.constituency())
        .collect();
    s.into_iter().collect()
}

/// Parties present within the chosen geography.
pub fn party_options<P: Placed>(entities: &[P], filter: &GeoFilter) -> Vec<String> {
    let s: BTreeSet<&str> = entities
        .iter()
        .filter(|e| filter.matches_geo(*e))
        .filter_map(|e| e.party())
        .filter(|p| !p.is_empty())
        .collect();
    s.into_iter().map(|p| p.to_string()).collect()
}

pub fn options<P: Placed>(entities: &[P], filter: &GeoFilter) -> CascadeOptions {
    CascadeOptions {
        states: state_options(entities),
        districts: district_options(entities, filter.state),
        constituencies: constituency_options(entities, filter.state, filter.district),
        parties: party_options(entities, filter),
    }
}

/// Brings a filter back in line with the data.
///
/// Levels are visited top-down, once. A value that is no longer offered is
/// cleared along with every level below it. An unset district or
/// constituency whose parent is set and which has a single option gets that
/// option. Running it twice gives the same result as running it once.
pub fn reconcile<P: Placed>(entities: &[P], filter: &GeoFilter) -> GeoFilter {
    let mut f = filter.clone();

    if f.state != 0 && !state_options(entities).iter().any(|o| o.id == f.state) {
        debug!("reconcile: clearing unknown state {}", f.state);
        f.state = 0;
        f.district = 0;
        f.constituency = 0;
    }

    let districts = district_options(entities, f.state);
    if f.district != 0 && !districts.iter().any(|o| o.id == f.district) {
        debug!("reconcile: clearing district {}", f.district);
        f.district = 0;
        f.constituency = 0;
    }
    if f.district == 0 && f.state != 0 && districts.len() == 1 {
        debug!("reconcile: single district {} for state {}", districts[0].id, f.state);
        f.district = districts[0].id;
    }

    let constituencies = constituency_options(entities, f.state, f.district);
    if f.constituency != 0 && !constituencies.contains(&f.constituency) {
        debug!("reconcile: clearing constituency {}", f.constituency);
        f.constituency = 0;
    }
    if f.constituency == 0 && f.district != 0 && constituencies.len() == 1 {
        f.constituency = constituencies[0];
    }

    let has_parties = entities.iter().any(|e| e.party().is_some());
    if !f.party.is_empty() && has_parties && !party_options(entities, &f).contains(&f.party) {
        debug!("reconcile: clearing party {:?}", f.party);
        f.party.clear();
    }
    f
}

/// Every entity satisfying every set field of the filter, in input order.
pub fn apply<'a, P: Placed>(entities: &'a [P], filter: &GeoFilter) -> Vec<&'a P> {
    entities.iter().filter(|e| filter.matches(*e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{constituency, fptp};

    const KOSHI: (u32, &str) = (1, "कोशी");
    const MADHESH: (u32, &str) = (2, "मधेश");
    const JHAPA: (u32, &str) = (4, "झापा");
    const ILAM: (u32, &str) = (3, "इलाम");
    const SAPTARI: (u32, &str) = (15, "सप्तरी");

    fn candidates() -> Vec<FptpCandidate> {
        vec![
            fptp(1, KOSHI, JHAPA, 1, "A", &[]),
            fptp(2, KOSHI, JHAPA, 2, "B", &[]),
            fptp(3, KOSHI, JHAPA, 2, "A", &[]),
            fptp(4, KOSHI, ILAM, 1, "C", &[]),
            fptp(5, MADHESH, SAPTARI, 3, "B", &[]),
        ]
    }

    #[test]
    fn options_follow_the_hierarchy() {
        let cs = candidates();
        let opts = options(&cs, &GeoFilter::default());
        assert_eq!(opts.states.len(), 2);
        assert!(opts.districts.is_empty());
        assert!(opts.constituencies.is_empty());
        assert_eq!(opts.parties, vec!["A", "B", "C"]);

        let f = GeoFilter {
            state: 1,
            ..Default::default()
        };
        let opts = options(&cs, &f);
        let names: Vec<&str> = opts.districts.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["इलाम", "झापा"]);
        assert_eq!(opts.parties, vec!["A", "B", "C"]);

        let f = GeoFilter {
            state: 1,
            district: 4,
            ..Default::default()
        };
        let opts = options(&cs, &f);
        assert_eq!(opts.constituencies, vec![1, 2]);
        assert_eq!(opts.parties, vec!["A", "B"]);
    }

    #[test]
    fn result_is_the_conjunction() {
        let cs = candidates();
        let f = GeoFilter {
            state: 1,
            district: 4,
            constituency: 2,
            party: "A".to_string(),
        };
        let ids: Vec<u32> = apply(&cs, &f).iter().map(|c| c.candidate_id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(apply(&cs, &GeoFilter::default()).len(), 5);
    }

    #[test]
    fn higher_level_change_resets_lower_levels() {
        let mut f = GeoFilter {
            state: 1,
            district: 4,
            constituency: 2,
            party: "A".to_string(),
        };
        f.select_district(3);
        assert_eq!((f.state, f.district, f.constituency), (1, 3, 0));
        assert_eq!(f.party, "");

        f.constituency = 1;
        f.party = "A".to_string();
        f.select_state(2);
        assert_eq!((f.state, f.district, f.constituency), (2, 0, 0));
        assert_eq!(f.party, "");

        f.party = "B".to_string();
        f.select_constituency(1);
        assert_eq!(f.constituency, 1);
        assert_eq!(f.party, "");

        // Re-selecting the same value keeps the deeper levels.
        f.district = 15;
        f.party = "B".to_string();
        f.select_state(2);
        f.select_constituency(1);
        assert_eq!(f.district, 15);
        assert_eq!(f.party, "B");
    }

    #[test]
    fn reconcile_auto_picks_single_options() {
        let cs = candidates();
        let f = GeoFilter {
            state: 2,
            ..Default::default()
        };
        let r = reconcile(&cs, &f);
        assert_eq!((r.state, r.district, r.constituency), (2, 15, 3));
        assert_eq!(reconcile(&cs, &r), r);

        // Two districts in Koshi: nothing is picked.
        let f = GeoFilter {
            state: 1,
            ..Default::default()
        };
        assert_eq!(reconcile(&cs, &f), f);

        // Ilam has a single constituency.
        let f = GeoFilter {
            state: 1,
            district: 3,
            ..Default::default()
        };
        assert_eq!(reconcile(&cs, &f).constituency, 1);
    }

    #[test]
    fn reconcile_clears_stale_values() {
        let cs = candidates();
        let f = GeoFilter {
            state: 9,
            district: 4,
            constituency: 2,
            party: String::new(),
        };
        assert_eq!(reconcile(&cs, &f), GeoFilter::default());

        let f = GeoFilter {
            state: 1,
            district: 15,
            constituency: 3,
            party: "C".to_string(),
        };
        let r = reconcile(&cs, &f);
        assert_eq!((r.state, r.district, r.constituency), (1, 0, 0));
        assert_eq!(r.party, "C");

        let f = GeoFilter {
            state: 1,
            district: 4,
            constituency: 1,
            party: "C".to_string(),
        };
        assert_eq!(reconcile(&cs, &f).party, "");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let cs = candidates();
        for state in [0, 1, 2, 7] {
            for district in [0, 3, 4, 15] {
                for constituency in [0, 1, 2, 3] {
                    for party in ["", "A", "B", "C"] {
                        let f = GeoFilter {
                            state,
                            district,
                            constituency,
                            party: party.to_string(),
                        };
                        let once = reconcile(&cs, &f);
                        assert_eq!(reconcile(&cs, &once), once, "{:?}", f);
                    }
                }
            }
        }
    }

    #[test]
    fn constituencies_ignore_party() {
        let cs = vec![
            constituency(KOSHI, JHAPA, 1),
            constituency(KOSHI, JHAPA, 2),
            constituency(MADHESH, SAPTARI, 3),
        ];
        let f = GeoFilter {
            state: 1,
            party: "A".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&cs, &f).len(), 2);
        assert!(party_options(&cs, &f).is_empty());
        let r = reconcile(&cs, &f);
        assert_eq!(r.district, 4);
        assert_eq!(r.constituency, 0);
        assert_eq!(r.party, "A");
    }
}

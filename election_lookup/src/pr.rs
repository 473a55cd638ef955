//! Filtering of the proportional representation lists.
//!
//! The lists are filtered by party, then by inclusive group, then by badges.
//! A party or a group can be referred to by its numeric id or by its name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::badges::{available_badges, matches_all};
use crate::model::PrCandidate;

const UNORDERED: u32 = 9999;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrFilter {
    pub party: String,
    pub group: String,
    pub badges: Vec<String>,
    pub candidate: u32,
}

fn matches_key(key: &str, id: Option<u32>, name: Option<&str>) -> bool {
    key.is_empty()
        || id.map(|i| i.to_string() == key).unwrap_or(false)
        || name.map(|n| n == key).unwrap_or(false)
}

impl PrFilter {
    pub fn is_empty(&self) -> bool {
        self.party.is_empty() && self.group.is_empty() && self.badges.is_empty()
    }

    pub fn matches_party(&self, c: &PrCandidate) -> bool {
        matches_key(&self.party, c.party_id, Some(&c.political_party_name))
    }

    pub fn matches_group(&self, c: &PrCandidate) -> bool {
        matches_key(&self.group, c.inclusive_group_id, c.inclusive_group.as_deref())
    }

    pub fn matches(&self, c: &PrCandidate) -> bool {
        self.matches_party(c) && self.matches_group(c) && matches_all(&self.badges, &c.tags)
    }

    /// Changing the party invalidates the group and the candidate.
    pub fn select_party(&mut self, party: &str) {
        if self.party != party {
            self.party = party.to_string();
            self.group.clear();
            self.candidate = 0;
        }
    }

    pub fn select_group(&mut self, group: &str) {
        if self.group != group {
            self.group = group.to_string();
            self.candidate = 0;
        }
    }

    pub fn select_badges(&mut self, badges: Vec<String>) {
        self.badges = badges;
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct PartyOption {
    /// The value to put in [PrFilter::party].
    pub key: String,
    pub name: String,
    pub display_order: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct GroupOption {
    pub key: String,
    pub name: String,
}

/// One option per party, in display order, then by name. Parties without a
/// display order come last.
pub fn party_options(candidates: &[PrCandidate]) -> Vec<PartyOption> {
    let mut by_key: BTreeMap<String, PartyOption> = BTreeMap::new();
    for c in candidates {
        let key = c
            .party_id
            .map(|i| i.to_string())
            .unwrap_or_else(|| c.political_party_name.clone());
        let entry = by_key.entry(key.clone()).or_insert_with(|| PartyOption {
            key,
            name: c.political_party_name.clone(),
            display_order: None,
        });
        entry.display_order = match (entry.display_order, c.party_display_order) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
    let mut res: Vec<PartyOption> = by_key.into_values().collect();
    res.sort_by(|a, b| {
        a.display_order
            .unwrap_or(UNORDERED)
            .cmp(&b.display_order.unwrap_or(UNORDERED))
            .then_with(|| a.name.cmp(&b.name))
    });
    res
}

/// Inclusive groups within the chosen party, sorted by name.
pub fn group_options(candidates: &[PrCandidate], filter: &PrFilter) -> Vec<GroupOption> {
    let mut by_name: BTreeMap<String, GroupOption> = BTreeMap::new();
    for c in candidates.iter().filter(|c| filter.matches_party(c)) {
        let name = match c.inclusive_group.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        by_name.entry(name.to_string()).or_insert_with(|| GroupOption {
            key: c
                .inclusive_group_id
                .map(|i| i.to_string())
                .unwrap_or_else(|| name.to_string()),
            name: name.to_string(),
        });
    }
    by_name.into_values().collect()
}

/// Badges present after the party and group filters.
pub fn badge_options(candidates: &[PrCandidate], filter: &PrFilter) -> Vec<&'static str> {
    available_badges(
        candidates
            .iter()
            .filter(|c| filter.matches_party(c) && filter.matches_group(c)),
    )
}

/// The matching candidates, ordered by party display order, then list rank.
pub fn apply<'a>(candidates: &'a [PrCandidate], filter: &PrFilter) -> Vec<&'a PrCandidate> {
    let mut res: Vec<&PrCandidate> = candidates.iter().filter(|c| filter.matches(c)).collect();
    res.sort_by_key(|c| (c.party_display_order.unwrap_or(UNORDERED), c.rank_position));
    res
}

/// Drops a party or a group that the data does not offer.
pub fn reconcile(candidates: &[PrCandidate], filter: &PrFilter) -> PrFilter {
    let mut f = filter.clone();
    if !f.party.is_empty() && !candidates.iter().any(|c| f.matches_party(c)) {
        f.select_party("");
    }
    let known_group = group_options(candidates, &f)
        .iter()
        .any(|g| g.key == f.group || g.name == f.group);
    if !f.group.is_empty() && !known_group {
        f.select_group("");
    }
    f
}

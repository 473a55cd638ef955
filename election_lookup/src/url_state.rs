//! Filter state carried in the query string.
//!
//! Numbers are written in decimal, lists as comma separated, individually
//! percent-encoded elements. Unset values (0, empty string, empty list) are
//! left out of the query string. Reading never fails: a missing or malformed
//! value reads as unset.

use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Display;

use crate::badges::canonicalize_tags;
use crate::cascade::GeoFilter;
use crate::model::Constituency;
use crate::pr::PrFilter;
use crate::view::CandidateFilter;

fn decode(raw: &str) -> String {
    decode_component(&raw.replace('+', " "))
}

// Percent-decoding alone, for list elements that were encoded twice.
fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(s) => s.into_owned(),
        Err(e) => {
            debug!("decode: keeping undecodable value {:?}: {}", raw, e);
            raw.to_string()
        }
    }
}

fn encode(s: &str) -> Cow<str> {
    urlencoding::encode(s)
}

/// The parameters of a query string, in order.
///
/// Values are stored as they appear in the query string (still encoded), so
/// that parameters owned by nobody are written back untouched.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> QueryParams {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|seg| !seg.is_empty())
            .map(|seg| match seg.split_once('=') {
                Some((k, v)) => (decode(k), v.to_string()),
                None => (decode(seg), String::new()),
            })
            .collect();
        QueryParams { pairs }
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set_raw(&mut self, key: &str, value: Option<String>) {
        match value {
            None => self.pairs.retain(|(k, _)| k != key),
            Some(v) => {
                let mut found = false;
                self.pairs.retain_mut(|(k, old)| {
                    if k.as_str() != key {
                        true
                    } else if !found {
                        found = true;
                        *old = v.clone();
                        true
                    } else {
                        false
                    }
                });
                if !found {
                    self.pairs.push((key.to_string(), v));
                }
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.set_raw(key, None);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get_string(&self, key: &str) -> String {
        self.raw(key).map(decode).unwrap_or_default()
    }

    pub fn get_u32(&self, key: &str) -> u32 {
        let s = self.get_string(key);
        match s.trim().parse::<u32>() {
            Ok(x) => x,
            Err(_) => {
                if !s.is_empty() {
                    debug!("get_u32: ignoring malformed {}={:?}", key, s);
                }
                0
            }
        }
    }

    /// Reads both list forms. With literal commas, as written by
    /// [QueryParams::set_list], every element is decoded on its own. Without
    /// them the list was encoded as a whole (`a%2Cb`, elements encoded twice):
    /// the value is decoded, split on commas, and every element decoded again.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let raw = match self.raw(key) {
            None => return Vec::new(),
            Some(raw) => raw,
        };
        let elements: Vec<String> = if raw.contains(',') {
            raw.split(',').map(decode).collect()
        } else {
            decode(raw).split(',').map(decode_component).collect()
        };
        elements.into_iter().filter(|s| !s.is_empty()).collect()
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        let v = if value.is_empty() {
            None
        } else {
            Some(encode(value).into_owned())
        };
        self.set_raw(key, v);
    }

    pub fn set_u32(&mut self, key: &str, value: u32) {
        let v = if value == 0 {
            None
        } else {
            Some(value.to_string())
        };
        self.set_raw(key, v);
    }

    pub fn set_list(&mut self, key: &str, values: &[String]) {
        let v = if values.is_empty() {
            None
        } else {
            let encoded: Vec<Cow<str>> = values.iter().map(|s| encode(s)).collect();
            Some(encoded.join(","))
        };
        self.set_raw(key, v);
    }
}

impl Display for QueryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{}={}", encode(k), v)?;
        }
        Ok(())
    }
}

/// A page state stored in the query string.
pub trait UrlState: Default {
    /// The parameters owned by this state.
    const KEYS: &'static [&'static str];

    fn read(params: &QueryParams) -> Self;

    fn write(&self, params: &mut QueryParams);

    fn from_query(query: &str) -> Self {
        Self::read(&QueryParams::parse(query))
    }

    /// The query string of `base` updated with this state.
    fn to_query(&self, base: &QueryParams) -> String {
        let mut p = base.clone();
        self.write(&mut p);
        p.to_string()
    }

    /// Removes every owned parameter.
    fn reset(params: &mut QueryParams) {
        for k in Self::KEYS {
            params.remove(k);
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Fptp,
    Pr,
}

/// The state of the main candidate page, shared by both tabs.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlFilterState {
    pub tab: Tab,
    pub state: u32,
    pub district: u32,
    pub constituency: u32,
    pub party: String,
    pub badges: Vec<String>,
    pub candidate: u32,
    pub group: String,
}

impl UrlFilterState {
    pub fn fptp_filter(&self) -> CandidateFilter {
        CandidateFilter {
            geo: GeoFilter {
                state: self.state,
                district: self.district,
                constituency: self.constituency,
                party: self.party.clone(),
            },
            badges: self.badges.clone(),
            candidate: self.candidate,
        }
    }

    pub fn pr_filter(&self) -> PrFilter {
        PrFilter {
            party: self.party.clone(),
            group: self.group.clone(),
            badges: self.badges.clone(),
            candidate: self.candidate,
        }
    }

    pub fn set_fptp_filter(&mut self, f: &CandidateFilter) {
        self.state = f.geo.state;
        self.district = f.geo.district;
        self.constituency = f.geo.constituency;
        self.party = f.geo.party.clone();
        self.badges = f.badges.clone();
        self.candidate = f.candidate;
    }

    pub fn set_pr_filter(&mut self, f: &PrFilter) {
        self.party = f.party.clone();
        self.group = f.group.clone();
        self.badges = f.badges.clone();
        self.candidate = f.candidate;
    }
}

impl UrlState for UrlFilterState {
    const KEYS: &'static [&'static str] = &[
        "tab",
        "state",
        "district",
        "constituency",
        "party",
        "badges",
        "candidate",
        "group",
    ];

    fn read(params: &QueryParams) -> Self {
        let tab = match params.get_string("tab").as_str() {
            "pr" => Tab::Pr,
            _ => Tab::Fptp,
        };
        UrlFilterState {
            tab,
            state: params.get_u32("state"),
            district: params.get_u32("district"),
            constituency: params.get_u32("constituency"),
            party: params.get_string("party"),
            badges: canonicalize_tags(&params.get_list("badges")),
            candidate: params.get_u32("candidate"),
            group: params.get_string("group"),
        }
    }

    fn write(&self, params: &mut QueryParams) {
        params.set_string(
            "tab",
            match self.tab {
                Tab::Fptp => "",
                Tab::Pr => "pr",
            },
        );
        params.set_u32("state", self.state);
        params.set_u32("district", self.district);
        params.set_u32("constituency", self.constituency);
        params.set_string("party", &self.party);
        params.set_list("badges", &self.badges);
        params.set_u32("candidate", self.candidate);
        params.set_string("group", &self.group);
    }
}

/// The state of the constituency page. Geography is given by name.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstituencyFilterState {
    pub state: String,
    pub district: String,
    pub constituency: String,
}

impl ConstituencyFilterState {
    /// Resolves the names against the data. Unknown names read as unset.
    pub fn geo_filter(&self, constituencies: &[Constituency]) -> GeoFilter {
        let state = constituencies
            .iter()
            .find(|c| !self.state.is_empty() && c.state_name == self.state)
            .map(|c| c.state_id)
            .unwrap_or(0);
        let district = constituencies
            .iter()
            .find(|c| {
                !self.district.is_empty()
                    && c.district_name == self.district
                    && (state == 0 || c.state_id == state)
            })
            .map(|c| c.district_id)
            .unwrap_or(0);
        GeoFilter {
            state,
            district,
            constituency: self.constituency.trim().parse().unwrap_or(0),
            party: String::new(),
        }
    }

    pub fn from_geo_filter(f: &GeoFilter, constituencies: &[Constituency]) -> Self {
        let state = constituencies
            .iter()
            .find(|c| f.state != 0 && c.state_id == f.state)
            .map(|c| c.state_name.clone())
            .unwrap_or_default();
        let district = constituencies
            .iter()
            .find(|c| f.district != 0 && c.district_id == f.district)
            .map(|c| c.district_name.clone())
            .unwrap_or_default();
        let constituency = if f.constituency == 0 {
            String::new()
        } else {
            f.constituency.to_string()
        };
        ConstituencyFilterState {
            state,
            district,
            constituency,
        }
    }
}

impl UrlState for ConstituencyFilterState {
    const KEYS: &'static [&'static str] = &["state", "district", "constituency"];

    fn read(params: &QueryParams) -> Self {
        ConstituencyFilterState {
            state: params.get_string("state"),
            district: params.get_string("district"),
            constituency: params.get_string("constituency"),
        }
    }

    fn write(&self, params: &mut QueryParams) {
        params.set_string("state", &self.state);
        params.set_string("district", &self.district);
        params.set_string("constituency", &self.constituency);
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PartyFilterState {
    pub party: u32,
}

impl UrlState for PartyFilterState {
    const KEYS: &'static [&'static str] = &["party"];

    fn read(params: &QueryParams) -> Self {
        PartyFilterState {
            party: params.get_u32("party"),
        }
    }

    fn write(&self, params: &mut QueryParams) {
        params.set_u32("party", self.party);
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PartyComparisonFilterState {
    pub party1: u32,
    pub party2: u32,
}

impl UrlState for PartyComparisonFilterState {
    const KEYS: &'static [&'static str] = &["party1", "party2"];

    fn read(params: &QueryParams) -> Self {
        PartyComparisonFilterState {
            party1: params.get_u32("party1"),
            party2: params.get_u32("party2"),
        }
    }

    fn write(&self, params: &mut QueryParams) {
        params.set_u32("party1", self.party1);
        params.set_u32("party2", self.party2);
    }
}

/// Whether a write adds a history entry or rewrites the current one.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NavigationMode {
    Push,
    Replace,
}

// An in-memory browser history. Entries are `path` or `path?query`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

fn split_url(url: &str) -> (&str, &str) {
    url.split_once('?').unwrap_or((url, ""))
}

impl History {
    pub fn new(url: &str) -> History {
        History {
            entries: vec![url.to_string()],
            index: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    /// Number of entries. A history always holds at least its first page.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn navigate(&mut self, url: String, mode: NavigationMode) {
        match mode {
            NavigationMode::Push => {
                self.entries.truncate(self.index + 1);
                self.entries.push(url);
                self.index += 1;
            }
            NavigationMode::Replace => self.entries[self.index] = url,
        }
    }

    /// Steps back one entry. Returns false at the first entry.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            false
        } else {
            self.index -= 1;
            true
        }
    }

    pub fn read<S: UrlState>(&self) -> S {
        S::from_query(split_url(self.current()).1)
    }

    /// Writes a state into the current URL, keeping the path and the
    /// parameters the state does not own.
    pub fn write<S: UrlState>(&mut self, state: &S, mode: NavigationMode) {
        let (path, query) = split_url(self.current());
        let qs = state.to_query(&QueryParams::parse(query));
        let url = if qs.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, qs)
        };
        self.navigate(url, mode);
    }

    /// Drops every parameter owned by the state.
    pub fn reset<S: UrlState>(&mut self, mode: NavigationMode) {
        let (path, query) = split_url(self.current());
        let mut params = QueryParams::parse(query);
        S::reset(&mut params);
        let url = if params.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, params)
        };
        self.navigate(url, mode);
    }
}

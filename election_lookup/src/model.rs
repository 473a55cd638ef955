// ********* Dataset records ***********
//
// The records mirror the static JSON exports. Every optional field defaults so
// that older exports, which lack some columns, still load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::badges::canonicalize_tags;
use crate::legacy::{
    id_from_number_or_string, list_from_array_or_string, opt_count, opt_id_from_number_or_string,
};

/// The logical datasets, one JSON file each.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Dataset {
    FptpCandidates,
    PrCandidates,
    Constituencies,
    Parties,
    PartySymbols,
    PoliticalHistory,
}

impl Dataset {
    pub const ALL: [Dataset; 6] = [
        Dataset::FptpCandidates,
        Dataset::PrCandidates,
        Dataset::Constituencies,
        Dataset::Parties,
        Dataset::PartySymbols,
        Dataset::PoliticalHistory,
    ];

    /// The file stem, served as `/data/<name>.json`.
    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::FptpCandidates => "dim_current_fptp_candidates",
            Dataset::PrCandidates => "dim_current_proportional_candidates",
            Dataset::Constituencies => "dim_constituency_profile",
            Dataset::Parties => "dim_parties_profile",
            Dataset::PartySymbols => "political_party_symbols",
            Dataset::PoliticalHistory => "candidates_political_history",
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// A record type that can be loaded from one of the datasets.
///
/// `normalize` runs exactly once, between decoding and publication. After it,
/// records are never modified.
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    const DATASET: Dataset;

    fn normalize(self) -> Self {
        self
    }
}

/// Anything carrying a list of badge tags.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ElectionResult {
    Winner,
    Loser,
}

/// A past FPTP race of one candidate.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct PastRace {
    pub votes: Option<u64>,
    pub result: Option<ElectionResult>,
    pub party: Option<String>,
    pub district: Option<String>,
    pub constituency_id: Option<u32>,
    pub total_cast: Option<u64>,
    pub winner_votes: Option<u64>,
    pub runner_up_votes: Option<u64>,
}

impl PastRace {
    /// The votes a candidate is measured against: the runner-up for a
    /// winner, the winner otherwise.
    pub fn opponent_votes(&self) -> Option<u64> {
        match self.result {
            Some(ElectionResult::Winner) => self.runner_up_votes,
            _ => self.winner_votes,
        }
    }
}

/// A candidate for a first-past-the-post seat.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FptpCandidate {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub candidate_id: u32,
    pub candidate_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub qualification_level: Option<String>,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub state_id: u32,
    pub state_name: String,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub district_id: u32,
    pub district_name: String,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub constituency_id: u32,
    pub political_party_name: String,
    #[serde(default)]
    pub party_display_order: Option<u32>,
    #[serde(default)]
    pub citizenship_district: Option<String>,

    // 2079 election
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_election_votes: Option<u64>,
    #[serde(default)]
    pub prev_election_result: Option<ElectionResult>,
    #[serde(default)]
    pub prev_election_party: Option<String>,
    #[serde(default)]
    pub prev_election_district: Option<String>,
    #[serde(default, deserialize_with = "opt_id_from_number_or_string")]
    pub prev_election_constituency_id: Option<u32>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_election_casted_vote: Option<u64>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_winner_votes: Option<u64>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_runner_up_votes: Option<u64>,

    // 2074 election
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2074_election_votes: Option<u64>,
    #[serde(default)]
    pub prev_2074_election_result: Option<ElectionResult>,
    #[serde(default)]
    pub prev_2074_election_party: Option<String>,
    #[serde(default)]
    pub prev_2074_election_district: Option<String>,
    #[serde(default, deserialize_with = "opt_id_from_number_or_string")]
    pub prev_2074_election_constituency_id: Option<u32>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2074_election_casted_vote: Option<u64>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2074_winner_votes: Option<u64>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2074_runner_up_votes: Option<u64>,

    #[serde(default)]
    pub is_past_minister: bool,
    #[serde(default)]
    pub minister_appointment_count: u32,
    #[serde(default)]
    pub total_elections_contested: u32,
    #[serde(default)]
    pub is_new_candidate: bool,
    #[serde(default)]
    pub is_new_party: bool,
    #[serde(default)]
    pub is_tourist_candidate: bool,
    #[serde(default)]
    pub is_chheparo: bool,
    #[serde(default)]
    pub is_vaguwa: bool,
    #[serde(default)]
    pub is_educated: bool,
    #[serde(default)]
    pub is_loyal: bool,
    #[serde(default)]
    pub is_influential: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FptpCandidate {
    /// The 2079 race, the most recent one before the current cycle.
    pub fn race_2079(&self) -> PastRace {
        PastRace {
            votes: self.prev_election_votes,
            result: self.prev_election_result,
            party: self.prev_election_party.clone(),
            district: self.prev_election_district.clone(),
            constituency_id: self.prev_election_constituency_id,
            total_cast: self.prev_election_casted_vote,
            winner_votes: self.prev_winner_votes,
            runner_up_votes: self.prev_runner_up_votes,
        }
    }

    pub fn race_2074(&self) -> PastRace {
        PastRace {
            votes: self.prev_2074_election_votes,
            result: self.prev_2074_election_result,
            party: self.prev_2074_election_party.clone(),
            district: self.prev_2074_election_district.clone(),
            constituency_id: self.prev_2074_election_constituency_id,
            total_cast: self.prev_2074_election_casted_vote,
            winner_votes: self.prev_2074_winner_votes,
            runner_up_votes: self.prev_2074_runner_up_votes,
        }
    }
}

impl Record for FptpCandidate {
    const DATASET: Dataset = Dataset::FptpCandidates;

    fn normalize(mut self) -> Self {
        self.tags = canonicalize_tags(&self.tags);
        self
    }
}

impl Tagged for FptpCandidate {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A candidate on a party list for proportional representation.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PrCandidate {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub serial_no: u32,
    pub candidate_name: String,
    #[serde(default)]
    pub gender: String,
    pub political_party_name: String,
    #[serde(default, deserialize_with = "opt_id_from_number_or_string")]
    pub party_id: Option<u32>,
    #[serde(default)]
    pub rank_position: u32,
    #[serde(default)]
    pub party_display_order: Option<u32>,
    #[serde(default)]
    pub inclusive_group: Option<String>,
    #[serde(default, deserialize_with = "opt_id_from_number_or_string")]
    pub inclusive_group_id: Option<u32>,
    #[serde(default)]
    pub disability: Option<String>,
    #[serde(default)]
    pub backward_area: Option<String>,
    #[serde(default)]
    pub citizenship_district: Option<String>,

    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2079_fptp_votes: Option<u64>,
    #[serde(default)]
    pub prev_2079_fptp_result: Option<ElectionResult>,
    #[serde(default)]
    pub prev_2079_fptp_margin: Option<i64>,
    #[serde(default)]
    pub prev_2079_fptp_party: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2074_fptp_votes: Option<u64>,
    #[serde(default)]
    pub prev_2074_fptp_result: Option<ElectionResult>,
    #[serde(default)]
    pub prev_2074_fptp_margin: Option<i64>,
    #[serde(default)]
    pub prev_2074_fptp_party: Option<String>,

    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2079_party_votes: Option<u64>,
    #[serde(default, deserialize_with = "opt_count")]
    pub prev_2074_party_votes: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record for PrCandidate {
    const DATASET: Dataset = Dataset::PrCandidates;

    fn normalize(mut self) -> Self {
        self.tags = canonicalize_tags(&self.tags);
        self
    }
}

impl Tagged for PrCandidate {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// One row of a constituency FPTP result table.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FptpResult {
    pub candidate_name: String,
    pub party_name: String,
    #[serde(default)]
    pub symbol_name: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub rank: Option<JSRank>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Ranks were exported both as numbers and as strings.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JSRank {
    Number(u32),
    Text(String),
}

/// One row of a constituency PR result table.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ProportionalResult {
    pub party_name: String,
    #[serde(default, deserialize_with = "opt_count")]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub rank: Option<JSRank>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Constituency {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub state_id: u32,
    pub state_name: String,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub district_id: u32,
    pub district_name: String,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub constituency_id: u32,
    #[serde(default)]
    pub constituency_name: Option<JSRank>,
    #[serde(default, deserialize_with = "list_from_array_or_string")]
    pub fptp_2079_results: Vec<FptpResult>,
    #[serde(default, deserialize_with = "list_from_array_or_string")]
    pub fptp_2074_results: Vec<FptpResult>,
    #[serde(default, deserialize_with = "list_from_array_or_string")]
    pub proportional_2079_results: Vec<ProportionalResult>,
    #[serde(default)]
    pub winning_party_2079: Option<String>,
    #[serde(default)]
    pub winning_party_2074: Option<String>,
    #[serde(default)]
    pub is_gadh: bool,
    #[serde(default)]
    pub gadh_party_name: Option<String>,
    #[serde(default)]
    pub is_pakad: bool,
    #[serde(default)]
    pub pakad_party_name: Option<String>,
    #[serde(default, deserialize_with = "list_from_array_or_string")]
    pub tags: Vec<String>,
}

impl Record for Constituency {
    const DATASET: Dataset = Dataset::Constituencies;
}

/// Seats and votes of a party in one election year.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearStats {
    #[serde(default)]
    pub total_reps: u32,
    #[serde(default)]
    pub fptp_reps: u32,
    #[serde(default)]
    pub pr_reps: u32,
    #[serde(default, deserialize_with = "opt_count")]
    pub fptp_votes: Option<u64>,
    #[serde(default, deserialize_with = "opt_count")]
    pub pr_votes: Option<u64>,
}

/// A count within a named group, e.g. `{"group": "महिला", "count": 12}`.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct GroupCount {
    pub group: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FptpStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub avg_age: Option<f64>,
    #[serde(default)]
    pub new: u64,
    #[serde(default)]
    pub returning: u64,
    #[serde(default)]
    pub gender: Vec<GroupCount>,
    #[serde(default)]
    pub age_group: Vec<GroupCount>,
    #[serde(default)]
    pub qualification: Vec<GroupCount>,
    #[serde(default)]
    pub tags: Vec<GroupCount>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub gender: Vec<GroupCount>,
    #[serde(default)]
    pub inclusive: Vec<GroupCount>,
    #[serde(default)]
    pub disability: Vec<GroupCount>,
    #[serde(default)]
    pub tags: Vec<GroupCount>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentStats {
    #[serde(default)]
    pub fptp: Option<FptpStats>,
    #[serde(default)]
    pub pr: Option<PrStats>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyProfile {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub party_id: u32,
    pub party_name: String,
    #[serde(default)]
    pub symbol_url: Option<String>,
    #[serde(default)]
    pub leader: Option<String>,
    #[serde(default)]
    pub party_display_order: Option<u32>,
    /// Keyed by election year, e.g. `"2079"`.
    #[serde(default)]
    pub history_json: BTreeMap<String, YearStats>,
    #[serde(default)]
    pub current_stats_json: CurrentStats,
    #[serde(default)]
    pub party_tags: Vec<String>,
    #[serde(default)]
    pub gadh_count: u32,
    #[serde(default)]
    pub pakad_count: u32,
    #[serde(default)]
    pub gadh_constituencies: Vec<String>,
    #[serde(default)]
    pub pakad_constituencies: Vec<String>,
}

impl PartyProfile {
    pub fn year(&self, year: &str) -> Option<&YearStats> {
        self.history_json.get(year)
    }
}

impl Record for PartyProfile {
    const DATASET: Dataset = Dataset::Parties;
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct PartySymbol {
    #[serde(default)]
    pub party_name_en: Option<String>,
    #[serde(default)]
    pub party_name_np: Option<String>,
    #[serde(default)]
    pub symbol_url: Option<String>,
    #[serde(default)]
    pub symbol_alt: Option<String>,
}

impl Record for PartySymbol {
    const DATASET: Dataset = Dataset::PartySymbols;
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionHistoryEntry {
    pub year: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub constituency: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub party: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ElectionWin,
    ElectionLoss,
    MinisterialAppt,
    PartySwitch,
    Resignation,
    Other,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventCategory {
    Good,
    Bad,
    Neutral,
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct PoliticalEvent {
    pub event: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub link_to_source: String,
    pub event_type: EventType,
    pub event_category: EventCategory,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PoliticalHistory {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub candidate_id: u32,
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_party: String,
    #[serde(default)]
    pub election_history: Vec<ElectionHistoryEntry>,
    #[serde(default)]
    pub political_history: Vec<PoliticalEvent>,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub overall_approval_rating: Option<f64>,
}

impl Record for PoliticalHistory {
    const DATASET: Dataset = Dataset::PoliticalHistory;
}

/// Finds the political history of a candidate.
pub fn history_for(histories: &[PoliticalHistory], candidate_id: u32) -> Option<&PoliticalHistory> {
    histories.iter().find(|h| h.candidate_id == candidate_id)
}

/// Party name to symbol url, for both the English and the Nepali names.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    urls: BTreeMap<String, Option<String>>,
}

impl SymbolIndex {
    pub fn new(symbols: &[PartySymbol]) -> SymbolIndex {
        let mut urls = BTreeMap::new();
        for s in symbols {
            for name in [&s.party_name_en, &s.party_name_np].into_iter().flatten() {
                if !name.is_empty() {
                    urls.insert(name.clone(), s.symbol_url.clone());
                }
            }
        }
        SymbolIndex { urls }
    }

    pub fn symbol_url(&self, party_name: &str) -> Option<&str> {
        self.urls.get(party_name).and_then(|u| u.as_deref())
    }
}

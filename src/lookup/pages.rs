// The JSON documents produced by each command.

use log::{debug, warn};
use serde::Serialize;
use snafu::prelude::*;

use election_lookup::*;

use crate::lookup::{ChunavResult, LoadSnafu, ParsingJsonSnafu, PartyNotFoundSnafu};

pub fn to_json<T: Serialize + ?Sized>(v: &T) -> ChunavResult<String> {
    serde_json::to_string_pretty(v).context(ParsingJsonSnafu {})
}

// Optional datasets only enrich a page: a failure is logged, not fatal.
async fn load_optional<T: Record>(cache: &DatasetCache) -> Vec<T> {
    match cache.load::<T>().await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Continuing without {}: {}", T::DATASET, e);
            Vec::new()
        }
    }
}

#[derive(Debug, Serialize)]
struct RaceSummary {
    year: &'static str,
    race: PastRace,
    vote_percentage: Option<f64>,
    margin: Option<i64>,
}

impl RaceSummary {
    fn new(year: &'static str, race: PastRace) -> RaceSummary {
        let margin = margin(
            race.votes.map(|v| v as i64),
            race.opponent_votes().map(|v| v as i64),
        );
        RaceSummary {
            year,
            vote_percentage: vote_percentage(race.votes, race.total_cast),
            margin,
            race,
        }
    }
}

#[derive(Debug, Serialize)]
struct CandidateDetails<'a> {
    badges: Vec<&'static Badge>,
    races: Vec<RaceSummary>,
    history: Option<&'a PoliticalHistory>,
    symbol_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FptpPage<'a> {
    query: String,
    view: CandidateView<'a>,
    details: Option<CandidateDetails<'a>>,
}

#[derive(Debug, Serialize)]
struct PrPage<'a> {
    query: String,
    view: PrView<'a>,
}

pub async fn candidates_page(
    cache: &DatasetCache,
    query: &str,
    force_pr: bool,
) -> ChunavResult<String> {
    let params = QueryParams::parse(query);
    let mut state = UrlFilterState::read(&params);
    if force_pr {
        state.tab = Tab::Pr;
    }
    debug!("candidates_page: {:?}", state);
    match state.tab {
        Tab::Fptp => {
            let candidates: Vec<FptpCandidate> = cache.load().await.context(LoadSnafu {})?;
            let view = compute_filtered_view(&candidates, &state.fptp_filter());
            state.set_fptp_filter(&view.filter);
            let (histories, symbols): (Vec<PoliticalHistory>, Vec<PartySymbol>) =
                if view.selected.is_some() {
                    (load_optional(cache).await, load_optional(cache).await)
                } else {
                    (Vec::new(), Vec::new())
                };
            let symbol_index = SymbolIndex::new(&symbols);
            let details = view.selected.map(|c| CandidateDetails {
                badges: badges_for(&c.tags),
                races: vec![
                    RaceSummary::new("2079", c.race_2079()),
                    RaceSummary::new("2074", c.race_2074()),
                ],
                history: history_for(&histories, c.candidate_id),
                symbol_url: symbol_index.symbol_url(&c.political_party_name),
            });
            to_json(&FptpPage {
                query: state.to_query(&params),
                view,
                details,
            })
        }
        Tab::Pr => {
            let candidates: Vec<PrCandidate> = cache.load().await.context(LoadSnafu {})?;
            let view = compute_pr_view(&candidates, &state.pr_filter());
            state.set_pr_filter(&view.filter);
            to_json(&PrPage {
                query: state.to_query(&params),
                view,
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct ConstituencyPage<'a> {
    query: String,
    view: ConstituencyView<'a>,
}

pub async fn constituencies_page(cache: &DatasetCache, query: &str) -> ChunavResult<String> {
    let params = QueryParams::parse(query);
    let state = ConstituencyFilterState::read(&params);
    let constituencies: Vec<Constituency> = cache.load().await.context(LoadSnafu {})?;
    let view = compute_constituency_view(&constituencies, &state.geo_filter(&constituencies));
    let state = ConstituencyFilterState::from_geo_filter(&view.filter, &constituencies);
    to_json(&ConstituencyPage {
        query: state.to_query(&params),
        view,
    })
}

#[derive(Debug, Serialize)]
struct PartyPage<'a> {
    profile: &'a PartyProfile,
    symbol_url: Option<&'a str>,
    trend: Trend,
    seat_change: i64,
    fptp_candidates: Vec<&'a FptpCandidate>,
    pr_candidates: Vec<&'a PrCandidate>,
}

fn find_party(parties: &[PartyProfile], id: u32) -> ChunavResult<&PartyProfile> {
    parties
        .iter()
        .find(|p| p.party_id == id)
        .context(PartyNotFoundSnafu { id })
}

pub async fn party_page(cache: &DatasetCache, id: u32) -> ChunavResult<String> {
    let parties: Vec<PartyProfile> = cache.load().await.context(LoadSnafu {})?;
    let profile = find_party(&parties, id)?;
    let fptp: Vec<FptpCandidate> = load_optional(cache).await;
    let pr: Vec<PrCandidate> = load_optional(cache).await;
    let symbols: Vec<PartySymbol> = load_optional(cache).await;
    let symbol_index = SymbolIndex::new(&symbols);

    let fptp_filter = GeoFilter {
        party: profile.party_name.clone(),
        ..Default::default()
    };
    let pr_filter = PrFilter {
        party: id.to_string(),
        ..Default::default()
    };
    let page = PartyPage {
        profile,
        symbol_url: profile
            .symbol_url
            .as_deref()
            .or_else(|| symbol_index.symbol_url(&profile.party_name)),
        trend: party_trend(profile),
        seat_change: seat_delta(
            profile.year("2079").map(|y| y.total_reps),
            profile.year("2074").map(|y| y.total_reps),
        ),
        fptp_candidates: geo::apply(&fptp, &fptp_filter),
        pr_candidates: pr_list::apply(&pr, &pr_filter),
    };
    to_json(&page)
}

#[derive(Debug, Serialize)]
struct ComparisonPage {
    query: String,
    comparison: PartyComparison,
}

pub async fn comparison_page(cache: &DatasetCache, query: &str) -> ChunavResult<String> {
    let params = QueryParams::parse(query);
    let state = PartyComparisonFilterState::read(&params);
    let parties: Vec<PartyProfile> = cache.load().await.context(LoadSnafu {})?;
    let first = find_party(&parties, state.party1)?;
    let second = find_party(&parties, state.party2)?;
    to_json(&ComparisonPage {
        query: state.to_query(&params),
        comparison: PartyComparison::new(first, second),
    })
}

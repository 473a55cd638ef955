use serde::Serialize;

use crate::model::{Constituency, FptpResult, GroupCount, PartyProfile};

// ********* Percentages and margins *********

/// Share of the votes, in percent with one decimal.
///
/// `None` when the votes are unknown or when no vote was cast.
pub fn vote_percentage(votes: Option<u64>, total_cast: Option<u64>) -> Option<f64> {
    let votes = votes?;
    let total = total_cast.filter(|t| *t > 0)?;
    // Tenths of a percent are rounded directly, 23 of 80 is 28.8.
    Some((votes as f64 / total as f64 * 1000.0).round() / 10.0)
}

/// Signed lead of a candidate over an opponent.
pub fn margin(candidate: Option<i64>, opponent: Option<i64>) -> Option<i64> {
    Some(candidate? - opponent?)
}

/// Whole-percent share of `count` in `total`.
pub fn share_percent(count: u64, total: u64) -> Option<u32> {
    if total == 0 {
        None
    } else {
        Some((count as f64 / total as f64 * 100.0).round() as u32)
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Seat difference between two years. A missing year counts as no seat.
pub fn seat_delta(current: Option<u32>, previous: Option<u32>) -> i64 {
    current.unwrap_or(0) as i64 - previous.unwrap_or(0) as i64
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Flat,
}

impl Trend {
    pub fn between(current: i64, previous: i64) -> Trend {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Trend::Improving,
            std::cmp::Ordering::Less => Trend::Declining,
            std::cmp::Ordering::Equal => Trend::Flat,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    HigherIsBetter,
    LowerIsBetter,
}

/// Which side of a comparison is ahead.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    First,
    Second,
    Even,
}

impl Advantage {
    pub fn of(first: i64, second: i64, preference: Preference) -> Advantage {
        let (a, b) = match preference {
            Preference::HigherIsBetter => (first, second),
            Preference::LowerIsBetter => (second, first),
        };
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Advantage::First,
            std::cmp::Ordering::Less => Advantage::Second,
            std::cmp::Ordering::Equal => Advantage::Even,
        }
    }
}

// ********* Constituency: 2074 against 2079 *********

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub winner: Option<FptpResult>,
    pub total_votes: u64,
}

impl CycleSummary {
    fn new(rows: &[FptpResult]) -> CycleSummary {
        let winner = rows
            .iter()
            .find(|r| r.remarks.as_deref() == Some("Elected"))
            .or_else(|| rows.first())
            .cloned();
        CycleSummary {
            winner,
            total_votes: rows.iter().filter_map(|r| r.vote_count).sum(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ElectionComparison {
    pub cycle_2079: CycleSummary,
    pub cycle_2074: CycleSummary,
    pub party_changed: bool,
    pub same_candidate: bool,
    /// Votes of the 2079 winning party, in each cycle.
    pub party_votes_2079: u64,
    pub party_votes_2074: u64,
    pub vote_change: i64,
    /// `None` when the party had no votes in 2074.
    pub vote_change_percent: Option<f64>,
}

fn party_votes(rows: &[FptpResult], party: Option<&str>) -> u64 {
    match party {
        None => 0,
        Some(p) => rows
            .iter()
            .filter(|r| r.party_name == p)
            .filter_map(|r| r.vote_count)
            .sum(),
    }
}

impl ElectionComparison {
    pub fn new(c: &Constituency) -> ElectionComparison {
        let cycle_2079 = CycleSummary::new(&c.fptp_2079_results);
        let cycle_2074 = CycleSummary::new(&c.fptp_2074_results);
        let party = c.winning_party_2079.as_deref();
        let party_votes_2079 = party_votes(&c.fptp_2079_results, party);
        let party_votes_2074 = party_votes(&c.fptp_2074_results, party);
        let vote_change = party_votes_2079 as i64 - party_votes_2074 as i64;
        let vote_change_percent = if party_votes_2074 > 0 {
            Some(round1(vote_change as f64 / party_votes_2074 as f64 * 100.0))
        } else {
            None
        };
        let same_candidate = match (&cycle_2079.winner, &cycle_2074.winner) {
            (Some(a), Some(b)) => a.candidate_name == b.candidate_name,
            _ => false,
        };
        ElectionComparison {
            party_changed: c.winning_party_2079 != c.winning_party_2074,
            same_candidate,
            cycle_2079,
            cycle_2074,
            party_votes_2079,
            party_votes_2074,
            vote_change,
            vote_change_percent,
        }
    }
}

// ********* Party against party *********

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct MetricRow {
    pub key: &'static str,
    pub title: &'static str,
    pub first: i64,
    pub second: i64,
    pub preference: Preference,
    pub advantage: Advantage,
}

impl MetricRow {
    fn new(key: &'static str, title: &'static str, first: i64, second: i64) -> MetricRow {
        MetricRow::with_preference(key, title, first, second, Preference::HigherIsBetter)
    }

    fn with_preference(
        key: &'static str,
        title: &'static str,
        first: i64,
        second: i64,
        preference: Preference,
    ) -> MetricRow {
        MetricRow {
            key,
            title,
            first,
            second,
            preference,
            advantage: Advantage::of(first, second, preference),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DistributionRow {
    pub group: String,
    pub first_count: u64,
    pub second_count: u64,
    pub first_percent: f64,
    pub second_percent: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DistributionComparison {
    pub key: &'static str,
    pub rows: Vec<DistributionRow>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PartyComparison {
    pub first: String,
    pub second: String,
    pub metrics: Vec<MetricRow>,
    pub distributions: Vec<DistributionComparison>,
}

const WOMEN: &str = "महिला";
const WITH_DISABILITY: &str = "Yes";

fn group_count(groups: &[GroupCount], name: &str) -> u64 {
    groups
        .iter()
        .find(|g| g.group == name)
        .map(|g| g.count)
        .unwrap_or(0)
}

fn seats(p: &PartyProfile, year: &str) -> Option<u32> {
    p.year(year).map(|y| y.total_reps)
}

struct PartyNumbers {
    seats_2079: i64,
    seats_2074: i64,
    fptp_total: u64,
    avg_age: i64,
    new_percent: i64,
    women_percent: i64,
    pr_total: u64,
    pr_women_percent: i64,
    pr_disability_percent: i64,
}

impl PartyNumbers {
    fn new(p: &PartyProfile) -> PartyNumbers {
        let fptp = p.current_stats_json.fptp.clone().unwrap_or_default();
        let pr = p.current_stats_json.pr.clone().unwrap_or_default();
        let pct = |count: u64, total: u64| share_percent(count, total).unwrap_or(0) as i64;
        PartyNumbers {
            seats_2079: seats(p, "2079").unwrap_or(0) as i64,
            seats_2074: seats(p, "2074").unwrap_or(0) as i64,
            fptp_total: fptp.total,
            avg_age: fptp.avg_age.unwrap_or(0.0).round() as i64,
            new_percent: pct(fptp.new, fptp.total),
            women_percent: pct(group_count(&fptp.gender, WOMEN), fptp.total),
            pr_total: pr.total,
            pr_women_percent: pct(group_count(&pr.gender, WOMEN), pr.total),
            pr_disability_percent: pct(group_count(&pr.disability, WITH_DISABILITY), pr.total),
        }
    }
}

/// Lines up two group distributions.
///
/// Groups from both sides are kept, most common (over both sides) first.
/// Percentages are relative to each side's own total, 0 when that total is 0.
pub fn compare_distributions(
    first: &[GroupCount],
    first_total: u64,
    second: &[GroupCount],
    second_total: u64,
) -> Vec<DistributionRow> {
    let mut groups: Vec<&str> = Vec::new();
    for g in first.iter().chain(second.iter()) {
        if !groups.contains(&g.group.as_str()) {
            groups.push(&g.group);
        }
    }
    let pct = |count: u64, total: u64| {
        if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    };
    let mut rows: Vec<DistributionRow> = groups
        .into_iter()
        .map(|g| {
            let c1 = group_count(first, g);
            let c2 = group_count(second, g);
            DistributionRow {
                group: g.to_string(),
                first_count: c1,
                second_count: c2,
                first_percent: pct(c1, first_total),
                second_percent: pct(c2, second_total),
            }
        })
        .collect();
    rows.sort_by(|a, b| (b.first_count + b.second_count).cmp(&(a.first_count + a.second_count)));
    rows
}

fn distribution(
    key: &'static str,
    first: &[GroupCount],
    first_total: u64,
    second: &[GroupCount],
    second_total: u64,
) -> DistributionComparison {
    DistributionComparison {
        key,
        rows: compare_distributions(first, first_total, second, second_total),
    }
}

impl PartyComparison {
    pub fn new(first: &PartyProfile, second: &PartyProfile) -> PartyComparison {
        let a = PartyNumbers::new(first);
        let b = PartyNumbers::new(second);
        let metrics = vec![
            MetricRow::new("seats_2079", "२०७९ निर्वाचन सिट", a.seats_2079, b.seats_2079),
            MetricRow::new("seats_2074", "२०७४ निर्वाचन सिट", a.seats_2074, b.seats_2074),
            MetricRow::new("gadh", "गढ (Gadh)", first.gadh_count as i64, second.gadh_count as i64),
            MetricRow::new("pakad", "पकड (Pakad)", first.pakad_count as i64, second.pakad_count as i64),
            MetricRow::new("fptp_total", "कुल उम्मेदवार", a.fptp_total as i64, b.fptp_total as i64),
            MetricRow::with_preference(
                "fptp_avg_age",
                "औसत उमेर",
                a.avg_age,
                b.avg_age,
                Preference::LowerIsBetter,
            ),
            MetricRow::new("fptp_new_percent", "नयाँ अनुहार (%)", a.new_percent, b.new_percent),
            MetricRow::new("fptp_women_percent", "महिला उम्मेदवार (%)", a.women_percent, b.women_percent),
            MetricRow::new(
                "seat_change",
                "सिट परिवर्तन (२०७४-२०७९)",
                seat_delta(Some(a.seats_2079 as u32), Some(a.seats_2074 as u32)),
                seat_delta(Some(b.seats_2079 as u32), Some(b.seats_2074 as u32)),
            ),
            MetricRow::new("pr_total", "कुल उम्मेदवार", a.pr_total as i64, b.pr_total as i64),
            MetricRow::new("pr_women_percent", "महिला उम्मेदवार (%)", a.pr_women_percent, b.pr_women_percent),
            MetricRow::new(
                "pr_disability_percent",
                "अपाङ्गता भएका (%)",
                a.pr_disability_percent,
                b.pr_disability_percent,
            ),
        ];

        let f1 = first.current_stats_json.fptp.clone().unwrap_or_default();
        let f2 = second.current_stats_json.fptp.clone().unwrap_or_default();
        let p1 = first.current_stats_json.pr.clone().unwrap_or_default();
        let p2 = second.current_stats_json.pr.clone().unwrap_or_default();
        let distributions = vec![
            distribution("fptp_gender", &f1.gender, f1.total, &f2.gender, f2.total),
            distribution("fptp_age_group", &f1.age_group, f1.total, &f2.age_group, f2.total),
            distribution("fptp_qualification", &f1.qualification, f1.total, &f2.qualification, f2.total),
            distribution("fptp_tags", &f1.tags, f1.total, &f2.tags, f2.total),
            distribution("pr_gender", &p1.gender, p1.total, &p2.gender, p2.total),
            distribution("pr_inclusive", &p1.inclusive, p1.total, &p2.inclusive, p2.total),
            distribution("pr_tags", &p1.tags, p1.total, &p2.tags, p2.total),
        ];

        PartyComparison {
            first: first.party_name.clone(),
            second: second.party_name.clone(),
            metrics,
            distributions,
        }
    }

    pub fn metric(&self, key: &str) -> Option<&MetricRow> {
        self.metrics.iter().find(|m| m.key == key)
    }
}

/// The seat trend of a party between 2074 and 2079.
pub fn party_trend(p: &PartyProfile) -> Trend {
    Trend::between(
        seats(p, "2079").unwrap_or(0) as i64,
        seats(p, "2074").unwrap_or(0) as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::constituency;
    use crate::model::{CurrentStats, FptpStats, PrStats, YearStats};
    use std::collections::BTreeMap;

    #[test]
    fn percentages() {
        assert_eq!(vote_percentage(Some(0), Some(1000)), Some(0.0));
        assert_eq!(vote_percentage(Some(500), Some(0)), None);
        assert_eq!(vote_percentage(Some(333), Some(1000)), Some(33.3));
        assert_eq!(vote_percentage(None, Some(1000)), None);
        assert_eq!(vote_percentage(Some(1), None), None);
        assert_eq!(vote_percentage(Some(40662), Some(84808)), Some(47.9));
        // Half tenths round up.
        assert_eq!(vote_percentage(Some(23), Some(80)), Some(28.8));
        assert_eq!(vote_percentage(Some(41), Some(80)), Some(51.3));
        assert_eq!(vote_percentage(Some(1), Some(8)), Some(12.5));
        assert_eq!(share_percent(1, 3), Some(33));
        assert_eq!(share_percent(2, 3), Some(67));
        assert_eq!(share_percent(5, 0), None);
    }

    #[test]
    fn margins() {
        assert_eq!(margin(Some(1000), Some(400)), Some(600));
        assert_eq!(margin(Some(400), Some(1000)), Some(-600));
        assert_eq!(margin(None, Some(400)), None);
        assert_eq!(margin(Some(400), None), None);
    }

    #[test]
    fn trends_and_advantages() {
        assert_eq!(seat_delta(Some(32), Some(63)), -31);
        assert_eq!(seat_delta(Some(20), None), 20);
        assert_eq!(Trend::between(3, 1), Trend::Improving);
        assert_eq!(Trend::between(1, 3), Trend::Declining);
        assert_eq!(Trend::between(2, 2), Trend::Flat);
        assert_eq!(Advantage::of(50, 40, Preference::HigherIsBetter), Advantage::First);
        assert_eq!(Advantage::of(50, 40, Preference::LowerIsBetter), Advantage::Second);
        assert_eq!(Advantage::of(7, 7, Preference::LowerIsBetter), Advantage::Even);
    }

    fn row(name: &str, party: &str, votes: u64, remarks: Option<&str>) -> FptpResult {
        FptpResult {
            candidate_name: name.to_string(),
            party_name: party.to_string(),
            symbol_name: None,
            vote_count: Some(votes),
            rank: None,
            remarks: remarks.map(|s| s.to_string()),
        }
    }

    #[test]
    fn compares_two_cycles() {
        let mut c = constituency((1, "S"), (4, "D"), 1);
        c.fptp_2079_results = vec![
            row("Ram", "P", 900, None),
            row("Sita", "Q", 1100, Some("Elected")),
        ];
        c.fptp_2074_results = vec![row("Hari", "P", 1200, None), row("Gita", "Q", 800, None)];
        c.winning_party_2079 = Some("Q".to_string());
        c.winning_party_2074 = Some("P".to_string());

        let cmp = ElectionComparison::new(&c);
        assert_eq!(cmp.cycle_2079.winner.as_ref().map(|w| w.candidate_name.as_str()), Some("Sita"));
        // No "Elected" remark in 2074: the first row wins.
        assert_eq!(cmp.cycle_2074.winner.as_ref().map(|w| w.candidate_name.as_str()), Some("Hari"));
        assert_eq!(cmp.cycle_2079.total_votes, 2000);
        assert!(cmp.party_changed);
        assert!(!cmp.same_candidate);
        assert_eq!(cmp.vote_change, 300);
        assert_eq!(cmp.vote_change_percent, Some(37.5));

        let empty = constituency((1, "S"), (4, "D"), 2);
        let cmp = ElectionComparison::new(&empty);
        assert_eq!(cmp.cycle_2079.winner, None);
        assert!(!cmp.party_changed);
        assert_eq!(cmp.vote_change_percent, None);
    }

    fn party(name: &str, seats: &[(&str, u32)], fptp: FptpStats, pr: PrStats) -> PartyProfile {
        let mut history_json = BTreeMap::new();
        for (y, s) in seats {
            history_json.insert(
                y.to_string(),
                YearStats {
                    total_reps: *s,
                    ..Default::default()
                },
            );
        }
        PartyProfile {
            party_id: 1,
            party_name: name.to_string(),
            symbol_url: None,
            leader: None,
            party_display_order: None,
            history_json,
            current_stats_json: CurrentStats {
                fptp: Some(fptp),
                pr: Some(pr),
            },
            party_tags: Vec::new(),
            gadh_count: 3,
            pakad_count: 0,
            gadh_constituencies: Vec::new(),
            pakad_constituencies: Vec::new(),
        }
    }

    fn gc(group: &str, count: u64) -> GroupCount {
        GroupCount {
            group: group.to_string(),
            count,
        }
    }

    #[test]
    fn compares_two_parties() {
        let a = party(
            "A",
            &[("2079", 57), ("2074", 23)],
            FptpStats {
                total: 4,
                avg_age: Some(52.6),
                new: 1,
                gender: vec![gc("पुरुष", 3), gc("महिला", 1)],
                ..Default::default()
            },
            PrStats {
                total: 10,
                disability: vec![gc("Yes", 1), gc("No", 9)],
                ..Default::default()
            },
        );
        let b = party(
            "B",
            &[("2079", 32)],
            FptpStats {
                total: 2,
                avg_age: Some(48.0),
                gender: vec![gc("महिला", 2)],
                ..Default::default()
            },
            PrStats::default(),
        );
        let cmp = PartyComparison::new(&a, &b);
        let age = cmp.metric("fptp_avg_age").unwrap();
        assert_eq!((age.first, age.second), (53, 48));
        assert_eq!(age.advantage, Advantage::Second);
        let women = cmp.metric("fptp_women_percent").unwrap();
        assert_eq!((women.first, women.second), (25, 100));
        let change = cmp.metric("seat_change").unwrap();
        assert_eq!((change.first, change.second), (34, 32));
        assert_eq!(cmp.metric("gadh").unwrap().advantage, Advantage::Even);
        assert_eq!(cmp.metric("pr_disability_percent").unwrap().first, 10);
        assert_eq!(cmp.metric("pr_women_percent").unwrap().second, 0);

        let gender = &cmp.distributions[0].rows;
        assert_eq!(gender[0].group, "पुरुष");
        assert_eq!(gender[1].group, "महिला");
        assert_eq!(gender[1].second_percent, 100.0);
        assert_eq!(party_trend(&a), Trend::Improving);
    }

    #[test]
    fn distributions_union_and_order() {
        let rows = compare_distributions(
            &[gc("x", 1), gc("y", 5)],
            6,
            &[gc("z", 2), gc("x", 3)],
            0,
        );
        let groups: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["y", "x", "z"]);
        assert_eq!(rows[1].second_count, 3);
        assert_eq!(rows[1].second_percent, 0.0);
    }
}

//! The badge taxonomy and the tag matcher.
//!
//! Badges are fixed, hand-authored entries. Candidate records carry tags that
//! are either badge ids (`"educated"`) or, in older exports, the Nepali display
//! name of the badge (`"शिक्षित"`). Both forms resolve to the same id.

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::model::Tagged;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Gold,
    Silver,
    Bronze,
    Primary,
    Accent,
    Warning,
    Destructive,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub name_nepali: &'static str,
    pub description: &'static str,
    pub description_np: &'static str,
    /// Icon key understood by the front end.
    pub icon: &'static str,
    pub color: BadgeColor,
}

macro_rules! badge {
    ($id:expr, $name:expr, $np:expr, $desc:expr, $desc_np:expr, $icon:expr, $color:ident) => {
        Badge {
            id: $id,
            name: $name,
            name_nepali: $np,
            description: $desc,
            description_np: $desc_np,
            icon: $icon,
            color: BadgeColor::$color,
        }
    };
}

/// All the badges, in display order.
pub static BADGES: &[Badge] = &[
    badge!("tourist", "Tourist", "पर्यटक", "Candidacy district differs from citizenship district", "नागरिकता जारी भएको जिल्ला वा हाल बसोबास गरिरहेको जिल्ला भन्दा फरक निर्वाचन क्षेत्रमा उम्मेदवारी", "plane", Accent),
    badge!("chheparo", "Chheparo", "छेपारो", "Switched parties since last election", "अघिल्लो चुनावदेखि पार्टी परिवर्तन", "repeat", Warning),
    badge!("vaguwa", "Vaguwa", "भगुवा", "Changed constituency since last election", "अघिल्लो चुनावदेखि निर्वाचन क्षेत्र परिवर्तन", "footprints", Bronze),
    badge!("vaguwa-won", "Vaguwa (Won Prev)", "भगुवा (विजेता)", "Changed constituency after winning previous election", "अघिल्लो चुनाव जितेपछि निर्वाचन क्षेत्र परिवर्तन", "footprints", Primary),
    badge!("new-candidate", "New Candidate", "नयाँ अनुहार", "First time FPTP candidate", "पहिलो पटक प्रत्यक्ष उम्मेदवार", "baby", Primary),
    badge!("educated", "Educated", "शिक्षित", "High School (+2) or above qualification", "उच्च माध्यमिक (+2) वा माथिको योग्यता", "graduation-cap", Silver),
    badge!("uneducated", "Uneducated", "अशिक्षित", "Below High School qualification", "उच्च माध्यमिक भन्दा तलको योग्यता", "fingerprint", Bronze),
    badge!("new-party", "New Party", "नयाँ पार्टी", "Party formed after last elections", "अघिल्लो चुनावपछि गठन भएको पार्टी", "party-popper", Accent),
    badge!("gen-z", "Gen-Z", "जेन जी", "27 years old and below", "२७ वर्ष र सो मुनिका", "sparkles", Primary),
    badge!("grandpa", "Grandpa", "हजुरबा", "Over 60 years old", "६० वर्ष माथिका", "user-round", Silver),
    badge!("influential", "Influential", "प्रभावशाली", "Won previous election with 20%+ margin", "२०% भन्दा बढी मतान्तरले अघिल्लो चुनाव जितेका", "star", Gold),
    badge!("opportunist", "Opportunist", "अवसरवादी", "Was Independent, now with established party", "पहिले स्वतन्त्र, अहिले स्थापित पार्टीसँग", "banknote", Warning),
    badge!("split-vote", "Split Vote", "भोट कटुवा", "Got less than 3% votes in last election", "भोट काट्नका लागि मात्र उठ्ने तर नजित्ने", "scissors", Destructive),
    badge!("proportional-veteran", "PR Veteran", "समानुपातिक अनुभवी", "Parliament member via proportional list", "समानुपातिकबाट पहिले संसद पदकाएका", "medal", Gold),
    badge!("loyal", "Loyal", "बफादार", "Same party & constituency across all elections", "सबै चुनावमा एउटै पार्टी र क्षेत्रबाट उम्मेदवार", "shield", Gold),
    badge!("nepo", "Nepo", "नातावाद", "Politician from family with political background", "राजनीतिक पृष्ठभूमि भएको परिवारका सदस्य", "heart-handshake", Accent),
    badge!("budi-bokuwa", "Budi Bokuwa", "बुढी बोकुवा", "Candidate whose spouse is also a candidate", "श्रीमती पनि उम्मेदवार भएको", "heart-handshake", Accent),
    badge!("budo-bokuwa", "Budo Bokuwa", "बुढो बोकुवा", "Candidate whose spouse is also a candidate", "श्रीमान पनि उम्मेदवार भएको", "heart-handshake", Accent),
    badge!("purba-mantri", "Purba Mantri", "पूर्व मन्त्री", "Former minister with government experience", "सरकारमा मन्त्री भएको अनुभव भएका उम्मेदवार", "crown", Gold),
    // Proportional representation lists
    badge!("party-loyal", "Party Loyal", "पार्टीप्रति वफादार", "Stayed with same party across elections", "सबै चुनावमा एउटै पार्टीसँग रहेका", "shield", Gold),
    badge!("top-rank", "Top Rank (1-5)", "शीर्ष वरीयता (१-५)", "Ranked 1-5 in party list, very likely to win", "पार्टी सूचीमा १-५ वरीयता, जित्ने सम्भावना उच्च", "crown", Gold),
    badge!("high-rank", "High Rank (6-10)", "उच्च वरीयता (६-१०)", "Ranked 6-10 in party list", "पार्टी सूचीमा ६-१० वरीयता", "trophy", Silver),
    badge!("women", "Women", "महिला", "Female candidate", "महिला उम्मेदवार", "user", Primary),
    badge!("inclusive-group", "Inclusive Group", "समावेशी समूह", "From inclusive/marginalized group", "समावेशी/सीमान्तकृत समूहबाट", "users", Primary),
    badge!("disability", "Disability", "अपाङ्गता", "Candidate with disability", "अपाङ्गता भएका उम्मेदवार", "accessibility", Accent),
    badge!("backward-area", "Backward Area", "पिछडिएको क्षेत्र", "From backward/underdeveloped area", "पिछडिएको क्षेत्रबाट", "map-pin", Bronze),
    badge!("fptp-veteran", "FPTP Veteran", "प्रत्यक्ष अनुभवी", "Parliament member via FPTP in past", "प्रत्यक्षबाट पहिले संसद पदकाएका", "medal", Gold),
    badge!("improving-party", "Improving Party", "सुधारोन्मुख पार्टी", "Party improved votes from 2074 to 2079", "२०७४ देखि २०७९ सम्म मत बढेको पार्टी", "trending-up", Primary),
    badge!("declining-party", "Declining Party", "खस्कँदो पार्टी", "Party lost votes from 2074 to 2079", "२०७४ देखि २०७९ सम्म मत घटेको पार्टी", "trending-down", Destructive),
    badge!("pani-maruwa", "Pani Maruwa", "पानी मरुवा", "Lost FPTP, now in PR list", "प्रत्यक्षमा हारेर समानुपातिकमा आउने पातकीहरू", "rotate-ccw", Warning),
    badge!("gati-xada", "Gati Xada", "गति छाडा", "Proportional parliament member continuing same PR path", "पहिले समानुपातिकबाट सांसद भएर अहिले पनि समानुपातिकमा उम्मेदवार", "building2", Primary),
    badge!("hutihara", "Hutihara", "हुतिहरा", "Won FPTP election before, now candidate in proportional list", "पहिले प्रत्यक्षबाट जितेर, अहिले समानुपातिकमा उम्मेदवार", "baby", Warning),
];

/// Legacy display names, as they appear in older exports.
static LEGACY_NAMES: &[(&str, &str)] = &[
    ("पर्यटक", "tourist"),
    ("छेपारो", "chheparo"),
    ("भगुवा", "vaguwa"),
    ("भगुवा (विजेता)", "vaguwa-won"),
    ("नयाँ अनुहार", "new-candidate"),
    ("शिक्षित", "educated"),
    ("अशिक्षित", "uneducated"),
    ("नयाँ पार्टी", "new-party"),
    ("जेन जी", "gen-z"),
    ("हजुरबा", "grandpa"),
    ("प्रभावशाली", "influential"),
    ("अवसरवादी", "opportunist"),
    ("भोट कटुवा", "split-vote"),
    ("समानुपातिक अनुभवी", "proportional-veteran"),
    ("बफादार", "loyal"),
    ("नातावाद", "nepo"),
    ("बुढी बोकुवा", "budi-bokuwa"),
    ("बुढो बोकुवा", "budo-bokuwa"),
    ("पूर्व मन्त्री", "purba-mantri"),
    ("पार्टीप्रति वफादार", "party-loyal"),
    ("शीर्ष वरीयता (१-५)", "top-rank"),
    ("उच्च वरीयता (६-१०)", "high-rank"),
    ("महिला", "women"),
    ("समावेशी समूह", "inclusive-group"),
    ("अपाङ्गता", "disability"),
    ("पिछडिएको क्षेत्र", "backward-area"),
    ("प्रत्यक्ष अनुभवी", "fptp-veteran"),
    ("सुधारोन्मुख पार्टी", "improving-party"),
    ("खस्कँदो पार्टी", "declining-party"),
    ("पानी मरुवा", "pani-maruwa"),
    ("गति छाडा", "gati-xada"),
    ("हुतिहरा", "hutihara"),
];

pub fn badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

/// Resolves a tag, given either as a badge id or as a legacy display name.
pub fn canonical_id(tag: &str) -> Option<&'static str> {
    let tag = tag.trim();
    if let Some(b) = badge(tag) {
        return Some(b.id);
    }
    LEGACY_NAMES
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, id)| *id)
}

/// Rewrites tags to canonical badge ids.
///
/// Unknown tags are dropped. When the same badge appears several times
/// (for instance once as an id and once under its legacy name), the first
/// occurrence keeps its position.
pub fn canonicalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen: HashSet<&'static str> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for t in tags {
        match canonical_id(t) {
            Some(id) if seen.insert(id) => res.push(id.to_string()),
            Some(_) => {}
            None => {
                debug!("canonicalize_tags: dropping unknown tag {:?}", t);
            }
        }
    }
    res
}

/// The badge definitions for a list of tags, in the order of the tags.
pub fn badges_for(tags: &[String]) -> Vec<&'static Badge> {
    canonicalize_tags(tags)
        .iter()
        .filter_map(|id| badge(id))
        .collect()
}

/// True if the tags contain every selected badge.
///
/// Both lists are expected in canonical form. An empty selection matches.
pub fn matches_all(selected: &[String], tags: &[String]) -> bool {
    selected.iter().all(|s| tags.iter().any(|t| t == s))
}

/// The badges carried by at least one member of the population, in taxonomy
/// order.
pub fn available_badges<'a, T, I>(population: I) -> Vec<&'static str>
where
    T: Tagged + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut present: HashSet<&'static str> = HashSet::new();
    for entity in population {
        for t in entity.tags() {
            if let Some(id) = canonical_id(t) {
                present.insert(id);
            }
        }
    }
    BADGES
        .iter()
        .map(|b| b.id)
        .filter(|id| present.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct T(Vec<String>);

    impl Tagged for T {
        fn tags(&self) -> &[String] {
            &self.0
        }
    }

    fn tags(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn taxonomy_is_consistent() {
        assert_eq!(BADGES.len(), 32);
        for (name, id) in LEGACY_NAMES {
            let b = badge(id).unwrap();
            assert_eq!(b.name_nepali, *name);
        }
        let ids: HashSet<&str> = BADGES.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BADGES.len());
    }

    #[test]
    fn legacy_name_and_id_collapse() {
        assert_eq!(canonical_id("शिक्षित"), Some("educated"));
        assert_eq!(canonical_id("educated"), Some("educated"));
        assert_eq!(canonical_id("Gadh: P"), None);
        assert_eq!(
            canonicalize_tags(&tags(&["loyal", "शिक्षित", "educated", "बफादार", "foo"])),
            tags(&["loyal", "educated"])
        );
    }

    #[test]
    fn conjunctive_matching() {
        let selected = tags(&["educated", "loyal"]);
        assert!(matches_all(&selected, &tags(&["loyal", "nepo", "educated"])));
        assert!(!matches_all(&selected, &tags(&["educated"])));
        assert!(matches_all(&[], &tags(&["educated"])));
        assert!(matches_all(&[], &[]));
    }

    #[test]
    fn availability_follows_population() {
        let pop = vec![
            T(tags(&["loyal"])),
            T(tags(&["शिक्षित"])),
            T(tags(&["educated", "unknown"])),
        ];
        assert_eq!(available_badges(&pop), vec!["educated", "loyal"]);
        assert_eq!(available_badges(&pop[..1]), vec!["loyal"]);
        let empty: Vec<T> = vec![];
        assert!(available_badges(&empty).is_empty());
    }

    #[test]
    fn badges_for_skips_unknown() {
        let bs = badges_for(&tags(&["purba-mantri", "xyz", "gen-z"]));
        let ids: Vec<&str> = bs.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["purba-mantri", "gen-z"]);
        assert_eq!(bs[0].color, BadgeColor::Gold);
    }
}

//! Party-name canonicalization for the 2025 election
//!
//! Upstream feeds spell the same subject several ways (with or without
//! diacritics, abbreviated, legacy coalition names). From 2025 on every
//! label is mapped to the official name from the ballot draw.

use crate::model::SeatAllocation;
use std::collections::HashMap;
use std::sync::OnceLock;

/// First election year whose labels are canonicalized
pub const CANONICAL_FROM_YEAR: i32 = 2025;

/// (draw number, official name, aliases)
const PARTY_CATALOG_2025: &[(u32, &str, &[&str])] = &[
    (1, "Rebelové", &["Rebelove"]),
    (2, "Moravské zemské hnutí", &["Moravske zemske hnuti", "Moravane", "MZH"]),
    (3, "Jasný signál nezávislých", &["Jasny signal nezavislych", "JaSaN"]),
    (
        4,
        "Výzva 2025",
        &["Vyzva 2025", "Výzva", "VYZVA 2025", "VYZVA", "VÝZVA 2025"],
    ),
    (
        5,
        "SMS - Stát má sloužit",
        &["SMS - Stat ma slouzit", "SMS", "SMSka", "SMS – Stát Má Sloužit"],
    ),
    (
        6,
        "Svoboda a přímá demokracie (SPD)",
        &[
            "SPD",
            "Svoboda a prima demokracie (SPD)",
            "Svoboda a pr. demokracie (SPD)",
        ],
    ),
    (
        7,
        "ČSSD - Česká suverenita sociální demokracie",
        &[
            "CSSD - Ceska suverenita socialni demokracie",
            "Ceska str.socialne demokrat.",
            "ČSSD",
            "CSSD",
        ],
    ),
    (
        8,
        "Přísaha občanské hnutí",
        &[
            "Prisaha obcanske hnuti",
            "PRISAHA Roberta Slachty",
            "Prisaha",
            "PŘÍSAHA",
        ],
    ),
    (9, "Levice", &["LEVICE"]),
    (
        10,
        "Česká republika na 1. místě",
        &[
            "Ceska republika na 1. miste",
            "Ceska republika na 1. miste!",
            "ČR1",
            "CR1",
        ],
    ),
    (
        11,
        "Spolu (ODS, KDU-ČSL, TOP 09)",
        &[
            "Spolu",
            "SPOLU",
            "SPOLU - ODS, KDU-CSL, TOP 09",
            "SPOLU (ODS, KDU-CSL, TOP 09)",
        ],
    ),
    (
        12,
        "Švýcarská demokracie",
        &["Svycarska demokracie", "Švýcarská dem.", "ŠVÝCARSKÁ DEMOKRACIE"],
    ),
    (
        13,
        "Nevolte Urza.cz.",
        &[
            "Nevolte Urza.cz",
            "Urza.cz: Nechceme vase hlasy",
            "Nevolte Urza",
            "Nevolte Urza cz",
        ],
    ),
    (
        14,
        "Hnutí občanů a podnikatelů",
        &[
            "Hnuti obcanu a podnikatelu",
            "HOP",
            "HOP Hydra",
            "Hnutí občanů a podnikatelů (HOP Hydra)",
        ],
    ),
    (15, "Hnutí Generace", &["Hnuti Generace", "Generace"]),
    (
        16,
        "Česká pirátská strana",
        &[
            "Ceska piratska strana",
            "Piratska strana",
            "Pirati",
            "PIRATI",
            "PIRATI a STAROSTOVE",
        ],
    ),
    (
        17,
        "Koruna česká (monarchistická strana Čech Moravy a Slezska)",
        &[
            "Koruna Ceska (monarch.strana)",
            "Koruna ceska",
            "Koruna Ceska (monarch.strana Cech, Moravy a Slezska)",
        ],
    ),
    (18, "Volt Česko", &["Volt Cesko", "Volt"]),
    (
        19,
        "Volte Pravý Blok",
        &["Volte Pravy Blok", "Volte Pravý Blok www.cibulka.net", "Pravy Blok"],
    ),
    (
        20,
        "Motoristé sobě",
        &["Motoriste sobe", "Motoriste", "AUTO", "Motoriste sobe!"],
    ),
    (
        21,
        "Balbínova poetická strana",
        &["Balbinova poeticka strana", "Balbinova", "BPS"],
    ),
    (22, "ANO 2011", &["ANO"]),
    (
        23,
        "Starostové a nezávislí",
        &[
            "Starostove a nezavisli",
            "STAN",
            "STAROSTOVE",
            "Starostove",
            "PIRATI a STAROSTOVE",
        ],
    ),
    (24, "Hnutí Kruh", &["Hnuti Kruh", "Kruh"]),
    (25, "Stačilo!", &["Stacilo!", "STACILO!", "Stacilo"]),
    (
        26,
        "Voluntia",
        &[
            "Voluntia, protoze dobrovol. je zakl. kamenem spol.",
            "Voluntia, protože dobrovol. je zákl. kamenem spol.",
            "Voluntia.cz",
        ],
    ),
];

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'ä' => 'a',
        'č' => 'c',
        'ď' => 'd',
        'é' | 'ě' => 'e',
        'í' => 'i',
        'ĺ' | 'ľ' => 'l',
        'ň' => 'n',
        'ó' | 'ô' | 'ö' => 'o',
        'ŕ' | 'ř' => 'r',
        'š' => 's',
        'ť' => 't',
        'ú' | 'ů' | 'ü' => 'u',
        'ý' => 'y',
        'ž' => 'z',
        other => other,
    }
}

/// Comparison key for a party label: ASCII-folded, lower-case alphanumerics only
pub fn normalize_key(label: &str) -> String {
    label
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn lookup() -> &'static HashMap<String, &'static str> {
    static LOOKUP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();
    LOOKUP.get_or_init(|| {
        let mut map = HashMap::new();
        for (_, official, aliases) in PARTY_CATALOG_2025 {
            map.insert(normalize_key(official), *official);
            for alias in aliases.iter() {
                map.insert(normalize_key(alias), *official);
            }
        }
        map
    })
}

/// Whether labels for `year` should be mapped to official names
pub fn applies_to(year: i32) -> bool {
    year >= CANONICAL_FROM_YEAR
}

/// Official 2025 name for `label`, or `label` itself when unknown
pub fn canonical_party_name(label: &str) -> String {
    lookup()
        .get(&normalize_key(label))
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| label.to_string())
}

/// Ballot draw number of an official (or aliased) 2025 name
pub fn official_draw_number(label: &str) -> Option<u32> {
    let official = canonical_party_name(label);
    PARTY_CATALOG_2025
        .iter()
        .find(|(_, name, _)| *name == official)
        .map(|(number, _, _)| *number)
}

/// Merge seat rows whose labels share a canonical name, summing mandates.
///
/// The last non-empty colour wins; output is sorted by mandates descending.
pub fn aggregate_seats(seats: Vec<SeatAllocation>) -> Vec<SeatAllocation> {
    let mut merged: Vec<SeatAllocation> = Vec::with_capacity(seats.len());
    for seat in seats {
        let party = canonical_party_name(&seat.party);
        let color = seat.color.filter(|c| !c.is_empty());
        match merged.iter_mut().find(|s| s.party == party) {
            Some(existing) => {
                existing.mandates = existing.mandates.saturating_add(seat.mandates);
                if color.is_some() {
                    existing.color = color;
                }
            }
            None => merged.push(SeatAllocation {
                party,
                mandates: seat.mandates,
                color,
            }),
        }
    }
    merged.sort_by(|a, b| b.mandates.cmp(&a.mandates));
    merged
}

//! Plain-text rendering of result lists and detail panels.

use std::fmt::Write as _;

use festival_map_festival_models::FestivalRecord;
use festival_map_geography::resolve_record;
use festival_map_server_models::{ApiFestivalCard, ApiFestivalDetail};

const NAME_WIDTH: usize = 40;
const PLACE_WIDTH: usize = 24;

/// Renders the results list as a table followed by the count.
#[must_use]
pub fn format_list(records: &[&FestivalRecord]) -> String {
    let mut out = String::new();

    if records.is_empty() {
        out.push_str("No festivals match these filters.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<12} {:<NAME_WIDTH$} {:<PLACE_WIDTH$} {:<PLACE_WIDTH$} PERIOD",
        "ID", "NAME", "COMMUNE", "DEPARTMENT"
    );
    let _ = writeln!(out, "{}", "-".repeat(130));

    for card in records.iter().copied().map(ApiFestivalCard::from) {
        let _ = writeln!(
            out,
            "{:<12} {:<NAME_WIDTH$} {:<PLACE_WIDTH$} {:<PLACE_WIDTH$} {}",
            truncate(&card.id.to_string(), 12),
            truncate(&card.name, NAME_WIDTH),
            truncate(&card.commune, PLACE_WIDTH),
            truncate(&card.department, PLACE_WIDTH),
            card.period
        );
    }

    let _ = write!(out, "\n{} festival(s)\n", records.len());
    out
}

/// Renders the detail panel of one festival.
#[must_use]
pub fn format_detail(record: &FestivalRecord) -> String {
    let detail = ApiFestivalDetail::from(record);
    let mut out = String::new();

    let _ = writeln!(out, "{}", detail.card.name);
    let _ = writeln!(out, "{}", "=".repeat(detail.card.name.chars().count()));
    let _ = writeln!(out, "Commune:      {}", detail.card.commune);
    let _ = writeln!(out, "Département:  {}", detail.card.department);
    let _ = writeln!(out, "Région:       {}", detail.region);
    let _ = writeln!(out, "Période:      {}", detail.card.period);

    let extras = [
        ("Genre:       ", detail.genre),
        ("Création:    ", detail.creation_year),
        ("Site web:    ", detail.website.map(|link| link.href)),
        ("Email:       ", detail.email),
        ("Adresse:     ", detail.address),
    ];
    for (label, value) in extras {
        if let Some(value) = value {
            let _ = writeln!(out, "{label} {value}");
        }
    }

    match resolve_record(record) {
        Some(c) => {
            let _ = writeln!(out, "Coordonnées:  {:.5}, {:.5}", c.lat, c.lng);
        }
        None => out.push_str("Coordonnées:  absentes de la carte\n"),
    }

    out
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let kept: String = value.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        value.to_string()
    }
}

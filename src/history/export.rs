use anyhow::Context;
use time::macros::format_description;
use time::UtcOffset;

use super::repo_types::HistoryEntry;

pub const CSV_HEADER: &str =
    "Date,Time,Food,Portion (g),Servings,Calories,Protein (g),Carbs (g),Fat (g),Confidence";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row(e: &HistoryEntry) -> anyhow::Result<String> {
    let at = e.created_at.to_offset(UtcOffset::UTC);
    let date = at
        .format(format_description!("[year]-[month]-[day]"))
        .context("format entry date")?;
    let clock = at
        .format(format_description!("[hour]:[minute]"))
        .context("format entry time")?;
    Ok(format!(
        "{},{},{},{},{},{},{},{},{},{}%",
        date,
        clock,
        quote(&e.display_name),
        e.portion.grams,
        e.portion.servings,
        e.calories,
        e.macros.protein,
        e.macros.carbs,
        e.macros.fat,
        (e.confidence * 100.0).round() as i64,
    ))
}

/// Header plus one line per entry, `\n`-separated, no trailing newline.
pub fn to_csv(entries: &[HistoryEntry]) -> anyhow::Result<String> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for e in entries {
        lines.push(csv_row(e)?);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod export_tests {
    use super::*;
    use crate::history::store::test_support::entry;
    use time::macros::datetime;

    #[test]
    fn empty_history_is_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv, CSV_HEADER);
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn renders_one_row_per_entry() {
        let mut e = entry("Apple", 0);
        e.created_at = datetime!(2025-03-07 08:05:59 UTC);
        e.portion.grams = 250.0;
        e.portion.servings = 2.5;
        e.calories = 130;
        e.confidence = 0.876;

        let csv = to_csv(&[e]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2025-03-07,08:05,\"Apple\",250,2.5,130,0.5,21,0.3,88%");
    }

    #[test]
    fn food_names_are_always_quoted_and_escaped() {
        let mut e = entry("Mom's \"famous\" chili, extra hot", 0);
        e.confidence = 1.0;
        let csv = to_csv(&[e]).unwrap();
        assert!(csv.contains(",\"Mom's \"\"famous\"\" chili, extra hot\","));
        assert!(csv.ends_with(",100%"));
    }

    #[test]
    fn times_are_written_in_utc() {
        let mut e = entry("Pizza", 0);
        e.created_at = datetime!(2025-03-07 23:30 -2);
        let csv = to_csv(&[e]).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("2025-03-08,01:30,"));
    }
}

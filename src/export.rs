use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::merge::keeper_records;
use crate::model::{AggregationResult, PlayerRecord};

const PLAYER_HEADER: &[&str] = &[
    "Player",
    "Position",
    "Team",
    "Goals",
    "Assists",
    "xG",
    "Pass %",
    "Tackles",
    "Interceptions",
    "Saves",
    "Save %",
    "GA/90",
    "Rating",
    "Sources",
    "Score",
];

fn player_row(record: &PlayerRecord) -> Vec<String> {
    vec![
        record.player_name.clone(),
        record.position.clone().unwrap_or_default(),
        record.team_name.clone().unwrap_or_default(),
        format!("{:.0}", record.goals),
        format!("{:.0}", record.assists),
        format!("{:.2}", record.expected_goals),
        format!("{:.1}", record.pass_completion_pct),
        format!("{:.0}", record.tackles),
        format!("{:.0}", record.interceptions),
        format!("{:.0}", record.saves),
        format!("{:.1}", record.save_pct),
        format!("{:.2}", record.goals_against_per90),
        format!("{:.2}", record.rating),
        record
            .source_list
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("+"),
        format!("{:.2}", record.performance_score),
    ]
}

/// Plain CSV sink for one collection result.
pub fn export_csv(path: &Path, result: &AggregationResult) -> Result<()> {
    let mut out = String::new();
    writeln_csv(&mut out, PLAYER_HEADER.iter().map(|s| s.to_string()));
    for record in &result.records {
        writeln_csv(&mut out, player_row(record).into_iter());
    }
    fs::write(path, out).with_context(|| format!("write csv export to {}", path.display()))
}

fn writeln_csv(out: &mut String, fields: impl Iterator<Item = String>) {
    let line = fields
        .map(|field| {
            if field.contains(',') || field.contains('"') {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(out, "{line}");
}

/// Workbook sink: one sheet of ranked players, one keeper-only sheet.
pub fn export_xlsx(path: &Path, result: &AggregationResult) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(format!("{} Top", result.league.label()))
        .context("name players sheet")?;
    write_rows(
        sheet,
        PLAYER_HEADER,
        result.records.iter().map(player_row),
    )?;

    let keepers = workbook.add_worksheet();
    keepers.set_name("Keepers").context("name keepers sheet")?;
    write_rows(
        keepers,
        &["Player", "Team", "Saves", "Save %", "GA/90"],
        keeper_records(&result.records).iter().map(|k| {
            vec![
                k.player_name.clone(),
                k.team_name.clone().unwrap_or_default(),
                format!("{:.0}", k.saves),
                format!("{:.1}", k.save_pct),
                format!("{:.2}", k.goals_against_per90),
            ]
        }),
    )?;

    workbook
        .save(path)
        .with_context(|| format!("write xlsx export to {}", path.display()))?;
    Ok(())
}

fn write_rows(
    sheet: &mut rust_xlsxwriter::Worksheet,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<()> {
    for (col, title) in header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *title)
            .context("write header cell")?;
    }
    for (row_idx, row) in rows.enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string(row_idx as u32 + 1, col as u16, value)
                .context("write data cell")?;
        }
    }
    Ok(())
}

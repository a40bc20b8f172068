use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::records::TeamRecord;
use crate::standings::RankedTeam;
use crate::table::TABLE_COLUMNS;

pub struct ExportReport {
    pub standings_rows: usize,
    pub career_rows: usize,
}

/// Write one season's resolved table (and optionally the all-time career
/// totals) to a workbook for download or archiving.
pub fn export_season_workbook(
    path: &Path,
    season: u16,
    rows: &[RankedTeam],
    career: &[TeamRecord],
) -> Result<ExportReport> {
    let mut standings_rows = vec![TABLE_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>()];
    for r in rows {
        standings_rows.push(vec![
            r.division.clone(),
            r.nickname.clone(),
            r.win_total.to_string(),
            r.loss_total.to_string(),
            r.tie_total.to_string(),
            r.games_played.to_string(),
            format!("{:.3}", r.win_pct),
            format!("{:.2}", r.points_for),
            format!("{:.2}", r.points_against),
            format!("{:.2}", r.avg_margin),
            r.division_rank.to_string(),
            r.playoff_seed.map(|s| s.to_string()).unwrap_or_default(),
        ]);
    }

    let mut career_rows = vec![vec![
        "Nickname".to_string(),
        "Wins".to_string(),
        "Losses".to_string(),
        "Ties".to_string(),
        "Games".to_string(),
        "Win %".to_string(),
        "Points For".to_string(),
        "Points Against".to_string(),
        "Avg Margin".to_string(),
    ]];
    for r in career {
        career_rows.push(vec![
            r.nickname.clone(),
            r.win_total.to_string(),
            r.loss_total.to_string(),
            r.tie_total.to_string(),
            r.games_played.to_string(),
            format!("{:.3}", r.win_pct),
            format!("{:.2}", r.points_for),
            format!("{:.2}", r.points_against),
            format!("{:.2}", r.avg_margin),
        ]);
    }

    let mut workbook = Workbook::new();

    let standings_sheet = workbook.add_worksheet();
    standings_sheet.set_name(format!("{season} Standings"))?;
    write_rows(standings_sheet, &standings_rows)?;

    if !career.is_empty() {
        let career_sheet = workbook.add_worksheet();
        career_sheet.set_name("All-Time")?;
        write_rows(career_sheet, &career_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        standings_rows: rows.len(),
        career_rows: career.len(),
    })
}

fn write_rows(sheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write(r as u32, c as u16, cell.as_str())?;
        }
    }
    Ok(())
}

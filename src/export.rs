use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analysis;
use crate::dataset::{Dataset, MatchRecord};
use crate::outcome::Outcome;
use crate::state::TOP_WINNERS_SHOWN;

pub struct ExportReport {
    pub matches: usize,
    pub teams: usize,
    pub dimensions: usize,
    pub rejected_rows: usize,
}

pub fn export_report(path: &Path, dataset: &Dataset) -> Result<ExportReport> {
    let view = dataset.view();
    let totals = analysis::league_totals(view.iter().copied());
    let dimensions = analysis::dimension_breakdowns(&view);
    let winners = analysis::top_winners(view.iter().copied(), TOP_WINNERS_SHOWN);
    let teams = dataset.teams();

    let mut overview_rows = vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec![
            "Generated".to_string(),
            Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        ],
        vec!["Matches".to_string(), totals.matches.to_string()],
        vec!["Goals".to_string(), totals.goals.to_string()],
        vec![
            "Goals per match".to_string(),
            totals
                .goals_per_match()
                .map(|avg| format!("{avg:.2}"))
                .unwrap_or_default(),
        ],
        vec!["Teams".to_string(), teams.len().to_string()],
        vec![
            "Rows rejected on load".to_string(),
            dataset.report.rows_rejected.to_string(),
        ],
    ];
    overview_rows.push(Vec::new());
    overview_rows.push(vec![
        "Dimension".to_string(),
        "Outcome".to_string(),
        "Count".to_string(),
        "Percent".to_string(),
        "Population".to_string(),
    ]);
    for entry in &dimensions {
        for outcome in Outcome::ALL {
            overview_rows.push(vec![
                entry.title.to_string(),
                outcome.label().to_string(),
                entry.breakdown.count(outcome).to_string(),
                entry
                    .breakdown
                    .percentage(outcome)
                    .map(|pct| format!("{pct:.1}"))
                    .unwrap_or_else(|| "insufficient".to_string()),
                entry.breakdown.population.to_string(),
            ]);
        }
    }

    let mut winners_rows = vec![vec![
        "Rank".to_string(),
        "Team".to_string(),
        "Wins".to_string(),
    ]];
    for (idx, winner) in winners.iter().enumerate() {
        winners_rows.push(vec![
            (idx + 1).to_string(),
            winner.team.clone(),
            winner.wins.to_string(),
        ]);
    }

    let mut splits_rows = vec![vec![
        "Team".to_string(),
        "Outcome".to_string(),
        "Home".to_string(),
        "Away".to_string(),
    ]];
    for team in &teams {
        let split = analysis::home_away_split(view.iter().copied(), team);
        for row in &split.rows {
            splits_rows.push(vec![
                team.clone(),
                row.outcome.label().to_string(),
                row.home.to_string(),
                row.away.to_string(),
            ]);
        }
    }

    let mut matches_rows = vec![
        [
            "Round",
            "Date",
            "Venue",
            "Home",
            "HG",
            "AG",
            "Away",
            "Winner",
            "Home poss %",
            "Away poss %",
            "Home shots",
            "Away shots",
            "Home on target",
            "Away on target",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<String>>(),
    ];
    for record in &view {
        matches_rows.push(match_row(record));
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Overview")?;
        write_rows(sheet, &overview_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopWinners")?;
        write_rows(sheet, &winners_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TeamSplits")?;
        write_rows(sheet, &splits_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &matches_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        matches: view.len(),
        teams: teams.len(),
        dimensions: dimensions.len(),
        rejected_rows: dataset.report.rows_rejected,
    })
}

fn match_row(record: &MatchRecord) -> Vec<String> {
    vec![
        opt_to_string(record.round),
        record
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        record.venue.clone().unwrap_or_default(),
        record.home.clone(),
        record.home_score.to_string(),
        record.away_score.to_string(),
        record.away.clone(),
        record.winner.clone(),
        opt_number(record.home_possession),
        opt_number(record.away_possession),
        opt_number(record.home_shots),
        opt_number(record.away_shots),
        opt_number(record.home_shots_on_target),
        opt_number(record.away_shots_on_target),
    ]
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.0}")).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

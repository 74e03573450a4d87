use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::Serialize;

use brasileirao_terminal::analysis::{
    self, DimensionBreakdown, HomeAwaySplit, LeagueTotals, OutcomeBreakdown, OutcomePercentages,
    TopWinner,
};
use brasileirao_terminal::config;
use brasileirao_terminal::dataset::{self, Dataset};
use brasileirao_terminal::demo;
use brasileirao_terminal::export;

#[derive(Serialize)]
struct ReportDocument {
    source: String,
    matches: usize,
    rows_rejected: usize,
    totals: LeagueTotals,
    goals_per_match: Option<f64>,
    top_winners: Vec<TopWinner>,
    dimensions: Vec<DimensionDoc>,
    team: Option<TeamDoc>,
}

#[derive(Serialize)]
struct DimensionDoc {
    title: String,
    breakdown: OutcomeBreakdown,
    percentages: Option<OutcomePercentages>,
}

#[derive(Serialize)]
struct TeamDoc {
    team: String,
    summary: OutcomeBreakdown,
    percentages: Option<OutcomePercentages>,
    split: HomeAwaySplit,
    dimensions: Vec<DimensionDoc>,
}

// Headless counterpart of the TUI: prints the same aggregates to stdout
// (or JSON with --json) and optionally writes the workbook.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = config::app_config();

    let (dataset, source) = if config.demo {
        (demo::demo_dataset(demo::DEFAULT_SEED), "demo".to_string())
    } else {
        let path = parse_path_arg("--csv").unwrap_or_else(|| config.csv_path.clone());
        let dataset = dataset::load_dataset(&path)?;
        (dataset, path.display().to_string())
    };

    let team = parse_value_arg("--team");
    if let Some(team) = &team {
        let teams = dataset.teams();
        if !teams.iter().any(|t| t == team) {
            return Err(anyhow!(
                "club '{team}' not found; known clubs: {}",
                teams.join(", ")
            ));
        }
    }
    let top = match parse_value_arg("--top") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| anyhow!("--top expects a number, got '{raw}'"))?,
        None => 5,
    };

    let view = dataset.view();
    let totals = analysis::league_totals(view.iter().copied());
    let document = ReportDocument {
        source,
        matches: dataset.matches.len(),
        rows_rejected: dataset.report.rows_rejected,
        goals_per_match: totals.goals_per_match(),
        totals,
        top_winners: analysis::top_winners(view.iter().copied(), top),
        dimensions: dimension_docs(&analysis::dimension_breakdowns(&view)),
        team: team.as_deref().map(|name| team_doc(&dataset, name)),
    };

    if has_flag("--json") {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print_text(&document);
    }

    if has_flag("--xlsx") {
        let path = parse_path_arg("--xlsx").unwrap_or_else(|| config.export_path.clone());
        let report = export::export_report(&path, &dataset)?;
        println!();
        println!(
            "Workbook: {} ({} matches, {} clubs, {} dimensions)",
            path.display(),
            report.matches,
            report.teams,
            report.dimensions
        );
    }

    Ok(())
}

fn dimension_docs(entries: &[DimensionBreakdown]) -> Vec<DimensionDoc> {
    entries
        .iter()
        .map(|entry| DimensionDoc {
            title: entry.title.to_string(),
            breakdown: entry.breakdown,
            percentages: entry.breakdown.percentages(),
        })
        .collect()
}

fn team_doc(dataset: &Dataset, team: &str) -> TeamDoc {
    let involved = dataset.involving(team);
    let summary = analysis::team_summary(involved.iter().copied(), team);
    TeamDoc {
        team: team.to_string(),
        summary,
        percentages: summary.percentages(),
        split: analysis::home_away_split(involved.iter().copied(), team),
        dimensions: dimension_docs(&analysis::dimension_breakdowns(&involved)),
    }
}

fn print_text(document: &ReportDocument) {
    println!("Brasileirao season report ({})", document.source);
    println!(
        "Matches: {} ({} rows rejected)",
        document.matches, document.rows_rejected
    );
    println!("Goals: {}", document.totals.goals);
    if let Some(avg) = document.goals_per_match {
        println!("Goals per match: {avg:.2}");
    }

    println!();
    println!("Top winners:");
    if document.top_winners.is_empty() {
        println!("  (no wins recorded)");
    }
    for (idx, winner) in document.top_winners.iter().enumerate() {
        println!("  {}. {} ({} wins)", idx + 1, winner.team, winner.wins);
    }

    println!();
    for dim in &document.dimensions {
        print_dimension("", dim);
    }

    if let Some(team) = &document.team {
        println!();
        println!("Club: {}", team.team);
        println!(
            "  Played {} | W {} D {} L {}",
            team.summary.population, team.summary.wins, team.summary.draws, team.summary.losses
        );
        println!("  Home/Away:");
        for row in &team.split.rows {
            println!(
                "    {:<5} home {:>3} away {:>3}",
                row.outcome.label(),
                row.home,
                row.away
            );
        }
        for dim in &team.dimensions {
            print_dimension("  ", dim);
        }
    }
}

fn print_dimension(indent: &str, dim: &DimensionDoc) {
    match &dim.percentages {
        Some(pct) => println!(
            "{indent}{:<24} W {:>5.1}%  D {:>5.1}%  L {:>5.1}%  (n={})",
            dim.title, pct.win, pct.draw, pct.loss, dim.breakdown.population
        ),
        None => println!("{indent}{:<24} insufficient data", dim.title),
    }
}

fn parse_value_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            let trimmed = next.trim();
            if !trimmed.is_empty() && !trimmed.starts_with("--") {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    parse_value_arg(flag).map(PathBuf::from)
}

fn has_flag(flag: &str) -> bool {
    let prefix = format!("{flag}=");
    std::env::args()
        .skip(1)
        .any(|arg| arg == flag || arg.starts_with(&prefix))
}

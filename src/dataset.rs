use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use crate::outcome::DRAW_SENTINEL;

const COL_ROUND: &str = "rodada";
const COL_DATE: &str = "data";
const COL_VENUE: &str = "arena";
const COL_HOME: &str = "mandante";
const COL_AWAY: &str = "visitante";
const COL_WINNER: &str = "vencedor";
const COL_HOME_SCORE: &str = "mandante_placar";
const COL_AWAY_SCORE: &str = "visitante_placar";
const COL_HOME_POSSESSION: &str = "mandante_posse_de_bola";
const COL_AWAY_POSSESSION: &str = "visitante_posse_de_bola";
const COL_HOME_SHOTS: &str = "mandante_chutes";
const COL_AWAY_SHOTS: &str = "visitante_chutes";
const COL_HOME_SHOTS_ON_TARGET: &str = "mandante_chutes_no_alvo";
const COL_AWAY_SHOTS_ON_TARGET: &str = "visitante_chutes_no_alvo";

const MAX_WARNINGS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub round: Option<u32>,
    pub date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub home: String,
    pub away: String,
    /// Winner team name, or `DRAW_SENTINEL` for a draw.
    pub winner: String,
    pub home_score: u32,
    pub away_score: u32,
    pub home_possession: Option<f64>,
    pub away_possession: Option<f64>,
    pub home_shots: Option<f64>,
    pub away_shots: Option<f64>,
    pub home_shots_on_target: Option<f64>,
    pub away_shots_on_target: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_rejected: usize,
    pub warnings: Vec<String>,
}

impl LoadReport {
    fn reject(&mut self, row: usize, reason: String) {
        self.rows_rejected += 1;
        if self.warnings.len() < MAX_WARNINGS {
            self.warnings.push(format!("row {row}: {reason}"));
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub matches: Vec<MatchRecord>,
    pub report: LoadReport,
}

impl Dataset {
    pub fn from_records(matches: Vec<MatchRecord>) -> Self {
        let report = LoadReport {
            rows_read: matches.len(),
            rows_kept: matches.len(),
            ..LoadReport::default()
        };
        Self { matches, report }
    }

    pub fn teams(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for record in &self.matches {
            names.insert(record.home.as_str());
            names.insert(record.away.as_str());
        }
        names.into_iter().map(str::to_string).collect()
    }

    pub fn view(&self) -> Vec<&MatchRecord> {
        self.matches.iter().collect()
    }

    pub fn involving(&self, team: &str) -> Vec<&MatchRecord> {
        self.matches
            .iter()
            .filter(|record| record.home == team || record.away == team)
            .collect()
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file =
        File::open(path).with_context(|| format!("failed to open dataset {}", path.display()))?;
    read_dataset(file).with_context(|| format!("failed to read dataset {}", path.display()))
}

pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers().context("failed to read csv header")?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut report = LoadReport::default();
    let mut matches = Vec::new();
    for (idx, row) in csv_reader.records().enumerate() {
        report.rows_read += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                report.reject(idx + 1, format!("unreadable row: {err}"));
                continue;
            }
        };
        match parse_match_row(&columns, &row) {
            Ok(record) => {
                report.rows_kept += 1;
                matches.push(record);
            }
            Err(reason) => report.reject(idx + 1, reason),
        }
    }
    Ok(Dataset { matches, report })
}

struct ColumnMap {
    round: Option<usize>,
    date: Option<usize>,
    venue: Option<usize>,
    home: usize,
    away: usize,
    winner: usize,
    home_score: usize,
    away_score: usize,
    home_possession: Option<usize>,
    away_possession: Option<usize>,
    home_shots: Option<usize>,
    away_shots: Option<usize>,
    home_shots_on_target: Option<usize>,
    away_shots_on_target: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            index.entry(normalize_header(name)).or_insert(i);
        }
        let require = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| anyhow!("missing required column '{name}'"))
        };
        let optional = |name: &str| index.get(name).copied();
        Ok(Self {
            round: optional(COL_ROUND),
            date: optional(COL_DATE),
            venue: optional(COL_VENUE),
            home: require(COL_HOME)?,
            away: require(COL_AWAY)?,
            winner: require(COL_WINNER)?,
            home_score: require(COL_HOME_SCORE)?,
            away_score: require(COL_AWAY_SCORE)?,
            home_possession: optional(COL_HOME_POSSESSION),
            away_possession: optional(COL_AWAY_POSSESSION),
            home_shots: optional(COL_HOME_SHOTS),
            away_shots: optional(COL_AWAY_SHOTS),
            home_shots_on_target: optional(COL_HOME_SHOTS_ON_TARGET),
            away_shots_on_target: optional(COL_AWAY_SHOTS_ON_TARGET),
        })
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn parse_match_row(columns: &ColumnMap, row: &csv::StringRecord) -> Result<MatchRecord, String> {
    let field = |idx: usize| row.get(idx).unwrap_or("").trim();
    let optional = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::trim);

    let home = field(columns.home).to_string();
    let away = field(columns.away).to_string();
    if home.is_empty() || away.is_empty() {
        return Err("missing team name".into());
    }

    let winner = field(columns.winner).to_string();
    if winner != DRAW_SENTINEL && winner != home && winner != away {
        return Err(format!("winner '{winner}' names neither side"));
    }

    let home_score = parse_score(field(columns.home_score))
        .ok_or_else(|| format!("bad home score '{}'", field(columns.home_score)))?;
    let away_score = parse_score(field(columns.away_score))
        .ok_or_else(|| format!("bad away score '{}'", field(columns.away_score)))?;

    Ok(MatchRecord {
        round: optional(columns.round).and_then(|s| s.parse().ok()),
        date: optional(columns.date).and_then(parse_match_date),
        venue: optional(columns.venue)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        home,
        away,
        winner,
        home_score,
        away_score,
        home_possession: optional(columns.home_possession).and_then(parse_percent),
        away_possession: optional(columns.away_possession).and_then(parse_percent),
        home_shots: optional(columns.home_shots).and_then(parse_number),
        away_shots: optional(columns.away_shots).and_then(parse_number),
        home_shots_on_target: optional(columns.home_shots_on_target).and_then(parse_number),
        away_shots_on_target: optional(columns.away_shots_on_target).and_then(parse_number),
    })
}

/// Empty cells, the dash placeholder and unparseable text all read as missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    s.parse::<f64>().ok()
}

pub fn parse_percent(raw: &str) -> Option<f64> {
    parse_number(raw.trim().trim_end_matches('%'))
}

fn parse_score(raw: &str) -> Option<u32> {
    let value = parse_number(raw)?;
    if value >= 0.0 && value.fract() == 0.0 {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d/%m/%y"];
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

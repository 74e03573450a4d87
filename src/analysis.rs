use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::MatchRecord;
use crate::outcome::{self, DRAW_SENTINEL, Outcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBreakdown {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub population: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomePercentages {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl OutcomeBreakdown {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
        self.population += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Win => self.wins,
            Outcome::Draw => self.draws,
            Outcome::Loss => self.losses,
        }
    }

    pub fn percentage(&self, outcome: Outcome) -> Option<f64> {
        if self.population == 0 {
            return None;
        }
        Some(self.count(outcome) as f64 * 100.0 / self.population as f64)
    }

    pub fn percentages(&self) -> Option<OutcomePercentages> {
        if self.population == 0 {
            return None;
        }
        let share = |count: usize| count as f64 * 100.0 / self.population as f64;
        Some(OutcomePercentages {
            win: share(self.wins),
            draw: share(self.draws),
            loss: share(self.losses),
        })
    }

    pub fn is_insufficient(&self) -> bool {
        self.population == 0
    }
}

pub fn outcome_distribution<'a, I, F>(matches: I, mut team_of_interest: F) -> OutcomeBreakdown
where
    I: IntoIterator<Item = &'a MatchRecord>,
    F: FnMut(&'a MatchRecord) -> Option<&'a str>,
{
    let mut breakdown = OutcomeBreakdown::default();
    for record in matches {
        let Some(team) = team_of_interest(record) else {
            continue;
        };
        let Some(outcome) = outcome::classify(record, team) else {
            continue;
        };
        breakdown.record(outcome);
    }
    breakdown
}

pub fn involving<'r>(record: &'r MatchRecord, team: &str) -> Option<&'r str> {
    if record.home == team {
        Some(record.home.as_str())
    } else if record.away == team {
        Some(record.away.as_str())
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatDimension {
    Possession,
    Shots,
    ShotsOnTarget,
    CounterAttack,
}

impl StatDimension {
    pub const ALL: [StatDimension; 4] = [
        StatDimension::Possession,
        StatDimension::Shots,
        StatDimension::ShotsOnTarget,
        StatDimension::CounterAttack,
    ];

    pub fn title(self) -> &'static str {
        match self {
            StatDimension::Possession => "Higher possession",
            StatDimension::Shots => "More shots",
            StatDimension::ShotsOnTarget => "More shots on target",
            StatDimension::CounterAttack => "Counter-attack profile",
        }
    }

    /// Side this dimension points at, or `None` on ties and missing stats.
    /// Only the stats the dimension itself needs are consulted, so a match
    /// with no possession numbers still counts toward the shots lenses.
    pub fn team_of_interest<'r>(self, record: &'r MatchRecord) -> Option<&'r str> {
        match self {
            StatDimension::Possession => {
                strict_leader(record, record.home_possession, record.away_possession)
            }
            StatDimension::Shots => strict_leader(record, record.home_shots, record.away_shots),
            StatDimension::ShotsOnTarget => strict_leader(
                record,
                record.home_shots_on_target,
                record.away_shots_on_target,
            ),
            StatDimension::CounterAttack => counter_attack_side(record),
        }
    }
}

fn strict_leader(record: &MatchRecord, home: Option<f64>, away: Option<f64>) -> Option<&str> {
    let home_value = home?;
    let away_value = away?;
    if home_value > away_value {
        Some(record.home.as_str())
    } else if away_value > home_value {
        Some(record.away.as_str())
    } else {
        None
    }
}

fn counter_attack_side(record: &MatchRecord) -> Option<&str> {
    let home_possession = record.home_possession?;
    let away_possession = record.away_possession?;
    let home_shots = record.home_shots?;
    let away_shots = record.away_shots?;
    if home_possession < away_possession && home_shots > away_shots {
        Some(record.home.as_str())
    } else if away_possession < home_possession && away_shots > home_shots {
        Some(record.away.as_str())
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionBreakdown {
    pub dimension: StatDimension,
    pub title: &'static str,
    pub breakdown: OutcomeBreakdown,
}

/// One breakdown per dimension, in `StatDimension::ALL` order.
pub fn dimension_breakdowns(matches: &[&MatchRecord]) -> Vec<DimensionBreakdown> {
    StatDimension::ALL
        .iter()
        .map(|&dimension| DimensionBreakdown {
            dimension,
            title: dimension.title(),
            breakdown: outcome_distribution(matches.iter().copied(), |record| {
                dimension.team_of_interest(record)
            }),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HomeAwayRow {
    pub outcome: Outcome,
    pub home: usize,
    pub away: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HomeAwaySplit {
    pub rows: [HomeAwayRow; 3],
}

impl HomeAwaySplit {
    fn zeroed() -> Self {
        Self {
            rows: Outcome::ALL.map(|outcome| HomeAwayRow {
                outcome,
                home: 0,
                away: 0,
            }),
        }
    }

    pub fn row(&self, outcome: Outcome) -> &HomeAwayRow {
        &self.rows[outcome.index()]
    }
}

pub fn home_away_split<'a, I>(matches: I, team: &str) -> HomeAwaySplit
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut split = HomeAwaySplit::zeroed();
    for record in matches {
        let Some(outcome) = outcome::classify(record, team) else {
            continue;
        };
        let row = &mut split.rows[outcome.index()];
        if record.home == team {
            row.home += 1;
        } else {
            row.away += 1;
        }
    }
    split
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopWinner {
    pub team: String,
    pub wins: usize,
}

pub fn top_winners<'a, I>(matches: I, n: usize) -> Vec<TopWinner>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in matches {
        if record.winner != DRAW_SENTINEL {
            *counts.entry(record.winner.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<TopWinner> = counts
        .into_iter()
        .map(|(team, wins)| TopWinner {
            team: team.to_string(),
            wins,
        })
        .collect();
    ranked.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.team.cmp(&b.team)));
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeagueTotals {
    pub matches: usize,
    pub goals: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl LeagueTotals {
    pub fn goals_per_match(&self) -> Option<f64> {
        if self.matches == 0 {
            return None;
        }
        Some(self.goals as f64 / self.matches as f64)
    }
}

pub fn league_totals<'a, I>(matches: I) -> LeagueTotals
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut totals = LeagueTotals::default();
    for record in matches {
        totals.matches += 1;
        totals.goals += u64::from(record.home_score) + u64::from(record.away_score);
        if let Some(date) = record.date {
            totals.first_date = Some(totals.first_date.map_or(date, |d| d.min(date)));
            totals.last_date = Some(totals.last_date.map_or(date, |d| d.max(date)));
        }
    }
    totals
}

pub fn team_summary<'a, I>(matches: I, team: &str) -> OutcomeBreakdown
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    outcome_distribution(matches, |record| involving(record, team))
}

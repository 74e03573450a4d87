use std::collections::VecDeque;
use std::sync::Arc;

use crate::analysis::{
    self, DimensionBreakdown, HomeAwaySplit, LeagueTotals, OutcomeBreakdown, TopWinner,
};
use crate::dataset::{Dataset, MatchRecord};

pub const TOP_WINNERS_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Team,
    Matches,
}

#[derive(Debug, Clone)]
pub enum Delta {
    DatasetLoaded(Arc<Dataset>),
    Log(String),
}

#[derive(Debug, Clone, Copy)]
pub enum ProviderCommand {
    ReloadDataset,
}

#[derive(Debug, Clone)]
pub struct OverviewStats {
    pub totals: LeagueTotals,
    pub top_winners: Vec<TopWinner>,
    pub dimensions: Vec<DimensionBreakdown>,
}

impl OverviewStats {
    pub fn compute(dataset: &Dataset) -> Self {
        let view = dataset.view();
        Self {
            totals: analysis::league_totals(view.iter().copied()),
            top_winners: analysis::top_winners(view.iter().copied(), TOP_WINNERS_SHOWN),
            dimensions: analysis::dimension_breakdowns(&view),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TeamStats {
    pub team: String,
    pub summary: OutcomeBreakdown,
    pub split: HomeAwaySplit,
    pub dimensions: Vec<DimensionBreakdown>,
}

impl TeamStats {
    pub fn compute(dataset: &Dataset, team: &str) -> Self {
        let involved = dataset.involving(team);
        Self {
            team: team.to_string(),
            summary: analysis::team_summary(involved.iter().copied(), team),
            split: analysis::home_away_split(involved.iter().copied(), team),
            dimensions: analysis::dimension_breakdowns(&involved),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub dataset: Arc<Dataset>,
    pub teams: Vec<String>,
    pub selected: usize,
    pub matches_scroll: u16,
    /// Scope for the matches screen; `None` lists the whole season.
    pub matches_team: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub overview: OverviewStats,
    pub team_view: Option<TeamStats>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let teams = dataset.teams();
        let overview = OverviewStats::compute(&dataset);
        Self {
            screen: Screen::Overview,
            dataset,
            teams,
            selected: 0,
            matches_scroll: 0,
            matches_team: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            overview,
            team_view: None,
        }
    }

    pub fn selected_team(&self) -> Option<&str> {
        self.teams.get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        let total = self.teams.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.teams.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn open_team(&mut self) {
        let Some(team) = self.selected_team().map(str::to_string) else {
            return;
        };
        self.team_view = Some(TeamStats::compute(&self.dataset, &team));
        self.screen = Screen::Team;
    }

    pub fn back_to_overview(&mut self) {
        self.screen = Screen::Overview;
        self.team_view = None;
    }

    pub fn open_matches(&mut self) {
        self.matches_team = match self.screen {
            Screen::Team => self.team_view.as_ref().map(|view| view.team.clone()),
            _ => None,
        };
        self.matches_scroll = 0;
        self.screen = Screen::Matches;
    }

    pub fn visible_matches(&self) -> Vec<&MatchRecord> {
        match &self.matches_team {
            Some(team) => self.dataset.involving(team),
            None => self.dataset.view(),
        }
    }

    pub fn scroll_matches_down(&mut self) {
        let total = self.visible_matches().len();
        if total == 0 {
            self.matches_scroll = 0;
            return;
        }
        let max_scroll = (total - 1).min(u16::MAX as usize) as u16;
        if self.matches_scroll < max_scroll {
            self.matches_scroll += 1;
        }
    }

    pub fn scroll_matches_up(&mut self) {
        self.matches_scroll = self.matches_scroll.saturating_sub(1);
    }

    /// The team selection survives by name when it still exists in the new data.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let previous = self.selected_team().map(str::to_string);
        self.teams = dataset.teams();
        self.selected = previous
            .and_then(|name| self.teams.iter().position(|t| *t == name))
            .unwrap_or(0);
        self.overview = OverviewStats::compute(&dataset);

        if let Some(view) = &self.team_view {
            let team = view.team.clone();
            if self.teams.iter().any(|t| *t == team) {
                self.team_view = Some(TeamStats::compute(&dataset, &team));
            } else {
                self.team_view = None;
                if self.screen == Screen::Team {
                    self.screen = Screen::Overview;
                }
                self.push_log(format!("[WARN] Team '{team}' not in reloaded dataset"));
            }
        }

        self.dataset = dataset;
        if self
            .matches_team
            .as_deref()
            .is_some_and(|team| !self.teams.iter().any(|t| t == team))
        {
            self.matches_team = None;
        }
        let max_scroll = self
            .visible_matches()
            .len()
            .saturating_sub(1)
            .min(u16::MAX as usize) as u16;
        self.matches_scroll = self.matches_scroll.min(max_scroll);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DatasetLoaded(dataset) => state.set_dataset(dataset),
        Delta::Log(msg) => state.push_log(msg),
    }
}

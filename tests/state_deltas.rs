use std::sync::{Arc, mpsc};
use std::time::Duration;

use brasileirao_terminal::cache::DatasetCache;
use brasileirao_terminal::dataset::{Dataset, MatchRecord};
use brasileirao_terminal::provider::spawn_dataset_provider;
use brasileirao_terminal::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

fn played(home: &str, away: &str) -> MatchRecord {
    MatchRecord {
        round: None,
        date: None,
        venue: None,
        home: home.to_string(),
        away: away.to_string(),
        winner: home.to_string(),
        home_score: 1,
        away_score: 0,
        home_possession: None,
        away_possession: None,
        home_shots: None,
        away_shots: None,
        home_shots_on_target: None,
        away_shots_on_target: None,
    }
}

// every home side wins its pairing
fn season(pairs: &[(&str, &str)]) -> Arc<Dataset> {
    let matches = pairs
        .iter()
        .map(|&(home, away)| played(home, away))
        .collect();
    Arc::new(Dataset::from_records(matches))
}

#[test]
fn selection_wraps_in_both_directions() {
    let mut state = AppState::new(season(&[("A", "B"), ("C", "D")]));
    assert_eq!(state.teams, ["A", "B", "C", "D"]);
    assert_eq!(state.selected_team(), Some("A"));

    state.select_prev();
    assert_eq!(state.selected_team(), Some("D"));
    state.select_next();
    assert_eq!(state.selected_team(), Some("A"));
    state.select_next();
    assert_eq!(state.selected_team(), Some("B"));
}

#[test]
fn open_team_computes_the_view() {
    let mut state = AppState::new(season(&[("A", "B")]));
    state.select_next();
    state.open_team();

    assert_eq!(state.screen, Screen::Team);
    let view = state.team_view.as_ref().expect("view should exist");
    assert_eq!(view.team, "B");
    assert_eq!(view.summary.population, 1);
    assert_eq!(view.summary.losses, 1);

    state.back_to_overview();
    assert_eq!(state.screen, Screen::Overview);
    assert!(state.team_view.is_none());
}

#[test]
fn open_team_is_a_no_op_without_teams() {
    let mut state = AppState::new(Arc::new(Dataset::default()));
    state.open_team();
    assert_eq!(state.screen, Screen::Overview);
    assert!(state.team_view.is_none());
}

#[test]
fn reload_keeps_the_selection_by_name() {
    let mut state = AppState::new(season(&[("A", "B"), ("C", "D")]));
    state.select_next();
    assert_eq!(state.selected_team(), Some("B"));

    apply_delta(&mut state, Delta::DatasetLoaded(season(&[("B", "E")])));
    assert_eq!(state.teams, ["B", "E"]);
    assert_eq!(state.selected_team(), Some("B"));
}

#[test]
fn reload_rebinds_a_surviving_team_view() {
    let mut state = AppState::new(season(&[("A", "B")]));
    state.open_team();

    apply_delta(
        &mut state,
        Delta::DatasetLoaded(season(&[("A", "B"), ("B", "A")])),
    );
    let view = state.team_view.as_ref().expect("view should survive");
    assert_eq!(view.team, "A");
    assert_eq!(view.summary.population, 2);
    assert_eq!(state.screen, Screen::Team);
}

#[test]
fn reload_drops_a_vanished_team_view() {
    let mut state = AppState::new(season(&[("A", "B")]));
    state.open_team();
    assert_eq!(state.screen, Screen::Team);

    apply_delta(&mut state, Delta::DatasetLoaded(season(&[("C", "D")])));
    assert!(state.team_view.is_none());
    assert_eq!(state.screen, Screen::Overview);
    let last = state.logs.back().expect("a warning should be logged");
    assert!(last.contains("not in reloaded dataset"));
}

#[test]
fn reload_recomputes_overview_numbers() {
    let mut state = AppState::new(season(&[("A", "B")]));
    assert_eq!(state.overview.totals.matches, 1);

    apply_delta(
        &mut state,
        Delta::DatasetLoaded(season(&[("A", "B"), ("C", "D")])),
    );
    assert_eq!(state.overview.totals.matches, 2);
    assert_eq!(state.overview.top_winners.len(), 2);
}

#[test]
fn log_delta_appends_and_buffer_is_capped() {
    let mut state = AppState::new(Arc::new(Dataset::default()));
    for idx in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("msg {idx}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("msg 50"));
    assert_eq!(state.logs.back().map(String::as_str), Some("msg 249"));
}

#[test]
fn matches_screen_is_scoped_to_the_open_club() {
    let mut state = AppState::new(season(&[("A", "B"), ("C", "D"), ("A", "C")]));
    state.open_matches();
    assert!(state.matches_team.is_none());
    assert_eq!(state.visible_matches().len(), 3);

    state.back_to_overview();
    state.open_team();
    state.open_matches();
    assert_eq!(state.matches_team.as_deref(), Some("A"));
    assert_eq!(state.visible_matches().len(), 2);

    apply_delta(&mut state, Delta::DatasetLoaded(season(&[("C", "D")])));
    assert!(state.matches_team.is_none());
    assert_eq!(state.visible_matches().len(), 1);
}

#[test]
fn matches_scroll_stays_in_range() {
    let mut state = AppState::new(season(&[("A", "B"), ("C", "D"), ("E", "F")]));
    state.open_matches();

    state.scroll_matches_up();
    assert_eq!(state.matches_scroll, 0);
    for _ in 0..10 {
        state.scroll_matches_down();
    }
    assert_eq!(state.matches_scroll, 2);

    apply_delta(&mut state, Delta::DatasetLoaded(season(&[("A", "B")])));
    assert_eq!(state.matches_scroll, 0);
}

#[test]
fn reload_command_round_trips_through_the_provider() {
    let path =
        std::env::temp_dir().join(format!("brasileirao_reload_{}.csv", std::process::id()));
    std::fs::write(
        &path,
        "mandante,visitante,vencedor,mandante_placar,visitante_placar\n\
         Fortaleza,Cuiaba,Fortaleza,2,0\n",
    )
    .expect("temp csv should be writable");

    let cache = DatasetCache::load(&path).expect("temp csv should load");
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    cmd_tx
        .send(ProviderCommand::ReloadDataset)
        .expect("receiver is alive");
    spawn_dataset_provider(cache, tx, cmd_rx, Duration::from_secs(3600));

    let mut log = None;
    let mut snapshot = None;
    for _ in 0..2 {
        match rx
            .recv_timeout(Duration::from_secs(5))
            .expect("provider should answer the reload command")
        {
            Delta::Log(line) => log = Some(line),
            Delta::DatasetLoaded(dataset) => snapshot = Some(dataset),
        }
    }

    let line = log.expect("reload should be logged");
    assert!(line.contains("Dataset reloaded from"));
    assert!(line.contains(&path.display().to_string()));
    assert!(line.contains("1 matches"));
    assert_eq!(snapshot.expect("snapshot should arrive").matches.len(), 1);

    drop(cmd_tx);
    let _ = std::fs::remove_file(&path);
}

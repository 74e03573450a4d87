use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;

use brasileirao_terminal::analysis::{
    OutcomeBreakdown, StatDimension, dimension_breakdowns, home_away_split, involving,
    league_totals, outcome_distribution, team_summary, top_winners,
};
use brasileirao_terminal::dataset::MatchRecord;
use brasileirao_terminal::outcome::{DRAW_SENTINEL, Outcome};

fn played(home: &str, away: &str, winner: &str, home_score: u32, away_score: u32) -> MatchRecord {
    MatchRecord {
        round: None,
        date: None,
        venue: None,
        home: home.to_string(),
        away: away.to_string(),
        winner: winner.to_string(),
        home_score,
        away_score,
        home_possession: None,
        away_possession: None,
        home_shots: None,
        away_shots: None,
        home_shots_on_target: None,
        away_shots_on_target: None,
    }
}

fn with_stats(
    mut record: MatchRecord,
    possession: (f64, f64),
    shots: (f64, f64),
    on_target: (f64, f64),
) -> MatchRecord {
    record.home_possession = Some(possession.0);
    record.away_possession = Some(possession.1);
    record.home_shots = Some(shots.0);
    record.away_shots = Some(shots.1);
    record.home_shots_on_target = Some(on_target.0);
    record.away_shots_on_target = Some(on_target.1);
    record
}

// a win each way, a draw, a possession tie and one statless match
fn sample_season() -> Vec<MatchRecord> {
    vec![
        with_stats(
            played("Flamengo", "Santos", "Flamengo", 2, 0),
            (58.0, 42.0),
            (15.0, 6.0),
            (7.0, 2.0),
        ),
        with_stats(
            played("Santos", "Gremio", DRAW_SENTINEL, 1, 1),
            (45.0, 55.0),
            (14.0, 9.0),
            (5.0, 3.0),
        ),
        with_stats(
            played("Gremio", "Flamengo", "Flamengo", 0, 1),
            (50.0, 50.0),
            (8.0, 12.0),
            (3.0, 6.0),
        ),
        played("Santos", "Flamengo", "Santos", 2, 1),
    ]
}

#[test]
fn counts_always_sum_to_population() {
    let season = sample_season();
    let refs: Vec<&MatchRecord> = season.iter().collect();
    for entry in dimension_breakdowns(&refs) {
        let b = entry.breakdown;
        assert_eq!(b.wins + b.draws + b.losses, b.population);
    }
}

#[test]
fn percentages_sum_to_one_hundred() {
    let season = sample_season();
    let summary = team_summary(season.iter(), "Flamengo");
    assert_eq!(summary.population, 3);
    let pct = summary.percentages().expect("club has matches");
    assert_approx_eq!(pct.win + pct.draw + pct.loss, 100.0, 1e-9);
    assert_approx_eq!(pct.win, 200.0 / 3.0, 1e-9);
}

#[test]
fn empty_population_reports_insufficient_data() {
    let breakdown = OutcomeBreakdown::default();
    assert!(breakdown.is_insufficient());
    assert!(breakdown.percentages().is_none());
    assert_eq!(breakdown.percentage(Outcome::Win), None);
}

#[test]
fn tied_or_missing_stats_leave_the_population() {
    let season = sample_season();
    let refs: Vec<&MatchRecord> = season.iter().collect();
    let entries = dimension_breakdowns(&refs);

    // tie in match 3 and missing stats in match 4 both drop out
    let possession = &entries[0];
    assert_eq!(possession.dimension, StatDimension::Possession);
    assert_eq!(possession.breakdown.population, 2);
    assert_eq!(possession.breakdown.wins, 1);
    assert_eq!(possession.breakdown.draws, 1);

    // shots tie nowhere, so only the statless match drops
    let shots = &entries[1];
    assert_eq!(shots.dimension, StatDimension::Shots);
    assert_eq!(shots.breakdown.population, 3);
    assert_eq!(shots.breakdown.wins, 2);
}

#[test]
fn counter_attack_needs_less_possession_and_more_shots() {
    let record = with_stats(
        played("A", "B", "A", 1, 0),
        (60.0, 40.0),
        (15.0, 5.0),
        (5.0, 1.0),
    );
    assert_eq!(StatDimension::CounterAttack.team_of_interest(&record), None);

    let equal_shots = with_stats(
        played("A", "B", "A", 1, 0),
        (40.0, 60.0),
        (10.0, 10.0),
        (5.0, 1.0),
    );
    assert_eq!(
        StatDimension::CounterAttack.team_of_interest(&equal_shots),
        None
    );

    let fewer_shots = with_stats(
        played("A", "B", "A", 1, 0),
        (40.0, 60.0),
        (6.0, 11.0),
        (2.0, 4.0),
    );
    assert_eq!(
        StatDimension::CounterAttack.team_of_interest(&fewer_shots),
        None
    );

    let counter = with_stats(
        played("A", "B", "A", 1, 0),
        (40.0, 60.0),
        (15.0, 5.0),
        (5.0, 1.0),
    );
    assert_eq!(
        StatDimension::CounterAttack.team_of_interest(&counter),
        Some("A")
    );

    let season = sample_season();
    let refs: Vec<&MatchRecord> = season.iter().collect();
    let entry = &dimension_breakdowns(&refs)[3];
    assert_eq!(entry.dimension, StatDimension::CounterAttack);
    assert_eq!(entry.breakdown.population, 1);
    assert_eq!(entry.breakdown.draws, 1);
}

#[test]
fn possession_leader_on_a_single_match_yields_a_total_distribution() {
    let record = with_stats(
        played("A", "B", "A", 1, 0),
        (60.0, 40.0),
        (10.0, 8.0),
        (4.0, 2.0),
    );
    let breakdown = outcome_distribution([&record], |r| {
        StatDimension::Possession.team_of_interest(r)
    });
    assert_eq!(breakdown.population, 1);
    assert_eq!(breakdown.wins, 1);
    let pct = breakdown.percentages().expect("population is 1");
    assert_approx_eq!(pct.win, 100.0, 1e-9);
    assert_approx_eq!(pct.draw, 0.0, 1e-9);
    assert_approx_eq!(pct.loss, 0.0, 1e-9);
}

#[test]
fn missing_possession_only_drops_from_the_possession_lens() {
    let mut statless = with_stats(
        played("Ceara", "Vasco", "Ceara", 2, 1),
        (0.0, 0.0),
        (11.0, 7.0),
        (4.0, 2.0),
    );
    statless.home_possession = None;
    statless.away_possession = None;
    let season = vec![
        statless,
        with_stats(
            played("Vasco", "Ceara", DRAW_SENTINEL, 1, 1),
            (60.0, 40.0),
            (9.0, 5.0),
            (3.0, 2.0),
        ),
        with_stats(
            played("Bahia", "Vitoria", "Bahia", 1, 0),
            (55.0, 45.0),
            (10.0, 2.0),
            (5.0, 1.0),
        ),
    ];

    // league-wide scope
    let refs: Vec<&MatchRecord> = season.iter().collect();
    let entries = dimension_breakdowns(&refs);
    assert_eq!(entries[0].dimension, StatDimension::Possession);
    assert_eq!(entries[0].breakdown.population, 2);
    assert_eq!(entries[1].dimension, StatDimension::Shots);
    assert_eq!(entries[1].breakdown.population, 3);

    // the same isolation inside one club's subset
    let team_refs: Vec<&MatchRecord> = season
        .iter()
        .filter(|r| r.home == "Ceara" || r.away == "Ceara")
        .collect();
    let team_entries = dimension_breakdowns(&team_refs);
    assert_eq!(team_entries[0].breakdown.population, 1);
    assert_eq!(team_entries[1].breakdown.population, 2);

    // raw outcome tallies keep the statless record
    let summary = team_summary(season.iter(), "Ceara");
    assert_eq!(summary.population, 2);
    assert_eq!(summary.wins, 1);
    assert_eq!(summary.draws, 1);
}

#[test]
fn possession_reported_for_one_side_elects_no_leader() {
    let mut half = with_stats(
        played("Fortaleza", "Cuiaba", "Fortaleza", 2, 0),
        (0.0, 45.0),
        (12.0, 7.0),
        (5.0, 2.0),
    );
    half.home_possession = None;

    // the reported side must not win the comparison against a missing one
    assert_eq!(StatDimension::Possession.team_of_interest(&half), None);
    assert_eq!(StatDimension::CounterAttack.team_of_interest(&half), None);
    assert_eq!(StatDimension::Shots.team_of_interest(&half), Some("Fortaleza"));

    let mut mirrored = half.clone();
    mirrored.home_possession = Some(45.0);
    mirrored.away_possession = None;
    assert_eq!(StatDimension::Possession.team_of_interest(&mirrored), None);
    assert_eq!(StatDimension::CounterAttack.team_of_interest(&mirrored), None);

    let season = vec![
        half,
        with_stats(
            played("Cuiaba", "Fortaleza", DRAW_SENTINEL, 1, 1),
            (58.0, 42.0),
            (9.0, 11.0),
            (3.0, 4.0),
        ),
        with_stats(
            played("Goias", "Sport", "Goias", 1, 0),
            (52.0, 48.0),
            (10.0, 6.0),
            (4.0, 1.0),
        ),
    ];

    // league-wide, only the possession and counter lenses shrink
    let refs: Vec<&MatchRecord> = season.iter().collect();
    let entries = dimension_breakdowns(&refs);
    assert_eq!(entries[0].dimension, StatDimension::Possession);
    assert_eq!(entries[0].breakdown.population, 2);
    assert_eq!(entries[1].dimension, StatDimension::Shots);
    assert_eq!(entries[1].breakdown.population, 3);
    assert_eq!(entries[3].dimension, StatDimension::CounterAttack);
    assert_eq!(entries[3].breakdown.population, 1);
    assert_eq!(entries[3].breakdown.draws, 1);

    // and the same inside one club's subset
    let team_refs: Vec<&MatchRecord> = season
        .iter()
        .filter(|r| r.home == "Fortaleza" || r.away == "Fortaleza")
        .collect();
    let team_entries = dimension_breakdowns(&team_refs);
    assert_eq!(team_entries[0].breakdown.population, 1);
    assert_eq!(team_entries[1].breakdown.population, 2);

    // raw outcome tallies keep the half-reported record
    let summary = team_summary(season.iter(), "Fortaleza");
    assert_eq!(summary.population, 2);
    assert_eq!(summary.wins, 1);
    assert_eq!(summary.draws, 1);
}

#[test]
fn split_rows_cover_all_outcomes_zero_filled() {
    let season = sample_season();
    let split = home_away_split(season.iter(), "Flamengo");
    assert_eq!(split.rows.len(), 3);
    assert_eq!(split.row(Outcome::Win).home, 1);
    assert_eq!(split.row(Outcome::Win).away, 1);
    assert_eq!(split.row(Outcome::Draw).home, 0);
    assert_eq!(split.row(Outcome::Draw).away, 0);
    assert_eq!(split.row(Outcome::Loss).home, 0);
    assert_eq!(split.row(Outcome::Loss).away, 1);
}

#[test]
fn top_winners_rank_by_wins_then_name() {
    let matches = vec![
        played("A", "B", "A", 1, 0),
        played("C", "A", "C", 2, 0),
        played("B", "C", "C", 0, 1),
        played("A", "C", "A", 3, 1),
        played("B", "A", "B", 1, 0),
        played("C", "B", DRAW_SENTINEL, 2, 2),
    ];
    let ranked = top_winners(matches.iter(), 10);
    assert_eq!(ranked.len(), 3);
    assert_eq!((ranked[0].team.as_str(), ranked[0].wins), ("A", 2));
    assert_eq!((ranked[1].team.as_str(), ranked[1].wins), ("C", 2));
    assert_eq!((ranked[2].team.as_str(), ranked[2].wins), ("B", 1));

    let top_two = top_winners(matches.iter(), 2);
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[1].team, "C");
}

#[test]
fn outcome_distribution_skips_unselected_matches() {
    let season = sample_season();
    let breakdown = outcome_distribution(season.iter(), |record| involving(record, "Gremio"));
    assert_eq!(breakdown.population, 2);
    assert_eq!(breakdown.draws, 1);
    assert_eq!(breakdown.losses, 1);
}

#[test]
fn league_totals_track_goals_and_date_span() {
    let mut early = played("A", "B", "A", 2, 1);
    early.date = NaiveDate::from_ymd_opt(2024, 4, 13);
    let mut late = played("B", "A", DRAW_SENTINEL, 0, 0);
    late.date = NaiveDate::from_ymd_opt(2024, 11, 30);
    let undated = played("A", "B", "B", 1, 3);

    let totals = league_totals([&early, &late, &undated]);
    assert_eq!(totals.matches, 3);
    assert_eq!(totals.goals, 7);
    assert_eq!(totals.first_date, NaiveDate::from_ymd_opt(2024, 4, 13));
    assert_eq!(totals.last_date, NaiveDate::from_ymd_opt(2024, 11, 30));
    assert_approx_eq!(totals.goals_per_match().expect("matches present"), 7.0 / 3.0);
}

#[test]
fn goals_per_match_is_undefined_without_matches() {
    let empty: Vec<&MatchRecord> = Vec::new();
    assert_eq!(league_totals(empty).goals_per_match(), None);
}

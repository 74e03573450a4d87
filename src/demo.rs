use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::{Dataset, MatchRecord};
use crate::outcome::DRAW_SENTINEL;

pub const DEFAULT_SEED: u64 = 2024;

const CLUBS: [&str; 20] = [
    "America-MG",
    "Athletico-PR",
    "Atletico-MG",
    "Bahia",
    "Botafogo",
    "Bragantino",
    "Ceara",
    "Corinthians",
    "Cruzeiro",
    "Cuiaba",
    "Flamengo",
    "Fluminense",
    "Fortaleza",
    "Gremio",
    "Internacional",
    "Juventude",
    "Palmeiras",
    "Santos",
    "Sao Paulo",
    "Vasco",
];

const MATCHES_PER_ROUND: usize = CLUBS.len() / 2;

/// Deterministic for a given seed.
pub fn demo_dataset(seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let opening_day = NaiveDate::from_ymd_opt(2024, 4, 13);

    let mut pairings = Vec::with_capacity(CLUBS.len() * (CLUBS.len() - 1));
    for i in 0..CLUBS.len() {
        for j in 0..CLUBS.len() {
            if i != j {
                pairings.push((i, j));
            }
        }
    }

    let mut matches = Vec::with_capacity(pairings.len());
    for (idx, (i, j)) in pairings.into_iter().enumerate() {
        let round = (idx / MATCHES_PER_ROUND) as u32 + 1;
        let date = opening_day.map(|day| day + Duration::weeks(i64::from(round) - 1));
        matches.push(demo_match(&mut rng, round, date, CLUBS[i], CLUBS[j]));
    }
    Dataset::from_records(matches)
}

fn demo_match(
    rng: &mut StdRng,
    round: u32,
    date: Option<NaiveDate>,
    home: &str,
    away: &str,
) -> MatchRecord {
    let home_score = sample_goals(rng, 1.6);
    let away_score = sample_goals(rng, 1.2);
    let winner = if home_score > away_score {
        home.to_string()
    } else if away_score > home_score {
        away.to_string()
    } else {
        DRAW_SENTINEL.to_string()
    };

    let home_possession = rng.gen_range(35..=65) as f64;
    let away_possession = 100.0 - home_possession;
    let home_shots = rng.gen_range(4..=22u32);
    let away_shots = rng.gen_range(4..=22u32);
    let home_on_target = rng.gen_range(0..=home_shots / 2);
    let away_on_target = rng.gen_range(0..=away_shots / 2);

    // A thin slice of matches loses its stats, like the real feed.
    let stats_missing = rng.gen_bool(0.02);
    let stat = |value: f64| (!stats_missing).then_some(value);

    MatchRecord {
        round: Some(round),
        date,
        venue: Some(format!("Arena {home}")),
        home: home.to_string(),
        away: away.to_string(),
        winner,
        home_score,
        away_score,
        home_possession: stat(home_possession),
        away_possession: stat(away_possession),
        home_shots: stat(f64::from(home_shots)),
        away_shots: stat(f64::from(away_shots)),
        home_shots_on_target: stat(f64::from(home_on_target)),
        away_shots_on_target: stat(f64::from(away_on_target)),
    }
}

// Poisson by thinning over 90 simulated minutes.
fn sample_goals(rng: &mut StdRng, rate: f64) -> u32 {
    let per_minute = rate / 90.0;
    (0..90).filter(|_| rng.gen_bool(per_minute)).count() as u32
}

//! League table derived from finished matches.
//!
//! Recomputed from scratch on every call; nothing is kept between requests.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::service::LeagueService;
use crate::models::{Match, Standing, Team};

/// Fetch teams and the current season's matches concurrently, then rank.
pub async fn calculate_standings(service: &LeagueService) -> Vec<Standing> {
    let (teams, matches) = service.season_table().await;
    compute_standings(&teams, &matches)
}

/// Aggregate finished matches into one row per team, best record first.
///
/// A match is left out when either side is not in `teams`, when a score is
/// missing or when the scores are equal (basketball games cannot end tied,
/// so such a row is bad upstream data). Rows are ordered by win percentage,
/// then point differential; equal rows keep the order of `teams`.
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<Standing> {
    let mut rows: Vec<Standing> = Vec::with_capacity(teams.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(teams.len());
    for team in teams {
        if index.contains_key(team.id.as_str()) {
            continue;
        }
        index.insert(team.id.as_str(), rows.len());
        rows.push(Standing::new(team.id.clone()));
    }

    for m in matches.iter().filter(|m| m.is_finished()) {
        let (Some(&home), Some(&away)) = (
            index.get(m.home_team_id.as_str()),
            index.get(m.away_team_id.as_str()),
        ) else {
            debug!(
                "Skipping match {}: unknown team {} or {}",
                m.id, m.home_team_id, m.away_team_id
            );
            continue;
        };
        if home == away {
            warn!("Skipping match {}: team {} plays itself", m.id, m.home_team_id);
            continue;
        }
        let (Some(home_score), Some(away_score)) = (m.home_score, m.away_score) else {
            warn!("Skipping finished match {}: missing score", m.id);
            continue;
        };
        if home_score == away_score {
            warn!(
                "Skipping finished match {}: tied at {}-{}",
                m.id, home_score, away_score
            );
            continue;
        }

        let home_won = home_score > away_score;
        record(&mut rows[home], home_score, away_score, home_won);
        record(&mut rows[away], away_score, home_score, !home_won);
    }

    for row in &mut rows {
        finalize(row);
    }

    rows.sort_by(|a, b| {
        b.win_percentage
            .total_cmp(&a.win_percentage)
            .then_with(|| b.points_diff.cmp(&a.points_diff))
    });
    rows
}

fn record(row: &mut Standing, scored: u32, conceded: u32, won: bool) {
    row.played += 1;
    row.points_for += u64::from(scored);
    row.points_against += u64::from(conceded);
    if won {
        row.won += 1;
    } else {
        row.lost += 1;
    }
}

fn finalize(row: &mut Standing) {
    row.win_percentage = if row.played > 0 {
        f64::from(row.won) / f64::from(row.played)
    } else {
        0.0
    };
    row.points_diff = row.points_for as i64 - row.points_against as i64;
    row.streak = streak_label(row.won, row.lost);
}

/// Cumulative record label, not a run of consecutive results.
pub fn streak_label(won: u32, lost: u32) -> String {
    use std::cmp::Ordering;
    match won.cmp(&lost) {
        Ordering::Greater => format!("V{}", won),
        Ordering::Less => format!("D{}", lost),
        Ordering::Equal => "-".to_string(),
    }
}

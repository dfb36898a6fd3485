//! View builders behind the JSON pages: pagination, search, schedule tabs.

use serde::Serialize;

use crate::models::{Match, MatchStatus, Player, Team};

pub const TEAMS_PER_PAGE: usize = 12;
pub const PLAYERS_PER_PAGE: usize = 12;
pub const MATCHES_PER_PAGE: usize = 9;
pub const FINISHED_PER_PAGE: usize = 12;

pub const NO_TEAMS: &str = "No teams found";
pub const NO_PLAYERS: &str = "No players available for this team";
pub const NO_MATCHES: &str = "No matches in this category";
pub const NO_DATA: &str = "No data available";

/// One page of a list, with the numbers the UI prints
/// ("Showing 13-24 of 30").
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based display range, 0..0 when empty
    pub start: usize,
    pub end: usize,
    pub empty_message: Option<String>,
}

/// Slice `items` to a 1-based `page`, clamped into range.
pub fn paginate<T: Clone>(
    items: &[T],
    page: usize,
    per_page: usize,
    empty_message: &str,
) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let from = (page - 1) * per_page;
    let to = (from + per_page).min(total_items);
    let slice = items.get(from..to).unwrap_or(&[]);

    Page {
        items: slice.to_vec(),
        page,
        per_page,
        total_pages,
        total_items,
        start: if total_items == 0 { 0 } else { from + 1 },
        end: to,
        empty_message: (total_items == 0).then(|| empty_message.to_string()),
    }
}

/// Case-insensitive substring match over any of `fields`.
/// A blank query matches everything.
fn hit(query: &str, fields: &[&str]) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&q))
}

pub fn search_teams(teams: &[Team], query: &str) -> Vec<Team> {
    teams
        .iter()
        .filter(|t| {
            hit(
                query,
                &[
                    t.name.as_str(),
                    t.short_name.as_deref().unwrap_or(""),
                    t.city.as_str(),
                    t.country.as_str(),
                ],
            )
        })
        .cloned()
        .collect()
}

pub fn search_players(players: &[Player], query: &str) -> Vec<Player> {
    players
        .iter()
        .filter(|p| {
            hit(
                query,
                &[
                    p.name.as_str(),
                    p.position.as_str(),
                    p.nationality.as_deref().unwrap_or(""),
                ],
            )
        })
        .cloned()
        .collect()
}

pub fn search_matches(matches: &[Match], query: &str) -> Vec<Match> {
    matches
        .iter()
        .filter(|m| {
            hit(
                query,
                &[
                    m.home_team_name.as_str(),
                    m.away_team_name.as_str(),
                    m.league.as_str(),
                ],
            )
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleCounts {
    pub upcoming: usize,
    pub live: usize,
    pub finished: usize,
}

/// The schedule page: tab counts plus one page of the selected tab.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub status: MatchStatus,
    pub counts: ScheduleCounts,
    pub matches: Page<Match>,
}

impl ScheduleView {
    pub fn build(matches: &[Match], status: MatchStatus, query: &str, page: usize) -> Self {
        let matches = search_matches(matches, query);
        let count = |s: MatchStatus| matches.iter().filter(|m| m.status == s).count();
        let counts = ScheduleCounts {
            upcoming: count(MatchStatus::Scheduled),
            live: count(MatchStatus::Live),
            finished: count(MatchStatus::Finished),
        };

        let tab: Vec<Match> = matches.iter().filter(|m| m.status == status).cloned().collect();
        let per_page = match status {
            MatchStatus::Finished => FINISHED_PER_PAGE,
            MatchStatus::Scheduled | MatchStatus::Live => MATCHES_PER_PAGE,
        };
        ScheduleView {
            status,
            counts,
            matches: paginate(&tab, page, per_page, NO_MATCHES),
        }
    }
}

/// Landing page: a few recent results, upcoming games and featured teams.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub recent_matches: Vec<Match>,
    pub upcoming_matches: Vec<Match>,
    pub featured_teams: Vec<Team>,
    pub team_count: usize,
    pub match_count: usize,
    pub empty_message: Option<String>,
}

impl HomeView {
    pub fn build(matches: &[Match], teams: &[Team]) -> Self {
        let take = |status: MatchStatus| -> Vec<Match> {
            matches
                .iter()
                .filter(|m| m.status == status)
                .take(3)
                .cloned()
                .collect()
        };
        HomeView {
            recent_matches: take(MatchStatus::Finished),
            upcoming_matches: take(MatchStatus::Scheduled),
            featured_teams: teams.iter().take(4).cloned().collect(),
            team_count: teams.len(),
            match_count: matches.len(),
            empty_message: (teams.is_empty() && matches.is_empty()).then(|| NO_DATA.to_string()),
        }
    }
}

/// Search results across teams and games.
#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    pub teams: Page<Team>,
    pub matches: Page<Match>,
}

impl SearchView {
    pub fn build(teams: &[Team], matches: &[Match], query: &str, page: usize) -> Self {
        SearchView {
            query: query.trim().to_string(),
            teams: paginate(&search_teams(teams, query), page, TEAMS_PER_PAGE, NO_TEAMS),
            matches: paginate(&search_matches(matches, query), page, MATCHES_PER_PAGE, NO_MATCHES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sportsdb::normalize::{normalize_match, normalize_player, normalize_team, LogoLookup};
    use serde_json::json;

    fn teams(n: usize) -> Vec<Team> {
        (0..n)
            .filter_map(|i| {
                let location = if i % 2 == 0 { "Boston, MA" } else { "Denver, CO" };
                normalize_team(&json!({
                    "idTeam": i.to_string(),
                    "strTeam": format!("Team {}", i),
                    "strLocation": location
                }))
            })
            .collect()
    }

    fn game(id: &str, home: &str, away: &str, status: &str) -> Match {
        normalize_match(
            &json!({
                "idEvent": id, "idHomeTeam": "1", "idAwayTeam": "2",
                "strHomeTeam": home, "strAwayTeam": away,
                "strStatus": status, "strLeague": "NBA"
            }),
            &LogoLookup::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<u32> = (1..=30).collect();
        let page = paginate(&items, 2, 12, NO_DATA);
        assert_eq!(page.items, (13..=24).collect::<Vec<_>>());
        assert_eq!((page.start, page.end), (13, 24));
        assert_eq!(page.total_pages, 3);
        assert!(page.empty_message.is_none());
    }

    #[test]
    fn test_paginate_clamps_out_of_range() {
        let items: Vec<u32> = (1..=30).collect();
        let last = paginate(&items, 99, 12, NO_DATA);
        assert_eq!(last.page, 3);
        assert_eq!(last.items.len(), 6);
        assert_eq!((last.start, last.end), (25, 30));

        let first = paginate(&items, 0, 12, NO_DATA);
        assert_eq!(first.page, 1);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate::<u32>(&[], 3, 9, NO_MATCHES);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert_eq!((page.start, page.end), (0, 0));
        assert_eq!(page.empty_message.as_deref(), Some(NO_MATCHES));
    }

    #[test]
    fn test_search_teams_is_case_insensitive() {
        let all = teams(6);
        assert_eq!(search_teams(&all, "boston").len(), 3);
        assert_eq!(search_teams(&all, "TEAM 5").len(), 1);
        assert_eq!(search_teams(&all, "   ").len(), 6);
        assert!(search_teams(&all, "lakers").is_empty());
    }

    #[test]
    fn test_search_players_by_position() {
        let players: Vec<Player> = [
            json!({ "idPlayer": "1", "strPlayer": "Trae Young", "strPosition": "Point Guard" }),
            json!({ "idPlayer": "2", "strPlayer": "Clint Capela", "strPosition": "Center",
                    "strNationality": "Switzerland" }),
        ]
        .iter()
        .filter_map(normalize_player)
        .collect();
        assert_eq!(search_players(&players, "guard")[0].name, "Trae Young");
        assert_eq!(search_players(&players, "swiss").len(), 0);
        assert_eq!(search_players(&players, "switz")[0].id, "2");
    }

    #[test]
    fn test_schedule_counts_and_tab() {
        let matches = vec![
            game("1", "Hawks", "Celtics", "FT"),
            game("2", "Hawks", "Nets", "NS"),
            game("3", "Bulls", "Nets", "NS"),
            game("4", "Bulls", "Heat", "Q2"),
        ];
        let view = ScheduleView::build(&matches, MatchStatus::Scheduled, "", 1);
        assert_eq!(
            view.counts,
            ScheduleCounts { upcoming: 2, live: 1, finished: 1 }
        );
        assert_eq!(view.matches.items.len(), 2);
        assert_eq!(view.matches.per_page, MATCHES_PER_PAGE);

        let nets = ScheduleView::build(&matches, MatchStatus::Finished, "nets", 1);
        assert_eq!(nets.counts.finished, 0);
        assert_eq!(nets.matches.empty_message.as_deref(), Some(NO_MATCHES));
        assert_eq!(nets.matches.per_page, FINISHED_PER_PAGE);
    }

    #[test]
    fn test_home_view() {
        let matches: Vec<Match> = (0..5)
            .map(|i| game(&i.to_string(), "A", "B", if i < 4 { "FT" } else { "NS" }))
            .collect();
        let view = HomeView::build(&matches, &teams(6));
        assert_eq!(view.recent_matches.len(), 3);
        assert_eq!(view.upcoming_matches.len(), 1);
        assert_eq!(view.featured_teams.len(), 4);
        assert_eq!(view.match_count, 5);
        assert!(view.empty_message.is_none());

        let empty = HomeView::build(&[], &[]);
        assert_eq!(empty.empty_message.as_deref(), Some(NO_DATA));
    }
}

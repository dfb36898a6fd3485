//! Per-entity retrieval for one league.
//!
//! Every operation is best-effort: any upstream or decoding failure is
//! logged and turned into an empty collection (or `None`), never an error.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::LeagueSettings;
use crate::models::{Match, Player, Team};
use crate::sportsdb::normalize::{
    is_sport, logo_lookup, normalize_match, normalize_player, normalize_team, Envelope,
};
use crate::sportsdb::provider::fetch_resource;
use crate::sportsdb::{endpoint, CacheOptions, ResourceProvider};

/// Team page payload: the team, its roster and its recent games.
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetails {
    pub team: Option<Team>,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
}

#[derive(Clone)]
pub struct LeagueService {
    provider: Arc<dyn ResourceProvider>,
    settings: LeagueSettings,
}

impl LeagueService {
    pub fn new(provider: Arc<dyn ResourceProvider>, settings: LeagueSettings) -> Self {
        LeagueService { provider, settings }
    }

    pub fn settings(&self) -> &LeagueSettings {
        &self.settings
    }

    pub fn provider(&self) -> &Arc<dyn ResourceProvider> {
        &self.provider
    }

    /// Tag shared by every cached team-list response, e.g. "nba-teams".
    pub fn teams_tag(&self) -> String {
        format!("{}-teams", self.settings.league_name.to_lowercase())
    }

    async fn fetch(&self, endpoint: &str, options: CacheOptions, what: &str) -> Option<Envelope> {
        let options = if self.settings.bypass_cache {
            CacheOptions {
                tags: options.tags,
                ..CacheOptions::no_store()
            }
        } else {
            options
        };

        match fetch_resource(self.provider.as_ref(), endpoint, &options).await {
            Ok(envelope) => Some(envelope),
            Err(e) if e.status() == Some(404) => {
                warn!("{} not found at {}: {}", what, self.provider.name(), e);
                None
            }
            Err(e) => {
                error!("Error fetching {} from {}: {}", what, self.provider.name(), e);
                None
            }
        }
    }

    /// All teams of the configured league.
    pub async fn teams(&self) -> Vec<Team> {
        let league = &self.settings.league_name;
        let ep = endpoint("search_all_teams.php", &[("l", league.as_str())]);
        let opts = CacheOptions::revalidate(self.settings.teams_revalidate).tag(self.teams_tag());

        let Some(raw) = self.fetch(&ep, opts, "teams").await else {
            return Vec::new();
        };
        let rows = raw.teams();
        if rows.is_empty() {
            warn!("No teams found for league {}", league);
            return Vec::new();
        }
        rows.iter().filter_map(normalize_team).collect()
    }

    pub async fn team_by_id(&self, team_id: &str) -> Option<Team> {
        let ep = endpoint("lookupteam.php", &[("id", team_id)]);
        let opts = CacheOptions::force_cache().tag(format!("team-{}", team_id));

        let raw = self.fetch(&ep, opts, "team").await?;
        raw.teams().first().and_then(normalize_team)
    }

    pub async fn players_by_team(&self, team_id: &str) -> Vec<Player> {
        let ep = endpoint("lookup_all_players.php", &[("id", team_id)]);
        let opts = CacheOptions::force_cache().tag(format!("players-{}", team_id));

        let Some(raw) = self.fetch(&ep, opts, "players").await else {
            return Vec::new();
        };
        let rows = raw.players();
        if rows.is_empty() {
            warn!("No players found for team {}", team_id);
            return Vec::new();
        }
        rows.iter().filter_map(normalize_player).collect()
    }

    pub async fn player_by_id(&self, player_id: &str) -> Option<Player> {
        let ep = endpoint("lookupplayer.php", &[("id", player_id)]);
        let opts = CacheOptions::force_cache().tag(format!("player-{}", player_id));

        let raw = self.fetch(&ep, opts, "player").await?;
        raw.players().first().and_then(normalize_player)
    }

    /// Fetch an events feed and the team list together, then normalize the
    /// events of our sport with logos resolved from that same team list.
    async fn events_with_teams(
        &self,
        ep: String,
        opts: CacheOptions,
        what: &str,
    ) -> (Vec<Team>, Vec<Match>) {
        let (events, teams) = tokio::join!(self.fetch(&ep, opts, what), self.teams());

        let Some(raw) = events else {
            return (teams, Vec::new());
        };
        let rows = raw.events();
        if rows.is_empty() {
            warn!("No matches found for {}", what);
            return (teams, Vec::new());
        }

        let logos = logo_lookup(&teams);
        let sport = &self.settings.sport;
        let matches: Vec<Match> = rows
            .iter()
            .filter(|ev| is_sport(ev, sport))
            .filter_map(|ev| normalize_match(ev, &logos))
            .collect();
        debug!("{}: {} of {} events kept", what, matches.len(), rows.len());
        (teams, matches)
    }

    async fn matches_with_logos(&self, ep: String, opts: CacheOptions, what: &str) -> Vec<Match> {
        self.events_with_teams(ep, opts, what).await.1
    }

    /// Most recent games of one team.
    pub async fn team_matches(&self, team_id: &str) -> Vec<Match> {
        let ep = endpoint("eventslast.php", &[("id", team_id)]);
        let opts = CacheOptions::revalidate(self.settings.matches_revalidate)
            .tag(format!("matches-{}", team_id));
        self.matches_with_logos(ep, opts, &format!("team {}", team_id))
            .await
    }

    fn season_request(&self, season: &str) -> (String, CacheOptions) {
        let ep = endpoint(
            "eventsseason.php",
            &[("id", self.settings.league_id.as_str()), ("s", season)],
        );
        let opts = CacheOptions::revalidate(self.settings.matches_revalidate)
            .tag("all-matches")
            .tag(format!("season-{}", season));
        (ep, opts)
    }

    /// Full schedule of one season, played and upcoming.
    pub async fn season_matches(&self, season: &str) -> Vec<Match> {
        let (ep, opts) = self.season_request(season);
        self.matches_with_logos(ep, opts, &format!("season {}", season))
            .await
    }

    pub async fn all_matches(&self) -> Vec<Match> {
        self.season_matches(&self.settings.season).await
    }

    /// Team list and current-season games from a single team-list fetch.
    pub async fn season_table(&self) -> (Vec<Team>, Vec<Match>) {
        let season = &self.settings.season;
        let (ep, opts) = self.season_request(season);
        self.events_with_teams(ep, opts, &format!("season {}", season))
            .await
    }

    pub async fn upcoming_matches(&self) -> Vec<Match> {
        let ep = endpoint("eventsnextleague.php", &[("id", self.settings.league_id.as_str())]);
        let opts =
            CacheOptions::revalidate(self.settings.upcoming_revalidate).tag("upcoming-matches");
        self.matches_with_logos(ep, opts, "upcoming league games").await
    }

    pub async fn past_matches(&self) -> Vec<Match> {
        let ep = endpoint("eventspastleague.php", &[("id", self.settings.league_id.as_str())]);
        let opts = CacheOptions::revalidate(self.settings.matches_revalidate).tag("past-matches");
        self.matches_with_logos(ep, opts, "past league games").await
    }

    pub async fn team_with_details(&self, team_id: &str) -> TeamDetails {
        let (team, players, matches) = tokio::join!(
            self.team_by_id(team_id),
            self.players_by_team(team_id),
            self.team_matches(team_id)
        );
        TeamDetails {
            team,
            players,
            matches,
        }
    }

    /// Provider id of the first league of our sport whose name contains `name`.
    pub async fn search_league(&self, name: &str) -> Option<String> {
        let ep = endpoint("search_all_leagues.php", &[("s", self.settings.sport.as_str())]);
        let opts = CacheOptions::force_cache().tag("leagues");

        let raw = self.fetch(&ep, opts, "leagues").await?;
        let wanted = name.to_lowercase();
        raw.leagues()
            .iter()
            .find(|l| {
                l["strLeague"]
                    .as_str()
                    .is_some_and(|s| s.to_lowercase().contains(&wanted))
            })
            .and_then(|l| l["idLeague"].as_str())
            .map(str::to_string)
    }
}

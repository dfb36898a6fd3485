pub mod views;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::league::{calculate_standings, LeagueService};
use crate::models::MatchStatus;
use views::{
    paginate, search_players, HomeView, ScheduleView, SearchView, NO_PLAYERS, PLAYERS_PER_PAGE,
};

pub const TEAMS_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";
pub const PLAYERS_CACHE_CONTROL: &str = "public, s-maxage=43200, stale-while-revalidate=86400";

#[derive(Clone)]
pub struct AppState {
    pub service: LeagueService,
}

/// Build the Axum router for the site.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/home", get(home_handler))
        .route("/api/leagues", get(league_search_handler))
        .route("/api/matches/upcoming", get(upcoming_handler))
        .route("/api/matches/past", get(past_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/teams/:id", get(team_handler))
        .route("/api/teams/:id/players", get(team_players_handler))
        .route("/api/players/:id", get(player_handler))
        .route("/api/schedule", get(schedule_handler))
        .route("/api/standings", get(standings_handler))
        .route("/api/search", get(search_handler))
        .route("/api/revalidate/:tag", post(revalidate_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub status: Option<MatchStatus>,
}

impl ListQuery {
    fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{} not found", what) })),
    )
        .into_response()
}

/// Serve the league table page, injecting the league name.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(INDEX_HTML.replace("{{LEAGUE}}", &state.service.settings().league_name))
}

/// GET /api/home
async fn home_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (matches, teams) = tokio::join!(state.service.all_matches(), state.service.teams());
    Json(HomeView::build(&matches, &teams))
}

/// GET /api/leagues?q=
async fn league_search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    let query = params.query().trim();
    let league_id = if query.is_empty() {
        None
    } else {
        state.service.search_league(query).await
    };
    Json(json!({ "query": query, "leagueId": league_id }))
}

async fn upcoming_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let matches = state.service.upcoming_matches().await;
    let count = matches.len();
    Json(json!({ "matches": matches, "count": count }))
}

async fn past_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let matches = state.service.past_matches().await;
    let count = matches.len();
    Json(json!({ "matches": matches, "count": count }))
}

/// GET /api/teams
async fn teams_handler(State(state): State<Arc<AppState>>) -> Response {
    let teams = state.service.teams().await;
    let count = teams.len();
    match serde_json::to_value(&teams) {
        Ok(teams) => (
            [(header::CACHE_CONTROL, TEAMS_CACHE_CONTROL)],
            Json(json!({ "teams": teams, "count": count })),
        )
            .into_response(),
        Err(e) => {
            error!("API Error - GET /api/teams: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch teams", "teams": [], "count": 0 })),
            )
                .into_response()
        }
    }
}

/// GET /api/teams/:id?q=&page=
async fn team_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ListQuery>,
) -> Response {
    let details = state.service.team_with_details(&id).await;
    let Some(team) = details.team else {
        return not_found("Team");
    };
    let roster = search_players(&details.players, params.query());
    Json(json!({
        "team": team,
        "players": paginate(&roster, params.page(), PLAYERS_PER_PAGE, NO_PLAYERS),
        "matches": details.matches,
    }))
    .into_response()
}

/// GET /api/teams/:id/players
async fn team_players_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    info!("[API] Fetching players for team {}", id);
    let players = state.service.players_by_team(&id).await;
    let count = players.len();
    match serde_json::to_value(&players) {
        Ok(players) => (
            [(header::CACHE_CONTROL, PLAYERS_CACHE_CONTROL)],
            Json(json!({ "players": players, "count": count })),
        )
            .into_response(),
        Err(e) => {
            error!("[API] Error fetching players: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch players", "players": [], "count": 0 })),
            )
                .into_response()
        }
    }
}

/// GET /api/players/:id
async fn player_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.service.player_by_id(&id).await {
        Some(player) => Json(player).into_response(),
        None => not_found("Player"),
    }
}

/// GET /api/schedule?status=scheduled|live|finished&q=&page=
async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    let matches = state.service.all_matches().await;
    let status = params.status.unwrap_or(MatchStatus::Scheduled);
    Json(ScheduleView::build(&matches, status, params.query(), params.page()))
}

/// GET /api/standings
async fn standings_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let standings = calculate_standings(&state.service).await;
    let count = standings.len();
    Json(json!({ "standings": standings, "count": count }))
}

/// GET /api/search?q=&page=
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    let (teams, matches) = tokio::join!(state.service.teams(), state.service.all_matches());
    Json(SearchView::build(&teams, &matches, params.query(), params.page()))
}

/// POST /api/revalidate/:tag
async fn revalidate_handler(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> impl IntoResponse {
    let invalidated = state.service.provider().invalidate_tag(&tag).await;
    info!("Revalidated tag '{}' ({} cached responses dropped)", tag, invalidated);
    Json(json!({ "tag": tag, "invalidated": invalidated }))
}

/// Embedded single-file league page (HTML + CSS + JS)
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{LEAGUE}} Standings</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #f97316;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .stats-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 1rem; }
  .stat-card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  .stat-card .label { color: var(--muted); font-size: .8rem; text-transform: uppercase; margin-bottom: .4rem; }
  .stat-card .value { font-size: 1.7rem; font-weight: 700; color: var(--accent); }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .65rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  td img { width: 22px; height: 22px; vertical-align: middle; margin-right: .5rem; }
  .pos { color: var(--green); }
  .neg { color: var(--red); }
  .empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
</style>
</head>
<body>
<header><h1>🏀 {{LEAGUE}} Stats</h1></header>
<main>
  <div class="stats-grid">
    <div class="stat-card"><div class="label">Teams</div><div class="value" id="s-teams">–</div></div>
    <div class="stat-card"><div class="label">Matches</div><div class="value" id="s-matches">–</div></div>
  </div>
  <div class="panel">
    <div class="panel-header">Standings</div>
    <table>
      <thead><tr><th>#</th><th>Team</th><th>P</th><th>W</th><th>L</th><th>Pct</th><th>PF</th><th>PA</th><th>Diff</th><th>Form</th></tr></thead>
      <tbody id="standings-tbody"><tr><td colspan="10" class="empty">Loading…</td></tr></tbody>
    </table>
  </div>
</main>
<script>
async function loadAll() {
  const [teamsRes, standingsRes, homeRes] = await Promise.all([
    fetch('/api/teams'), fetch('/api/standings'), fetch('/api/home'),
  ]);
  const teams = teamsRes.ok ? (await teamsRes.json()).teams : [];
  const standings = standingsRes.ok ? (await standingsRes.json()).standings : [];
  if (homeRes.ok) {
    const home = await homeRes.json();
    document.getElementById('s-teams').textContent = home.teamCount;
    document.getElementById('s-matches').textContent = home.matchCount;
  }
  const byId = Object.fromEntries(teams.map(t => [t.id, t]));
  const tbody = document.getElementById('standings-tbody');
  if (!standings.length) { tbody.innerHTML = '<tr><td colspan="10" class="empty">No data available</td></tr>'; return; }
  tbody.innerHTML = standings.map((s, i) => {
    const t = byId[s.teamId] || { name: s.teamId, logo: '' };
    const diffClass = s.pointsDiff >= 0 ? 'pos' : 'neg';
    return `<tr>
      <td>${i + 1}</td>
      <td><img src="${t.logo}" alt="">${t.name}</td>
      <td>${s.played}</td><td>${s.won}</td><td>${s.lost}</td>
      <td>${s.winPercentage.toFixed(3)}</td>
      <td>${s.pointsFor}</td><td>${s.pointsAgainst}</td>
      <td class="${diffClass}">${s.pointsDiff > 0 ? '+' : ''}${s.pointsDiff}</td>
      <td>${s.streak}</td>
    </tr>`;
  }).join('');
}
loadAll();
</script>
</body>
</html>"#;

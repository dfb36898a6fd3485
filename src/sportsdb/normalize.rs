//! Raw TheSportsDB records → internal entities.
//!
//! The provider returns every field as an optional string (numbers included),
//! and blank strings are common. All accessors here treat `null`, missing and
//! whitespace-only values the same way. A normalizer returns `None` only when
//! a required identifier or name is missing; the caller filters those out.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{Match, MatchStatus, Player, Team, PLACEHOLDER_LOGO};

const DEFAULT_CITY: &str = "Unknown";
const DEFAULT_COUNTRY: &str = "USA";
const DEFAULT_PRIMARY_COLOR: &str = "#1D428A";
const DEFAULT_SECONDARY_COLOR: &str = "#C8102E";
const DEFAULT_POSITION: &str = "N/A";
const DEFAULT_TEAM_NAME: &str = "TBD";
const DEFAULT_LEAGUE: &str = "Unknown";

/// Team id → logo URL, built once per match retrieval.
pub type LogoLookup = HashMap<String, String>;

fn text<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn owned(record: &Value, key: &str) -> Option<String> {
    text(record, key).map(str::to_string)
}

/// First non-blank value among `keys`.
fn first_of(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| owned(record, k))
}

/// Accepts `"110"`, `110` and rejects negatives or garbage.
fn unsigned(record: &Value, key: &str) -> Option<u32> {
    text(record, key)
        .and_then(|s| s.parse().ok())
        .or_else(|| record[key].as_u64().and_then(|v| u32::try_from(v).ok()))
}

fn integer(record: &Value, key: &str) -> Option<i32> {
    text(record, key)
        .and_then(|s| s.parse().ok())
        .or_else(|| record[key].as_i64().and_then(|v| i32::try_from(v).ok()))
}

fn decimal(record: &Value, key: &str) -> Option<f64> {
    text(record, key)
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| record[key].as_f64())
        .filter(|v| v.is_finite())
}

fn date(record: &Value, key: &str) -> Option<NaiveDate> {
    text(record, key).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn timestamp(record: &Value, key: &str) -> Option<DateTime<Utc>> {
    let raw = text(record, key)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // TheSportsDB usually omits the offset; those timestamps are UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// "Boston, Massachusetts" → "Boston"
fn city_of(record: &Value) -> Option<String> {
    first_of(record, &["strLocation", "strStadiumLocation"]).and_then(|loc| {
        loc.split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

pub fn normalize_team(record: &Value) -> Option<Team> {
    let id = owned(record, "idTeam")?;
    let name = owned(record, "strTeam")?;

    Some(Team {
        id,
        name,
        short_name: owned(record, "strTeamShort"),
        city: city_of(record).unwrap_or_else(|| DEFAULT_CITY.to_string()),
        country: owned(record, "strCountry").unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        primary_color: owned(record, "strColour1")
            .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
        secondary_color: owned(record, "strColour2")
            .unwrap_or_else(|| DEFAULT_SECONDARY_COLOR.to_string()),
        logo: first_of(record, &["strBadge", "strTeamBadge", "strLogo", "strTeamLogo"])
            .unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
        fanart: first_of(record, &["strFanart1", "strTeamFanart1"]),
        stadium: owned(record, "strStadium"),
        formed_year: integer(record, "intFormedYear"),
        website: owned(record, "strWebsite"),
        description: owned(record, "strDescriptionEN"),
        // Not part of the provider's team record
        championships: 0,
    })
}

pub fn normalize_player(record: &Value) -> Option<Player> {
    let id = owned(record, "idPlayer")?;
    let name = owned(record, "strPlayer")?;

    Some(Player {
        id,
        team_id: owned(record, "idTeam"),
        name,
        position: owned(record, "strPosition").unwrap_or_else(|| DEFAULT_POSITION.to_string()),
        number: owned(record, "strNumber"),
        height: owned(record, "strHeight"),
        weight: owned(record, "strWeight"),
        nationality: owned(record, "strNationality"),
        college: owned(record, "strCollege"),
        date_of_birth: date(record, "dateBorn"),
        image_url: first_of(record, &["strCutout", "strThumb", "strRender"]),
        points: decimal(record, "intPoints"),
        rebounds: decimal(record, "intRebounds"),
        assists: decimal(record, "intAssists"),
    })
}

/// Map the provider's free-text status onto the three states we render.
pub fn status_from_str(
    raw: Option<&str>,
    home_score: Option<u32>,
    away_score: Option<u32>,
) -> MatchStatus {
    match raw.map(str::to_lowercase).as_deref() {
        Some("match finished" | "ft" | "aot" | "aet" | "finished" | "final") => {
            MatchStatus::Finished
        }
        Some(
            "not started" | "ns" | "tbd" | "scheduled" | "postponed" | "cancelled" | "canceled",
        ) => MatchStatus::Scheduled,
        Some(_) => MatchStatus::Live,
        None if home_score.is_some() && away_score.is_some() => MatchStatus::Finished,
        None => MatchStatus::Scheduled,
    }
}

fn logo_for(lookup: &LogoLookup, team_id: &str, record: &Value, badge_key: &str) -> String {
    lookup
        .get(team_id)
        .cloned()
        .or_else(|| owned(record, badge_key))
        .unwrap_or_else(|| PLACEHOLDER_LOGO.to_string())
}

pub fn normalize_match(record: &Value, logos: &LogoLookup) -> Option<Match> {
    let id = owned(record, "idEvent")?;
    let home_team_id = owned(record, "idHomeTeam")?;
    let away_team_id = owned(record, "idAwayTeam")?;

    let home_score = unsigned(record, "intHomeScore");
    let away_score = unsigned(record, "intAwayScore");
    let status = status_from_str(text(record, "strStatus"), home_score, away_score);

    Some(Match {
        home_team_logo: logo_for(logos, &home_team_id, record, "strHomeTeamBadge"),
        away_team_logo: logo_for(logos, &away_team_id, record, "strAwayTeamBadge"),
        id,
        home_team_id,
        away_team_id,
        home_team_name: owned(record, "strHomeTeam")
            .unwrap_or_else(|| DEFAULT_TEAM_NAME.to_string()),
        away_team_name: owned(record, "strAwayTeam")
            .unwrap_or_else(|| DEFAULT_TEAM_NAME.to_string()),
        home_score,
        away_score,
        status,
        date: date(record, "dateEvent"),
        time: owned(record, "strTime"),
        kickoff: timestamp(record, "strTimestamp"),
        league: owned(record, "strLeague").unwrap_or_else(|| DEFAULT_LEAGUE.to_string()),
        season: owned(record, "strSeason"),
        venue: owned(record, "strVenue"),
    })
}

/// The events feeds are multi-sport; keep only our sport's games.
pub fn is_sport(record: &Value, sport: &str) -> bool {
    let wanted = sport.to_lowercase();
    let by_sport = text(record, "strSport").is_some_and(|s| s.to_lowercase() == wanted);
    let by_league =
        text(record, "strLeague").is_some_and(|l| l.to_lowercase().contains(&wanted));
    by_sport || by_league
}

/// Top-level wrapper of a v1 response. Records stay raw so the
/// normalizers above can apply their per-field fallbacks.
///
/// The provider sends `null` instead of `[]` when nothing matched.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    teams: Option<Vec<Value>>,
    player: Option<Vec<Value>>,
    players: Option<Vec<Value>>,
    events: Option<Vec<Value>>,
    /// `eventslast.php` answers under this key
    results: Option<Vec<Value>>,
    leagues: Option<Vec<Value>>,
    countries: Option<Vec<Value>>,
}

/// First non-empty list among `candidates`.
fn rows<'a>(candidates: &[&'a Option<Vec<Value>>]) -> &'a [Value] {
    candidates
        .iter()
        .filter_map(|c| (*c).as_deref())
        .find(|r| !r.is_empty())
        .unwrap_or(&[])
}

impl Envelope {
    pub fn teams(&self) -> &[Value] {
        rows(&[&self.teams])
    }

    pub fn players(&self) -> &[Value] {
        rows(&[&self.player, &self.players])
    }

    pub fn events(&self) -> &[Value] {
        rows(&[&self.events, &self.results])
    }

    pub fn leagues(&self) -> &[Value] {
        rows(&[&self.leagues, &self.countries])
    }
}

pub fn logo_lookup(teams: &[Team]) -> LogoLookup {
    teams
        .iter()
        .map(|t| (t.id.clone(), t.logo.clone()))
        .collect()
}

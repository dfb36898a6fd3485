use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Image shown when the provider has no badge for a team.
pub const PLACEHOLDER_LOGO: &str = "/images/team-placeholder.png";

/// A league franchise as normalized from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub city: String,
    pub country: String,
    /// CSS colour, e.g. "#1D428A"
    pub primary_color: String,
    pub secondary_color: String,
    pub logo: String,
    pub fanart: Option<String>,
    pub stadium: Option<String>,
    pub formed_year: Option<i32>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub championships: u32,
}

/// A rostered player. Linked to its team by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub team_id: Option<String>,
    pub name: String,
    pub position: String,
    pub number: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub nationality: Option<String>,
    pub college: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub image_url: Option<String>,
    /// Season averages, only when the provider supplies them
    pub points: Option<f64>,
    pub rebounds: Option<f64>,
    pub assists: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

/// A scheduled, in-progress or completed game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_team_name: String,
    pub away_team_name: String,
    /// Absent until the game has been played
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
    pub date: Option<NaiveDate>,
    /// Local tip-off time as the provider prints it ("19:30:00")
    pub time: Option<String>,
    pub kickoff: Option<DateTime<Utc>>,
    pub league: String,
    pub season: Option<String>,
    pub venue: Option<String>,
    pub home_team_logo: String,
    pub away_team_logo: String,
}

impl Match {
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }
}

/// One row of the derived league table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub team_id: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    /// won / played, 0.0 when nothing has been played
    pub win_percentage: f64,
    pub points_for: u64,
    pub points_against: u64,
    pub points_diff: i64,
    /// Cumulative record label: "V{won}", "D{lost}" or "-"
    pub streak: String,
}

impl Standing {
    pub fn new(team_id: impl Into<String>) -> Self {
        Standing {
            team_id: team_id.into(),
            played: 0,
            won: 0,
            lost: 0,
            win_percentage: 0.0,
            points_for: 0,
            points_against: 0,
            points_diff: 0,
            streak: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_status_serializes_lowercase() {
        let json = serde_json::to_string(&MatchStatus::Finished).unwrap();
        assert_eq!(json, "\"finished\"");
        let back: MatchStatus = serde_json::from_str("\"live\"").unwrap();
        assert_eq!(back, MatchStatus::Live);
    }

    #[test]
    fn test_standing_serializes_camel_case() {
        let s = Standing::new("134860");
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["teamId"], "134860");
        assert_eq!(v["winPercentage"], 0.0);
        assert!(v.get("pointsDiff").is_some());
    }
}

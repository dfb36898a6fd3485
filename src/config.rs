use clap::Parser;
use std::time::Duration;

/// Basketball league stats service backed by TheSportsDB
#[derive(Parser, Debug, Clone)]
#[command(name = "courtside", version, about)]
pub struct Config {
    /// Listen address for the site
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// TheSportsDB base URL (without the API key segment)
    #[arg(
        long,
        env = "SPORTSDB_BASE_URL",
        default_value = "https://www.thesportsdb.com/api/v1/json"
    )]
    pub sportsdb_base_url: String,

    /// TheSportsDB API key ("3" is the public free-tier key)
    #[arg(long, env = "SPORTSDB_API_KEY", default_value = "3")]
    pub sportsdb_api_key: String,

    /// Bypass the response cache and always go upstream
    #[arg(long, env = "SPORTSDB_NO_CACHE", default_value = "false")]
    pub no_cache: bool,

    /// Maximum number of upstream responses kept in memory
    #[arg(long, env = "CACHE_MAX_ENTRIES", default_value = "2048")]
    pub cache_max_entries: usize,

    /// Upstream request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,

    /// Provider league id (4387 = NBA)
    #[arg(long, env = "LEAGUE_ID", default_value = "4387")]
    pub league_id: String,

    /// League name used for the team search endpoint
    #[arg(long, env = "LEAGUE_NAME", default_value = "NBA")]
    pub league_name: String,

    /// Sport used to filter the multi-sport events feeds
    #[arg(long, env = "SPORT", default_value = "Basketball")]
    pub sport: String,

    /// Season treated as current, e.g. "2024-2025"
    #[arg(long, env = "SEASON", default_value = "2024-2025")]
    pub season: String,

    /// Revalidate window for the team list (seconds)
    #[arg(long, env = "TEAMS_REVALIDATE_SECS", default_value = "86400")]
    pub teams_revalidate_secs: u64,

    /// Revalidate window for match feeds (seconds)
    #[arg(long, env = "MATCHES_REVALIDATE_SECS", default_value = "3600")]
    pub matches_revalidate_secs: u64,

    /// Revalidate window for the upcoming-games feed (seconds)
    #[arg(long, env = "UPCOMING_REVALIDATE_SECS", default_value = "1800")]
    pub upcoming_revalidate_secs: u64,
}

/// Everything the fetch client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub cache_max_entries: usize,
}

/// League identity and cache windows used by the domain services.
#[derive(Debug, Clone)]
pub struct LeagueSettings {
    pub league_id: String,
    pub league_name: String,
    pub sport: String,
    pub season: String,
    pub teams_revalidate: Duration,
    pub matches_revalidate: Duration,
    pub upcoming_revalidate: Duration,
    /// Every fetch goes upstream with no-store
    pub bypass_cache: bool,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        LeagueSettings {
            league_id: "4387".to_string(),
            league_name: "NBA".to_string(),
            sport: "Basketball".to_string(),
            season: "2024-2025".to_string(),
            teams_revalidate: Duration::from_secs(86_400),
            matches_revalidate: Duration::from_secs(3_600),
            upcoming_revalidate: Duration::from_secs(1_800),
            bypass_cache: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if url::Url::parse(&self.sportsdb_base_url).is_err() {
            anyhow::bail!(
                "SPORTSDB_BASE_URL is not a valid URL: {}",
                self.sportsdb_base_url
            );
        }
        if self.sportsdb_api_key.trim().is_empty() {
            anyhow::bail!("SPORTSDB_API_KEY must not be empty");
        }
        if self.league_id.trim().is_empty() || self.league_name.trim().is_empty() {
            anyhow::bail!("LEAGUE_ID and LEAGUE_NAME must not be empty");
        }
        if self.sport.trim().is_empty() {
            anyhow::bail!("SPORT must not be empty");
        }
        if !is_season_label(&self.season) {
            anyhow::bail!("SEASON must look like 2024-2025, got '{}'", self.season);
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        if self.cache_max_entries == 0 {
            anyhow::bail!("cache_max_entries must be positive");
        }
        Ok(())
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.sportsdb_base_url.clone(),
            api_key: self.sportsdb_api_key.trim().to_string(),
            timeout: Duration::from_secs(self.http_timeout_secs),
            cache_max_entries: self.cache_max_entries,
        }
    }

    pub fn league(&self) -> LeagueSettings {
        LeagueSettings {
            league_id: self.league_id.clone(),
            league_name: self.league_name.clone(),
            sport: self.sport.clone(),
            season: self.season.clone(),
            teams_revalidate: Duration::from_secs(self.teams_revalidate_secs),
            matches_revalidate: Duration::from_secs(self.matches_revalidate_secs),
            upcoming_revalidate: Duration::from_secs(self.upcoming_revalidate_secs),
            bypass_cache: self.no_cache,
        }
    }
}

/// "2024-2025" (consecutive years) or a single year "2024".
fn is_season_label(s: &str) -> bool {
    let years: Vec<&str> = s.split('-').collect();
    let parsed: Option<Vec<u16>> = years.iter().map(|y| y.parse().ok()).collect();
    match parsed.as_deref() {
        Some([_]) => years[0].len() == 4,
        Some([start, end]) => years.iter().all(|y| y.len() == 4) && *end == start + 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["courtside"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_defaults_validate() {
        let config = parse(&[]);
        assert!(config.validate().is_ok());
        assert_eq!(config.league().league_id, "4387");
        assert_eq!(config.provider().api_key, "3");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = parse(&["--sportsdb-base-url", "not a url"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_season() {
        assert!(parse(&["--season", "2024-2026"]).validate().is_err());
        assert!(parse(&["--season", "current"]).validate().is_err());
        assert!(parse(&["--season", "2024"]).validate().is_ok());
    }

    #[test]
    fn test_league_windows_from_args() {
        let config = parse(&["--matches-revalidate-secs", "60"]);
        assert_eq!(config.league().matches_revalidate, Duration::from_secs(60));
        assert_eq!(config.league().teams_revalidate, Duration::from_secs(86_400));
        assert!(!config.league().bypass_cache);
    }

    #[test]
    fn test_cache_flags() {
        let config = parse(&["--no-cache", "--cache-max-entries", "16"]);
        assert!(config.validate().is_ok());
        assert!(config.league().bypass_cache);
        assert_eq!(config.provider().cache_max_entries, 16);
        assert!(parse(&["--cache-max-entries", "0"]).validate().is_err());
    }
}

use anyhow::{Context, Result, anyhow};
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::http_client::http_client;
use crate::leaderboard::{LeaderboardRow, LeaderboardScope};
use crate::matches::{MatchRow, MatchUpsert, Team};
use crate::players::{NewPlayer, PlayerFilter, PlayerRow, PlayerUpdate};
use crate::squad::{SquadResponse, SquadUpdate};
use crate::stats_editor::{MatchId, StatRecord, StatsPayload};
use crate::wire;

const ERROR_BODY_MAX: usize = 200;

/// Backend operations used by the admin screens. `HttpApi` is the real
/// implementation; tests substitute an in-memory one.
pub trait AdminApi: Send + Sync {
    fn fetch_match_stats(&self, match_id: MatchId) -> Result<Vec<StatRecord>>;
    fn save_match_stats(&self, match_id: MatchId, payload: &StatsPayload) -> Result<()>;

    fn list_matches(&self) -> Result<Vec<MatchRow>>;
    fn list_teams(&self) -> Result<Vec<Team>>;
    fn add_match(&self, body: &MatchUpsert) -> Result<()>;
    fn edit_match(&self, match_id: MatchId, body: &MatchUpsert) -> Result<()>;
    fn delete_match(&self, match_id: MatchId) -> Result<()>;
    fn calculate_result(&self, match_id: MatchId) -> Result<CalculateSummary>;

    fn fetch_squad(&self, match_id: MatchId) -> Result<SquadResponse>;
    fn save_squad(&self, match_id: MatchId, body: &SquadUpdate) -> Result<()>;

    fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<PlayerRow>>;
    fn add_player(&self, body: &NewPlayer) -> Result<()>;
    fn edit_player(&self, player_id: &str, body: &PlayerUpdate) -> Result<()>;
    fn delete_player(&self, player_id: &str) -> Result<()>;

    fn leaderboard(
        &self,
        scope: LeaderboardScope,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardRow>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalculateSummary {
    #[serde(default, deserialize_with = "wire::count")]
    pub teams_processed: u32,
}

pub struct HttpApi {
    client: Client,
    api_base: Url,
    leaderboard_base: Url,
}

impl HttpApi {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http_client(config)?;
        let api_base = Url::parse(&config.api_base)
            .with_context(|| format!("invalid NPL_API_BASE {}", config.api_base))?;
        let leaderboard_base = Url::parse(&config.leaderboard_base).with_context(|| {
            format!("invalid NPL_LEADERBOARD_BASE {}", config.leaderboard_base)
        })?;
        Ok(Self {
            client,
            api_base,
            leaderboard_base,
        })
    }

    fn admin_url(&self, segments: &[&str]) -> Result<Url> {
        endpoint(&self.api_base, segments)
    }

    fn get(&self, url: Url) -> Result<String> {
        send(self.client.get(url))
    }

    fn send_json<T: Serialize + ?Sized>(&self, method: Method, url: Url, body: &T) -> Result<String> {
        send(self.client.request(method, url).json(body))
    }
}

impl AdminApi for HttpApi {
    fn fetch_match_stats(&self, match_id: MatchId) -> Result<Vec<StatRecord>> {
        let url = self.admin_url(&["matches", &match_id.to_string(), "stats"])?;
        let body = self.get(url)?;
        parse_stats_json(&body)
    }

    fn save_match_stats(&self, match_id: MatchId, payload: &StatsPayload) -> Result<()> {
        let url = self.admin_url(&["matches", &match_id.to_string(), "stats"])?;
        self.send_json(Method::POST, url, payload)?;
        Ok(())
    }

    fn list_matches(&self) -> Result<Vec<MatchRow>> {
        let body = self.get(self.admin_url(&["matches"])?)?;
        parse_matches_json(&body)
    }

    fn list_teams(&self) -> Result<Vec<Team>> {
        let body = self.get(self.admin_url(&["teams"])?)?;
        parse_teams_json(&body)
    }

    fn add_match(&self, body: &MatchUpsert) -> Result<()> {
        self.send_json(Method::POST, self.admin_url(&["matches", "add"])?, body)?;
        Ok(())
    }

    fn edit_match(&self, match_id: MatchId, body: &MatchUpsert) -> Result<()> {
        let url = self.admin_url(&["matches", &match_id.to_string(), "edit"])?;
        self.send_json(Method::PUT, url, body)?;
        Ok(())
    }

    fn delete_match(&self, match_id: MatchId) -> Result<()> {
        let url = self.admin_url(&["matches", &match_id.to_string(), "delete"])?;
        send(self.client.delete(url))?;
        Ok(())
    }

    fn calculate_result(&self, match_id: MatchId) -> Result<CalculateSummary> {
        let url = self.admin_url(&["matches", &match_id.to_string(), "calculate_result"])?;
        let body = send(self.client.post(url))?;
        parse_calculate_json(&body)
    }

    fn fetch_squad(&self, match_id: MatchId) -> Result<SquadResponse> {
        let url = self.admin_url(&["match_players", &match_id.to_string()])?;
        let body = self.get(url)?;
        parse_squad_json(&body)
    }

    fn save_squad(&self, match_id: MatchId, body: &SquadUpdate) -> Result<()> {
        let url = self.admin_url(&["match_players", &match_id.to_string(), "update"])?;
        self.send_json(Method::POST, url, body)?;
        Ok(())
    }

    fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<PlayerRow>> {
        let url = self.admin_url(&["players"])?;
        let body = send(self.client.get(url).query(&filter.query_pairs()))?;
        parse_players_json(&body)
    }

    fn add_player(&self, body: &NewPlayer) -> Result<()> {
        self.send_json(Method::POST, self.admin_url(&["players", "add"])?, body)?;
        Ok(())
    }

    fn edit_player(&self, player_id: &str, body: &PlayerUpdate) -> Result<()> {
        let url = self.admin_url(&["players", player_id, "edit"])?;
        self.send_json(Method::PUT, url, body)?;
        Ok(())
    }

    fn delete_player(&self, player_id: &str) -> Result<()> {
        let url = self.admin_url(&["players", player_id, "delete"])?;
        send(self.client.delete(url))?;
        Ok(())
    }

    fn leaderboard(
        &self,
        scope: LeaderboardScope,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardRow>> {
        let url = match scope {
            LeaderboardScope::Overall => endpoint(&self.leaderboard_base, &["overall"])?,
            LeaderboardScope::Match(id) => {
                endpoint(&self.leaderboard_base, &["match", &id.to_string()])?
            }
        };
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        let body = send(self.client.get(url).query(&query))?;
        parse_leaderboard_json(&body)
    }
}

/// Appends path segments to `base`, keeping the trailing slash the backend's
/// URL patterns expect.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| anyhow!("base url cannot carry a path: {base}"))?;
        path.pop_if_empty();
        path.extend(segments);
        path.push("");
    }
    Ok(url)
}

fn send(req: RequestBuilder) -> Result<String> {
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, truncate(&body, ERROR_BODY_MAX)));
    }
    Ok(body)
}

fn truncate(raw: &str, max: usize) -> String {
    let trimmed = raw.trim();
    match trimmed.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct MatchesEnvelope {
    #[serde(default)]
    matches: Vec<MatchRow>,
}

#[derive(Debug, Deserialize)]
struct TeamsEnvelope {
    #[serde(default)]
    teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
struct PlayersEnvelope {
    #[serde(default)]
    players: Vec<PlayerRow>,
}

#[derive(Debug, Deserialize)]
struct LeaderboardEnvelope {
    #[serde(default)]
    leaderboard: Vec<LeaderboardRow>,
}

pub fn parse_stats_json(raw: &str) -> Result<Vec<StatRecord>> {
    let payload: StatsPayload = serde_json::from_str(raw).context("invalid stats json")?;
    Ok(payload.players)
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<MatchRow>> {
    let envelope: MatchesEnvelope = serde_json::from_str(raw).context("invalid matches json")?;
    Ok(envelope.matches)
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>> {
    let envelope: TeamsEnvelope = serde_json::from_str(raw).context("invalid teams json")?;
    Ok(envelope.teams)
}

pub fn parse_squad_json(raw: &str) -> Result<SquadResponse> {
    serde_json::from_str(raw).context("invalid match players json")
}

pub fn parse_players_json(raw: &str) -> Result<Vec<PlayerRow>> {
    let envelope: PlayersEnvelope = serde_json::from_str(raw).context("invalid players json")?;
    Ok(envelope.players)
}

pub fn parse_leaderboard_json(raw: &str) -> Result<Vec<LeaderboardRow>> {
    let envelope: LeaderboardEnvelope =
        serde_json::from_str(raw).context("invalid leaderboard json")?;
    Ok(envelope.leaderboard)
}

pub fn parse_calculate_json(raw: &str) -> Result<CalculateSummary> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(CalculateSummary { teams_processed: 0 });
    }
    serde_json::from_str(trimmed).context("invalid calculate result json")
}

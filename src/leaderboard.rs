use serde::{Deserialize, Serialize};

use crate::matches::MatchRow;
use crate::stats_editor::MatchId;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    #[serde(default, deserialize_with = "wire::count")]
    pub rank: u32,
    #[serde(deserialize_with = "wire::id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "wire::rate")]
    pub total_points: f64,
}

impl LeaderboardRow {
    pub fn points_label(&self) -> String {
        format!("{:.2}", self.total_points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardScope {
    #[default]
    Overall,
    Match(MatchId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub scope: LeaderboardScope,
    pub limit: usize,
    pub offset: usize,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct LeaderboardState {
    scope: LeaderboardScope,
    rows: Vec<LeaderboardRow>,
    limit: usize,
    offset: usize,
    generation: u64,
    loading: bool,
    load_error: Option<String>,
}

impl LeaderboardState {
    pub fn new(limit: usize) -> Self {
        Self {
            scope: LeaderboardScope::Overall,
            rows: Vec::new(),
            limit: limit.max(1),
            offset: 0,
            generation: 0,
            loading: true,
            load_error: None,
        }
    }

    pub fn scope(&self) -> LeaderboardScope {
        self.scope
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn title(&self) -> &'static str {
        match self.scope {
            LeaderboardScope::Overall => "Overall Leaderboard",
            LeaderboardScope::Match(_) => "Match Leaderboard",
        }
    }

    /// Moves the match filter through "all matches" then each listed match.
    pub fn cycle_scope(&mut self, matches: &[MatchRow], delta: isize) -> LeaderboardQuery {
        let slots = matches.len() as isize + 1;
        let pos = match self.scope {
            LeaderboardScope::Overall => 0,
            LeaderboardScope::Match(id) => matches
                .iter()
                .position(|m| m.id == id)
                .map(|p| p as isize + 1)
                .unwrap_or(0),
        };
        let next = (pos + delta).rem_euclid(slots);
        self.scope = if next == 0 {
            LeaderboardScope::Overall
        } else {
            LeaderboardScope::Match(matches[next as usize - 1].id)
        };
        self.offset = 0;
        self.begin_load()
    }

    pub fn next_page(&mut self) -> Option<LeaderboardQuery> {
        if self.rows.len() < self.limit {
            return None;
        }
        self.offset += self.limit;
        Some(self.begin_load())
    }

    pub fn prev_page(&mut self) -> Option<LeaderboardQuery> {
        if self.offset == 0 {
            return None;
        }
        self.offset = self.offset.saturating_sub(self.limit);
        Some(self.begin_load())
    }

    pub fn begin_load(&mut self) -> LeaderboardQuery {
        self.generation += 1;
        self.loading = true;
        self.load_error = None;
        LeaderboardQuery {
            scope: self.scope,
            limit: self.limit,
            offset: self.offset,
            generation: self.generation,
        }
    }

    /// Returns false when the response belongs to an outdated query.
    pub fn finish_load(
        &mut self,
        query: LeaderboardQuery,
        result: Result<Vec<LeaderboardRow>, String>,
    ) -> bool {
        if query.generation != self.generation {
            return false;
        }
        self.loading = false;
        match result {
            Ok(rows) => {
                self.rows = rows;
                self.load_error = None;
            }
            Err(err) => {
                self.rows.clear();
                self.load_error = Some(err);
            }
        }
        true
    }
}

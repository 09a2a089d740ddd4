use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::stats_editor::MatchId;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRow {
    #[serde(deserialize_with = "wire::u64_value")]
    pub id: MatchId,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub teams: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub match_date: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "wire::opt_u64")]
    pub team_1: Option<u64>,
    #[serde(default, deserialize_with = "wire::opt_u64")]
    pub team_2: Option<u64>,
}

impl MatchRow {
    pub fn label(&self) -> String {
        format!("{} – {} ({})", self.match_date, self.teams, self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(deserialize_with = "wire::u64_value")]
    pub team_id: u64,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub team_name: String,
}

/// Body of the add and edit match endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpsert {
    pub match_date: String,
    pub team_1: u64,
    pub team_2: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSubmit {
    Add(MatchUpsert),
    Update { id: MatchId, body: MatchUpsert },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchFormFocus {
    #[default]
    Date,
    Team1,
    Team2,
}

impl MatchFormFocus {
    pub fn next(self) -> Self {
        match self {
            MatchFormFocus::Date => MatchFormFocus::Team1,
            MatchFormFocus::Team1 => MatchFormFocus::Team2,
            MatchFormFocus::Team2 => MatchFormFocus::Date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchForm {
    pub editing_id: Option<MatchId>,
    pub date: String,
    pub team1: Option<u64>,
    pub team2: Option<u64>,
    pub focus: MatchFormFocus,
}

impl MatchForm {
    /// Clears the form back to "add" mode with both pickers on the first team.
    pub fn reset(&mut self, teams: &[Team]) {
        let first = teams.first().map(|t| t.team_id);
        *self = Self {
            team1: first,
            team2: first,
            ..Self::default()
        };
    }

    pub fn start_edit(&mut self, row: &MatchRow) {
        self.editing_id = Some(row.id);
        self.date = row.match_date.clone();
        if let Some(team) = row.team_1 {
            self.team1 = Some(team);
        }
        if let Some(team) = row.team_2 {
            self.team2 = Some(team);
        }
        self.focus = MatchFormFocus::Date;
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn cycle_team(&mut self, teams: &[Team], delta: isize) {
        let slot = match self.focus {
            MatchFormFocus::Team1 => &mut self.team1,
            MatchFormFocus::Team2 => &mut self.team2,
            MatchFormFocus::Date => return,
        };
        *slot = cycle_id(teams, *slot, delta);
    }

    pub fn payload(&self) -> Result<MatchUpsert, FormError> {
        let date = self.date.trim();
        if date.is_empty() {
            return Err(FormError::MissingFields);
        }
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(date.to_string()))?;
        let (Some(team_1), Some(team_2)) = (self.team1, self.team2) else {
            return Err(FormError::MissingFields);
        };
        if team_1 == team_2 {
            return Err(FormError::SameTeams);
        }
        Ok(MatchUpsert {
            match_date: parsed.format("%Y-%m-%d").to_string(),
            team_1,
            team_2,
        })
    }

    pub fn submit(&self) -> Result<MatchSubmit, FormError> {
        let body = self.payload()?;
        Ok(match self.editing_id {
            Some(id) => MatchSubmit::Update { id, body },
            None => MatchSubmit::Add(body),
        })
    }
}

fn cycle_id(teams: &[Team], current: Option<u64>, delta: isize) -> Option<u64> {
    if teams.is_empty() {
        return None;
    }
    let len = teams.len() as isize;
    let pos = current
        .and_then(|id| teams.iter().position(|t| t.team_id == id))
        .map(|p| p as isize)
        .unwrap_or(0);
    let next = (pos + delta).rem_euclid(len) as usize;
    Some(teams[next].team_id)
}

#[derive(Debug, Clone, Default)]
pub struct MatchesState {
    pub matches: Vec<MatchRow>,
    pub teams: Vec<Team>,
    pub selected: usize,
    pub form: MatchForm,
    pub form_active: bool,
    pub pending_calculate: Option<MatchId>,
    pub loading: bool,
}

impl MatchesState {
    pub fn set_matches(&mut self, matches: Vec<MatchRow>) {
        self.matches = matches;
        self.selected = self.selected.min(self.matches.len().saturating_sub(1));
        self.loading = false;
    }

    pub fn set_teams(&mut self, teams: Vec<Team>) {
        self.teams = teams;
        if !self.form.is_editing() {
            self.form.reset(&self.teams);
        }
    }

    pub fn selected_match(&self) -> Option<&MatchRow> {
        self.matches.get(self.selected)
    }

    pub fn team_name(&self, team_id: Option<u64>) -> &str {
        team_id
            .and_then(|id| self.teams.iter().find(|t| t.team_id == id))
            .map(|t| t.team_name.as_str())
            .unwrap_or("-")
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.matches.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(self.matches.len() - 1);
    }

    pub fn cancel_form(&mut self) {
        self.form.reset(&self.teams);
        self.form_active = false;
    }
}

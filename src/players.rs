use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::matches::Team;
use crate::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Bowler,
    Batter,
    Allrounder,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Bowler, Role::Batter, Role::Allrounder];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Bowler => "BOWLER",
            Role::Batter => "BATTER",
            Role::Allrounder => "ALLROUNDER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BOWLER" => Ok(Role::Bowler),
            "BATTER" => Ok(Role::Batter),
            "ALLROUNDER" => Ok(Role::Allrounder),
            other => Err(format!("unknown role {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    #[serde(deserialize_with = "wire::id")]
    pub player_id: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub player_name: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "wire::rate")]
    pub cost: f64,
    #[serde(default, deserialize_with = "wire::opt_u64")]
    pub team_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub team_name: String,
}

impl PlayerRow {
    pub fn label(&self) -> String {
        format!(
            "{} ({}) | {} | Cost {}",
            self.player_name, self.role, self.team_name, self.cost
        )
    }
}

/// Query filters for the player list. Blank filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub player_id: String,
    pub name: String,
    pub role: Option<Role>,
    pub team_id: Option<u64>,
    pub max_cost: String,
}

impl PlayerFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_non_empty(&mut pairs, "player_id", &self.player_id);
        push_non_empty(&mut pairs, "name", &self.name);
        if let Some(role) = self.role {
            pairs.push(("role", role.as_str().to_string()));
        }
        if let Some(team_id) = self.team_id {
            pairs.push(("team_id", team_id.to_string()));
        }
        push_non_empty(&mut pairs, "max_cost", &self.max_cost);
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

fn push_non_empty(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        pairs.push((key, trimmed.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub player_id: String,
    pub player_name: String,
    pub role: Role,
    pub cost: f64,
    pub team_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    pub player_name: String,
    pub role: Role,
    pub cost: f64,
    pub team_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSubmit {
    Add(NewPlayer),
    Update { id: String, body: PlayerUpdate },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerForm {
    pub editing_id: Option<String>,
    pub player_id: String,
    pub name: String,
    pub role: Option<Role>,
    pub cost: String,
    pub team_id: Option<u64>,
}

impl PlayerForm {
    /// Clears every field except the team picker.
    pub fn reset(&mut self) {
        let team_id = self.team_id;
        *self = Self {
            team_id,
            ..Self::default()
        };
    }

    pub fn start_edit(&mut self, row: &PlayerRow) {
        self.editing_id = Some(row.player_id.clone());
        self.player_id = row.player_id.clone();
        self.name = row.player_name.clone();
        self.role = row.role.parse().ok();
        self.cost = row.cost.to_string();
        self.team_id = row.team_id;
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn submit(&self) -> Result<PlayerSubmit, FormError> {
        let name = self.name.trim();
        let Some(role) = self.role else {
            return Err(FormError::MissingFields);
        };
        let Some(team_id) = self.team_id.filter(|id| *id != 0) else {
            return Err(FormError::MissingFields);
        };
        if name.is_empty() {
            return Err(FormError::MissingFields);
        }
        let cost = parse_cost(&self.cost)?;

        match &self.editing_id {
            Some(id) => Ok(PlayerSubmit::Update {
                id: id.clone(),
                body: PlayerUpdate {
                    player_name: name.to_string(),
                    role,
                    cost,
                    team_id,
                },
            }),
            None => {
                let player_id = self.player_id.trim();
                if player_id.is_empty() {
                    return Err(FormError::MissingFields);
                }
                Ok(PlayerSubmit::Add(NewPlayer {
                    player_id: player_id.to_string(),
                    player_name: name.to_string(),
                    role,
                    cost,
                    team_id,
                }))
            }
        }
    }
}

fn parse_cost(raw: &str) -> Result<f64, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::MissingFields);
    }
    let cost = trimmed
        .parse::<f64>()
        .ok()
        .filter(|c| c.is_finite())
        .ok_or_else(|| FormError::InvalidCost(trimmed.to_string()))?;
    if cost <= 0.0 {
        return Err(FormError::MissingFields);
    }
    Ok(cost)
}

pub fn cycle_role(current: Option<Role>, delta: isize) -> Option<Role> {
    // None is the "any role" slot in front of the real roles.
    let slots = Role::ALL.len() as isize + 1;
    let pos = current
        .and_then(|r| Role::ALL.iter().position(|x| *x == r))
        .map(|p| p as isize + 1)
        .unwrap_or(0);
    let next = (pos + delta).rem_euclid(slots);
    if next == 0 {
        None
    } else {
        Some(Role::ALL[next as usize - 1])
    }
}

pub fn cycle_team(teams: &[Team], current: Option<u64>, delta: isize) -> Option<u64> {
    let slots = teams.len() as isize + 1;
    let pos = current
        .and_then(|id| teams.iter().position(|t| t.team_id == id))
        .map(|p| p as isize + 1)
        .unwrap_or(0);
    let next = (pos + delta).rem_euclid(slots);
    if next == 0 {
        None
    } else {
        Some(teams[next as usize - 1].team_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerField {
    #[default]
    FilterId,
    FilterName,
    FilterRole,
    FilterTeam,
    FilterMaxCost,
    FormId,
    FormName,
    FormRole,
    FormCost,
    FormTeam,
}

impl PlayerField {
    pub const FILTERS: [PlayerField; 5] = [
        PlayerField::FilterId,
        PlayerField::FilterName,
        PlayerField::FilterRole,
        PlayerField::FilterTeam,
        PlayerField::FilterMaxCost,
    ];
    pub const FORM: [PlayerField; 5] = [
        PlayerField::FormId,
        PlayerField::FormName,
        PlayerField::FormRole,
        PlayerField::FormCost,
        PlayerField::FormTeam,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlayerField::FilterId | PlayerField::FormId => "Player ID",
            PlayerField::FilterName | PlayerField::FormName => "Name",
            PlayerField::FilterRole | PlayerField::FormRole => "Role",
            PlayerField::FilterTeam | PlayerField::FormTeam => "Team",
            PlayerField::FilterMaxCost => "Max cost",
            PlayerField::FormCost => "Cost",
        }
    }

    pub fn is_picker(self) -> bool {
        matches!(
            self,
            PlayerField::FilterRole
                | PlayerField::FilterTeam
                | PlayerField::FormRole
                | PlayerField::FormTeam
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayersMode {
    #[default]
    Browse,
    Filter,
    Form,
}

#[derive(Debug, Clone, Default)]
pub struct PlayersState {
    pub players: Vec<PlayerRow>,
    pub teams: Vec<Team>,
    pub selected: usize,
    pub filter: PlayerFilter,
    pub form: PlayerForm,
    pub mode: PlayersMode,
    pub focus: PlayerField,
    pub loading: bool,
}

impl PlayersState {
    pub fn set_players(&mut self, players: Vec<PlayerRow>) {
        self.players = players;
        self.selected = self.selected.min(self.players.len().saturating_sub(1));
        self.loading = false;
    }

    pub fn set_teams(&mut self, teams: Vec<Team>) {
        self.teams = teams;
        if self.form.team_id.is_none() {
            self.form.team_id = self.teams.first().map(|t| t.team_id);
        }
    }

    pub fn selected_player(&self) -> Option<&PlayerRow> {
        self.players.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.players.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(self.players.len() - 1);
    }

    pub fn team_name(&self, team_id: Option<u64>) -> &str {
        team_id
            .and_then(|id| self.teams.iter().find(|t| t.team_id == id))
            .map(|t| t.team_name.as_str())
            .unwrap_or("Any")
    }

    pub fn open_filter(&mut self) {
        self.mode = PlayersMode::Filter;
        self.focus = PlayerField::FilterId;
    }

    pub fn open_form(&mut self, edit: bool) {
        if edit {
            if let Some(row) = self.players.get(self.selected).cloned() {
                self.form.start_edit(&row);
            }
        } else {
            self.form.reset();
        }
        self.mode = PlayersMode::Form;
        self.focus = if self.form.is_editing() {
            PlayerField::FormName
        } else {
            PlayerField::FormId
        };
    }

    pub fn close_panel(&mut self) {
        if self.mode == PlayersMode::Form {
            self.form.reset();
        }
        self.mode = PlayersMode::Browse;
    }

    pub fn cycle_focus(&mut self, delta: isize) {
        let fields: &[PlayerField] = match self.mode {
            PlayersMode::Filter => &PlayerField::FILTERS,
            PlayersMode::Form => &PlayerField::FORM,
            PlayersMode::Browse => return,
        };
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let mut next = (pos + delta).rem_euclid(fields.len() as isize) as usize;
        // The id is fixed while editing an existing player.
        if fields[next] == PlayerField::FormId && self.form.is_editing() {
            let step = if delta < 0 { -1 } else { 1 };
            next = (next as isize + step).rem_euclid(fields.len() as isize) as usize;
        }
        self.focus = fields[next];
    }

    /// Text buffer behind the focused field, if it is a text field.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            PlayerField::FilterId => Some(&mut self.filter.player_id),
            PlayerField::FilterName => Some(&mut self.filter.name),
            PlayerField::FilterMaxCost => Some(&mut self.filter.max_cost),
            PlayerField::FormId if !self.form.is_editing() => Some(&mut self.form.player_id),
            PlayerField::FormName => Some(&mut self.form.name),
            PlayerField::FormCost => Some(&mut self.form.cost),
            _ => None,
        }
    }

    pub fn cycle_picker(&mut self, delta: isize) {
        match self.focus {
            PlayerField::FilterRole => self.filter.role = cycle_role(self.filter.role, delta),
            PlayerField::FilterTeam => {
                self.filter.team_id = cycle_team(&self.teams, self.filter.team_id, delta)
            }
            PlayerField::FormRole => self.form.role = cycle_role(self.form.role, delta),
            PlayerField::FormTeam => {
                self.form.team_id = cycle_team(&self.teams, self.form.team_id, delta)
            }
            _ => {}
        }
    }

    pub fn field_display(&self, field: PlayerField) -> String {
        match field {
            PlayerField::FilterId => self.filter.player_id.clone(),
            PlayerField::FilterName => self.filter.name.clone(),
            PlayerField::FilterRole => self
                .filter
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "Any".to_string()),
            PlayerField::FilterTeam => self.team_name(self.filter.team_id).to_string(),
            PlayerField::FilterMaxCost => self.filter.max_cost.clone(),
            PlayerField::FormId => self.form.player_id.clone(),
            PlayerField::FormName => self.form.name.clone(),
            PlayerField::FormRole => self
                .form
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "Select role".to_string()),
            PlayerField::FormCost => self.form.cost.clone(),
            PlayerField::FormTeam => self.team_name(self.form.team_id).to_string(),
        }
    }
}

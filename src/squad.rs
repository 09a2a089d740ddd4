use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::stats_editor::{LoadOutcome, LoadTicket, MatchId};
use crate::wire::{self, WireId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadPlayer {
    pub player_id: WireId,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub player_name: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub team_name: String,
    #[serde(default)]
    pub is_playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadMatch {
    #[serde(deserialize_with = "wire::u64_value")]
    pub id: MatchId,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub team1_name: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub team2_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SquadResponse {
    #[serde(default)]
    pub players: Vec<SquadPlayer>,
    #[serde(rename = "match", default)]
    pub info: Option<SquadMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadUpdate {
    pub playing_ids: Vec<WireId>,
}

/// Playing-XI picker for one match: the roster of both teams and the set of
/// players ticked as playing.
#[derive(Debug, Clone, Default)]
pub struct SquadSelection {
    match_id: Option<MatchId>,
    generation: u64,
    info: Option<SquadMatch>,
    players: Vec<SquadPlayer>,
    selected: HashSet<WireId>,
    load_error: Option<String>,
    pub cursor: usize,
}

impl SquadSelection {
    pub fn match_id(&self) -> Option<MatchId> {
        self.match_id
    }

    pub fn info(&self) -> Option<&SquadMatch> {
        self.info.as_ref()
    }

    pub fn players(&self) -> &[SquadPlayer] {
        &self.players
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The screen shows a loading message until match info has arrived.
    pub fn is_loaded(&self) -> bool {
        self.info.is_some()
    }

    pub fn begin_load(&mut self, match_id: MatchId) -> LoadTicket {
        if self.match_id != Some(match_id) {
            *self = Self {
                match_id: Some(match_id),
                generation: self.generation,
                ..Self::default()
            };
        }
        self.load_error = None;
        self.generation += 1;
        LoadTicket {
            match_id,
            generation: self.generation,
        }
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SquadResponse, String>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || Some(ticket.match_id) != self.match_id {
            return LoadOutcome::Stale {
                generation: ticket.generation,
                latest: self.generation,
            };
        }
        match result {
            Ok(response) => {
                self.selected = response
                    .players
                    .iter()
                    .filter(|p| p.is_playing)
                    .map(|p| p.player_id.clone())
                    .collect();
                let count = response.players.len();
                self.players = response.players;
                self.info = response.info;
                self.cursor = self.cursor.min(count.saturating_sub(1));
                self.load_error = None;
                LoadOutcome::Applied { records: count }
            }
            Err(error) => {
                self.load_error = Some(error.clone());
                LoadOutcome::Failed { error }
            }
        }
    }

    pub fn is_selected(&self, player_id: &WireId) -> bool {
        self.selected.contains(player_id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Flips `player_id` in or out of the playing set. Returns the new state.
    pub fn toggle(&mut self, player_id: &WireId) -> bool {
        if self.selected.remove(player_id) {
            false
        } else {
            self.selected.insert(player_id.clone());
            true
        }
    }

    pub fn toggle_at_cursor(&mut self) -> Option<bool> {
        let id = self.players.get(self.cursor)?.player_id.clone();
        Some(self.toggle(&id))
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.players.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = self
            .cursor
            .saturating_add_signed(delta)
            .min(self.players.len() - 1);
    }

    /// Playing ids in roster order.
    pub fn update_payload(&self) -> Option<(MatchId, SquadUpdate)> {
        let match_id = self.match_id.filter(|_| self.is_loaded())?;
        let playing_ids = self
            .players
            .iter()
            .filter(|p| self.selected.contains(&p.player_id))
            .map(|p| p.player_id.clone())
            .collect();
        Some((match_id, SquadUpdate { playing_ids }))
    }
}

use std::collections::VecDeque;

use crate::api::CalculateSummary;
use crate::error::{FormError, StatsError};
use crate::leaderboard::{LeaderboardQuery, LeaderboardRow, LeaderboardState};
use crate::matches::{MatchRow, MatchSubmit, MatchUpsert, MatchesState, Team};
use crate::players::{NewPlayer, PlayerFilter, PlayerRow, PlayerSubmit, PlayerUpdate, PlayersState};
use crate::squad::{SquadResponse, SquadSelection, SquadUpdate};
use crate::stats_editor::{LoadOutcome, LoadTicket, MatchId, SaveRequest, StatRecord, StatsEditor};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Matches,
    Squad,
    Stats,
    Players,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Blocking message box; input is swallowed until it is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn verb(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// Requests handed to the network worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadStats(LoadTicket),
    SaveStats(SaveRequest),
    LoadMatches,
    LoadTeams,
    AddMatch(MatchUpsert),
    UpdateMatch { id: MatchId, body: MatchUpsert },
    DeleteMatch(MatchId),
    CalculateResult(MatchId),
    LoadSquad(LoadTicket),
    SaveSquad { match_id: MatchId, body: SquadUpdate },
    LoadPlayers(PlayerFilter),
    AddPlayer(NewPlayer),
    UpdatePlayer { id: String, body: PlayerUpdate },
    DeletePlayer(String),
    LoadLeaderboard(LeaderboardQuery),
}

/// Completions reported back by the worker, applied on the UI thread.
#[derive(Debug, Clone)]
pub enum Delta {
    StatsLoaded {
        ticket: LoadTicket,
        result: Result<Vec<StatRecord>, String>,
    },
    StatsSaved {
        match_id: MatchId,
        result: Result<(), String>,
    },
    MatchesLoaded(Result<Vec<MatchRow>, String>),
    TeamsLoaded(Result<Vec<Team>, String>),
    MatchChanged {
        kind: ChangeKind,
        result: Result<(), String>,
    },
    ResultCalculated {
        match_id: MatchId,
        result: Result<CalculateSummary, String>,
    },
    SquadLoaded {
        ticket: LoadTicket,
        result: Result<SquadResponse, String>,
    },
    SquadSaved {
        match_id: MatchId,
        result: Result<(), String>,
    },
    PlayersLoaded(Result<Vec<PlayerRow>, String>),
    PlayerChanged {
        kind: ChangeKind,
        result: Result<(), String>,
    },
    LeaderboardLoaded {
        query: LeaderboardQuery,
        result: Result<Vec<LeaderboardRow>, String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub notice: Option<Notice>,
    pub matches: MatchesState,
    pub squad: SquadSelection,
    pub stats: StatsEditor,
    pub players: PlayersState,
    pub leaderboard: LeaderboardState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_leaderboard_page(100)
    }

    pub fn with_leaderboard_page(page: usize) -> Self {
        Self {
            screen: Screen::Matches,
            logs: VecDeque::new(),
            help_overlay: false,
            notice: None,
            matches: MatchesState {
                loading: true,
                ..MatchesState::default()
            },
            squad: SquadSelection::default(),
            stats: StatsEditor::new(),
            players: PlayersState::default(),
            leaderboard: LeaderboardState::new(page),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Commands issued once at startup.
    pub fn initial_commands(&mut self) -> Vec<Command> {
        self.players.loading = true;
        vec![
            Command::LoadMatches,
            Command::LoadTeams,
            Command::LoadPlayers(PlayerFilter::default()),
        ]
    }

    pub fn open_stats(&mut self, match_id: MatchId) -> Command {
        self.screen = Screen::Stats;
        Command::LoadStats(self.stats.begin_load(match_id))
    }

    pub fn retry_stats(&mut self) -> Option<Command> {
        self.stats.retry_load().map(Command::LoadStats)
    }

    pub fn save_stats(&mut self) -> Result<Command, StatsError> {
        let request = self.stats.save()?;
        self.push_log(format!(
            "[INFO] Saving stats for match {} ({} players)",
            request.match_id,
            request.payload.players.len()
        ));
        Ok(Command::SaveStats(request))
    }

    pub fn open_squad(&mut self, match_id: MatchId) -> Command {
        self.screen = Screen::Squad;
        Command::LoadSquad(self.squad.begin_load(match_id))
    }

    pub fn save_squad(&mut self) -> Option<Command> {
        let (match_id, body) = self.squad.update_payload()?;
        self.push_log(format!(
            "[INFO] Saving squad for match {match_id} ({} playing)",
            body.playing_ids.len()
        ));
        Some(Command::SaveSquad { match_id, body })
    }

    pub fn submit_match_form(&mut self) -> Result<Command, FormError> {
        let cmd = match self.matches.form.submit()? {
            MatchSubmit::Add(body) => Command::AddMatch(body),
            MatchSubmit::Update { id, body } => Command::UpdateMatch { id, body },
        };
        // Values stay in the form until the backend accepts them.
        self.matches.form_active = false;
        Ok(cmd)
    }

    pub fn delete_selected_match(&mut self) -> Option<Command> {
        let id = self.matches.selected_match()?.id;
        Some(Command::DeleteMatch(id))
    }

    pub fn request_calculate(&mut self) -> bool {
        let Some(id) = self.matches.selected_match().map(|m| m.id) else {
            return false;
        };
        self.matches.pending_calculate = Some(id);
        true
    }

    pub fn confirm_calculate(&mut self, confirmed: bool) -> Option<Command> {
        let id = self.matches.pending_calculate.take()?;
        confirmed.then_some(Command::CalculateResult(id))
    }

    pub fn apply_player_filter(&mut self) -> Command {
        self.players.loading = true;
        self.players.mode = crate::players::PlayersMode::Browse;
        Command::LoadPlayers(self.players.filter.clone())
    }

    pub fn submit_player_form(&mut self) -> Result<Command, FormError> {
        let cmd = match self.players.form.submit()? {
            PlayerSubmit::Add(body) => Command::AddPlayer(body),
            PlayerSubmit::Update { id, body } => Command::UpdatePlayer { id, body },
        };
        self.players.close_panel();
        Ok(cmd)
    }

    pub fn delete_selected_player(&mut self) -> Option<Command> {
        let id = self.players.selected_player()?.player_id.clone();
        Some(Command::DeletePlayer(id))
    }

    pub fn open_leaderboard(&mut self) -> Command {
        self.screen = Screen::Leaderboard;
        Command::LoadLeaderboard(self.leaderboard.begin_load())
    }

    pub fn cycle_leaderboard_scope(&mut self, delta: isize) -> Command {
        Command::LoadLeaderboard(self.leaderboard.cycle_scope(&self.matches.matches, delta))
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::StatsLoaded { ticket, result } => {
            match state.stats.finish_load(ticket, result) {
                LoadOutcome::Applied { records } => state.push_log(format!(
                    "[INFO] Loaded {records} players for match {}",
                    ticket.match_id
                )),
                LoadOutcome::Stale { generation, latest } => state.push_log(format!(
                    "[INFO] Dropped stale stats response for match {} (request {generation}, latest {latest})",
                    ticket.match_id
                )),
                LoadOutcome::Failed { error } => {
                    state.push_log(format!("[WARN] Stats load failed: {error}"))
                }
            }
        }
        Delta::StatsSaved { match_id, result } => {
            state.stats.finish_save();
            match result {
                Ok(()) => {
                    state.push_log(format!("[INFO] Stats saved for match {match_id}"));
                    state.notice = Some(Notice::info("Saved", "Stats saved"));
                }
                Err(err) => {
                    state.push_log(format!("[WARN] Stats save failed: {err}"));
                    state.notice = Some(Notice::error(
                        "Save failed",
                        format!("Stats were not saved: {err}\nYour edits are kept; press s to retry."),
                    ));
                }
            }
        }
        Delta::MatchesLoaded(result) => match result {
            Ok(matches) => state.matches.set_matches(matches),
            Err(err) => {
                state.matches.loading = false;
                state.push_log(format!("[WARN] Match list fetch failed: {err}"));
            }
        },
        Delta::TeamsLoaded(result) => match result {
            Ok(teams) => {
                state.matches.set_teams(teams.clone());
                state.players.set_teams(teams);
            }
            Err(err) => state.push_log(format!("[WARN] Team list fetch failed: {err}")),
        },
        Delta::MatchChanged { kind, result } => match result {
            Ok(()) => {
                state.push_log(format!("[INFO] Match {}", kind.verb()));
                if kind != ChangeKind::Deleted && !state.matches.form_active {
                    state.matches.cancel_form();
                }
            }
            Err(err) => {
                state.push_log(format!("[WARN] Match change failed: {err}"));
                let title = match kind {
                    ChangeKind::Added => "Match not added",
                    ChangeKind::Updated => "Match not updated",
                    ChangeKind::Deleted => "Delete failed",
                };
                if kind != ChangeKind::Deleted {
                    state.matches.form_active = true;
                }
                state.notice = Some(Notice::error(title, err));
            }
        },
        Delta::ResultCalculated { match_id, result } => match result {
            Ok(summary) => {
                state.push_log(format!(
                    "[INFO] Results calculated for match {match_id}: {} teams",
                    summary.teams_processed
                ));
                state.notice = Some(Notice::info(
                    "Results",
                    format!("Results calculated for {} teams", summary.teams_processed),
                ));
            }
            Err(err) => {
                state.push_log(format!("[WARN] Calculation failed: {err}"));
                state.notice = Some(Notice::error("Calculation failed", err));
            }
        },
        Delta::SquadLoaded { ticket, result } => match state.squad.finish_load(ticket, result) {
            LoadOutcome::Applied { records } => state.push_log(format!(
                "[INFO] Loaded squad of {records} for match {}",
                ticket.match_id
            )),
            LoadOutcome::Stale { .. } => state.push_log(format!(
                "[INFO] Dropped stale squad response for match {}",
                ticket.match_id
            )),
            LoadOutcome::Failed { error } => {
                state.push_log(format!("[WARN] Squad load failed: {error}"))
            }
        },
        Delta::SquadSaved { match_id, result } => match result {
            Ok(()) => {
                state.push_log(format!("[INFO] Squad updated for match {match_id}"));
                state.notice = Some(Notice::info("Saved", "Squad updated"));
                state.screen = Screen::Matches;
            }
            Err(err) => {
                state.push_log(format!("[WARN] Squad save failed: {err}"));
                state.notice = Some(Notice::error("Save failed", err));
            }
        },
        Delta::PlayersLoaded(result) => match result {
            Ok(players) => state.players.set_players(players),
            Err(err) => {
                state.players.loading = false;
                state.push_log(format!("[WARN] Player list fetch failed: {err}"));
            }
        },
        Delta::PlayerChanged { kind, result } => match result {
            Ok(()) => state.push_log(format!("[INFO] Player {}", kind.verb())),
            Err(err) => {
                state.push_log(format!("[WARN] Player change failed: {err}"));
                state.notice = Some(Notice::error("Player not saved", err));
            }
        },
        Delta::LeaderboardLoaded { query, result } => {
            if let Err(err) = &result {
                state.push_log(format!("[WARN] Leaderboard fetch failed: {err}"));
            }
            if !state.leaderboard.finish_load(query, result) {
                state.push_log("[INFO] Dropped stale leaderboard response");
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

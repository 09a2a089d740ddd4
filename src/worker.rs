use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::api::AdminApi;
use crate::players::PlayerFilter;
use crate::state::{ChangeKind, Command, Delta};

/// Runs each command on its own thread so a slow request never blocks the
/// next one. Completions arrive on `tx` in whatever order the backend
/// answers; the UI side decides which ones are still current.
pub fn spawn_worker(
    api: Arc<dyn AdminApi>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<Command>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let api = Arc::clone(&api);
            let tx = tx.clone();
            thread::spawn(move || run_command(api.as_ref(), cmd, &tx));
        }
    })
}

/// Executes one command synchronously and reports every resulting delta.
pub fn run_command(api: &dyn AdminApi, cmd: Command, tx: &Sender<Delta>) {
    match cmd {
        Command::LoadStats(ticket) => {
            let result = api
                .fetch_match_stats(ticket.match_id)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::StatsLoaded { ticket, result });
        }
        Command::SaveStats(request) => {
            let result = api
                .save_match_stats(request.match_id, &request.payload)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::StatsSaved {
                match_id: request.match_id,
                result,
            });
        }
        Command::LoadMatches => refresh_matches(api, tx),
        Command::LoadTeams => {
            let result = api.list_teams().map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::TeamsLoaded(result));
        }
        Command::AddMatch(body) => {
            let result = api.add_match(&body).map_err(|err| format!("{err:#}"));
            finish_match_change(api, tx, ChangeKind::Added, result);
        }
        Command::UpdateMatch { id, body } => {
            let result = api.edit_match(id, &body).map_err(|err| format!("{err:#}"));
            finish_match_change(api, tx, ChangeKind::Updated, result);
        }
        Command::DeleteMatch(id) => {
            let result = api.delete_match(id).map_err(|err| format!("{err:#}"));
            finish_match_change(api, tx, ChangeKind::Deleted, result);
        }
        Command::CalculateResult(match_id) => {
            let result = api
                .calculate_result(match_id)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::ResultCalculated { match_id, result });
        }
        Command::LoadSquad(ticket) => {
            let result = api
                .fetch_squad(ticket.match_id)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::SquadLoaded { ticket, result });
        }
        Command::SaveSquad { match_id, body } => {
            let result = api
                .save_squad(match_id, &body)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::SquadSaved { match_id, result });
        }
        Command::LoadPlayers(filter) => {
            let result = api.list_players(&filter).map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::PlayersLoaded(result));
        }
        Command::AddPlayer(body) => {
            let result = api.add_player(&body).map_err(|err| format!("{err:#}"));
            finish_player_change(api, tx, ChangeKind::Added, result);
        }
        Command::UpdatePlayer { id, body } => {
            let result = api.edit_player(&id, &body).map_err(|err| format!("{err:#}"));
            finish_player_change(api, tx, ChangeKind::Updated, result);
        }
        Command::DeletePlayer(id) => {
            let result = api.delete_player(&id).map_err(|err| format!("{err:#}"));
            finish_player_change(api, tx, ChangeKind::Deleted, result);
        }
        Command::LoadLeaderboard(query) => {
            let result = api
                .leaderboard(query.scope, query.limit, query.offset)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Delta::LeaderboardLoaded { query, result });
        }
    }
}

fn refresh_matches(api: &dyn AdminApi, tx: &Sender<Delta>) {
    let result = api.list_matches().map_err(|err| format!("{err:#}"));
    let _ = tx.send(Delta::MatchesLoaded(result));
}

fn finish_match_change(
    api: &dyn AdminApi,
    tx: &Sender<Delta>,
    kind: ChangeKind,
    result: Result<(), String>,
) {
    let changed = result.is_ok();
    let _ = tx.send(Delta::MatchChanged { kind, result });
    if changed {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Match {}, refreshing match list",
            kind.verb()
        )));
        refresh_matches(api, tx);
    }
}

// A successful player change always reloads the unfiltered list.
fn finish_player_change(
    api: &dyn AdminApi,
    tx: &Sender<Delta>,
    kind: ChangeKind,
    result: Result<(), String>,
) {
    let changed = result.is_ok();
    let _ = tx.send(Delta::PlayerChanged { kind, result });
    if changed {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Player {}, refreshing player list",
            kind.verb()
        )));
        let result = api
            .list_players(&PlayerFilter::default())
            .map_err(|err| format!("{err:#}"));
        let _ = tx.send(Delta::PlayersLoaded(result));
    }
}

use npl_admin::api::CalculateSummary;
use npl_admin::leaderboard::{LeaderboardRow, LeaderboardScope};
use npl_admin::matches::{MatchRow, Team};
use npl_admin::squad::{SquadMatch, SquadPlayer, SquadResponse};
use npl_admin::state::{AppState, ChangeKind, Command, Delta, NoticeKind, Screen, apply_delta};
use npl_admin::stats_editor::{EditorPhase, StatRecord};
use npl_admin::wire::WireId;

fn stat(id: &str, runs: u32) -> StatRecord {
    StatRecord {
        id: WireId::from(id),
        player_name: format!("Player {id}"),
        team_name: "Kathmandu Gurkhas".to_string(),
        runs,
        run_rate: 0.0,
        economy: 0.0,
        wickets: 0,
        sixes: 0,
        fours: 0,
        catches: 0,
    }
}

fn match_row(id: u64) -> MatchRow {
    MatchRow {
        id,
        teams: format!("Team {id}A vs Team {id}B"),
        match_date: "2026-11-02".to_string(),
        status: "UPCOMING".to_string(),
        team_1: Some(1),
        team_2: Some(2),
    }
}

fn load_ticket(cmd: Command) -> npl_admin::stats_editor::LoadTicket {
    match cmd {
        Command::LoadStats(ticket) | Command::LoadSquad(ticket) => ticket,
        other => panic!("expected a load command, got {other:?}"),
    }
}

#[test]
fn initial_commands_fetch_lists() {
    let mut state = AppState::new();
    let cmds = state.initial_commands();
    assert!(cmds.contains(&Command::LoadMatches));
    assert!(cmds.contains(&Command::LoadTeams));
    assert!(state.players.loading);
    assert!(state.matches.loading);
}

#[test]
fn stats_load_applies_and_logs() {
    let mut state = AppState::new();
    let ticket = load_ticket(state.open_stats(7));
    assert_eq!(state.screen, Screen::Stats);

    apply_delta(
        &mut state,
        Delta::StatsLoaded {
            ticket,
            result: Ok(vec![stat("1", 10), stat("2", 0)]),
        },
    );
    assert_eq!(state.stats.phase(), EditorPhase::Ready);
    assert_eq!(state.stats.records().len(), 2);
    assert!(state.logs.back().unwrap().contains("Loaded 2 players"));
}

#[test]
fn stale_stats_response_does_not_overwrite() {
    let mut state = AppState::new();
    let old = load_ticket(state.open_stats(1));
    let current = load_ticket(state.open_stats(2));

    apply_delta(
        &mut state,
        Delta::StatsLoaded {
            ticket: current,
            result: Ok(vec![stat("B", 5)]),
        },
    );
    apply_delta(
        &mut state,
        Delta::StatsLoaded {
            ticket: old,
            result: Ok(vec![stat("A", 99)]),
        },
    );
    assert_eq!(state.stats.match_id(), Some(2));
    assert_eq!(state.stats.records()[0].id, WireId::from("B"));
    assert!(state.logs.back().unwrap().contains("stale"));
}

#[test]
fn save_success_shows_confirmation() {
    let mut state = AppState::new();
    let ticket = load_ticket(state.open_stats(4));
    apply_delta(
        &mut state,
        Delta::StatsLoaded {
            ticket,
            result: Ok(vec![stat("1", 0)]),
        },
    );
    state.stats.update_field_text(0, "runs", "18").unwrap();

    let cmd = state.save_stats().unwrap();
    let Command::SaveStats(request) = cmd else {
        panic!("expected save command");
    };
    assert_eq!(request.payload.players[0].runs, 18);
    assert_eq!(state.stats.saves_in_flight(), 1);

    apply_delta(
        &mut state,
        Delta::StatsSaved {
            match_id: 4,
            result: Ok(()),
        },
    );
    let notice = state.notice.as_ref().expect("confirmation shown");
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.body, "Stats saved");
    assert_eq!(state.stats.saves_in_flight(), 0);
}

#[test]
fn save_failure_keeps_edits_and_reports() {
    let mut state = AppState::new();
    let ticket = load_ticket(state.open_stats(4));
    apply_delta(
        &mut state,
        Delta::StatsLoaded {
            ticket,
            result: Ok(vec![stat("1", 0)]),
        },
    );
    state.stats.update_field_text(0, "runs", "18").unwrap();
    state.save_stats().unwrap();

    apply_delta(
        &mut state,
        Delta::StatsSaved {
            match_id: 4,
            result: Err("http 500 Internal Server Error: boom".to_string()),
        },
    );
    let notice = state.notice.as_ref().expect("failure shown");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.body.contains("boom"));
    assert_eq!(state.stats.records()[0].runs, 18);
    assert!(state.logs.back().unwrap().starts_with("[WARN]"));
}

#[test]
fn save_while_loading_is_refused() {
    let mut state = AppState::new();
    state.open_stats(4);
    assert!(state.save_stats().is_err());
}

#[test]
fn squad_save_returns_to_matches() {
    let mut state = AppState::new();
    let ticket = load_ticket(state.open_squad(7));
    apply_delta(
        &mut state,
        Delta::SquadLoaded {
            ticket,
            result: Ok(SquadResponse {
                players: vec![
                    SquadPlayer {
                        player_id: WireId::from("P1"),
                        player_name: "One".to_string(),
                        team_name: "A".to_string(),
                        is_playing: true,
                    },
                    SquadPlayer {
                        player_id: WireId::from("P2"),
                        player_name: "Two".to_string(),
                        team_name: "B".to_string(),
                        is_playing: false,
                    },
                ],
                info: Some(SquadMatch {
                    id: 7,
                    date: "2026-11-02".to_string(),
                    team1_name: "A".to_string(),
                    team2_name: "B".to_string(),
                }),
            }),
        },
    );
    state.squad.toggle(&WireId::from("P2"));
    let Some(Command::SaveSquad { match_id, body }) = state.save_squad() else {
        panic!("expected squad save");
    };
    assert_eq!(match_id, 7);
    assert_eq!(body.playing_ids, [WireId::from("P1"), WireId::from("P2")]);

    apply_delta(
        &mut state,
        Delta::SquadSaved {
            match_id,
            result: Ok(()),
        },
    );
    assert_eq!(state.screen, Screen::Matches);
    assert_eq!(state.notice.as_ref().unwrap().body, "Squad updated");
}

#[test]
fn teams_reach_both_forms() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::TeamsLoaded(Ok(vec![
            Team {
                team_id: 1,
                team_name: "Kathmandu Gurkhas".to_string(),
            },
            Team {
                team_id: 2,
                team_name: "Pokhara Avengers".to_string(),
            },
        ])),
    );
    assert_eq!(state.matches.teams.len(), 2);
    assert_eq!(state.players.teams.len(), 2);
    assert_eq!(state.matches.form.team1, Some(1));
    assert_eq!(state.players.form.team_id, Some(1));
}

#[test]
fn match_list_failure_stops_loading() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::MatchesLoaded(Err("refused".to_string())));
    assert!(!state.matches.loading);
    assert!(state.logs.back().unwrap().contains("refused"));

    apply_delta(&mut state, Delta::MatchesLoaded(Ok(vec![match_row(1)])));
    assert_eq!(state.matches.matches.len(), 1);
}

#[test]
fn delete_failure_raises_notice() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::MatchChanged {
            kind: ChangeKind::Deleted,
            result: Err("http 409".to_string()),
        },
    );
    assert_eq!(state.notice.as_ref().unwrap().kind, NoticeKind::Error);
}

fn filled_match_form(state: &mut AppState) {
    state.matches.form_active = true;
    state.matches.form.date = "2026-11-02".to_string();
    state.matches.form.team1 = Some(1);
    state.matches.form.team2 = Some(2);
}

#[test]
fn failed_match_add_reopens_form_with_values() {
    let mut state = AppState::new();
    filled_match_form(&mut state);

    let cmd = state.submit_match_form().unwrap();
    assert!(matches!(cmd, Command::AddMatch(_)));
    assert!(!state.matches.form_active);

    apply_delta(
        &mut state,
        Delta::MatchChanged {
            kind: ChangeKind::Added,
            result: Err("http 500 Internal Server Error".to_string()),
        },
    );
    let notice = state.notice.as_ref().expect("failure shown");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.body.contains("http 500"));
    assert!(state.matches.form_active);
    assert_eq!(state.matches.form.date, "2026-11-02");
    assert_eq!(state.matches.form.team2, Some(2));
}

#[test]
fn failed_match_update_raises_notice() {
    let mut state = AppState::new();
    filled_match_form(&mut state);
    state.matches.form.editing_id = Some(8);

    let cmd = state.submit_match_form().unwrap();
    assert!(matches!(cmd, Command::UpdateMatch { id: 8, .. }));
    apply_delta(
        &mut state,
        Delta::MatchChanged {
            kind: ChangeKind::Updated,
            result: Err("http 400".to_string()),
        },
    );
    assert_eq!(state.notice.as_ref().unwrap().kind, NoticeKind::Error);
    assert!(state.matches.form_active);
    assert_eq!(state.matches.form.editing_id, Some(8));
}

#[test]
fn accepted_match_clears_form() {
    let mut state = AppState::new();
    filled_match_form(&mut state);
    state.submit_match_form().unwrap();

    apply_delta(
        &mut state,
        Delta::MatchChanged {
            kind: ChangeKind::Added,
            result: Ok(()),
        },
    );
    assert!(state.notice.is_none());
    assert!(!state.matches.form_active);
    assert!(state.matches.form.date.is_empty());
    assert!(state.logs.back().unwrap().contains("Match added"));
}

#[test]
fn calculate_needs_confirmation() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::MatchesLoaded(Ok(vec![match_row(3)])));

    assert!(state.request_calculate());
    assert_eq!(state.confirm_calculate(false), None);
    assert_eq!(state.matches.pending_calculate, None);

    assert!(state.request_calculate());
    assert_eq!(
        state.confirm_calculate(true),
        Some(Command::CalculateResult(3))
    );

    apply_delta(
        &mut state,
        Delta::ResultCalculated {
            match_id: 3,
            result: Ok(CalculateSummary { teams_processed: 12 }),
        },
    );
    assert!(state.notice.as_ref().unwrap().body.contains("12 teams"));
}

#[test]
fn leaderboard_drops_outdated_page() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::MatchesLoaded(Ok(vec![match_row(5)])));
    let Command::LoadLeaderboard(first) = state.open_leaderboard() else {
        panic!("expected leaderboard load");
    };
    let Command::LoadLeaderboard(second) = state.cycle_leaderboard_scope(1) else {
        panic!("expected leaderboard load");
    };
    assert_eq!(second.scope, LeaderboardScope::Match(5));

    let row = LeaderboardRow {
        rank: 1,
        user_id: "9".to_string(),
        username: "sagar".to_string(),
        total_points: 50.0,
    };
    apply_delta(
        &mut state,
        Delta::LeaderboardLoaded {
            query: second,
            result: Ok(vec![row.clone()]),
        },
    );
    apply_delta(
        &mut state,
        Delta::LeaderboardLoaded {
            query: first,
            result: Ok(Vec::new()),
        },
    );
    assert_eq!(state.leaderboard.rows(), &[row]);
    assert_eq!(state.leaderboard.title(), "Match Leaderboard");
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::new();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().unwrap(), "line 50");
}

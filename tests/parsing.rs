use std::fs;
use std::path::PathBuf;

use npl_admin::api::{
    endpoint, parse_calculate_json, parse_leaderboard_json, parse_matches_json,
    parse_players_json, parse_squad_json, parse_stats_json, parse_teams_json,
};
use npl_admin::players::{PlayerFilter, Role};
use npl_admin::stats_editor::{StatField, StatValue, StatsEditor, StatsPayload};
use npl_admin::wire::WireId;
use reqwest::Url;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_stats_fixture() {
    let raw = read_fixture("stats.json");
    let rows = parse_stats_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].id, WireId::Num(501));
    assert_eq!(rows[0].player_name, "Rohit Paudel");
    assert_eq!(rows[0].runs, 42);
    assert_eq!(rows[0].run_rate, 131.25);
    assert_eq!(rows[0].economy, 0.0);
    assert_eq!(rows[0].sixes, 3);

    assert_eq!(rows[1].id, WireId::Text("502".to_string()));
    assert_eq!(rows[1].runs, 0);
    assert_eq!(rows[1].economy, 6.5);
    assert_eq!(rows[1].wickets, 3);
    assert_eq!(rows[1].get(StatField::Wickets), StatValue::Count(3));

    assert_eq!(rows[2].team_name, "Pokhara Avengers");
}

#[test]
fn stats_preserve_roster_order() {
    let rows = parse_stats_json(&read_fixture("stats.json")).expect("fixture should parse");
    let ids: Vec<String> = rows.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, ["501", "502", "611"]);
}

#[test]
fn empty_stats_roster_is_empty() {
    let rows = parse_stats_json(r#"{"players": []}"#).expect("empty roster should parse");
    assert!(rows.is_empty());
    let rows = parse_stats_json("{}").expect("missing players key should parse");
    assert!(rows.is_empty());
}

#[test]
fn fractional_count_is_rejected() {
    let raw = r#"{"players":[{"mp_id":1,"runs":"12.5"}]}"#;
    assert!(parse_stats_json(raw).is_err());
    let raw = r#"{"players":[{"mp_id":1,"wickets":-1}]}"#;
    assert!(parse_stats_json(raw).is_err());
}

#[test]
fn stats_payload_serializes_backend_keys() {
    let rows = parse_stats_json(&read_fixture("stats.json")).expect("fixture should parse");
    let payload = StatsPayload {
        players: rows[..1].to_vec(),
    };
    let value = serde_json::to_value(&payload).expect("payload should serialize");
    let player = &value["players"][0];
    assert_eq!(player["mp_id"], 501);
    assert_eq!(player["runs"], 42);
    assert_eq!(player["run_rate"], 131.25);
    assert_eq!(player["econ"], 0.0);
    assert_eq!(player["catches"], 1);
    assert!(player.get("economy").is_none());
}

#[test]
fn saved_stats_keep_id_json_types() {
    let raw = r#"{"players":[
        {"mp_id":1,"player_name":"Aarif Sheikh","runs":0},
        {"mp_id":"mp-2","player_name":"Karan KC","runs":0}
    ]}"#;
    let mut editor = StatsEditor::new();
    let ticket = editor.begin_load(3);
    editor.finish_load(ticket, Ok(parse_stats_json(raw).expect("roster should parse")));
    editor.update_field_text(0, "runs", "42").unwrap();

    let request = editor.save().unwrap();
    let value = serde_json::to_value(&request.payload).expect("payload should serialize");
    assert_eq!(value["players"][0]["mp_id"], 1);
    assert_eq!(value["players"][0]["runs"], 42);
    assert_eq!(value["players"][1]["mp_id"], "mp-2");
}

#[test]
fn parses_matches_fixture() {
    let rows = parse_matches_json(&read_fixture("matches.json")).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 7);
    assert_eq!(rows[0].team_1, Some(1));
    assert_eq!(rows[0].team_2, Some(2));
    assert_eq!(rows[1].id, 8);
    assert_eq!(rows[1].status, "");
    assert_eq!(rows[1].team_1, None);
}

#[test]
fn parses_teams_fixture() {
    let teams = parse_teams_json(&read_fixture("teams.json")).expect("fixture should parse");
    let ids: Vec<u64> = teams.iter().map(|t| t.team_id).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(teams[2].team_name, "Lumbini Lions");
}

#[test]
fn parses_squad_fixture() {
    let squad = parse_squad_json(&read_fixture("squad.json")).expect("fixture should parse");
    let info = squad.info.expect("match info present");
    assert_eq!(info.id, 7);
    assert_eq!(info.team2_name, "Pokhara Avengers");
    assert_eq!(squad.players.len(), 4);
    assert_eq!(squad.players[2].player_id, WireId::Num(103));
    assert_eq!(squad.players[0].player_id, WireId::from("P01"));
    let playing: Vec<bool> = squad.players.iter().map(|p| p.is_playing).collect();
    assert_eq!(playing, [true, false, true, false]);
}

#[test]
fn parses_players_fixture() {
    let rows = parse_players_json(&read_fixture("players.json")).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cost, 9.5);
    assert_eq!(rows[0].role.parse::<Role>(), Ok(Role::Batter));
    assert_eq!(rows[1].team_id, None);
    assert_eq!(rows[1].team_name, "");
}

#[test]
fn parses_leaderboard_fixture() {
    let rows =
        parse_leaderboard_json(&read_fixture("leaderboard.json")).expect("fixture should parse");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].points_label(), "412.50");
    assert_eq!(rows[1].user_id, "u-31");
    assert_eq!(rows[1].points_label(), "398.26");
    assert_eq!(rows[2].points_label(), "0.00");
}

#[test]
fn calculate_result_tolerates_empty_body() {
    assert_eq!(parse_calculate_json("").unwrap().teams_processed, 0);
    assert_eq!(
        parse_calculate_json(r#"{"message":"ok","teams_processed":14}"#)
            .unwrap()
            .teams_processed,
        14
    );
}

#[test]
fn endpoint_keeps_trailing_slash() {
    let base = Url::parse("http://localhost:8000/api/admin/").unwrap();
    let url = endpoint(&base, &["matches", "7", "stats"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/api/admin/matches/7/stats/");

    let bare = Url::parse("http://localhost:8000/api/admin").unwrap();
    let url = endpoint(&bare, &["teams"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/api/admin/teams/");
}

#[test]
fn player_filter_skips_blank_values() {
    let filter = PlayerFilter {
        name: "  ".to_string(),
        role: Some(Role::Bowler),
        team_id: Some(3),
        max_cost: "8.5".to_string(),
        ..PlayerFilter::default()
    };
    assert_eq!(
        filter.query_pairs(),
        vec![
            ("role", "BOWLER".to_string()),
            ("team_id", "3".to_string()),
            ("max_cost", "8.5".to_string()),
        ]
    );
    assert!(PlayerFilter::default().is_empty());
}

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use npl_admin::api::{parse_leaderboard_json, parse_stats_json};
use npl_admin::stats_editor::{StatField, StatRecord, StatValue, StatsEditor, StatsPayload};
use npl_admin::wire::WireId;

fn sample_roster(count: usize) -> Vec<StatRecord> {
    (0..count)
        .map(|i| StatRecord {
            id: WireId::Num(1000 + i as u64),
            player_name: format!("Player {i}"),
            team_name: if i % 2 == 0 {
                "Kathmandu Gurkhas".to_string()
            } else {
                "Pokhara Avengers".to_string()
            },
            runs: (i * 7 % 120) as u32,
            run_rate: 100.0 + i as f64 * 1.25,
            economy: 6.0 + (i % 5) as f64 * 0.5,
            wickets: (i % 4) as u32,
            sixes: (i % 6) as u32,
            fours: (i % 9) as u32,
            catches: (i % 3) as u32,
        })
        .collect()
}

fn ready_editor(count: usize) -> StatsEditor {
    let mut editor = StatsEditor::new();
    let ticket = editor.begin_load(1);
    editor.finish_load(ticket, Ok(sample_roster(count)));
    editor
}

fn bench_update_field(c: &mut Criterion) {
    let mut editor = ready_editor(30);
    let mut row = 0usize;
    c.bench_function("stats_update_field", |b| {
        b.iter(|| {
            row = (row + 1) % 30;
            editor
                .update_field(
                    black_box(row),
                    black_box(StatField::Runs),
                    black_box(StatValue::Count(42)),
                )
                .expect("row in range");
        })
    });
}

fn bench_update_field_text(c: &mut Criterion) {
    let mut editor = ready_editor(30);
    c.bench_function("stats_update_field_text", |b| {
        b.iter(|| {
            editor
                .update_field_text(black_box(12), black_box("econ"), black_box("7.25"))
                .expect("valid input");
        })
    });
}

fn bench_save_payload(c: &mut Criterion) {
    let mut editor = ready_editor(30);
    c.bench_function("stats_save_serialize", |b| {
        b.iter(|| {
            let request = editor.save().expect("editor ready");
            editor.finish_save();
            black_box(serde_json::to_vec(&request.payload).expect("payload serializes"))
        })
    });
}

fn bench_parse_stats(c: &mut Criterion) {
    let raw = serde_json::to_string(&StatsPayload {
        players: sample_roster(30),
    })
    .expect("payload serializes");
    c.bench_function("parse_stats_json", |b| {
        b.iter(|| parse_stats_json(black_box(&raw)).expect("valid json"))
    });
}

fn bench_parse_leaderboard(c: &mut Criterion) {
    let rows: Vec<String> = (0..100)
        .map(|i| {
            format!(
                r#"{{"rank":{},"user_id":{},"username":"user{}","total_points":"{}.50"}}"#,
                i + 1,
                i + 10,
                i,
                900 - i
            )
        })
        .collect();
    let raw = format!(r#"{{"leaderboard":[{}]}}"#, rows.join(","));
    c.bench_function("parse_leaderboard_json", |b| {
        b.iter(|| parse_leaderboard_json(black_box(&raw)).expect("valid json"))
    });
}

criterion_group!(
    perf,
    bench_update_field,
    bench_update_field_text,
    bench_save_payload,
    bench_parse_stats,
    bench_parse_leaderboard
);
criterion_main!(perf);

pub mod api;
pub mod config;
pub mod error;
pub mod http_client;
pub mod leaderboard;
pub mod matches;
pub mod players;
pub mod squad;
pub mod state;
pub mod stats_editor;
pub mod wire;
pub mod worker;

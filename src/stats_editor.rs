use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::wire::{self, WireId};

pub type MatchId = u64;

/// One player's statistics for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    #[serde(rename = "mp_id")]
    pub id: WireId,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub player_name: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub team_name: String,
    #[serde(default, deserialize_with = "wire::count")]
    pub runs: u32,
    #[serde(default, deserialize_with = "wire::rate")]
    pub run_rate: f64,
    #[serde(rename = "econ", default, deserialize_with = "wire::rate")]
    pub economy: f64,
    #[serde(default, deserialize_with = "wire::count")]
    pub wickets: u32,
    #[serde(default, deserialize_with = "wire::count")]
    pub sixes: u32,
    #[serde(default, deserialize_with = "wire::count")]
    pub fours: u32,
    #[serde(default, deserialize_with = "wire::count")]
    pub catches: u32,
}

impl StatRecord {
    pub fn get(&self, field: StatField) -> StatValue {
        match field {
            StatField::Runs => StatValue::Count(self.runs),
            StatField::RunRate => StatValue::Rate(self.run_rate),
            StatField::Economy => StatValue::Rate(self.economy),
            StatField::Wickets => StatValue::Count(self.wickets),
            StatField::Sixes => StatValue::Count(self.sixes),
            StatField::Fours => StatValue::Count(self.fours),
            StatField::Catches => StatValue::Count(self.catches),
        }
    }

    /// Returns a copy of this record with `field` replaced.
    pub fn with_field(&self, field: StatField, value: StatValue) -> Result<Self, StatsError> {
        let mut next = self.clone();
        match value.coerce(field)? {
            StatValue::Count(n) => {
                if let Some(slot) = next.count_slot(field) {
                    *slot = n;
                }
            }
            StatValue::Rate(x) => {
                if let Some(slot) = next.rate_slot(field) {
                    *slot = x;
                }
            }
        }
        Ok(next)
    }

    fn count_slot(&mut self, field: StatField) -> Option<&mut u32> {
        match field {
            StatField::Runs => Some(&mut self.runs),
            StatField::Wickets => Some(&mut self.wickets),
            StatField::Sixes => Some(&mut self.sixes),
            StatField::Fours => Some(&mut self.fours),
            StatField::Catches => Some(&mut self.catches),
            StatField::RunRate | StatField::Economy => None,
        }
    }

    fn rate_slot(&mut self, field: StatField) -> Option<&mut f64> {
        match field {
            StatField::RunRate => Some(&mut self.run_rate),
            StatField::Economy => Some(&mut self.economy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    Runs,
    RunRate,
    Economy,
    Wickets,
    Sixes,
    Fours,
    Catches,
}

impl StatField {
    /// Column order of the stats grid.
    pub const ALL: [StatField; 7] = [
        StatField::Runs,
        StatField::RunRate,
        StatField::Economy,
        StatField::Wickets,
        StatField::Sixes,
        StatField::Fours,
        StatField::Catches,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StatField::Runs => "runs",
            StatField::RunRate => "run_rate",
            StatField::Economy => "econ",
            StatField::Wickets => "wickets",
            StatField::Sixes => "sixes",
            StatField::Fours => "fours",
            StatField::Catches => "catches",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatField::Runs => "Runs",
            StatField::RunRate => "Run Rate",
            StatField::Economy => "Economy",
            StatField::Wickets => "Wickets",
            StatField::Sixes => "Sixes",
            StatField::Fours => "Fours",
            StatField::Catches => "Catches",
        }
    }

    pub fn is_count(self) -> bool {
        !matches!(self, StatField::RunRate | StatField::Economy)
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatField {
    type Err = StatsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "runs" => Ok(StatField::Runs),
            "run_rate" | "runrate" => Ok(StatField::RunRate),
            "econ" | "economy" => Ok(StatField::Economy),
            "wickets" => Ok(StatField::Wickets),
            "sixes" => Ok(StatField::Sixes),
            "fours" => Ok(StatField::Fours),
            "catches" => Ok(StatField::Catches),
            _ => Err(StatsError::UnknownField(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Count(u32),
    Rate(f64),
}

impl StatValue {
    /// Coerces text typed into a grid cell. Blank input is zero; anything
    /// else must be a number of the field's kind.
    pub fn parse(field: StatField, raw: &str) -> Result<Self, StatsError> {
        let trimmed = raw.trim();
        let invalid = || StatsError::InvalidNumber {
            field,
            raw: raw.to_string(),
        };
        if trimmed.is_empty() {
            return StatValue::Count(0).coerce(field);
        }
        if field.is_count() {
            trimmed
                .parse::<u32>()
                .map(StatValue::Count)
                .map_err(|_| invalid())
        } else {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(StatValue::Rate)
                .ok_or_else(invalid)
        }
    }

    pub fn coerce(self, field: StatField) -> Result<Self, StatsError> {
        match (self, field.is_count()) {
            (StatValue::Count(n), true) => Ok(StatValue::Count(n)),
            (StatValue::Count(n), false) => Ok(StatValue::Rate(f64::from(n))),
            (StatValue::Rate(x), false) if x.is_finite() => Ok(StatValue::Rate(x)),
            (StatValue::Rate(x), true)
                if x.is_finite() && x.fract() == 0.0 && x >= 0.0 && x <= f64::from(u32::MAX) =>
            {
                Ok(StatValue::Count(x as u32))
            }
            (StatValue::Rate(x), _) => Err(StatsError::InvalidNumber {
                field,
                raw: x.to_string(),
            }),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Rate(x) => write!(f, "{x}"),
        }
    }
}

/// Ordered, index-addressed working copy of a match roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffer {
    records: Vec<StatRecord>,
}

impl EditBuffer {
    pub fn replace_all(&mut self, records: Vec<StatRecord>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[StatRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&StatRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn update(
        &mut self,
        index: usize,
        field: StatField,
        value: StatValue,
    ) -> Result<(), StatsError> {
        let len = self.records.len();
        let current = self
            .records
            .get(index)
            .ok_or(StatsError::OutOfRange { index, len })?;
        let next = current.with_field(field, value)?;
        self.records[index] = next;
        Ok(())
    }
}

/// Request/response body of the bulk stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub players: Vec<StatRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub match_id: MatchId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub match_id: MatchId,
    pub payload: StatsPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { records: usize },
    Stale { generation: u64, latest: u64 },
    Failed { error: String },
}

/// Per-match statistics editor: loads a roster, buffers edits, and hands
/// back the full buffer for a bulk save.
#[derive(Debug, Clone)]
pub struct StatsEditor {
    match_id: Option<MatchId>,
    phase: EditorPhase,
    buffer: EditBuffer,
    generation: u64,
    load_error: Option<String>,
    saves_in_flight: usize,
    pub cursor: GridCursor,
}

impl Default for StatsEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsEditor {
    pub fn new() -> Self {
        Self {
            match_id: None,
            phase: EditorPhase::Loading,
            buffer: EditBuffer::default(),
            generation: 0,
            load_error: None,
            saves_in_flight: 0,
            cursor: GridCursor::default(),
        }
    }

    pub fn match_id(&self) -> Option<MatchId> {
        self.match_id
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == EditorPhase::Ready
    }

    pub fn records(&self) -> &[StatRecord] {
        self.buffer.records()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Set when a reload failed while the previous rows stayed on screen.
    pub fn reload_hint(&self) -> Option<String> {
        if !self.is_ready() {
            return None;
        }
        self.load_error
            .as_deref()
            .map(|err| format!("Last reload failed: {err} (r to retry)"))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn saves_in_flight(&self) -> usize {
        self.saves_in_flight
    }

    /// Starts a load for `match_id`. Switching to another match discards the
    /// buffer and goes back to `Loading`; reloading the same match keeps the
    /// current rows visible until the response lands.
    pub fn begin_load(&mut self, match_id: MatchId) -> LoadTicket {
        if self.match_id != Some(match_id) {
            self.match_id = Some(match_id);
            self.phase = EditorPhase::Loading;
            self.buffer.clear();
            self.cursor = GridCursor::default();
        }
        self.load_error = None;
        self.generation += 1;
        LoadTicket {
            match_id,
            generation: self.generation,
        }
    }

    pub fn retry_load(&mut self) -> Option<LoadTicket> {
        let match_id = self.match_id?;
        Some(self.begin_load(match_id))
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<StatRecord>, String>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || Some(ticket.match_id) != self.match_id {
            return LoadOutcome::Stale {
                generation: ticket.generation,
                latest: self.generation,
            };
        }
        match result {
            Ok(records) => {
                let count = records.len();
                self.buffer.replace_all(records);
                self.phase = EditorPhase::Ready;
                self.load_error = None;
                self.cursor.clamp(self.buffer.len());
                LoadOutcome::Applied { records: count }
            }
            Err(error) => {
                self.load_error = Some(error.clone());
                LoadOutcome::Failed { error }
            }
        }
    }

    pub fn update_field(
        &mut self,
        index: usize,
        field: StatField,
        value: StatValue,
    ) -> Result<(), StatsError> {
        if !self.is_ready() {
            return Err(StatsError::NotReady);
        }
        self.buffer.update(index, field, value)
    }

    /// Text entry point: field name and value as typed.
    pub fn update_field_text(
        &mut self,
        index: usize,
        field_name: &str,
        raw: &str,
    ) -> Result<(), StatsError> {
        let field = field_name.parse::<StatField>()?;
        let value = StatValue::parse(field, raw)?;
        self.update_field(index, field, value)
    }

    /// Snapshot of the whole buffer for a bulk save.
    pub fn save(&mut self) -> Result<SaveRequest, StatsError> {
        let Some(match_id) = self.match_id.filter(|_| self.is_ready()) else {
            return Err(StatsError::NotReady);
        };
        self.saves_in_flight += 1;
        Ok(SaveRequest {
            match_id,
            payload: StatsPayload {
                players: self.buffer.records().to_vec(),
            },
        })
    }

    pub fn finish_save(&mut self) {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
    }

    pub fn selected_value(&self) -> Option<StatValue> {
        self.buffer
            .get(self.cursor.row)
            .map(|record| record.get(self.cursor.field))
    }

    pub fn begin_cell_edit(&mut self) -> bool {
        let Some(value) = self.selected_value() else {
            return false;
        };
        self.cursor.input = Some(value.to_string());
        true
    }

    /// Applies the pending cell input. The input is dropped either way; on
    /// error the buffer is unchanged.
    pub fn commit_cell_edit(&mut self) -> Result<bool, StatsError> {
        let Some(raw) = self.cursor.input.take() else {
            return Ok(false);
        };
        let field = self.cursor.field;
        let value = StatValue::parse(field, &raw)?;
        self.update_field(self.cursor.row, field, value)?;
        Ok(true)
    }

    pub fn move_row(&mut self, delta: isize) {
        self.cursor.move_row(delta, self.buffer.len());
    }

    pub fn move_field(&mut self, delta: isize) {
        self.cursor.move_field(delta);
    }
}

/// Selected cell of the stats grid plus any in-progress text input.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCursor {
    pub row: usize,
    pub field: StatField,
    pub input: Option<String>,
}

impl Default for GridCursor {
    fn default() -> Self {
        Self {
            row: 0,
            field: StatField::Runs,
            input: None,
        }
    }
}

impl GridCursor {
    pub fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    fn clamp(&mut self, len: usize) {
        self.row = self.row.min(len.saturating_sub(1));
    }

    fn move_row(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.row = 0;
            return;
        }
        self.row = self.row.saturating_add_signed(delta).min(len - 1);
    }

    fn move_field(&mut self, delta: isize) {
        let count = StatField::ALL.len() as isize;
        let next = (self.field.index() as isize + delta).rem_euclid(count);
        self.field = StatField::ALL[next as usize];
    }
}

use crate::character::{TypedCharacter, INK_CAPACITY};
use crate::config::Settings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const CHARS_PER_LINE: usize = 65;
pub const LINES_PER_PAGE: usize = 28;
pub const MARGIN_BELL_OFFSET: usize = 7;
/// Last millisecond of year 9999; later session start times are corrupt.
pub const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub characters: Vec<TypedCharacter>,
}

impl Line {
    pub fn text(&self) -> String {
        self.characters.iter().map(|c| c.char).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub lines: Vec<Line>,
}

impl Default for Page {
    /// a fresh sheet has its first (empty) line ready
    fn default() -> Self {
        Self {
            lines: vec![Line::default()],
        }
    }
}

impl Page {
    pub fn text(&self) -> String {
        self.lines.iter().map(Line::text).collect::<Vec<_>>().join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JamState {
    pub is_jammed: bool,
    pub key1: Option<char>,
    pub key2: Option<char>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionStats {
    pub characters_typed: u64,
    pub words_typed: u64,
    pub carriage_returns: u64,
    pub jams: u64,
    pub jam_pairs: BTreeMap<String, u64>,
    /// epoch millis of the first committed keystroke
    pub start_time: Option<i64>,
}

/// Everything a typing session owns.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub pages: Vec<Page>,
    pub current_page_index: usize,
    pub current_line_index: usize,
    pub current_char_index: usize,
    pub carriage_position: usize,
    pub ink_remaining: u32,
    pub jam_state: JamState,
    pub stats: SessionStats,
    pub settings: Settings,
    pub last_key_timestamp: i64,
    pub last_key: Option<char>,
    pub pressed_keys: BTreeSet<char>,
    pub show_backspace_tooltip: bool,
    pub backspace_tooltip_seen: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
            current_page_index: 0,
            current_line_index: 0,
            current_char_index: 0,
            carriage_position: 0,
            ink_remaining: INK_CAPACITY,
            jam_state: JamState::default(),
            stats: SessionStats::default(),
            settings: Settings::default(),
            last_key_timestamp: 0,
            last_key: None,
            pressed_keys: BTreeSet::new(),
            show_backspace_tooltip: false,
            backspace_tooltip_seen: false,
        }
    }
}

impl SessionState {
    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_page_index]
    }

    pub fn current_line(&self) -> &Line {
        &self.current_page().lines[self.current_line_index]
    }

    pub(crate) fn current_line_mut(&mut self) -> &mut Line {
        &mut self.pages[self.current_page_index].lines[self.current_line_index]
    }
}

/// The document part of a session, as written to the `"work"` blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkSnapshot {
    pub pages: Vec<Page>,
    pub current_page_index: usize,
    pub current_line_index: usize,
    pub current_char_index: usize,
    pub carriage_position: usize,
    pub ink_remaining: u32,
    pub stats: SessionStats,
}

impl Default for WorkSnapshot {
    fn default() -> Self {
        Self::from(&SessionState::default())
    }
}

impl From<&SessionState> for WorkSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            pages: state.pages.clone(),
            current_page_index: state.current_page_index,
            current_line_index: state.current_line_index,
            current_char_index: state.current_char_index,
            carriage_position: state.carriage_position,
            ink_remaining: state.ink_remaining,
            stats: state.stats.clone(),
        }
    }
}

impl WorkSnapshot {
    /// Describes the first way this snapshot cannot address its own cursor.
    pub fn inconsistency(&self) -> Option<String> {
        let Some(page) = self.pages.get(self.current_page_index) else {
            return Some(format!(
                "page {} of {}",
                self.current_page_index,
                self.pages.len()
            ));
        };
        if self.current_line_index >= page.lines.len() {
            return Some(format!(
                "line {} of {}",
                self.current_line_index,
                page.lines.len()
            ));
        }
        if self.current_line_index >= LINES_PER_PAGE {
            return Some(format!("line {} past page end", self.current_line_index));
        }
        let line_len = page.lines[self.current_line_index].characters.len();
        if self.current_char_index > line_len {
            return Some(format!(
                "char {} on a line of {}",
                self.current_char_index, line_len
            ));
        }
        if self.carriage_position > self.current_char_index {
            return Some(format!(
                "carriage {} past char {}",
                self.carriage_position, self.current_char_index
            ));
        }
        if self.ink_remaining > INK_CAPACITY {
            return Some(format!("ink {} over capacity", self.ink_remaining));
        }
        if let Some(start) = self.stats.start_time {
            if !(0..=MAX_TIMESTAMP_MS).contains(&start) {
                return Some(format!("start time {start}"));
            }
        }
        None
    }
}

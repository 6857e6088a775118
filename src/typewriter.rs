use crate::character::{self, RandomSource, INK_CAPACITY};
use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, SettingsPatch};
use crate::jam::{self, lower};
use crate::session::{
    JamState, Page, SessionState, WorkSnapshot, CHARS_PER_LINE, LINES_PER_PAGE,
    MARGIN_BELL_OFFSET,
};
use crate::stats;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Idle,
    Typing,
    Jammed,
}

/// What the front-end should do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keystroke {
    pub should_play_sound: bool,
    pub is_margin_bell: bool,
    pub is_jammed: bool,
}

impl Keystroke {
    const JAMMED: Self = Self {
        should_play_sound: false,
        is_margin_bell: false,
        is_jammed: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Backspace {
    pub should_show_tooltip: bool,
}

/// A snapshot that could not be applied; the session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("snapshot cursor out of range: {0}")]
pub struct InconsistentSnapshot(pub String);

/// the typing session state machine
#[derive(Debug)]
pub struct Typewriter {
    state: SessionState,
    clock: Box<dyn Clock>,
    rng: Box<dyn RandomSource>,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(Box::new(SystemClock), Box::new(StdRng::from_entropy()))
    }
}

impl Typewriter {
    pub fn new(clock: Box<dyn Clock>, rng: Box<dyn RandomSource>) -> Self {
        Self {
            state: SessionState::default(),
            clock,
            rng,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.state.settings = settings;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn machine_state(&self) -> MachineState {
        if self.state.jam_state.is_jammed {
            MachineState::Jammed
        } else if self.state.stats.start_time.is_none() {
            MachineState::Idle
        } else {
            MachineState::Typing
        }
    }

    pub fn is_jammed(&self) -> bool {
        self.state.jam_state.is_jammed
    }

    pub fn type_character(&mut self, c: char) -> Keystroke {
        if self.state.jam_state.is_jammed {
            return Keystroke::JAMMED;
        }

        let now = self.clock.now_ms();
        if jam::is_jam(
            c,
            self.state.last_key,
            self.state.last_key_timestamp,
            now,
            self.state.settings.jam_simulation_enabled,
        ) {
            self.jam(c);
            return Keystroke::JAMMED;
        }

        if self.state.stats.start_time.is_none() {
            self.state.stats.start_time = Some(now);
        }

        let is_margin_bell = self.state.settings.margin_bell_enabled
            && self.state.carriage_position == CHARS_PER_LINE - MARGIN_BELL_OFFSET;

        let strike = character::generate(
            c,
            &self.state.settings,
            self.state.ink_remaining,
            &mut *self.rng,
        );
        let line = self.state.current_line_mut();
        let ends_word = c == ' '
            && line
                .characters
                .last()
                .is_some_and(|prev| prev.char != ' ');
        line.characters.push(strike);

        self.state.current_char_index += 1;
        self.state.carriage_position += 1;
        self.state.ink_remaining = self.state.ink_remaining.saturating_sub(1);
        self.state.last_key = Some(c);
        self.state.last_key_timestamp = now;
        self.state.stats.characters_typed = self.state.stats.characters_typed.saturating_add(1);
        if ends_word {
            self.state.stats.words_typed = self.state.stats.words_typed.saturating_add(1);
        }

        trace!(key = %c, column = self.state.carriage_position, "strike");

        Keystroke {
            should_play_sound: true,
            is_margin_bell,
            is_jammed: false,
        }
    }

    fn jam(&mut self, c: char) {
        let last = self.state.last_key;
        self.state.jam_state = JamState {
            is_jammed: true,
            key1: last,
            key2: Some(c),
        };
        self.state.stats.jams = self.state.stats.jams.saturating_add(1);
        if let Some(last) = last {
            let count = self
                .state
                .stats
                .jam_pairs
                .entry(jam::pair_id(last, c))
                .or_insert(0);
            *count = count.saturating_add(1);
        }
        debug!(key1 = ?last, key2 = %c, jams = self.state.stats.jams, "typebar jam");
    }

    /// Advances to a fresh line. Refused while jammed or on a full page.
    pub fn carriage_return(&mut self) -> bool {
        if self.state.jam_state.is_jammed || self.is_page_full() {
            return false;
        }

        let page = self.state.current_page_index;
        self.state.pages[page].lines.push(Default::default());
        self.state.current_line_index += 1;
        self.state.current_char_index = 0;
        self.state.carriage_position = 0;
        self.state.last_key = None;
        self.state.last_key_timestamp = self.clock.now_ms();
        self.state.stats.carriage_returns = self.state.stats.carriage_returns.saturating_add(1);
        true
    }

    /// Overstrike: the carriage steps back and the last strike on the line is
    /// marked, never removed. `current_char_index` keeps counting insertions.
    pub fn backspace(&mut self) -> Backspace {
        if self.state.jam_state.is_jammed || self.state.carriage_position == 0 {
            return Backspace::default();
        }

        let should_show_tooltip = !self.state.backspace_tooltip_seen;

        if let Some(last) = self.state.current_line_mut().characters.last_mut() {
            last.is_strikethrough = true;
        }
        self.state.carriage_position = self.state.carriage_position.saturating_sub(1);
        self.state.backspace_tooltip_seen = true;
        if should_show_tooltip {
            self.state.show_backspace_tooltip = true;
        }

        Backspace {
            should_show_tooltip,
        }
    }

    /// Frees the typebars. Does nothing unless jammed.
    pub fn clear_jam(&mut self) -> bool {
        if !self.state.jam_state.is_jammed {
            return false;
        }
        self.state.jam_state = JamState::default();
        self.state.last_key = None;
        self.state.last_key_timestamp = 0;
        debug!("jam cleared");
        true
    }

    pub fn change_ribbon(&mut self) {
        self.state.ink_remaining = INK_CAPACITY;
        debug!("ribbon changed");
    }

    pub fn toggle_ink_color(&mut self) {
        self.state.settings.is_red_ink = !self.state.settings.is_red_ink;
    }

    pub fn load_new_sheet(&mut self) {
        self.state.pages.push(Page::default());
        self.state.current_page_index = self.state.pages.len() - 1;
        self.reset_cursor();
        debug!(page = self.state.current_page_index + 1, "new sheet loaded");
    }

    /// Replaces the active sheet with a blank one.
    pub fn clear_current_page(&mut self) {
        let page = self.state.current_page_index;
        self.state.pages[page] = Page::default();
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.state.current_line_index = 0;
        self.state.current_char_index = 0;
        self.state.carriage_position = 0;
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        self.state.settings.merge(patch);
    }

    pub fn press_key(&mut self, key: char) {
        self.state.pressed_keys.insert(lower(key));
    }

    pub fn release_key(&mut self, key: char) {
        self.state.pressed_keys.remove(&lower(key));
    }

    pub fn dismiss_backspace_tooltip(&mut self) {
        self.state.show_backspace_tooltip = false;
    }

    pub fn is_page_full(&self) -> bool {
        self.state.current_line_index >= LINES_PER_PAGE - 1
    }

    /// Last line of a full page with the carriage at the margin; the
    /// front-end should stop accepting strikes here.
    pub fn at_page_end(&self) -> bool {
        self.is_page_full() && self.state.carriage_position >= CHARS_PER_LINE - 1
    }

    pub fn current_text(&self) -> String {
        self.state.current_page().text()
    }

    pub fn wpm(&self) -> u64 {
        stats::words_per_minute(&self.state.stats, self.clock.now_ms())
    }

    pub fn elapsed_time(&self) -> String {
        stats::elapsed_time(&self.state.stats, self.clock.now_ms())
    }

    pub fn ink_percent(&self) -> u32 {
        self.state.ink_remaining * 100 / INK_CAPACITY
    }

    pub fn snapshot(&self) -> WorkSnapshot {
        WorkSnapshot::from(&self.state)
    }

    /// Applies a saved document. Jam, key timing and settings stay as they are.
    pub fn restore(&mut self, snapshot: WorkSnapshot) -> Result<(), InconsistentSnapshot> {
        if let Some(reason) = snapshot.inconsistency() {
            return Err(InconsistentSnapshot(reason));
        }

        self.state.pages = snapshot.pages;
        self.state.current_page_index = snapshot.current_page_index;
        self.state.current_line_index = snapshot.current_line_index;
        self.state.current_char_index = snapshot.current_char_index;
        self.state.carriage_position = snapshot.carriage_position;
        self.state.ink_remaining = snapshot.ink_remaining;
        self.state.stats = snapshot.stats;
        Ok(())
    }
}

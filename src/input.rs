use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{cycle, SettingsPatch};
use crate::typewriter::{Backspace, Keystroke, Typewriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Type(char),
    CarriageReturn,
    Backspace,
    ClearJam,
    ChangeRibbon,
    ToggleInkColor,
    NewSheet,
    ClearPage,
    CycleHousingColor,
    CyclePaperType,
    CycleInkDensity,
    ToggleJams,
    ToggleMarginBell,
    Save,
    ToggleStats,
    Quit,
}

/// Key binding table. Esc frees a jam first and only quits on a free machine.
pub fn command_for(key: &KeyEvent, jammed: bool) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            KeyCode::Char('r') => Some(Command::ChangeRibbon),
            KeyCode::Char('k') => Some(Command::ToggleInkColor),
            KeyCode::Char('n') => Some(Command::NewSheet),
            KeyCode::Char('l') => Some(Command::ClearPage),
            KeyCode::Char('s') => Some(Command::Save),
            _ => None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Esc if jammed => Some(Command::ClearJam),
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Enter => Some(Command::CarriageReturn),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Tab => Some(Command::ToggleStats),
        KeyCode::F(2) => Some(Command::CycleHousingColor),
        KeyCode::F(3) => Some(Command::CyclePaperType),
        KeyCode::F(4) => Some(Command::CycleInkDensity),
        KeyCode::F(5) => Some(Command::ToggleJams),
        KeyCode::F(6) => Some(Command::ToggleMarginBell),
        KeyCode::Char(c) => Some(Command::Type(c)),
        _ => None,
    }
}

/// What happened on the desk, for the front-end to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Struck(Keystroke),
    Returned(bool),
    /// the sheet has no room left; load a new one
    PageFull,
    Backspaced(Backspace),
    JamCleared(bool),
    RibbonChanged,
    InkToggled,
    SheetLoaded,
    PageCleared,
    /// settings changed; persist them
    SettingsChanged,
}

/// Applies a machine command. Front-end commands (save, stats, quit) yield `None`.
pub fn apply(typewriter: &mut Typewriter, command: Command) -> Option<Feedback> {
    let feedback = match command {
        Command::Type(c) => {
            if !typewriter.is_jammed() && typewriter.at_page_end() {
                Feedback::PageFull
            } else {
                typewriter.press_key(c);
                Feedback::Struck(typewriter.type_character(c))
            }
        }
        Command::CarriageReturn => {
            if !typewriter.is_jammed() && typewriter.is_page_full() {
                Feedback::PageFull
            } else {
                Feedback::Returned(typewriter.carriage_return())
            }
        }
        Command::Backspace => Feedback::Backspaced(typewriter.backspace()),
        Command::ClearJam => Feedback::JamCleared(typewriter.clear_jam()),
        Command::ChangeRibbon => {
            typewriter.change_ribbon();
            Feedback::RibbonChanged
        }
        Command::ToggleInkColor => {
            typewriter.toggle_ink_color();
            Feedback::InkToggled
        }
        Command::NewSheet => {
            typewriter.load_new_sheet();
            Feedback::SheetLoaded
        }
        Command::ClearPage => {
            typewriter.clear_current_page();
            Feedback::PageCleared
        }
        Command::CycleHousingColor
        | Command::CyclePaperType
        | Command::CycleInkDensity
        | Command::ToggleJams
        | Command::ToggleMarginBell => {
            typewriter.update_settings(&settings_patch(typewriter, command));
            Feedback::SettingsChanged
        }
        Command::Save | Command::ToggleStats | Command::Quit => return None,
    };
    Some(feedback)
}

fn settings_patch(typewriter: &Typewriter, command: Command) -> SettingsPatch {
    let settings = typewriter.settings();
    match command {
        Command::CycleHousingColor => SettingsPatch {
            housing_color: Some(cycle(&settings.housing_color)),
            ..Default::default()
        },
        Command::CyclePaperType => SettingsPatch {
            paper_type: Some(cycle(&settings.paper_type)),
            ..Default::default()
        },
        Command::CycleInkDensity => SettingsPatch {
            ink_density: Some(cycle(&settings.ink_density)),
            ..Default::default()
        },
        Command::ToggleJams => SettingsPatch {
            jam_simulation_enabled: Some(!settings.jam_simulation_enabled),
            ..Default::default()
        },
        Command::ToggleMarginBell => SettingsPatch {
            margin_bell_enabled: Some(!settings.margin_bell_enabled),
            ..Default::default()
        },
        _ => SettingsPatch::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::SequenceSource;
    use crate::clock::ManualClock;
    use crate::config::{HousingColor, InkDensity, PaperType};
    use crate::session::{CHARS_PER_LINE, LINES_PER_PAGE};
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_bindings() {
        assert_eq!(command_for(&key(KeyCode::Char('a')), false), Some(Command::Type('a')));
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT), false),
            Some(Command::Type('A'))
        );
        assert_eq!(command_for(&key(KeyCode::Char(' ')), false), Some(Command::Type(' ')));
        assert_eq!(command_for(&key(KeyCode::Enter), false), Some(Command::CarriageReturn));
        assert_eq!(command_for(&key(KeyCode::Backspace), false), Some(Command::Backspace));
        assert_eq!(command_for(&key(KeyCode::Tab), false), Some(Command::ToggleStats));
        assert_eq!(command_for(&ctrl('c'), false), Some(Command::Quit));
        assert_eq!(command_for(&ctrl('r'), false), Some(Command::ChangeRibbon));
        assert_eq!(command_for(&ctrl('k'), false), Some(Command::ToggleInkColor));
        assert_eq!(command_for(&ctrl('n'), false), Some(Command::NewSheet));
        assert_eq!(command_for(&ctrl('l'), false), Some(Command::ClearPage));
        assert_eq!(command_for(&ctrl('s'), false), Some(Command::Save));
        assert_eq!(command_for(&ctrl('x'), false), None);
        assert_eq!(command_for(&key(KeyCode::F(1)), false), None);
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT), false),
            None
        );
    }

    #[test]
    fn test_escape_clears_jam_before_quitting() {
        assert_eq!(command_for(&key(KeyCode::Esc), true), Some(Command::ClearJam));
        assert_eq!(command_for(&key(KeyCode::Esc), false), Some(Command::Quit));
    }

    #[test]
    fn test_apply_gates_full_page() {
        let clock = ManualClock::new(0);
        let mut tw = Typewriter::new(Box::new(clock.clone()), Box::new(SequenceSource::new([0.5])));
        for _ in 0..LINES_PER_PAGE - 1 {
            assert_eq!(apply(&mut tw, Command::CarriageReturn), Some(Feedback::Returned(true)));
        }
        assert_eq!(apply(&mut tw, Command::CarriageReturn), Some(Feedback::PageFull));

        for _ in 0..CHARS_PER_LINE - 1 {
            clock.advance(200);
            assert_matches!(apply(&mut tw, Command::Type('x')), Some(Feedback::Struck(_)));
        }
        assert_eq!(apply(&mut tw, Command::Type('x')), Some(Feedback::PageFull));

        assert_eq!(apply(&mut tw, Command::NewSheet), Some(Feedback::SheetLoaded));
        clock.advance(200);
        assert_matches!(
            apply(&mut tw, Command::Type('x')),
            Some(Feedback::Struck(Keystroke { is_jammed: false, .. }))
        );
    }

    #[test]
    fn test_apply_marks_pressed_key() {
        let mut tw = Typewriter::new(
            Box::new(ManualClock::new(0)),
            Box::new(SequenceSource::new([0.5])),
        );
        apply(&mut tw, Command::Type('Q'));
        assert!(tw.state().pressed_keys.contains(&'q'));
    }

    #[test]
    fn test_settings_keys() {
        assert_eq!(command_for(&key(KeyCode::F(2)), false), Some(Command::CycleHousingColor));
        assert_eq!(command_for(&key(KeyCode::F(5)), false), Some(Command::ToggleJams));
        assert_eq!(command_for(&key(KeyCode::F(6)), true), Some(Command::ToggleMarginBell));
    }

    #[test]
    fn test_disabled_settings_can_be_turned_back_on() {
        let clock = ManualClock::new(0);
        let mut tw = Typewriter::new(Box::new(clock.clone()), Box::new(SequenceSource::new([0.5])));
        tw.update_settings(&SettingsPatch {
            jam_simulation_enabled: Some(false),
            margin_bell_enabled: Some(false),
            ..Default::default()
        });

        assert_eq!(apply(&mut tw, Command::ToggleJams), Some(Feedback::SettingsChanged));
        assert_eq!(apply(&mut tw, Command::ToggleMarginBell), Some(Feedback::SettingsChanged));
        assert!(tw.settings().jam_simulation_enabled);
        assert!(tw.settings().margin_bell_enabled);

        clock.advance(200);
        apply(&mut tw, Command::Type('a'));
        clock.advance(20);
        assert_matches!(
            apply(&mut tw, Command::Type('s')),
            Some(Feedback::Struck(Keystroke { is_jammed: true, .. }))
        );
    }

    #[test]
    fn test_appearance_keys_cycle_settings() {
        let mut tw = Typewriter::new(
            Box::new(ManualClock::new(0)),
            Box::new(SequenceSource::new([0.5])),
        );
        apply(&mut tw, Command::CycleHousingColor);
        apply(&mut tw, Command::CyclePaperType);
        apply(&mut tw, Command::CycleInkDensity);
        let settings = tw.settings();
        assert_eq!(settings.housing_color, HousingColor::Burgundy);
        assert_eq!(settings.paper_type, PaperType::CoffeeStained);
        assert_eq!(settings.ink_density, InkDensity::Low);
    }

    #[test]
    fn test_front_end_commands_are_not_applied() {
        let mut tw = Typewriter::new(
            Box::new(ManualClock::new(0)),
            Box::new(SequenceSource::new([0.5])),
        );
        assert_eq!(apply(&mut tw, Command::Save), None);
        assert_eq!(apply(&mut tw, Command::ToggleStats), None);
        assert_eq!(apply(&mut tw, Command::Quit), None);
    }
}

use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typebar::character::SequenceSource;
use typebar::clock::ManualClock;
use typebar::input::{self, Command, Feedback};
use typebar::runtime::{DeskEvent, FixedTicker, Runner, TestEventSource};
use typebar::Typewriter;

fn key(code: KeyCode) -> DeskEvent {
    DeskEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Drains the channel through the runner; every event is 300ms after the last.
fn drive(tw: &mut Typewriter, clock: &ManualClock, events: Vec<DeskEvent>) -> Vec<Feedback> {
    let (tx, rx) = mpsc::channel();
    let count = events.len();
    for ev in events {
        tx.send(ev).unwrap();
    }
    drop(tx);

    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    let mut feedback = Vec::new();
    let mut seen = 0;
    while seen < count {
        if let DeskEvent::Key(k) = runner.step() {
            seen += 1;
            clock.advance(300);
            if let Some(command) = input::command_for(&k, tw.is_jammed()) {
                feedback.extend(input::apply(tw, command));
            }
        }
    }
    feedback
}

#[test]
fn headless_typing_flow() {
    let clock = ManualClock::new(0);
    let mut tw = Typewriter::new(Box::new(clock.clone()), Box::new(SequenceSource::new([0.5])));

    let feedback = drive(
        &mut tw,
        &clock,
        vec![
            key(KeyCode::Char('h')),
            key(KeyCode::Char('i')),
            key(KeyCode::Char(' ')),
            key(KeyCode::Enter),
            key(KeyCode::Char('y')),
            key(KeyCode::Backspace),
        ],
    );

    assert_eq!(feedback.len(), 6);
    assert_eq!(feedback[3], Feedback::Returned(true));
    assert!(matches!(feedback[5], Feedback::Backspaced(b) if b.should_show_tooltip));
    assert_eq!(tw.current_text(), "hi \ny");
    assert_eq!(tw.state().stats.words_typed, 1);
    assert_eq!(tw.state().carriage_position, 0);
}

#[test]
fn headless_escape_frees_jam() {
    let clock = ManualClock::new(0);
    let mut tw = Typewriter::new(Box::new(clock.clone()), Box::new(SequenceSource::new([0.5])));

    tw.type_character('e');
    clock.advance(40);
    assert!(tw.type_character('r').is_jammed);

    let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    assert_eq!(input::command_for(&esc, tw.is_jammed()), Some(Command::ClearJam));

    let feedback = drive(&mut tw, &clock, vec![key(KeyCode::Esc), key(KeyCode::Char('r'))]);
    assert_eq!(feedback[0], Feedback::JamCleared(true));
    assert!(!tw.is_jammed());
    assert_eq!(tw.current_text(), "er");

    assert_eq!(input::command_for(&esc, tw.is_jammed()), Some(Command::Quit));
}

#[test]
fn headless_ticks_when_idle() {
    let (_tx, rx) = mpsc::channel::<DeskEvent>();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    assert!(matches!(runner.step(), DeskEvent::Tick));
}

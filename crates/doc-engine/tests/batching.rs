use doc_engine::{
    Caret, CaretSlot, Direction, Document, DocumentChange, DocumentConfig, LineChangeKind,
    MemoryClipboard,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Recorder {
    modified: Vec<DocumentChange>,
    carets_moved: usize,
    line_events: Vec<LineChangeKind>,
}

fn record(doc: &mut Document) -> Arc<Mutex<Recorder>> {
    let recorder = Arc::new(Mutex::new(Recorder::default()));
    let signals = doc.signals();

    let sink = recorder.clone();
    signals
        .modified
        .subscribe(move |change| sink.lock().unwrap().modified.push(*change));
    let sink = recorder.clone();
    signals
        .carets_moved
        .subscribe(move |_| sink.lock().unwrap().carets_moved += 1);
    for signal in [
        &mut signals.line_added,
        &mut signals.line_modified,
        &mut signals.line_removed,
    ] {
        let sink = recorder.clone();
        signal.subscribe(move |event| sink.lock().unwrap().line_events.push(event.kind));
    }
    recorder
}

#[test]
fn test_compound_action_emits_one_modified() {
    let mut doc = Document::new("one\ntwo\nthree", DocumentConfig::default());
    doc.set_carets(Caret::new(2, 2), Caret::new(0, 1));
    let recorder = record(&mut doc);

    // Multi-line selection delete followed by an insert: several line events, one notification.
    doc.add_char('Z');

    let recorder = recorder.lock().unwrap();
    assert_eq!(doc.text(), "oZree");
    assert!(recorder.line_events.len() >= 3);
    assert_eq!(recorder.modified.len(), 1);
    assert!(recorder.modified[0].structural);
    assert_eq!(recorder.carets_moved, 1);
}

#[test]
fn test_explicit_batch_collapses_many_actions() {
    let mut doc = Document::new("", DocumentConfig::default());
    let recorder = record(&mut doc);

    doc.batch(|doc| {
        for ch in "hello".chars() {
            doc.add_char(ch);
        }
        doc.enter();
        doc.add_char('!');
        doc.batch(|doc| doc.home(false));
    });

    let recorder = recorder.lock().unwrap();
    assert_eq!(doc.text(), "hello\r\n!");
    assert_eq!(recorder.modified.len(), 1);
    assert_eq!(recorder.carets_moved, 1);
    assert_eq!(recorder.modified[0].old_version, 0);
    assert_eq!(recorder.modified[0].new_version, 1);
    // Line events are still published per mutation, in order.
    assert_eq!(recorder.line_events.len(), 8);
}

#[test]
fn test_noop_action_emits_nothing() {
    let mut doc = Document::new("abc", DocumentConfig::default());
    let recorder = record(&mut doc);

    doc.backspace();
    doc.left(false);
    doc.up(false);
    doc.copy(&mut MemoryClipboard::new());
    doc.paste(&mut MemoryClipboard::new());
    doc.undo();

    let recorder = recorder.lock().unwrap();
    assert!(recorder.modified.is_empty());
    assert_eq!(recorder.carets_moved, 0);
    assert!(recorder.line_events.is_empty());
    assert_eq!(doc.version(), 0);
}

#[test]
fn test_caret_round_trip_inside_batch_is_not_a_move() {
    let mut doc = Document::new("abc", DocumentConfig::default());
    let recorder = record(&mut doc);

    doc.batch(|doc| {
        doc.right(false);
        doc.left(false);
    });

    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.carets_moved, 0);
    assert!(recorder.modified.is_empty());
}

#[test]
fn test_caret_only_action_is_not_structural() {
    let mut doc = Document::new("abc", DocumentConfig::default());
    let recorder = record(&mut doc);

    doc.move_caret(CaretSlot::Selection, Direction::Right);

    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.carets_moved, 1);
    assert_eq!(recorder.modified.len(), 1);
    assert!(!recorder.modified[0].structural);
}

#[test]
fn test_batch_returns_closure_value() {
    let mut doc = Document::new("ab", DocumentConfig::default());
    doc.set_carets(Caret::new(0, 0), Caret::new(0, 2));
    let deleted = doc.batch(|doc| doc.delete_selection());
    assert!(deleted);
    assert!(!doc.batch(|doc| doc.delete_selection()));
}

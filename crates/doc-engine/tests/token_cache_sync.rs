//! Token cache sync validation
//!
//! After any sequence of edits the incrementally maintained cache must have the document's line
//! count and must equal a cache built from scratch over the same lines.

use doc_engine::{
    Caret, Document, Editor, EditorConfig, LineChangeKind, ManualScheduler, MemoryClipboard,
    TokenCache, TokensChanged,
};
use doc_engine_simple::{BracketParser, RegexLexer};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

const SOURCE: &str = "fn main() {\n    let x = (1 + 2) * 3;\n    // note\n    print(\"x\", x);\n}";

fn new_editor(text: &str) -> Editor<BracketParser, ManualScheduler> {
    Editor::new(
        text,
        Box::new(RegexLexer::c_like().unwrap()),
        BracketParser::new(),
        ManualScheduler::new(),
        EditorConfig::default(),
    )
}

fn assert_matches_fresh_cache(editor: &Editor<BracketParser, ManualScheduler>) {
    let document = editor.document();
    let fresh = TokenCache::new(Box::new(RegexLexer::c_like().unwrap()), document.line_store());
    assert_eq!(editor.tokens().line_count(), document.line_count());
    for line in 0..document.line_count() {
        assert_eq!(editor.tokens().line(line), fresh.line(line), "line {line}");
    }
}

fn random_caret(rng: &mut StdRng, doc: &Document) -> Caret {
    let line = rng.gen_range(0..doc.line_count());
    Caret::new(line, rng.gen_range(0..=doc.line(line).chars().count()))
}

fn random_edit(rng: &mut StdRng, doc: &mut Document) {
    match rng.gen_range(0..9) {
        0 => {
            let enter = random_caret(rng, doc);
            let selection = random_caret(rng, doc);
            doc.set_carets(enter, selection);
        }
        1 => doc.add_char(['a', '(', ')', '"', '/', ' '][rng.gen_range(0..6)]),
        2 => doc.backspace(),
        3 => doc.delete(),
        4 => doc.enter(),
        5 => doc.tab(),
        6 => doc.paste(&mut MemoryClipboard::with_text("{\n  /* c */ y\n}")),
        7 => doc.undo(),
        _ => doc.redo(),
    }
}

#[test]
fn test_random_edits_keep_cache_in_sync() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut editor = new_editor(SOURCE);

    for step in 0..400 {
        let burst = rng.gen_range(1..4);
        editor.edit(|doc| {
            for _ in 0..burst {
                random_edit(&mut rng, doc);
            }
        });
        if step % 10 == 0 {
            assert_matches_fresh_cache(&editor);
        }
    }
    assert_matches_fresh_cache(&editor);
}

#[test]
fn test_only_affected_lines_are_reported() {
    let mut editor = new_editor(SOURCE);
    let seen: Arc<Mutex<Vec<TokensChanged>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    editor
        .tokens_changed()
        .subscribe(move |changed| sink.lock().unwrap().push(*changed));

    editor.edit(|doc| {
        doc.set_carets(Caret::new(1, 4), Caret::new(1, 4));
        doc.add_char('m');
    });

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, LineChangeKind::Modified);
    assert_eq!((seen[0].change.start, seen[0].change.count), (1, 1));
    assert_matches_fresh_cache(&editor);
}

#[test]
fn test_reset_replaces_every_line() {
    let mut editor = new_editor(SOURCE);
    editor.edit(|doc| doc.reset("a\nb"));
    assert_eq!(editor.tokens().line_count(), 2);
    assert_matches_fresh_cache(&editor);

    editor.edit(|doc| doc.reset(""));
    assert_eq!(editor.tokens().line_count(), 1);
    assert!(editor.tokens().line(0).is_empty());
}

#[test]
fn test_bracket_matching_follows_edits() {
    let mut editor = new_editor("f(a)");
    assert_eq!(editor.tokens().matching_bracket(0, 1), Some((0, 3)));

    // Split the group over two lines.
    editor.edit(|doc| {
        doc.set_carets(Caret::new(0, 3), Caret::new(0, 3));
        doc.enter();
    });
    assert_eq!(editor.tokens().matching_bracket(0, 1), Some((1, 0)));

    let (index, token) = editor.tokens().token_at(Caret::new(1, 1)).unwrap();
    assert_eq!(index, 0);
    assert_eq!(token.value.as_deref(), Some(")"));
}

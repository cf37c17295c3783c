//! Runs a short scripted editing session on a background-thread scheduler.
//!
//! ```text
//! RUST_LOG=doc_engine=debug cargo run -p doc-engine --example analysis_loop
//! ```

use doc_engine::{Caret, Editor, EditorConfig, ThreadScheduler};
use doc_engine_simple::{BracketParser, RegexLexer};
use std::error::Error;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EditorConfig::default().with_quiet_period(Duration::from_millis(150));
    let mut editor = Editor::new(
        "fn main() {\n    run(1, 2\n}",
        Box::new(RegexLexer::c_like()?),
        BracketParser::new(),
        ThreadScheduler::new()?,
        config,
    );
    report("initial", &editor);

    // Subscribers see one notification per user action.
    editor.document_signals().modified.subscribe(|change| {
        println!(
            "  modified v{} -> v{} (structural: {})",
            change.old_version, change.new_version, change.structural
        );
    });
    editor.analysis_changed().subscribe(|result| {
        println!("  analysis: {} error(s)", result.errors.len());
    });

    editor.edit(|doc| {
        doc.set_carets(Caret::new(1, 12), Caret::new(1, 12));
        doc.add_char(')');
        doc.add_char(';');
    });
    wait_for_analysis(&mut editor);
    report("after fixing the call", &editor);

    editor.edit(|doc| doc.undo());
    editor.edit(|doc| doc.undo());
    wait_for_analysis(&mut editor);
    report("after undo", &editor);

    Ok(())
}

fn wait_for_analysis(editor: &mut Editor<BracketParser, ThreadScheduler>) {
    for _ in 0..40 {
        let fired = editor.scheduler_mut().wait_fired(Duration::from_millis(50));
        if editor.handle_fired(fired) {
            return;
        }
    }
}

fn report(label: &str, editor: &Editor<BracketParser, ThreadScheduler>) {
    println!("{label}:");
    for line in 0..editor.document().line_count() {
        println!("  {:>3} | {}", line + 1, editor.document().line(line));
    }
    for error in &editor.analysis().result().errors {
        println!("  error {error}");
    }
}

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use doc_engine::{Caret, Document, DocumentConfig, Editor, EditorConfig, ManualScheduler};
use doc_engine_simple::{BracketParser, RegexLexer};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "let v{i:06} = call(a, [b, c], {{ d: \"the quick brown fox\" }}); // line\n"
        ));
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

fn new_editor(text: &str) -> Editor<BracketParser, ManualScheduler> {
    Editor::new(
        text,
        Box::new(RegexLexer::c_like().unwrap()),
        BracketParser::new(),
        ManualScheduler::new(),
        EditorConfig::default(),
    )
}

fn bench_document_open(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("document_open/50k_lines", |b| {
        b.iter(|| {
            let doc = Document::new(black_box(&text), DocumentConfig::default());
            black_box(doc.line_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_chars", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::new(&text, DocumentConfig::default());
                doc.set_carets(Caret::new(25_000, 10), Caret::new(25_000, 10));
                doc
            },
            |mut doc| {
                for _ in 0..100 {
                    doc.add_char('x');
                }
                black_box(doc.max_length());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_incremental_tokens(c: &mut Criterion) {
    let text = large_text(20_000);
    c.bench_function("incremental_tokens/100_edits", |b| {
        b.iter_batched(
            || new_editor(&text),
            |mut editor| {
                editor.edit(|doc| doc.set_carets(Caret::new(10_000, 0), Caret::new(10_000, 0)));
                for i in 0..100 {
                    editor.edit(|doc| {
                        if i % 10 == 0 {
                            doc.enter();
                        } else {
                            doc.add_char('(');
                        }
                    });
                }
                black_box(editor.tokens().line_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_undo_redo(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("undo_redo/200_steps", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::new(&text, DocumentConfig::default());
                doc.set_carets(Caret::new(5_000, 4), Caret::new(5_000, 4));
                for _ in 0..200 {
                    doc.add_char('y');
                }
                doc
            },
            |mut doc| {
                while doc.can_undo() {
                    doc.undo();
                }
                while doc.can_redo() {
                    doc.redo();
                }
                black_box(doc.version());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_full_reparse(c: &mut Criterion) {
    let text = large_text(20_000);
    let mut editor = new_editor(&text);
    c.bench_function("full_reparse/20k_lines", |b| {
        b.iter(|| {
            let result = editor.analyze_now();
            black_box(result.errors.len());
        })
    });
}

criterion_group!(
    benches,
    bench_document_open,
    bench_typing_in_middle,
    bench_incremental_tokens,
    bench_undo_redo,
    bench_full_reparse
);
criterion_main!(benches);

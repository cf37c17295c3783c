//! Editor pipeline.
//!
//! [`Editor`] owns every stage of the engine and runs the data flow on one mutation thread:
//!
//! ```text
//! edit(|doc| ..)                      process_timers()
//!   Document (one batch)                AnalysisTrigger::on_timer
//!     -> line events                      -> Fire
//!   TokenCache::apply (per event)           -> Parser over CacheTokenSource
//!     -> tokens changed                       -> AnalysisHolder (notify)
//!   AnalysisTrigger::signal
//! ```
//!
//! The scheduler's clock runs independently; its fired timers only take effect when the host
//! calls [`Editor::process_timers`] (or [`Editor::handle_fired`]) on the mutation thread.

use crate::analysis::{AnalysisHolder, CacheTokenSource, ParseResult, Parser};
use crate::config::EditorConfig;
use crate::debounce::{AnalysisTrigger, Scheduler, TimerId, TimerOutcome};
use crate::document::{Document, DocumentSignals};
use crate::signal::Signal;
use crate::token::Lexer;
use crate::token_cache::{TokenCache, TokensChanged};
use tracing::debug;

/// Document, token cache and analysis kept in sync under edits.
pub struct Editor<P: Parser, S: Scheduler> {
    document: Document,
    tokens: TokenCache,
    trigger: AnalysisTrigger,
    parser: P,
    scheduler: S,
    analysis: AnalysisHolder<P::Tree>,
}

impl<P: Parser, S: Scheduler> Editor<P, S> {
    /// Build the pipeline over `text` and run the initial parse.
    pub fn new(
        text: &str,
        lexer: Box<dyn Lexer>,
        parser: P,
        scheduler: S,
        config: EditorConfig,
    ) -> Self {
        let mut document = Document::new(text, config.document);
        document.enable_line_journal();
        let tokens = TokenCache::new(lexer, document.line_store());

        let mut editor = Self {
            document,
            tokens,
            trigger: AnalysisTrigger::new(config.quiet_period),
            parser,
            scheduler,
            analysis: AnalysisHolder::new(),
        };
        editor.run_analysis();
        editor
    }

    /// Run one user action against the document, then bring the token cache up to date.
    ///
    /// Every applied line event signals the analysis trigger.
    ///
    /// # Panics
    ///
    /// Panics if the token cache ends up with a different line count than the document.
    pub fn edit<R>(&mut self, action: impl FnOnce(&mut Document) -> R) -> R {
        let result = self.document.batch(action);
        self.sync_tokens();
        result
    }

    fn sync_tokens(&mut self) {
        let events = self.document.take_line_events();
        if events.is_empty() {
            return;
        }
        for event in &events {
            self.tokens.apply(event);
            self.trigger.signal(&mut self.scheduler);
        }
        self.tokens.assert_in_sync(self.document.line_store());
        debug!(events = events.len(), "token cache synchronized");
    }

    /// Collect fired timers from the scheduler and reparse if the quiet period has elapsed.
    ///
    /// Returns `true` if an analysis ran.
    pub fn process_timers(&mut self) -> bool {
        let fired = self.scheduler.take_fired();
        self.handle_fired(fired)
    }

    /// Feed already-collected timer ids to the trigger. Returns `true` if an analysis ran.
    pub fn handle_fired(&mut self, fired: impl IntoIterator<Item = TimerId>) -> bool {
        let mut analyzed = false;
        for id in fired {
            if self.trigger.on_timer(id, &mut self.scheduler) == TimerOutcome::Fire {
                self.run_analysis();
                analyzed = true;
            }
        }
        analyzed
    }

    /// Reparse immediately, dropping any pending debounced fire.
    pub fn analyze_now(&mut self) -> &ParseResult<P::Tree> {
        self.trigger.cancel(&mut self.scheduler);
        self.run_analysis();
        self.analysis.result()
    }

    fn run_analysis(&mut self) {
        let mut source = CacheTokenSource::new(&self.tokens);
        self.analysis.rebuild(&mut self.parser, &mut source);
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Document notification channels.
    pub fn document_signals(&mut self) -> &mut DocumentSignals {
        self.document.signals()
    }

    /// The token cache.
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// "Tokens changed" notification channel.
    pub fn tokens_changed(&mut self) -> &mut Signal<TokensChanged> {
        self.tokens.tokens_changed()
    }

    /// Latest analysis result.
    pub fn analysis(&self) -> &AnalysisHolder<P::Tree> {
        &self.analysis
    }

    /// "Parse result changed" notification channel.
    pub fn analysis_changed(&mut self) -> &mut Signal<ParseResult<P::Tree>> {
        self.analysis.changed()
    }

    /// The debounce state machine.
    pub fn trigger(&self) -> &AnalysisTrigger {
        &self.trigger
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The scheduler, e.g. to advance a [`ManualScheduler`](crate::ManualScheduler).
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }
}

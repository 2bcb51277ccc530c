//! The Viewer
//!
//! Single owner of the corpus, favorites, application state, quiz session and
//! speaker, and the only dispatcher of [`ViewerEvent`]s. Every mutation ends in
//! a full re-render that replaces the current [`ViewTree`] wholesale.
//!
//! # Intent Lifetime
//!
//! An [`Intent`] is only honored while the current tree carries it. A surface
//! that activates an element from an older tree gets [`Reaction::Stale`] and
//! nothing changes.

use crate::config::ViewerConfig;
use crate::corpus::Corpus;
use crate::events::{Notice, Reaction, ViewerEvent};
use crate::favorites::Favorites;
use crate::policy::PresentationPolicy;
use crate::quiz::Quiz;
use crate::render::{render, RenderContext};
use crate::search::normalize_term;
use crate::speech::{SpeechEngine, SpeechError, Speaker};
use crate::state::{AppState, QuizSetup, View};
use crate::store::SharedStore;
use crate::transfer;
use crate::view::{Intent, ViewTree};

/// State owner and event router
pub struct Viewer {
    corpus: Corpus,
    favorites: Favorites,
    policy: PresentationPolicy,
    state: AppState,
    quiz: Quiz,
    quiz_setup: QuizSetup,
    speaker: Speaker,
    tree: ViewTree,
    notices: Vec<Notice>,
    render_count: u64,
}

impl Viewer {
    /// Load favorites and speech preferences from `store` and render the home view
    pub fn new(
        corpus: Corpus,
        store: SharedStore,
        engine: Box<dyn SpeechEngine>,
        config: &ViewerConfig,
    ) -> Self {
        let favorites = Favorites::load(store.clone());
        let speaker = Speaker::new(engine, store, &config.fallback_language);
        let sources = config
            .quiz_sources
            .iter()
            .filter(|id| corpus.section(id).is_some())
            .cloned()
            .collect();
        let quiz_setup = QuizSetup::new(sources, config.quiz_count);
        let state = AppState::default();
        let quiz = Quiz::new();
        let policy = config.policy.clone();

        let tree = render(
            &state,
            &RenderContext {
                corpus: &corpus,
                favorites: &favorites,
                policy: &policy,
                quiz: &quiz,
                quiz_setup: &quiz_setup,
            },
        );

        tracing::info!(
            sections = corpus.len(),
            favorites = favorites.len(),
            voices = speaker.voices().len(),
            "Viewer ready"
        );

        Self {
            corpus,
            favorites,
            policy,
            state,
            quiz,
            quiz_setup,
            speaker,
            tree,
            notices: Vec::new(),
            render_count: 1,
        }
    }

    /// Handle one event from the surface
    pub fn handle_event(&mut self, event: ViewerEvent) -> Reaction {
        tracing::debug!(?event, "Handling event");
        match event {
            ViewerEvent::Activate(intent) => {
                if !self.tree.contains(&intent) {
                    tracing::debug!(?intent, "Ignoring stale intent");
                    return Reaction::Stale;
                }
                self.dispatch(intent)
            }
            ViewerEvent::Navigate(view) => self.navigate(view),
            ViewerEvent::Search(raw) => {
                self.state.search_term = normalize_term(&raw);
                self.rerender()
            }
            ViewerEvent::QuizInput(text) => {
                self.quiz.set_answer(text);
                Reaction::Unchanged
            }
            ViewerEvent::QuizSubmit => {
                if !self.tree.contains(&Intent::QuizCheck) {
                    return Reaction::Stale;
                }
                self.dispatch(Intent::QuizCheck)
            }
            ViewerEvent::CycleQuizSource => {
                self.quiz_setup.cycle_source();
                self.rerender()
            }
            ViewerEvent::AdjustQuizCount(delta) => {
                self.quiz_setup.adjust_count(delta);
                self.rerender()
            }
            ViewerEvent::CycleVoice => {
                let notice = match self.speaker.cycle_voice() {
                    Some(voice) => Notice::info(format!("Voice: {}", voice.name)),
                    None => Notice::warning("No English voices available"),
                };
                self.notices.push(notice);
                Reaction::Unchanged
            }
            ViewerEvent::AdjustRate(delta) => {
                self.speaker.adjust_rate(delta);
                let rate = self.speaker.rate();
                self.notices
                    .push(Notice::info(format!("Speech rate: {rate:.2}")));
                Reaction::Unchanged
            }
            ViewerEvent::Import { section_id, path } => {
                match transfer::import_file(&mut self.corpus, &section_id, &path) {
                    Ok(summary) => {
                        self.notices.push(Notice::info(summary.to_string()));
                        self.rerender()
                    }
                    Err(e) => {
                        tracing::warn!(section = %section_id, path = ?path, error = %e, "Import failed");
                        self.notices.push(Notice::error(format!("Import failed: {e}")));
                        Reaction::Unchanged
                    }
                }
            }
            ViewerEvent::Export { path } => {
                match transfer::export_file(&self.corpus, &path) {
                    Ok(()) => self
                        .notices
                        .push(Notice::info(format!("Exported to {}", path.display()))),
                    Err(e) => {
                        tracing::warn!(path = ?path, error = %e, "Export failed");
                        self.notices.push(Notice::error(format!("Export failed: {e}")));
                    }
                }
                Reaction::Unchanged
            }
        }
    }

    fn dispatch(&mut self, intent: Intent) -> Reaction {
        match intent {
            Intent::ToggleFavorite(id) => {
                self.favorites.toggle(&id);
                self.rerender()
            }
            Intent::Speak(text) => {
                self.speak(&text);
                Reaction::Unchanged
            }
            Intent::QuizStart => {
                let section = self
                    .quiz_setup
                    .source()
                    .and_then(|id| self.corpus.section(id));
                if self.quiz.start(self.quiz_setup.count(), section) == 0 {
                    self.notices
                        .push(Notice::warning("No questions available for this source"));
                }
                self.rerender()
            }
            Intent::QuizCheck => {
                self.quiz.check();
                self.rerender()
            }
            Intent::QuizNext => {
                self.quiz.next();
                self.rerender()
            }
            Intent::QuizSpeakSolution => {
                if let Some(answer) = self.quiz.solution().map(str::to_string) {
                    self.speak(&answer);
                }
                Reaction::Unchanged
            }
            Intent::Navigate(view) => self.navigate(view),
        }
    }

    fn navigate(&mut self, view: View) -> Reaction {
        let view = match view {
            View::Section(id) => {
                if self.corpus.section(&id).is_none() {
                    tracing::debug!(section = %id, "Ignoring navigation to unknown section");
                    return Reaction::Unchanged;
                }
                View::for_menu_entry(&id)
            }
            other => other,
        };
        self.state.current_view = view;
        self.rerender()
    }

    fn speak(&mut self, text: &str) {
        match self.speaker.speak(text) {
            Ok(()) => {}
            Err(SpeechError::Unsupported(reason)) => {
                tracing::warn!(%reason, "Speech unavailable");
                self.notices.push(Notice::warning(format!(
                    "Speech is not available: {reason}"
                )));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speech failed");
                self.notices.push(Notice::error(e.to_string()));
            }
        }
    }

    fn rerender(&mut self) -> Reaction {
        let tree = render(
            &self.state,
            &RenderContext {
                corpus: &self.corpus,
                favorites: &self.favorites,
                policy: &self.policy,
                quiz: &self.quiz,
                quiz_setup: &self.quiz_setup,
            },
        );
        self.tree = tree;
        self.render_count += 1;
        tracing::debug!(view = %self.state.current_view, renders = self.render_count, "Rendered");
        Reaction::Rerendered
    }

    /// The current view tree
    #[must_use]
    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    /// Drain pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Application state
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Corpus
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Favorite set
    #[must_use]
    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Quiz session
    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Quiz form values
    #[must_use]
    pub fn quiz_setup(&self) -> &QuizSetup {
        &self.quiz_setup
    }

    /// Speech preferences
    #[must_use]
    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    /// Number of trees rendered so far, the initial one included
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Periodic housekeeping between events
    pub fn tick(&mut self) {
        self.speaker.poll();
    }

    /// Stop any speech in progress
    pub fn shutdown(&mut self) {
        self.speaker.cancel();
    }
}

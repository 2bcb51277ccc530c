//! Render Pipeline
//!
//! Pure function from application state, corpus, favorites and quiz to a
//! complete [`ViewTree`]. Called after every mutation; the router swaps the
//! result in for the previous tree.

use crate::corpus::{Corpus, Row, RowId, Section};
use crate::favorites::Favorites;
use crate::policy::PresentationPolicy;
use crate::quiz::{Quiz, QuizPhase};
use crate::search;
use crate::state::{AppState, QuizSetup, View};
use crate::view::{
    Body, Cell, Control, EntryRow, FavoriteEntry, FavoriteToggle, FavoritesBlock, Intent,
    NavEntry, QuestionView, QuizBlock, QuizSource, ReferenceBody, TableBlock, TableRow, ViewTree,
};

/// Headers of the aggregated favorites table
pub const FAVORITES_HEADERS: [&str; 3] = ["Item", "Description", "Section"];

/// Everything the render pipeline reads besides the application state
pub struct RenderContext<'a> {
    /// Corpus
    pub corpus: &'a Corpus,
    /// Favorite set
    pub favorites: &'a Favorites,
    /// Speak policy
    pub policy: &'a PresentationPolicy,
    /// Quiz session
    pub quiz: &'a Quiz,
    /// Quiz form values
    pub quiz_setup: &'a QuizSetup,
}

/// Build the complete view tree for `state`
#[must_use]
pub fn render(state: &AppState, ctx: &RenderContext<'_>) -> ViewTree {
    let nav = render_nav(&state.current_view, ctx.corpus);

    let body = if state.current_view == View::Quiz {
        Body::Quiz(render_quiz(ctx))
    } else {
        let query = state.query_lower();
        let favorites = if ctx.favorites.is_empty() {
            None
        } else {
            Some(render_favorites(ctx))
        };
        let tables = ctx
            .corpus
            .content_sections()
            .map(|section| render_table(section, &query, ctx.favorites, ctx.policy))
            .collect();
        Body::Reference(ReferenceBody {
            favorites,
            tables,
            anchor: state.current_view.section_id().map(str::to_string),
        })
    };

    ViewTree { nav, body }
}

fn render_nav(view: &View, corpus: &Corpus) -> Vec<NavEntry> {
    corpus
        .sections()
        .iter()
        .map(|section| {
            let target = View::for_menu_entry(&section.id);
            NavEntry {
                id: section.id.clone(),
                title: section.title.clone(),
                active: *view != View::Home && target == *view,
                intent: Intent::Navigate(target),
            }
        })
        .collect()
}

/// Render one section through the search filter
#[must_use]
pub fn render_table(
    section: &Section,
    query_lower: &str,
    favorites: &Favorites,
    policy: &PresentationPolicy,
) -> TableBlock {
    let span = section.headers.len() + 1;
    let rows = search::filter_rows(section, query_lower)
        .map(|row| match row {
            Row::Heading { text, .. } => TableRow::Subheading {
                text: text.clone(),
                span,
            },
            Row::Data(cells) => {
                let id = RowId::derive(&section.id, cells);
                let cells = cells
                    .iter()
                    .enumerate()
                    .map(|(col, text)| {
                        if policy.speaks(&section.id, col) {
                            Cell::speakable(text.as_str())
                        } else {
                            Cell::plain(text.as_str())
                        }
                    })
                    .collect();
                let active = favorites.is_favorite(&id);
                TableRow::Entry(EntryRow {
                    cells,
                    favorite: FavoriteToggle::new(id, active),
                })
            }
        })
        .collect();

    TableBlock {
        anchor: section.id.clone(),
        title: section.title.clone(),
        note: section.note.clone(),
        headers: section.headers.clone(),
        rows,
    }
}

fn render_favorites(ctx: &RenderContext<'_>) -> FavoritesBlock {
    let entries = ctx
        .corpus
        .sections()
        .iter()
        .flat_map(|section| section.data_rows().map(move |cells| (section, cells)))
        .filter_map(|(section, cells)| {
            let id = RowId::derive(&section.id, cells);
            if !ctx.favorites.is_favorite(&id) {
                return None;
            }
            let term_text = cells.first().cloned().unwrap_or_default();
            let term = if ctx.policy.favorite_term_speaks(&section.id) {
                Cell::speakable(term_text)
            } else {
                Cell::plain(term_text)
            };
            Some(FavoriteEntry {
                term,
                description: cells.iter().skip(1).cloned().collect::<Vec<_>>().join(" / "),
                section_id: section.id.clone(),
                section_title: section.title.clone(),
                favorite: FavoriteToggle::new(id, true),
            })
        })
        .collect();

    FavoritesBlock {
        headers: FAVORITES_HEADERS.iter().map(|h| (*h).to_string()).collect(),
        entries,
    }
}

fn render_quiz(ctx: &RenderContext<'_>) -> QuizBlock {
    let quiz = ctx.quiz;
    let sources = ctx
        .quiz_setup
        .sources()
        .iter()
        .filter_map(|id| ctx.corpus.section(id))
        .map(|section| QuizSource {
            id: section.id.clone(),
            title: section.title.clone(),
            selected: ctx.quiz_setup.source() == Some(section.id.as_str()),
        })
        .collect();

    let question = quiz.current_question().map(|q| {
        let (number, total) = quiz.position().unwrap_or((1, 1));
        QuestionView {
            prompt: q.prompt.clone(),
            extra: q.extra.clone(),
            answer_field: quiz.user_answer().to_string(),
            number,
            total,
        }
    });

    let mut controls = vec![Control::new("Start", Intent::QuizStart)];
    if question.is_some() {
        controls.push(Control::new("Speak solution", Intent::QuizSpeakSolution));
        if quiz.phase() != QuizPhase::Complete {
            controls.push(Control::new("Check", Intent::QuizCheck));
            controls.push(Control::new("Next", Intent::QuizNext));
        }
    }

    QuizBlock {
        sources,
        count: ctx.quiz_setup.count(),
        phase: quiz.phase(),
        question,
        feedback: quiz.feedback().cloned(),
        controls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::QUIZ_SECTION_ID;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Section::new("verbs_irregular", "Irregular verbs")
                .with_headers(["Base", "Past", "Participle", "Spanish"])
                .with_rows(vec![
                    Row::heading("Common"),
                    Row::data(["go", "went", "gone", "ir"]),
                    Row::data(["see", "saw"]),
                ]),
            Section::new("vocab", "Vocabulary")
                .with_headers(["English", "Spanish"])
                .with_rows(vec![Row::data(["dog", "perro"]), Row::data(["cat", "gato"])]),
            Section::new("tenses", "Tenses")
                .with_headers(["Tense", "Form"])
                .with_rows(vec![Row::data(["Past simple", "V2"])]),
            Section::new(QUIZ_SECTION_ID, "Quiz"),
        ])
        .unwrap()
    }

    struct Fixture {
        corpus: Corpus,
        favorites: Favorites,
        policy: PresentationPolicy,
        quiz: Quiz,
        setup: QuizSetup,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                corpus: corpus(),
                favorites: Favorites::load(MemoryStore::new().shared()),
                policy: PresentationPolicy::default(),
                quiz: Quiz::new(),
                setup: QuizSetup::default(),
            }
        }

        fn render(&self, state: &AppState) -> ViewTree {
            render(
                state,
                &RenderContext {
                    corpus: &self.corpus,
                    favorites: &self.favorites,
                    policy: &self.policy,
                    quiz: &self.quiz,
                    quiz_setup: &self.setup,
                },
            )
        }
    }

    fn entry(table: &TableBlock, idx: usize) -> &EntryRow {
        match &table.rows[idx] {
            TableRow::Entry(entry) => entry,
            TableRow::Subheading { .. } => panic!("row {idx} is a subheading"),
        }
    }

    #[test]
    fn test_home_renders_sections_in_order_without_quiz() {
        let fx = Fixture::new();
        let tree = fx.render(&AppState::default());
        let reference = tree.reference().unwrap();
        let anchors: Vec<_> = reference.tables.iter().map(|t| t.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["verbs_irregular", "vocab", "tenses"]);
        assert!(reference.favorites.is_none());
        assert!(reference.anchor.is_none());
    }

    #[test]
    fn test_speak_columns_follow_policy() {
        let fx = Fixture::new();
        let tree = fx.render(&AppState::default());
        let reference = tree.reference().unwrap();

        let verbs = reference.table("verbs_irregular").unwrap();
        let go = entry(verbs, 1);
        let speakable: Vec<bool> = go.cells.iter().map(|c| c.speak.is_some()).collect();
        assert_eq!(speakable, vec![true, true, true, false]);
        assert_eq!(go.cells[1].speak, Some(Intent::Speak("went".to_string())));

        let vocab = reference.table("vocab").unwrap();
        let dog = entry(vocab, 0);
        assert!(dog.cells[0].speak.is_some());
        assert!(dog.cells[1].speak.is_none());

        let tenses = reference.table("tenses").unwrap();
        assert!(entry(tenses, 0).cells.iter().all(|c| c.speak.is_none()));
    }

    #[test]
    fn test_short_rows_render_existing_cells() {
        let fx = Fixture::new();
        let tree = fx.render(&AppState::default());
        let verbs = tree.reference().unwrap().table("verbs_irregular").unwrap();
        let see = entry(verbs, 2);
        assert_eq!(see.cells.len(), 2);
        assert_eq!(
            see.favorite.id,
            RowId::from_raw("verbs_irregular::see|saw")
        );
    }

    #[test]
    fn test_subheading_spans_headers_plus_favorite() {
        let fx = Fixture::new();
        let tree = fx.render(&AppState::default());
        let verbs = tree.reference().unwrap().table("verbs_irregular").unwrap();
        assert_eq!(
            verbs.rows[0],
            TableRow::Subheading {
                text: "Common".to_string(),
                span: 5
            }
        );
    }

    #[test]
    fn test_search_filters_but_keeps_empty_sections() {
        let fx = Fixture::new();
        let state = AppState {
            search_term: "GAT".to_string(),
            current_view: View::Home,
        };
        let tree = fx.render(&state);
        let reference = tree.reference().unwrap();
        assert_eq!(reference.tables.len(), 3);
        assert_eq!(reference.table("vocab").unwrap().rows.len(), 1);
        assert!(reference.table("tenses").unwrap().rows.is_empty());
        // headings survive the filter
        assert_eq!(reference.table("verbs_irregular").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_render_is_deterministic() {
        let fx = Fixture::new();
        let state = AppState::default();
        assert_eq!(fx.render(&state), fx.render(&state));
    }

    #[test]
    fn test_favorites_block_first_and_policy() {
        let mut fx = Fixture::new();
        fx.favorites
            .toggle(&RowId::from_raw("verbs_irregular::go|went|gone|ir"));
        fx.favorites.toggle(&RowId::from_raw("tenses::Past simple|V2"));
        let tree = fx.render(&AppState::default());
        let favorites = tree.reference().unwrap().favorites.as_ref().unwrap();

        assert_eq!(favorites.entries.len(), 2);
        let go = &favorites.entries[0];
        assert_eq!(go.term, Cell::speakable("go"));
        assert_eq!(go.description, "went / gone / ir");
        assert_eq!(go.section_title, "Irregular verbs");
        assert!(go.favorite.active);

        let tense = &favorites.entries[1];
        assert_eq!(tense.section_id, "tenses");
        assert!(tense.term.speak.is_some());
    }

    #[test]
    fn test_favorites_ignore_search() {
        let mut fx = Fixture::new();
        fx.favorites.toggle(&RowId::from_raw("vocab::dog|perro"));
        let state = AppState {
            search_term: "zzz".to_string(),
            current_view: View::Home,
        };
        let tree = fx.render(&state);
        assert_eq!(
            tree.reference().unwrap().favorites.as_ref().unwrap().entries.len(),
            1
        );
    }

    #[test]
    fn test_toggle_marks_active_in_table() {
        let mut fx = Fixture::new();
        fx.favorites.toggle(&RowId::from_raw("vocab::cat|gato"));
        let tree = fx.render(&AppState::default());
        let vocab = tree.reference().unwrap().table("vocab").unwrap();
        assert!(!entry(vocab, 0).favorite.active);
        assert!(entry(vocab, 1).favorite.active);
    }

    #[test]
    fn test_section_view_sets_anchor_and_active_nav() {
        let fx = Fixture::new();
        let state = AppState {
            search_term: String::new(),
            current_view: View::Section("vocab".to_string()),
        };
        let tree = fx.render(&state);
        assert_eq!(tree.reference().unwrap().anchor.as_deref(), Some("vocab"));
        let active: Vec<_> = tree.nav.iter().filter(|n| n.active).map(|n| n.id.as_str()).collect();
        assert_eq!(active, vec!["vocab"]);
        assert_eq!(tree.reference().unwrap().tables.len(), 3);
    }

    #[test]
    fn test_quiz_view_only_shows_quiz() {
        let fx = Fixture::new();
        let state = AppState {
            search_term: String::new(),
            current_view: View::Quiz,
        };
        let tree = fx.render(&state);
        assert!(tree.reference().is_none());
        let quiz = tree.quiz().unwrap();
        assert_eq!(quiz.phase, QuizPhase::Idle);
        assert!(quiz.question.is_none());
        assert_eq!(quiz.controls, vec![Control::new("Start", Intent::QuizStart)]);
        // only vocab exists among the default sources
        assert_eq!(quiz.sources.len(), 1);
        assert!(quiz.sources[0].selected);
        assert!(tree.nav.iter().any(|n| n.id == QUIZ_SECTION_ID && n.active));
    }

    #[test]
    fn test_quiz_view_with_question() {
        let mut fx = Fixture::new();
        let vocab = fx.corpus.section("vocab").cloned();
        fx.quiz.start(2, vocab.as_ref());
        fx.quiz.set_answer("do");
        let state = AppState {
            search_term: String::new(),
            current_view: View::Quiz,
        };
        let tree = fx.render(&state);
        let quiz = tree.quiz().unwrap();
        let question = quiz.question.as_ref().unwrap();
        assert_eq!(question.answer_field, "do");
        assert_eq!((question.number, question.total), (1, 2));
        let intents: Vec<_> = quiz.controls.iter().map(|c| c.intent.clone()).collect();
        assert_eq!(
            intents,
            vec![
                Intent::QuizStart,
                Intent::QuizSpeakSolution,
                Intent::QuizCheck,
                Intent::QuizNext
            ]
        );
    }

    #[test]
    fn test_tree_contains_rendered_intents_only() {
        let fx = Fixture::new();
        let tree = fx.render(&AppState::default());
        assert!(tree.contains(&Intent::ToggleFavorite(RowId::from_raw("vocab::dog|perro"))));
        assert!(tree.contains(&Intent::Speak("gone".to_string())));
        assert!(!tree.contains(&Intent::Speak("ir".to_string())));
        assert!(!tree.contains(&Intent::QuizCheck));
    }
}

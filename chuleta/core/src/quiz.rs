//! Quiz State Machine
//!
//! Samples questions from a section and drives the practice-and-feedback loop:
//!
//! ```text
//!   Idle --start--> Active --check--> Answered --next--> Active ... --next--> Complete
//! ```
//!
//! `start` is the only way to reset. `check` and `next` without a current
//! question are silent no-ops, and `Complete` is terminal until the next
//! `start`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::corpus::Section;

/// Feedback message for a correct answer
pub const CORRECT_MESSAGE: &str = "Correct!";
/// Feedback message once the last question has been passed
pub const COMPLETE_MESSAGE: &str = "You have completed the quiz!";

/// A sampled question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Shown to the user (row column 1)
    pub prompt: String,
    /// Expected answer (row column 0)
    pub answer: String,
    /// Example sentence (row column 2), if any
    pub extra: Option<String>,
}

impl Question {
    /// Build a question from data-row cells; rows with fewer than two cells yield nothing
    #[must_use]
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        match cells {
            [answer, prompt, rest @ ..] => Some(Self {
                prompt: prompt.clone(),
                answer: answer.clone(),
                extra: rest.first().cloned(),
            }),
            _ => None,
        }
    }
}

/// Result of checking an answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Whether the answer was accepted
    pub ok: bool,
    /// Message shown to the user
    pub message: String,
}

impl Feedback {
    fn correct() -> Self {
        Self {
            ok: true,
            message: CORRECT_MESSAGE.to_string(),
        }
    }

    fn incorrect(answer: &str) -> Self {
        Self {
            ok: false,
            message: format!("Incorrect. Correct answer: {answer}"),
        }
    }

    fn complete() -> Self {
        Self {
            ok: true,
            message: COMPLETE_MESSAGE.to_string(),
        }
    }
}

/// Quiz lifecycle phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizPhase {
    /// No questions drawn
    #[default]
    Idle,
    /// Question shown, no feedback yet
    Active,
    /// Feedback shown for the current question
    Answered,
    /// Pool exhausted
    Complete,
}

impl QuizPhase {
    /// Whether a question is on screen
    #[must_use]
    pub fn has_question(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// The quiz session
#[derive(Clone, Debug, Default)]
pub struct Quiz {
    questions: Vec<Question>,
    current: usize,
    user_answer: String,
    feedback: Option<Feedback>,
    phase: QuizPhase,
}

impl Quiz {
    /// Create an idle quiz
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw up to `count` questions from `section` using the thread RNG
    pub fn start(&mut self, count: usize, section: Option<&Section>) -> usize {
        self.start_with_rng(count, section, &mut rand::thread_rng())
    }

    /// Draw up to `count` questions with a caller-supplied RNG
    ///
    /// A missing section or an empty pool leaves the quiz `Idle`.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        section: Option<&Section>,
        rng: &mut R,
    ) -> usize {
        let mut pool: Vec<Question> = section
            .into_iter()
            .flat_map(Section::data_rows)
            .filter_map(Question::from_cells)
            .collect();
        pool.shuffle(rng);
        pool.truncate(count);

        self.questions = pool;
        self.current = 0;
        self.user_answer.clear();
        self.feedback = None;
        self.phase = if self.questions.is_empty() {
            QuizPhase::Idle
        } else {
            QuizPhase::Active
        };

        tracing::debug!(
            section = section.map(|s| s.id.as_str()),
            requested = count,
            drawn = self.questions.len(),
            "Quiz started"
        );
        self.questions.len()
    }

    /// The question on screen, if any
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase.has_question() {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    /// Update the live answer text (no re-render needed)
    pub fn set_answer(&mut self, text: impl Into<String>) {
        self.user_answer = text.into();
    }

    /// Compare the answer to the expected one (trimmed, case-insensitive, exact)
    pub fn check(&mut self) -> Option<&Feedback> {
        if !matches!(self.phase, QuizPhase::Active | QuizPhase::Answered) {
            return None;
        }
        let question = self.questions.get(self.current)?;
        let guess = self.user_answer.trim().to_lowercase();
        let feedback = if guess == question.answer.to_lowercase() {
            Feedback::correct()
        } else {
            Feedback::incorrect(&question.answer)
        };
        self.feedback = Some(feedback);
        self.phase = QuizPhase::Answered;
        self.feedback.as_ref()
    }

    /// Advance to the next question, or finish once the pool is exhausted
    pub fn next(&mut self) {
        match self.phase {
            QuizPhase::Idle | QuizPhase::Complete => {}
            QuizPhase::Active | QuizPhase::Answered => {
                if self.current + 1 < self.questions.len() {
                    self.current += 1;
                    self.user_answer.clear();
                    self.feedback = None;
                    self.phase = QuizPhase::Active;
                } else {
                    self.feedback = Some(Feedback::complete());
                    self.phase = QuizPhase::Complete;
                }
            }
        }
    }

    /// Expected answer of the question on screen (for speak-solution)
    #[must_use]
    pub fn solution(&self) -> Option<&str> {
        self.current_question().map(|q| q.answer.as_str())
    }

    /// `(1-based index, total)` of the question on screen
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current_question()
            .map(|_| (self.current + 1, self.questions.len()))
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// Current feedback
    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// Live answer text
    #[must_use]
    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    /// Drawn questions
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

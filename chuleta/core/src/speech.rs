//! Speech Capability
//!
//! Fire-and-forget pronunciation of terms. The core never waits for playback
//! to finish: every new utterance first cancels the current one, so at most
//! one utterance is ever active.
//!
//! # Components
//!
//! - [`SpeechEngine`]: the capability seam (`speak` + `cancel`)
//! - [`EspeakEngine`]: plays through an `espeak-ng` child process
//! - [`Speaker`]: voice selection and rate preferences, persisted in the store

use std::process::{Child, Command, Stdio};

use thiserror::Error;

use crate::store::SharedStore;

/// Store key of the playback rate multiplier
pub const RATE_KEY: &str = "chuleta:ttsRate";
/// Store key of the chosen voice id
pub const VOICE_KEY: &str = "chuleta:ttsVoiceURI";
/// Slowest allowed rate
pub const MIN_RATE: f32 = 0.6;
/// Fastest allowed rate
pub const MAX_RATE: f32 = 1.4;
/// Rate when nothing is stored
pub const DEFAULT_RATE: f32 = 1.0;
/// Rate slider step
pub const RATE_STEP: f32 = 0.05;
/// Language used when no voice is chosen
pub const DEFAULT_LANGUAGE: &str = "en-GB";

/// `espeak-ng` speed (words per minute) at rate 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Errors from the speech capability
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The platform cannot synthesize speech
    #[error("Speech synthesis is not supported: {0}")]
    Unsupported(String),

    /// Playback could not be started
    #[error("Failed to start speech playback: {0}")]
    Playback(#[source] std::io::Error),
}

/// An installed voice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    /// Identifier passed back to the engine
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// BCP-47-ish language tag (e.g. `en-gb`)
    pub language: String,
}

/// A single request to speak
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    /// Text to pronounce
    pub text: String,
    /// Chosen voice id, if any
    pub voice: Option<String>,
    /// Language to fall back on when no voice is chosen
    pub language: String,
    /// Rate multiplier in `[MIN_RATE, MAX_RATE]`
    pub rate: f32,
}

/// Text-to-speech capability
pub trait SpeechEngine {
    /// Installed voices (may be empty)
    fn voices(&self) -> Vec<Voice>;

    /// Start speaking; implementations cancel any current utterance first
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Stop the current utterance, if any
    fn cancel(&mut self);

    /// Release resources of an utterance that finished on its own
    fn poll(&mut self) {}
}

/// Speech through an `espeak-ng` (or compatible) child process
pub struct EspeakEngine {
    program: String,
    voices: Vec<Voice>,
    available: bool,
    child: Option<Child>,
}

impl EspeakEngine {
    /// Probe `program` for English voices
    ///
    /// A missing program yields an engine that reports every `speak` as
    /// unsupported instead of failing construction.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let probe = Command::new(&program)
            .arg("--voices=en")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        let (available, voices) = match probe {
            Ok(output) if output.status.success() => {
                (true, parse_voice_listing(&String::from_utf8_lossy(&output.stdout)))
            }
            Ok(output) => {
                tracing::warn!(program = %program, status = %output.status, "Speech probe failed");
                (true, Vec::new())
            }
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "Speech program unavailable");
                (false, Vec::new())
            }
        };
        tracing::info!(program = %program, available, voices = voices.len(), "Speech engine ready");
        Self {
            program,
            voices,
            available,
            child: None,
        }
    }

    fn words_per_minute(rate: f32) -> u32 {
        // rate is clamped to [MIN_RATE, MAX_RATE], so the product is small and positive
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let wpm = (BASE_WORDS_PER_MINUTE * rate.clamp(MIN_RATE, MAX_RATE)).round() as u32;
        wpm
    }
}

impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Unsupported(format!(
                "`{}` was not found",
                self.program
            )));
        }
        self.cancel();

        let voice = utterance
            .voice
            .clone()
            .unwrap_or_else(|| utterance.language.to_lowercase());
        let child = Command::new(&self.program)
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(Self::words_per_minute(utterance.rate).to_string())
            .arg("--")
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::Unsupported(format!("`{}` was not found", self.program))
                } else {
                    SpeechError::Playback(e)
                }
            })?;

        tracing::debug!(voice = %voice, text = %utterance.text, "Speaking");
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Already-exited children make kill fail; either way reap it.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn poll(&mut self) {
        let finished = match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(Some(status))) => {
                tracing::trace!(%status, "Utterance finished");
                true
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Lost track of speech process");
                true
            }
            Some(Ok(None)) | None => false,
        };
        if finished {
            self.child = None;
        }
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Parse `espeak-ng --voices` output
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  2  en-gb           --/M      English_(Great_Britain) gmw/en        (en 2)
/// ```
#[must_use]
pub fn parse_voice_listing(listing: &str) -> Vec<Voice> {
    let mut voices: Vec<Voice> = Vec::new();
    for line in listing.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [_, language, _, name, ..] = fields.as_slice() else {
            continue;
        };
        if voices.iter().any(|v| v.id == *language) {
            continue;
        }
        voices.push(Voice {
            id: (*language).to_string(),
            name: name.replace('_', " "),
            language: (*language).to_string(),
        });
    }
    voices
}

/// Pick the default voice: first `en-gb`, else `en-us`, else any English voice
#[must_use]
pub fn pick_default_voice(voices: &[Voice]) -> Option<&Voice> {
    let by_lang = |prefix: &str| {
        voices
            .iter()
            .find(|v| v.language.to_lowercase().starts_with(prefix))
    };
    by_lang("en-gb").or_else(|| by_lang("en-us")).or_else(|| by_lang("en"))
}

/// Voice and rate preferences in front of a [`SpeechEngine`]
pub struct Speaker {
    engine: Box<dyn SpeechEngine>,
    store: SharedStore,
    voices: Vec<Voice>,
    voice: Option<Voice>,
    rate: f32,
    fallback_language: String,
}

impl Speaker {
    /// Load preferences from the store and choose the initial voice
    pub fn new(engine: Box<dyn SpeechEngine>, store: SharedStore, fallback_language: &str) -> Self {
        let voices: Vec<Voice> = engine
            .voices()
            .into_iter()
            .filter(|v| v.language.to_lowercase().starts_with("en"))
            .collect();

        let (saved_rate, saved_voice) = {
            let store = store.borrow();
            (store.get(RATE_KEY), store.get(VOICE_KEY))
        };
        let rate = saved_rate
            .and_then(|raw| raw.trim().parse::<f32>().ok())
            .filter(|r| r.is_finite())
            .map_or(DEFAULT_RATE, |r| r.clamp(MIN_RATE, MAX_RATE));

        let voice = saved_voice
            .and_then(|id| voices.iter().find(|v| v.id == id))
            .or_else(|| pick_default_voice(&voices))
            .cloned();

        Self {
            engine,
            store,
            voices,
            voice,
            rate,
            fallback_language: fallback_language.to_string(),
        }
    }

    /// Speak with the configured fallback language
    pub fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        let hint = self.fallback_language.clone();
        self.speak_with_hint(text, &hint)
    }

    /// Speak `text`; blank text is ignored
    pub fn speak_with_hint(&mut self, text: &str, language_hint: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let utterance = Utterance {
            text: text.to_string(),
            voice: self.voice.as_ref().map(|v| v.id.clone()),
            language: language_hint.to_string(),
            rate: self.rate,
        };
        self.engine.speak(&utterance)
    }

    /// Stop the current utterance
    pub fn cancel(&mut self) {
        self.engine.cancel();
    }

    /// Reap a finished utterance
    pub fn poll(&mut self) {
        self.engine.poll();
    }

    /// Current rate multiplier
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set and persist the rate (clamped)
    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() {
            return;
        }
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
        self.persist(RATE_KEY, &format!("{:.2}", self.rate));
    }

    /// Nudge the rate by `delta`
    pub fn adjust_rate(&mut self, delta: f32) {
        self.set_rate(self.rate + delta);
    }

    /// Chosen voice
    #[must_use]
    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// English voices offered for selection
    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Choose a voice by id and persist it; returns whether it exists
    pub fn select_voice(&mut self, id: &str) -> bool {
        let Some(voice) = self.voices.iter().find(|v| v.id == id).cloned() else {
            return false;
        };
        self.persist(VOICE_KEY, &voice.id);
        self.voice = Some(voice);
        true
    }

    /// Choose the next voice in the list, wrapping around
    pub fn cycle_voice(&mut self) -> Option<&Voice> {
        if self.voices.is_empty() {
            return None;
        }
        let next = match &self.voice {
            Some(current) => self
                .voices
                .iter()
                .position(|v| v.id == current.id)
                .map_or(0, |idx| (idx + 1) % self.voices.len()),
            None => 0,
        };
        let id = self.voices[next].id.clone();
        self.select_voice(&id);
        self.voice.as_ref()
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.borrow_mut().set(key, value) {
            tracing::warn!(key, error = %e, "Failed to persist speech preference");
        }
    }
}

use std::thread;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::engine::filter::select_candidates;
use crate::engine::letter_unlock::KeySet;
use crate::engine::scoring;
use crate::engine::streak::{LevelState, StreakController, Transition};
use crate::error::{QuackError, Result};
use crate::event::{Notifier, TrainerEvent};
use crate::generator::TextGenerator;
use crate::generator::dictionary::{Dictionary, DictionarySource};
use crate::generator::lesson::LessonGenerator;
use crate::keyboard::catalogue::{KeyCatalogue, LayoutData};
use crate::keyboard::layout::KeyProvider;
use crate::scheduler::{Deferred, Scheduler};
use crate::session::drill::TypingSession;
use crate::session::input::{self, KeyOutcome};
use crate::session::result::SessionResult;
use crate::store::{DICTIONARY_KEY, GEOMETRY_KEY, PersistenceStore};

/// Where layouts and dictionaries come from.
pub struct Resources {
    pub layouts: Box<dyn KeyProvider>,
    pub dictionaries: Box<dyn DictionarySource>,
}

/// Owns all lesson state for one learner and drives it from keystrokes and
/// clock ticks. Nothing here renders; observers get `TrainerEvent`s.
pub struct Trainer {
    pub config: Config,
    resources: Resources,
    store: Box<dyn PersistenceStore>,
    notifier: Box<dyn Notifier>,
    layout_id: String,
    dictionary_id: String,
    geometry: String,
    catalogue: KeyCatalogue,
    dictionary: Dictionary,
    key_set: KeySet,
    streak: StreakController,
    candidates: Vec<String>,
    session: Option<TypingSession>,
    scheduler: Scheduler,
    generator: LessonGenerator,
}

impl Trainer {
    /// Load the configured layout and the last selected dictionary in
    /// parallel, restore progress for the layout and show the first lesson.
    /// A remembered dictionary that no longer loads falls back to the
    /// configured one.
    pub fn start(
        config: Config,
        resources: Resources,
        store: Box<dyn PersistenceStore>,
        notifier: Box<dyn Notifier>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let layout_id = config.layout.clone();
        let mut dictionary_id = remembered(store.as_ref(), DICTIONARY_KEY)
            .unwrap_or_else(|| config.dictionary.clone());
        let geometry =
            remembered(store.as_ref(), GEOMETRY_KEY).unwrap_or_else(|| config.geometry.clone());

        let loaded = load_resources(&resources, &layout_id, &dictionary_id);
        let (layout, dictionary) = match loaded {
            Err(QuackError::ResourceLoad {
                resource: "dictionary",
                reason,
                ..
            }) if dictionary_id != config.dictionary => {
                tracing::warn!(
                    dictionary = %dictionary_id,
                    reason = %reason,
                    "remembered dictionary unavailable, using configured one"
                );
                dictionary_id = config.dictionary.clone();
                load_resources(&resources, &layout_id, &dictionary_id)?
            }
            other => other?,
        };
        let catalogue = KeyCatalogue::from_layout(layout)?;

        let mut state = LevelState::load(store.as_ref(), &layout_id, config.starting_level);
        state.level = catalogue.clamp_level(state.level);
        let streak = StreakController::new(state, config.win_streak, catalogue.len());
        let state = streak.state();
        let key_set = KeySet::new(
            &catalogue,
            state.level,
            config.starting_level,
            config.include_new_letters,
        )?;

        let rng = seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64);
        let generator = LessonGenerator::new(rng, config.lesson_min_chars, config.sampling);

        tracing::info!(
            layout = %layout_id,
            dictionary = %dictionary_id,
            level = state.level,
            streak = state.streak,
            "trainer started"
        );

        let mut trainer = Self {
            config,
            resources,
            store,
            notifier,
            layout_id,
            dictionary_id,
            geometry,
            catalogue,
            dictionary,
            key_set,
            streak,
            candidates: Vec::new(),
            session: None,
            scheduler: Scheduler::default(),
            generator,
        };
        trainer.apply_level()?;
        Ok(trainer)
    }

    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    pub fn dictionary_id(&self) -> &str {
        &self.dictionary_id
    }

    pub fn geometry(&self) -> &str {
        &self.geometry
    }

    pub fn catalogue(&self) -> &KeyCatalogue {
        &self.catalogue
    }

    pub fn key_set(&self) -> &KeySet {
        &self.key_set
    }

    pub fn level_state(&self) -> LevelState {
        self.streak.state()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The lesson being typed, if one is showing.
    pub fn session(&self) -> Option<&TypingSession> {
        self.session.as_ref()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    pub fn handle_key(&mut self, value: char, now: Instant) -> KeyOutcome {
        let Some(session) = self.session.as_mut() else {
            return KeyOutcome::Ignored;
        };
        let position = session.cursor;
        let expected = session.lesson.tokens().get(position).map(|t| t.expected());

        let outcome = input::process_key(session, value, now);
        match &outcome {
            KeyOutcome::Rejected => {
                if let Some(expected) = expected {
                    self.notifier.notify(&TrainerEvent::KeyRejected {
                        position,
                        expected,
                        actual: value,
                    });
                }
            }
            KeyOutcome::Completed(result) => {
                self.session = None;
                self.finish_lesson(result.clone(), now);
            }
            KeyOutcome::Ignored | KeyOutcome::Accepted => {}
        }
        outcome
    }

    /// Run follow-up actions whose delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        for action in self.scheduler.take_due(now) {
            match action {
                Deferred::NextLesson => self.new_lesson(),
                Deferred::ApplyLevel => self.apply_level()?,
            }
        }
        Ok(())
    }

    /// Jump to a level picked by the learner. Out-of-range values are clamped
    /// and any pending follow-up from the previous lesson is dropped.
    pub fn set_level(&mut self, level: usize) -> Result<()> {
        self.cancel_pending("manual level change");
        self.streak.set_level(level);
        self.apply_level()
    }

    /// Back to the starting level with a fresh streak.
    pub fn reset(&mut self) -> Result<()> {
        self.cancel_pending("reset");
        self.streak.reset(self.config.starting_level);
        self.apply_level()
    }

    pub fn select_dictionary(&mut self, dictionary_id: &str) -> Result<()> {
        let dictionary = self.resources.dictionaries.load_dictionary(dictionary_id)?;
        self.dictionary = dictionary;
        self.dictionary_id = dictionary_id.to_string();
        self.persist(DICTIONARY_KEY, dictionary_id);
        self.cancel_pending("dictionary change");
        self.apply_level()
    }

    /// Switch layouts, restoring the progress saved for the new one.
    pub fn select_layout(&mut self, layout_id: &str) -> Result<()> {
        let layout = self.resources.layouts.load_layout(layout_id)?;
        let catalogue = KeyCatalogue::from_layout(layout)?;

        let mut state =
            LevelState::load(self.store.as_ref(), layout_id, self.config.starting_level);
        state.level = catalogue.clamp_level(state.level);
        self.streak = StreakController::new(state, self.config.win_streak, catalogue.len());
        self.catalogue = catalogue;
        self.layout_id = layout_id.to_string();
        self.cancel_pending("layout change");
        self.apply_level()
    }

    pub fn select_geometry(&mut self, geometry: &str) {
        self.geometry = geometry.to_string();
        self.persist(GEOMETRY_KEY, geometry);
    }

    fn cancel_pending(&mut self, reason: &str) {
        let dropped = self.scheduler.invalidate();
        if dropped > 0 {
            tracing::debug!(dropped, reason, "dropped pending follow-ups");
        }
    }

    fn apply_level(&mut self) -> Result<()> {
        self.save_level_state();
        let state = self.streak.state();
        self.key_set = KeySet::new(
            &self.catalogue,
            state.level,
            self.config.starting_level,
            self.config.include_new_letters,
        )?;
        self.candidates = select_candidates(
            &self.dictionary,
            &self.key_set,
            self.config.min_word_count,
        );
        tracing::debug!(
            level = state.level,
            candidates = self.candidates.len(),
            "key set rebuilt"
        );
        self.notifier.notify(&TrainerEvent::LevelChanged {
            level: state.level,
            streak: state.streak,
        });
        self.new_lesson();
        Ok(())
    }

    fn new_lesson(&mut self) {
        let lesson = self.generator.generate(&self.candidates);
        let level = self.streak.level();
        if lesson.is_empty() {
            self.session = None;
            self.notifier.notify(&TrainerEvent::NoCandidates { level });
            return;
        }
        let chars = lesson.len();
        self.session = Some(TypingSession::new(lesson));
        self.notifier
            .notify(&TrainerEvent::LessonReady { level, chars });
    }

    fn finish_lesson(&mut self, result: SessionResult, now: Instant) {
        let passed = scoring::passes(&result, &self.config.thresholds());
        let transition = self.streak.record(passed);
        // saved before the follow-up is scheduled
        self.save_level_state();

        self.notifier.notify(&TrainerEvent::LessonFinished {
            result,
            passed,
            streak: self.streak.streak(),
            transition,
        });

        let action = match transition {
            Transition::LevelUp { .. } => Deferred::ApplyLevel,
            Transition::LessonAdvance => Deferred::NextLesson,
        };
        self.scheduler
            .schedule(now, self.config.feedback_delay(), action);
    }

    fn save_level_state(&mut self) {
        if let Err(e) = self
            .streak
            .state()
            .save(self.store.as_mut(), &self.layout_id)
        {
            tracing::warn!(error = %e, "failed to save progress");
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "failed to save preference");
        }
    }
}

fn remembered(store: &dyn PersistenceStore, key: &str) -> Option<String> {
    store.get(key).filter(|value| !value.trim().is_empty())
}

/// Fetch a layout and a dictionary concurrently; the first lesson needs both.
fn load_resources(
    resources: &Resources,
    layout_id: &str,
    dictionary_id: &str,
) -> Result<(LayoutData, Dictionary)> {
    let layouts = resources.layouts.as_ref();
    let dictionaries = resources.dictionaries.as_ref();
    thread::scope(|scope| {
        let layout = scope.spawn(move || layouts.load_layout(layout_id));
        let dictionary = scope.spawn(move || dictionaries.load_dictionary(dictionary_id));

        let layout = layout
            .join()
            .map_err(|_| QuackError::layout(layout_id, "loader panicked"))??;
        let dictionary = dictionary
            .join()
            .map_err(|_| QuackError::dictionary(dictionary_id, "loader panicked"))??;
        Ok((layout, dictionary))
    })
}

//! Click-driven interactive segmentation.
//!
//! A [`ClickSession`] keeps the current prompts and re-runs the decoder each
//! time they change. At most one decoder run is in flight; a run requested
//! while another is still going is refused with [`SamError::Busy`] instead
//! of being queued. A run whose prompts changed while it was decoding
//! discards its result, so stale prompt states never overwrite newer masks.

use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use super::segmenter::{PromptDecoder, Segmentation};
use crate::core::errors::{SamError, SamResult};
use crate::domain::{BoxPrompt, Click, PromptSet};

/// Clears the running flag on every exit path.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Prompts plus a counter bumped on every change.
#[derive(Debug, Default)]
struct PromptState {
    prompts: PromptSet,
    generation: u64,
}

impl PromptState {
    fn update<R>(&mut self, f: impl FnOnce(&mut PromptSet) -> R) -> R {
        self.generation = self.generation.wrapping_add(1);
        f(&mut self.prompts)
    }
}

/// Interactive prompt state around a [`PromptDecoder`].
///
/// Lock order is `state` then `last`.
pub struct ClickSession<D> {
    decoder: D,
    state: Mutex<PromptState>,
    last: Mutex<Option<Segmentation>>,
    running: AtomicBool,
    refine: bool,
}

impl<D: PromptDecoder> ClickSession<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            state: Mutex::new(PromptState::default()),
            last: Mutex::new(None),
            running: AtomicBool::new(false),
            refine: false,
        }
    }

    /// Feeds the previous run's low-resolution logits back as mask input.
    pub fn with_refinement(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// True while a decoder run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Snapshot of the current prompts.
    pub fn prompts(&self) -> SamResult<PromptSet> {
        Ok(self.lock_state()?.prompts.clone())
    }

    /// The most recent segmentation, if any.
    pub fn last(&self) -> SamResult<Option<Segmentation>> {
        Ok(self.lock_last()?.clone())
    }

    /// Adds a click and re-runs the decoder.
    pub fn add_click(&self, click: Click) -> SamResult<Option<Segmentation>> {
        self.lock_state()?.update(|p| p.push(click));
        self.try_run()
    }

    /// Sets or replaces the box prompt and re-runs the decoder.
    pub fn set_box(&self, box_prompt: Option<BoxPrompt>) -> SamResult<Option<Segmentation>> {
        self.lock_state()?.update(|p| p.box_prompt = box_prompt);
        self.try_run()
    }

    /// Removes the last click and re-runs the decoder.
    pub fn undo(&self) -> SamResult<Option<Segmentation>> {
        let removed = self.lock_state()?.update(|p| p.pop());
        if removed.is_none() {
            debug!("nothing to undo");
        }
        self.try_run()
    }

    /// Drops every prompt and the last mask. A run still in flight will
    /// not store its result.
    pub fn clear(&self) -> SamResult<()> {
        let mut state = self.lock_state()?;
        state.update(PromptSet::clear);
        *self.lock_last()? = None;
        Ok(())
    }

    /// Runs the decoder on the current prompts.
    ///
    /// Returns `Ok(None)` (and forgets the last mask) when there are no
    /// prompts, and [`SamError::Busy`] when another run is in flight. If the
    /// prompts change while the decoder runs, the result is discarded and
    /// `Ok(None)` is returned.
    pub fn try_run(&self) -> SamResult<Option<Segmentation>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("decoder still running, skipping update");
            return Err(SamError::Busy);
        }
        let _guard = RunGuard(&self.running);

        let (prompts, generation) = {
            let state = self.lock_state()?;
            (state.prompts.clone(), state.generation)
        };
        if prompts.is_empty() {
            *self.lock_last()? = None;
            return Ok(None);
        }

        let previous = if self.refine {
            self.lock_last()?
                .as_ref()
                .and_then(|s| s.prediction.low_res_logits.clone())
        } else {
            None
        };

        let result = self
            .decoder
            .decode(&prompts, previous.as_ref().map(|p| p.view()))?;

        let state = self.lock_state()?;
        if state.generation != generation {
            debug!(
                started = generation,
                current = state.generation,
                "prompts changed during decode, discarding result"
            );
            return Ok(None);
        }
        *self.lock_last()? = result.clone();
        Ok(result)
    }

    fn lock_state(&self) -> SamResult<MutexGuard<'_, PromptState>> {
        self.state
            .lock()
            .map_err(|_| SamError::invalid_input("prompt state lock poisoned"))
    }

    fn lock_last(&self) -> SamResult<MutexGuard<'_, Option<Segmentation>>> {
        self.last
            .lock()
            .map_err(|_| SamError::invalid_input("segmentation state lock poisoned"))
    }
}

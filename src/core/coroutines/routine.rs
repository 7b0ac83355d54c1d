//=========================================================================
// Routines
//=========================================================================
//
// What a coroutine runs, and how it tells the scheduler when to come back.
//
// A routine is resumed once per satisfied wait. Each resume runs until the
// next suspension point and returns the `Yield` describing it, so a routine
// is a small state machine the scheduler drives one step at a time.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::fmt;

//=== Internal Dependencies ===============================================

use super::handle::CoroutineHandle;
use crate::core::context::FrameContext;

//=== Yield ===============================================================

/// Suspension instruction returned from every resume.
#[derive(Debug, Clone)]
pub enum Yield {
    /// Resume once this many seconds of frame time have passed.
    WaitSeconds(f32),

    /// Resume on the tick after the target completes or is stopped.
    WaitFor(CoroutineHandle),

    /// Resume on the next tick.
    NextFrame,

    /// The routine finished.
    Done,
}

//=== Routine Trait =======================================================

/// A resumable step sequence.
pub trait Routine {
    /// Runs up to the next suspension point.
    fn resume(&mut self, ctx: &mut FrameContext<'_>) -> Yield;
}

// Blanket implementation for closures
impl<F> Routine for F
where
    F: FnMut(&mut FrameContext<'_>) -> Yield,
{
    fn resume(&mut self, ctx: &mut FrameContext<'_>) -> Yield {
        self(ctx)
    }
}

//=== Steps ===============================================================

type Step = Box<dyn FnOnce(&mut FrameContext<'_>) -> Yield>;

/// Routine built from an ordered list of one-shot steps.
///
/// Each resume runs the next step; the routine is done once every step
/// has run.
///
/// ```rust
/// # use cadence_runtime::prelude::*;
/// let intro = Steps::new()
///     .then(|_ctx| Yield::WaitSeconds(1.5))
///     .then(|ctx| {
///         ctx.events.emit(CoreEvent::OrientationChanged);
///         Yield::NextFrame
///     });
/// assert_eq!(intro.remaining(), 2);
/// ```
#[derive(Default)]
pub struct Steps {
    steps: VecDeque<Step>,
}

impl Steps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn then<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&mut FrameContext<'_>) -> Yield + 'static,
    {
        self.steps.push_back(Box::new(step));
        self
    }

    /// Steps not yet run.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl Routine for Steps {
    fn resume(&mut self, ctx: &mut FrameContext<'_>) -> Yield {
        match self.steps.pop_front() {
            Some(step) => step(ctx),
            None => Yield::Done,
        }
    }
}

impl fmt::Debug for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Steps")
            .field("remaining", &self.steps.len())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

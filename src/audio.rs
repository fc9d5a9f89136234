//! Collision sound dispatch
//!
//! The simulation never plays audio itself; it hands a volume to whatever
//! `SoundSink` the host registered. Playback may block (channel probing,
//! device I/O), so real dispatch happens on the async compute pool and the
//! frame loop never waits on it. No free channel means no sound; nobody
//! cares about a dropped pop.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use rand::seq::SliceRandom;

/// Host-provided playback surface. `try_play` returns false when the
/// channel for that sound is busy; it must not block beyond a cheap probe.
pub trait SoundSink: Send + Sync {
    fn try_play(&self, sound: usize, volume: f32) -> bool;
}

/// Sink that accepts every request and plays nothing. Default for headless
/// runs.
pub struct NullSink;

impl SoundSink for NullSink {
    fn try_play(&self, sound: usize, volume: f32) -> bool {
        debug!("pop {} at volume {:.2}", sound, volume);
        true
    }
}

/// How a `CollisionAudio` hands requests to its sink
enum Dispatch {
    /// Fire-and-forget on the async compute pool
    Async,
    /// On the calling thread, for tests and simulation
    Direct,
}

/// Resource owning the sink and the pop-sound pool.
#[derive(Resource)]
pub struct CollisionAudio {
    sink: Arc<dyn SoundSink>,
    dispatch: Dispatch,
}

impl CollisionAudio {
    pub fn new(sink: Arc<dyn SoundSink>) -> Self {
        Self {
            sink,
            dispatch: Dispatch::Async,
        }
    }

    /// Dispatch on the calling thread instead of the task pool.
    pub fn direct(sink: Arc<dyn SoundSink>) -> Self {
        Self {
            sink,
            dispatch: Dispatch::Direct,
        }
    }

    /// Pick a pop sound in shuffled order and play the first whose channel
    /// is free. Returns the first-choice sound index, or None when nothing
    /// was requested.
    pub fn request_pop(&self, volume: f32, pool_size: usize) -> Option<usize> {
        if volume <= 0.0 || pool_size == 0 {
            return None;
        }
        let mut order: Vec<usize> = (0..pool_size).collect();
        order.shuffle(&mut rand::thread_rng());
        let chosen = order[0];

        let sink = self.sink.clone();
        match self.dispatch {
            Dispatch::Async => {
                AsyncComputeTaskPool::get()
                    .spawn(async move {
                        play_first_free(&*sink, &order, volume);
                    })
                    .detach();
            }
            Dispatch::Direct => play_first_free(&*sink, &order, volume),
        }
        Some(chosen)
    }
}

impl Default for CollisionAudio {
    fn default() -> Self {
        Self::new(Arc::new(NullSink))
    }
}

fn play_first_free(sink: &dyn SoundSink, order: &[usize], volume: f32) {
    for &sound in order {
        if sink.try_play(sound, volume) {
            return;
        }
    }
    // Every channel busy: drop the request.
}

/// Test sink recording accepted plays, with optionally busy channels.
#[cfg(test)]
pub struct RecordingSink {
    pub busy_below: usize,
    pub plays: AtomicUsize,
}

#[cfg(test)]
impl SoundSink for RecordingSink {
    fn try_play(&self, sound: usize, _volume: f32) -> bool {
        if sound < self.busy_below {
            return false;
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        true
    }
}

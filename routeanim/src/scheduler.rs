/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! the timer driven animation scheduler that walks a marker along an [`InterpolatedPath`].
//!
//! Phases and transitions:
//! ```text
//!   Idle --start--> Running --pause--> Paused --start--> Running --(last point)--> Completed
//!   reset: any -> Idle      load: any -> Idle (new path)      stop: Running|Paused -> Completed
//! ```
//! Operations invoked in a phase that does not allow them fail with [`crate::errors::RouteAnimError::InvalidState`]
//! and do not change anything.
//!
//! Each run is driven by a single tokio task. The scheduler keeps its [`AbortHandle`] together with an epoch
//! counter that is incremented by every cancelling transition, i.e. a task that is already past its
//! await point when it gets cancelled still can't emit ticks for a superseded run.
//!
//! Callbacks are invoked outside of the state lock, hence they can call back into the scheduler (through a
//! cloned handle). Each tick advances the cursor by exactly one point - speed is only controlled by the
//! tick period, we never skip points.

use std::{collections::VecDeque, fmt, sync::{Arc, Weak, Mutex, MutexGuard, PoisonError}, time::Duration};
use serde::{Serialize,Deserialize};
use tokio::{runtime::Handle, task::AbortHandle, time};
use tracing::{debug, info, trace};

use routeanim_common::geo::GeoPoint;
use crate::config::AnimatorConfig;
use crate::errors::{Result, invalid_state, poisoned_lock};
use crate::interpolate::InterpolatedPath;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Completed
}

/// what we pass to tick callbacks
#[derive(Debug,Clone,Copy,PartialEq,Serialize)]
pub struct TickEvent {
    pub point: GeoPoint,
    pub index: usize,
    pub total: usize,

    /// should the view re-center on the marker (every `follow_interval` points)
    pub follow: bool,
}

impl TickEvent {
    pub fn is_last (&self)->bool { self.index + 1 == self.total }

    pub fn progress_percent (&self)->u32 {
        if self.is_last() { 100 } else { ((self.index * 100) as f64 / self.total as f64).round() as u32 }
    }
}

pub type TickCallback = Box<dyn FnMut(&TickEvent) + Send + 'static>;
pub type CompletionCallback = Box<dyn FnMut() + Send + 'static>;
pub type PhaseCallback = Box<dyn FnMut(Phase) + Send + 'static>;

#[derive(Default)]
struct Callbacks {
    on_tick: Option<TickCallback>,
    on_complete: Option<CompletionCallback>,
    on_phase_change: Option<PhaseCallback>,

    pending_phases: VecDeque<Phase>,
    delivering_phases: bool,
}

fn tick_slot (cbs: &mut Callbacks)->&mut Option<TickCallback> { &mut cbs.on_tick }
fn complete_slot (cbs: &mut Callbacks)->&mut Option<CompletionCallback> { &mut cbs.on_complete }

struct AnimationState {
    path: Option<Arc<InterpolatedPath>>,
    position_index: usize, // index of the next point to emit, 0 <= position_index <= path.len()
    phase: Phase,
    tick_period: Duration,
    epoch: u64,
    timer: Option<AbortHandle>,
}

impl AnimationState {
    fn cancel_timer (&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared {
    id: Arc<String>,
    config: AnimatorConfig,
    state: Mutex<AnimationState>,
    callbacks: Mutex<Callbacks>,
}

impl Shared {
    /// called from the timer task. Returns the delay until the next tick or None if this run is over
    fn tick (&self, epoch: u64)->Option<Duration> {
        let (event, completed) = {
            let mut state = self.state.lock().ok()?;
            if state.epoch != epoch || state.phase != Phase::Running { return None }

            let path = state.path.clone()?;
            let index = state.position_index;
            let point = *path.get(index)?;
            let total = path.len();

            state.position_index = index + 1;
            let completed = state.position_index >= total;
            if completed {
                state.phase = Phase::Completed;
                state.timer = None; // that is us, we are about to finish
            }

            let follow = self.config.follow_interval > 0 && index % self.config.follow_interval == 0;
            ( TickEvent { point, index, total, follow }, completed )
        };

        trace!("{} tick {}/{} at {}", self.id, event.index, event.total, event.point);
        self.invoke( tick_slot, |cb| (*cb)(&event));

        if completed {
            // the tick callback might have superseded this run (reset, load or restart)
            let arrived = self.state.lock().map( |s| s.epoch == epoch && s.phase == Phase::Completed).unwrap_or(false);
            if arrived {
                info!("{} completed after {} points", self.id, event.total);
                self.notify_phase( Phase::Completed);
                self.invoke( complete_slot, |cb| (*cb)());
            } else {
                debug!("{} run was superseded on its last tick", self.id);
            }
            None

        } else {
            // sampled after the callbacks so that a period change from within on_tick already applies to the next tick
            let state = self.state.lock().ok()?;
            if state.epoch == epoch && state.phase == Phase::Running { Some(state.tick_period) } else { None }
        }
    }

    fn lock_callbacks (&self)->MutexGuard<'_,Callbacks> {
        self.callbacks.lock().unwrap_or_else( PoisonError::into_inner)
    }

    /// run a callback without holding the callbacks lock. A callback that was registered while the old one
    /// was executing replaces the old one
    fn invoke<C> (&self, slot: fn(&mut Callbacks)->&mut Option<C>, f: impl FnOnce(&mut C)) {
        let taken = slot( &mut self.lock_callbacks()).take();

        if let Some(mut cb) = taken {
            f(&mut cb);

            let mut cbs = self.lock_callbacks();
            let s = slot(&mut cbs);
            if s.is_none() { *s = Some(cb) }
        }
    }

    /// phase changes that happen while a phase callback executes (e.g. a handler that calls `reset()`) are
    /// queued and delivered in order after that callback returns
    fn notify_phase (&self, phase: Phase) {
        {
            let mut cbs = self.lock_callbacks();
            cbs.pending_phases.push_back( phase);
            if cbs.delivering_phases { return } // picked up by the delivery loop below
            cbs.delivering_phases = true;
        }

        loop {
            let (next, taken) = {
                let mut cbs = self.lock_callbacks();
                match cbs.pending_phases.pop_front() {
                    Some(next) => (next, cbs.on_phase_change.take()),
                    None => {
                        cbs.delivering_phases = false;
                        return
                    }
                }
            };

            if let Some(mut cb) = taken {
                cb(next);

                let mut cbs = self.lock_callbacks();
                if cbs.on_phase_change.is_none() { cbs.on_phase_change = Some(cb) }
            }
        }
    }

    fn phase_changed (&self, prev: Phase, next: Phase) {
        if prev != next {
            self.notify_phase( next);
        }
    }
}

impl Drop for Shared {
    fn drop (&mut self) {
        let state = self.state.get_mut().unwrap_or_else( PoisonError::into_inner);
        state.cancel_timer();
    }
}

async fn run_ticks (weak_shared: Weak<Shared>, epoch: u64, first_delay: Option<Duration>) {
    let mut delay = first_delay;
    loop {
        if let Some(dt) = delay {
            time::sleep(dt).await;
        }

        let Some(shared) = weak_shared.upgrade() else { break }; // scheduler is gone
        match shared.tick( epoch) {
            Some(dt) => delay = Some(dt),
            None => break
        }
    }
}

/// the animation scheduler handle. Clones refer to the same animation, which is how callbacks can
/// control the scheduler that invokes them.
/// Starting requires a tokio runtime. Within a single threaded runtime (the normal case for a UI shell)
/// callbacks are never delivered for ticks of a run that was already cancelled
#[derive(Clone)]
pub struct AnimationScheduler {
    shared: Arc<Shared>
}

impl AnimationScheduler {
    pub fn new (id: impl ToString, config: AnimatorConfig)->Self {
        let state = AnimationState {
            path: None,
            position_index: 0,
            phase: Phase::Idle,
            tick_period: config.clamp_period( config.tick_period),
            epoch: 0,
            timer: None,
        };

        let shared = Shared {
            id: Arc::new( id.to_string()),
            config,
            state: Mutex::new( state),
            callbacks: Mutex::new( Callbacks::default()),
        };

        AnimationScheduler { shared: Arc::new( shared) }
    }

    pub fn id (&self)->&str { self.shared.id.as_str() }

    pub fn config (&self)->&AnimatorConfig { &self.shared.config }

    fn lock_state (&self)->Result<MutexGuard<'_,AnimationState>> {
        self.shared.state.lock().map_err( |_| poisoned_lock( self.shared.id.as_str()))
    }

    // queries never fail - state is only modified in small, non-panicking critical sections
    fn read_state (&self)->MutexGuard<'_,AnimationState> {
        self.shared.state.lock().unwrap_or_else( PoisonError::into_inner)
    }

    //--- callback registration (replaces previous registrations)

    pub fn on_tick (&self, f: impl FnMut(&TickEvent) + Send + 'static) {
        self.shared.lock_callbacks().on_tick = Some( Box::new(f));
    }

    /// only invoked when the end of the path is reached, not for runs that are stopped, reset or replaced
    pub fn on_complete (&self, f: impl FnMut() + Send + 'static) {
        self.shared.lock_callbacks().on_complete = Some( Box::new(f));
    }

    /// handlers may call back into the scheduler. Resulting phase changes are reported after the handler returns
    pub fn on_phase_change (&self, f: impl FnMut(Phase) + Send + 'static) {
        self.shared.lock_callbacks().on_phase_change = Some( Box::new(f));
    }

    //--- operations

    /// replace the current path. Cancels any running animation and resets to `Idle`
    pub fn load (&self, path: InterpolatedPath)->Result<()> {
        let prev = {
            let mut state = self.lock_state()?;
            state.cancel_timer();
            debug!("{} loading path with {} points", self.shared.id, path.len());

            let prev = state.phase;
            state.path = Some( Arc::new( path));
            state.position_index = 0;
            state.phase = Phase::Idle;
            prev
        };

        self.shared.phase_changed( prev, Phase::Idle);
        Ok(())
    }

    /// load an explicitly supplied point sequence, which has to be non-empty
    pub fn load_points (&self, points: Vec<GeoPoint>)->Result<()> {
        self.load( InterpolatedPath::new( points)?)
    }

    /// start from `Idle` (emitting the first point right away) or resume from `Paused` (emitting the next
    /// point after one period, or right away if nothing was emitted yet). Periods below the configured
    /// floor are clamped
    pub fn start (&self, period: Duration)->Result<()> {
        let rt = Handle::try_current()?;

        let prev = {
            let mut state = self.lock_state()?;
            let prev = state.phase;
            match prev {
                Phase::Idle | Phase::Paused => {
                    if state.path.is_none() { return Err( invalid_state( "start", prev)) } // nothing loaded yet
                }
                Phase::Running | Phase::Completed => return Err( invalid_state( "start", prev))
            }

            state.cancel_timer();
            state.tick_period = self.shared.config.clamp_period( period);
            state.phase = Phase::Running;

            // nothing shown yet means the first point goes out right away, also when resuming
            let first_delay = if state.position_index == 0 { None } else { Some(state.tick_period) };
            let task = rt.spawn( run_ticks( Arc::downgrade(&self.shared), state.epoch, first_delay));
            state.timer = Some( task.abort_handle());

            info!("{} {} at index {} with period {:?}", self.shared.id,
                  if prev == Phase::Idle {"started"} else {"resumed"}, state.position_index, state.tick_period);
            prev
        };

        self.shared.phase_changed( prev, Phase::Running);
        Ok(())
    }

    /// stop ticking but keep the position so that a subsequent `start` continues with the next point
    pub fn pause (&self)->Result<()> {
        {
            let mut state = self.lock_state()?;
            if state.phase != Phase::Running { return Err( invalid_state( "pause", state.phase)) }

            state.cancel_timer();
            state.phase = Phase::Paused;
            info!("{} paused at index {}", self.shared.id, state.position_index);
        }

        self.shared.phase_changed( Phase::Running, Phase::Paused);
        Ok(())
    }

    /// set the tick period for subsequent ticks. An already pending tick is not rescheduled, the new
    /// period applies to the delay after it. Returns the effective (clamped) period
    pub fn set_period (&self, period: Duration)->Result<Duration> {
        let mut state = self.lock_state()?;
        state.tick_period = self.shared.config.clamp_period( period);
        debug!("{} tick period set to {:?}", self.shared.id, state.tick_period);
        Ok( state.tick_period)
    }

    /// cancel and rewind to the first point. This does not emit a tick
    pub fn reset (&self)->Result<()> {
        let prev = {
            let mut state = self.lock_state()?;
            state.cancel_timer();

            let prev = state.phase;
            state.position_index = 0;
            state.phase = Phase::Idle;
            info!("{} reset", self.shared.id);
            prev
        };

        self.shared.phase_changed( prev, Phase::Idle);
        Ok(())
    }

    /// terminate a running or paused animation early. This does not invoke the completion callback, which
    /// only signals that the end of the path was reached
    pub fn stop (&self)->Result<()> {
        let prev = {
            let mut state = self.lock_state()?;
            let prev = state.phase;
            if !matches!( prev, Phase::Running | Phase::Paused) { return Err( invalid_state( "stop", prev)) }

            state.cancel_timer();
            state.phase = Phase::Completed;
            info!("{} stopped at index {}", self.shared.id, state.position_index);
            prev
        };

        self.shared.phase_changed( prev, Phase::Completed);
        Ok(())
    }

    //--- queries

    pub fn phase (&self)->Phase { self.read_state().phase }

    pub fn is_running (&self)->bool { self.phase() == Phase::Running }

    pub fn position_index (&self)->usize { self.read_state().position_index }

    pub fn tick_period (&self)->Duration { self.read_state().tick_period }

    pub fn path (&self)->Option<Arc<InterpolatedPath>> { self.read_state().path.clone() }

    pub fn path_len (&self)->usize { self.read_state().path.as_ref().map( |p| p.len()).unwrap_or(0) }

    /// where the marker is: the last emitted point, or the start of the path if nothing was emitted yet
    pub fn current_point (&self)->Option<GeoPoint> {
        let state = self.read_state();
        let path = state.path.as_ref()?;
        path.get( state.position_index.saturating_sub(1)).copied()
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        let state = self.read_state();
        f.debug_struct("AnimationScheduler")
            .field("id", &self.shared.id)
            .field("phase", &state.phase)
            .field("position_index", &state.position_index)
            .field("tick_period", &state.tick_period)
            .finish()
    }
}

//! Debounced analysis trigger.
//!
//! [`AnalysisTrigger`] coalesces bursts of "tokens changed" signals into one trailing-edge fire.
//! It is a two-state machine (`Idle`, `Waiting`) over a [`Scheduler`] that hands out one-shot
//! timers:
//!
//! - a signal while `Idle` arms a timer for the quiet period and moves to `Waiting`;
//! - a signal while `Waiting` only records the time;
//! - when the timer fires, the trigger either re-arms for the rest of the quiet period (a signal
//!   arrived in the meantime) or reports [`TimerOutcome::Fire`] and goes back to `Idle`.
//!
//! Timers run on whatever clock the scheduler provides. Fired timer ids are collected on the
//! mutation thread with [`Scheduler::take_fired`]; ids of replaced or cancelled arms are ignored.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Handle of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Source of time and one-shot timers.
pub trait Scheduler {
    /// Current time on the scheduler's clock.
    fn now(&self) -> Instant;

    /// Arm a timer that fires after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Disarm a pending timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);

    /// Drain the timers that fired since the last call, in firing order.
    fn take_fired(&mut self) -> Vec<TimerId>;
}

/// Errors raised while setting up a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to spawn timer thread: {0}")]
    /// The background timer thread could not be started.
    Spawn(#[from] io::Error),
}

/// Result of feeding a fired timer to [`AnalysisTrigger::on_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The quiet period elapsed: run the analysis now.
    Fire,
    /// A signal arrived during the wait; a new timer was armed for the remaining delay.
    Rearmed(Duration),
    /// The id does not belong to the current arm.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerState {
    Idle,
    Waiting { timer: TimerId },
}

/// Trailing-edge debouncer.
#[derive(Debug, Clone)]
pub struct AnalysisTrigger {
    quiet_period: Duration,
    state: TriggerState,
    last_signal: Option<Instant>,
}

impl AnalysisTrigger {
    /// Create an idle trigger.
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            state: TriggerState::Idle,
            last_signal: None,
        }
    }

    /// The configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Whether a fire is pending.
    pub fn is_waiting(&self) -> bool {
        matches!(self.state, TriggerState::Waiting { .. })
    }

    /// Record a "tokens changed" signal.
    pub fn signal<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.last_signal = Some(scheduler.now());
        if self.state == TriggerState::Idle {
            let timer = scheduler.schedule(self.quiet_period);
            self.state = TriggerState::Waiting { timer };
            debug!(?timer, quiet_period = ?self.quiet_period, "analysis trigger armed");
        }
    }

    /// Handle a fired timer.
    pub fn on_timer<S: Scheduler + ?Sized>(
        &mut self,
        id: TimerId,
        scheduler: &mut S,
    ) -> TimerOutcome {
        let TriggerState::Waiting { timer } = self.state else {
            debug!(?id, "stale timer ignored");
            return TimerOutcome::Ignored;
        };
        if timer != id {
            debug!(?id, current = ?timer, "stale timer ignored");
            return TimerOutcome::Ignored;
        }

        let now = scheduler.now();
        let elapsed = self
            .last_signal
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(self.quiet_period);

        if elapsed < self.quiet_period {
            let remaining = self.quiet_period - elapsed;
            let timer = scheduler.schedule(remaining);
            self.state = TriggerState::Waiting { timer };
            debug!(?timer, ?remaining, "analysis trigger re-armed");
            TimerOutcome::Rearmed(remaining)
        } else {
            self.state = TriggerState::Idle;
            debug!("analysis trigger fired");
            TimerOutcome::Fire
        }
    }

    /// Drop a pending fire, if any.
    pub fn cancel<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let TriggerState::Waiting { timer } = self.state {
            scheduler.cancel(timer);
            self.state = TriggerState::Idle;
            debug!(?timer, "analysis trigger cancelled");
        }
    }
}

// ---- manual clock ----------------------------------------------------------------------------

/// Scheduler on a virtual clock that only moves when told to.
///
/// Used by tests and by hosts that drive time from their own event loop.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    origin: Instant,
    elapsed: Duration,
    next_id: u64,
    /// `(due, id)` of armed timers.
    pending: Vec<(Duration, TimerId)>,
    fired: Vec<TimerId>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
            fired: Vec::new(),
        }
    }

    /// Virtual time since creation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of armed timers.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward by `delta`, firing every timer that comes due.
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
        let now = self.elapsed;

        let mut due: Vec<(Duration, TimerId)> = Vec::new();
        self.pending.retain(|&(deadline, id)| {
            if deadline <= now {
                due.push((deadline, id));
                false
            } else {
                true
            }
        });
        due.sort();
        self.fired.extend(due.into_iter().map(|(_, id)| id));
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((self.elapsed + delay, id));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|&(_, pending)| pending != id);
    }

    fn take_fired(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.fired)
    }
}

// ---- background thread -----------------------------------------------------------------------

#[derive(Debug)]
enum TimerCommand {
    Schedule { id: TimerId, deadline: Instant },
    Cancel(TimerId),
    Shutdown,
}

/// Scheduler backed by one background thread holding a deadline heap.
///
/// The thread never touches document state: it only sends fired ids back over a channel. The
/// mutation thread picks them up with [`Scheduler::take_fired`] or [`ThreadScheduler::wait_fired`].
#[derive(Debug)]
pub struct ThreadScheduler {
    next_id: u64,
    commands: mpsc::Sender<TimerCommand>,
    fired: mpsc::Receiver<TimerId>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadScheduler {
    /// Start the timer thread.
    pub fn new() -> Result<Self, SchedulerError> {
        let (tx_commands, rx_commands) = mpsc::channel::<TimerCommand>();
        let (tx_fired, rx_fired) = mpsc::channel::<TimerId>();

        let worker = thread::Builder::new()
            .name("doc-engine-timer".to_string())
            .spawn(move || timer_loop(rx_commands, tx_fired))?;

        Ok(Self {
            next_id: 0,
            commands: tx_commands,
            fired: rx_fired,
            worker: Some(worker),
        })
    }

    /// Block until at least one timer fires or `timeout` elapses, then drain every fired id.
    pub fn wait_fired(&mut self, timeout: Duration) -> Vec<TimerId> {
        let Ok(first) = self.fired.recv_timeout(timeout) else {
            return Vec::new();
        };
        let mut fired = vec![first];
        fired.extend(self.fired.try_iter());
        fired
    }

    fn send(&self, command: TimerCommand) {
        if self.commands.send(command).is_err() {
            warn!("timer thread stopped; command dropped");
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.send(TimerCommand::Schedule {
            id,
            deadline: Instant::now() + delay,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.send(TimerCommand::Cancel(id));
    }

    fn take_fired(&mut self) -> Vec<TimerId> {
        self.fired.try_iter().collect()
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        let _ = self.commands.send(TimerCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn timer_loop(commands: mpsc::Receiver<TimerCommand>, fired: mpsc::Sender<TimerId>) {
    let mut heap: BinaryHeap<Reverse<(Instant, TimerId)>> = BinaryHeap::new();

    loop {
        let received = match heap.peek() {
            Some(&Reverse((deadline, id))) => {
                let now = Instant::now();
                if deadline <= now {
                    heap.pop();
                    if fired.send(id).is_err() {
                        return;
                    }
                    continue;
                }
                commands.recv_timeout(deadline - now)
            }
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(TimerCommand::Schedule { id, deadline }) => heap.push(Reverse((deadline, id))),
            Ok(TimerCommand::Cancel(id)) => heap.retain(|&Reverse((_, pending))| pending != id),
            Ok(TimerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Deliver fired timers to the trigger; returns how many fires happened.
    fn pump(trigger: &mut AnalysisTrigger, scheduler: &mut ManualScheduler) -> usize {
        let mut fires = 0;
        for id in scheduler.take_fired() {
            if trigger.on_timer(id, scheduler) == TimerOutcome::Fire {
                fires += 1;
            }
        }
        fires
    }

    #[test]
    fn test_single_signal_fires_after_quiet_period() {
        let mut scheduler = ManualScheduler::new();
        let mut trigger = AnalysisTrigger::new(QUIET);

        trigger.signal(&mut scheduler);
        assert!(trigger.is_waiting());

        scheduler.advance(ms(299));
        assert_eq!(pump(&mut trigger, &mut scheduler), 0);

        scheduler.advance(ms(1));
        assert_eq!(pump(&mut trigger, &mut scheduler), 1);
        assert!(!trigger.is_waiting());
    }

    #[test]
    fn test_signals_while_waiting_do_not_arm_twice() {
        let mut scheduler = ManualScheduler::new();
        let mut trigger = AnalysisTrigger::new(QUIET);

        trigger.signal(&mut scheduler);
        trigger.signal(&mut scheduler);
        trigger.signal(&mut scheduler);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_burst_rearms_for_remaining_delay() {
        let mut scheduler = ManualScheduler::new();
        let mut trigger = AnalysisTrigger::new(QUIET);

        trigger.signal(&mut scheduler);
        scheduler.advance(ms(100));
        trigger.signal(&mut scheduler);

        scheduler.advance(ms(200));
        let fired = scheduler.take_fired();
        assert_eq!(fired.len(), 1);
        assert_eq!(
            trigger.on_timer(fired[0], &mut scheduler),
            TimerOutcome::Rearmed(ms(100))
        );

        scheduler.advance(ms(99));
        assert_eq!(pump(&mut trigger, &mut scheduler), 0);
        scheduler.advance(ms(1));
        assert_eq!(pump(&mut trigger, &mut scheduler), 1);
        assert_eq!(scheduler.elapsed(), ms(400));
    }

    #[test]
    fn test_stale_and_cancelled_timers_are_ignored() {
        let mut scheduler = ManualScheduler::new();
        let mut trigger = AnalysisTrigger::new(QUIET);

        trigger.signal(&mut scheduler);
        let stale = TimerId(42);
        assert_eq!(trigger.on_timer(stale, &mut scheduler), TimerOutcome::Ignored);

        trigger.cancel(&mut scheduler);
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(QUIET);
        assert_eq!(pump(&mut trigger, &mut scheduler), 0);
    }

    #[test]
    fn test_thread_scheduler_delivers_fires() {
        let mut scheduler = ThreadScheduler::new().unwrap();
        let kept = scheduler.schedule(ms(50));
        let dropped = scheduler.schedule(ms(100));
        scheduler.cancel(dropped);

        let mut fired = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while fired.is_empty() && Instant::now() < deadline {
            fired.extend(scheduler.wait_fired(ms(50)));
        }
        assert_eq!(fired, vec![kept]);
        assert!(scheduler.wait_fired(ms(150)).is_empty());
    }
}

//! Playback pacing.
//!
//! The timer runs as a task on the Iced executor. The GUI drives it
//! through a [`TimerHandle`] and hears back through [`Event`]s; no state
//! is shared between the two sides.

use crate::decoder::check_framerate;
use crate::Error;
use iced::futures::{SinkExt, Stream};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Why the timer stopped ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user paused playback.
    Paused,
    /// The stream ran out of frames.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(Duration),
    Stop(StopReason),
}

#[derive(Debug, Clone)]
pub enum Event {
    /// The timer task is running and accepts commands through the handle.
    Ready(TimerHandle),
    /// Advance one frame.
    Tick,
    Stopped(StopReason),
}

/// Sending side of the timer's command channel.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl TimerHandle {
    /// Starts ticking at `framerate` ticks per second.
    pub fn start(&self, framerate: f64) -> Result<(), Error> {
        let framerate = check_framerate(framerate)?;
        self.send(Command::Start(Duration::from_secs_f64(1.0 / framerate)));
        Ok(())
    }

    pub fn stop(&self, reason: StopReason) {
        self.send(Command::Stop(reason));
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::warn!("playback timer is gone, dropping {command:?}");
        }
    }
}

/// Creates a handle and the command stream a [`Ticker`] consumes.
pub fn channel() -> (TimerHandle, mpsc::UnboundedReceiver<Command>) {
    let (commands, receiver) = mpsc::unbounded_channel();
    (TimerHandle { commands }, receiver)
}

/// Turns timer commands into timer events.
pub struct Ticker {
    commands: mpsc::UnboundedReceiver<Command>,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(commands: mpsc::UnboundedReceiver<Command>) -> Self {
        Ticker {
            commands,
            interval: None,
        }
    }

    /// Waits for the next event. Returns `None` once every handle is dropped.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            let command = match self.interval.as_mut() {
                Some(interval) => tokio::select! {
                    _ = interval.tick() => return Some(Event::Tick),
                    command = self.commands.recv() => command,
                },
                None => self.commands.recv().await,
            };

            match command? {
                Command::Start(period) => {
                    let mut interval = time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.interval = Some(interval);
                }
                Command::Stop(reason) => {
                    // stopping an idle timer is a no-op so the reason is reported once
                    if self.interval.take().is_some() {
                        return Some(Event::Stopped(reason));
                    }
                }
            }
        }
    }
}

/// Runs a playback timer for as long as the subscription is alive.
pub fn subscription() -> iced::Subscription<Event> {
    iced::Subscription::run(worker)
}

fn worker() -> impl Stream<Item = Event> {
    iced::stream::channel(16, |mut output| async move {
        let (handle, commands) = channel();
        if output.send(Event::Ready(handle)).await.is_err() {
            return;
        }

        let mut ticker = Ticker::new(commands);
        while let Some(event) = ticker.next().await {
            if output.send(event).await.is_err() {
                break;
            }
        }
        log::debug!("playback timer stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(elapsed: Duration, expected: Duration) {
        assert!(
            elapsed >= expected && elapsed <= expected + Duration::from_millis(1),
            "{elapsed:?} vs {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_frame_interval() {
        let (handle, commands) = channel();
        let mut ticker = Ticker::new(commands);

        handle.start(25.0).unwrap();
        let started = Instant::now();
        for n in 1..=5u32 {
            assert!(matches!(ticker.next().await, Some(Event::Tick)));
            assert_close(started.elapsed(), Duration::from_millis(40) * n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_pending_wait() {
        let (handle, commands) = channel();
        let mut ticker = Ticker::new(commands);

        handle.start(1.0).unwrap();
        handle.stop(StopReason::Paused);
        let started = Instant::now();
        assert!(matches!(
            ticker.next().await,
            Some(Event::Stopped(StopReason::Paused))
        ));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(ticker.interval.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_is_reported_once() {
        let (handle, commands) = channel();
        let mut ticker = Ticker::new(commands);

        handle.start(30.0).unwrap();
        assert!(matches!(ticker.next().await, Some(Event::Tick)));
        handle.stop(StopReason::Finished);
        handle.stop(StopReason::Finished);
        assert!(matches!(
            ticker.next().await,
            Some(Event::Stopped(StopReason::Finished))
        ));

        drop(handle);
        assert!(ticker.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_changes_interval() {
        let (handle, commands) = channel();
        let mut ticker = Ticker::new(commands);

        handle.start(10.0).unwrap();
        handle.start(50.0).unwrap();
        let started = Instant::now();
        assert!(matches!(ticker.next().await, Some(Event::Tick)));
        assert_close(started.elapsed(), Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn missed_ticks_are_delayed() {
        let (handle, commands) = channel();
        let mut ticker = Ticker::new(commands);

        handle.start(10.0).unwrap();
        assert!(matches!(ticker.next().await, Some(Event::Tick)));

        // the GUI stalls for three and a half frames
        time::advance(Duration::from_millis(350)).await;
        let resumed = Instant::now();
        assert!(matches!(ticker.next().await, Some(Event::Tick)));
        assert_close(resumed.elapsed(), Duration::ZERO);

        assert!(matches!(ticker.next().await, Some(Event::Tick)));
        assert_close(resumed.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn refuses_zero_framerate() {
        let (handle, mut commands) = channel();
        assert!(matches!(handle.start(0.0), Err(Error::Framerate(_))));
        assert!(commands.try_recv().is_err());
    }
}

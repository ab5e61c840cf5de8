use std::time::Duration;

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle, time::sleep};

use super::events::Event;

/// Cancel-and-reschedule timer: at most one pending timer exists, and only
/// the latest generation is honoured when it fires.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn schedule(&mut self, events: &UnboundedSender<Event>) {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let delay = self.delay;
        let events = events.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(Event::DebounceElapsed { generation });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Consumes the elapsed timer; false for superseded or cancelled ones.
    pub fn fire(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.pending.is_some() {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{sync::mpsc, time::Instant};

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_pending_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        let start = Instant::now();

        debouncer.schedule(&tx);
        sleep(Duration::from_millis(1_500)).await;
        debouncer.schedule(&tx);
        sleep(Duration::from_millis(1_500)).await;
        debouncer.schedule(&tx);

        let Some(Event::DebounceElapsed { generation }) = rx.recv().await else {
            panic!("expected a debounce event");
        };
        assert_eq!(generation, 3);
        assert!(debouncer.fire(generation));
        assert_eq!(start.elapsed(), Duration::from_millis(5_000));

        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_generation_does_not_fire() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.schedule(&tx);
        debouncer.cancel();
        assert!(!debouncer.fire(1));
    }
}

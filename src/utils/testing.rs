use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::timeout;

use crate::stream::error::SequenceError;
use crate::stream::observer::{BoxObserver, Observer, SequenceItem};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Awaits `future`, panicking if it takes longer than [DEFAULT_TIMEOUT].
pub async fn within<F>(future: F) -> F::Output
where
  F: Future,
{
  match timeout(DEFAULT_TIMEOUT, future).await {
    Ok(output) => output,
    Err(_) => panic!("future took too long"),
  }
}

/// A single delivery captured by a [Recording] observer. Errors are captured
/// by display text to keep the log comparable.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification<T> {
  Next(T),
  Error(String),
  Completed,
}

struct Log<T> {
  events: Mutex<Vec<Notification<T>>>,
  terminal: Notify,
}

/// Observer which records every delivery, letting tests await a sequence's
/// outcome and assert on the exact notification log.
pub struct Recording<T>
where
  T: SequenceItem,
{
  log: Arc<Log<T>>,
}

impl<T> Recording<T>
where
  T: SequenceItem,
{
  pub fn new() -> Self {
    Recording {
      log: Arc::new(Log {
        events: Mutex::new(Vec::new()),
        terminal: Notify::new(),
      }),
    }
  }

  /// The observer side, to hand to a subscription.
  pub fn observer(&self) -> BoxObserver<T> {
    Box::new(RecordingObserver {
      log: self.log.clone(),
    })
  }

  /// Snapshot of everything delivered so far.
  pub fn events(&self) -> Vec<Notification<T>>
  where
    T: Clone,
  {
    self.log.events.lock().unwrap().clone()
  }

  /// Waits for the terminal signal, then returns the full notification log.
  pub async fn settled(&self) -> Vec<Notification<T>>
  where
    T: Clone,
  {
    self.log.terminal.notified().await;
    self.events()
  }
}

struct RecordingObserver<T>
where
  T: SequenceItem,
{
  log: Arc<Log<T>>,
}

#[async_trait]
impl<T> Observer<T> for RecordingObserver<T>
where
  T: SequenceItem,
{
  async fn next(&mut self, value: T) {
    self
      .log
      .events
      .lock()
      .unwrap()
      .push(Notification::Next(value));
  }

  async fn error(&mut self, error: SequenceError) {
    self
      .log
      .events
      .lock()
      .unwrap()
      .push(Notification::Error(error.to_string()));
    self.log.terminal.notify_one();
  }

  async fn completed(&mut self) {
    self.log.events.lock().unwrap().push(Notification::Completed);
    self.log.terminal.notify_one();
  }
}

use std::mem;

use tokio::task::JoinHandle;

enum Inner {
  Task(JoinHandle<()>),
  Action(Box<dyn FnOnce() + Send>),
  Settled,
}

/// Handle to the live relationship between one producer and one observer.
///
/// Dropping the handle unsubscribes, tying the lifetime of the producing
/// side of the sequence to the scope holding the subscription.
pub struct Subscription {
  inner: Inner,
}

impl Subscription {
  /// Subscription backed by a producing task; unsubscribing aborts it.
  pub(super) fn task(handle: JoinHandle<()>) -> Self {
    Subscription {
      inner: Inner::Task(handle),
    }
  }

  /// Subscription cancelled by running an action.
  pub(super) fn action<F>(cancel: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    Subscription {
      inner: Inner::Action(Box::new(cancel)),
    }
  }

  /// A subscription whose sequence already reached its terminal signal.
  pub fn settled() -> Self {
    Subscription {
      inner: Inner::Settled,
    }
  }

  /// Cancels the producing side of the sequence. Idempotent.
  pub fn unsubscribe(&mut self) {
    match mem::replace(&mut self.inner, Inner::Settled) {
      Inner::Task(handle) => handle.abort(),
      Inner::Action(cancel) => cancel(),
      Inner::Settled => (),
    }
  }

  /// Whether the producing side may still deliver signals.
  pub fn active(&self) -> bool {
    match &self.inner {
      Inner::Task(handle) => !handle.is_finished(),
      Inner::Action(_) => true,
      Inner::Settled => false,
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.unsubscribe();
  }
}

#[cfg(test)]
mod test {
  use super::*;

  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn settled_inactive_test() {
    let mut subscription = Subscription::settled();
    assert!(!subscription.active());
    subscription.unsubscribe();
    assert!(!subscription.active());
  }

  #[tokio::test]
  async fn action_runs_once_test() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let cloned = cancelled.clone();
    let mut subscription = Subscription::action(move || {
      cloned.fetch_add(1, Ordering::Relaxed);
    });
    assert!(subscription.active());
    subscription.unsubscribe();
    subscription.unsubscribe();
    assert_eq!(cancelled.load(Ordering::Relaxed), 1);
  }

  #[tokio::test]
  async fn task_abort_test() {
    let handle = tokio::spawn(async {
      tokio::time::sleep(Duration::from_secs(60)).await;
    });
    let mut subscription = Subscription::task(handle);
    assert!(subscription.active());
    subscription.unsubscribe();
    assert!(!subscription.active());
  }
}

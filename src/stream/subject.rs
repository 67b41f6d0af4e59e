use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use tokio::sync::Mutex;

use super::error::SequenceError;
use super::observable::{Observable, SubscribeError};
use super::observer::{BoxObserver, Observer, SequenceItem};
use super::subscription::Subscription;

struct Inner<T>
where
  T: SequenceItem,
{
  slot: Mutex<Option<BoxObserver<T>>>,
  closed: AtomicBool,
}

/// A manually driven producer: values pushed with [next](Subject::next) flow
/// to the observer attached through the subject's observable face.
///
/// A subject feeds exactly one observer at a time; a second subscription
/// fails until the current one ends. Pushing a terminal signal detaches the
/// observer, and anything pushed afterwards is dropped.
///
/// # Example
/// ```
/// use cascade::stream::observable::Observable;
/// use cascade::stream::subject::Subject;
/// use cascade::utils::testing::{within, Notification, Recording};
///
/// tokio::runtime::Runtime::new().unwrap().block_on(async {
///   let subject = Subject::new();
///   let recording = Recording::new();
///   let _subscription = subject
///     .observe()
///     .subscribe(recording.observer())
///     .await
///     .unwrap();
///   subject.next(1).await;
///   subject.next(2).await;
///   subject.completed().await;
///   assert_eq!(
///     within(recording.settled()).await,
///     [
///       Notification::Next(1),
///       Notification::Next(2),
///       Notification::Completed,
///     ]
///   );
/// });
/// ```
pub struct Subject<T>
where
  T: SequenceItem,
{
  inner: Arc<Inner<T>>,
}

impl<T> Subject<T>
where
  T: SequenceItem,
{
  pub fn new() -> Self {
    Subject {
      inner: Arc::new(Inner {
        slot: Mutex::new(None),
        closed: AtomicBool::new(false),
      }),
    }
  }

  /// Produces the observable face of this subject.
  pub fn observe(&self) -> SubjectStream<T> {
    SubjectStream {
      inner: self.inner.clone(),
    }
  }

  /// Pushes the next value to the attached observer.
  pub async fn next(&self, value: T) {
    let mut slot = self.inner.slot.lock().await;
    if self.inner.closed.load(Ordering::Relaxed) {
      slot.take();
      return;
    }
    match slot.as_mut() {
      Some(observer) => observer.next(value).await,
      None => warn!("value pushed into a subject with no observer"),
    }
  }

  /// Pushes the terminal error signal and detaches the observer.
  pub async fn error(&self, error: SequenceError) {
    if let Some(mut observer) = self.detach().await {
      observer.error(error).await;
    }
  }

  /// Pushes the terminal completion signal and detaches the observer.
  pub async fn completed(&self) {
    if let Some(mut observer) = self.detach().await {
      observer.completed().await;
    }
  }

  async fn detach(&self) -> Option<BoxObserver<T>> {
    let mut slot = self.inner.slot.lock().await;
    let observer = slot.take();
    if self.inner.closed.load(Ordering::Relaxed) {
      return None;
    }
    if observer.is_none() {
      warn!("terminal signal pushed into a subject with no observer");
    }
    observer
  }
}

/// The observable face of a [Subject].
pub struct SubjectStream<T>
where
  T: SequenceItem,
{
  inner: Arc<Inner<T>>,
}

#[async_trait]
impl<T> Observable<T> for SubjectStream<T>
where
  T: SequenceItem,
{
  async fn subscribe(
    &self,
    observer: BoxObserver<T>,
  ) -> Result<Subscription, SubscribeError<T>> {
    let mut slot = self.inner.slot.lock().await;
    if slot.is_some() && !self.inner.closed.load(Ordering::Relaxed) {
      return Err(SubscribeError {
        observer,
        error: SequenceError::message("subject already has an observer"),
      });
    }
    self.inner.closed.store(false, Ordering::Relaxed);
    *slot = Some(observer);
    let inner = Arc::downgrade(&self.inner);
    Ok(Subscription::action(move || {
      if let Some(inner) = inner.upgrade() {
        inner.closed.store(true, Ordering::Relaxed);
      }
    }))
  }
}

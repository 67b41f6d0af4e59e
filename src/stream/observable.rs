use std::fmt::{self, Debug};
use std::marker::PhantomData;

use async_trait::async_trait;

use super::error::SequenceError;
use super::observer::{BoxObserver, Observer, SequenceItem};
use super::subscription::Subscription;

/// Failure to establish a subscription.
///
/// Carries the observer back to the caller so the failure can still be
/// routed into its error channel, see [subscribe_safe].
pub struct SubscribeError<T>
where
  T: SequenceItem,
{
  pub observer: BoxObserver<T>,
  pub error: SequenceError,
}

impl<T> Debug for SubscribeError<T>
where
  T: SequenceItem,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SubscribeError")
      .field("error", &self.error)
      .finish()
  }
}

/// A producer of an asynchronous push sequence.
///
/// Subscribing hands the observer to the producer, which delivers zero or
/// more values followed by exactly one terminal signal, every delivery
/// awaited in order. Observables are stateless between subscriptions; each
/// subscription is independent.
#[async_trait]
pub trait Observable<T>: Send + Sync
where
  T: SequenceItem,
{
  /// Starts pushing this sequence into `observer` and returns the handle
  /// tying the producing side to the caller's scope.
  async fn subscribe(
    &self,
    observer: BoxObserver<T>,
  ) -> Result<Subscription, SubscribeError<T>>;
}

/// Subscribes `observer` to `source`, funneling subscription failures into
/// the observer's error channel instead of handing them to the caller.
///
/// The caller receives an already settled subscription when establishing the
/// subscription fails.
pub async fn subscribe_safe<T, S>(
  source: &S,
  observer: BoxObserver<T>,
) -> Subscription
where
  T: SequenceItem,
  S: Observable<T> + ?Sized,
{
  match source.subscribe(observer).await {
    Ok(subscription) => subscription,
    Err(SubscribeError {
      mut observer,
      error,
    }) => {
      observer.error(error).await;
      Subscription::settled()
    }
  }
}

/// Cold observable replaying a constant list of values, see
/// [this function](of) for details
pub struct Iter<T>
where
  T: SequenceItem,
{
  items: Vec<T>,
}

/// Creates an observable of a constant list of values.
///
/// Every subscription replays the whole list in order from a spawned task
/// and then completes.
///
/// # Example
/// ```
/// use cascade::stream::observable::{of, Observable};
/// use cascade::utils::testing::{within, Notification, Recording};
///
/// tokio::runtime::Runtime::new().unwrap().block_on(async {
///   let recording = Recording::new();
///   let _subscription = of(vec![1, 2, 3])
///     .subscribe(recording.observer())
///     .await
///     .unwrap();
///   assert_eq!(
///     within(recording.settled()).await,
///     [
///       Notification::Next(1),
///       Notification::Next(2),
///       Notification::Next(3),
///       Notification::Completed,
///     ]
///   );
/// });
/// ```
pub fn of<T>(items: Vec<T>) -> Iter<T>
where
  T: SequenceItem,
{
  Iter { items }
}

#[async_trait]
impl<T> Observable<T> for Iter<T>
where
  T: SequenceItem + Clone + Sync,
{
  async fn subscribe(
    &self,
    mut observer: BoxObserver<T>,
  ) -> Result<Subscription, SubscribeError<T>> {
    let items = self.items.clone();
    let handle = tokio::spawn(async move {
      for item in items {
        observer.next(item).await;
      }
      observer.completed().await;
    });
    Ok(Subscription::task(handle))
  }
}

/// Observable which completes without delivering a value, see
/// [this function](empty) for details
pub struct Empty<T> {
  marker: PhantomData<fn() -> T>,
}

/// Creates an observable which delivers no values and completes as soon as
/// it is subscribed.
pub fn empty<T>() -> Empty<T>
where
  T: SequenceItem,
{
  Empty {
    marker: PhantomData,
  }
}

#[async_trait]
impl<T> Observable<T> for Empty<T>
where
  T: SequenceItem,
{
  async fn subscribe(
    &self,
    mut observer: BoxObserver<T>,
  ) -> Result<Subscription, SubscribeError<T>> {
    let handle = tokio::spawn(async move {
      observer.completed().await;
    });
    Ok(Subscription::task(handle))
  }
}

/// Observable which errors without delivering a value, see
/// [this function](throw) for details
pub struct Throw<T> {
  error: SequenceError,
  marker: PhantomData<fn() -> T>,
}

/// Creates an observable which pushes `error` as soon as it is subscribed.
pub fn throw<T>(error: SequenceError) -> Throw<T>
where
  T: SequenceItem,
{
  Throw {
    error,
    marker: PhantomData,
  }
}

#[async_trait]
impl<T> Observable<T> for Throw<T>
where
  T: SequenceItem,
{
  async fn subscribe(
    &self,
    mut observer: BoxObserver<T>,
  ) -> Result<Subscription, SubscribeError<T>> {
    let error = self.error.clone();
    let handle = tokio::spawn(async move {
      observer.error(error).await;
    });
    Ok(Subscription::task(handle))
  }
}

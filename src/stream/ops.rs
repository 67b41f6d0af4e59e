use std::future::Future;
use std::mem;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt, TryFutureExt};
use log::warn;

use super::error::SequenceError;
use super::observable::{subscribe_safe, Observable, SubscribeError};
use super::observer::{BoxObserver, Observer, SequenceItem};
use super::subscription::Subscription;

/// One reduction step: folds a value into the accumulator, possibly
/// suspending before the new accumulator is available.
type Reducer<A, T> =
  Box<dyn FnMut(A, T) -> BoxFuture<'static, Result<A, SequenceError>> + Send>;

/// Maps the final accumulator into the emitted result. Applied exactly once,
/// when the upstream sequence completes.
type Selector<A, R> =
  Box<dyn FnOnce(A) -> BoxFuture<'static, Result<R, SequenceError>> + Send>;

/// Reduction state owned by one fold observer for one subscription.
///
/// `Settled` records that the terminal signal already went downstream; a
/// delivery arriving afterwards violates the sequencing contract and is
/// dropped.
enum FoldState<A> {
  Running(A),
  Settled,
}

/// Upstream-facing observer implementing fold semantics: folds every value
/// in arrival order and forwards exactly one terminal result (or error) to
/// the downstream observer.
struct FoldObserver<T, A, R>
where
  T: SequenceItem,
  A: SequenceItem,
  R: SequenceItem,
{
  downstream: BoxObserver<R>,
  reducer: Reducer<A, T>,
  selector: Option<Selector<A, R>>,
  state: FoldState<A>,
}

impl<T, A, R> FoldObserver<T, A, R>
where
  T: SequenceItem,
  A: SequenceItem,
  R: SequenceItem,
{
  fn new(
    downstream: BoxObserver<R>,
    seed: A,
    reducer: Reducer<A, T>,
    selector: Selector<A, R>,
  ) -> Self {
    FoldObserver {
      downstream,
      reducer,
      selector: Some(selector),
      state: FoldState::Running(seed),
    }
  }
}

#[async_trait]
impl<T, A, R> Observer<T> for FoldObserver<T, A, R>
where
  T: SequenceItem,
  A: SequenceItem,
  R: SequenceItem,
{
  async fn next(&mut self, value: T) {
    match mem::replace(&mut self.state, FoldState::Settled) {
      FoldState::Running(accumulator) => {
        match (self.reducer)(accumulator, value).await {
          Ok(accumulator) => self.state = FoldState::Running(accumulator),
          Err(error) => self.downstream.error(error).await,
        }
      }
      FoldState::Settled => warn!("value delivered after the terminal signal"),
    }
  }

  async fn error(&mut self, error: SequenceError) {
    match mem::replace(&mut self.state, FoldState::Settled) {
      FoldState::Running(_) => self.downstream.error(error).await,
      FoldState::Settled => warn!("error delivered after the terminal signal"),
    }
  }

  async fn completed(&mut self) {
    match (
      mem::replace(&mut self.state, FoldState::Settled),
      self.selector.take(),
    ) {
      (FoldState::Running(accumulator), Some(selector)) => {
        match selector(accumulator).await {
          Ok(result) => {
            self.downstream.next(result).await;
            self.downstream.completed().await;
          }
          Err(error) => self.downstream.error(error).await,
        }
      }
      _ => warn!("completion delivered after the terminal signal"),
    }
  }
}

/// Selector for the unseeded variants: rejects completion of a sequence
/// which never produced an accumulator.
fn unseeded_selector<T>() -> Selector<Option<T>, T>
where
  T: SequenceItem,
{
  Box::new(|accumulator| {
    future::ready(accumulator.ok_or(SequenceError::EmptySequence)).boxed()
  })
}

/// Wraps `downstream` into an unseeded fold observer: the first value
/// becomes the accumulator without invoking `func`, later values fold
/// through it, and completion emits the final accumulator. Completing
/// without a value delivers an
/// [empty-sequence error](SequenceError::EmptySequence).
pub fn reduce_observer<T, F>(
  downstream: BoxObserver<T>,
  mut func: F,
) -> BoxObserver<T>
where
  T: SequenceItem,
  F: FnMut(T, T) -> Result<T, SequenceError> + Send + 'static,
{
  let reducer: Reducer<Option<T>, T> = Box::new(move |accumulator, value| {
    future::ready(match accumulator {
      Some(current) => func(current, value).map(Some),
      None => Ok(Some(value)),
    })
    .boxed()
  });
  Box::new(FoldObserver::new(
    downstream,
    None,
    reducer,
    unseeded_selector(),
  ))
}

/// As [reduce_observer], with a suspending reducer.
pub fn reduce_observer_async<T, F, Fut>(
  downstream: BoxObserver<T>,
  mut func: F,
) -> BoxObserver<T>
where
  T: SequenceItem,
  F: FnMut(T, T) -> Fut + Send + 'static,
  Fut: Future<Output = Result<T, SequenceError>> + Send + 'static,
{
  let reducer: Reducer<Option<T>, T> =
    Box::new(move |accumulator, value| match accumulator {
      Some(current) => func(current, value).map_ok(Some).boxed(),
      None => future::ready(Ok(Some(value))).boxed(),
    });
  Box::new(FoldObserver::new(
    downstream,
    None,
    reducer,
    unseeded_selector(),
  ))
}

/// Wraps `downstream` into a seeded fold observer: the accumulator starts at
/// `seed`, every value folds through `func`, and completion emits
/// `selector(accumulator)` followed by the completion signal.
pub fn fold_observer<T, A, R, F, M>(
  downstream: BoxObserver<R>,
  seed: A,
  mut func: F,
  selector: M,
) -> BoxObserver<T>
where
  T: SequenceItem,
  A: SequenceItem,
  R: SequenceItem,
  F: FnMut(A, T) -> Result<A, SequenceError> + Send + 'static,
  M: FnOnce(A) -> Result<R, SequenceError> + Send + 'static,
{
  let reducer: Reducer<A, T> = Box::new(move |accumulator, value| {
    future::ready(func(accumulator, value)).boxed()
  });
  let selector: Selector<A, R> =
    Box::new(move |accumulator| future::ready(selector(accumulator)).boxed());
  Box::new(FoldObserver::new(downstream, seed, reducer, selector))
}

/// As [fold_observer], with the reducer and selector each a suspension
/// point.
pub fn fold_observer_async<T, A, R, F, M, FutF, FutM>(
  downstream: BoxObserver<R>,
  seed: A,
  mut func: F,
  selector: M,
) -> BoxObserver<T>
where
  T: SequenceItem,
  A: SequenceItem,
  R: SequenceItem,
  F: FnMut(A, T) -> FutF + Send + 'static,
  M: FnOnce(A) -> FutM + Send + 'static,
  FutF: Future<Output = Result<A, SequenceError>> + Send + 'static,
  FutM: Future<Output = Result<R, SequenceError>> + Send + 'static,
{
  let reducer: Reducer<A, T> =
    Box::new(move |accumulator, value| func(accumulator, value).boxed());
  let selector: Selector<A, R> =
    Box::new(move |accumulator| selector(accumulator).boxed());
  Box::new(FoldObserver::new(downstream, seed, reducer, selector))
}

/// The attach step of an aggregate operator: wraps the downstream observer
/// into the upstream-facing fold observer for one subscription.
type Attach<T, R> = dyn Fn(BoxObserver<R>) -> BoxObserver<T> + Send + Sync;

/// Observable produced by the [Reduce] and [Fold] operators: re-emits its
/// source reduced to a single result, then completes.
pub struct Aggregate<S, T, R>
where
  S: Observable<T>,
  T: SequenceItem,
  R: SequenceItem,
{
  source: S,
  attach: Arc<Attach<T, R>>,
}

impl<S, T, R> Aggregate<S, T, R>
where
  S: Observable<T>,
  T: SequenceItem,
  R: SequenceItem,
{
  fn new(source: S, attach: Arc<Attach<T, R>>) -> Self {
    Aggregate { source, attach }
  }
}

#[async_trait]
impl<S, T, R> Observable<R> for Aggregate<S, T, R>
where
  S: Observable<T>,
  T: SequenceItem,
  R: SequenceItem,
{
  async fn subscribe(
    &self,
    observer: BoxObserver<R>,
  ) -> Result<Subscription, SubscribeError<R>> {
    Ok(subscribe_safe(&self.source, (self.attach)(observer)).await)
  }
}

pub trait Reduce<T>: Observable<T> + Sized
where
  T: SequenceItem,
{
  /// Attaches an unseeded aggregate operator: the sequence folds left
  /// through `func`, the first value seeding the accumulator, and the final
  /// accumulator is emitted once the source completes.
  ///
  /// A source completing without a single value is reported as an
  /// [empty-sequence error](SequenceError::EmptySequence) since there is
  /// nothing to emit. A failing reducer ends the sequence with its error.
  ///
  /// # Example
  /// ```
  /// use cascade::stream::observable::{of, Observable};
  /// use cascade::stream::ops::Reduce;
  /// use cascade::utils::testing::{within, Notification, Recording};
  ///
  /// tokio::runtime::Runtime::new().unwrap().block_on(async {
  ///   let recording = Recording::new();
  ///   let _subscription = of(vec![1, 2, 3, 4])
  ///     .reduce(|current, value| Ok(current + value))
  ///     .subscribe(recording.observer())
  ///     .await
  ///     .unwrap();
  ///   assert_eq!(
  ///     within(recording.settled()).await,
  ///     [Notification::Next(10), Notification::Completed]
  ///   );
  /// });
  /// ```
  fn reduce<F>(self, func: F) -> Aggregate<Self, T, T>
  where
    F: Fn(T, T) -> Result<T, SequenceError> + Send + Sync + 'static;

  /// As [reduce](Reduce::reduce), with a suspending reducer: each
  /// accumulation step is awaited before the next value is folded.
  fn reduce_async<F, Fut>(self, func: F) -> Aggregate<Self, T, T>
  where
    F: Fn(T, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, SequenceError>> + Send + 'static;
}

impl<T, S> Reduce<T> for S
where
  T: SequenceItem,
  S: Observable<T>,
{
  fn reduce<F>(self, func: F) -> Aggregate<Self, T, T>
  where
    F: Fn(T, T) -> Result<T, SequenceError> + Send + Sync + 'static,
  {
    let func = Arc::new(func);
    Aggregate::new(
      self,
      Arc::new(move |downstream| {
        let func = func.clone();
        reduce_observer(downstream, move |current, value| {
          (*func)(current, value)
        })
      }),
    )
  }

  fn reduce_async<F, Fut>(self, func: F) -> Aggregate<Self, T, T>
  where
    F: Fn(T, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, SequenceError>> + Send + 'static,
  {
    let func = Arc::new(func);
    Aggregate::new(
      self,
      Arc::new(move |downstream| {
        let func = func.clone();
        reduce_observer_async(downstream, move |current, value| {
          (*func)(current, value)
        })
      }),
    )
  }
}

pub trait Fold<T>: Observable<T> + Sized
where
  T: SequenceItem,
{
  /// Attaches a seeded aggregate operator: the accumulator starts at `seed`
  /// and every value folds through `func`; once the source completes the
  /// final accumulator is emitted. A source completing without values emits
  /// the seed itself, so a seeded fold always produces a result.
  ///
  /// # Example
  /// ```
  /// use cascade::stream::observable::{of, Observable};
  /// use cascade::stream::ops::Fold;
  /// use cascade::utils::testing::{within, Notification, Recording};
  ///
  /// tokio::runtime::Runtime::new().unwrap().block_on(async {
  ///   let recording = Recording::new();
  ///   let _subscription = of(vec![1, 2, 3])
  ///     .fold(10, |current, value| Ok(current + value))
  ///     .subscribe(recording.observer())
  ///     .await
  ///     .unwrap();
  ///   assert_eq!(
  ///     within(recording.settled()).await,
  ///     [Notification::Next(16), Notification::Completed]
  ///   );
  /// });
  /// ```
  fn fold<A, F>(self, seed: A, func: F) -> Aggregate<Self, T, A>
  where
    A: SequenceItem + Clone + Sync,
    F: Fn(A, T) -> Result<A, SequenceError> + Send + Sync + 'static;

  /// As [fold](Fold::fold), with a suspending reducer.
  fn fold_async<A, F, Fut>(self, seed: A, func: F) -> Aggregate<Self, T, A>
  where
    A: SequenceItem + Clone + Sync,
    F: Fn(A, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<A, SequenceError>> + Send + 'static;

  /// Attaches a seeded aggregate operator with a result transform: as
  /// [fold](Fold::fold), but completion emits `selector(accumulator)`
  /// instead of the raw accumulator. A failing selector is reported on the
  /// error channel and suppresses the completion signal.
  ///
  /// # Example
  /// ```
  /// use cascade::stream::observable::{of, Observable};
  /// use cascade::stream::ops::Fold;
  /// use cascade::utils::testing::{within, Notification, Recording};
  ///
  /// tokio::runtime::Runtime::new().unwrap().block_on(async {
  ///   let recording = Recording::new();
  ///   let _subscription = of(vec![1, 2, 3])
  ///     .fold_map(
  ///       10,
  ///       |current, value| Ok(current + value),
  ///       |result| Ok(result * 2),
  ///     )
  ///     .subscribe(recording.observer())
  ///     .await
  ///     .unwrap();
  ///   assert_eq!(
  ///     within(recording.settled()).await,
  ///     [Notification::Next(32), Notification::Completed]
  ///   );
  /// });
  /// ```
  fn fold_map<A, R, F, M>(
    self,
    seed: A,
    func: F,
    selector: M,
  ) -> Aggregate<Self, T, R>
  where
    A: SequenceItem + Clone + Sync,
    R: SequenceItem,
    F: Fn(A, T) -> Result<A, SequenceError> + Send + Sync + 'static,
    M: Fn(A) -> Result<R, SequenceError> + Send + Sync + 'static;

  /// As [fold_map](Fold::fold_map), with the reducer and selector each a
  /// suspension point.
  fn fold_map_async<A, R, F, M, FutF, FutM>(
    self,
    seed: A,
    func: F,
    selector: M,
  ) -> Aggregate<Self, T, R>
  where
    A: SequenceItem + Clone + Sync,
    R: SequenceItem,
    F: Fn(A, T) -> FutF + Send + Sync + 'static,
    M: Fn(A) -> FutM + Send + Sync + 'static,
    FutF: Future<Output = Result<A, SequenceError>> + Send + 'static,
    FutM: Future<Output = Result<R, SequenceError>> + Send + 'static;
}

impl<T, S> Fold<T> for S
where
  T: SequenceItem,
  S: Observable<T>,
{
  fn fold<A, F>(self, seed: A, func: F) -> Aggregate<Self, T, A>
  where
    A: SequenceItem + Clone + Sync,
    F: Fn(A, T) -> Result<A, SequenceError> + Send + Sync + 'static,
  {
    self.fold_map(seed, func, |accumulator| Ok(accumulator))
  }

  fn fold_async<A, F, Fut>(self, seed: A, func: F) -> Aggregate<Self, T, A>
  where
    A: SequenceItem + Clone + Sync,
    F: Fn(A, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<A, SequenceError>> + Send + 'static,
  {
    self.fold_map_async(seed, func, |accumulator| async move {
      Ok(accumulator)
    })
  }

  fn fold_map<A, R, F, M>(
    self,
    seed: A,
    func: F,
    selector: M,
  ) -> Aggregate<Self, T, R>
  where
    A: SequenceItem + Clone + Sync,
    R: SequenceItem,
    F: Fn(A, T) -> Result<A, SequenceError> + Send + Sync + 'static,
    M: Fn(A) -> Result<R, SequenceError> + Send + Sync + 'static,
  {
    let func = Arc::new(func);
    let selector = Arc::new(selector);
    Aggregate::new(
      self,
      Arc::new(move |downstream| {
        let func = func.clone();
        let selector = selector.clone();
        fold_observer(
          downstream,
          seed.clone(),
          move |accumulator, value| (*func)(accumulator, value),
          move |accumulator| (*selector)(accumulator),
        )
      }),
    )
  }

  fn fold_map_async<A, R, F, M, FutF, FutM>(
    self,
    seed: A,
    func: F,
    selector: M,
  ) -> Aggregate<Self, T, R>
  where
    A: SequenceItem + Clone + Sync,
    R: SequenceItem,
    F: Fn(A, T) -> FutF + Send + Sync + 'static,
    M: Fn(A) -> FutM + Send + Sync + 'static,
    FutF: Future<Output = Result<A, SequenceError>> + Send + 'static,
    FutM: Future<Output = Result<R, SequenceError>> + Send + 'static,
  {
    let func = Arc::new(func);
    let selector = Arc::new(selector);
    Aggregate::new(
      self,
      Arc::new(move |downstream| {
        let func = func.clone();
        let selector = selector.clone();
        fold_observer_async(
          downstream,
          seed.clone(),
          move |accumulator, value| (*func)(accumulator, value),
          move |accumulator| (*selector)(accumulator),
        )
      }),
    )
  }
}

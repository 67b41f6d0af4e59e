use async_trait::async_trait;

use super::error::SequenceError;

/// Blanket trait for values which may travel through a sequence.
pub trait SequenceItem: Send + 'static {}

impl<T> SequenceItem for T where T: Send + 'static {}

/// A consumer of one asynchronous push sequence.
///
/// The three operations form the delivery protocol: calls for a single
/// subscription are strictly sequential, each delivery awaited before the
/// next one is issued. Exactly one terminal operation
/// ([error](Observer::error) or [completed](Observer::completed)) occurs per
/// subscription and no operation of any kind may follow it. Implementations
/// may suspend inside any operation.
#[async_trait]
pub trait Observer<T>: Send
where
  T: SequenceItem,
{
  /// Delivers the next value of the sequence.
  async fn next(&mut self, value: T);
  /// Delivers the terminal error signal, ending the sequence.
  async fn error(&mut self, error: SequenceError);
  /// Delivers the terminal completion signal, ending the sequence.
  async fn completed(&mut self);
}

/// An owned observer, as handed to a producer on subscription.
pub type BoxObserver<T> = Box<dyn Observer<T>>;

/// Observer assembled from one callback per protocol channel, see
/// [this function](callbacks) for details
pub struct CallbackObserver<N, E, C> {
  next: N,
  error: E,
  completed: C,
}

#[async_trait]
impl<T, N, E, C> Observer<T> for CallbackObserver<N, E, C>
where
  T: SequenceItem,
  N: FnMut(T) + Send,
  E: FnMut(SequenceError) + Send,
  C: FnMut() + Send,
{
  async fn next(&mut self, value: T) {
    (self.next)(value);
  }

  async fn error(&mut self, error: SequenceError) {
    (self.error)(error);
  }

  async fn completed(&mut self) {
    (self.completed)();
  }
}

/// Builds an observer from three callbacks, one per protocol channel.
///
/// # Example
/// ```
/// use cascade::stream::observer::{callbacks, Observer};
///
/// tokio::runtime::Runtime::new().unwrap().block_on(async {
///   let mut observer = callbacks(
///     |x: i32| println!("value: {}", x),
///     |error| println!("error: {}", error),
///     || println!("done"),
///   );
///   observer.next(1).await;
///   observer.completed().await;
/// });
/// ```
pub fn callbacks<T, N, E, C>(next: N, error: E, completed: C) -> BoxObserver<T>
where
  T: SequenceItem,
  N: FnMut(T) + Send + 'static,
  E: FnMut(SequenceError) + Send + 'static,
  C: FnMut() + Send + 'static,
{
  Box::new(CallbackObserver {
    next,
    error,
    completed,
  })
}

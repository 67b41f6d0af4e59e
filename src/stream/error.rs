use std::sync::Arc;

use thiserror::Error;

/// Terminal error signal carried on a sequence's error channel.
///
/// Errors are cheaply cloneable so a single failure can travel through every
/// layer of an operator chain without copying the underlying cause.
#[derive(Clone, Debug, Error)]
pub enum SequenceError {
  /// An unseeded reduction completed without observing a single value.
  #[error("sequence is empty")]
  EmptySequence,
  /// A user supplied reducer or selector failed while the sequence was
  /// being reduced.
  #[error("{0}")]
  Callback(Arc<dyn std::error::Error + Send + Sync>),
  /// A message-only failure raised by a producer.
  #[error("{0}")]
  Message(Arc<str>),
}

impl SequenceError {
  /// Wraps the failure of a user supplied callback.
  pub fn callback<E>(cause: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    SequenceError::Callback(Arc::new(cause))
  }

  /// Creates a message-only error signal.
  pub fn message<S>(message: S) -> Self
  where
    S: Into<String>,
  {
    SequenceError::Message(message.into().into())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn empty_sequence_message_test() {
    assert_eq!(
      SequenceError::EmptySequence.to_string(),
      "sequence is empty"
    );
  }

  #[test]
  fn message_display_test() {
    assert_eq!(SequenceError::message("boom").to_string(), "boom");
  }

  #[test]
  fn callback_preserves_cause_test() {
    let error = SequenceError::callback(std::io::Error::new(
      std::io::ErrorKind::Other,
      "bad reducer",
    ));
    assert_eq!(error.to_string(), "bad reducer");
  }

  #[test]
  fn clone_shares_cause_test() {
    let error = SequenceError::message("shared");
    let cloned = error.clone();
    assert_eq!(error.to_string(), cloned.to_string());
  }
}

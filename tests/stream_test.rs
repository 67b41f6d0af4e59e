use cascade::stream::error::SequenceError;
use cascade::stream::observable::{empty, of, throw, Observable};
use cascade::stream::ops::{Fold, Reduce};
use cascade::stream::subject::Subject;
use cascade::utils::testing::{within, Notification, Recording};

#[tokio::test]
async fn reduce_sums_sequence_test() {
  let recording = Recording::new();
  let _subscription = of(vec![1, 2, 3, 4])
    .reduce(|current, value| Ok(current + value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(10), Notification::Completed]
  );
}

#[tokio::test]
async fn reduce_empty_sequence_errors_test() {
  let recording = Recording::new();
  let _subscription = of(Vec::<i32>::new())
    .reduce(|current, value| Ok(current + value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Error("sequence is empty".to_owned())]
  );
}

#[tokio::test]
async fn reduce_matches_left_fold_test() {
  let values = vec![5, 1, 4, 2, 3];
  let expected = values
    .iter()
    .copied()
    .reduce(|current, value| current * 2 - value)
    .unwrap();
  let recording = Recording::new();
  let _subscription = of(values)
    .reduce(|current, value| Ok(current * 2 - value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(expected), Notification::Completed]
  );
}

#[tokio::test]
async fn fold_map_transforms_result_test() {
  let recording = Recording::new();
  let _subscription = of(vec![1, 2, 3])
    .fold_map(
      10,
      |current, value| Ok(current + value),
      |result| Ok(result * 2),
    )
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(32), Notification::Completed]
  );
}

#[tokio::test]
async fn fold_map_empty_applies_selector_to_seed_test() {
  let recording = Recording::new();
  let _subscription = of(Vec::<i32>::new())
    .fold_map(
      5,
      |current, value| Ok(current + value),
      |result| Ok(format!("v:{}", result)),
    )
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [
      Notification::Next("v:5".to_owned()),
      Notification::Completed,
    ]
  );
}

#[tokio::test]
async fn fold_empty_emits_seed_test() {
  let recording = Recording::new();
  let _subscription = empty::<i32>()
    .fold(5, |current, value| Ok(current + value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(5), Notification::Completed]
  );
}

#[tokio::test]
async fn reducer_failure_is_terminal_test() {
  let recording = Recording::new();
  let _subscription = of(vec![1, 2, 3, 4])
    .reduce(|current, value| {
      if value == 3 {
        Err(SequenceError::message("boom"))
      } else {
        Ok(current + value)
      }
    })
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Error("boom".to_owned())]
  );
}

#[tokio::test]
async fn reduce_async_matches_reduce_test() {
  let recording = Recording::new();
  let _subscription = of(vec![1, 2, 3, 4])
    .reduce_async(|current, value| async move { Ok(current + value) })
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(10), Notification::Completed]
  );
}

#[tokio::test]
async fn fold_map_async_matches_fold_map_test() {
  let recording = Recording::new();
  let _subscription = of(vec![1, 2, 3])
    .fold_map_async(
      10,
      |current, value| async move { Ok(current + value) },
      |result| async move { Ok(result * 2) },
    )
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(32), Notification::Completed]
  );
}

#[tokio::test]
async fn fold_async_emits_final_accumulator_test() {
  let recording = Recording::new();
  let _subscription = of(vec![2, 3, 4])
    .fold_async(1, |current, value| async move { Ok(current * value) })
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(24), Notification::Completed]
  );
}

#[tokio::test]
async fn upstream_error_forwards_unchanged_test() {
  let recording = Recording::new();
  let _subscription = throw::<i32>(SequenceError::message("upstream"))
    .reduce(|current, value| Ok(current + value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Error("upstream".to_owned())]
  );
}

#[tokio::test]
async fn selector_failure_suppresses_completion_test() {
  let recording = Recording::new();
  let _subscription = of(vec![1, 2])
    .fold_map(
      0,
      |current, value| Ok(current + value),
      |_: i32| Err::<i32, _>(SequenceError::message("bad selector")),
    )
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Error("bad selector".to_owned())]
  );
}

#[tokio::test]
async fn subject_driven_fold_test() {
  let subject = Subject::new();
  let recording = Recording::new();
  let _subscription = subject
    .observe()
    .fold(0, |current, value| Ok(current + value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  subject.next(1).await;
  subject.next(2).await;
  subject.next(3).await;
  subject.completed().await;
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Next(6), Notification::Completed]
  );
}

#[tokio::test]
async fn subject_driven_reduce_upstream_error_test() {
  let subject = Subject::new();
  let recording = Recording::new();
  let _subscription = subject
    .observe()
    .reduce(|current, value| Ok(current + value))
    .subscribe(recording.observer())
    .await
    .unwrap();
  subject.next(1).await;
  subject.error(SequenceError::message("upstream")).await;
  assert_eq!(
    within(recording.settled()).await,
    [Notification::Error("upstream".to_owned())]
  );
}

#[tokio::test]
async fn second_subscription_errors_through_safe_subscribe_test() {
  let subject = Subject::<i32>::new();
  let first = Recording::new();
  let _subscription = subject
    .observe()
    .subscribe(first.observer())
    .await
    .unwrap();
  let second = Recording::new();
  let _settled = subject
    .observe()
    .reduce(|current, value| Ok(current + value))
    .subscribe(second.observer())
    .await
    .unwrap();
  assert_eq!(
    within(second.settled()).await,
    [Notification::Error(
      "subject already has an observer".to_owned()
    )]
  );
}

#[tokio::test]
async fn string_values_fold_test() {
  let recording = Recording::new();
  let _subscription = of(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
    .fold(String::new(), |mut current, value: String| {
      current.push_str(&value);
      Ok(current)
    })
    .subscribe(recording.observer())
    .await
    .unwrap();
  assert_eq!(
    within(recording.settled()).await,
    [
      Notification::Next("abc".to_owned()),
      Notification::Completed,
    ]
  );
}

//! This module contains cascade's core sequence system. The module is
//! organized into the following sub modules:
//! * `error` which implements the terminal error signal carried on a
//!   sequence's error channel.
//! * `observable` which implements the producer side of the delivery
//!   protocol along with the cold sources.
//! * `observer` which implements the consumer side of the delivery protocol.
//! * `ops` which contains the aggregate operator family.
//! * `subject` which implements a manually driven producer used as the root
//!   of a sequence.
//! * `subscription` which implements the
//!   [Subscription](subscription::Subscription) type which is used to tie
//!   the producing side of a sequence to the current scope.
pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod subject;
pub mod subscription;

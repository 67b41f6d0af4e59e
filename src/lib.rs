//! Cascade is:
//! * an asynchronous, push based event sequence library built on the
//!   observer pattern.
//! * a fold/aggregate operator family which reduces a whole sequence to a
//!   single result delivered downstream.
pub mod stream;
pub mod utils;

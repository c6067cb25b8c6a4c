//! Lifecycle listener tests against the in-memory store

mod listener;

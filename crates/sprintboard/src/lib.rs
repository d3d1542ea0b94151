//! Sprintboard - an in-memory issue tracker.
//!
//! Tickets (stories, epics and on-call incidents) move through per-type
//! status workflows, can carry sub-tasks that gate their closure, and
//! stories can be planned into sprints with at most one sprint active.
//!
//! The [`tracker::Tracker`] bundles the three stores; the CLI drives it as a
//! scripted walkthrough or an interactive session.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod storage;
pub mod tracker;

// Public CLI module (needed by binary)
pub mod cli;
pub mod config;
pub mod output;

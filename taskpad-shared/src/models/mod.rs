//! Records persisted by Taskpad
//!
//! # Models
//!
//! - `user`: registered accounts (`users` collection)
//! - `task`: to-do items owned by a user (`tasks` collection)
//!
//! Both serialize as flat camelCase JSON objects and implement
//! [`Record`](crate::store::Record) so they can live in a
//! [`RecordStore`](crate::store::RecordStore).

pub mod task;
pub mod user;

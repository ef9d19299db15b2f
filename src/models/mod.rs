//! # Data Models
//!
//! SQLx row types for the `todos` and `users` tables. Queries are built at
//! runtime; filtered listings go through [`crate::query_builder`].

pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo};
pub use user::{NewUser, User};

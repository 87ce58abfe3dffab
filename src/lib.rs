//! Community blogging backend: groups, posts, comments, follow edges and a
//! personalized feed, served over HTTP with a SQLite store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

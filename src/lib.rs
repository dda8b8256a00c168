//! # Questline - mission and objective progression runtime
//!
//! Questline tracks multi-stage progression for interactive applications:
//! missions made of objectives, objectives made of steps, all named by
//! hierarchical dotted tags. Gameplay code emits semantic events; the
//! runtime routes them to every running objective's completion rule, fires
//! content-defined actions on each transition and chains objectives and
//! missions together.
//!
//! ## Features
//!
//! - **Completion rules**: simple, counter, checklist, sequence, gatekeeper, kill counter and manual objectives.
//! - **Actions**: side effects are data, executed by a host-supplied [`mission::ActionHandler`].
//! - **Async loading**: definitions resolve from a cache, a resident store, or JSON files read on tokio's blocking pool.
//! - **Persistence**: full snapshots of in-flight progress, stored in sled save slots.
//! - **Observers**: synchronous notifications for mission and objective lifecycle events.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questline::config::Config;
//! use questline::mission::{EventSource, MissionRuntime, Tag};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("questline.toml").await?;
//!     let mut runtime = MissionRuntime::from_config(&config);
//!
//!     runtime.start_mission(&Tag::parse("Mission.Intro")?)?;
//!     runtime.settle_loads().await;
//!
//!     runtime.emit_event(&EventSource::new("Player"), &Tag::parse("Door.Opened")?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`mission`] - tags, definitions, rules, the runtime engine, loading and persistence
//! - [`config`] - TOML configuration and logger setup
//! - [`logutil`] - log sanitizing helpers

pub mod config;
pub mod logutil;
pub mod mission;

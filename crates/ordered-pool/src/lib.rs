//! A fixed-size worker pool with order-preserving finalization.
//!
//! Jobs are submitted as a pair of closures: a `compute` step that may run on
//! any worker in any order, and a `finalize` step that receives the computed
//! value and runs strictly in submission order. This turns a parallel pool
//! into a building block for "parallel decode, sequential emit" pipelines
//! without the caller tracking any ordering.
//!
//! ```
//! use ordered_pool::OrderedThreadPool;
//! use std::sync::{Arc, Mutex};
//!
//! let pool = OrderedThreadPool::new(8, 4).unwrap();
//! let lines = Arc::new(Mutex::new(Vec::new()));
//!
//! for n in 0..100_u32 {
//!     let lines = Arc::clone(&lines);
//!     pool.submit(
//!         move || format!("{n}: {}", n.count_ones()),
//!         move |line| lines.lock().unwrap().push(line),
//!     )
//!     .unwrap();
//! }
//! pool.shutdown();
//!
//! let lines = lines.lock().unwrap();
//! assert_eq!(lines[0], "0: 0");
//! assert_eq!(lines[99], "99: 4");
//! ```
//!
//! ## Features
//! - `tracing`: emit worker and shutdown events through `tracing`.
//! - `serde`: derive `Serialize`/`Deserialize` for [`PoolConfig`],
//!   [`PoolStats`] and [`PoolState`].
//! - `cache-padded`: pad the ticket gate to its own cache line.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod job;
mod pool;
mod queue;
mod sequencer;
mod simple;
mod state;
mod stats;
mod worker;


pub use crate::config::*;
pub use crate::error::*;
pub use crate::pool::*;
pub use crate::simple::*;
pub use crate::state::*;
pub use crate::stats::*;

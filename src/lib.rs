// SPDX-License-Identifier: MIT
//! # Employee Database
//!
//! A single flat file holding a fixed-size header followed by an array of
//! fixed-size employee records. Every invocation loads the whole file, applies
//! at most one mutation in memory and rewrites the file from offset zero.
//!
//! ## Format Specification
//!
//! ```text
//! Header (12 bytes, big-endian):
//! - Magic: 0x4C4C4144 "LLAD" (4 bytes)
//! - Version: 1 (2 bytes)
//! - Count: number of records (2 bytes)
//! - Filesize: header + count * record size (4 bytes, advisory)
//!
//! Employee record (516 bytes), repeated `count` times:
//! - Name: NUL-padded text (256 bytes)
//! - Address: NUL-padded text (256 bytes)
//! - Hours: unsigned (4 bytes, big-endian)
//! ```
//!
//! There is no padding, footer or checksum. Text longer than 255 bytes is
//! truncated on a character boundary.
//!
//! ## Concurrency
//!
//! No locking is performed. Concurrent invocations against the same file race
//! and must be serialized by the caller.
//!
//! ## Usage
//!
//! ```no_run
//! use employee_db::{Action, Dispatcher, Request};
//!
//! let dispatcher = Dispatcher::default();
//! let mut out = std::io::stdout();
//! for action in [Action::NewFile, Action::Add("Alice,123 Main,40".into()), Action::List] {
//!     let request = Request { path: "db.bin".into(), action };
//!     dispatcher.run(&request, &mut out).unwrap();
//! }
//! ```

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod header;
pub mod repository;
pub mod store;

pub use cli::Cli;
pub use config::Config;
pub use dispatcher::{Action, Dispatcher, Request};
pub use error::{DbError, DbResult};
pub use format::{DbHeader, Employee, DB_MAGIC, DB_VERSION, EMPLOYEE_SIZE, HEADER_SIZE};
pub use repository::{EmployeeRepository, EmployeeSpec, HoursParsing, UpdateSpec};
pub use store::FileStore;

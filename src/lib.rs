//! Core library for the c4-rank command line application.
//!
//! The library ranks the findings of a security-audit contest by the
//! historical earnings of their authors. Data source adapters live under
//! [`io`], the record types in [`model`], the ordering in [`rank`], the sheet
//! layout in [`sheet`], and the end-to-end orchestration in [`pipeline`].

pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod rank;
pub mod settings;
pub mod sheet;

pub use error::{Result, ToolError};

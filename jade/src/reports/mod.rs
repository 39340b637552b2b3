//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target or
//! serialize them as JSON.

mod check;
mod generate;
mod output;

pub use check::CheckReport;
pub use generate::{FailureSummary, GenerateReport};
pub use output::{Report, TerminalOutput};

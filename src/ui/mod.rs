//! Terminal output for the `volby` binary
//!
//! Uses `cliclack` for framed output and spinners in an interactive
//! terminal, and plain `console`-styled lines when piped or under CI.
//!
//! # Example
//!
//! ```rust,ignore
//! use volby::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Fetching 2025 results...");
//! // ... do work ...
//! spinner.stop("Fetched");
//!
//! ui::key_value(&ctx, "Turnout", "68.95 %");
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    key_value, key_value_status, outro_success, remark, section, step_ok_detail,
    step_warn_hint,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;

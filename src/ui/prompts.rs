//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{VolbyError, VolbyResult};

/// Prompt for confirmation, returns `default` if non-interactive, `true` under auto-yes
pub fn confirm(ctx: &UiContext, message: &str, default: bool) -> VolbyResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    cliclack::confirm(message)
        .initial_value(default)
        .interact()
        .map_err(|e| VolbyError::User(format!("Prompt failed: {}", e)))
}

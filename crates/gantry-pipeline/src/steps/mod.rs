//! Built-in step types

mod command;
mod git_tag;
mod noop;
mod publish;

pub use command::{CommandOptions, CommandStep, WorkingDir};
pub use git_tag::{GitTagOptions, GitTagStep};
pub use noop::{NoopOptions, NoopStep};
pub use publish::{PublishOptions, PublishStep};

use crate::context::StepContext;

/// Substitute `{name}`, `{version}` and `{tag}` in a step option
pub(crate) fn expand(template: &str, ctx: &StepContext<'_>) -> String {
    template
        .replace("{name}", ctx.component().name())
        .replace("{version}", &ctx.version().to_string())
        .replace("{tag}", &ctx.target().tag_name())
}

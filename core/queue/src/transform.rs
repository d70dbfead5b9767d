//! Pre-execution command transforms.
//!
//! Every command passes through a [`CommandTransform`] right before it is
//! handed to the shell. A failing transform turns into the execution's
//! error output and the queue moves on.

use std::collections::BTreeMap;
use std::path::PathBuf;

use minijinja::Environment;
use minijinja::UndefinedBehavior;
use minijinja::Value;
use shellbook_protocol::CellId;
use shellbook_protocol::ExecutionOrder;

use crate::error::TransformError;
use crate::error::transform_error::RenderSnafu;

/// What a transform knows about the execution it is preparing.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub identity: CellId,
    pub order: ExecutionOrder,
    /// Shell working directory reported by the previous command.
    pub cwd: Option<PathBuf>,
    /// Cell text as submitted, before normalization.
    pub raw_text: String,
}

/// Rewrites a normalized command line before execution.
pub trait CommandTransform: Send + Sync {
    fn transform(&self, command: &str, ctx: &ExecutionContext) -> Result<String, TransformError>;
}

/// Runs commands unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTransform;

impl CommandTransform for IdentityTransform {
    fn transform(&self, command: &str, _ctx: &ExecutionContext) -> Result<String, TransformError> {
        Ok(command.to_string())
    }
}

/// Expands `{{ name }}` placeholders with minijinja.
///
/// Besides the user variables, templates see `cell`, `order`, `cwd` and
/// `env` (the process environment). Undefined names are errors. Commands
/// without `{{` or `{%` pass through untouched, so shell syntax such as
/// `${#var}` keeps working.
#[derive(Debug)]
pub struct TemplateTransform {
    env: Environment<'static>,
    variables: BTreeMap<String, String>,
}

impl TemplateTransform {
    pub fn new(variables: BTreeMap<String, String>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        Self { env, variables }
    }

    fn context(&self, ctx: &ExecutionContext) -> BTreeMap<String, Value> {
        let mut values: BTreeMap<String, Value> = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        values.insert("cell".to_string(), Value::from(ctx.identity.as_str()));
        values.insert("order".to_string(), Value::from(ctx.order.value()));
        values.insert(
            "cwd".to_string(),
            ctx.cwd
                .as_ref()
                .map(|p| Value::from(p.display().to_string()))
                .unwrap_or_else(|| Value::from("")),
        );
        let env: BTreeMap<String, String> = std::env::vars().collect();
        values.insert("env".to_string(), Value::from_serialize(&env));
        values
    }
}

impl Default for TemplateTransform {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl CommandTransform for TemplateTransform {
    fn transform(&self, command: &str, ctx: &ExecutionContext) -> Result<String, TransformError> {
        if !command.contains("{{") && !command.contains("{%") {
            return Ok(command.to_string());
        }
        self.env
            .render_str(command, self.context(ctx))
            .map_err(|e| {
                RenderSnafu {
                    message: format!("Template error: {e}"),
                }
                .build()
            })
    }
}

#[cfg(test)]
#[path = "transform.test.rs"]
mod tests;

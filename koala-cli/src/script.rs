//! Call scripts: a JSON array of protocol calls replayed against one
//! document.
//!
//! ```json
//! [
//!   { "member": "createElement", "args": ["button"], "bind": "button" },
//!   { "target": "$document", "member": "body", "mode": "getter", "bind": "body" },
//!   { "target": "button", "member": "addEventListener",
//!     "args": ["click", { "recorder": "clicked" }] }
//! ]
//! ```
//!
//! `target` defaults to `$document` and `mode` to `method`. An argument is
//! a JSON literal, `{"ref": "<binding>"}` for a value bound by an earlier
//! call, or `{"recorder": "<label>"}` for a listener that prints each event
//! it receives. Recorders are created once per label, so passing the same
//! label to `removeEventListener` removes the listener added earlier.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use koala_bindings::{BindingContext, BindingResult, CallMode, ObjectRef, Value};
use koala_dom::{EventListener, NodeId};
use owo_colors::OwoColorize;
use serde::Deserialize;

/// The target name that refers to the initial document.
pub const DOCUMENT: &str = "$document";

/// One scripted call.
#[derive(Debug, Deserialize)]
pub struct Call {
    /// A binding name, or `$document`.
    #[serde(default = "document_target")]
    pub target: String,
    /// The member name; ignored by indexed modes.
    #[serde(default)]
    pub member: String,
    /// A call mode in kebab case, e.g. `indexed-getter`.
    #[serde(default = "method_mode")]
    pub mode: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Arg>,
    /// Bind the result under this name for later calls.
    pub bind: Option<String>,
}

fn document_target() -> String {
    DOCUMENT.to_string()
}

fn method_mode() -> String {
    "method".to_string()
}

/// A scripted argument.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// A value bound by an earlier call.
    Ref {
        /// The binding name.
        #[serde(rename = "ref")]
        name: String,
    },
    /// A listener that prints the events it receives.
    Recorder {
        /// Printed with each event.
        recorder: String,
        /// Call `preventDefault` on every event received.
        #[serde(default)]
        prevent_default: bool,
    },
    /// A JSON literal.
    Literal(serde_json::Value),
}

/// Parse a script.
///
/// # Errors
///
/// If `source` is not a JSON array of calls.
pub fn parse(source: &str) -> Result<Vec<Call>> {
    serde_json::from_str(source).context("script is not a JSON array of calls")
}

/// Replays calls and remembers their bound results.
pub struct Session {
    ctx: BindingContext,
    bindings: HashMap<String, Value>,
    recorders: HashMap<String, EventListener>,
    quiet: bool,
}

impl Session {
    /// A session over a fresh context.
    pub fn new(ctx: BindingContext, quiet: bool) -> Self {
        Self {
            ctx,
            bindings: HashMap::new(),
            recorders: HashMap::new(),
            quiet,
        }
    }

    /// The binding context.
    pub const fn context(&self) -> &BindingContext {
        &self.ctx
    }

    /// The binding context, mutably.
    pub const fn context_mut(&mut self) -> &mut BindingContext {
        &mut self.ctx
    }

    /// Run every call in order. Protocol failures are printed and the script
    /// continues; malformed calls stop it.
    ///
    /// # Errors
    ///
    /// On an unknown target or binding, an unknown mode, or an argument that
    /// cannot be converted.
    pub fn run(&mut self, calls: &[Call]) -> Result<usize> {
        let mut failures = 0;
        for (index, call) in calls.iter().enumerate() {
            let result = self
                .execute(call)
                .with_context(|| format!("call {index} ({}.{})", call.target, call.member))?;
            match result {
                Ok(value) => {
                    if !self.quiet {
                        println!(
                            "{} {}.{} {} {value}",
                            format!("[{index}]").dimmed(),
                            call.target,
                            call.member,
                            "->".green()
                        );
                    }
                    if let Some(name) = &call.bind {
                        let _ = self.bindings.insert(name.clone(), value);
                    }
                }
                Err(error) => {
                    failures += 1;
                    println!(
                        "{} {}.{} {} {}: {error}",
                        format!("[{index}]").dimmed(),
                        call.target,
                        call.member,
                        "!!".red(),
                        error.name().red().bold()
                    );
                }
            }
        }
        Ok(failures)
    }

    /// Run one call. The outer result is a script error, the inner one a
    /// protocol error.
    fn execute(&mut self, call: &Call) -> Result<BindingResult<Value>> {
        let target = self.target(&call.target)?;
        let mode = CallMode::from_str(&call.mode)
            .map_err(|_| anyhow::anyhow!("unknown call mode '{}'", call.mode))?;
        let args = call
            .args
            .iter()
            .map(|arg| self.argument(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.ctx.invoke_named(target, &call.member, mode, &args))
    }

    fn target(&self, name: &str) -> Result<ObjectRef> {
        if name == DOCUMENT {
            return Ok(self.ctx.document());
        }
        let value = self
            .bindings
            .get(name)
            .with_context(|| format!("no binding named '{name}'"))?;
        match value.as_object() {
            Some(object) => Ok(object),
            None => bail!("binding '{name}' is {value}, not a node or event"),
        }
    }

    fn argument(&mut self, arg: &Arg) -> Result<Value> {
        match arg {
            Arg::Ref { name } if name == DOCUMENT => Ok(Value::Node(NodeId::ROOT)),
            Arg::Ref { name } => self
                .bindings
                .get(name)
                .cloned()
                .with_context(|| format!("no binding named '{name}'")),
            Arg::Recorder {
                recorder,
                prevent_default,
            } => Ok(self
                .recorders
                .entry(recorder.clone())
                .or_insert_with(|| {
                    recorder_listener(&self.ctx, recorder.clone(), *prevent_default)
                })
                .clone()
                .into()),
            Arg::Literal(json) => literal(json),
        }
    }
}

/// A listener that prints each event it receives, reading it through the
/// protocol the way a script would.
fn recorder_listener(ctx: &BindingContext, label: String, prevent_default: bool) -> EventListener {
    ctx.listener(move |scope, event| {
        let mut read = |member: &str| scope.invoke_named(event, member, CallMode::Getter, &[]);
        let event_type = read("type")?;
        let current = read("currentTarget")?;
        let phase = read("eventPhase")?;
        println!(
            "    {} {label}: {event_type} at {current} (phase {phase})",
            "*".cyan()
        );
        if prevent_default {
            let _ = scope.invoke_named(event, "preventDefault", CallMode::Method, &[])?;
        }
        Ok(())
    })
}

fn literal(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(
            n.as_f64()
                .with_context(|| format!("{n} is not representable as a number"))?,
        ),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(literal).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(_) => {
            bail!("object literals are not supported; use {{\"ref\": ..}} or {{\"recorder\": ..}}")
        }
    })
}

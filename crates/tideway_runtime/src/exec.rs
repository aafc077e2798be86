//! The request executor.
//!
//! One [`Executor`] serves a whole process; each call to
//! [`Executor::execute`] builds a fresh [`StackMachine`], installs the
//! bootstrap context, pre-evaluates path parameters, feeds body lines one
//! at a time, then runs the balance check and the export protocol. A
//! failure is reported through the debug-depth-gated diagnostic path.
//! Metrics and the event record are emitted on every exit path.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error as ThisError;
use tideway_foundation::{Error, ErrorKind, Value};
use tideway_script::{Control, StackMachine, Outcome, WordRegistry};
use tracing::debug;

use crate::bootstrap::BootstrapManager;
use crate::serialize::stack_to_json;
use crate::sink::{
    available_memory, EventSink, ExecRecord, MetricsSink, NullEventSink, NullMetricsSink,
};

/// The symbol a bootstrap context binds to make a macro run at the start
/// of every request.
pub const BOOTSTRAP_SYMBOL: &str = "bootstrap";

/// One script execution request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Extra path segments carrying `name=script` parameter bindings,
    /// percent-encoded.
    pub path_info: Option<String>,
    /// The script body, one fragment per line.
    pub body: String,
    /// The execution credential, when the caller is authenticated.
    pub token: Option<String>,
}

impl ExecRequest {
    /// Creates a request from a script body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            path_info: None,
            body: body.into(),
            token: None,
        }
    }

    /// Attaches percent-encoded `name=script` path parameters.
    #[must_use]
    pub fn with_path_info(mut self, path_info: impl Into<String>) -> Self {
        self.path_info = Some(path_info.into());
        self
    }

    /// Attaches an execution credential.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// A successful execution: the final stack, serialized top-first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecResponse {
    /// The final stack as a JSON array, index 0 on top.
    pub stack: Json,
    /// Wall-clock execution time in nanoseconds.
    pub elapsed_nanos: u64,
}

/// A failed execution.
///
/// `stack` carries the diagnostic stack rendering and is present only
/// when the debug depth was positive at the time of failure.
#[derive(Debug, ThisError, Serialize)]
#[error("ERROR line #{line}: {message}")]
pub struct ExecFailure {
    /// One-based line number of the failing fragment; 0 when the failure
    /// happened before any body line ran.
    pub line: u64,
    /// The failure message, with the underlying cause appended when known.
    pub message: String,
    /// Wall-clock execution time in nanoseconds.
    pub elapsed_nanos: u64,
    /// Top-of-stack rendering, limited to the debug depth.
    pub stack: Option<Json>,
}

/// Drives script executions against a shared word registry.
pub struct Executor {
    registry: Arc<WordRegistry>,
    bootstrap: Option<Arc<BootstrapManager>>,
    events: Arc<dyn EventSink>,
    metrics: Arc<dyn MetricsSink>,
}

impl Executor {
    /// Creates an executor with no bootstrap and silent sinks.
    #[must_use]
    pub fn new(registry: Arc<WordRegistry>) -> Self {
        Self {
            registry,
            bootstrap: None,
            events: Arc::new(NullEventSink),
            metrics: Arc::new(NullMetricsSink),
        }
    }

    /// Installs a bootstrap manager.
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: Arc<BootstrapManager>) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    /// Installs an event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: impl EventSink + 'static) -> Self {
        self.events = Arc::new(events);
        self
    }

    /// Installs a metrics sink.
    #[must_use]
    pub fn with_metrics_sink(mut self, metrics: impl MetricsSink + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    /// Executes one request.
    ///
    /// # Errors
    /// Returns an [`ExecFailure`] naming the failing line. The metrics and
    /// event record are emitted whether or not the execution succeeded.
    pub fn execute(&self, request: &ExecRequest) -> Result<ExecResponse, ExecFailure> {
        let mut machine = StackMachine::new(Arc::clone(&self.registry));
        if let Some(token) = &request.token {
            machine
                .attributes_mut()
                .set_token(Some(Arc::from(token.as_str())));
        }

        // Script and per-line time accumulators feed the event record;
        // lines are appended before evaluation so a failing line is
        // already on record.
        let mut script_log = String::new();
        let mut time_log = String::new();

        let run = self.run(&mut machine, request, &mut script_log, &mut time_log);
        let elapsed_nanos = machine.elapsed_nanos();

        let result = match run {
            Ok(stack) => Ok(ExecResponse {
                stack,
                elapsed_nanos,
            }),
            Err((line, error)) => Err(Self::failure(&mut machine, line, &error, elapsed_nanos)),
        };

        self.finalize(&machine, &script_log, &time_log, result.as_ref().err());
        result
    }

    fn run(
        &self,
        machine: &mut StackMachine,
        request: &ExecRequest,
        script_log: &mut String,
        time_log: &mut String,
    ) -> Result<Json, (u64, Error)> {
        let mut lineno: u64 = 0;
        // Early termination anywhere skips every remaining fragment and
        // proceeds straight to the balance check and the export protocol.
        let mut stopped = false;

        if let Some(manager) = &self.bootstrap {
            let context = manager.current();
            machine.restore(&context);
            // A bootstrap context may bind a macro to run at the start of
            // every request.
            if let Ok(Value::Macro(body)) = machine.load(BOOTSTRAP_SYMBOL) {
                if machine.eval_macro(&body).map_err(|e| (lineno, e))? == Control::Stop {
                    debug!("early termination in bootstrap macro");
                    stopped = true;
                }
            }
        }

        if !stopped {
            if let Some(path_info) = &request.path_info {
                for segment in path_info.split('/').filter(|s| !s.is_empty()) {
                    let (name, script) = split_parameter(segment).map_err(|e| (lineno, e))?;
                    script_log.push_str("// @param ");
                    script_log.push_str(&name);
                    script_log.push('=');
                    script_log.push_str(&script);
                    script_log.push('\n');

                    // Evaluate the parameter script so the binding holds
                    // the resulting value, not its text.
                    if machine.exec(&script).map_err(|e| (lineno, e))? == Outcome::EarlyStopped {
                        debug!(param = %name, "early termination in path parameter");
                        stopped = true;
                        break;
                    }
                    let value = machine.pop().map_err(|e| (lineno, e))?;
                    machine.store(name, value);
                }
            }
        }

        machine.mark_elapsed();

        if !stopped {
            for line in request.body.lines() {
                lineno += 1;
                script_log.push_str(line);
                script_log.push('\n');

                let started = Instant::now();
                let outcome = machine.exec(line).map_err(|e| (lineno, e))?;
                let nanos = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
                time_log.push_str(&nanos.to_string());
                time_log.push('\n');

                if outcome == Outcome::EarlyStopped {
                    debug!(line = lineno, "early termination");
                    break;
                }
            }
        }

        machine.check_balanced().map_err(|e| (lineno, e))?;
        machine.apply_exports();

        Ok(stack_to_json(machine, None))
    }

    /// Builds the failure report along the debug-depth-gated path.
    ///
    /// The depth is read before any recovery push and incremented,
    /// saturating, for each value the recovery path adds, so the
    /// serialization covers exactly the recovery values plus the
    /// originally allowed levels.
    fn failure(
        machine: &mut StackMachine,
        line: u64,
        error: &Error,
        elapsed_nanos: u64,
    ) -> ExecFailure {
        let mut depth = machine.attributes().debug_depth();

        // Exports are best-effort on the failure path too
        if machine.apply_exports() {
            depth = depth.saturating_add(1);
        }

        let message = match &error.cause {
            Some(cause) => format!("{error} ({cause})"),
            None => error.to_string(),
        };

        let stack = if depth > 0 {
            machine.push(Value::String(Arc::from(
                format!("ERROR line #{line}: {message}").as_str(),
            )));
            depth = depth.saturating_add(1);
            let limit = usize::try_from(depth).unwrap_or(usize::MAX);
            Some(stack_to_json(machine, Some(limit)))
        } else {
            None
        };

        ExecFailure {
            line,
            message,
            elapsed_nanos,
            stack,
        }
    }

    fn finalize(
        &self,
        machine: &StackMachine,
        script_log: &str,
        time_log: &str,
        failure: Option<&ExecFailure>,
    ) {
        self.metrics.count_request();
        self.metrics.record_time_micros(machine.elapsed_nanos() / 1_000);
        self.metrics.record_ops(machine.attributes().ops());
        if let Some(bytes) = available_memory() {
            self.metrics.record_free_memory(bytes);
        }
        if failure.is_some() {
            self.metrics.count_error();
        }

        let token = if machine.attributes().is_authenticated() {
            machine.attributes().token().map(|t| t.as_ref().to_string())
        } else {
            None
        };
        let error = failure.map(ToString::to_string);
        self.events.record(&ExecRecord {
            script: script_log,
            timings: time_log,
            token: token.as_deref(),
            error: error.as_deref(),
        });
    }
}

fn split_parameter(segment: &str) -> Result<(String, String), Error> {
    let Some((name, script)) = segment.split_once('=') else {
        return Err(Error::new(ErrorKind::Syntax(format!(
            "malformed path parameter '{segment}'"
        ))));
    };
    Ok((percent_decode(name), percent_decode(script)))
}

/// Decodes `%XX` escapes and `+` as space. Malformed escapes pass
/// through verbatim.
#[must_use]
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

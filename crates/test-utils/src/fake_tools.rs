use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::fs::OpenOptions;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use jazzhands::errors::{JazzhandsError, Result};
use jazzhands::exec::{OutputTarget, ToolBackend, ToolInvocation, ToolOutput};

type Handler = Arc<dyn Fn(&ToolInvocation) -> ToolOutput + Send + Sync>;

/// Successful run printing `stdout`.
pub fn ok(stdout: &str) -> ToolOutput {
    ToolOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Failed run with the given exit code and stderr.
pub fn fail(code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// A fake tool backend that:
/// - records every invocation (clones share the record)
/// - answers with scripted output keyed by program file name, or success
/// - writes scripted stdout to `OutputTarget::AppendTo` files like a real
///   process would
/// - reports programs marked missing as not installed
#[derive(Clone, Default)]
pub struct FakeTools {
    invocations: Arc<Mutex<Vec<ToolInvocation>>>,
    spawned: Arc<Mutex<Vec<ToolInvocation>>>,
    missing: Arc<Mutex<HashSet<String>>>,
    handlers: Arc<Mutex<HashMap<String, Handler>>>,
}

impl fmt::Debug for FakeTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTools")
            .field("invocations", &self.invocations.lock().unwrap().len())
            .field("missing", &self.missing.lock().unwrap())
            .finish_non_exhaustive()
    }
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `program` (e.g. `babel`) is not installed.
    pub fn with_missing(self, program: &str) -> Self {
        self.missing.lock().unwrap().insert(program.to_string());
        self
    }

    /// Answer every run of `program` with `handler`.
    pub fn on<F>(self, program: &str, handler: F) -> Self
    where
        F: Fn(&ToolInvocation) -> ToolOutput + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap()
            .insert(program.to_string(), Arc::new(handler));
        self
    }

    /// Always answer `program` with `output`.
    pub fn respond(self, program: &str, output: ToolOutput) -> Self {
        self.on(program, move |_| output.clone())
    }

    /// Answer `program` with each output in turn; the last one repeats.
    pub fn respond_sequence(self, program: &str, outputs: Vec<ToolOutput>) -> Self {
        let queue = Mutex::new(VecDeque::from(outputs));
        self.on(program, move |_| {
            let mut queue = queue.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap_or_default()
            } else {
                queue.front().cloned().unwrap_or_else(|| ok(""))
            }
        })
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Invocations of one program, by file name.
    pub fn invocations_of(&self, program: &str) -> Vec<ToolInvocation> {
        self.invocations()
            .into_iter()
            .filter(|inv| inv.program_name() == program)
            .collect()
    }

    pub fn spawned(&self) -> Vec<ToolInvocation> {
        self.spawned.lock().unwrap().clone()
    }

    fn is_missing(&self, program: &Path) -> bool {
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.missing.lock().unwrap().contains(&name)
    }

    fn missing_error(invocation: &ToolInvocation) -> JazzhandsError {
        JazzhandsError::ToolMissing {
            tool: invocation.program_name(),
            program: invocation.program.display().to_string(),
            hint: "fake backend".to_string(),
        }
    }
}

impl ToolBackend for FakeTools {
    fn locate(&self, program: &Path) -> Option<PathBuf> {
        (!self.is_missing(program)).then(|| program.to_path_buf())
    }

    fn run(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput>> + Send + '_>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(invocation.clone());

            if self.is_missing(&invocation.program) {
                return Err(Self::missing_error(&invocation));
            }

            let handler = self
                .handlers
                .lock()
                .unwrap()
                .get(&invocation.program_name())
                .cloned();
            let mut output = match handler {
                Some(handler) => handler(&invocation),
                None => ok(""),
            };

            match &invocation.stdout {
                OutputTarget::AppendTo(path) => {
                    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                    file.write_all(output.stdout.as_bytes())?;
                    output.stdout.clear();
                }
                OutputTarget::Inherit => output.stdout.clear(),
                OutputTarget::Capture => {}
            }

            Ok(output)
        })
    }

    fn spawn_detached(&mut self, invocation: ToolInvocation) -> Result<()> {
        if self.is_missing(&invocation.program) {
            return Err(Self::missing_error(&invocation));
        }
        self.spawned.lock().unwrap().push(invocation);
        Ok(())
    }
}

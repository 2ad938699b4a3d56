use super::{Tool, str_arg};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DEFAULT_INTERPRETER: &str = "python3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the submitted snippet with a whitelisted set of builtins and prints a
/// single JSON report on stdout. User `print` output goes to stderr.
const SANDBOX_DRIVER: &str = r#"
import json, sys, traceback

def _print(*args, sep=" ", end="\n"):
    sys.stderr.write(sep.join(str(a) for a in args) + end)

ALLOWED = {
    "len": len, "range": range, "min": min, "max": max, "sum": sum,
    "abs": abs, "sorted": sorted, "float": float, "int": int, "str": str,
    "print": _print,
}

source = sys.stdin.read()
scope = {}
try:
    exec(source, {"__builtins__": ALLOWED}, scope)
except Exception:
    report = {"status": "error", "traceback": traceback.format_exc()}
else:
    if "result" in scope:
        report = {"status": "ok", "result": str(scope["result"])}
    else:
        report = {"status": "missing"}
sys.stdout.write(json.dumps(report))
"#;

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum SandboxReport {
    Ok { result: String },
    Missing,
    Error { traceback: String },
}

/// Executes small Python snippets for calculations.
///
/// The snippet must assign its answer to `result`.
pub struct CodeExecutionTool {
    interpreter: String,
    timeout: Duration,
}

impl Default for CodeExecutionTool {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl CodeExecutionTool {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(&self, code: &str) -> String {
        if code.trim().is_empty() {
            return "Error: 'code' field missing.".to_string();
        }
        match tokio::time::timeout(self.timeout, self.run_sandbox(code)).await {
            Ok(Ok(SandboxReport::Ok { result })) => result,
            Ok(Ok(SandboxReport::Missing)) => {
                "Error: Code executed but no `result` variable was set.".to_string()
            }
            Ok(Ok(SandboxReport::Error { traceback })) => {
                format!("Execution Error:\n{}", traceback)
            }
            Ok(Err(e)) => {
                tracing::warn!(interpreter = %self.interpreter, error = %e, "sandbox failed");
                format!("Execution Error:\n{}", e)
            }
            Err(_) => format!("Execution Error:\nTimed out after {:?}", self.timeout),
        }
    }

    async fn run_sandbox(&self, code: &str) -> anyhow::Result<SandboxReport> {
        let mut child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(SANDBOX_DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(stdout.trim()).map_err(|e| {
            anyhow::anyhow!(
                "{} (stderr: {})",
                e,
                String::from_utf8_lossy(&output.stderr).trim()
            )
        })
    }
}

#[async_trait]
impl Tool for CodeExecutionTool {
    fn name(&self) -> &'static str {
        "code_execution_tool"
    }

    fn description(&self) -> &'static str {
        "Executes a small Python snippet for calculations. Assign the answer to `result`."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {"type": "string", "description": "Python code that sets `result`."}
            },
            "required": ["code"]
        })
    }

    async fn call(&self, args: &Value) -> String {
        self.execute(str_arg(args, "code")).await
    }
}

//! Runs the trained model as a child process: JSON vector on stdin, score
//! on stdout.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use common::{Error, FeatureVector};
use tracing::{debug, warn};

use crate::{parse_score, ScoringBackend};

#[derive(Debug, Clone)]
pub struct SubprocessBackend {
    interpreter: String,
    script: String,
}

impl SubprocessBackend {
    pub fn new(interpreter: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }
}

impl ScoringBackend for SubprocessBackend {
    fn name(&self) -> &str {
        "subprocess"
    }

    fn score(&self, vector: &FeatureVector) -> Result<f64, Error> {
        if !vector.is_complete() {
            return Err(Error::PredictionInvocation(
                "refusing to score an incomplete feature vector".into(),
            ));
        }

        let payload = serde_json::to_vec(vector)?;
        debug!("Running {} {}", self.interpreter, self.script);

        let mut child = Command::new(&self.interpreter)
            .arg(&self.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::PredictionInvocation(format!("failed to start {}: {e}", self.interpreter))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // The child may exit without reading; its status decides.
            match stdin.write_all(&payload) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    warn!("Model process closed stdin before reading input")
                }
                other => other?,
            }
        }

        let output = child.wait_with_output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(500).collect();
            return Err(Error::PredictionInvocation(format!(
                "model exited with {}: {}",
                output.status, excerpt
            )));
        }

        parse_score(&stdout).ok_or_else(|| {
            Error::PredictionInvocation(format!(
                "no score in model output: {:?}",
                stdout.trim().chars().take(200).collect::<String>()
            ))
        })
    }
}

use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use crate::{
    DetectionModel, ModelHandle, TrainOutcome, TrainRequest, ValidateOutcome, ValidateRequest,
};

const RESULTS_SAVED_MARKER: &str = "Results saved to ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UltralyticsCliConfig {
    pub executable: String,
}

/// Runs training and validation through the Ultralytics `yolo` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UltralyticsCliModel {
    config: UltralyticsCliConfig,
    handle: ModelHandle,
}

impl UltralyticsCliModel {
    pub fn new(handle: ModelHandle, config: UltralyticsCliConfig) -> Result<Self> {
        if config.executable.trim().is_empty() {
            bail!("ultralytics cli executable is empty");
        }
        Ok(Self { config, handle })
    }

    fn run(&self, args: Vec<OsString>) -> Result<Option<PathBuf>> {
        let executable = &self.config.executable;
        let rendered = args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(executable = %executable, args = %rendered, "spawning ultralytics cli");

        let mut child = Command::new(executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn ultralytics cli '{executable}'"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("failed to capture ultralytics cli stdout"))?;

        let forwarded = forward_cli_output(BufReader::new(stdout), &mut std::io::stdout().lock());
        let run_dir = match forwarded {
            Ok(run_dir) => run_dir,
            Err(error) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(error);
            }
        };

        let status = child
            .wait()
            .with_context(|| format!("failed while waiting for ultralytics cli '{executable}'"))?;
        if !status.success() {
            let status = status
                .code()
                .map(|value| value.to_string())
                .unwrap_or_else(|| "signal".to_string());
            bail!("ultralytics cli '{executable}' failed with status {status}");
        }

        if let Some(run_dir) = &run_dir {
            info!(run_dir = %run_dir.display(), "ultralytics cli reported results directory");
        }
        Ok(run_dir)
    }
}

impl DetectionModel for UltralyticsCliModel {
    fn train(&mut self, request: &TrainRequest) -> Result<TrainOutcome> {
        let run_dir = self.run(render_train_args(self.handle.path(), request))?;
        Ok(TrainOutcome { run_dir })
    }

    fn validate(&mut self, request: &ValidateRequest) -> Result<ValidateOutcome> {
        let run_dir = self.run(render_validate_args(self.handle.path(), request))?;
        Ok(ValidateOutcome { run_dir })
    }
}

/// Argument vector for `yolo train`.
pub fn render_train_args(model: &Path, request: &TrainRequest) -> Vec<OsString> {
    vec![
        OsString::from("train"),
        key_value("model", model.as_os_str()),
        key_value("data", request.data.as_ref()),
        key_value("epochs", request.epochs.to_string().as_ref()),
        key_value("imgsz", request.imgsz.to_string().as_ref()),
        key_value("device", request.device.as_ref()),
        key_value("batch", request.batch.to_string().as_ref()),
        key_value("copy_paste", request.copy_paste.to_string().as_ref()),
        key_value("project", request.project.as_os_str()),
        key_value("name", request.name.as_ref()),
    ]
}

/// Argument vector for `yolo val`.
pub fn render_validate_args(model: &Path, request: &ValidateRequest) -> Vec<OsString> {
    vec![
        OsString::from("val"),
        key_value("model", model.as_os_str()),
        key_value("data", request.data.as_ref()),
        key_value("imgsz", request.imgsz.to_string().as_ref()),
        key_value("device", request.device.as_ref()),
        key_value("plots", python_bool(request.plots).as_ref()),
        key_value("save_json", python_bool(request.save_json).as_ref()),
        key_value("project", request.project.as_os_str()),
        key_value("name", request.name.as_ref()),
    ]
}

// Paths keep their raw bytes so the child sees exactly the checked file.
fn key_value(key: &str, value: &OsStr) -> OsString {
    let mut arg = OsString::with_capacity(key.len() + 1 + value.len());
    arg.push(key);
    arg.push("=");
    arg.push(value);
    arg
}

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Copies child output to `sink` line by line and returns the last results
/// directory announced on it.
pub fn forward_cli_output<R, W>(mut reader: R, sink: &mut W) -> Result<Option<PathBuf>>
where
    R: BufRead,
    W: Write,
{
    let mut run_dir = None;
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .context("failed to read ultralytics cli output")?;
        if read == 0 {
            break;
        }
        sink.write_all(&line)
            .context("failed to forward ultralytics cli output")?;
        sink.flush()
            .context("failed to forward ultralytics cli output")?;

        let text = String::from_utf8_lossy(&line);
        if let Some(dir) = parse_results_dir(&text) {
            run_dir = Some(dir);
        }
    }
    Ok(run_dir)
}

/// Extracts `<dir>` from a `Results saved to <dir>` log line.
pub fn parse_results_dir(line: &str) -> Option<PathBuf> {
    let plain = strip_ansi_escapes(line);
    let (_, rest) = plain.split_once(RESULTS_SAVED_MARKER)?;
    let dir = rest.trim();
    if dir.is_empty() {
        return None;
    }
    Some(PathBuf::from(dir))
}

fn strip_ansi_escapes(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\u{1b}' {
            plain.push(ch);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            // CSI sequences end with a byte in 0x40..=0x7e.
            for next in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&next) {
                    break;
                }
            }
        }
    }
    plain
}

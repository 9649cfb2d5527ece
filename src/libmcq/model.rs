use crate::libmcq::parse::Choice;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model configured")]
    Unavailable,
    #[error("cannot run model program {program:?}: {source}")]
    Spawn { program: PathBuf, source: io::Error },
    #[error("model program {program:?} exited with {status}: {stderr}")]
    ExitStatus {
        program: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("no recorded response for {0:?}")]
    MissingResponse(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model reported an error: {0}")]
    ErrorResponse(String),
}

/// Something that answers a question about an image with free text.
pub trait AnswerSource {
    fn name(&self) -> &str;
    fn answer(&mut self, image: &Path, prompt: &str) -> Result<String, ModelError>;
}

/// Uniform pick over A-D, ignoring the image and prompt.
pub struct RandomBaseline<R: Rng = StdRng> {
    rng: R,
}

impl RandomBaseline<StdRng> {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl<R: Rng> RandomBaseline<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> AnswerSource for RandomBaseline<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn answer(&mut self, _image: &Path, _prompt: &str) -> Result<String, ModelError> {
        let choice = Choice::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default();
        Ok(choice.to_string())
    }
}

/// Replays previously recorded model output, keyed by image file name.
pub struct ReplayModel {
    responses: HashMap<String, String>,
}

impl ReplayModel {
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self { responses }
    }
}

impl AnswerSource for ReplayModel {
    fn name(&self) -> &str {
        "replay"
    }

    fn answer(&mut self, image: &Path, _prompt: &str) -> Result<String, ModelError> {
        let image_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.responses
            .get(&image_name)
            .cloned()
            .ok_or(ModelError::MissingResponse(image_name))
    }
}

/// Runs `<program> <image>` with the prompt on stdin; stdout is the answer.
pub struct CommandModel {
    program: PathBuf,
}

impl CommandModel {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    fn spawn_err(&self, source: io::Error) -> ModelError {
        ModelError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl AnswerSource for CommandModel {
    fn name(&self) -> &str {
        "command"
    }

    fn answer(&mut self, image: &Path, prompt: &str) -> Result<String, ModelError> {
        debug!("[Model] {:?} {:?}", self.program, image);
        let mut child = Command::new(&self.program)
            .arg(image)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_err(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(prompt.as_bytes()) {
                Ok(()) => {}
                // program exited without reading the prompt; its status decides
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("[Model] {:?} closed stdin early", self.program)
                }
                Err(e) => return Err(self.spawn_err(e)),
            }
        }
        let output = child.wait_with_output().map_err(|e| self.spawn_err(e))?;

        if !output.status.success() {
            return Err(ModelError::ExitStatus {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Stand-in when no model is wired up: every call fails.
pub struct UnconfiguredModel;

impl AnswerSource for UnconfiguredModel {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn answer(&mut self, _image: &Path, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Unavailable)
    }
}

//! Scripted stand-ins for the pipeline's process and prompt seams.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use yaktaa_release::error::{PromptError, ToolError};
use yaktaa_release::prompt::Prompter;
use yaktaa_release::tools::{ToolOutput, ToolRunner, render_command};

struct Rule {
    pattern: String,
    responses: Mutex<VecDeque<(i32, String, String)>>,
}

/// Runner that answers invocations from canned responses.
///
/// Rules match by substring against the rendered command line, in
/// registration order, so register the more specific pattern first when one
/// command line would match several. Responses for a rule replay in order
/// and the last one repeats. Commands matching no rule succeed with empty
/// output.
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register a canned response for command lines containing `pattern`.
    pub fn on(self, pattern: &str, code: i32, stdout: &str) -> Self {
        self.on_with_stderr(pattern, code, stdout, "")
    }

    /// Register a canned response with stderr content.
    pub fn on_with_stderr(mut self, pattern: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        let response = (code, stdout.to_string(), stderr.to_string());
        if let Some(rule) = self.rules.iter().find(|r| r.pattern == pattern) {
            rule.responses.lock().unwrap().push_back(response);
        } else {
            self.rules.push(Rule {
                pattern: pattern.to_string(),
                responses: Mutex::new(VecDeque::from([response])),
            });
        }
        self
    }

    /// Every rendered command line this runner has executed, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many executed command lines contain `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.contains(pattern))
            .count()
    }

    fn respond(&self, command: &str) -> (i32, String, String) {
        self.calls.lock().unwrap().push(command.to_string());
        for rule in &self.rules {
            if command.contains(&rule.pattern) {
                let mut responses = rule.responses.lock().unwrap();
                return if responses.len() > 1 {
                    responses.pop_front().unwrap()
                } else {
                    responses.front().cloned().unwrap()
                };
            }
        }
        (0, String::new(), String::new())
    }
}

impl ToolRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[&str],
        _cwd: &Path,
    ) -> Result<ToolOutput, ToolError> {
        let command = render_command(program, args);
        let (code, stdout, stderr) = self.respond(&command);
        Ok(ToolOutput {
            command,
            code: Some(code),
            stdout,
            stderr,
        })
    }

    async fn run_interactive(
        &self,
        program: &Path,
        args: &[&str],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError> {
        self.run(program, args, cwd).await
    }
}

/// Prompter that answers from queued values.
///
/// Inputs fall back to the caller's default when the queue is empty;
/// confirmations fall back to the caller's default.
pub struct ScriptedPrompter {
    inputs: Mutex<VecDeque<String>>,
    confirms: Mutex<VecDeque<bool>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self {
            inputs: Mutex::new(VecDeque::new()),
            confirms: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_input(self, value: &str) -> Self {
        self.inputs.lock().unwrap().push_back(value.to_string());
        self
    }

    pub fn with_confirm(self, value: bool) -> Self {
        self.confirms.lock().unwrap().push_back(value);
        self
    }

    /// How many queued inputs were never consumed.
    pub fn unconsumed_inputs(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        if let Some(value) = self.inputs.lock().unwrap().pop_front() {
            return Ok(value);
        }
        match default {
            Some(value) => Ok(value.to_string()),
            None => Err(PromptError::NonInteractive {
                field: message.to_string(),
            }),
        }
    }

    fn confirm(&self, _message: &str, default: bool) -> Result<bool, PromptError> {
        Ok(self
            .confirms
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(default))
    }
}

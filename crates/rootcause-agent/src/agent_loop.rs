//! Agent loop — ask the model, run its tool blocks, feed the results back.
//!
//! One `process` call is a strictly sequential state machine:
//!
//! 1. augment the prompt with system info and push it as a user turn
//! 2. call the model with the whole history
//! 3. no fenced block in the answer → done
//! 4. otherwise run every block through the registry and push the feedback
//! 5. repeat until the attempt ceiling or a stop request

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::{debug, error, info, warn};

use rootcause_core::config::Config;
use rootcause_core::types::{ConversationTurn, Role};
use rootcause_core::utils::expand_home;
use rootcause_providers::traits::LlmProvider;

use crate::blocks::{extract_blocks, has_fence, remove_blocks};
use crate::context::ContextBuilder;
use crate::memory::{ConversationMemory, Memory};
use crate::tools::ToolRegistry;

/// Answer returned when the attempt ceiling is reached.
pub const EXHAUSTED_MESSAGE: &str = "I'm sorry, I couldn't find the root cause within the limit.";

/// Default ceiling on model rounds per `process` call.
pub const DEFAULT_MAX_ATTEMPTS: usize = 15;

pub const STATUS_THINKING: &str = "Thinking...";
pub const STATUS_EXECUTING: &str = "Executing tools...";
pub const STATUS_CORRECTING: &str = "Correcting...";
pub const STATUS_READY: &str = "Ready";

// ─────────────────────────────────────────────
// State
// ─────────────────────────────────────────────

/// How a `process` call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The model answered without any fenced block.
    Answered,
    /// The attempt ceiling was reached.
    Exhausted,
    /// A stop was requested.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentReply {
    pub answer: String,
    pub reasoning: String,
    pub termination: Termination,
}

/// Loop state, reset at the start of every `process` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentState {
    pub attempt: usize,
    pub max_attempts: usize,
    pub stop_requested: bool,
    pub last_answer: String,
    pub last_reasoning: String,
    pub status_message: String,
}

/// Cooperative stop flag, polled at loop boundaries.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ─────────────────────────────────────────────
// RcaAgent
// ─────────────────────────────────────────────

pub struct RcaAgent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    context: ContextBuilder,
    memory: Box<dyn ConversationMemory>,
    state: AgentState,
    stop: StopHandle,
}

impl RcaAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        context: ContextBuilder,
        memory: Box<dyn ConversationMemory>,
        max_attempts: usize,
    ) -> Self {
        info!(
            model = provider.model(),
            provider = provider.display_name(),
            tools = tools.len(),
            max_attempts,
            "rca agent initialized"
        );
        Self {
            provider,
            tools,
            context,
            memory,
            state: AgentState {
                max_attempts,
                status_message: STATUS_READY.to_string(),
                ..Default::default()
            },
            stop: StopHandle::new(),
        }
    }

    /// Agent with the Parquet tools over `work_dir` and the configured
    /// (or built-in) system prompt.
    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        config: &Config,
        work_dir: PathBuf,
    ) -> Result<Self> {
        let tools = ToolRegistry::rca(work_dir.clone(), &config.tools);
        let context = ContextBuilder::new(work_dir, &config.agent.name)
            .with_problem_file(&config.agent.problem_file);

        let prompt_path = config.agent.prompt_path.as_deref().map(expand_home);
        let system_prompt = context.system_prompt(prompt_path.as_deref(), &tools)?;
        let memory = Memory::new(Some(system_prompt));

        Ok(Self::new(
            provider,
            tools,
            context,
            Box::new(memory),
            config.agent.max_attempts,
        ))
    }

    /// Replace the stop flag, e.g. to share one with a signal handler.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn history(&self) -> Vec<ConversationTurn> {
        self.memory.get()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn set_status(&mut self, status: &str) {
        debug!(status, attempt = self.state.attempt, "status");
        self.state.status_message = status.to_string();
    }

    fn stop_observed(&mut self) -> bool {
        if self.stop.is_stop_requested() {
            self.state.stop_requested = true;
        }
        self.state.stop_requested
    }

    /// Run the loop for one question.
    ///
    /// A stop requested before the call is honored at the first checkpoint;
    /// the flag is cleared once a run ends as `Stopped`. Model errors
    /// propagate; everything already pushed to memory stays readable through
    /// [`RcaAgent::history`].
    pub async fn process(&mut self, prompt: &str) -> Result<AgentReply> {
        self.state = AgentState {
            max_attempts: self.state.max_attempts,
            ..Default::default()
        };

        let prompt = self.context.augment(prompt);
        self.memory.push(Role::User, &prompt);

        let termination = loop {
            if self.stop_observed() {
                break Termination::Stopped;
            }
            if self.state.attempt >= self.state.max_attempts {
                break Termination::Exhausted;
            }

            self.set_status(STATUS_THINKING);
            let history = self.memory.get();
            let response = match self.provider.generate(&history).await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, attempt = self.state.attempt, "model call failed");
                    return Err(e).context("model call failed");
                }
            };

            self.memory.push(Role::Assistant, &response.answer);
            self.state.last_reasoning = response.reasoning;

            if self.stop_observed() {
                break Termination::Stopped;
            }

            if !has_fence(&response.answer) {
                self.state.last_answer = response.answer;
                tokio::task::yield_now().await;
                break Termination::Answered;
            }

            self.set_status(STATUS_EXECUTING);
            let blocks = extract_blocks(&response.answer);
            info!(
                attempt = self.state.attempt + 1,
                blocks = blocks.len(),
                "executing tool blocks"
            );
            let report = self.tools.execute_blocks(&blocks).await;
            info!(success = report.success, tools = report.executed, "execution result");

            self.state.last_answer = remove_blocks(&response.answer);
            tokio::task::yield_now().await;

            if !report.feedback.is_empty() {
                self.memory.push(Role::User, &report.feedback);
            }

            if !report.success {
                warn!(feedback = %report.feedback, "execution failure");
                self.set_status(STATUS_CORRECTING);
            }

            self.state.attempt += 1;
        };

        self.set_status(STATUS_READY);
        if termination == Termination::Stopped {
            self.stop.reset();
        }

        let answer = match termination {
            Termination::Exhausted => {
                warn!(max_attempts = self.state.max_attempts, "attempt ceiling reached");
                self.state.last_answer = EXHAUSTED_MESSAGE.to_string();
                EXHAUSTED_MESSAGE.to_string()
            }
            Termination::Answered | Termination::Stopped => self.state.last_answer.clone(),
        };

        info!(?termination, attempts = self.state.attempt, "process finished");

        Ok(AgentReply {
            answer,
            reasoning: self.state.last_reasoning.clone(),
            termination,
        })
    }
}



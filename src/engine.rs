//! Answer engine
//!
//! Drives the bounded tool-execution loop: send the question to the oracle
//! with the tool registry, execute the tool it picks, feed the result back,
//! and repeat until the oracle answers in plain text or the turn budget runs
//! out. The engine never returns an error to the caller; every failure mode
//! collapses to a fixed apology answer.

use std::sync::Arc;

use crate::catalog::CatalogTransport;
use crate::config::EngineConfig;
use crate::governance::GovernanceFlags;
use crate::llm::{CompletionRequest, ContentBlock, LlmClient, Message, ToolResult};
use crate::prompt::{self, ThreadMessage};
use crate::tools::{CatalogTool, ToolDispatcher};

/// Answer returned when the oracle or catalog failed mid-conversation.
const FAILURE_ANSWER: &str = "I wasn't able to complete that request. Please try again in a moment.";

/// Answer returned when the turn budget ran out before a plain-text answer.
const BUDGET_ANSWER: &str =
    "I couldn't find a complete answer within the allowed number of catalog lookups. Try narrowing the question.";

/// Where the engine is within one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    AwaitingModel,
    ExecutingTool,
    Done,
    Failed,
}

fn advance(state: &mut TurnState, next: TurnState) {
    log::debug!("engine state {:?} -> {:?}", state, next);
    *state = next;
}

/// Final answer for one question
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub flags: GovernanceFlags,
    pub outcome: AnswerOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Complete,
    Failed(String),
}

/// The bounded question-answering loop over oracle and catalog.
pub struct AnswerEngine<L: LlmClient, T: CatalogTransport> {
    llm: Arc<L>,
    dispatcher: ToolDispatcher<T>,
    turn_budget: u32,
    max_tokens: u32,
}

impl<L: LlmClient, T: CatalogTransport> AnswerEngine<L, T> {
    pub fn new(llm: Arc<L>, dispatcher: ToolDispatcher<T>, config: &EngineConfig, max_tokens: u32) -> Self {
        Self {
            llm,
            dispatcher,
            turn_budget: config.turn_budget.max(1),
            max_tokens,
        }
    }

    /// Answer one question. Governance flags accumulate across every tool
    /// executed on the way to the answer.
    pub async fn answer(&self, question: &str, history: &[ThreadMessage]) -> Answer {
        let mut messages = vec![Message::user(prompt::render_question(question, history))];
        let mut flags = GovernanceFlags::new();
        let mut state = TurnState::AwaitingModel;

        for turn in 1..=self.turn_budget {
            let request = CompletionRequest::new(prompt::SYSTEM_PROMPT)
                .with_messages(messages.clone())
                .with_tools(CatalogTool::definitions())
                .with_max_tokens(self.max_tokens);

            let response = match self.llm.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    log::error!("oracle failed on turn {}: {}", turn, e);
                    advance(&mut state, TurnState::Failed);
                    return Answer {
                        text: FAILURE_ANSWER.to_string(),
                        flags,
                        outcome: AnswerOutcome::Failed(e.to_string()),
                    };
                }
            };

            if response.tool_calls.is_empty() {
                advance(&mut state, TurnState::Done);
                if response.content.trim().is_empty() {
                    log::error!("oracle returned an empty answer on turn {}", turn);
                    return Answer {
                        text: FAILURE_ANSWER.to_string(),
                        flags,
                        outcome: AnswerOutcome::Failed("empty completion".to_string()),
                    };
                }
                log::info!("answered after {} turn(s)", turn);
                return Answer {
                    text: response.content,
                    flags,
                    outcome: AnswerOutcome::Complete,
                };
            }

            advance(&mut state, TurnState::ExecutingTool);

            // Replay the assistant turn verbatim so every tool_use id has a
            // matching tool_result in the next request.
            let mut blocks = Vec::new();
            if !response.content.is_empty() {
                blocks.push(ContentBlock::Text {
                    text: response.content.clone(),
                });
            }
            for call in &response.tool_calls {
                blocks.push(ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                });
            }
            messages.push(Message::assistant_blocks(blocks));

            // One tool per turn. The first call runs; siblings get error
            // results so the oracle re-issues them one at a time.
            let mut results = Vec::with_capacity(response.tool_calls.len());
            let executed = &response.tool_calls[0];
            let outcome = self.dispatcher.dispatch(executed).await;
            flags.merge(&outcome.flags);
            results.push(if outcome.is_error {
                ToolResult::error(&executed.id, outcome.content)
            } else {
                ToolResult::success(&executed.id, outcome.content)
            });

            for sibling in &response.tool_calls[1..] {
                log::warn!("deferring extra tool call {} on turn {}", sibling.name, turn);
                results.push(ToolResult::error(
                    &sibling.id,
                    "Error: only one tool call may be executed per turn; re-issue this call on its own",
                ));
            }

            messages.push(Message::tool_results(results));
            advance(&mut state, TurnState::AwaitingModel);
        }

        log::warn!("turn budget of {} exhausted without an answer", self.turn_budget);
        advance(&mut state, TurnState::Failed);
        Answer {
            text: BUDGET_ANSWER.to_string(),
            flags,
            outcome: AnswerOutcome::Failed("turn budget exhausted".to_string()),
        }
    }
}

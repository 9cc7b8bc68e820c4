//! Run Turn use case
//!
//! Orchestrates one user turn through the fixed three-stage council
//! pipeline: parallel Stage 1 answers, anonymized Stage 2 peer ranking,
//! and the chairman's Stage 3 synthesis. Progress is pushed through an
//! [`EventSink`] as calls settle; the final state is also returned as a
//! [`TurnOutcome`] for non-streaming callers.
//!
//! Failure discipline: a single model's failure or timeout is recorded
//! as data and never aborts a stage. Only pipeline-level faults (empty
//! council, invalid chairman, chairman call failure, storage faults)
//! terminate the turn, with a terminal `error` event.

use crate::config::CouncilConfig;
use crate::ports::conversation_store::{ConversationStore, StorageError};
use crate::ports::event_sink::{EventSink, NoSink};
use crate::ports::llm_gateway::{ChatMessage, CompletionRequest, GatewayError, LlmGateway};
use council_domain::{
    aggregate_rankings, parse_ranking, validate_images, AggregateEntry, Conversation,
    ConversationId, CouncilEvent, CouncilPrompt, DomainError, Label, LabelMap, Message, Model,
    Question, Stage1Answer, Stage2Critique, Stage2CompleteMeta, Stage2StartMeta, TitleData,
    TurnId,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Errors that terminate a turn
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(#[source] GatewayError),
}

/// Input for the RunTurn use case
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    /// Identity of this turn; events are tagged with it
    pub turn: TurnId,
    /// Conversation the question belongs to
    pub conversation: ConversationId,
    /// The user question
    pub question: Question,
    /// Optional image attachments as base64 data URLs
    pub images: Vec<String>,
    /// Configuration snapshot taken at turn start. Later configuration
    /// updates must not affect this turn.
    pub config: Arc<CouncilConfig>,
}

impl RunTurnInput {
    pub fn new(
        conversation: ConversationId,
        question: Question,
        config: Arc<CouncilConfig>,
    ) -> Self {
        Self {
            turn: TurnId::next(),
            conversation,
            question,
            images: Vec::new(),
            config,
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Final state of a completed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: TurnId,
    /// Successful Stage 1 answers, in council order
    pub stage1: Vec<Stage1Answer>,
    /// Successful Stage 2 critiques, in council order
    pub stage2: Vec<Stage2Critique>,
    /// The fixed label-to-model bijection used for peer review
    pub label_to_model: LabelMap,
    /// Leaderboard derived from the parsed critiques
    pub aggregate: Vec<AggregateEntry>,
    /// The chairman's synthesis
    pub final_answer: String,
    /// Generated conversation title (first message only)
    pub title: Option<String>,
}

/// Use case for running one council turn
pub struct RunTurnUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    store: Arc<dyn ConversationStore>,
}

impl<G: LlmGateway + 'static> RunTurnUseCase<G> {
    pub fn new(gateway: Arc<G>, store: Arc<dyn ConversationStore>) -> Self {
        Self { gateway, store }
    }

    /// Execute the turn without event streaming
    pub async fn execute(&self, input: RunTurnInput) -> Result<TurnOutcome, RunTurnError> {
        self.execute_with_events(input, &NoSink).await
    }

    /// Execute the turn, streaming progress through `sink`.
    ///
    /// Input validation failures are rejected before anything is
    /// dispatched and produce no events. Pipeline-level failures emit a
    /// terminal `error` event; partial results already streamed remain
    /// valid for display.
    pub async fn execute_with_events(
        &self,
        input: RunTurnInput,
        sink: &dyn EventSink,
    ) -> Result<TurnOutcome, RunTurnError> {
        validate_images(&input.images)?;

        let turn = input.turn;
        match self.run_pipeline(&input, sink).await {
            Ok(outcome) => {
                sink.emit(turn, CouncilEvent::Complete);
                Ok(outcome)
            }
            Err(e) => {
                warn!("Turn {} aborted: {}", turn, e);
                sink.emit(
                    turn,
                    CouncilEvent::Error {
                        message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        input: &RunTurnInput,
        sink: &dyn EventSink,
    ) -> Result<TurnOutcome, RunTurnError> {
        input.config.validate()?;

        let conversation = self.store.get(&input.conversation).await?;
        let is_first_message = conversation.is_empty();
        let history = build_history(&conversation, input);

        info!(
            "Starting council turn {} with {} models (first: {})",
            input.turn,
            input.config.council.len(),
            is_first_message
        );

        self.store
            .append_message(
                &input.conversation,
                Message::user(input.question.content(), input.images.clone()),
            )
            .await?;

        // Title generation runs concurrently with the stages
        let title_task = is_first_message.then(|| self.spawn_title_task(input));

        let stage1 = self.stage1_collect(input, &history, sink).await?;
        let (stage2, label_map, aggregate) = self.stage2_collect(input, &stage1, sink).await;
        let final_answer = self
            .stage3_synthesize(input, &stage1, &aggregate, sink)
            .await?;

        let title = self.finish_title(input, title_task, sink).await;

        self.store
            .append_message(
                &input.conversation,
                Message::assistant(stage1.clone(), stage2.clone(), final_answer.clone()),
            )
            .await?;

        info!("Council turn {} complete", input.turn);

        Ok(TurnOutcome {
            turn: input.turn,
            stage1,
            stage2,
            label_to_model: label_map,
            aggregate,
            final_answer,
            title,
        })
    }

    /// Stage 1: fan the question out to all council models.
    ///
    /// All calls run concurrently; arrival events are emitted as each
    /// settles, in whatever order they settle. The completion event
    /// carries only successes, in council order.
    async fn stage1_collect(
        &self,
        input: &RunTurnInput,
        history: &[ChatMessage],
        sink: &dyn EventSink,
    ) -> Result<Vec<Stage1Answer>, RunTurnError> {
        let council = &input.config.council;
        info!("Stage 1: collecting answers from {} models", council.len());
        sink.emit(
            input.turn,
            CouncilEvent::Stage1Start {
                models: council.clone(),
            },
        );

        let mut join_set = JoinSet::new();
        for model in council {
            let gateway = Arc::clone(&self.gateway);
            let model = model.clone();
            let request = CompletionRequest::new(history.to_vec(), input.config.request_timeout())
                .with_reasoning(input.config.reasoning_for(&model));

            join_set.spawn(async move {
                let result = gateway.complete(&model, request).await;
                (model, result)
            });
        }

        let mut settled: HashMap<Model, Stage1Answer> = HashMap::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((model, Ok(response))) => {
                    debug!("Stage 1: {} responded", model);
                    let answer = Stage1Answer::success(model.clone(), response);
                    sink.emit(
                        input.turn,
                        CouncilEvent::Stage1Response {
                            data: answer.clone(),
                        },
                    );
                    settled.insert(model, answer);
                }
                Ok((model, Err(e))) => {
                    warn!("Stage 1: {} failed: {}", model, e);
                    let answer = Stage1Answer::failure(model.clone());
                    sink.emit(
                        input.turn,
                        CouncilEvent::Stage1Response {
                            data: answer.clone(),
                        },
                    );
                    settled.insert(model, answer);
                }
                Err(e) => {
                    warn!("Stage 1 task join error: {}", e);
                }
            }
        }

        // Authoritative list: successes only, in council order
        let successes: Vec<Stage1Answer> = council
            .iter()
            .filter_map(|m| settled.get(m))
            .filter(|a| a.is_success())
            .cloned()
            .collect();

        info!("Stage 1 complete: {} answers", successes.len());
        sink.emit(
            input.turn,
            CouncilEvent::Stage1Complete {
                data: successes.clone(),
            },
        );

        if successes.is_empty() {
            return Err(DomainError::AllModelsFailed.into());
        }

        Ok(successes)
    }

    /// Stage 2: each council model ranks the anonymized answers.
    ///
    /// The label map is built exactly once, from the final Stage 1 list;
    /// reviewers see only opaque labels. A model's own answer is included
    /// in the set it ranks.
    async fn stage2_collect(
        &self,
        input: &RunTurnInput,
        stage1: &[Stage1Answer],
        sink: &dyn EventSink,
    ) -> (Vec<Stage2Critique>, LabelMap, Vec<AggregateEntry>) {
        let council = &input.config.council;
        let label_map = LabelMap::assign(stage1);

        let anonymized: Vec<(Label, &str)> = stage1
            .iter()
            .enumerate()
            .map(|(i, a)| (Label::from_index(i), a.text()))
            .collect();
        let ranking_prompt = CouncilPrompt::ranking_prompt(input.question.content(), &anonymized);

        info!("Stage 2: collecting rankings from {} models", council.len());
        sink.emit(
            input.turn,
            CouncilEvent::Stage2Start {
                models: council.clone(),
                metadata: Stage2StartMeta {
                    label_to_model: label_map.clone(),
                },
            },
        );

        let mut join_set = JoinSet::new();
        for model in council {
            let gateway = Arc::clone(&self.gateway);
            let model = model.clone();
            let message = ChatMessage::user_with_images(ranking_prompt.clone(), &input.images);
            let request = CompletionRequest::new(vec![message], input.config.request_timeout())
                .with_reasoning(input.config.reasoning_for(&model));

            join_set.spawn(async move {
                let result = gateway.complete(&model, request).await;
                (model, result)
            });
        }

        let mut settled: HashMap<Model, Stage2Critique> = HashMap::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((model, Ok(text))) => {
                    debug!("Stage 2: {} ranked", model);
                    let parsed = parse_ranking(&text, &label_map);
                    if parsed.is_empty() {
                        debug!("Stage 2: {} critique yielded no labels", model);
                    }
                    let critique = Stage2Critique::success(model.clone(), text, parsed);
                    sink.emit(
                        input.turn,
                        CouncilEvent::Stage2Response {
                            data: critique.clone(),
                        },
                    );
                    settled.insert(model, critique);
                }
                Ok((model, Err(e))) => {
                    warn!("Stage 2: {} failed: {}", model, e);
                    let critique = Stage2Critique::failure(model.clone());
                    sink.emit(
                        input.turn,
                        CouncilEvent::Stage2Response {
                            data: critique.clone(),
                        },
                    );
                    settled.insert(model, critique);
                }
                Err(e) => {
                    warn!("Stage 2 task join error: {}", e);
                }
            }
        }

        let successes: Vec<Stage2Critique> = council
            .iter()
            .filter_map(|m| settled.get(m))
            .filter(|c| c.is_success())
            .cloned()
            .collect();

        let aggregate = aggregate_rankings(&successes, &label_map);

        info!(
            "Stage 2 complete: {} critiques, {} leaderboard entries",
            successes.len(),
            aggregate.len()
        );
        sink.emit(
            input.turn,
            CouncilEvent::Stage2Complete {
                data: successes.clone(),
                metadata: Stage2CompleteMeta {
                    label_to_model: label_map.clone(),
                    aggregate_rankings: aggregate.clone(),
                },
            },
        );

        (successes, label_map, aggregate)
    }

    /// Stage 3: the chairman synthesizes the final answer.
    ///
    /// Never skipped: with zero usable rankings it runs on the Stage 1
    /// answers alone, with an empty leaderboard. Chairman failure is a
    /// pipeline-level error.
    async fn stage3_synthesize(
        &self,
        input: &RunTurnInput,
        stage1: &[Stage1Answer],
        aggregate: &[AggregateEntry],
        sink: &dyn EventSink,
    ) -> Result<String, RunTurnError> {
        info!("Stage 3: synthesizing with {}", input.config.chairman);
        sink.emit(input.turn, CouncilEvent::Stage3Start);

        let answers: Vec<(String, &str)> = stage1
            .iter()
            .map(|a| (a.model.short_name().to_string(), a.text()))
            .collect();
        let prompt = CouncilPrompt::synthesis_prompt(input.question.content(), &answers, aggregate);
        let message = ChatMessage::user_with_images(prompt, &input.images);
        let request = CompletionRequest::new(vec![message], input.config.request_timeout())
            .with_reasoning(input.config.reasoning_for(&input.config.chairman));

        let final_answer = self
            .gateway
            .complete(&input.config.chairman, request)
            .await
            .map_err(RunTurnError::SynthesisFailed)?;

        info!("Stage 3 complete");
        sink.emit(
            input.turn,
            CouncilEvent::Stage3Complete {
                data: final_answer.clone(),
            },
        );

        Ok(final_answer)
    }

    fn spawn_title_task(&self, input: &RunTurnInput) -> JoinHandle<Result<String, GatewayError>> {
        let gateway = Arc::clone(&self.gateway);
        let model = input.config.chairman.clone();
        let prompt = CouncilPrompt::title_prompt(input.question.content());
        let request = CompletionRequest::new(
            vec![ChatMessage::user(prompt)],
            input.config.request_timeout(),
        );

        tokio::spawn(async move { gateway.complete(&model, request).await })
    }

    /// Await title generation and persist the result.
    ///
    /// Title failure never aborts the turn; the conversation keeps its
    /// placeholder title and no `title_complete` event is emitted.
    async fn finish_title(
        &self,
        input: &RunTurnInput,
        task: Option<JoinHandle<Result<String, GatewayError>>>,
        sink: &dyn EventSink,
    ) -> Option<String> {
        let task = task?;
        match task.await {
            Ok(Ok(raw)) => {
                let title = raw.trim().trim_matches('"').trim().to_string();
                if title.is_empty() {
                    return None;
                }
                if let Err(e) = self.store.set_title(&input.conversation, &title).await {
                    warn!("Failed to persist title: {}", e);
                }
                sink.emit(
                    input.turn,
                    CouncilEvent::TitleComplete {
                        data: TitleData {
                            title: title.clone(),
                        },
                    },
                );
                Some(title)
            }
            Ok(Err(e)) => {
                warn!("Title generation failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Title task join error: {}", e);
                None
            }
        }
    }
}

/// Build the provider message history for Stage 1: prior turns followed
/// by the current question (with attachments).
fn build_history(conversation: &Conversation, input: &RunTurnInput) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    for message in &conversation.messages {
        match message {
            Message::User { content, images } => {
                messages.push(ChatMessage::user_with_images(content.clone(), images));
            }
            Message::Assistant { stage3, .. } => {
                messages.push(ChatMessage::assistant(stage3.clone()));
            }
        }
    }
    messages.push(ChatMessage::user_with_images(
        input.question.content(),
        &input.images,
    ));
    messages
}

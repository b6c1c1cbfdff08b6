use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::ports::generation_provider::{GenerationProvider, TextStream};
use crate::application::services::search_service::{DEFAULT_TOP_K, RetrievedPassage};
use crate::application::services::SearchService;
use crate::domain::entities::Exchange;
use crate::domain::repositories::QuestionRepository;

pub const DEFAULT_CONTEXT_PASSAGES: usize = 3;

const EMPTY_ANSWER: &str = "Generation returned no text";

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerError {
    QuestionNotRecorded(String),
    RetrievalFailed(String),
    GenerationFailed(String),
    /// The model produced an answer but attaching it to the question failed.
    AnswerNotStored {
        question_id: Uuid,
        answer: String,
        reason: String,
    },
}

impl AnswerError {
    pub fn is_partial(&self) -> bool {
        matches!(self, AnswerError::AnswerNotStored { .. })
    }
}

impl std::fmt::Display for AnswerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerError::QuestionNotRecorded(msg) => write!(f, "error inserting data: {}", msg),
            AnswerError::RetrievalFailed(msg) => write!(f, "Retrieval failed: {}", msg),
            AnswerError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            AnswerError::AnswerNotStored {
                question_id,
                reason,
                ..
            } => write!(
                f,
                "Answer generated but not stored for question {}: {}",
                question_id, reason
            ),
        }
    }
}

impl std::error::Error for AnswerError {}

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: String,
    pub file_names: Vec<String>,
    pub chat_space: String,
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub question_id: Uuid,
    pub text: String,
    pub context: Vec<RetrievedPassage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerEvent {
    Fragment(String),
    Completed { question_id: Uuid, stored: bool },
    Failed(String),
}

pub type AnswerStream = BoxStream<'static, AnswerEvent>;

enum StreamState {
    Streaming {
        upstream: TextStream,
        answer: String,
        question_id: Uuid,
        question_repository: Arc<dyn QuestionRepository>,
    },
    Finished,
}

pub struct GenerationService {
    search_service: Arc<SearchService>,
    generation_provider: Arc<dyn GenerationProvider>,
    question_repository: Arc<dyn QuestionRepository>,
    top_k: usize,
    context_passages: usize,
}

impl GenerationService {
    pub fn new(
        search_service: Arc<SearchService>,
        generation_provider: Arc<dyn GenerationProvider>,
        question_repository: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            search_service,
            generation_provider,
            question_repository,
            top_k: DEFAULT_TOP_K,
            context_passages: DEFAULT_CONTEXT_PASSAGES,
        }
    }

    pub fn with_limits(mut self, top_k: usize, context_passages: usize) -> Self {
        self.top_k = top_k.max(1);
        self.context_passages = context_passages.max(1);
        self
    }

    pub async fn answer(&self, request: &AskRequest) -> Result<Answer, AnswerError> {
        let (question_id, prompt, context) = self.prepare(request).await?;

        let text = self
            .generation_provider
            .generate(&prompt)
            .await
            .map_err(|e| {
                warn!("Generation for question {} failed: {}", question_id, e);
                AnswerError::GenerationFailed(e.to_string())
            })?;

        if text.trim().is_empty() {
            warn!("Generation for question {} returned no text", question_id);
            return Err(AnswerError::GenerationFailed(EMPTY_ANSWER.to_string()));
        }

        self.question_repository
            .attach_answer(question_id, &text)
            .await
            .map_err(|e| {
                error!(
                    "Answer for question {} was generated but not stored: {}",
                    question_id, e
                );
                AnswerError::AnswerNotStored {
                    question_id,
                    answer: text.clone(),
                    reason: e.to_string(),
                }
            })?;

        info!(
            "Answered question {} in chat space {} ({} context passages)",
            question_id,
            request.chat_space,
            context.len()
        );

        Ok(Answer {
            question_id,
            text,
            context,
        })
    }

    /// Fragments are forwarded as they arrive. The answer is attached once
    /// the upstream stream ends, and the final event reports whether that
    /// worked. Dropping the returned stream drops the upstream call.
    pub async fn answer_stream(&self, request: &AskRequest) -> Result<AnswerStream, AnswerError> {
        let (question_id, prompt, _) = self.prepare(request).await?;

        let upstream = self
            .generation_provider
            .generate_stream(&prompt)
            .await
            .map_err(|e| AnswerError::GenerationFailed(e.to_string()))?;

        let initial = StreamState::Streaming {
            upstream,
            answer: String::new(),
            question_id,
            question_repository: self.question_repository.clone(),
        };

        Ok(stream::unfold(initial, |state| async move {
            match state {
                StreamState::Streaming {
                    mut upstream,
                    mut answer,
                    question_id,
                    question_repository,
                } => match upstream.next().await {
                    Some(Ok(fragment)) => {
                        answer.push_str(&fragment);
                        Some((
                            AnswerEvent::Fragment(fragment),
                            StreamState::Streaming {
                                upstream,
                                answer,
                                question_id,
                                question_repository,
                            },
                        ))
                    }
                    Some(Err(e)) => {
                        warn!("Answer stream for question {} failed: {}", question_id, e);
                        Some((AnswerEvent::Failed(e.to_string()), StreamState::Finished))
                    }
                    None if answer.trim().is_empty() => Some((
                        AnswerEvent::Failed(EMPTY_ANSWER.to_string()),
                        StreamState::Finished,
                    )),
                    None => {
                        let stored = match question_repository
                            .attach_answer(question_id, &answer)
                            .await
                        {
                            Ok(()) => true,
                            Err(e) => {
                                error!(
                                    "Streamed answer for question {} was not stored: {}",
                                    question_id, e
                                );
                                false
                            }
                        };
                        Some((
                            AnswerEvent::Completed {
                                question_id,
                                stored,
                            },
                            StreamState::Finished,
                        ))
                    }
                },
                StreamState::Finished => None,
            }
        })
        .boxed())
    }

    /// Records the question, then builds the prompt. With no file names the
    /// prompt is the bare question and nothing is retrieved.
    async fn prepare(
        &self,
        request: &AskRequest,
    ) -> Result<(Uuid, String, Vec<RetrievedPassage>), AnswerError> {
        let exchange = Exchange::new(
            request.owner_id.clone(),
            request.chat_space.clone(),
            request.question.clone(),
        );

        let question_id = self
            .question_repository
            .insert(&exchange)
            .await
            .map_err(|e| AnswerError::QuestionNotRecorded(e.to_string()))?;

        if request.file_names.is_empty() {
            return Ok((question_id, request.question.clone(), Vec::new()));
        }

        let context = self
            .search_service
            .retrieve(
                &request.question,
                &request.file_names,
                Some(request.owner_id.as_str()),
                self.top_k,
            )
            .await
            .map_err(|e| AnswerError::RetrievalFailed(e.to_string()))?;

        let prompt = build_prompt(&request.question, &context, self.context_passages);
        Ok((question_id, prompt, context))
    }
}

fn build_prompt(question: &str, context: &[RetrievedPassage], passages: usize) -> String {
    std::iter::once(question)
        .chain(context.iter().take(passages).map(|p| p.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::vector_store::VectorStore;
    use crate::application::services::EmbeddingService;
    use crate::application::testing::{
        HashEmbeddingProvider, InMemoryQuestionRepository, InMemoryVectorStore,
        ScriptedGenerationProvider, TEST_COLLECTION, TEST_DIMENSION,
    };
    use crate::domain::entities::{VectorPayload, VectorRecord};
    use std::sync::atomic::Ordering;

    struct Fixture {
        vector_store: Arc<InMemoryVectorStore>,
        questions: Arc<InMemoryQuestionRepository>,
        generator: Arc<ScriptedGenerationProvider>,
    }

    impl Fixture {
        fn new(answer: &str) -> Self {
            Self {
                vector_store: Arc::new(InMemoryVectorStore::default()),
                questions: Arc::new(InMemoryQuestionRepository::default()),
                generator: Arc::new(ScriptedGenerationProvider::new(answer)),
            }
        }

        async fn with_passages(self, file_name: &str, texts: &[&str]) -> Self {
            let records: Vec<VectorRecord> = texts
                .iter()
                .map(|text| {
                    VectorRecord::new(
                        HashEmbeddingProvider::embed(text),
                        VectorPayload {
                            document_id: Uuid::nil(),
                            file_name: file_name.to_string(),
                            text: text.to_string(),
                            owner_id: "user-1".to_string(),
                            embedding_model: "hash-test-model".to_string(),
                        },
                    )
                })
                .collect();
            self.vector_store
                .upsert(TEST_COLLECTION, &records)
                .await
                .unwrap();
            self
        }

        fn service(&self) -> GenerationService {
            let embedding_service = Arc::new(EmbeddingService::new(
                Arc::new(HashEmbeddingProvider::default()),
                TEST_DIMENSION,
            ));
            let search_service = Arc::new(SearchService::new(
                embedding_service,
                self.vector_store.clone(),
                TEST_COLLECTION.to_string(),
            ));
            GenerationService::new(
                search_service,
                self.generator.clone(),
                self.questions.clone(),
            )
        }
    }

    fn ask(question: &str, file_names: &[&str]) -> AskRequest {
        AskRequest {
            question: question.to_string(),
            file_names: file_names.iter().map(|name| name.to_string()).collect(),
            chat_space: "space-1".to_string(),
            owner_id: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_file_names_uses_bare_question() {
        let fixture = Fixture::new("4");
        fixture.vector_store.fail.store(true, Ordering::SeqCst);

        let answer = fixture
            .service()
            .answer(&ask("What is 2+2?", &[]))
            .await
            .unwrap();

        assert_eq!(answer.text, "4");
        assert!(answer.context.is_empty());
        assert_eq!(fixture.generator.last_prompt().unwrap(), "What is 2+2?");
        assert_eq!(fixture.questions.all()[0].response(), Some("4"));
    }

    #[tokio::test]
    async fn test_prompt_holds_question_and_top_three_passages() {
        let fixture = Fixture::new("answer")
            .with_passages(
                "notes.txt",
                &[
                    "rust ownership rules",
                    "rust ownership and borrowing",
                    "rust ownership moves values",
                    "rust ownership drop order",
                    "cooking pasta al dente",
                ],
            )
            .await;

        let answer = fixture
            .service()
            .answer(&ask("rust ownership", &["notes.txt"]))
            .await
            .unwrap();

        assert_eq!(answer.context.len(), 5);
        assert!(
            answer
                .context
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );

        let expected = format!(
            "rust ownership\n\n{}\n\n{}\n\n{}",
            answer.context[0].text, answer.context[1].text, answer.context[2].text
        );
        assert_eq!(fixture.generator.last_prompt().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_question_insert_failure_skips_generation() {
        let fixture = Fixture::new("never");
        fixture.questions.fail_inserts.store(true, Ordering::SeqCst);

        let error = fixture
            .service()
            .answer(&ask("anything", &[]))
            .await
            .unwrap_err();

        assert!(matches!(error, AnswerError::QuestionNotRecorded(_)));
        assert!(error.to_string().starts_with("error inserting data"));
        assert!(fixture.generator.last_prompt().is_none());
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_question_unanswered() {
        let fixture = Fixture::new("never");
        fixture.generator.fail.store(true, Ordering::SeqCst);

        let error = fixture
            .service()
            .answer(&ask("anything", &[]))
            .await
            .unwrap_err();

        assert!(matches!(error, AnswerError::GenerationFailed(_)));
        assert!(!error.is_partial());
        let exchanges = fixture.questions.all();
        assert_eq!(exchanges.len(), 1);
        assert!(!exchanges[0].is_answered());
    }

    #[tokio::test]
    async fn test_unstored_answer_is_reported_with_text() {
        let fixture = Fixture::new("forty two");
        fixture.questions.fail_answers.store(true, Ordering::SeqCst);

        let error = fixture
            .service()
            .answer(&ask("meaning of life", &[]))
            .await
            .unwrap_err();

        assert!(error.is_partial());
        match error {
            AnswerError::AnswerNotStored {
                question_id,
                answer,
                ..
            } => {
                assert_eq!(answer, "forty two");
                assert_eq!(question_id, fixture.questions.all()[0].id());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_forwards_fragments_then_completes() {
        let fixture = Fixture::new("one two three");

        let events: Vec<AnswerEvent> = fixture
            .service()
            .answer_stream(&ask("count", &[]))
            .await
            .unwrap()
            .collect()
            .await;

        let question_id = fixture.questions.all()[0].id();
        assert_eq!(
            events,
            vec![
                AnswerEvent::Fragment("one ".to_string()),
                AnswerEvent::Fragment("two ".to_string()),
                AnswerEvent::Fragment("three".to_string()),
                AnswerEvent::Completed {
                    question_id,
                    stored: true
                },
            ]
        );
        assert_eq!(fixture.questions.all()[0].response(), Some("one two three"));
    }

    #[tokio::test]
    async fn test_empty_answer_is_a_failure_in_both_modes() {
        let fixture = Fixture::new("");

        let error = fixture
            .service()
            .answer(&ask("q", &[]))
            .await
            .unwrap_err();
        assert!(matches!(error, AnswerError::GenerationFailed(_)));

        let events: Vec<AnswerEvent> = fixture
            .service()
            .answer_stream(&ask("q", &[]))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(events, vec![AnswerEvent::Failed(EMPTY_ANSWER.to_string())]);

        assert!(
            fixture
                .questions
                .all()
                .iter()
                .all(|exchange| !exchange.is_answered())
        );
    }

    #[tokio::test]
    async fn test_stream_reports_unstored_answer() {
        let fixture = Fixture::new("lost answer");
        fixture.questions.fail_answers.store(true, Ordering::SeqCst);

        let events: Vec<AnswerEvent> = fixture
            .service()
            .answer_stream(&ask("q", &[]))
            .await
            .unwrap()
            .collect()
            .await;

        assert!(matches!(
            events.last(),
            Some(AnswerEvent::Completed { stored: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_stream_never_attaches_answer() {
        let fixture = Fixture::new("a b c d");

        let mut events = fixture
            .service()
            .answer_stream(&ask("q", &[]))
            .await
            .unwrap();
        let first = events.next().await;
        drop(events);

        assert_eq!(first, Some(AnswerEvent::Fragment("a ".to_string())));
        assert!(!fixture.questions.all()[0].is_answered());
    }

    #[test]
    fn test_build_prompt_without_context_is_question() {
        assert_eq!(build_prompt("q", &[], 3), "q");
    }
}

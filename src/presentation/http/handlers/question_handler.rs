use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::stream::{Stream, StreamExt};
use serde_json::json;
use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::application::ports::AuthProvider;
use crate::application::services::GenerationService;
use crate::application::services::generation_service::{AnswerEvent, AskRequest};
use crate::application::use_cases::{DeleteChatSpaceUseCase, GetUserHistoryUseCase};
use crate::presentation::http::auth::authenticate;
use crate::presentation::http::dto::{
    AnswerResponseDto, ApiResponse, AskRequestDto, DeletedCountDto, ExchangeDto,
};
use crate::presentation::http::errors::HttpError;

pub struct QuestionHandler {
    generation_service: Arc<GenerationService>,
    history_use_case: Arc<GetUserHistoryUseCase>,
    delete_chat_space_use_case: Arc<DeleteChatSpaceUseCase>,
    auth_provider: Arc<dyn AuthProvider>,
}

impl QuestionHandler {
    pub fn new(
        generation_service: Arc<GenerationService>,
        history_use_case: Arc<GetUserHistoryUseCase>,
        delete_chat_space_use_case: Arc<DeleteChatSpaceUseCase>,
        auth_provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            generation_service,
            history_use_case,
            delete_chat_space_use_case,
            auth_provider,
        }
    }

    async fn ask_request(
        &self,
        headers: &HeaderMap,
        body: AskRequestDto,
    ) -> Result<AskRequest, HttpError> {
        let owner_id = authenticate(self.auth_provider.as_ref(), headers).await?;

        if body.question.trim().is_empty() {
            return Err(HttpError::bad_request(
                "EMPTY_QUESTION",
                "Question cannot be empty",
            ));
        }

        Ok(AskRequest {
            question: body.question,
            file_names: body.file_names,
            chat_space: body.chat_space,
            owner_id,
        })
    }

    pub async fn ask(
        State(handler): State<Arc<QuestionHandler>>,
        headers: HeaderMap,
        Json(body): Json<AskRequestDto>,
    ) -> Result<impl IntoResponse, HttpError> {
        let request = handler.ask_request(&headers, body).await?;

        let answer = handler.generation_service.answer(&request).await?;

        Ok((
            StatusCode::OK,
            Json(ApiResponse::success(AnswerResponseDto::from(answer))),
        ))
    }

    /// Same as `ask` but the answer arrives as `fragment` events, followed by
    /// one `completed` or `error` event. Failures before the first fragment
    /// are ordinary JSON errors.
    pub async fn ask_stream(
        State(handler): State<Arc<QuestionHandler>>,
        headers: HeaderMap,
        Json(body): Json<AskRequestDto>,
    ) -> Result<Response, HttpError> {
        let request = handler.ask_request(&headers, body).await?;

        let answers = handler.generation_service.answer_stream(&request).await?;
        let events = answers.map(|event| Ok::<_, Infallible>(sse_event(event)));

        Ok(create_sse_response(events))
    }

    pub async fn history(
        State(handler): State<Arc<QuestionHandler>>,
        headers: HeaderMap,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let exchanges: Vec<ExchangeDto> = handler
            .history_use_case
            .history(&owner_id)
            .await?
            .into_iter()
            .map(ExchangeDto::from)
            .collect();

        Ok((StatusCode::OK, Json(ApiResponse::success(exchanges))))
    }

    pub async fn chat(
        State(handler): State<Arc<QuestionHandler>>,
        headers: HeaderMap,
        Path(chat_space): Path<String>,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let exchanges: Vec<ExchangeDto> = handler
            .history_use_case
            .chat(&owner_id, &chat_space)
            .await?
            .into_iter()
            .map(ExchangeDto::from)
            .collect();

        Ok((StatusCode::OK, Json(ApiResponse::success(exchanges))))
    }

    pub async fn delete_chat_space(
        State(handler): State<Arc<QuestionHandler>>,
        headers: HeaderMap,
        Path(chat_space): Path<String>,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let deleted = handler
            .delete_chat_space_use_case
            .execute(&owner_id, &chat_space)
            .await?;

        Ok((
            StatusCode::OK,
            Json(ApiResponse::success(DeletedCountDto { deleted })),
        ))
    }
}

fn sse_event(event: AnswerEvent) -> Event {
    match event {
        AnswerEvent::Fragment(text) => Event::default().event("fragment").data(text),
        AnswerEvent::Completed {
            question_id,
            stored,
        } => Event::default()
            .event("completed")
            .data(json!({ "question_id": question_id, "stored": stored }).to_string()),
        AnswerEvent::Failed(message) => Event::default().event("error").data(message),
    }
}

pub fn create_sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(30))
                .text("keep-alive"),
        )
        .into_response()
}

//! HTTP polling facade.
//!
//! `GET /chat?lines=N` reads history, `POST /chat?name=NAME` broadcasts the
//! request body as a message from `NAME`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    domain::{DisplayName, NameError},
    ui::state::AppState,
};

/// Query parameters for `GET /chat`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Number of lines; anything missing, unparsable or below one means "all"
    pub lines: Option<String>,
}

/// Query parameters for `POST /chat`
#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub name: Option<String>,
}

/// HTTP facade errors
#[derive(Debug, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("missing name")]
    MissingName,

    #[error("name too long")]
    NameTooLong,

    #[error("invalid name")]
    InvalidName,
}

impl From<NameError> for HttpError {
    fn from(e: NameError) -> Self {
        match e {
            NameError::Empty => HttpError::MissingName,
            NameError::TooLong { .. } => HttpError::NameTooLong,
            NameError::ControlCharacter => HttpError::InvalidName,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::debug!("Rejecting chat request: {}", self);
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

type PlainText = ([(header::HeaderName, &'static str); 1], Vec<u8>);

/// Read the most recent lines of chat history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> PlainText {
    let lines = query
        .lines
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .unwrap_or(state.max_history_lines);

    let history = state.manager.history(lines).await;
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        history,
    )
}

/// Broadcast the request body as a message
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostQuery>,
    body: Bytes,
) -> Result<StatusCode, HttpError> {
    let raw = query.name.unwrap_or_default();
    let name = DisplayName::parse(&raw, state.limits.max_name_length)?;
    state.manager.broadcast(&name, &body).await;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::OutboxPusher, ui::handler::SessionLimits, usecase::ChatManager,
    };
    use chatd_shared::time::FixedClock;

    const TS: &str = "02-Jan-06 15:04";

    fn create_test_state(max_history_lines: usize) -> Arc<AppState> {
        let manager = Arc::new(ChatManager::new(
            Arc::new(OutboxPusher),
            None,
            max_history_lines,
            Arc::new(FixedClock::from_unix_secs(1_136_214_245)),
        ));
        Arc::new(AppState {
            manager,
            limits: SessionLimits {
                msg_buffer_size: 512,
                max_name_length: 8,
            },
            max_history_lines,
        })
    }

    async fn post(
        state: &Arc<AppState>,
        name: Option<&str>,
        body: &'static str,
    ) -> Result<StatusCode, HttpError> {
        post_message(
            State(state.clone()),
            Query(PostQuery {
                name: name.map(str::to_string),
            }),
            Bytes::from_static(body.as_bytes()),
        )
        .await
    }

    async fn get(state: &Arc<AppState>, lines: Option<&str>) -> String {
        let (_, body) = get_history(
            State(state.clone()),
            Query(HistoryQuery {
                lines: lines.map(str::to_string),
            }),
        )
        .await;
        String::from_utf8(body).unwrap()
    }

    #[tokio::test]
    async fn test_post_then_get_history() {
        // テスト項目: POST したメッセージが GET で取得できる
        // given (前提条件):
        let state = create_test_state(8);

        // when (操作):
        let status = post(&state, Some("web"), "hello from http").await;

        // then (期待する結果):
        assert_eq!(status, Ok(StatusCode::OK));
        assert_eq!(
            get(&state, Some("5")).await,
            format!("{} <web> hello from http\n", TS)
        );
    }

    #[tokio::test]
    async fn test_get_limits_lines() {
        // テスト項目: lines パラメータで取得行数を指定できる
        // given (前提条件):
        let state = create_test_state(8);
        for body in ["one\n", "two\n", "three\n"] {
            post(&state, Some("web"), body).await.unwrap();
        }

        // when (操作):
        let result = get(&state, Some("2")).await;

        // then (期待する結果):
        assert_eq!(result, format!("{ts} <web> two\n{ts} <web> three\n", ts = TS));
    }

    #[tokio::test]
    async fn test_get_invalid_lines_returns_everything() {
        // テスト項目: lines が不正・欠落・1 未満の場合は全履歴が返る
        // given (前提条件):
        let state = create_test_state(8);
        for body in ["one\n", "two\n", "three\n"] {
            post(&state, Some("web"), body).await.unwrap();
        }
        let everything = format!("{ts} <web> one\n{ts} <web> two\n{ts} <web> three\n", ts = TS);

        // when (操作):
        let results = [
            get(&state, None).await,
            get(&state, Some("abc")).await,
            get(&state, Some("0")).await,
            get(&state, Some("-3")).await,
        ];

        // then (期待する結果):
        assert!(results.iter().all(|r| *r == everything));
    }

    #[tokio::test]
    async fn test_post_without_name_is_rejected() {
        // テスト項目: name が無い、または空の POST は拒否され、何もブロードキャストされない
        // given (前提条件):
        let state = create_test_state(8);

        // when (操作):
        let missing = post(&state, None, "hi").await;
        let empty = post(&state, Some(""), "hi").await;

        // then (期待する結果):
        assert_eq!(missing, Err(HttpError::MissingName));
        assert_eq!(empty, Err(HttpError::MissingName));
        assert!(get(&state, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_post_with_long_name_is_rejected() {
        // テスト項目: 上限を超える name の POST は拒否される
        // given (前提条件):
        let state = create_test_state(8);

        // when (操作):
        let result = post(&state, Some("much-too-long"), "hi").await;

        // then (期待する結果):
        assert_eq!(result, Err(HttpError::NameTooLong));
    }

    #[tokio::test]
    async fn test_post_with_line_break_in_name_is_rejected() {
        // テスト項目: 改行を含む name の POST は拒否され、偽の行が履歴に入らない
        // given (前提条件):
        let state = create_test_state(8);

        // when (操作):
        let result = post(&state, Some("a\n* b"), "hi").await;

        // then (期待する結果):
        assert_eq!(result, Err(HttpError::InvalidName));
        assert!(get(&state, None).await.is_empty());
    }

    #[test]
    fn test_http_error_into_response_is_bad_request() {
        // テスト項目: HttpError は 400 Bad Request に変換される
        // given (前提条件):
        let error = HttpError::NameTooLong;

        // when (操作):
        let response = error.into_response();

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

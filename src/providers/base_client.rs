use super::FragmentStream;
use crate::core::error::GaussError;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::fmt;

/// Outcome of parsing one line of a streamed response
#[derive(Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    Skip,
    Done,
}

pub type StreamParser = fn(&str) -> Result<StreamEvent, GaussError>;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth_header: Option<(String, String)>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("auth_header", &self.auth_header.as_ref().map(|(name, _)| name))
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(
        base_url: String,
        auth_header: Option<(String, String)>,
    ) -> Result<Self, GaussError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    /// POSTs a JSON payload, mapping 401/403 to `GaussError::Auth`.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, GaussError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "Sending request");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some((name, value)) = &self.auth_header {
            request = request.header(name, value);
        }

        let response = request.json(payload).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(GaussError::Auth(format!("{} rejected the API key ({})", self.base_url, status)))
            }
            _ => Err(GaussError::Api(format!("HTTP {}: {}", status, body.trim()))),
        }
    }

    /// Turns a streamed body into fragments, parsing it line by line.
    ///
    /// Lines are reassembled across network chunks before they reach the
    /// parser, so a JSON event split over two reads is still seen whole.
    pub fn stream_response(&self, response: Response, parser: StreamParser) -> FragmentStream {
        let bytes = response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(GaussError::from)
            .boxed();
        let state = LineState {
            bytes,
            buffer: Vec::new(),
            eof: false,
            done: false,
        };

        stream::unfold(state, move |mut state| async move {
            loop {
                if state.done {
                    return None;
                }

                if let Some(line) = state.next_line() {
                    match parser(line.trim_end_matches('\r')) {
                        Ok(StreamEvent::Fragment(text)) => return Some((Ok(text), state)),
                        Ok(StreamEvent::Skip) => continue,
                        Ok(StreamEvent::Done) => return None,
                        Err(e) => {
                            state.done = true;
                            return Some((Err(e), state));
                        }
                    }
                }

                if state.eof {
                    return None;
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                    None => {
                        state.eof = true;
                        if !state.buffer.is_empty() {
                            state.buffer.push(b'\n');
                        }
                    }
                }
            }
        })
        .boxed()
    }
}

struct LineState {
    bytes: BoxStream<'static, Result<Vec<u8>, GaussError>>,
    buffer: Vec<u8>,
    eof: bool,
    done: bool,
}

impl LineState {
    fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned())
    }
}

//! SSE stream emulation.
//!
//! The backend only returns complete answers, but legacy streaming clients
//! expect incremental deltas. This module replays one finished answer as a
//! paced sequence of SSE chunks: an initial delta carrying the assistant
//! role and the first word, then word-group deltas of bounded size, then the
//! terminal `[DONE]` line.
//!
//! The emulator only produces framed chunks through a `Stream`; the response
//! writer that consumes it owns all connection state.
//!
//! Wire format: every chunk is `data: <json>\n\n` except the terminal line,
//! which is `data: [DONE]\n` — single trailing newline, no blank line.
//! Clients depend on that exact asymmetry.

use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use tokio::time::sleep;
use tracing::debug;

use crate::models::{ChunkDelta, StreamChunk};

/// Number of whitespace-run + token segments grouped into one body chunk.
const SEGMENTS_PER_CHUNK: usize = 20;

/// Terminal SSE line.
pub const DONE_SIGNAL: &str = "data: [DONE]\n";

/// First chunk of a stream: assistant role plus the first word.
#[must_use]
pub fn initial_chunk(first_word: &str) -> String {
    frame(&StreamChunk::delta(
        ChunkDelta {
            role: Some("assistant".to_string()),
            content: Some(first_word.to_string()),
            kind: Some("text".to_string()),
        },
        None,
    ))
}

/// Body chunk carrying a word group; content is trimmed before embedding.
#[must_use]
pub fn text_chunk(words: &str) -> String {
    frame(&StreamChunk::delta(
        ChunkDelta {
            role: None,
            content: Some(words.trim().to_string()),
            kind: Some("text".to_string()),
        },
        None,
    ))
}

/// Final chunk of a stream.
///
/// The emulator always emits the `[DONE]` form; the finish-reason variant
/// exists for clients that require an explicit stop object.
#[must_use]
pub fn stop_chunk(include_finish_reason: bool) -> String {
    if include_finish_reason {
        let chunk = StreamChunk::delta(ChunkDelta::default(), Some("stop".to_string()));
        format!(
            "data: {}\n",
            serde_json::to_string(&chunk).unwrap_or_default()
        )
    } else {
        DONE_SIGNAL.to_string()
    }
}

fn frame(chunk: &StreamChunk) -> String {
    format!(
        "data: {}\n\n",
        serde_json::to_string(chunk).unwrap_or_default()
    )
}

/// Leading run of non-whitespace; empty when the text is empty or starts
/// with whitespace (anchored match).
fn leading_token(text: &str) -> &str {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    &text[..end]
}

/// One whitespace-run + token segment anchored at the start, or `None` when
/// no token remains.
fn leading_segment(text: &str) -> Option<&str> {
    let token_start = text.find(|c: char| !c.is_whitespace())?;
    let rest = &text[token_start..];
    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(&text[..token_start + token_end])
}

/// Split up to `limit` segments off the front of `text`.
fn take_segments(text: &str, limit: usize) -> (&str, &str) {
    let mut consumed = 0;
    for _ in 0..limit {
        match leading_segment(&text[consumed..]) {
            Some(segment) => consumed += segment.len(),
            None => break,
        }
    }
    text.split_at(consumed)
}

enum Phase {
    Lead,
    Body,
    Finished,
}

/// State threaded through the `unfold` stream.
struct EmulatorState {
    remaining: String,
    delay: Duration,
    phase: Phase,
    /// Set after each body chunk; the pause runs before the next emission.
    pause_pending: bool,
}

/// Replay one complete answer as a paced SSE chunk stream.
///
/// An empty answer produces only the terminal line. The pause runs after
/// every body chunk, including before the terminal line; there is no pause
/// between the initial chunk and the first body chunk.
pub fn emulate(
    answer: String,
    delay: Duration,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
    debug!(len = answer.len(), delay_ms = delay.as_millis(), "Emulating stream");

    let state = EmulatorState {
        remaining: answer,
        delay,
        phase: Phase::Lead,
        pause_pending: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        match st.phase {
            Phase::Lead => {
                if st.remaining.is_empty() {
                    st.phase = Phase::Finished;
                    return Some((Ok(Bytes::from(stop_chunk(false))), st));
                }
                let first_len = leading_token(&st.remaining).len();
                let chunk = initial_chunk(&st.remaining[..first_len]);
                st.remaining = st.remaining.split_off(first_len);
                st.phase = Phase::Body;
                Some((Ok(Bytes::from(chunk)), st))
            }
            Phase::Body => {
                if st.pause_pending {
                    sleep(st.delay).await;
                }
                let (words, rest) = take_segments(&st.remaining, SEGMENTS_PER_CHUNK);
                if words.is_empty() {
                    // Only whitespace (or nothing) left; end the stream.
                    st.phase = Phase::Finished;
                    return Some((Ok(Bytes::from(stop_chunk(false))), st));
                }
                let chunk = text_chunk(words);
                let rest = rest.to_string();
                st.remaining = rest;
                st.pause_pending = true;
                Some((Ok(Bytes::from(chunk)), st))
            }
            Phase::Finished => None,
        }
    })
}

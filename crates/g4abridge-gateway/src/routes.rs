//! Route classification for the compatibility surface.
//!
//! The surface is prefix-based: historical client versions address the same
//! operation as `/v1/chat/completions`, `/chat/completions`, or one of the
//! explicit `streaming` variants. An axum route table cannot express those
//! prefix rules, so classification is a pure function the dispatcher calls
//! for every request.

/// Compatibility endpoint a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ChatCompletions,
    Completions,
    ModelsList,
    NotFound,
}

/// Result of classifying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: Route,
    /// Whether the reply must be a synthesized stream.
    pub streaming: bool,
}

/// Classify a request path, total over all inputs.
///
/// `body_stream` is the parsed body's `stream` flag; the explicit
/// `streaming` path variants force it true. Rules are checked in priority
/// order, first match wins.
#[must_use]
pub fn classify(path: &str, body_stream: bool) -> RouteMatch {
    if path.starts_with("/v1/streaming/chat/completions")
        || path.starts_with("/streaming/chat/completions")
        || path.starts_with("/v1/chat/completions")
        || path == "/chat/completions"
    {
        return RouteMatch {
            route: Route::ChatCompletions,
            streaming: body_stream
                || path.starts_with("/v1/streaming/chat/completions")
                || path.starts_with("/streaming/chat/completions"),
        };
    }

    if path.starts_with("/v1/streaming/completions")
        || path.starts_with("/streaming/completions")
        || path.starts_with("/v1/completions")
        || path == "/completions"
    {
        return RouteMatch {
            route: Route::Completions,
            streaming: body_stream
                || path.starts_with("/v1/streaming/completions")
                || path.starts_with("/streaming/completions"),
        };
    }

    if path.starts_with("/v1/models") || path == "/models" {
        return RouteMatch {
            route: Route::ModelsList,
            streaming: false,
        };
    }

    RouteMatch {
        route: Route::NotFound,
        streaming: false,
    }
}

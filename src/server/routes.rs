//! Request routing.
//!
//! - `GET /health`: `200 OK` once a configuration is loaded, `503 Starting` before
//! - `GET /fonts.json`: JSON array of the served font names
//! - `GET /fonts/{fontstack}/{start}-{end}.pbf`: composed glyph PBF

use super::http::{Request, Response, percent_decode};
use crate::app::App;
use crate::state::ComposeFailure;
use tilefont_glyphs::{GlyphError, GlyphRange};

const FONTS_PREFIX: &str = "/fonts/";
const PBF_SUFFIX: &str = ".pbf";

/// Route `request` and produce the response (before CORS decoration).
pub async fn handle(app: &App, request: &Request) -> Response {
    if request.method != "GET" && request.method != "HEAD" {
        return Response::text(405, "Method Not Allowed").header("Allow", "GET, HEAD");
    }

    match request.path.as_str() {
        "/health" => health(app),
        "/fonts.json" => fonts_json(app),
        path => match path.strip_prefix(FONTS_PREFIX) {
            Some(rest) => glyphs(app, rest).await,
            None => Response::text(404, "Not Found"),
        },
    }
}

fn health(app: &App) -> Response {
    if app.is_ready() {
        Response::text(200, "OK")
    } else {
        Response::text(503, "Starting")
    }
}

fn fonts_json(app: &App) -> Response {
    let Some(state) = app.state() else {
        return Response::text(503, "Starting");
    };
    match serde_json::to_vec(&state.listed_fonts()) {
        Ok(body) => Response::json(body),
        Err(e) => {
            log::error!("Failed to serialize font list: {}", e);
            Response::text(500, "Internal Server Error")
        }
    }
}

/// `rest` is `{fontstack}/{range}.pbf`, still percent-encoded.
async fn glyphs(app: &App, rest: &str) -> Response {
    let Some((fontstack, file)) = rest.split_once('/') else {
        return Response::text(404, "Not Found");
    };
    if file.contains('/') {
        return Response::text(404, "Not Found");
    }
    let Some(range) = file.strip_suffix(PBF_SUFFIX) else {
        return Response::text(404, "Not Found");
    };
    let range: GlyphRange = match range.parse() {
        Ok(range) => range,
        Err(e) => return Response::text(400, glyph_error_message(&e)),
    };
    let Some(fontstack) = percent_decode(fontstack) else {
        return Response::text(400, "Invalid font stack encoding");
    };
    let Some(state) = app.state() else {
        return Response::text(503, "Starting");
    };

    match state.compose(&fontstack, range).await {
        Ok(pbf) => Response::protobuf(pbf),
        Err(ComposeFailure::Timeout(after)) => {
            log::warn!("Glyph request for '{}' {} timed out after {:?}", fontstack, range, after);
            Response::text(504, "Gateway Timeout")
        }
        Err(ComposeFailure::Glyph(e)) => {
            let status = glyph_error_status(&e);
            if status >= 500 {
                log::error!("Glyph request for '{}' {} failed: {}", fontstack, range, e);
            } else {
                log::debug!("Glyph request for '{}' {} rejected: {}", fontstack, range, e);
            }
            Response::text(status, glyph_error_message(&e))
        }
    }
}

/// HTTP status for a glyph failure. Client-visible font problems are 400s.
pub fn glyph_error_status(error: &GlyphError) -> u16 {
    match error {
        GlyphError::FontNotAllowed { .. }
        | GlyphError::FontLoad { .. }
        | GlyphError::InvalidRange(_)
        | GlyphError::MalformedGlyphs { .. } => 400,
        GlyphError::Task(_) => 500,
    }
}

fn glyph_error_message(error: &GlyphError) -> String {
    match error {
        GlyphError::Task(_) => "Internal Server Error".to_string(),
        e => e.to_string(),
    }
}

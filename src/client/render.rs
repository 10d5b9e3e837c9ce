//! Result rendering and download action binding.

use crate::surface::{DownloadAction, ResultView};
use crate::types::{DownloadJob, Event, FieldValue, SearchResult, Variant};
use crate::utils::{escape_html, format_views, resolve_endpoint, sanitize_filename};
use url::Url;

use super::AudioClient;

/// Label of the original download action
pub const ORIGINAL_ACTION_LABEL: &str = "Download MP3";
/// Label of the enhanced download action
pub const ENHANCED_ACTION_LABEL: &str = "Download Enhanced";
/// Fixed line explaining the enhanced variant
pub const ENHANCED_EXPLANATION: &str =
    "Enhanced: includes normalization, EQ and compression (takes longer).";

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN_SIZE: &str = "?";

impl AudioClient {
    /// Replace the result region with `result` and bind both download actions
    ///
    /// The previous view (and the jobs bound to it) is discarded, and the result region is
    /// scrolled into view.
    pub fn render_result(&self, result: &SearchResult) -> ResultView {
        let view = build_view(result, &self.base_url);

        self.surface.replace_result(view.clone());
        self.surface.scroll_result_into_view();

        tracing::debug!(
            title = %view.title,
            original = %view.original.job.endpoint,
            enhanced = %view.enhanced.job.endpoint,
            "rendered result"
        );
        self.emit_event(Event::ResultRendered {
            title: view.title.clone(),
        });
        view
    }
}

/// Build the job for one variant of `result`
pub(crate) fn download_job(result: &SearchResult, base: &Url, variant: Variant) -> DownloadJob {
    let raw = result.endpoint(variant);
    let endpoint = resolve_endpoint(base, raw).unwrap_or_else(|e| {
        tracing::warn!(endpoint = raw, error = %e, "keeping unresolvable endpoint as-is");
        raw.to_string()
    });

    let title = &result.metadata.title;
    DownloadJob {
        endpoint,
        filename: format!("{}{}.mp3", sanitize_filename(title), variant.filename_suffix()),
        title: title.clone(),
        variant,
    }
}

pub(crate) fn build_view(result: &SearchResult, base: &Url) -> ResultView {
    let original = DownloadAction {
        label: ORIGINAL_ACTION_LABEL.to_string(),
        job: download_job(result, base, Variant::Original),
    };
    let enhanced = DownloadAction {
        label: ENHANCED_ACTION_LABEL.to_string(),
        job: download_job(result, base, Variant::Enhanced),
    };

    ResultView {
        title: result.metadata.title.clone(),
        html: build_markup(result, &original, &enhanced),
        original,
        enhanced,
    }
}

/// Text of an optional string, or `default` when absent or empty
fn text_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

/// Display form of an optional field, or `default` when absent, zero or empty
fn field_or(value: Option<&FieldValue>, default: &str) -> String {
    match value {
        Some(v) if !v.is_blank() => v.to_string(),
        _ => default.to_string(),
    }
}

fn action_markup(class: &str, action: &DownloadAction) -> String {
    format!(
        r#"<button class="{class}" data-endpoint="{}" data-filename="{}" data-title="{}">{}</button>"#,
        escape_html(&action.job.endpoint),
        escape_html(&action.job.filename),
        escape_html(&action.job.title),
        escape_html(&action.label),
    )
}

fn build_markup(result: &SearchResult, original: &DownloadAction, enhanced: &DownloadAction) -> String {
    let metadata = &result.metadata;
    let audio = &result.audio_info;
    let title = escape_html(&metadata.title);

    let mut html = String::from(r#"<div class="result-card">"#);

    html.push_str(&format!(
        r#"<div class="result-thumbnail"><img src="{}" alt="{}"></div>"#,
        escape_html(&metadata.thumbnail),
        title
    ));

    html.push_str(r#"<div class="result-info">"#);
    html.push_str(&format!(r#"<h3 class="result-title">{}</h3>"#, title));
    html.push_str(&format!(
        "<p><strong>Channel:</strong> {}</p>",
        escape_html(text_or(metadata.artist.as_deref(), UNKNOWN))
    ));
    html.push_str(&format!(
        "<p><strong>Duration:</strong> {}</p>",
        escape_html(&field_or(metadata.duration.as_ref(), NOT_AVAILABLE))
    ));
    if let Some(views) = metadata.views.as_ref().filter(|v| !v.is_blank()) {
        html.push_str(&format!(
            "<p><strong>Views:</strong> {}</p>",
            escape_html(&format_views(views))
        ));
    }
    html.push_str("</div>");

    html.push_str(r#"<div class="result-audio-info"><h4>Available audio</h4>"#);
    html.push_str(&format!(
        "<p><strong>Quality:</strong> {}</p>",
        escape_html(text_or(audio.quality.as_deref(), NOT_AVAILABLE))
    ));
    html.push_str(&format!(
        "<p><strong>Bitrate:</strong> {}</p>",
        escape_html(&field_or(audio.bitrate.as_ref(), NOT_AVAILABLE))
    ));
    html.push_str(&format!(
        "<p><strong>Codec:</strong> {}</p>",
        escape_html(text_or(audio.codec.as_deref(), NOT_AVAILABLE))
    ));
    html.push_str(&format!(
        "<p><strong>Format:</strong> {}</p>",
        escape_html(text_or(audio.format.as_deref(), NOT_AVAILABLE))
    ));
    html.push_str(&format!(
        "<p><strong>Estimated size:</strong> ~{} MB</p>",
        escape_html(&field_or(audio.estimated_size_mb.as_ref(), UNKNOWN_SIZE))
    ));
    html.push_str("</div>");

    html.push_str(r#"<div class="result-download">"#);
    html.push_str(&action_markup("download-button download-original", original));
    html.push_str(&action_markup(
        "download-button enhanced download-enhanced",
        enhanced,
    ));
    html.push_str("</div>");

    html.push_str(r#"<div class="result-note">"#);
    html.push_str(&format!(
        "<p><em>{}</em></p>",
        escape_html(result.note.as_deref().unwrap_or_default())
    ));
    html.push_str(&format!("<p><em>{}</em></p>", escape_html(ENHANCED_EXPLANATION)));
    html.push_str("</div>");

    html.push_str("</div>");
    html
}

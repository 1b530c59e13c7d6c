use crate::export::Download;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use dioxus::prelude::*;
use once_cell::sync::Lazy;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing::{error, warn};

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = true;
    options
});

const CHAT_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

/// Local-time label for a chat's creation time (Unix milliseconds).
pub fn format_chat_date(created_at: i64) -> Option<String> {
    let nanos = i128::from(created_at) * 1_000_000;
    let mut datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(CHAT_DATE_FORMAT).ok()
}

pub fn copy_to_clipboard(text: String) {
    #[cfg(any(feature = "desktop", feature = "mobile"))]
    {
        match arboard::Clipboard::new() {
            Ok(mut cb) => {
                if let Err(err) = cb.set_text(text) {
                    warn!("clipboard write failed: {err}");
                }
            }
            Err(err) => warn!("clipboard unavailable: {err}"),
        }
    }
    #[cfg(not(any(feature = "desktop", feature = "mobile")))]
    {
        let js = format!("navigator.clipboard.writeText({})", js_string(&text));
        let _ = document::eval(&js);
    }
}

/// Blocking alert in the web view.
pub fn show_alert(message: &str) {
    let _ = document::eval(&format!("alert({})", js_string(message)));
}

/// Hand a generated file to the user. Native builds write it to the export
/// folder and return where it went; the web build triggers a browser
/// download. Failures are logged and alerted.
pub fn deliver_download(download: &Download) -> Option<String> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        match crate::export::save_to_default_dir(download) {
            Ok(path) => Some(format!("Saved to {}", path.display())),
            Err(err) => {
                error!("export failed: {err}");
                show_alert(&format!("Sorry, the file could not be saved: {err}"));
                None
            }
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        let js = format!(
            r#"const blob = new Blob([{contents}], {{ type: "text/plain;charset=utf-8" }});
const url = URL.createObjectURL(blob);
const a = document.createElement("a");
a.href = url;
a.download = {name};
document.body.appendChild(a);
a.click();
document.body.removeChild(a);
URL.revokeObjectURL(url);"#,
            contents = js_string(&download.contents),
            name = js_string(&download.file_name),
        );
        let _ = document::eval(&js);
        None
    }
}

/// Open the web view's print dialog so a document can be saved as PDF.
pub async fn print_document() {
    if let Err(err) = document::eval("window.print();").await {
        error!("print dialog failed: {err:?}");
        show_alert("Sorry, something went wrong while generating the PDF.");
    }
}

fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

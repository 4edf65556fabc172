//! HTML views, rendered with [maud](https://maud.lambda.xyz/).
//!
//! Two pages: the submission form and the result view. Templates are
//! compile-time checked Rust, interpolation is auto-escaped (instructions
//! are user text), and the CSS ships inline — no template or asset directory
//! to deploy.

use maud::{DOCTYPE, Markup, html};

const CSS: &str = "\
:root { --ink: #1d2129; --paper: #f7f6f3; --accent: #5a52c4; --warn: #a33c2e; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--paper); color: var(--ink); }
main { max-width: 52rem; margin: 0 auto; padding: 2rem 1rem; }
h1 { font-weight: 600; letter-spacing: -0.02em; }
form { display: grid; gap: 1rem; }
textarea, input[type=file] { width: 100%; padding: 0.6rem; border: 1px solid #c9c6bd; border-radius: 4px; font: inherit; background: #fff; }
button { justify-self: start; padding: 0.6rem 1.4rem; border: 0; border-radius: 4px; background: var(--accent); color: #fff; font: inherit; cursor: pointer; }
.flash { padding: 0.8rem 1rem; border-radius: 4px; background: #f6e3e0; color: var(--warn); }
.notice { padding: 0.8rem 1rem; border-radius: 4px; background: #efe9d8; }
.pair { display: grid; gap: 1.5rem; grid-template-columns: 1fr 1fr; }
.pair img { width: 100%; border-radius: 4px; border: 1px solid #c9c6bd; }
.pair h2 { font-size: 1rem; font-weight: 600; }
a { color: var(--accent); }
@media (max-width: 40rem) { .pair { grid-template-columns: 1fr; } }
";

/// Base document shared by both pages.
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                main { (content) }
            }
        }
    }
}

/// The submission form, with an optional flash banner from the last attempt.
pub fn index_page(flash: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Promptbrush" }
        p { "Upload an image and describe the edit you want." }
        @if let Some(message) = flash {
            div.flash { (message) }
        }
        form action="/upload" method="post" enctype="multipart/form-data" {
            input type="file" name="file" accept=".png,.jpg,.jpeg,.gif";
            textarea name="prompt" rows="3"
                placeholder="e.g. Change the background to a sunset" {}
            button type="submit" { "Edit image" }
        }
    };
    base_document("Promptbrush", content)
}

/// The result view: original next to the produced image.
///
/// When the transform fell back, the produced image is the normalized
/// original and the page says so — this is still an HTTP 200, not an error.
pub fn result_page(
    instruction: &str,
    upload_id: &str,
    result_id: Option<&str>,
    succeeded: bool,
) -> Markup {
    let content = html! {
        h1 { "Result" }
        p { "Instruction: " em { (instruction) } }
        @if !succeeded {
            div.notice {
                "The image could not be transformed right now, so the result "
                "below is your original (resized for processing)."
            }
        }
        div.pair {
            div {
                h2 { "Original" }
                img src={ "/uploads/" (upload_id) } alt="original upload";
            }
            @if let Some(result) = result_id {
                div {
                    h2 { @if succeeded { "Edited" } @else { "Unchanged copy" } }
                    img src={ "/output/" (result) } alt="produced image";
                }
            } @else {
                div {
                    h2 { "Edited" }
                    p { "No result could be produced for this upload." }
                }
            }
        }
        p { a href="/" { "Edit another image" } }
    };
    base_document("Promptbrush — result", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_without_flash_has_no_banner() {
        let html = index_page(None).into_string();
        assert!(html.contains("action=\"/upload\""));
        assert!(!html.contains("class=\"flash\""));
    }

    #[test]
    fn index_with_flash_shows_banner() {
        let html = index_page(Some("No file selected")).into_string();
        assert!(html.contains("class=\"flash\""));
        assert!(html.contains("No file selected"));
    }

    #[test]
    fn result_links_both_artifacts() {
        let html = result_page("brighten", "abc_photo.png", Some("processed_abc_photo.png"), true)
            .into_string();
        assert!(html.contains("/uploads/abc_photo.png"));
        assert!(html.contains("/output/processed_abc_photo.png"));
        assert!(!html.contains("could not be transformed"));
    }

    #[test]
    fn fallback_result_carries_notice() {
        let html = result_page("brighten", "abc.png", Some("processed_abc.png"), false)
            .into_string();
        assert!(html.contains("could not be transformed"));
        assert!(html.contains("Unchanged copy"));
    }

    #[test]
    fn missing_result_is_stated() {
        let html = result_page("x", "abc.png", None, false).into_string();
        assert!(html.contains("No result could be produced"));
    }

    #[test]
    fn instruction_is_escaped() {
        let html = result_page("<script>alert(1)</script>", "a.png", None, false).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}

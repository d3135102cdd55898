use std::sync::LazyLock;

use regex::Regex;

use super::error::EmbedError;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));

static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?script\b[^>]*>?").expect("valid regex"));

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(^|[\s"'/>])on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#).expect("valid regex")
});

static DANGEROUS_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:javascript|vbscript)\s*:|data\s*:\s*text/html").expect("valid regex")
});

static IFRAME_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<iframe\b").expect("valid regex"));

fn strip_once(input: &str) -> String {
    let out = SCRIPT_BLOCK.replace_all(input, "");
    let out = SCRIPT_TAG.replace_all(&out, "");
    let out = EVENT_HANDLER.replace_all(&out, "$1");
    let out = DANGEROUS_SCHEME.replace_all(&out, "");
    out.into_owned()
}

/// Strip executable content from embed markup.
///
/// Removes `<script>` blocks and stray script tags, inline `on*=` event
/// handlers, and `javascript:`, `vbscript:` and `data:text/html` URIs. Passes
/// repeat until the markup stops changing, so fragments that reassemble into a
/// dangerous construct after one removal are caught too and the function is
/// idempotent.
///
/// The result must contain exactly one `<iframe`.
pub fn sanitize_embed_code(code: &str) -> Result<String, EmbedError> {
    let mut current = code.trim().to_string();
    loop {
        let next = strip_once(&current);
        // Every pass only removes characters, so this terminates.
        if next == current {
            break;
        }
        current = next;
    }
    let sanitized = current.trim().to_string();

    match IFRAME_OPEN.find_iter(&sanitized).count() {
        0 => Err(EmbedError::NotIframe),
        1 => Ok(sanitized),
        _ => Err(EmbedError::MultipleIframes),
    }
}

use crate::post::{MediaKind, PostResult};

/// Discord rejects messages of this many characters or more
pub const MESSAGE_LIMIT: usize = 2000;

/// Render a pipeline result as a Discord message
pub fn render_reply(result: &PostResult) -> String {
    let reply = match result.kind {
        MediaKind::Video => format!("📹 [{}]({})", result.title, result.content),
        MediaKind::Image => format!("📷 [{}]({})", result.title, result.content),
        MediaKind::Text => format!("📃 {}\n \n{}", result.title, result.content),
        MediaKind::ExternalLink => format!("🌐 [{}]({})", result.title, result.content),
        MediaKind::Error => format!(
            "❌ `{}`\n\n`{}`",
            strip_backticks(&result.title),
            strip_backticks(&result.content)
        ),
    };

    if reply.chars().count() < MESSAGE_LIMIT {
        return reply;
    }

    match &result.source_url {
        Some(url) => format!("Text too long >> [here is the link]({})", url),
        None => truncate(&reply, MESSAGE_LIMIT - 1),
    }
}

// A stray backtick would close the inline code span early
fn strip_backticks(text: &str) -> String {
    text.replace('`', "'")
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

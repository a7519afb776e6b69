//! Text rendering of posts for the assistant and the terminal.

use chrono::{DateTime, Utc};

use crate::model::{EmbedSummary, PostDetail, PostSummary};

const SUMMARY_TEXT_CHARS: usize = 50;
const QUOTE_TEXT_CHARS: usize = 100;
const SEPARATOR_WIDTH: usize = 80;
const NO_TEXT: &str = "(no text content)";

/// Renders a summary line: `"{n}. {name} - {text}... • {age}"`.
pub fn format_summary(post: &PostSummary, now: DateTime<Utc>) -> String {
    format!(
        "{}. {} - {}... • {}",
        post.number,
        post.author.name(),
        truncate_chars(&single_line(&post.text), SUMMARY_TEXT_CHARS),
        age(post.created_at, now)
    )
}

/// Renders a page of summaries, one line each.
pub fn format_page(posts: &[PostSummary], now: DateTime<Utc>) -> String {
    posts
        .iter()
        .map(|p| format_summary(p, now))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the detail block of one post, ending with a separator line.
///
/// Reposts get a "Reposted by" header and the post itself indented.
pub fn format_detail(post: &PostDetail, now: DateTime<Utc>) -> String {
    let mut lines = Vec::new();
    let indent = match post.reposted_by {
        Some(ref by) => {
            lines.push(format!("🔄 Reposted by @{}", by.handle));
            "    "
        }
        None => "",
    };

    let mut line = format!(
        "{}[@{}] {} - {}",
        indent,
        post.author.handle,
        post.author.name(),
        single_line(&post.text)
    );
    if let Some(embed) = post.embed.as_ref().and_then(format_embed) {
        line.push_str(" | ");
        line.push_str(&embed);
    }
    let e = &post.engagement;
    line.push_str(&format!(
        " | 👍 {} 🔄 {} 💬 {} 📝 {} • {}",
        e.likes,
        e.reposts,
        e.replies,
        e.quotes,
        age(post.created_at, now)
    ));
    lines.push(line);
    lines.push("-".repeat(SEPARATOR_WIDTH));
    lines.join("\n")
}

/// Describes an embed, or None when there is nothing worth saying.
pub fn format_embed(embed: &EmbedSummary) -> Option<String> {
    match embed {
        EmbedSummary::Images { count, alt_texts } => {
            let mut s = format!("📷 {} image(s)", count);
            for alt in alt_texts {
                s.push_str(&format!("\n└─ Alt: {}", alt));
            }
            Some(s)
        }
        EmbedSummary::Quote { text } => Some(format!(
            "💬 Quoted: {}...",
            truncate_chars(text, QUOTE_TEXT_CHARS)
        )),
        EmbedSummary::Link { title } => Some(format!("🔗 Link: {}", title)),
        EmbedSummary::Video => Some("🎥 Video".to_string()),
        EmbedSummary::Other => None,
    }
}

fn age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match created_at {
        Some(t) => humanize_since(t, now),
        None => "unknown time".to_string(),
    }
}

/// Relative time in words, e.g. "5 minutes ago", "a day ago".
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 1 {
        return "now".to_string();
    }

    let plural = |n: i64, one: &str, unit: &str| {
        if n == 1 {
            format!("{} ago", one)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    let days = secs / 86_400;
    match secs {
        s if s < 60 => plural(s, "a second", "second"),
        s if s < 3_600 => plural(s / 60, "a minute", "minute"),
        s if s < 86_400 => plural(s / 3_600, "an hour", "hour"),
        _ if days < 30 => plural(days, "a day", "day"),
        _ if days < 365 => plural(days * 2 / 61, "a month", "month"),
        _ => plural(days / 365, "a year", "year"),
    }
}

fn single_line(text: &str) -> String {
    if text.trim().is_empty() {
        return NO_TEXT.to_string();
    }
    text.replace('\n', " ")
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, Engagement};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap()
    }

    fn author(handle: &str, name: Option<&str>) -> Author {
        Author {
            did: format!("did:plc:{}", handle),
            handle: handle.to_string(),
            display_name: name.map(str::to_string),
        }
    }

    fn detail() -> PostDetail {
        PostDetail {
            number: 1,
            uri: "at://p/1".into(),
            cid: "c1".into(),
            author: author("alice.test", Some("Alice")),
            text: "line one\nline two".into(),
            engagement: Engagement {
                likes: 5,
                reposts: 2,
                replies: 1,
                quotes: 0,
            },
            embed: None,
            reposted_by: None,
            created_at: Some(now() - Duration::minutes(5)),
        }
    }

    #[test]
    fn test_humanize() {
        let n = now();
        assert_eq!(humanize_since(n, n), "now");
        assert_eq!(humanize_since(n + Duration::seconds(30), n), "now");
        assert_eq!(humanize_since(n - Duration::seconds(1), n), "a second ago");
        assert_eq!(humanize_since(n - Duration::seconds(42), n), "42 seconds ago");
        assert_eq!(humanize_since(n - Duration::seconds(90), n), "a minute ago");
        assert_eq!(humanize_since(n - Duration::minutes(5), n), "5 minutes ago");
        assert_eq!(humanize_since(n - Duration::minutes(61), n), "an hour ago");
        assert_eq!(humanize_since(n - Duration::hours(3), n), "3 hours ago");
        assert_eq!(humanize_since(n - Duration::hours(30), n), "a day ago");
        assert_eq!(humanize_since(n - Duration::days(45), n), "a month ago");
        assert_eq!(humanize_since(n - Duration::days(100), n), "3 months ago");
        assert_eq!(humanize_since(n - Duration::days(800), n), "2 years ago");
    }

    #[test]
    fn test_format_summary() {
        let mut post = detail().summary();
        assert_eq!(
            format_summary(&post, now()),
            "1. Alice - line one line two... • 5 minutes ago"
        );

        post.text = "x".repeat(80);
        post.author = author("bob.test", None);
        post.created_at = None;
        let line = format_summary(&post, now());
        assert_eq!(line, format!("1. bob.test - {}... • unknown time", "x".repeat(50)));

        post.text = String::new();
        assert!(format_summary(&post, now()).contains("(no text content)"));
    }

    #[test]
    fn test_format_detail() {
        let text = format_detail(&detail(), now());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "[@alice.test] Alice - line one line two | 👍 5 🔄 2 💬 1 📝 0 • 5 minutes ago"
        );
        assert_eq!(lines[1], "-".repeat(80));
    }

    #[test]
    fn test_format_repost_with_images() {
        let mut post = detail();
        post.reposted_by = Some(author("carol.test", Some("Carol")));
        post.embed = Some(EmbedSummary::Images {
            count: 2,
            alt_texts: vec!["a cat".into()],
        });
        let text = format_detail(&post, now());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "🔄 Reposted by @carol.test");
        assert!(lines[1].starts_with("    [@alice.test] Alice - line one line two | 📷 2 image(s)"));
        assert!(lines[2].starts_with("└─ Alt: a cat | 👍 5"));
    }

    #[test]
    fn test_format_embed() {
        let quote = EmbedSummary::Quote {
            text: "q".repeat(150),
        };
        assert_eq!(
            format_embed(&quote),
            Some(format!("💬 Quoted: {}...", "q".repeat(100)))
        );
        assert_eq!(
            format_embed(&EmbedSummary::Link {
                title: "News".into()
            }),
            Some("🔗 Link: News".to_string())
        );
        assert_eq!(format_embed(&EmbedSummary::Video), Some("🎥 Video".to_string()));
        assert_eq!(format_embed(&EmbedSummary::Other), None);
    }
}

//! HTML report rendering. Consumes the final harvested structure only;
//! everything is already deduplicated and nested by the time it lands here.

use tubeharvest_common::{Comment, Video};

/// Render the full harvest report as a standalone HTML document.
pub fn render_report(videos: &[Video]) -> String {
    let mut sections = String::new();

    for video in videos {
        sections.push_str(&render_video(video));
    }

    let content = format!(
        r#"<div class="container">
<h2 style="margin-bottom:16px;">Harvested {count} video{s}</h2>
{sections}</div>"#,
        count = videos.len(),
        s = if videos.len() != 1 { "s" } else { "" },
    );

    build_page("Harvest Report", &content)
}

fn render_video(video: &Video) -> String {
    let mut rows = String::new();

    if video.comments.is_empty() {
        rows.push_str(r#"<p class="empty">No comments collected.</p>"#);
    }

    for comment in &video.comments {
        rows.push_str(&render_comment(comment));
    }

    format!(
        r#"<div class="video-card">
    <div class="video-head">
        <img src="{thumb}" alt="" loading="lazy">
        <h3><a href="{url}" target="_blank" rel="noopener">{title}</a></h3>
    </div>
    <div class="comments">{rows}</div>
</div>"#,
        thumb = html_escape(&video.thumbnail),
        url = html_escape(&video.url),
        title = html_escape(&video.title),
    )
}

fn render_comment(comment: &Comment) -> String {
    let class = if comment.is_reply {
        "comment reply"
    } else {
        "comment"
    };

    format!(
        r#"<div class="{class}">
    <div class="meta"><strong>{author}</strong><span>{published}</span><span>&#128077; {likes}</span></div>
    <p>{text}</p>
</div>"#,
        author = html_escape(&comment.author),
        published = html_escape(&comment.published_at),
        likes = html_escape(&comment.like_count),
        text = html_escape(&comment.text),
    )
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.header h1{{font-size:18px;font-weight:600;}}
.container{{max-width:960px;margin:0 auto;padding:24px;}}
.video-card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;margin-bottom:16px;}}
.video-head{{display:flex;gap:12px;align-items:center;margin-bottom:12px;}}
.video-head img{{width:120px;border-radius:4px;}}
.video-head h3 a{{color:#1a1a1a;text-decoration:none;}}
.video-head h3 a:hover{{color:#0066cc;}}
.comment{{border-top:1px solid #eee;padding:8px 0;}}
.comment .meta{{display:flex;gap:10px;font-size:12px;color:#888;margin-bottom:4px;}}
.comment p{{font-size:14px;color:#333;}}
.reply{{margin-left:32px;border-left:2px solid #e0e0e0;padding-left:12px;}}
.empty{{color:#888;font-size:13px;}}
</style>
</head>
<body>
<div class="header"><h1>{title}</h1></div>
{content}
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(author: &str, is_reply: bool) -> Comment {
        Comment {
            author: author.to_string(),
            text: format!("{author} says hi"),
            like_count: "2".to_string(),
            published_at: "3 days ago".to_string(),
            is_reply,
        }
    }

    #[test]
    fn escapes_markup_in_user_content() {
        assert_eq!(
            html_escape(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn report_marks_replies_and_links_videos() {
        let videos = vec![Video {
            url: "https://example.com/watch?v=1".to_string(),
            title: "A <title>".to_string(),
            thumbnail: "https://example.com/t.jpg".to_string(),
            comments: vec![comment("ann", false), comment("bob", true)],
        }];

        let html = render_report(&videos);
        assert!(html.contains("A &lt;title&gt;"));
        assert!(html.contains(r#"href="https://example.com/watch?v=1""#));
        assert!(html.contains(r#"class="comment reply""#));
        assert!(html.contains("Harvested 1 video<"));
    }

    #[test]
    fn empty_comment_list_renders_placeholder() {
        let videos = vec![Video {
            url: "https://example.com/watch?v=2".to_string(),
            title: "quiet".to_string(),
            thumbnail: "t.jpg".to_string(),
            comments: Vec::new(),
        }];

        let html = render_report(&videos);
        assert!(html.contains("No comments collected."));
    }
}

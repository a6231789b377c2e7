//! XML rendering of the feed.
//!
//! ```text
//! <drumkit_list>
//!   <drumkit>
//!     <name/> <url/> <info/> <author/> <license/>
//!   </drumkit>
//!   <pattern>...</pattern>
//!   <song>...</song>
//! </drumkit_list>
//! ```

use std::fmt::Write;

use super::classify::Category;
use super::feed::{FeedItem, HydrogenFeed};

/// Render the feed as an XML document
pub fn render(feed: &HydrogenFeed) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<drumkit_list>\n");

    for category in Category::ALL {
        for item in feed.get(category) {
            write_item(&mut out, category.as_str(), item);
        }
    }

    out.push_str("</drumkit_list>\n");
    out
}

fn write_item(out: &mut String, element: &str, item: &FeedItem) {
    // Writing to a String cannot fail
    let _ = writeln!(out, "  <{}>", element);
    for (tag, value) in [
        ("name", &item.name),
        ("url", &item.url),
        ("info", &item.info),
        ("author", &item.author),
        ("license", &item.license),
    ] {
        let _ = writeln!(out, "    <{tag}>{}</{tag}>", escape(value));
    }
    let _ = writeln!(out, "  </{}>", element);
}

/// Escape text for use in element content
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> FeedItem {
        FeedItem {
            id: 1,
            name: name.to_string(),
            author: "Drumbrum".to_string(),
            license: "Public Domain".to_string(),
            info: "Kicks & snares".to_string(),
            url: "https://example.com/kit.h2drumkit?a=1&b=2".to_string(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(
            escape(r#"<a href="x">R&B's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;R&amp;B&apos;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_empty_feed() {
        let xml = render(&HydrogenFeed::default());
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<drumkit_list>\n</drumkit_list>\n"
        );
    }

    #[test]
    fn test_render_groups_in_category_order() {
        let feed = HydrogenFeed {
            drumkits: vec![item("Kit")],
            patterns: vec![item("Groove")],
            songs: vec![item("Tune")],
        };

        let xml = render(&feed);
        let drumkit = xml.find("<drumkit>").unwrap();
        let pattern = xml.find("<pattern>").unwrap();
        let song = xml.find("<song>").unwrap();

        assert!(drumkit < pattern && pattern < song);
        assert!(xml.contains("    <name>Kit</name>\n"));
        assert!(xml.contains("<info>Kicks &amp; snares</info>"));
        assert!(xml.contains("<url>https://example.com/kit.h2drumkit?a=1&amp;b=2</url>"));
        assert!(xml.contains("<license>Public Domain</license>"));
        assert_eq!(xml.matches("<author>Drumbrum</author>").count(), 3);
    }
}

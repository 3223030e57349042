// Lexical highlighting of source text into per-line HTML fragments

use crate::utils::escape_html;
use once_cell::sync::Lazy;
use regex::Regex;

/// Token classes, in the order of the capture groups below
const CLASSES: [&str; 4] = ["comment", "string", "number", "keyword"];

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<comment>//[^\n]*|/\*(?s:.*?)\*/)",
        r#"|(?P<string>"(?:\\.|[^"\\])*"|'(?:\\.|[^'\\\n])')"#,
        r"|(?P<number>\b\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?\b)",
        r"|(?P<keyword>\b(?:as|async|await|break|const|continue|crate|dyn|else|enum|extern|false|fn|for|if|impl|in|let|loop|match|mod|move|mut|pub|ref|return|self|Self|static|struct|super|trait|true|type|unsafe|use|where|while)\b)",
    ))
    .expect("token pattern is valid")
});

/// Highlight a whole source file.
///
/// Returns one HTML fragment per source line. Tokens that span lines (block
/// comments, multi-line strings) are closed at the end of each line and
/// reopened on the next, so every fragment is balanced on its own.
pub fn highlight_lines(source: &str) -> Vec<String> {
    let mut builder = LineBuilder::default();
    let mut last = 0;

    for caps in TOKEN.captures_iter(source) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        builder.push(&source[last..token.start()], None);
        let class = CLASSES.into_iter().find(|c| caps.name(c).is_some());
        builder.push(token.as_str(), class);
        last = token.end();
    }
    builder.push(&source[last..], None);

    builder.finish()
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<String>,
    current: String,
}

impl LineBuilder {
    fn push(&mut self, text: &str, class: Option<&str>) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.lines.push(std::mem::take(&mut self.current));
            }
            let segment = segment.strip_suffix('\r').unwrap_or(segment);
            if segment.is_empty() {
                continue;
            }
            match class {
                Some(class) => {
                    self.current.push_str(&format!(
                        "<span class=\"{}\">{}</span>",
                        class,
                        escape_html(segment)
                    ));
                }
                None => self.current.push_str(&escape_html(segment)),
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_fragment_per_line() {
        let lines = highlight_lines("fn main() {\n    let x = 1;\n}\n");
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("<span class=\"keyword\">fn</span>"));
        assert!(lines[1].contains("<span class=\"number\">1</span>"));
        assert_eq!(lines[2], "}");
    }

    #[test]
    fn test_text_is_escaped() {
        let lines = highlight_lines("if a < b && c > d {}");
        assert!(lines[0].contains("&lt;"));
        assert!(lines[0].contains("&amp;&amp;"));
        assert!(!lines[0].contains(" < "));
    }

    #[test]
    fn test_block_comment_is_reopened_per_line() {
        let lines = highlight_lines("/* one\ntwo */ x");
        assert_eq!(lines[0], "<span class=\"comment\">/* one</span>");
        assert_eq!(lines[1], "<span class=\"comment\">two */</span> x");
    }

    #[test]
    fn test_string_contents_are_not_keywords() {
        let lines = highlight_lines("let s = \"fn in string\";");
        assert!(lines[0].contains("<span class=\"string\">&quot;fn in string&quot;</span>"));
    }

    #[test]
    fn test_lifetimes_are_not_strings() {
        let lines = highlight_lines("fn f<'a>(x: &'a str) {}");
        assert!(!lines[0].contains("class=\"string\""));
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let lines = highlight_lines("a\n\nb");
        assert_eq!(lines, vec!["a".to_string(), String::new(), "b".to_string()]);
    }
}

//! Tiny HTML syntax highlighter for the fake editor pane.
//!
//! Output is escaped HTML where recognised tokens are wrapped in
//! `<span class="...">`. It is a single pass lexer, not a parser: good
//! enough for the handful of files the editor shows.

use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    TypeScript,
    Json,
    Markdown,
    Text,
}

impl Language {
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("ts" | "tsx" | "js") => Language::TypeScript,
            Some("json") => Language::Json,
            Some("md") => Language::Markdown,
            _ => Language::Text,
        }
    }
}

const KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "return", "if", "else", "for", "while", "class", "export",
    "import", "from", "async", "await", "new", "this", "try", "catch", "interface", "type",
    "extends", "implements", "private", "public", "protected", "readonly", "static", "get", "set",
    "super", "default", "throw", "typeof", "instanceof",
];

const BUILTINS: &[&str] = &[
    "console", "require", "module", "process", "document", "window", "Promise", "Map", "Set",
    "Array", "Object", "String", "Number", "Boolean", "Date", "Math", "JSON", "Error",
];

pub fn highlight(code: &str, language: Language) -> String {
    match language {
        Language::TypeScript => script(code),
        Language::Json => json(code),
        Language::Markdown => markdown(code),
        Language::Text => escape(code),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn span(out: &mut String, class: &str, text: &str) {
    let _ = write!(out, "<span class=\"{class}\">");
    push_escaped(out, text);
    out.push_str("</span>");
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Byte index just past a quoted run starting at `start`, honouring `\`.
fn string_end(src: &str, start: usize, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in src[start + 1..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return start + 1 + i + 1;
        }
    }
    src.len()
}

fn number_end(src: &str, start: usize) -> usize {
    let bytes = src.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

fn script(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 2);
    let mut i = 0;
    let mut prev: Option<char> = None;

    while i < src.len() {
        let rest = &src[i..];
        let Some(c) = rest.chars().next() else { break };

        let end = if rest.starts_with("//") {
            let end = rest.find('\n').map_or(src.len(), |n| i + n);
            span(&mut out, "comment", &src[i..end]);
            end
        } else if rest.starts_with("/*") {
            let end = rest[2..].find("*/").map_or(src.len(), |n| i + 2 + n + 2);
            span(&mut out, "comment", &src[i..end]);
            end
        } else if matches!(c, '"' | '\'' | '`') {
            let end = string_end(src, i, c);
            span(&mut out, "string", &src[i..end]);
            end
        } else if c.is_ascii_digit() && !prev.is_some_and(is_ident) {
            let end = number_end(src, i);
            span(&mut out, "number", &src[i..end]);
            end
        } else if is_ident_start(c) {
            let len = rest.find(|ch: char| !is_ident(ch)).unwrap_or(rest.len());
            let word = &rest[..len];
            let called = rest[len..].trim_start_matches([' ', '\t']).starts_with('(');
            if KEYWORDS.contains(&word) {
                span(&mut out, "keyword", word);
            } else if BUILTINS.contains(&word) {
                span(&mut out, "builtin", word);
            } else if called {
                span(&mut out, "function", word);
            } else {
                out.push_str(word);
            }
            i + len
        } else {
            push_escaped(&mut out, &rest[..c.len_utf8()]);
            i + c.len_utf8()
        };

        prev = src[..end].chars().next_back();
        i = end;
    }

    out
}

fn json(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 2);
    let mut i = 0;

    while i < src.len() {
        let rest = &src[i..];
        let Some(c) = rest.chars().next() else { break };

        i = if c == '"' {
            let end = string_end(src, i, '"');
            let is_key = src[end..].trim_start().starts_with(':');
            span(&mut out, if is_key { "property" } else { "string" }, &src[i..end]);
            end
        } else if c.is_ascii_digit() || (c == '-' && rest[1..].starts_with(|d: char| d.is_ascii_digit())) {
            let end = number_end(src, i + usize::from(c == '-'));
            span(&mut out, "number", &src[i..end]);
            end
        } else if let Some(word) = ["true", "false", "null"].into_iter().find(|w| rest.starts_with(w)) {
            span(&mut out, "keyword", word);
            i + word.len()
        } else {
            push_escaped(&mut out, &rest[..c.len_utf8()]);
            i + c.len_utf8()
        };
    }

    out
}

fn markdown(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 2);
    let mut in_fence = false;

    for (n, line) in src.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }

        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            span(&mut out, "comment", line);
            continue;
        }
        if in_fence {
            span(&mut out, "comment", line);
            continue;
        }

        let hashes = line.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&hashes) && line[hashes..].starts_with([' ', '\t']) {
            span(&mut out, "keyword", &line[..hashes]);
            out.push(' ');
            span(&mut out, "function", line[hashes..].trim_start());
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let body = &line[indent..];
        if (body.starts_with("- ") || body.starts_with("* ")) && body.len() > 2 {
            span(&mut out, "comment", &line[..indent + 1]);
            out.push(' ');
            inline_code(&mut out, body[1..].trim_start());
            continue;
        }

        inline_code(&mut out, line);
    }

    out
}

fn inline_code(out: &mut String, line: &str) {
    let mut parts = line.split('`');
    if let Some(first) = parts.next() {
        push_escaped(out, first);
    }
    let rest: Vec<&str> = parts.collect();
    let mut idx = 0;
    while idx < rest.len() {
        if idx + 1 < rest.len() {
            span(out, "string", &format!("`{}`", rest[idx]));
            push_escaped(out, rest[idx + 1]);
            idx += 2;
        } else {
            // unmatched backtick
            out.push('`');
            push_escaped(out, rest[idx]);
            idx += 1;
        }
    }
}

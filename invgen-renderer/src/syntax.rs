//! Delimiter translation.
//!
//! Tera's markers are fixed (`{{ }}`, `{% %}`, `{# #}`). Templates here use
//! one configurable marker pair for everything, so before handing a template
//! to Tera it is rewritten:
//!
//! | source (with `[[`/`]]`)   | Tera                           |
//! |---------------------------|--------------------------------|
//! | `[[ expr ]]`              | `{{ expr }}`                   |
//! | `[[ if x ]]`, `[[ endif ]]` … | `{% if x %}`, `{% endif %}` … |
//! | `[[# note #]]`            | (dropped)                      |
//! | `[[- expr -]]`            | `{{- expr -}}`                 |
//! | `[[ .a.b ]]`              | `{{ a.b }}`                    |
//! | literal `{{`, `{%`, `{#`  | `{{ "{" }}{`, …                |
//!
//! Positions in errors are 1-based line/column of the opening marker.

use invgen_core::Delimiters;

use crate::error::RenderError;

/// First words that turn a placeholder into a statement tag.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if",
    "elif",
    "else",
    "endif",
    "for",
    "endfor",
    "set",
    "set_global",
    "filter",
    "endfilter",
    "break",
    "continue",
];

/// Words that look like a path head but are literals or operators.
const RESERVED_WORDS: &[&str] = &["true", "false", "True", "False", "not", "none", "None"];

/// Tera source for one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Translation {
    pub(crate) source: String,
    /// Top-level names read by `if`/`elif` conditions and not bound by an
    /// enclosing `for` or `set`, in first-seen order.
    pub(crate) condition_keys: Vec<String>,
}

/// Names bound inside the template, innermost `for` last.
struct Scopes {
    frames: Vec<Vec<String>>,
}

impl Scopes {
    fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.iter().any(|n| n == name))
    }

    fn bind(&mut self, name: &str, global: bool) {
        let frame = if global {
            self.frames.first_mut()
        } else {
            self.frames.last_mut()
        };
        if let Some(frame) = frame {
            frame.push(name.to_string());
        }
    }

    fn enter_for(&mut self, header: &str) {
        let targets = header.split(" in ").next().unwrap_or("");
        let mut frame: Vec<String> = targets
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        frame.push("loop".to_string());
        self.frames.push(frame);
    }

    fn exit_for(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }
}

/// Rewrite `src` into Tera syntax.
///
/// With `strict == false`, a print placeholder that is a plain variable path
/// (optionally followed by filters) gets `| default(value="")` so that a
/// missing path renders empty.
pub(crate) fn translate(
    src: &str,
    delims: &Delimiters,
    strict: bool,
) -> Result<Translation, RenderError> {
    let left = delims.left.as_str();
    let right = delims.right.as_str();
    let mut out = Translation {
        source: String::with_capacity(src.len() + 32),
        condition_keys: Vec::new(),
    };
    let mut scopes = Scopes::new();
    let mut pos = 0;

    while let Some(found) = src[pos..].find(left) {
        let open = pos + found;
        push_literal(&mut out.source, &src[pos..open]);

        let body_start = open + left.len();
        let body_len = find_close(&src[body_start..], right).ok_or_else(|| {
            let (line, col) = line_col(src, open);
            RenderError::TemplateSyntax {
                message: format!(
                    "unclosed placeholder at line {line}, column {col}: missing `{right}`"
                ),
            }
        })?;
        push_tag(&mut out, &mut scopes, &src[body_start..body_start + body_len], strict);
        pos = body_start + body_len + right.len();
    }
    push_literal(&mut out.source, &src[pos..]);
    Ok(out)
}

fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let col = before
        .rfind('\n')
        .map(|nl| before[nl + 1..].chars().count())
        .unwrap_or_else(|| before.chars().count())
        + 1;
    (line, col)
}

/// Byte offset of the closing marker in `body`, skipping string literals.
///
/// A comment (`#…#`, optionally with `-` trim markers) ends at the first
/// closing marker preceded by its closing `#`.
fn find_close(body: &str, right: &str) -> Option<usize> {
    let opening = body.trim_start_matches('-').trim_start();
    if opening.starts_with('#') {
        let text_start = body.len() - opening.len() + 1;
        return body
            .match_indices(right)
            .map(|(i, _)| i)
            .find(|&i| i >= text_start && closes_comment(&body[text_start..i]));
    }
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None if body[i..].starts_with(right) => return Some(i),
            None => {}
        }
    }
    None
}

/// Comment text so far ends in `#`, or `#` plus a trim marker.
fn closes_comment(text: &str) -> bool {
    let t = text.trim_end();
    let t = t.strip_suffix('-').map(str::trim_end).unwrap_or(t);
    t.ends_with('#')
}

/// Literal text: neutralise anything Tera would read as a tag opener.
fn push_literal(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let opens_tag = c == '{' && matches!(chars.peek(), None | Some('{' | '%' | '#'));
        if opens_tag {
            out.push_str("{{ \"{\" }}");
        } else {
            out.push(c);
        }
    }
}

fn push_tag(out: &mut Translation, scopes: &mut Scopes, body: &str, strict: bool) {
    let (trim_left, body) = match body.strip_prefix('-') {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('#') => {
            (true, rest)
        }
        _ => (false, body),
    };
    let (trim_right, body) = match body.strip_suffix('-') {
        Some(rest) if rest.ends_with(char::is_whitespace) || rest.ends_with('#') => (true, rest),
        _ => (false, body),
    };
    let lt = if trim_left { "-" } else { "" };
    let rt = if trim_right { "-" } else { "" };
    let body = body.trim();

    if body.starts_with('#') {
        // Comments vanish, but still honour whitespace trimming.
        if trim_left || trim_right {
            out.source.push_str(&format!("{{{{{lt} \"\" {rt}}}}}"));
        }
        return;
    }

    let expr = strip_leading_dots(body);
    let keyword = expr
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("");
    if STATEMENT_KEYWORDS.contains(&keyword) {
        let rest = expr[keyword.len()..].trim_start();
        match keyword {
            "if" | "elif" => {
                for head in condition_heads(rest) {
                    let known = out.condition_keys.iter().any(|k| k == head);
                    if !known && !scopes.is_bound(head) {
                        out.condition_keys.push(head.to_string());
                    }
                }
            }
            "for" => scopes.enter_for(rest),
            "endfor" => scopes.exit_for(),
            "set" | "set_global" => {
                let name = rest.split('=').next().unwrap_or("").trim();
                if !name.is_empty() {
                    scopes.bind(name, keyword == "set_global");
                }
            }
            _ => {}
        }
        out.source.push_str(&format!("{{%{lt} {expr} {rt}%}}"));
        return;
    }

    let expr = if strict { expr } else { with_empty_default(&expr) };
    out.source.push_str(&format!("{{{{{lt} {expr} {rt}}}}}"));
}

/// Operators, literals and test keywords that can appear in a condition.
const CONDITION_WORDS: &[&str] = &[
    "and", "or", "not", "in", "is", "true", "false", "True", "False", "none", "None",
];

/// Head identifiers of the variable paths a condition reads.
///
/// Skips field names after `.`, filter names after `|`, test names after
/// `is` / `is not`, function names, keyword argument names, and paths
/// guarded by `| default(...)` or `is [not] defined`.
fn condition_heads(cond: &str) -> Vec<&str> {
    let mut heads = Vec::new();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut words: (&str, &str) = ("", "");
    let mut chars = cond.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                prev = Some(c);
            }
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        if !is_ident_start(c) {
            if matches!(c, '"' | '\'' | '`') {
                quote = Some(c);
            }
            prev = Some(c);
            words = ("", "");
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, n)) = chars.peek() {
            if !is_ident_char(n) {
                break;
            }
            end = i + n.len_utf8();
            chars.next();
        }
        let word = &cond[start..end];
        let rest = cond[end..].trim_start();

        let is_test = words.0 == "is" || (words.0 == "not" && words.1 == "is");
        let follows_value = prev.is_some_and(|p| p == '.' || p == '|' || p.is_ascii_digit());
        let is_call = rest.starts_with('(');
        let is_kwarg = rest.starts_with('=') && !rest.starts_with("==");
        let skip = is_test
            || follows_value
            || is_call
            || is_kwarg
            || CONDITION_WORDS.contains(&word)
            || is_guarded(&cond[end..]);
        if !skip {
            heads.push(word);
        }

        prev = Some('a');
        words = (word, words.0);
    }
    heads
}

/// Whether the path tail that starts at `tail` is wrapped in a
/// missing-value guard.
fn is_guarded(tail: &str) -> bool {
    let mut rest = tail;
    while let Some(after_dot) = rest.strip_prefix('.') {
        let len = after_dot
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(after_dot.len());
        rest = &after_dot[len..];
    }
    let rest = rest.trim_start();
    if let Some(filter) = rest.strip_prefix('|') {
        return filter.trim_start().starts_with("default");
    }
    let Some(test) = rest.strip_prefix("is") else {
        return false;
    };
    let test = test.trim_start();
    let test = test.strip_prefix("not").map(str::trim_start).unwrap_or(test);
    test.starts_with("defined") || test.starts_with("undefined")
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `.a.b` → `a.b`, outside string literals. A dot after an identifier,
/// digit, `)`, `]` or another dot is field access or a float and is kept.
fn strip_leading_dots(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None if c == '.' => {
                let after_value = prev.is_some_and(|p| is_ident_char(p) || matches!(p, ')' | ']' | '.'));
                let before_ident = chars.peek().copied().is_some_and(is_ident_start);
                if !after_value && before_ident {
                    prev = Some(c);
                    continue;
                }
            }
            None => {}
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Insert `| default(value="")` after a leading variable path.
fn with_empty_default(expr: &str) -> String {
    let path_len = expr
        .char_indices()
        .find(|&(_, c)| !(is_ident_char(c) || c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(expr.len());
    let (path, rest) = expr.split_at(path_len);

    let is_path = path.chars().next().is_some_and(is_ident_start)
        && !path.ends_with('.')
        && !RESERVED_WORDS.contains(&path);
    let rest_trimmed = rest.trim_start();
    let plain = rest_trimmed.is_empty() || rest_trimmed.starts_with('|');
    if is_path && plain {
        format!("{path} | default(value=\"\"){rest}")
    } else {
        expr.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn braces() -> Delimiters {
        Delimiters::default()
    }

    fn squares() -> Delimiters {
        Delimiters::new("[[", "]]")
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(translate("Test Content", &braces(), true).unwrap().source, "Test Content");
    }

    #[test]
    fn expression_placeholder() {
        assert_eq!(
            translate("Test {{ KeyOne }} Content", &braces(), true).unwrap().source,
            "Test {{ KeyOne }} Content"
        );
        assert_eq!(
            translate("Test [[KeyOne]] Content", &squares(), true).unwrap().source,
            "Test {{ KeyOne }} Content"
        );
    }

    #[test]
    fn statement_placeholders() {
        let out = translate("[[ if on ]]yes[[ else ]]no[[ endif ]]", &squares(), true).unwrap().source;
        assert_eq!(out, "{% if on %}yes{% else %}no{% endif %}");
        let out = translate("[[ for x in xs ]][[ x ]][[ endfor ]]", &squares(), true).unwrap().source;
        assert_eq!(out, "{% for x in xs %}{{ x }}{% endfor %}");
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(translate("a[[# note #]]b", &squares(), true).unwrap().source, "ab");
        assert_eq!(
            translate("a [[- # note # ]] b", &squares(), true).unwrap().source,
            "a {{- \"\" }} b"
        );
    }

    #[test]
    fn comment_runs_to_closing_hash() {
        assert_eq!(translate("a[[# a ]] #]]b", &squares(), true).unwrap().source, "ab");
        assert!(translate("a[[# never closed ]]", &squares(), true).is_err());
    }

    #[test]
    fn trimming_comment_without_space() {
        assert_eq!(
            translate("a {{-# c #}} b", &braces(), true).unwrap().source,
            "a {{- \"\" }} b"
        );
        assert_eq!(
            translate("a {{# c #-}} b", &braces(), true).unwrap().source,
            "a {{ \"\" -}} b"
        );
    }

    #[test]
    fn trim_markers_pass_through() {
        assert_eq!(
            translate("a [[- x -]] b", &squares(), true).unwrap().source,
            "a {{- x -}} b"
        );
        // `-5` is a number, not a trim marker.
        assert_eq!(translate("[[-5]]", &squares(), true).unwrap().source, "{{ -5 }}");
    }

    #[test]
    fn leading_dot_paths() {
        assert_eq!(strip_leading_dots(".KeyOne"), "KeyOne");
        assert_eq!(strip_leading_dots(".app.name | upper"), "app.name | upper");
        assert_eq!(strip_leading_dots("add(a=.x, b=1.5)"), "add(a=x, b=1.5)");
        assert_eq!(strip_leading_dots("\".hidden\" ~ .a"), "\".hidden\" ~ a");
        assert_eq!(strip_leading_dots("list.0.name"), "list.0.name");
    }

    #[test]
    fn literal_tera_markers_are_escaped() {
        let out = translate("{% raw %} [[ x ]] {#", &squares(), true).unwrap().source;
        assert_eq!(out, "{{ \"{\" }}% raw %} {{ x }} {{ \"{\" }}#");
        // A trailing `{` would merge with the next tag opener.
        let out = translate("a{[[ x ]]", &squares(), true).unwrap().source;
        assert_eq!(out, "a{{ \"{\" }}{{ x }}");
    }

    #[test]
    fn closing_marker_inside_string_is_ignored() {
        let out = translate("[[ \"]]\" ~ x ]]", &squares(), true).unwrap().source;
        assert_eq!(out, "{{ \"]]\" ~ x }}");
    }

    #[test]
    fn unclosed_placeholder_reports_position() {
        let err = translate("line one\n  [[ x", &squares(), true).unwrap_err();
        match err {
            RenderError::TemplateSyntax { message } => {
                assert!(message.contains("line 2, column 3"), "got: {message}");
                assert!(message.contains("]]"), "got: {message}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn condition_keys_are_collected() {
        let t = translate(
            "{{ if .A and not B.x }}{{ elif C == \"D\" or A }}{{ endif }}",
            &braces(),
            true,
        )
        .unwrap();
        assert_eq!(t.condition_keys, vec!["A", "B", "C"]);
        assert_eq!(t.source, "{% if A and not B.x %}{% elif C == \"D\" or A %}{% endif %}");
    }

    #[test]
    fn bound_names_are_not_condition_keys() {
        let src = "{{ for k, v in M }}{{ if v and loop.last }}{{ endif }}{{ endfor }}\
                   {{ set n = 1 }}{{ if n }}{{ endif }}{{ if v }}{{ endif }}";
        let t = translate(src, &braces(), true).unwrap();
        assert_eq!(t.condition_keys, vec!["v"]);
    }

    #[test]
    fn condition_heads_skip_non_variables() {
        assert_eq!(condition_heads("x | length > 0"), vec!["x"]);
        assert_eq!(condition_heads("var(key=\"k\") == 1"), Vec::<&str>::new());
        assert_eq!(condition_heads("x is not odd"), vec!["x"]);
        assert_eq!(condition_heads("x.y is defined"), Vec::<&str>::new());
        assert_eq!(condition_heads("x | default(value=false)"), Vec::<&str>::new());
        assert_eq!(condition_heads("\"a b\" in list"), vec!["list"]);
        assert_eq!(condition_heads("m[k] > 1.5"), vec!["m", "k"]);
    }

    #[test]
    fn lenient_mode_defaults_plain_paths() {
        assert_eq!(with_empty_default("a.b"), "a.b | default(value=\"\")");
        assert_eq!(
            with_empty_default("name | upper"),
            "name | default(value=\"\") | upper"
        );
        assert_eq!(with_empty_default("var(key=\"x\")"), "var(key=\"x\")");
        assert_eq!(with_empty_default("a + 1"), "a + 1");
        assert_eq!(with_empty_default("true"), "true");
        assert_eq!(with_empty_default("\"lit\""), "\"lit\"");
    }
}

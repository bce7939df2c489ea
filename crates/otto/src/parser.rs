//! Extraction of directives from a model reply and parsing of action call
//! text into a tool name plus positional string arguments.
//!
//! A reply is scanned for `<thought>`, `<action>` and `<final_answer>` tags;
//! an action body is expected to look like `tool_name("arg1", "arg2")`. Both
//! passes are plain left-to-right scans so behavior stays deterministic for
//! whatever the model emits.

use serde::{Deserialize, Serialize};

use crate::errors::{AgentError, AgentResult};

/// Directives extracted from a single assistant reply.
///
/// A reply may carry one thought, any number of actions and at most one
/// final answer. The first occurrence wins for the single-valued tags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Directives {
    pub thought: Option<String>,
    pub actions: Vec<String>,
    pub final_answer: Option<String>,
}

impl Directives {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.final_answer.is_none()
    }
}

/// Scan a reply for the tags of the directive grammar. Tags are
/// case-sensitive, never nested per type, and bodies may span lines.
pub fn extract_directives(reply: &str) -> Directives {
    Directives {
        thought: extract_first(reply, "thought"),
        actions: extract_all(reply, "action"),
        final_answer: extract_first(reply, "final_answer"),
    }
}

fn extract_first(text: &str, tag: &str) -> Option<String> {
    extract_from(text, tag, 0).map(|(body, _)| body)
}

fn extract_all(text: &str, tag: &str) -> Vec<String> {
    let mut bodies = Vec::new();
    let mut from = 0;
    while let Some((body, next)) = extract_from(text, tag, from) {
        bodies.push(body);
        from = next;
    }
    bodies
}

/// Find the next `<tag>...</tag>` pair at or after `from`. Returns the
/// trimmed body and the offset just past the closing tag. An opening tag
/// without its closing counterpart yields nothing.
fn extract_from(text: &str, tag: &str, from: usize) -> Option<(String, usize)> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = text[from..].find(&open)? + from + open.len();
    let end = text[start..].find(&close)? + start;
    Some((text[start..end].trim().to_string(), end + close.len()))
}

/// A tool invocation recovered from an action body. Arguments are positional
/// and untyped; any coercion is the receiving tool's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAction {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `name(arg1, arg2, ...)` into a [`ParsedAction`].
///
/// The tool name is the identifier immediately before the first `(`; the
/// argument list runs to the last `)`. Anything that does not fit that shape
/// is a [`AgentError::MalformedAction`].
pub fn parse_action(raw: &str) -> AgentResult<ParsedAction> {
    let raw = raw.trim();
    let open = raw
        .find('(')
        .ok_or_else(|| AgentError::MalformedAction(raw.to_string()))?;
    let close = raw
        .rfind(')')
        .filter(|&end| end > open)
        .ok_or_else(|| AgentError::MalformedAction(raw.to_string()))?;

    let head = raw[..open].trim_end();
    let name_start = head
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &head[name_start..];
    if name.is_empty() {
        return Err(AgentError::MalformedAction(raw.to_string()));
    }

    Ok(ParsedAction {
        name: name.to_string(),
        args: parse_arguments(&raw[open + 1..close]),
    })
}

/// Split an argument-list body on top-level commas.
///
/// The scan keeps three pieces of state: whether it is inside a quoted
/// string (single or double, with `\`-escaped quotes not ending it) and a
/// parenthesis depth counter for unquoted text. Commas inside quotes or
/// nested parentheses do not split. An empty body yields zero arguments; an
/// unterminated quote runs as literal text to the end of the string — known
/// looseness, kept on purpose.
fn parse_arguments(body: &str) -> Vec<String> {
    if body.trim().is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut string_char = '"';
    let mut paren_depth: i32 = 0;
    let mut prev: Option<char> = None;

    for ch in body.chars() {
        if in_string {
            current.push(ch);
            if ch == string_char && prev != Some('\\') {
                in_string = false;
            }
        } else {
            match ch {
                '"' | '\'' => {
                    in_string = true;
                    string_char = ch;
                    current.push(ch);
                }
                '(' => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' => {
                    paren_depth -= 1;
                    current.push(ch);
                }
                ',' if paren_depth == 0 => {
                    args.push(parse_single_arg(&current));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }
        prev = Some(ch);
    }

    if !current.is_empty() {
        args.push(parse_single_arg(&current));
    }

    args
}

/// Unwrap a quoted argument and decode its escapes; pass anything else
/// through trimmed and unchanged (bare numbers, booleans, ...).
fn parse_single_arg(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return unescape(&trimmed[1..trimmed.len() - 1]);
        }
    }
    trimmed.to_string()
}

/// Decode `\"`, `\'`, `\\`, `\n`, `\t` and `\r` in a single left-to-right
/// pass. An unrecognized escape keeps its backslash.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_extract_thought_action_and_final_answer() {
        let reply = indoc! {r#"
            <thought>I should read the file first.</thought>
            <action>read_file("/tmp/a.txt")</action>
        "#};
        let directives = extract_directives(reply);
        assert_eq!(
            directives.thought.as_deref(),
            Some("I should read the file first.")
        );
        assert_eq!(directives.actions, vec![r#"read_file("/tmp/a.txt")"#]);
        assert_eq!(directives.final_answer, None);

        let reply = "<final_answer>All done.</final_answer>";
        let directives = extract_directives(reply);
        assert_eq!(directives.thought, None);
        assert!(directives.actions.is_empty());
        assert_eq!(directives.final_answer.as_deref(), Some("All done."));
    }

    #[test]
    fn test_extract_multiple_actions_in_document_order() {
        let reply = indoc! {r#"
            <thought>Two steps.</thought>
            <action>create_directory("demo")</action>
            some prose in between
            <action>write_to_file("demo/a.txt", "hi")</action>
        "#};
        let directives = extract_directives(reply);
        assert_eq!(
            directives.actions,
            vec![
                r#"create_directory("demo")"#,
                r#"write_to_file("demo/a.txt", "hi")"#,
            ]
        );
    }

    #[test]
    fn test_extract_multiline_tag_body() {
        let reply = "<final_answer>line one\nline two</final_answer>";
        let directives = extract_directives(reply);
        assert_eq!(
            directives.final_answer.as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn test_extract_ignores_unclosed_tag() {
        let reply = "<thought>never closed <action>foo()</action>";
        let directives = extract_directives(reply);
        // The thought tag has no closing counterpart; the action is intact.
        assert_eq!(directives.thought, None);
        assert_eq!(directives.actions, vec!["foo()"]);
    }

    #[test]
    fn test_extract_nothing_from_plain_text() {
        let directives = extract_directives("I will get to it eventually.");
        assert!(directives.is_empty());
        assert_eq!(directives.thought, None);
    }

    #[test]
    fn test_parse_simple_call() {
        let action = parse_action(r#"write_to_file("a.txt", "hello")"#).unwrap();
        assert_eq!(action.name, "write_to_file");
        assert_eq!(action.args, vec!["a.txt", "hello"]);
    }

    #[test]
    fn test_parse_empty_args_is_zero_args() {
        let action = parse_action("foo()").unwrap();
        assert_eq!(action.name, "foo");
        assert_eq!(action.args, Vec::<String>::new());

        // whitespace-only bodies count as empty too
        let action = parse_action("foo(  )").unwrap();
        assert_eq!(action.args, Vec::<String>::new());
    }

    #[test]
    fn test_parse_escape_sequences_round_trip() {
        let action = parse_action(r#"write_to_file("a.txt", "line1\nline2")"#).unwrap();
        assert_eq!(action.args, vec!["a.txt", "line1\nline2"]);

        let action = parse_action(r#"echo("he said \"hi\", then left")"#).unwrap();
        assert_eq!(action.args, vec![r#"he said "hi", then left"#]);

        let action = parse_action(r#"echo("tab\there", "back\\slash", "cr\rend")"#).unwrap();
        assert_eq!(action.args, vec!["tab\there", "back\\slash", "cr\rend"]);

        let action = parse_action(r#"echo('single \'quoted\'')"#).unwrap();
        assert_eq!(action.args, vec!["single 'quoted'"]);
    }

    #[test]
    fn test_parse_comma_inside_quotes_does_not_split() {
        let action = parse_action(r#"search_files("*.cs", "src, tests")"#).unwrap();
        assert_eq!(action.args, vec!["*.cs", "src, tests"]);
    }

    #[test]
    fn test_parse_nested_parens_do_not_split() {
        let action = parse_action(r#"run("echo (hi)")"#).unwrap();
        assert_eq!(action.args, vec!["echo (hi)"]);

        let action = parse_action("calc(max(1, 2), 3)").unwrap();
        assert_eq!(action.name, "calc");
        assert_eq!(action.args, vec!["max(1, 2)", "3"]);
    }

    #[test]
    fn test_parse_bare_arguments_pass_through() {
        let action = parse_action("resize(640, 480, true)").unwrap();
        assert_eq!(action.args, vec!["640", "480", "true"]);
    }

    #[test]
    fn test_parse_unterminated_quote_stays_literal() {
        // Known looseness: the dangling quote is literal text to end-of-string.
        let action = parse_action(r#"foo("unterminated)"#).unwrap();
        assert_eq!(action.args, vec![r#""unterminated"#]);
    }

    #[test]
    fn test_parse_name_with_surrounding_prose() {
        let action = parse_action(r#"please run read_file("a.txt")"#).unwrap();
        assert_eq!(action.name, "read_file");
        assert_eq!(action.args, vec!["a.txt"]);
    }

    #[test]
    fn test_parse_multiline_unquoted_argument() {
        let action = parse_action("note(first\nsecond)").unwrap();
        assert_eq!(action.args, vec!["first\nsecond"]);
    }

    #[test]
    fn test_parse_rejects_malformed_calls() {
        assert!(matches!(
            parse_action("not a call"),
            Err(AgentError::MalformedAction(_))
        ));
        assert!(matches!(
            parse_action("dangling(open"),
            Err(AgentError::MalformedAction(_))
        ));
        assert!(matches!(
            parse_action(r#"("anonymous")"#),
            Err(AgentError::MalformedAction(_))
        ));
        assert!(matches!(
            parse_action(""),
            Err(AgentError::MalformedAction(_))
        ));
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape(r"\q"), r"\q");
        assert_eq!(unescape(r"trailing\"), r"trailing\");
    }
}

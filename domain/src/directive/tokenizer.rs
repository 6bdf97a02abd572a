//! Line tokenizer for `!command` directives.
//!
//! Splits a single line into its command token and argument text. Knows
//! nothing about which commands exist; that is the grammar's job.

const FENCE: &str = "```";

/// A line that starts with `!`, split into parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Lower-cased command without the `!` (`allowspeak`)
    pub command: String,
    /// The command token as written, including `!` (`!AllowSpeak`)
    pub raw_command: &'a str,
    /// Everything after the token, trimmed
    pub argument: &'a str,
}

/// Remove markdown code fence markers that models like to wrap replies in.
///
/// An info string directly after an opening fence at the start of a line
/// (```` ```json ````) is removed along with the fence.
pub fn strip_code_fences(text: &str) -> String {
    text.lines()
        .map(strip_fence_markers)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn strip_fence_markers(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    let mut at_line_start = line.trim_start().starts_with(FENCE);

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];

        if at_line_start {
            let tag_len: usize = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .map(char::len_utf8)
                .sum();
            let after_tag = &rest[tag_len..];
            if tag_len > 0 && (after_tag.is_empty() || after_tag.starts_with(char::is_whitespace))
            {
                rest = after_tag;
            }
            at_line_start = false;
        }
    }
    out.push_str(rest);
    out
}

/// Split a line into command and argument; `None` for non-command lines.
pub fn tokenize_line(line: &str) -> Option<CommandLine<'_>> {
    let line = line.trim();
    let body = line.strip_prefix('!')?;

    let split_at = body
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(body.len());
    let (token, rest) = body.split_at(split_at);

    Some(CommandLine {
        command: token.to_lowercase(),
        raw_command: &line[..token.len() + 1],
        argument: rest.trim(),
    })
}

/// Argument text with one optional pair of outer braces removed.
pub fn unbrace(argument: &str) -> &str {
    let argument = argument.trim();
    let argument = argument.strip_prefix('{').unwrap_or(argument);
    let argument = argument.strip_suffix('}').unwrap_or(argument);
    argument.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_plain_line_is_none() {
        assert!(tokenize_line("Hello team").is_none());
        assert!(tokenize_line("").is_none());
        assert!(tokenize_line("wow!").is_none());
    }

    #[test]
    fn test_tokenize_command_and_argument() {
        let line = tokenize_line("  !AllowSpeak   Researcher  ").unwrap();
        assert_eq!(line.command, "allowspeak");
        assert_eq!(line.raw_command, "!AllowSpeak");
        assert_eq!(line.argument, "Researcher");
    }

    #[test]
    fn test_tokenize_brace_glued_to_command() {
        let line = tokenize_line("!team{Hello everyone}").unwrap();
        assert_eq!(line.command, "team");
        assert_eq!(line.argument, "{Hello everyone}");
    }

    #[test]
    fn test_tokenize_bare_command() {
        let line = tokenize_line("!yield").unwrap();
        assert_eq!(line.command, "yield");
        assert_eq!(line.argument, "");
    }

    #[test]
    fn test_unbrace() {
        assert_eq!(unbrace("{ planner }"), "planner");
        assert_eq!(unbrace("planner"), "planner");
        assert_eq!(unbrace("{unclosed"), "unclosed");
        assert_eq!(unbrace("{outer {inner}}"), "outer {inner}");
        assert_eq!(unbrace("{}"), "");
    }

    #[test]
    fn test_strip_code_fences() {
        let text = "```json\n!allowspeak planner\n```";
        assert_eq!(strip_code_fences(text), "!allowspeak planner");

        let text = "```\n!yield\n```\n";
        assert_eq!(strip_code_fences(text), "!yield");

        assert_eq!(strip_code_fences("```!OK```"), "!OK");
        assert_eq!(strip_code_fences("  !OK  "), "!OK");
    }
}

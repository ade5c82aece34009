//! Token definitions for label scanning
//!
//! Only the handful of shapes the numbering engine cares about are distinguished. Everything
//! else is [LabelToken::Text] and only matters because it closes a minipage group.
use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub enum LabelToken {
    #[regex(r"\\begin[ \t]*\{[^{}]*\}")]
    Begin,

    #[regex(r"\\end[ \t]*\{[^{}]*\}")]
    End,

    #[regex(r"\\label[ \t]*\{[^{}]*\}")]
    Label,

    // A forced line break, so the backslash after it starts a fresh command
    #[token(r"\\")]
    LineBreak,

    #[regex(r"\\[A-Za-z]+")]
    Command,

    #[regex(r"\\[^A-Za-z\\]")]
    ControlSymbol,

    // Whitespace and ties may sit between the minipages of one group
    #[regex(r"[ \t\r\n~]+")]
    Gap,

    #[regex(r"[^\\ \t\r\n~]+")]
    Text,
}

impl LabelToken {
    pub fn is_gap(&self) -> bool {
        matches!(self, LabelToken::Gap)
    }
}

/// Argument of a `\name{argument}` token slice, trimmed
pub fn argument(slice: &str) -> &str {
    match (slice.find('{'), slice.rfind('}')) {
        (Some(open), Some(close)) if open < close => slice[open + 1..close].trim(),
        _ => "",
    }
}

/// Tokenize `source`; bytes no rule accepts (a trailing lone backslash) become text
pub fn tokenize(source: &str) -> Vec<(LabelToken, &str)> {
    let mut lexer = LabelToken::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        tokens.push((result.unwrap_or(LabelToken::Text), lexer.slice()));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LabelToken> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_environment_tokens() {
        let tokens = tokenize(r"\begin{figure*}x\end {figure*}");
        assert_eq!(tokens[0], (LabelToken::Begin, r"\begin{figure*}"));
        assert_eq!(tokens[1], (LabelToken::Text, "x"));
        assert_eq!(tokens[2].0, LabelToken::End);
        assert_eq!(argument(tokens[2].1), "figure*");
    }

    #[test]
    fn test_label_token() {
        let tokens = tokenize(r"\label{ fig:a }");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, LabelToken::Label);
        assert_eq!(argument(tokens[0].1), "fig:a");
    }

    #[test]
    fn test_escaped_label_is_not_a_label() {
        assert_eq!(
            kinds(r"\\label{x}"),
            vec![LabelToken::LineBreak, LabelToken::Text]
        );
        assert_eq!(
            kinds(r"\\\label{x}"),
            vec![LabelToken::LineBreak, LabelToken::Label]
        );
    }

    #[test]
    fn test_gaps_and_commands() {
        assert_eq!(
            kinds("a ~\n\\hfill\\%"),
            vec![
                LabelToken::Text,
                LabelToken::Gap,
                LabelToken::Command,
                LabelToken::ControlSymbol
            ]
        );
    }

    #[test]
    fn test_trailing_backslash_is_text() {
        assert_eq!(kinds("a\\"), vec![LabelToken::Text, LabelToken::Text]);
    }
}

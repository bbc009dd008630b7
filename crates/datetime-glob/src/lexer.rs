//! Tokenizer for a single pattern segment.
//!
//! A segment mixes glob wildcards with a small set of strftime directives.
//! At every position the rules are tried in a fixed order:
//!
//! 1. each directive in [`Directive::ALL`]
//! 2. `%%`
//! 3. `*`
//! 4. `?`
//! 5. any single character other than `%`, `*` or `?`
//!
//! A `%` that starts none of the above is an error. Literal text comes out
//! one character per token; joining runs of text is up to the compiler.

use std::fmt;

use crate::Error;
use crate::directive::Directive;

/// One token of a pattern segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `*`, any run of characters including none.
    AnyRun,
    /// `?`, exactly one character.
    AnyChar,
    /// A date/time directive such as `%Y`.
    Directive(Directive),
    /// `%%`, a literal percent sign.
    Percent,
    /// A single literal character, borrowed from the input.
    Text(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::AnyRun => f.write_str("*"),
            Token::AnyChar => f.write_str("?"),
            Token::Directive(directive) => f.write_str(directive.token()),
            Token::Percent => f.write_str("%%"),
            Token::Text(text) => f.write_str(text),
        }
    }
}

/// Split a pattern segment into tokens.
///
/// The tokens cover the input left to right with no gaps, so rendering
/// them with `Display` gives back the segment.
///
/// # Examples
/// ```
/// use datetime_glob::{tokenize, Directive, Token};
///
/// let tokens = tokenize("*%Y.log").unwrap();
/// assert_eq!(tokens[0], Token::AnyRun);
/// assert_eq!(tokens[1], Token::Directive(Directive::Year));
/// assert_eq!(tokens[2], Token::Text("."));
/// assert!(tokenize("%Q").is_err());
/// ```
pub fn tokenize(segment: &str) -> Result<Vec<Token<'_>>, Error> {
    let mut tokens = Vec::with_capacity(segment.len());
    let mut pos = 0;

    while pos < segment.len() {
        let (token, len) = next_token(&segment[pos..]).ok_or_else(|| {
            Error::InvalidPattern(format!(
                "unsupported directive at byte {pos} of segment {segment:?}"
            ))
        })?;
        tokens.push(token);
        pos += len;
    }

    Ok(tokens)
}

/// Match the first rule against the start of `rest`, returning the token
/// and how many bytes it consumed.
fn next_token(rest: &str) -> Option<(Token<'_>, usize)> {
    if let Some(directive) = Directive::ALL
        .iter()
        .find(|directive| rest.starts_with(directive.token()))
    {
        return Some((Token::Directive(*directive), directive.token().len()));
    }

    if rest.starts_with("%%") {
        return Some((Token::Percent, 2));
    }

    let ch = rest.chars().next()?;
    match ch {
        '*' => Some((Token::AnyRun, 1)),
        '?' => Some((Token::AnyChar, 1)),
        '%' => None,
        _ => {
            let len = ch.len_utf8();
            Some((Token::Text(&rest[..len]), len))
        }
    }
}

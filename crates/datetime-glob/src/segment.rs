//! Compilation of a pattern segment into a literal or an anchored regex.

use regex::Regex;

use crate::Error;
use crate::directive::Directive;
use crate::lexer::{Token, tokenize};

/// A compiled pattern segment, matched against one path segment.
#[derive(Debug, Clone)]
pub enum CompiledSegment {
    /// No wildcards or directives: the path segment must equal this text.
    FixedText(String),

    /// Anchored regex with one capture group per directive.
    ///
    /// `groups[i]` is the directive behind capture group `i + 1`.
    Regex { regex: Regex, groups: Vec<Directive> },
}

impl CompiledSegment {
    /// Tokenize and compile a single pattern segment.
    ///
    /// # Examples
    /// ```
    /// use datetime_glob::CompiledSegment;
    ///
    /// let fixed = CompiledSegment::compile("100%%").unwrap();
    /// assert_eq!(fixed.fixed_text(), Some("100%"));
    ///
    /// let dated = CompiledSegment::compile("%Y").unwrap();
    /// assert_eq!(dated.regex().map(|r| r.as_str()), Some("^([0-9]{4})$"));
    /// ```
    pub fn compile(segment: &str) -> Result<Self, Error> {
        let tokens = tokenize(segment)?;
        Self::from_tokens(&tokens)
    }

    /// Compile an already tokenized segment.
    pub fn from_tokens(tokens: &[Token<'_>]) -> Result<Self, Error> {
        match fixed_text(tokens) {
            Some(text) => Ok(CompiledSegment::FixedText(text)),
            None => regex_segment(tokens),
        }
    }

    /// The literal text, if this segment has no wildcards or directives.
    pub fn fixed_text(&self) -> Option<&str> {
        match self {
            CompiledSegment::FixedText(text) => Some(text),
            CompiledSegment::Regex { .. } => None,
        }
    }

    /// The synthesized regex, if this segment needed one.
    pub fn regex(&self) -> Option<&Regex> {
        match self {
            CompiledSegment::FixedText(_) => None,
            CompiledSegment::Regex { regex, .. } => Some(regex),
        }
    }

    /// Capture group index (1-based) paired with the directive it captures.
    pub fn group_map(&self) -> impl Iterator<Item = (usize, Directive)> + '_ {
        let groups: &[Directive] = match self {
            CompiledSegment::FixedText(_) => &[],
            CompiledSegment::Regex { groups, .. } => groups,
        };
        groups.iter().enumerate().map(|(i, d)| (i + 1, *d))
    }

    /// True for a literal segment, which is compared by plain equality.
    pub fn is_fixed(&self) -> bool {
        matches!(self, CompiledSegment::FixedText(_))
    }
}

impl PartialEq for CompiledSegment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompiledSegment::FixedText(a), CompiledSegment::FixedText(b)) => a == b,
            (
                CompiledSegment::Regex { regex: a, groups: ga },
                CompiledSegment::Regex { regex: b, groups: gb },
            ) => a.as_str() == b.as_str() && ga == gb,
            _ => false,
        }
    }
}

impl Eq for CompiledSegment {}

/// Concatenated text when every token is literal, `None` otherwise.
fn fixed_text(tokens: &[Token<'_>]) -> Option<String> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Text(text) => Some(*text),
            Token::Percent => Some("%"),
            Token::AnyRun | Token::AnyChar | Token::Directive(_) => None,
        })
        .collect()
}

fn regex_segment(tokens: &[Token<'_>]) -> Result<CompiledSegment, Error> {
    let mut pat = String::from("^");
    let mut groups = Vec::new();

    for token in tokens {
        match token {
            Token::AnyRun => pat.push_str(".*"),
            Token::AnyChar => pat.push('.'),
            Token::Directive(directive) => {
                pat.push('(');
                pat.push_str(directive.regex_fragment());
                pat.push(')');
                groups.push(*directive);
            }
            Token::Percent => pat.push('%'),
            Token::Text(text) => pat.push_str(&regex::escape(text)),
        }
    }

    pat.push('$');

    let regex = Regex::new(&pat)
        .map_err(|e| Error::InvalidPattern(format!("invalid regex {pat:?} for segment: {e}")))?;

    Ok(CompiledSegment::Regex { regex, groups })
}

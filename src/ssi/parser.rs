//! Directive scanner
//!
//! Recognises one directive form per left-to-right pass. Anything that merely
//! resembles a directive (wrong keyword case, missing quote, `if` without
//! `else`) is returned as literal text.
//!
//! Grammar, with `_` meaning optional whitespace and `__` required whitespace:
//!
//! ```text
//! <!--#include__virtual="PATH"_-->
//! <!--#echo__var="NAME"_-->
//! <!--#if__expr="${NAME}_=_/VALUE/"_-->TRUE<!--#else_-->FALSE<!--#endif_-->
//! ```

const TAG_CLOSE: &str = "-->";

/// `<!--#include virtual="PATH" -->`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Include<'a> {
    pub path: &'a str,
}

/// `<!--#echo var="NAME" -->`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Echo<'a> {
    pub var: &'a str,
}

/// `<!--#if expr="${NAME} = /VALUE/" -->TRUE<!--#else -->FALSE<!--#endif -->`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditional<'a> {
    pub var: &'a str,
    pub pattern: &'a str,
    pub when_true: &'a str,
    pub when_false: &'a str,
}

impl<'a> Conditional<'a> {
    /// Branch chosen for a variable value (substring containment)
    pub fn select(&self, value: &str) -> &'a str {
        if value.contains(self.pattern) {
            self.when_true
        } else {
            self.when_false
        }
    }
}

/// A directive form the scanner can look for
pub trait DirectiveForm<'a>: Sized {
    /// Literal every occurrence starts with
    const OPENER: &'static str;

    /// Parse an occurrence starting at `cursor` (positioned on the opener)
    fn parse(cursor: &mut Cursor<'a>) -> Option<Self>;
}

impl<'a> DirectiveForm<'a> for Include<'a> {
    const OPENER: &'static str = "<!--#include";

    fn parse(cursor: &mut Cursor<'a>) -> Option<Self> {
        cursor.eat(Self::OPENER)?;
        cursor.require_whitespace()?;
        cursor.eat("virtual=\"")?;
        let path = cursor.take_until('"')?;
        cursor.eat("\"")?;
        cursor.close_tag()?;
        Some(Self { path })
    }
}

impl<'a> DirectiveForm<'a> for Echo<'a> {
    const OPENER: &'static str = "<!--#echo";

    fn parse(cursor: &mut Cursor<'a>) -> Option<Self> {
        cursor.eat(Self::OPENER)?;
        cursor.require_whitespace()?;
        cursor.eat("var=\"")?;
        let var = cursor.take_until('"')?;
        cursor.eat("\"")?;
        cursor.close_tag()?;
        Some(Self { var })
    }
}

impl<'a> DirectiveForm<'a> for Conditional<'a> {
    const OPENER: &'static str = "<!--#if";

    fn parse(cursor: &mut Cursor<'a>) -> Option<Self> {
        cursor.eat(Self::OPENER)?;
        cursor.require_whitespace()?;
        cursor.eat("expr=\"${")?;
        let var = cursor.take_until('}')?;
        cursor.eat("}")?;
        cursor.skip_whitespace();
        cursor.eat("=")?;
        cursor.skip_whitespace();
        cursor.eat("/")?;
        let pattern = cursor.take_until('/')?;
        cursor.eat("/\"")?;
        cursor.close_tag()?;

        let when_true = cursor.take_until_marker("<!--#else")?;
        let when_false = cursor.take_until_marker("<!--#endif")?;
        Some(Self {
            var,
            pattern,
            when_true,
            when_false,
        })
    }
}

/// Position within the text being scanned
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn eat(&mut self, literal: &str) -> Option<()> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Some(())
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) -> usize {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
        skipped
    }

    fn require_whitespace(&mut self) -> Option<()> {
        (self.skip_whitespace() > 0).then_some(())
    }

    /// Non-empty run of text up to (not including) `stop`
    fn take_until(&mut self, stop: char) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest.find(stop).filter(|&end| end > 0)?;
        self.pos += end;
        Some(&rest[..end])
    }

    /// `_-->` after the directive's attributes
    fn close_tag(&mut self) -> Option<()> {
        self.skip_whitespace();
        self.eat(TAG_CLOSE)
    }

    /// Text up to the first complete `KEYWORD_-->` marker; the cursor ends
    /// after the marker.
    fn take_until_marker(&mut self, keyword: &str) -> Option<&'a str> {
        let start = self.pos;
        let mut search = start;
        while let Some(offset) = self.text[search..].find(keyword) {
            let marker_start = search + offset;
            let mut marker = Self::new(self.text, marker_start + keyword.len());
            if marker.close_tag().is_some() {
                self.pos = marker.pos;
                return Some(&self.text[start..marker_start]);
            }
            search = marker_start + keyword.len();
        }
        None
    }
}

/// A piece of scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a, D> {
    /// Literal text, copied to the output unchanged
    Text(&'a str),
    /// A recognised directive
    Directive(D),
}

/// Iterator over the literal text and directives of one form
pub struct Scanner<'a, D> {
    text: &'a str,
    pos: usize,
    pending: Option<(D, usize)>,
}

/// Scan `text` for directives of form `D`
pub const fn scan<'a, D: DirectiveForm<'a>>(text: &'a str) -> Scanner<'a, D> {
    Scanner {
        text,
        pos: 0,
        pending: None,
    }
}

impl<'a, D: DirectiveForm<'a>> Iterator for Scanner<'a, D> {
    type Item = Segment<'a, D>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((directive, end)) = self.pending.take() {
            self.pos = end;
            return Some(Segment::Directive(directive));
        }
        if self.pos >= self.text.len() {
            return None;
        }

        let mut search = self.pos;
        while let Some(offset) = self.text[search..].find(D::OPENER) {
            let start = search + offset;
            let mut cursor = Cursor::new(self.text, start);
            if let Some(directive) = D::parse(&mut cursor) {
                if start == self.pos {
                    self.pos = cursor.pos;
                    return Some(Segment::Directive(directive));
                }
                let literal = &self.text[self.pos..start];
                self.pending = Some((directive, cursor.pos));
                return Some(Segment::Text(literal));
            }
            search = start + D::OPENER.len();
        }

        let literal = &self.text[self.pos..];
        self.pos = self.text.len();
        Some(Segment::Text(literal))
    }
}

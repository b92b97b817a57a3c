//! Decision Narrative
//!
//! Sanitizes the server-authored decision markup into a small rich-text
//! model and renders it for the terminal or as allow-listed HTML.
//!
//! # Allowed markup
//!
//! ```text
//! <p> <div> <br>          paragraphs and line breaks
//! <ul> <ol> <li>          lists (nested lists are flattened)
//! <b> <strong> <i> <em>   emphasis
//! ```
//!
//! Every other tag is dropped and its text kept, except `<script>` and
//! `<style>` whose contents are discarded. Attributes are never kept.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_until},
    character::complete::{alpha1, alphanumeric0, char, multispace0},
    combinator::{map, recognize},
    sequence::{delimited, pair, tuple},
    IResult,
};
use std::fmt::Write as _;

/// A run of text with uniform emphasis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text { text: String, bold: bool, italic: bool },
    LineBreak,
}

/// A block of sanitized content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    List { ordered: bool, items: Vec<Vec<Inline>> },
}

/// Sanitized decision narrative
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    pub blocks: Vec<Block>,
}

impl Narrative {
    /// Sanitize raw markup. Never fails: unknown or malformed markup
    /// degrades to text.
    pub fn parse(markup: &str) -> Self {
        let mut builder = Builder::default();
        let mut input = markup;

        while !input.is_empty() {
            match token(input) {
                Ok((rest, tok)) => {
                    builder.push(tok);
                    input = rest;
                }
                Err(_) => {
                    // Unreachable in practice: `stray` accepts any '<'
                    builder.push(Token::Text(input));
                    break;
                }
            }
        }

        builder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text without emphasis
    pub fn to_plain_text(&self) -> String {
        self.render_with(|out, text, _, _| out.push_str(text))
    }

    /// Text for a terminal; emphasis uses ANSI SGR codes when `ansi` is set
    pub fn to_terminal(&self, ansi: bool) -> String {
        self.render_with(|out, text, bold, italic| {
            if !ansi || (!bold && !italic) {
                out.push_str(text);
                return;
            }
            if bold {
                out.push_str("\x1b[1m");
            }
            if italic {
                out.push_str("\x1b[3m");
            }
            out.push_str(text);
            out.push_str("\x1b[0m");
        })
    }

    /// Re-emit as HTML containing only allow-listed tags, text escaped
    pub fn to_html(&self) -> String {
        let mut out = String::new();

        for block in &self.blocks {
            match block {
                Block::Paragraph(inlines) => {
                    out.push_str("<p>");
                    write_html_inlines(&mut out, inlines);
                    out.push_str("</p>");
                }
                Block::List { ordered, items } => {
                    let tag = if *ordered { "ol" } else { "ul" };
                    let _ = write!(out, "<{}>", tag);
                    for item in items {
                        out.push_str("<li>");
                        write_html_inlines(&mut out, item);
                        out.push_str("</li>");
                    }
                    let _ = write!(out, "</{}>", tag);
                }
            }
        }

        out
    }

    fn render_with<F>(&self, mut text_fn: F) -> String
    where
        F: FnMut(&mut String, &str, bool, bool),
    {
        let mut out = String::new();

        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            match block {
                Block::Paragraph(inlines) => {
                    render_inlines(&mut out, inlines, &mut text_fn, "");
                }
                Block::List { ordered, items } => {
                    for (n, item) in items.iter().enumerate() {
                        if n > 0 {
                            out.push('\n');
                        }
                        let marker = if *ordered {
                            format!("{}. ", n + 1)
                        } else {
                            "- ".to_string()
                        };
                        out.push_str(&marker);
                        let indent = " ".repeat(marker.len());
                        render_inlines(&mut out, item, &mut text_fn, &indent);
                    }
                }
            }
        }

        out
    }
}

fn render_inlines<F>(out: &mut String, inlines: &[Inline], text_fn: &mut F, indent: &str)
where
    F: FnMut(&mut String, &str, bool, bool),
{
    for inline in inlines {
        match inline {
            Inline::Text { text, bold, italic } => text_fn(out, text, *bold, *italic),
            Inline::LineBreak => {
                out.push('\n');
                out.push_str(indent);
            }
        }
    }
}

fn write_html_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text { text, bold, italic } => {
                if *bold {
                    out.push_str("<strong>");
                }
                if *italic {
                    out.push_str("<em>");
                }
                out.push_str(&escape_html(text));
                if *italic {
                    out.push_str("</em>");
                }
                if *bold {
                    out.push_str("</strong>");
                }
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drop C0 and C1 control characters so server text cannot drive the terminal
pub fn strip_controls(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Decode the common named and numeric character references
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &candidate[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

// ============================================
// Tokenizer
// ============================================

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Open { name: String, self_closing: bool },
    Close { name: String },
    Text(&'a str),
    Ignored,
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((comment, declaration, close_tag, open_tag, text, stray))(input)
}

fn tag_name(input: &str) -> IResult<&str, String> {
    map(recognize(pair(alpha1, alphanumeric0)), |name: &str| {
        name.to_ascii_lowercase()
    })(input)
}

/// `<!-- ... -->`
fn comment(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(tag("<!--"), take_until("-->"), tag("-->")), |_| {
        Token::Ignored
    })(input)
}

/// `<!DOCTYPE ...>` and friends
fn declaration(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(tag("<!"), take_until(">"), char('>')), |_| {
        Token::Ignored
    })(input)
}

/// `</name>`
fn close_tag(input: &str) -> IResult<&str, Token<'_>> {
    map(
        tuple((tag("</"), tag_name, multispace0, char('>'))),
        |(_, name, _, _)| Token::Close { name },
    )(input)
}

/// `<name attr="...">` or `<name/>`
fn open_tag(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('<')(input)?;
    let (input, name) = tag_name(input)?;
    let (input, attrs) = take_till(|c: char| c == '>' || c == '<')(input)?;
    let (input, _) = char('>')(input)?;

    let self_closing = attrs.trim_end().ends_with('/');
    Ok((input, Token::Open { name, self_closing }))
}

fn text(input: &str) -> IResult<&str, Token<'_>> {
    map(take_till1(|c: char| c == '<'), Token::Text)(input)
}

/// A '<' that does not start any markup is literal text
fn stray(input: &str) -> IResult<&str, Token<'_>> {
    map(tag("<"), Token::Text)(input)
}

// ============================================
// Block builder
// ============================================

#[derive(Default)]
struct ListState {
    ordered: bool,
    items: Vec<Vec<Inline>>,
    current: Option<Vec<Inline>>,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    paragraph: Vec<Inline>,
    list: Option<ListState>,
    list_depth: u32,
    bold: u32,
    italic: u32,
    skip: u32,
}

impl Builder {
    fn push(&mut self, tok: Token<'_>) {
        match tok {
            Token::Ignored => {}
            Token::Text(raw) => {
                if self.skip == 0 {
                    self.push_text(raw);
                }
            }
            Token::Open { name, self_closing } => self.open(&name, self_closing),
            Token::Close { name } => self.close(&name),
        }
    }

    fn open(&mut self, name: &str, self_closing: bool) {
        if self.skip > 0 {
            if matches!(name, "script" | "style") && !self_closing {
                self.skip += 1;
            }
            return;
        }

        match name {
            "script" | "style" => {
                if !self_closing {
                    self.skip += 1;
                }
            }
            "p" | "div" => {
                if self.list.is_none() {
                    self.flush_paragraph();
                }
            }
            "br" => self.current_buffer().push(Inline::LineBreak),
            "ul" | "ol" => {
                if self.list_depth == 0 {
                    self.flush_paragraph();
                    self.list = Some(ListState {
                        ordered: name == "ol",
                        ..ListState::default()
                    });
                }
                self.list_depth += 1;
            }
            "li" => match self.list.as_mut() {
                Some(list) => {
                    finish_item(list);
                    list.current = Some(Vec::new());
                }
                None => self.flush_paragraph(),
            },
            "b" | "strong" => self.bold += 1,
            "i" | "em" => self.italic += 1,
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        if self.skip > 0 {
            if matches!(name, "script" | "style") {
                self.skip -= 1;
            }
            return;
        }

        match name {
            "p" | "div" => {
                if self.list.is_none() {
                    self.flush_paragraph();
                }
            }
            "ul" | "ol" => {
                if self.list_depth > 0 {
                    self.list_depth -= 1;
                    if self.list_depth == 0 {
                        self.flush_list();
                    }
                }
            }
            "li" => match self.list.as_mut() {
                Some(list) => finish_item(list),
                None => self.flush_paragraph(),
            },
            "b" | "strong" => self.bold = self.bold.saturating_sub(1),
            "i" | "em" => self.italic = self.italic.saturating_sub(1),
            _ => {}
        }
    }

    fn push_text(&mut self, raw: &str) {
        let text = strip_controls(&collapse_whitespace(&decode_entities(raw)));
        if text.is_empty() {
            return;
        }

        // whitespace between list items is layout, not content
        if let Some(list) = self.list.as_ref() {
            if list.current.is_none() && text.trim().is_empty() {
                return;
            }
        }

        let inline = Inline::Text {
            text,
            bold: self.bold > 0,
            italic: self.italic > 0,
        };
        push_merged(self.current_buffer(), inline);
    }

    fn current_buffer(&mut self) -> &mut Vec<Inline> {
        match self.list.as_mut() {
            Some(list) => list.current.get_or_insert_with(Vec::new),
            None => &mut self.paragraph,
        }
    }

    fn flush_paragraph(&mut self) {
        let inlines = tidy(std::mem::take(&mut self.paragraph));
        if !inlines.is_empty() {
            self.blocks.push(Block::Paragraph(inlines));
        }
    }

    fn flush_list(&mut self) {
        if let Some(mut list) = self.list.take() {
            finish_item(&mut list);
            if !list.items.is_empty() {
                self.blocks.push(Block::List {
                    ordered: list.ordered,
                    items: list.items,
                });
            }
        }
    }

    fn finish(mut self) -> Narrative {
        self.flush_list();
        self.flush_paragraph();
        Narrative {
            blocks: self.blocks,
        }
    }
}

fn finish_item(list: &mut ListState) {
    if let Some(item) = list.current.take() {
        let item = tidy(item);
        if !item.is_empty() {
            list.items.push(item);
        }
    }
}

fn push_merged(buffer: &mut Vec<Inline>, inline: Inline) {
    if let (
        Some(Inline::Text { text: prev, bold: pb, italic: pi }),
        Inline::Text { text, bold, italic },
    ) = (buffer.last_mut(), &inline)
    {
        if *pb == *bold && *pi == *italic {
            prev.push_str(text);
            return;
        }
    }
    buffer.push(inline);
}

/// Trim outer whitespace, drop empty runs and edge line breaks
fn tidy(mut inlines: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::Text { text, .. }) = inlines.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(Inline::Text { text, .. }) = inlines.last_mut() {
        *text = text.trim_end().to_string();
    }

    inlines.retain(|inline| !matches!(inline, Inline::Text { text, .. } if text.is_empty()));

    while matches!(inlines.first(), Some(Inline::LineBreak)) {
        inlines.remove(0);
    }
    while matches!(inlines.last(), Some(Inline::LineBreak)) {
        inlines.pop();
    }

    inlines
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }

    out
}

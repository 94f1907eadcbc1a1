//! Selectors
//!
//! The subset of CSS selectors the page configuration uses to name its
//! anchors: type, universal, `#id`, `.class` and attribute selectors
//! (`[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`), compounded,
//! joined with descendant or child combinators, and grouped with commas.

use std::str::FromStr;

use crate::{Document, DomError, DomResult, DomTree, ElementData, NodeId};

/// Attribute matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

/// Simple selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
}

impl SimpleSelector {
    pub fn matches(&self, el: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => el.tag == *tag,
            Self::Id(id) => el.id() == Some(id.as_str()),
            Self::Class(class) => el.has_class(class),
            Self::Attr { name, op } => {
                let Some(value) = el.get_attr(name) else { return false };
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals(v) => value == v,
                    AttrOp::Includes(v) => value.split_whitespace().any(|t| t == v),
                    AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                    AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                    AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
                }
            }
        }
    }
}

/// Combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Simple selectors that must all match one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound(Vec<SimpleSelector>);

impl Compound {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.element(id).map(|el| self.0.iter().all(|s| s.matches(el))).unwrap_or(false)
    }
}

/// Compounds joined by combinators; the combinator of the first part is unused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    parts: Vec<(Combinator, Compound)>,
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        matches_from(tree, id, &self.parts)
    }
}

fn matches_from(tree: &DomTree, id: NodeId, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, last), rest)) = parts.split_last() else {
        return true;
    };
    if !last.matches(tree, id) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Child => tree.parent(id).map(|p| matches_from(tree, p, rest)).unwrap_or(false),
        Combinator::Descendant => tree.ancestors(id).any(|a| matches_from(tree, a, rest)),
    }
}

/// Selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(Vec<ComplexSelector>);

impl Selector {
    pub fn parse(src: &str) -> DomResult<Self> {
        Parser::new(src).selector_list()
    }

    /// Whether element `id` matches any selector of the list
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.0.iter().any(|c| c.matches(tree, id))
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, chars: src.chars().collect(), pos: 0 }
    }

    fn error(&self) -> DomError {
        DomError::InvalidSelector(self.src.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn expect(&mut self, c: char) -> DomResult<()> {
        if self.bump() == Some(c) { Ok(()) } else { Err(self.error()) }
    }

    /// Skip whitespace; returns whether any was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn ident(&mut self) -> DomResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn selector_list(&mut self) -> DomResult<Selector> {
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.complex()?);
            self.skip_ws();
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(_) => return Err(self.error()),
            }
        }
        Ok(Selector(list))
    }

    fn complex(&mut self) -> DomResult<ComplexSelector> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            parts.push((combinator, self.compound()?));
            let saw_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    combinator = Combinator::Child;
                }
                Some(_) if saw_ws => combinator = Combinator::Descendant,
                Some(_) => return Err(self.error()),
            }
        }
        Ok(ComplexSelector { parts })
    }

    fn compound(&mut self) -> DomResult<Compound> {
        let mut simple = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                simple.push(SimpleSelector::Universal);
            }
            Some(c) if c.is_alphabetic() => simple.push(SimpleSelector::Tag(self.ident()?.to_ascii_lowercase())),
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    simple.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    simple.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    simple.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if simple.is_empty() {
            return Err(self.error());
        }
        Ok(Compound(simple))
    }

    fn attribute(&mut self) -> DomResult<SimpleSelector> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let kind = match self.bump() {
            Some(']') => return Ok(SimpleSelector::Attr { name, op: AttrOp::Exists }),
            Some('=') => '=',
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.expect('=')?;
                c
            }
            _ => return Err(self.error()),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.expect(q)?;
                value
            }
            _ => self.ident()?,
        };
        self.skip_ws();
        self.expect(']')?;
        let op = match kind {
            '=' => AttrOp::Equals(value),
            '~' => AttrOp::Includes(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            _ => AttrOp::Contains(value),
        };
        Ok(SimpleSelector::Attr { name, op })
    }
}

impl DomTree {
    /// Elements below `root` matching `selector`, in tree order. Ancestors
    /// above `root` take part in matching, like `Element.querySelectorAll`.
    pub fn select_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root).filter(|&id| selector.matches(self, id)).collect()
    }

    pub fn select_first(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root).find(|&id| selector.matches(self, id))
    }
}

impl Document {
    /// `document.querySelector`
    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        Ok(self.tree.select_first(NodeId::ROOT, &Selector::parse(selector)?))
    }

    /// `document.querySelectorAll`
    pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        Ok(self.tree.select_all(NodeId::ROOT, &Selector::parse(selector)?))
    }
}

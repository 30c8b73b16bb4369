use serde::Serialize;
use smallvec::SmallVec;
use tracing::warn;

use crate::arena::{Arena, Pool};
use crate::constants::{COL_ID, COL_MECHANIC, COL_NOTE, COL_TAG_OR_ITEM, LINE_BREAK};
use crate::text::Str;
use crate::{Error, ErrorStage, LoadOptions, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Act {
    A,
    B,
    C,
}

impl Act {
    pub fn from_tag(tag: Str<'_>) -> Option<Self> {
        match tag.as_bytes() {
            b"A" => Some(Act::A),
            b"B" => Some(Act::B),
            b"C" => Some(Act::C),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Act::A => "A",
            Act::B => "B",
            Act::C => "C",
        }
    }
}

/// Position of an element in the manifest's element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fate<'a> {
    pub name: Str<'a>,
    pub act: Act,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameItem<'a> {
    pub name: Str<'a>,
    pub id: Str<'a>,
    pub note: Str<'a>,
    /// Most recent fate row above this item, `None` if there was none.
    pub parent_fate: Option<ElementId>,
    pub mechanics: SmallVec<[Str<'a>; 4]>,
    pub line: usize,
}

impl GameItem<'_> {
    pub fn has_mechanic(&self, name: Str<'_>) -> bool {
        self.mechanics.iter().any(|mechanic| *mechanic == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Fate,
    GameItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element<'a> {
    Fate(Fate<'a>),
    GameItem(GameItem<'a>),
}

impl<'a> Element<'a> {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Fate(_) => ElementKind::Fate,
            Element::GameItem(_) => ElementKind::GameItem,
        }
    }

    pub fn name(&self) -> Str<'a> {
        match self {
            Element::Fate(fate) => fate.name,
            Element::GameItem(item) => item.name,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Element::Fate(fate) => fate.line,
            Element::GameItem(item) => item.line,
        }
    }

    pub fn as_fate(&self) -> Option<&Fate<'a>> {
        match self {
            Element::Fate(fate) => Some(fate),
            Element::GameItem(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&GameItem<'a>> {
        match self {
            Element::GameItem(item) => Some(item),
            Element::Fate(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut GameItem<'a>> {
        match self {
            Element::GameItem(item) => Some(item),
            Element::Fate(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Item row with no fate row above it.
    MissingFate,
    /// Continuation row with no item to attach its mechanic to.
    OrphanMechanic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Elements of a manifest in input order, plus whatever was recovered from.
#[derive(Debug)]
pub struct Manifest<'a> {
    elements: Pool<Element<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Manifest<'a> {
    pub fn parse(text: Str<'a>, arena: &mut Arena, options: &LoadOptions) -> Result<Self> {
        let elements = Pool::with_capacity(arena, options.element_capacity)
            .map_err(|err| err.with_stage(ErrorStage::Manifest))?;
        let mut parser = Parser {
            elements,
            diagnostics: Vec::new(),
            current_fate: None,
            current_item: None,
            strict: options.strict,
        };
        // A quoted cell may span physical lines; diagnostics count those.
        let mut line_no = 1;
        for line in text.lines() {
            parser.parse_line(line_no, line)?;
            line_no += 1 + memchr::memchr_iter(LINE_BREAK, line.as_bytes()).count();
        }
        Ok(Self {
            elements: parser.elements,
            diagnostics: parser.diagnostics,
        })
    }

    pub fn elements(&self) -> &[Element<'a>] {
        &self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&Element<'a>> {
        self.elements.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn items(&self) -> impl Iterator<Item = (ElementId, &GameItem<'a>)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(idx, element)| element.as_item().map(|item| (ElementId(idx), item)))
    }
}

struct Parser<'a> {
    elements: Pool<Element<'a>>,
    diagnostics: Vec<Diagnostic>,
    current_fate: Option<ElementId>,
    current_item: Option<ElementId>,
    strict: bool,
}

impl<'a> Parser<'a> {
    fn parse_line(&mut self, line_no: usize, line: Str<'a>) -> Result<()> {
        let cells: SmallVec<[Str<'a>; 8]> = line.trim_right().fields().map(Str::trim).collect();
        if cells.len() <= 1 {
            return Ok(());
        }
        let cell = |idx: usize| cells.get(idx).copied().unwrap_or_default();

        let tag_or_item = cell(COL_TAG_OR_ITEM);
        let mechanic = cell(COL_MECHANIC);

        if let Some(act) = Act::from_tag(tag_or_item) {
            let id = self.push(Element::Fate(Fate {
                name: cell(0),
                act,
                line: line_no,
            }))?;
            self.current_fate = Some(id);
        } else if !tag_or_item.is_empty() {
            if self.current_fate.is_none() {
                self.report(
                    line_no,
                    DiagnosticKind::MissingFate,
                    format!("item {tag_or_item} has no preceding fate"),
                )?;
            }
            let mut mechanics = SmallVec::new();
            if !mechanic.is_empty() {
                mechanics.push(mechanic);
            }
            let id = self.push(Element::GameItem(GameItem {
                name: tag_or_item,
                id: cell(COL_ID),
                note: cell(COL_NOTE),
                parent_fate: self.current_fate,
                mechanics,
                line: line_no,
            }))?;
            self.current_item = Some(id);
        } else if !mechanic.is_empty() {
            let current = self
                .current_item
                .and_then(|id| self.elements.get_mut(id.0))
                .and_then(Element::as_item_mut);
            match current {
                Some(item) => item.mechanics.push(mechanic),
                None => self.report(
                    line_no,
                    DiagnosticKind::OrphanMechanic,
                    format!("mechanic {mechanic} has no item to attach to"),
                )?,
            }
        }
        Ok(())
    }

    fn push(&mut self, element: Element<'a>) -> Result<ElementId> {
        self.elements
            .push(element)
            .map(ElementId)
            .map_err(|err| err.with_stage(ErrorStage::Manifest))
    }

    fn report(&mut self, line: usize, kind: DiagnosticKind, message: String) -> Result<()> {
        if self.strict {
            return Err(Error::malformed(line, message).with_stage(ErrorStage::Manifest));
        }
        warn!(line, ?kind, "{message}");
        self.diagnostics.push(Diagnostic {
            line,
            kind,
            message,
        });
        Ok(())
    }
}

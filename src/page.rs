use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::BufReader,
    path::Path,
    rc::Rc,
};

use crate::{
    foundation::core::{Rect, Viewport},
    foundation::error::{CardError, CardResult},
    scroll::observer::SectionAnchor,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A measured markup element.
///
/// This is the boundary the host fills in from its own tree: attributes as
/// declared in markup, the layout box in document coordinates, and for vector
/// strokes the total path length as measured at mount time.
pub struct Element {
    /// Element id; for sections this is also the card id and anchor id.
    pub id: String,
    /// Declarative attributes (`data-animation`, `data-duration`, ...).
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Layout box in document coordinates.
    #[serde(default)]
    pub rect: Rect,
    /// Measured stroke length for vector paths.
    #[serde(default)]
    pub path_length: Option<f64>,
    /// Immediate children, in document order.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    /// Bare element with no attributes, box or children.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set one attribute, replacing any previous value.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the layout box.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Record the measured stroke length.
    pub fn with_path_length(mut self, len: f64) -> Self {
        self.path_length = Some(len);
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Declared value of attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A page made of ordered sections.
///
/// Section order is navigation order. Used by the simulator and by
/// fixtures; a live host builds [`Element`] values directly.
pub struct Page {
    /// Initial viewport.
    pub viewport: Viewport,
    /// Top-level sections in document order.
    pub sections: Vec<Element>,
}

impl Page {
    /// Parse and validate a page from JSON text.
    pub fn from_json_str(s: &str) -> CardResult<Self> {
        let page: Self = serde_json::from_str(s)
            .map_err(|e| CardError::serde(format!("parse page JSON: {e}")))?;
        page.validate()?;
        Ok(page)
    }

    /// Load and validate a page from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CardError::validation(format!("open page JSON '{}': {e}", path.display()))
        })?;
        let page: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| CardError::serde(format!("parse page JSON '{}': {e}", path.display())))?;
        page.validate()?;
        Ok(page)
    }

    /// Check the viewport, section id uniqueness and finite section boxes.
    pub fn validate(&self) -> CardResult<()> {
        Viewport::new(self.viewport.width, self.viewport.height)?;
        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.id.trim().is_empty() {
                return Err(CardError::validation("section id must be non-empty"));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(CardError::validation(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
            let r = section.rect;
            if ![r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite()) {
                return Err(CardError::validation(format!(
                    "section '{}' rect must be finite",
                    section.id
                )));
            }
        }
        Ok(())
    }

    /// Top-level section with the given id.
    pub fn section(&self, id: &str) -> Option<&Element> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Create one host-owned anchor per section, in section order.
    pub fn mount_anchors(&self) -> Vec<Rc<SectionAnchor>> {
        self.sections
            .iter()
            .map(|s| SectionAnchor::new(s.id.clone(), s.rect))
            .collect()
    }

    /// Total document height, i.e. the bottom of the lowest section.
    pub fn document_height(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.rect.y1.max(s.rect.y0))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
#[path = "../tests/unit/page.rs"]
mod tests;

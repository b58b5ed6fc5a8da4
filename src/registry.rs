use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use crate::{
    animation::timeline::Timeline,
    events::{CardCall, CardCallback, CardEvent, SharedCardCallback, TransitionCause},
    foundation::error::{CardError, CardResult},
    scroll::observer::{SectionAnchor, Subscription},
};

/// Lifecycle position of one card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    /// Hidden; timeline at progress 0.
    Inactive,
    /// Timeline playing forward.
    Entering,
    /// Entrance complete.
    Active,
    /// Timeline reversing.
    Leaving,
}

impl CardState {
    /// Entering or Active.
    pub fn is_engaged(self) -> bool {
        matches!(self, Self::Entering | Self::Active)
    }
}

/// One registered section.
pub struct CardDescriptor {
    pub(crate) id: String,
    pub(crate) index: usize,
    pub(crate) anchor: Weak<SectionAnchor>,
    pub(crate) timeline: Box<dyn Timeline>,
    pub(crate) activation_threshold: Option<f64>,
    pub(crate) state: CardState,
    pub(crate) progress: f64,
    pub(crate) in_view: bool,
    pub(crate) subscription: Option<Subscription>,
    on_activate: Option<SharedCardCallback>,
    on_deactivate: Option<SharedCardCallback>,
}

impl CardDescriptor {
    /// Describe a card for `anchor`, which supplies the id. Only a weak reference is kept.
    pub fn new(anchor: &Rc<SectionAnchor>, timeline: Box<dyn Timeline>) -> Self {
        Self {
            id: anchor.id().to_string(),
            index: 0,
            anchor: Rc::downgrade(anchor),
            timeline,
            activation_threshold: None,
            state: CardState::Inactive,
            progress: 0.0,
            in_view: false,
            subscription: None,
            on_activate: None,
            on_deactivate: None,
        }
    }

    /// Override the controller's default threshold. Clamped to `[0, 1]`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        let t = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.activation_threshold = Some(t);
        self
    }

    /// Hook run once each time the card starts entering.
    pub fn on_activate(mut self, cb: impl FnMut(&CardEvent<'_>) + 'static) -> Self {
        let cb: CardCallback = Box::new(cb);
        self.on_activate = Some(Rc::new(RefCell::new(cb)));
        self
    }

    /// Hook run once each time the card starts leaving.
    pub fn on_deactivate(mut self, cb: impl FnMut(&CardEvent<'_>) + 'static) -> Self {
        let cb: CardCallback = Box::new(cb);
        self.on_deactivate = Some(Rc::new(RefCell::new(cb)));
        self
    }

    /// Section id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Registry index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current state machine position.
    pub fn state(&self) -> CardState {
        self.state
    }

    /// Last scroll progress delivered by the observer.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Effective threshold; set to the controller default at registration.
    pub fn activation_threshold(&self) -> f64 {
        self.activation_threshold.unwrap_or(0.0)
    }

    /// The card's timeline, owned by the controller.
    pub fn timeline(&self) -> &dyn Timeline {
        self.timeline.as_ref()
    }

    /// `None` once the host has dropped the anchor.
    pub fn anchor(&self) -> Option<Rc<SectionAnchor>> {
        self.anchor.upgrade()
    }

    /// Whether the card's region was in view at the last measurement.
    pub fn in_view(&self) -> bool {
        self.in_view
    }

    /// In view and at or above the threshold.
    pub fn is_eligible(&self) -> bool {
        self.in_view && self.progress >= self.activation_threshold()
    }

    pub(crate) fn activate_call(&self, cause: TransitionCause) -> Option<CardCall> {
        self.on_activate
            .as_ref()
            .map(|cb| CardCall::new(cb, &self.id, self.index, cause))
    }

    pub(crate) fn deactivate_call(&self, cause: TransitionCause) -> Option<CardCall> {
        self.on_deactivate
            .as_ref()
            .map(|cb| CardCall::new(cb, &self.id, self.index, cause))
    }
}

impl std::fmt::Debug for CardDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDescriptor")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("threshold", &self.activation_threshold)
            .finish_non_exhaustive()
    }
}

/// Old→new index per slot after compaction; `None` for reclaimed slots.
pub type IndexRemap = Vec<Option<usize>>;

/// Ordered card slots with an id→index map.
///
/// Unregistering always leaves a vacant slot so no in-flight index reference
/// moves. [`CardRegistry::reclaim`] compacts vacancies; the controller calls
/// it only while no navigation is in flight.
#[derive(Debug, Default)]
pub struct CardRegistry {
    slots: Vec<Option<CardDescriptor>>,
    by_id: HashMap<String, usize>,
}

impl CardRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `desc` at the next sequential index.
    pub fn register(&mut self, mut desc: CardDescriptor) -> CardResult<usize> {
        if self.by_id.contains_key(&desc.id) {
            return Err(CardError::DuplicateId(desc.id));
        }
        let index = self.slots.len();
        desc.index = index;
        self.by_id.insert(desc.id.clone(), index);
        self.slots.push(Some(desc));
        Ok(index)
    }

    /// Remove the card, kill its timeline, and leave its slot vacant.
    pub fn unregister(&mut self, id: &str) -> Option<CardDescriptor> {
        let index = self.by_id.remove(id)?;
        let mut desc = self.slots.get_mut(index)?.take()?;
        desc.timeline.kill();
        Some(desc)
    }

    /// Compact vacant slots. Returns the remapping when anything moved.
    pub fn reclaim(&mut self) -> Option<IndexRemap> {
        if !self.has_vacancies() {
            return None;
        }
        let mut remap = Vec::with_capacity(self.slots.len());
        let mut compacted = Vec::with_capacity(self.by_id.len());
        for slot in self.slots.drain(..) {
            match slot {
                Some(mut desc) => {
                    remap.push(Some(compacted.len()));
                    desc.index = compacted.len();
                    compacted.push(Some(desc));
                }
                None => remap.push(None),
            }
        }
        self.slots = compacted;
        self.by_id = self
            .iter()
            .map(|d| (d.id.clone(), d.index))
            .collect();
        Some(remap)
    }

    /// Any slot left vacant by `unregister`.
    pub fn has_vacancies(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Index registered for `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Card at `index`; `None` for vacant or out-of-range slots.
    pub fn get(&self, index: usize) -> Option<&CardDescriptor> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Mutable access to the card at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut CardDescriptor> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Card registered for `id`.
    pub fn by_id(&self, id: &str) -> Option<&CardDescriptor> {
        self.index_of(id).and_then(|i| self.get(i))
    }

    /// Number of registered cards.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// No registered cards.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of slots including vacancies.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Registered cards in index order, skipping vacancies.
    pub fn iter(&self) -> impl Iterator<Item = &CardDescriptor> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Mutable iteration in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CardDescriptor> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Ids in index order.
    pub fn ids(&self) -> Vec<String> {
        self.iter().map(|d| d.id.clone()).collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod tests;

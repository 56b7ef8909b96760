use crate::action::{ActionOutcome, TocAction};
use crate::error::TocResult;
use crate::state::TocState;
use coursekit_common::IdGenerator;

/// Owns a TOC state together with the generator its new items draw ids from
#[derive(Debug, Clone)]
pub struct TocEditor {
    state: TocState,
    ids: IdGenerator,
}

impl TocEditor {
    /// Editor over the starter outline
    pub fn new(mut ids: IdGenerator) -> Self {
        let state = TocState::new(&mut ids);
        Self { state, ids }
    }

    /// Editor over a restored snapshot; the generator is moved past every id
    /// the snapshot already uses
    pub fn from_state(state: TocState, mut ids: IdGenerator) -> TocResult<Self> {
        state.validate()?;
        for id in state.toc_tree.keys() {
            ids.reserve(id);
        }
        Ok(Self { state, ids })
    }

    pub fn dispatch(&mut self, action: TocAction) -> ActionOutcome {
        self.state.apply(&action, &mut self.ids)
    }

    pub fn state(&self) -> &TocState {
        &self.state
    }

    pub fn into_state(self) -> TocState {
        self.state
    }
}

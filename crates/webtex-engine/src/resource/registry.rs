use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{HostTextureRegistry, TextureId};

/// In-process texture registry shared between the host renderer and any
/// number of browser surfaces on the same render thread.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    entries: Rc<RefCell<HashMap<String, TextureId>>>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture currently bound to `name`.
    pub fn lookup(&self, name: &str) -> Option<TextureId> {
        self.entries.borrow().get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl HostTextureRegistry for TextureTable {
    fn register(&self, name: &str, texture: TextureId) {
        self.entries.borrow_mut().insert(name.to_owned(), texture);
    }

    fn release(&self, name: &str) {
        self.entries.borrow_mut().remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let table = TextureTable::new();
        let host_view = table.clone();
        table.register("webtex:browser_1", TextureId::from_raw(7));
        assert_eq!(host_view.lookup("webtex:browser_1"), Some(TextureId::from_raw(7)));

        table.register("webtex:browser_1", TextureId::from_raw(9));
        assert_eq!(host_view.lookup("webtex:browser_1"), Some(TextureId::from_raw(9)));
        assert_eq!(host_view.len(), 1);

        table.release("webtex:browser_1");
        assert!(host_view.is_empty());
    }
}

use crate::areas::index_store::IndexStore;
use crate::artifacts::index::IndexKind;
use std::cell::{RefCell, RefMut};
use std::path::Path;

pub struct Archive {
    store: IndexStore,
    writer: RefCell<Box<dyn std::io::Write>>,
}

impl Archive {
    pub fn new(
        path: &str,
        kind: Option<IndexKind>,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Self> {
        let store = IndexStore::open(Path::new(path), kind)?;

        Ok(Archive {
            store,
            writer: RefCell::new(writer),
        })
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }
}

use super::{Shelf, ShelfBackend};
use crate::error::{PathlogError, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory shelf for testing. Does NOT persist data beyond its clones.
#[derive(Clone, Default)]
pub struct MemoryShelf {
    data: Rc<RefCell<Shelf>>,
    fail_loads: bool,
}

impl MemoryShelf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shelf(shelf: Shelf) -> Self {
        Self {
            data: Rc::new(RefCell::new(shelf)),
            fail_loads: false,
        }
    }

    /// A backend whose loads always fail, for exercising open errors.
    pub fn unavailable() -> Self {
        Self {
            fail_loads: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Shelf {
        self.data.borrow().clone()
    }
}

impl ShelfBackend for MemoryShelf {
    fn load(&self) -> Result<Shelf> {
        if self.fail_loads {
            return Err(PathlogError::storage(self.location(), "backend unavailable"));
        }
        Ok(self.data.borrow().clone())
    }

    fn save(&mut self, shelf: &Shelf) -> Result<()> {
        *self.data.borrow_mut() = shelf.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

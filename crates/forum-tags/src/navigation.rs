//! Keyboard focus over an option list.
//!
//! The list owner renders items and decides which are disabled; this module
//! only tracks which enabled item holds focus. Disabled items are never
//! focused, and directional moves wrap around.

/// Keys the option list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Move focus down (ArrowDown)
    Down,
    /// Move focus up (ArrowUp)
    Up,
    /// Activate the focused item (Enter)
    Enter,
}

/// One entry in the list: the action it triggers and whether it can take focus.
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem<A> {
    pub action: A,
    pub enabled: bool,
}

impl<A> NavItem<A> {
    pub fn enabled(action: A) -> Self {
        Self {
            action,
            enabled: true,
        }
    }

    pub fn disabled(action: A) -> Self {
        Self {
            action,
            enabled: false,
        }
    }
}

/// Focus cursor over a list of items.
#[derive(Debug, Clone)]
pub struct FocusList<A> {
    items: Vec<NavItem<A>>,
    focused: Option<usize>,
}

impl<A> Default for FocusList<A> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            focused: None,
        }
    }
}

impl<A> FocusList<A> {
    /// Create a list focused on its first enabled item.
    pub fn new(items: Vec<NavItem<A>>) -> Self {
        let mut list = Self::default();
        list.repopulate(items);
        list
    }

    /// Replace the items; focus returns to the first enabled one.
    pub fn repopulate(&mut self, items: Vec<NavItem<A>>) {
        self.items = items;
        self.focused = self.first_enabled();
    }

    pub fn items(&self) -> &[NavItem<A>] {
        &self.items
    }

    /// Index of the focused item, if any.
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focus a specific item (pointer hover). Disabled or out-of-range indices are ignored.
    pub fn focus_at(&mut self, index: usize) {
        if self.items.get(index).is_some_and(|item| item.enabled) {
            self.focused = Some(index);
        }
    }

    /// Move to the next enabled item, wrapping to the first.
    pub fn focus_next(&mut self) {
        let after = self
            .focused
            .and_then(|current| self.next_enabled_after(current));
        self.focused = after.or_else(|| self.first_enabled());
    }

    /// Move to the previous enabled item, wrapping to the last.
    pub fn focus_previous(&mut self) {
        let before = self
            .focused
            .and_then(|current| self.previous_enabled_before(current));
        self.focused = before.or_else(|| self.last_enabled());
    }

    /// The action bound to the focused item; `None` when nothing is focused.
    pub fn activate_focused(&self) -> Option<&A> {
        self.focused.map(|index| &self.items[index].action)
    }

    /// Dispatch a key. Returns the action to run when the key is `Enter`.
    pub fn handle_key(&mut self, key: NavKey) -> Option<&A> {
        match key {
            NavKey::Down => {
                self.focus_next();
                None
            }
            NavKey::Up => {
                self.focus_previous();
                None
            }
            NavKey::Enter => self.activate_focused(),
        }
    }

    fn first_enabled(&self) -> Option<usize> {
        self.items.iter().position(|item| item.enabled)
    }

    fn last_enabled(&self) -> Option<usize> {
        self.items.iter().rposition(|item| item.enabled)
    }

    fn next_enabled_after(&self, index: usize) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, item)| item.enabled)
            .map(|(i, _)| i)
    }

    fn previous_enabled_before(&self, index: usize) -> Option<usize> {
        self.items[..index.min(self.items.len())]
            .iter()
            .rposition(|item| item.enabled)
    }
}

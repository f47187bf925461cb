//! Favorites slice: the dog ids the user has starred, in insertion order.

/// Actions understood by the favorites slice.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavoritesAction {
    Add(String),
    Remove(String),
    Toggle(String),
    Clear,
}

impl FavoritesAction {
    pub fn name(&self) -> &'static str {
        match self {
            FavoritesAction::Add(_) => "favorites/add",
            FavoritesAction::Remove(_) => "favorites/remove",
            FavoritesAction::Toggle(_) => "favorites/toggle",
            FavoritesAction::Clear => "favorites/clear",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FavoritesState {
    ids: Vec<String>,
}

impl FavoritesState {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|fav| fav == id)
    }

    pub fn reduce(&mut self, action: FavoritesAction) {
        match action {
            FavoritesAction::Add(id) => {
                if !self.contains(&id) {
                    self.ids.push(id);
                }
            }
            FavoritesAction::Remove(id) => self.ids.retain(|fav| *fav != id),
            FavoritesAction::Toggle(id) => {
                if self.contains(&id) {
                    self.ids.retain(|fav| *fav != id);
                } else {
                    self.ids.push(id);
                }
            }
            FavoritesAction::Clear => self.ids.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_deduplicated_and_ordered() {
        let mut state = FavoritesState::default();
        state.reduce(FavoritesAction::Add("b".to_string()));
        state.reduce(FavoritesAction::Add("a".to_string()));
        state.reduce(FavoritesAction::Add("b".to_string()));
        assert_eq!(state.ids(), ["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_toggle_remove_clear() {
        let mut state = FavoritesState::default();
        state.reduce(FavoritesAction::Toggle("a".to_string()));
        assert!(state.contains("a"));
        state.reduce(FavoritesAction::Toggle("a".to_string()));
        assert!(!state.contains("a"));

        state.reduce(FavoritesAction::Add("a".to_string()));
        state.reduce(FavoritesAction::Add("b".to_string()));
        state.reduce(FavoritesAction::Remove("a".to_string()));
        assert_eq!(state.ids(), ["b".to_string()]);
        state.reduce(FavoritesAction::Clear);
        assert!(state.ids().is_empty());
    }
}

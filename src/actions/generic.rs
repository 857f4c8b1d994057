//! Adding and removing items of an ordered list.

/// Direction of a [`GenericAddAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddingOrRemoving {
    Adding,
    Removing,
}

/// Inserts or removes a number of items, remembering their positions.
///
/// Steps are kept in ascending position order. Inserting walks them
/// forwards and removing walks them backwards, so each position is valid
/// at the moment it is used.
#[derive(Clone, Debug)]
pub struct GenericAddAction<T> {
    pub direction: AddingOrRemoving,
    pub steps: Vec<(usize, T)>,
}

impl<T: Clone> GenericAddAction<T> {
    /// Append `items` to a list that currently has `len` items.
    #[must_use]
    pub fn adding(len: usize, items: Vec<T>) -> Self {
        Self {
            direction: AddingOrRemoving::Adding,
            steps: items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (len + i, item))
                .collect(),
        }
    }

    /// Remove the items at the given positions.
    #[must_use]
    pub fn removing(mut positions: Vec<(usize, T)>) -> Self {
        positions.sort_by_key(|(pos, _)| *pos);
        positions.dedup_by_key(|(pos, _)| *pos);
        Self {
            direction: AddingOrRemoving::Removing,
            steps: positions,
        }
    }

    /// "Add card", "Remove cards", ...
    #[must_use]
    pub fn name(&self, type_name: &str) -> String {
        let verb = match self.direction {
            AddingOrRemoving::Adding => "Add",
            AddingOrRemoving::Removing => "Remove",
        };
        if self.steps.len() == 1 {
            format!("{verb} {type_name}")
        } else {
            format!("{verb} {type_name}s")
        }
    }

    /// Insert or remove, depending on the direction and `to_undo`.
    pub fn perform(
        &self,
        to_undo: bool,
        mut insert: impl FnMut(usize, T),
        mut remove: impl FnMut(usize, &T),
    ) {
        let inserting = (self.direction == AddingOrRemoving::Adding) != to_undo;
        if inserting {
            for (pos, item) in &self.steps {
                insert(*pos, item.clone());
            }
        } else {
            for (pos, item) in self.steps.iter().rev() {
                remove(*pos, item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(action: &GenericAddAction<char>, list: &mut Vec<char>, to_undo: bool) {
        let list = std::cell::RefCell::new(list);
        action.perform(
            to_undo,
            |pos, c| list.borrow_mut().insert(pos, c),
            |pos, _| {
                list.borrow_mut().remove(pos);
            },
        );
    }

    #[test]
    fn test_adding_appends() {
        let mut list = vec!['a', 'b'];
        let action = GenericAddAction::adding(list.len(), vec!['c', 'd']);
        run(&action, &mut list, false);
        assert_eq!(list, vec!['a', 'b', 'c', 'd']);
        run(&action, &mut list, true);
        assert_eq!(list, vec!['a', 'b']);
        assert_eq!(action.name("card"), "Add cards");
    }

    #[test]
    fn test_removing_restores_positions() {
        let mut list = vec!['a', 'b', 'c', 'd', 'e'];
        let action = GenericAddAction::removing(vec![(3, 'd'), (1, 'b')]);
        run(&action, &mut list, false);
        assert_eq!(list, vec!['a', 'c', 'e']);
        run(&action, &mut list, true);
        assert_eq!(list, vec!['a', 'b', 'c', 'd', 'e']);
        assert_eq!(
            GenericAddAction::removing(vec![(0, 'a')]).name("keyword"),
            "Remove keyword"
        );
    }
}

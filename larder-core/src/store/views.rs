//! Read-only projections of cached items. Computed on every call, never
//! stored.

use super::Store;
use crate::api::{ListItems, PantryItems, Pantries, Products};
use crate::models::{Category, EntityId, ListItem, Pantry, PantryItem, Product};

/// Items sharing one category. `category` is `None` for the uncategorized
/// group.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<E> {
    pub category: Option<Category>,
    pub items: Vec<E>,
}

impl<E> CategoryGroup<E> {
    pub fn name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized")
    }
}

/// Groups items by category in order of first appearance; uncategorized
/// items come last.
fn group_by_category<E: Clone>(
    items: &[E],
    category_of: impl Fn(&E) -> Option<&Category>,
) -> Vec<CategoryGroup<E>> {
    let mut groups: Vec<CategoryGroup<E>> = Vec::new();
    let mut uncategorized = Vec::new();

    for item in items {
        match category_of(item) {
            Some(category) => {
                match groups
                    .iter_mut()
                    .find(|g| g.category.as_ref().is_some_and(|c| c.id == category.id))
                {
                    Some(group) => group.items.push(item.clone()),
                    None => groups.push(CategoryGroup {
                        category: Some(category.clone()),
                        items: vec![item.clone()],
                    }),
                }
            }
            None => uncategorized.push(item.clone()),
        }
    }

    if !uncategorized.is_empty() {
        groups.push(CategoryGroup {
            category: None,
            items: uncategorized,
        });
    }
    groups
}

/// Case-insensitive substring match; a blank needle matches everything.
fn matches_search(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl<S> Store<Products, S> {
    pub fn by_category(&self) -> Vec<CategoryGroup<Product>> {
        self.with_items(|items| group_by_category(items, |p| p.category.as_ref()))
    }
}

impl<S> Store<PantryItems, S> {
    pub fn by_category(&self) -> Vec<CategoryGroup<PantryItem>> {
        self.with_items(|items| group_by_category(items, |i| i.product.category.as_ref()))
    }

    /// Items whose product name contains `search`.
    pub fn filter(&self, search: &str) -> Vec<PantryItem> {
        self.with_items(|items| {
            items
                .iter()
                .filter(|i| matches_search(&i.product.name, search))
                .cloned()
                .collect()
        })
    }
}

impl<S> Store<Pantries, S> {
    /// Pantries owned by `user_id`.
    pub fn owned(&self, user_id: EntityId) -> Vec<Pantry> {
        self.with_items(|items| {
            items
                .iter()
                .filter(|p| p.owner.id == user_id)
                .cloned()
                .collect()
        })
    }

    /// Pantries `user_id` sees through sharing: those owned by someone
    /// else, plus their own pantries shared with at least one user.
    pub fn shared(&self, user_id: EntityId) -> Vec<Pantry> {
        self.with_items(|items| {
            items
                .iter()
                .filter(|p| p.owner.id != user_id || p.is_shared())
                .cloned()
                .collect()
        })
    }
}

/// Criteria for [`Store::filter`] on list items. Unset fields match all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub purchased: Option<bool>,
    pub category_id: Option<EntityId>,
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &ListItem) -> bool {
        self.purchased.map_or(true, |p| item.purchased == p)
            && self
                .category_id
                .map_or(true, |id| item.category_id() == Some(id))
            && self
                .search
                .as_deref()
                .map_or(true, |s| matches_search(&item.product.name, s))
    }
}

impl<S> Store<ListItems, S> {
    pub fn purchased(&self) -> Vec<ListItem> {
        self.filter(&ItemFilter {
            purchased: Some(true),
            ..Default::default()
        })
    }

    pub fn pending(&self) -> Vec<ListItem> {
        self.filter(&ItemFilter {
            purchased: Some(false),
            ..Default::default()
        })
    }

    pub fn purchased_count(&self) -> usize {
        self.with_items(|items| items.iter().filter(|i| i.purchased).count())
    }

    pub fn pending_count(&self) -> usize {
        self.with_items(|items| items.iter().filter(|i| !i.purchased).count())
    }

    /// True when the cached page is non-empty and every item is purchased.
    /// The list's own completion flag comes from the server.
    pub fn all_purchased(&self) -> bool {
        self.with_items(|items| !items.is_empty() && items.iter().all(|i| i.purchased))
    }

    pub fn filter(&self, filter: &ItemFilter) -> Vec<ListItem> {
        self.with_items(|items| {
            items
                .iter()
                .filter(|i| filter.matches(i))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: EntityId, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            metadata: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn product(id: EntityId, name: &str, category: Option<Category>) -> Product {
        Product {
            id,
            name: name.to_string(),
            metadata: None,
            created_at: String::new(),
            updated_at: String::new(),
            category,
        }
    }

    #[test]
    fn test_group_by_category_keeps_first_appearance_order() {
        let dairy = category(1, "Dairy");
        let bakery = category(2, "Bakery");
        let products = vec![
            product(1, "Milk", Some(dairy.clone())),
            product(2, "Salt", None),
            product(3, "Bread", Some(bakery)),
            product(4, "Butter", Some(dairy)),
        ];

        let groups = group_by_category(&products, |p| p.category.as_ref());
        let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["Dairy", "Bakery", "Uncategorized"]);
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("Oat Milk", "milk"));
        assert!(matches_search("Oat Milk", "  "));
        assert!(!matches_search("Oat Milk", "bread"));
    }
}

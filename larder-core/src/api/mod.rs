//! Per-entity resource definitions, list queries and custom actions.

/// Defines a sort-key enum with its wire names.
///
/// Mark the entity's default key with `#[default]`. The literal is the
/// value sent as `sort_by`.
macro_rules! sort_keys {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok($name::$variant);
                    }
                )+
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                Err(format!(
                    "Invalid sort key: {}. Valid values: {}",
                    s,
                    valid.join(", ")
                ))
            }
        }
    };
}

pub(crate) use sort_keys;

mod categories;
mod pantries;
mod products;
mod sharing;
mod shopping_lists;
mod users;

pub use categories::{Categories, CategoryQuery, CategorySort};
pub use pantries::{PantryItemQuery, PantryItemSort, PantryItems, PantryQuery, PantrySort, Pantries};
pub use products::{ProductQuery, ProductSort, Products};
pub use sharing::{Shareable, Sharing};
pub use shopping_lists::{
    ListItemActions, ListItemQuery, ListItemSort, ListItems, ShoppingListActions,
    ShoppingListQuery, ShoppingListSort, ShoppingLists,
};
pub use users::UsersApi;

//! Shopping-list and list-item operations beyond CRUD.

use serde_json::Value;
use tracing::debug;

use super::Store;
use crate::api::{ListItemActions, ListItems, ShoppingListActions, ShoppingLists};
use crate::error::{ApiError, ApiResult};
use crate::models::{EntityId, ListCompletion, ListItem, PurchaseRequest, ShoppingList, ToggleResponse};
use crate::resource::Remote;

impl<S> Store<ShoppingLists, S>
where
    S: Remote<ShoppingLists> + ShoppingListActions,
{
    /// Marks a list as purchased. The list is not guessed locally; the
    /// server's copy is committed once it answers.
    pub async fn purchase(&self, id: EntityId, metadata: Option<Value>) -> ApiResult<ShoppingList> {
        let request = PurchaseRequest { metadata };
        self.commit_only(id, self.remote.purchase(id, &request), |state, list| {
            state.commit(list);
        })
        .await
    }

    /// Un-purchases every item of a list and returns the items. When the
    /// list is the focused one it is re-read so `current` stays accurate.
    pub async fn reset_list(&self, id: EntityId) -> ApiResult<Vec<ListItem>> {
        let focused = self.state().current_is(id);
        let remote = async {
            let items = self.remote.reset(id).await?;
            let refreshed = if focused {
                self.remote.get(id).await.ok()
            } else {
                None
            };
            Ok::<_, ApiError>((items, refreshed))
        };

        let (items, _) = self
            .commit_only(id, remote, |state, (_, refreshed)| {
                if let Some(list) = refreshed {
                    state.commit(list);
                }
            })
            .await?;
        Ok(items)
    }

    /// Moves the list's purchased items into the pantry. The session
    /// announces the move to its subscribers.
    pub async fn move_to_pantry(&self, id: EntityId) -> ApiResult<()> {
        self.commit_only(id, self.remote.move_to_pantry(id), |_, _| {})
            .await
    }
}

impl<S> Store<ShoppingLists, S> {
    /// Records the completion state the server reported for a list.
    pub fn set_completed(&self, id: EntityId, completed: bool) {
        debug!(id, completed, "list completion updated");
        self.state().patch(id, |list| list.completed = Some(completed));
    }
}

impl<S> Store<ListItems, S>
where
    S: Remote<ListItems> + ListItemActions,
{
    /// Flips an item's purchased flag optimistically. Returns the confirmed
    /// item and, when the server reports it, the parent list's completion.
    pub async fn toggle_purchased(
        &self,
        id: EntityId,
        purchased: bool,
    ) -> ApiResult<(ListItem, Option<ListCompletion>)> {
        let response = self
            .optimistic(
                id,
                |item| item.purchased = purchased,
                self.remote.toggle_purchased(id, purchased),
                ToggleResponse::item,
            )
            .await?;
        Ok(response.into_parts())
    }
}

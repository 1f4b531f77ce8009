//! A logged-in (or logging-in) user's view of the API.
//!
//! The [`Session`] owns the gateway and the top-level stores. Nested stores
//! (the items of one pantry or one list) are built on demand. Logging out
//! discards the token and empties every top-level store.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::{
    Categories, ListItemActions, ListItems, Pantries, PantryItems, Products, ShoppingLists,
    UsersApi,
};
use crate::error::{ApiError, ApiResult};
use crate::gateway::{Gateway, TokenError};
use crate::models::{Credentials, EntityId, ListItem, PasswordChange, ProfileUpdate, User};
use crate::resource::{Endpoint, Remote, RestResource};
use crate::store::Store;

/// Signals raised independently of the operation that caused them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server rejected the token; it has been discarded.
    Expired,
    /// A list's purchased items were moved into a pantry, so cached pantry
    /// items are stale.
    ItemsMovedToPantry { list_id: EntityId },
}

pub struct Session {
    gateway: Gateway,
    users: UsersApi,
    /// Profile of the logged-in user, as last fetched.
    user: Mutex<Option<User>>,
    categories: Store<Categories>,
    products: Store<Products>,
    pantries: Store<Pantries>,
    shopping_lists: Store<ShoppingLists>,
}

fn token_error(e: TokenError) -> ApiError {
    ApiError::unknown(0, e.to_string())
}

fn rest<R: crate::resource::Resource>(gateway: &Gateway, path: &str) -> Store<R> {
    Store::new(RestResource::new(gateway.clone(), Endpoint::root(path)))
}

impl Session {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            users: UsersApi::new(gateway.clone()),
            user: Mutex::new(None),
            categories: rest(&gateway, Categories::PATH),
            products: rest(&gateway, Products::PATH),
            pantries: rest(&gateway, Pantries::PATH),
            shopping_lists: rest(&gateway, ShoppingLists::PATH),
            gateway,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.gateway.subscribe()
    }

    /// True while a token is stored. The server may still reject it.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.gateway.tokens().load(), Ok(Some(_)))
    }

    fn user_slot(&self) -> MutexGuard<'_, Option<User>> {
        self.user.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Logs in, stores the issued token and caches the user's profile.
    /// If the profile cannot be fetched the token is discarded again.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<User> {
        let token = self.users.login(credentials).await?;
        self.gateway
            .tokens()
            .save(&token.token)
            .map_err(token_error)?;

        match self.profile().await {
            Ok(user) => {
                info!(email = %credentials.email, "logged in");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "profile fetch after login failed");
                self.gateway.tokens().clear().map_err(token_error)?;
                Err(e)
            }
        }
    }

    /// Fetches the logged-in user's profile and caches it.
    pub async fn profile(&self) -> ApiResult<User> {
        let user = self.users.profile().await?;
        *self.user_slot() = Some(user.clone());
        Ok(user)
    }

    /// The profile cached by the last login, profile fetch or update.
    pub fn current_user(&self) -> Option<User> {
        self.user_slot().clone()
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        let user = self.users.update_profile(update).await?;
        *self.user_slot() = Some(user.clone());
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        self.users.change_password(change).await
    }

    /// Ends the session: tells the server when a token is held, then
    /// discards the token and empties every store. A failed server call
    /// does not keep the session alive.
    pub async fn logout(&self) -> ApiResult<()> {
        if self.is_authenticated() {
            if let Err(e) = self.users.logout().await {
                warn!(error = %e, "server logout failed, discarding token anyway");
            }
        }
        self.gateway.tokens().clear().map_err(token_error)?;
        *self.user_slot() = None;
        self.reset();
        info!("logged out");
        Ok(())
    }

    /// Empties every top-level store.
    pub fn reset(&self) {
        self.categories.reset();
        self.products.reset();
        self.pantries.reset();
        self.shopping_lists.reset();
    }

    pub fn categories(&self) -> &Store<Categories> {
        &self.categories
    }

    pub fn products(&self) -> &Store<Products> {
        &self.products
    }

    pub fn pantries(&self) -> &Store<Pantries> {
        &self.pantries
    }

    pub fn shopping_lists(&self) -> &Store<ShoppingLists> {
        &self.shopping_lists
    }

    /// A store for the items of one pantry.
    pub fn pantry_items(&self, pantry_id: EntityId) -> ApiResult<Store<PantryItems>> {
        let endpoint = Pantries::items_endpoint(pantry_id)?;
        Ok(Store::new(RestResource::new(self.gateway.clone(), endpoint)))
    }

    /// A store for the items of one shopping list.
    pub fn list_items(&self, list_id: EntityId) -> ApiResult<Store<ListItems>> {
        let endpoint = ShoppingLists::items_endpoint(list_id)?;
        Ok(Store::new(RestResource::new(self.gateway.clone(), endpoint)))
    }

    /// Toggles an item's purchased flag. When the server reports the list's
    /// completion it is recorded on the shopping-lists store.
    pub async fn toggle_purchased<S>(
        &self,
        items: &Store<ListItems, S>,
        id: EntityId,
        purchased: bool,
    ) -> ApiResult<ListItem>
    where
        S: Remote<ListItems> + ListItemActions,
    {
        let (item, completion) = items.toggle_purchased(id, purchased).await?;
        if let Some(list) = completion {
            self.shopping_lists.set_completed(list.id, list.completed);
        }
        Ok(item)
    }

    /// Moves a list's purchased items to the pantry and announces it.
    pub async fn move_to_pantry(&self, list_id: EntityId) -> ApiResult<()> {
        self.shopping_lists.move_to_pantry(list_id).await?;
        debug!(list_id, "items moved to pantry");
        self.gateway
            .emit(SessionEvent::ItemsMovedToPantry { list_id });
        Ok(())
    }
}

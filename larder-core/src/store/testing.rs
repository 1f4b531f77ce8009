//! Scripted in-memory remote for store tests.
//!
//! Every call pops the next scripted reply. A deferred reply parks the call
//! until the test sends the outcome, which lets tests look at the store
//! while an operation is in flight.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::api::{ListItemActions, ShoppingListActions, Sharing};
use crate::error::{ApiError, ApiResult};
use crate::models::{EntityId, ListItem, PurchaseRequest, ShoppingList, ToggleResponse, User};
use crate::pagination::{ListResponse, Page, ResolvedQuery};
use crate::resource::{Remote, Resource};

pub(crate) type Outcome = ApiResult<Value>;

enum Reply {
    Ready(Outcome),
    Deferred(oneshot::Receiver<Outcome>),
}

#[derive(Default)]
pub(crate) struct FakeRemote {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, value: Value) -> &Self {
        self.push(Reply::Ready(Ok(value)))
    }

    pub fn fail(&self, error: ApiError) -> &Self {
        self.push(Reply::Ready(Err(error)))
    }

    /// Scripts a reply the test sends later.
    pub fn defer(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.push(Reply::Deferred(rx));
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Yields until `n` calls have reached the remote.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn push(&self, reply: Reply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    async fn next(&self, call: String) -> Outcome {
        self.calls.lock().unwrap().push(call.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted call: {}", call));

        match reply {
            Reply::Ready(outcome) => outcome,
            Reply::Deferred(rx) => rx.await.expect("deferred reply dropped"),
        }
    }

    async fn next_as<T: DeserializeOwned>(&self, call: String) -> ApiResult<T> {
        let value = self.next(call).await?;
        Ok(serde_json::from_value(value).expect("scripted reply has the expected shape"))
    }
}

#[async_trait]
impl<R: Resource> Remote<R> for FakeRemote {
    async fn list(&self, query: &ResolvedQuery) -> ApiResult<Page<R::Entity>> {
        let response: ListResponse<R::Entity> =
            self.next_as(format!("list page={}", query.page)).await?;
        Ok(response.into_page(query))
    }

    async fn get(&self, id: EntityId) -> ApiResult<R::Entity> {
        self.next_as(format!("get {}", id)).await
    }

    async fn create(&self, _input: &R::Create) -> ApiResult<R::Entity> {
        self.next_as("create".to_string()).await
    }

    async fn update(&self, id: EntityId, _patch: &R::Update) -> ApiResult<R::Entity> {
        self.next_as(format!("update {}", id)).await
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        self.next(format!("delete {}", id)).await.map(|_| ())
    }
}

#[async_trait]
impl ShoppingListActions for FakeRemote {
    async fn purchase(&self, id: EntityId, _request: &PurchaseRequest) -> ApiResult<ShoppingList> {
        self.next_as(format!("purchase {}", id)).await
    }

    async fn reset(&self, id: EntityId) -> ApiResult<Vec<ListItem>> {
        self.next_as(format!("reset {}", id)).await
    }

    async fn move_to_pantry(&self, id: EntityId) -> ApiResult<()> {
        self.next(format!("move-to-pantry {}", id)).await.map(|_| ())
    }
}

#[async_trait]
impl ListItemActions for FakeRemote {
    async fn toggle_purchased(&self, id: EntityId, purchased: bool) -> ApiResult<ToggleResponse> {
        self.next_as(format!("toggle {} {}", id, purchased)).await
    }
}

#[async_trait]
impl Sharing for FakeRemote {
    async fn share(&self, id: EntityId, email: &str) -> ApiResult<User> {
        self.next_as(format!("share {} {}", id, email)).await
    }

    async fn shared_users(&self, id: EntityId) -> ApiResult<Vec<User>> {
        self.next_as(format!("shared-users {}", id)).await
    }

    async fn revoke(&self, id: EntityId, user_id: EntityId) -> ApiResult<()> {
        self.next(format!("revoke {} {}", id, user_id)).await.map(|_| ())
    }
}

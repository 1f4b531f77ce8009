use std::sync::Arc;

use serde_json::{json, Value};

use super::testing::FakeRemote;
use super::*;
use crate::api::{
    Categories, CategoryQuery, ListItemQuery, ListItems, Pantries, ShoppingLists,
};
use crate::models::{CategoryCreate, CategoryUpdate, ListItemUpdate};
use crate::pagination::PageRequest;

type CategoryStore = Store<Categories, FakeRemote>;

fn category(id: EntityId, name: &str) -> Value {
    json!({"id": id, "name": name, "createdAt": "2025-01-01 10:00:00", "updatedAt": "2025-01-01 10:00:00"})
}

fn page(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "data": items,
        "pagination": {
            "total": total, "page": 1, "per_page": 10, "total_pages": 1,
            "has_next": false, "has_prev": false
        }
    })
}

fn user(id: EntityId) -> Value {
    json!({"id": id, "email": format!("user{}@example.com", id), "name": "U", "surname": "Ser"})
}

fn list_item(id: EntityId, purchased: bool) -> Value {
    json!({
        "id": id, "quantity": 1, "unit": "u", "purchased": purchased,
        "product": {"id": id * 10, "name": format!("Product {}", id)}
    })
}

fn shopping_list(id: EntityId, shared: Vec<Value>) -> Value {
    json!({"id": id, "name": "Weekly", "owner": user(1), "sharedWith": shared})
}

/// A category store holding Milk (1) and Eggs (2).
async fn milk_and_eggs() -> Arc<CategoryStore> {
    let store = Arc::new(Store::new(FakeRemote::new()));
    store
        .remote()
        .reply(page(vec![category(1, "Milk"), category(2, "Eggs")]));
    store.fetch_list(CategoryQuery::default()).await.unwrap();
    store
}

fn names(store: &CategoryStore) -> Vec<String> {
    store.items().into_iter().map(|c| c.name).collect()
}

fn rename(name: &str) -> CategoryUpdate {
    CategoryUpdate {
        name: Some(name.to_string()),
        metadata: None,
    }
}

#[tokio::test]
async fn test_fetch_list_replaces_items_and_pagination() {
    let store = milk_and_eggs().await;

    assert_eq!(names(&store), vec!["Milk", "Eggs"]);
    let meta = store.pagination();
    assert_eq!(meta.total, 2);
    assert!(!meta.has_next);
    assert!(store.last_query().is_some());
    assert_eq!(store.status(), Status::Idle);
}

#[tokio::test]
async fn test_update_failure_rolls_back() {
    let store = milk_and_eggs().await;
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.update(1, rename("Oat Milk")).await })
    };
    store.remote().wait_for_calls(2).await;

    // Visible before the server answers.
    assert_eq!(names(&store), vec!["Oat Milk", "Eggs"]);
    assert!(store.is_loading());

    reply
        .send(Err(ApiError::from_response(500, None)))
        .unwrap();
    let err = task.await.unwrap().unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(names(&store), vec!["Milk", "Eggs"]);
    assert_eq!(store.last_error().map(|e| e.status), Some(500));
    assert!(!store.is_loading());
    assert!(matches!(store.status(), Status::Error(e) if e.status == 500));
}

#[tokio::test]
async fn test_update_commits_server_value() {
    let store = milk_and_eggs().await;
    store.remote().reply(category(1, "Oat Milk (server)"));

    let updated = store.update(1, rename("Oat Milk")).await.unwrap();

    assert_eq!(updated.name, "Oat Milk (server)");
    assert_eq!(names(&store), vec!["Oat Milk (server)", "Eggs"]);
    assert_eq!(store.status(), Status::Idle);
}

#[tokio::test]
async fn test_create_is_not_optimistic() {
    let store: Arc<CategoryStore> = Arc::new(Store::new(FakeRemote::new()));
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.create(CategoryCreate::new("Bread")).await })
    };
    store.remote().wait_for_calls(1).await;

    assert!(store.is_empty());
    assert_eq!(store.status(), Status::Loading);

    reply.send(Ok(category(7, "Bread"))).unwrap();
    let created = task.await.unwrap().unwrap();

    assert_eq!(created.id, 7);
    assert_eq!(store.items(), vec![created]);
    assert_eq!(store.status(), Status::Idle);
}

#[tokio::test]
async fn test_create_inserts_at_head() {
    let store = milk_and_eggs().await;
    store.remote().reply(category(3, "Bread"));

    store.create(CategoryCreate::new("Bread")).await.unwrap();
    assert_eq!(names(&store), vec!["Bread", "Milk", "Eggs"]);
}

#[tokio::test]
async fn test_failed_create_leaves_items_alone() {
    let store = milk_and_eggs().await;
    store
        .remote()
        .fail(ApiError::validation("Name is required"));

    let err = store.create(CategoryCreate::new("")).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(names(&store), vec!["Milk", "Eggs"]);
    assert_eq!(store.last_error(), Some(err));
}

#[tokio::test]
async fn test_failed_fetch_keeps_items_and_pagination() {
    let store = milk_and_eggs().await;
    let before = store.pagination();
    store.remote().fail(ApiError::network("Unable to reach the server"));

    let query = CategoryQuery {
        paging: PageRequest::new(2, 10),
        ..Default::default()
    };
    let err = store.fetch_list(query).await.unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(names(&store), vec!["Milk", "Eggs"]);
    assert_eq!(store.pagination(), before);
    assert_eq!(store.last_query().and_then(|q| q.paging.page), None);
}

#[tokio::test]
async fn test_zero_page_never_reaches_the_remote() {
    let store = milk_and_eggs().await;
    let query = CategoryQuery {
        paging: PageRequest::new(0, 10),
        ..Default::default()
    };

    let err = store.fetch_list(query).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.remote().calls().len(), 1);
}

#[tokio::test]
async fn test_bare_array_response_gets_single_page_metadata() {
    let store: CategoryStore = Store::new(FakeRemote::new());
    store
        .remote()
        .reply(json!([category(1, "Milk"), category(2, "Eggs"), category(3, "Tea")]));

    store.fetch_list(CategoryQuery::default()).await.unwrap();
    let meta = store.pagination();
    assert_eq!(meta.total, 3);
    assert_eq!(meta.total_pages, 1);
    assert!(!meta.has_next && !meta.has_prev);
}

#[tokio::test]
async fn test_delete_network_failure_restores_entity() {
    let store = milk_and_eggs().await;
    store.remote().fail(ApiError::network("connection refused"));

    let err = store.delete(2).await.unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(names(&store), vec!["Milk", "Eggs"]);
    assert_eq!(store.last_error().map(|e| e.status), Some(0));
}

#[tokio::test]
async fn test_concurrent_double_delete_does_not_resurrect() {
    let store = milk_and_eggs().await;
    store.remote().reply(Value::Null);
    store.remote().fail(ApiError::from_response(404, None));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.delete(2).await })
    };
    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.delete(2).await })
    };

    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().unwrap_err().is_not_found());
    assert_eq!(names(&store), vec!["Milk"]);
}

#[tokio::test]
async fn test_concurrent_updates_on_different_ids_both_persist() {
    let store = milk_and_eggs().await;
    let first_reply = store.remote().defer();
    let second_reply = store.remote().defer();

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.update(1, rename("Oat Milk")).await })
    };
    store.remote().wait_for_calls(2).await;
    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.update(2, rename("Free-range Eggs")).await })
    };
    store.remote().wait_for_calls(3).await;

    // Both in flight at once.
    assert_eq!(names(&store), vec!["Oat Milk", "Free-range Eggs"]);

    second_reply.send(Ok(category(2, "Free-range Eggs"))).unwrap();
    first_reply.send(Ok(category(1, "Oat Milk"))).unwrap();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(names(&store), vec!["Oat Milk", "Free-range Eggs"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_rollback_does_not_clobber_other_entity() {
    let store = milk_and_eggs().await;
    let failing = store.remote().defer();
    store.remote().reply(category(2, "Brown Eggs"));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.update(1, rename("Oat Milk")).await })
    };
    store.remote().wait_for_calls(2).await;

    store.update(2, rename("Brown Eggs")).await.unwrap();
    failing.send(Err(ApiError::from_response(409, None))).unwrap();
    assert!(first.await.unwrap().is_err());

    assert_eq!(names(&store), vec!["Milk", "Brown Eggs"]);
}

#[tokio::test]
async fn test_same_id_updates_are_serialized() {
    let store = milk_and_eggs().await;
    let first_reply = store.remote().defer();
    store.remote().reply(category(1, "Second"));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.update(1, rename("First")).await })
    };
    store.remote().wait_for_calls(2).await;
    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.update(1, rename("Second")).await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // The second update waits for the first to settle.
    assert_eq!(store.remote().calls().len(), 2);

    first_reply.send(Err(ApiError::from_response(500, None))).unwrap();
    assert!(first.await.unwrap().is_err());
    second.await.unwrap().unwrap();

    assert_eq!(names(&store), vec!["Second", "Eggs"]);
}

#[tokio::test]
async fn test_failed_update_does_not_reinsert_into_newer_page() {
    let store = milk_and_eggs().await;
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.update(1, rename("Oat Milk")).await })
    };
    store.remote().wait_for_calls(2).await;

    store
        .remote()
        .reply(page(vec![category(3, "Tea"), category(4, "Rice")]));
    let query = CategoryQuery {
        paging: PageRequest::new(2, 10),
        ..Default::default()
    };
    store.fetch_list(query).await.unwrap();
    assert_eq!(names(&store), vec!["Tea", "Rice"]);

    reply.send(Err(ApiError::from_response(500, None))).unwrap();
    assert!(task.await.unwrap().is_err());

    assert_eq!(names(&store), vec!["Tea", "Rice"]);
    assert_eq!(store.last_query().and_then(|q| q.paging.page), Some(2));
}

#[tokio::test]
async fn test_failed_delete_after_reset_leaves_store_empty() {
    let store = milk_and_eggs().await;
    store.remote().reply(category(1, "Milk"));
    store.fetch_one(1).await.unwrap();
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.delete(1).await })
    };
    store.remote().wait_for_calls(3).await;

    store.reset();
    assert!(store.is_empty());
    assert!(store.is_loading());

    reply.send(Err(ApiError::from_response(500, None))).unwrap();
    assert!(task.await.unwrap().is_err());

    assert!(store.is_empty());
    assert!(store.current().is_none());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_confirmed_delete_wins_over_concurrent_refresh() {
    let store = milk_and_eggs().await;
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.delete(2).await })
    };
    store.remote().wait_for_calls(2).await;
    assert_eq!(names(&store), vec!["Milk"]);

    // The server has not processed the delete yet.
    store
        .remote()
        .reply(page(vec![category(1, "Milk"), category(2, "Eggs")]));
    store.refresh().await.unwrap();
    assert_eq!(names(&store), vec!["Milk", "Eggs"]);

    reply.send(Ok(Value::Null)).unwrap();
    task.await.unwrap().unwrap();

    assert_eq!(names(&store), vec!["Milk"]);
    assert!(store.get(2).is_none());
}

#[tokio::test]
async fn test_failed_revoke_after_reset_keeps_users_cleared() {
    let store: Arc<Store<Pantries, FakeRemote>> = Arc::new(Store::new(FakeRemote::new()));
    store.remote().reply(page(vec![json!({
        "id": 4, "name": "Home", "owner": user(1), "sharedWith": [user(2)]
    })]));
    store
        .fetch_list(crate::api::PantryQuery::default())
        .await
        .unwrap();
    store.remote().reply(json!([user(2)]));
    store.fetch_shared_users(4).await.unwrap();
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.revoke_share(4, 2).await })
    };
    store.remote().wait_for_calls(3).await;
    store.reset();

    reply.send(Err(ApiError::from_response(403, None))).unwrap();
    assert!(task.await.unwrap().is_err());

    assert!(store.is_empty());
    assert!(store.shared_users(4).is_empty());
}

#[tokio::test]
async fn test_fetch_one_sets_current_and_refreshes_entry() {
    let store = milk_and_eggs().await;
    store.remote().reply(category(2, "Eggs (dozen)"));

    store.fetch_one(2).await.unwrap();
    assert_eq!(store.current().map(|c| c.name), Some("Eggs (dozen)".to_string()));
    assert_eq!(names(&store), vec!["Milk", "Eggs (dozen)"]);

    store.remote().fail(ApiError::from_response(404, None));
    assert!(store.fetch_one(9).await.is_err());
    assert_eq!(store.current().map(|c| c.id), Some(2));
}

#[tokio::test]
async fn test_rollback_restores_current() {
    let store = milk_and_eggs().await;
    store.remote().reply(category(1, "Milk"));
    store.fetch_one(1).await.unwrap();

    store.remote().fail(ApiError::from_response(403, None));
    assert!(store.update(1, rename("Oat Milk")).await.is_err());
    assert_eq!(store.current().map(|c| c.name), Some("Milk".to_string()));

    store.remote().fail(ApiError::from_response(403, None));
    assert!(store.delete(1).await.is_err());
    assert_eq!(store.current().map(|c| c.id), Some(1));
}

#[tokio::test]
async fn test_next_operation_clears_error_and_reset_empties() {
    let store = milk_and_eggs().await;
    store.remote().fail(ApiError::from_response(500, None));
    assert!(store.delete(1).await.is_err());
    assert!(store.last_error().is_some());

    store.remote().reply(category(1, "Milk"));
    store.fetch_one(1).await.unwrap();
    assert_eq!(store.last_error(), None);

    store.reset();
    assert!(store.is_empty());
    assert!(store.current().is_none());
    assert_eq!(store.pagination(), PaginationMeta::default());
    assert!(store.last_query().is_none());
}

#[tokio::test]
async fn test_clear_error() {
    let store = milk_and_eggs().await;
    store.remote().fail(ApiError::from_response(500, None));
    assert!(store.delete(1).await.is_err());

    store.clear_error();
    assert_eq!(store.status(), Status::Idle);
}

#[tokio::test]
async fn test_toggle_purchased_rolls_back_and_reports_completion() {
    let store: Store<ListItems, FakeRemote> = Store::new(FakeRemote::new());
    store
        .remote()
        .reply(page(vec![list_item(1, false), list_item(2, true)]));
    store.fetch_list(ListItemQuery::default()).await.unwrap();

    store.remote().fail(ApiError::network("timeout"));
    assert!(store.toggle_purchased(1, true).await.is_err());
    assert_eq!(store.purchased_count(), 1);

    store.remote().reply(json!({
        "item": list_item(1, true),
        "list": {"id": 5, "completed": true}
    }));
    let (item, completion) = store.toggle_purchased(1, true).await.unwrap();
    assert!(item.purchased);
    assert_eq!(completion.map(|c| c.completed), Some(true));
    assert!(store.all_purchased());
}

#[tokio::test]
async fn test_list_item_mutate_with_custom_remote() {
    let store: Store<ListItems, FakeRemote> = Store::new(FakeRemote::new());
    store.remote().reply(page(vec![list_item(1, false)]));
    store.fetch_list(ListItemQuery::default()).await.unwrap();
    store.remote().reply(json!({
        "id": 1, "quantity": 4, "unit": "u", "purchased": false,
        "product": {"id": 10, "name": "Product 1"}
    }));

    let patch = ListItemUpdate {
        quantity: Some(3.0),
        ..Default::default()
    };
    let item = store
        .mutate(1, |i| i.quantity = 3.0, Remote::<ListItems>::update(store.remote(), 1, &patch))
        .await
        .unwrap();

    assert_eq!(item.quantity, 4.0);
    assert_eq!(store.get(1).map(|i| i.quantity), Some(4.0));
}

#[tokio::test]
async fn test_purchase_commits_without_guessing() {
    let store: Arc<Store<ShoppingLists, FakeRemote>> = Arc::new(Store::new(FakeRemote::new()));
    store.remote().reply(page(vec![shopping_list(3, vec![])]));
    store
        .fetch_list(crate::api::ShoppingListQuery::default())
        .await
        .unwrap();
    let reply = store.remote().defer();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.purchase(3, None).await })
    };
    store.remote().wait_for_calls(2).await;
    assert_eq!(store.get(3).and_then(|l| l.last_purchased_at), None);

    let mut purchased = shopping_list(3, vec![]);
    purchased["lastPurchasedAt"] = json!("2025-02-01 12:00:00");
    reply.send(Ok(purchased)).unwrap();
    task.await.unwrap().unwrap();

    assert!(store.get(3).and_then(|l| l.last_purchased_at).is_some());
}

#[tokio::test]
async fn test_reset_list_refreshes_current() {
    let store: Store<ShoppingLists, FakeRemote> = Store::new(FakeRemote::new());
    let mut completed = shopping_list(3, vec![]);
    completed["completed"] = json!(true);
    store.remote().reply(completed);
    store.fetch_one(3).await.unwrap();

    store.remote().reply(json!([list_item(1, false)]));
    store.remote().reply(shopping_list(3, vec![]));
    let items = store.reset_list(3).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(store.current().and_then(|l| l.completed), None);
    assert_eq!(store.remote().calls(), vec!["get 3", "reset 3", "get 3"]);
}

#[tokio::test]
async fn test_set_completed_is_local_only() {
    let store: Store<ShoppingLists, FakeRemote> = Store::new(FakeRemote::new());
    store.remote().reply(page(vec![shopping_list(3, vec![])]));
    store
        .fetch_list(crate::api::ShoppingListQuery::default())
        .await
        .unwrap();

    store.set_completed(3, true);
    assert_eq!(store.get(3).map(|l| l.is_completed()), Some(true));
    assert_eq!(store.remote().calls().len(), 1);
}

#[tokio::test]
async fn test_revoke_share_rolls_back() {
    let store: Store<Pantries, FakeRemote> = Store::new(FakeRemote::new());
    store.remote().reply(page(vec![json!({
        "id": 4, "name": "Home", "owner": user(1), "sharedWith": [user(2)]
    })]));
    store
        .fetch_list(crate::api::PantryQuery::default())
        .await
        .unwrap();
    store.remote().reply(json!([user(2)]));
    store.fetch_shared_users(4).await.unwrap();

    store.remote().fail(ApiError::from_response(403, None));
    assert!(store.revoke_share(4, 2).await.is_err());
    assert_eq!(store.shared_users(4).len(), 1);
    assert!(store.get(4).is_some_and(|p| p.is_shared()));

    store.remote().reply(Value::Null);
    store.revoke_share(4, 2).await.unwrap();
    assert!(store.shared_users(4).is_empty());
    assert!(store.shared(1).is_empty());
}

#[tokio::test]
async fn test_owned_and_shared_pantries() {
    let store: Store<Pantries, FakeRemote> = Store::new(FakeRemote::new());
    store.remote().reply(page(vec![
        json!({"id": 1, "name": "Home", "owner": user(1), "sharedWith": []}),
        json!({"id": 2, "name": "Cabin", "owner": user(1), "sharedWith": [user(3)]}),
        json!({"id": 3, "name": "Office", "owner": user(2)}),
    ]));
    store
        .fetch_list(crate::api::PantryQuery::default())
        .await
        .unwrap();

    let ids = |pantries: Vec<crate::models::Pantry>| -> Vec<EntityId> {
        pantries.into_iter().map(|p| p.id).collect()
    };
    assert_eq!(ids(store.owned(1)), vec![1, 2]);
    assert_eq!(ids(store.shared(1)), vec![2, 3]);
    assert_eq!(ids(store.owned(2)), vec![3]);
    assert_eq!(ids(store.shared(2)), vec![1, 2]);
}

#[tokio::test]
async fn test_share_adds_user() {
    let store: Store<ShoppingLists, FakeRemote> = Store::new(FakeRemote::new());
    store.remote().reply(page(vec![shopping_list(3, vec![])]));
    store
        .fetch_list(crate::api::ShoppingListQuery::default())
        .await
        .unwrap();

    store.remote().reply(user(9));
    let shared = store.share(3, "user9@example.com").await.unwrap();

    assert_eq!(shared.id, 9);
    assert_eq!(store.shared_users(3).len(), 1);
    assert_eq!(store.get(3).map(|l| l.shared_with.len()), Some(1));
}

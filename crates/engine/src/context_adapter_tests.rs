// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;
use vigil_context::InMemoryContextStore;

#[tokio::test]
async fn scopes_per_id_keys_to_the_message_id() {
    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    let a = ScopedRuleContext::new(store.clone(), "msg-a");
    let b = ScopedRuleContext::new(store.clone(), "msg-b");

    a.set("k", Value::from(1)).await.unwrap();
    assert_eq!(a.get("k").await.unwrap(), Some(Value::from(1)));
    assert_eq!(b.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn shared_keys_cross_message_ids() {
    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    let a = ScopedRuleContext::new(store.clone(), "msg-a");
    let b = ScopedRuleContext::new(store.clone(), "msg-b");

    a.set_shared("open_aggr:sup-1", Value::from(0)).await.unwrap();
    assert_eq!(b.get_shared("open_aggr:sup-1").await.unwrap(), Some(Value::from(0)));
    assert_eq!(a.incr_shared("counter", 1).await.unwrap(), 1);
    assert_eq!(b.incr_shared("counter", 1).await.unwrap(), 2);
}

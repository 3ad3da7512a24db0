// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn open_aggr_key_embeds_supitem_id() {
    let supitem = SupItemId::new();
    let key = open_aggr_key(supitem);
    assert!(key.starts_with("open_aggr:"));
    assert!(key.ends_with(supitem.as_str()));
}

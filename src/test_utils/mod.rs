#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod stores;

pub(crate) use http::{get_test_state, response_json};
pub(crate) use stores::{FakeTemplateStore, FakeTransactionStore, template};

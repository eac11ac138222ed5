// tests/common/mod.rs

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::Arc;

pub use assetline_test_utils::builders::{DescriptorBuilder, TableBuilder};
pub use assetline_test_utils::fakes::{Behaviour, FakeTransformer, RecordingHandler, RecordingSink};
pub use assetline_test_utils::{init_tracing, with_timeout};

use assetline::engine::Dispatcher;
use assetline::env::{BuildEnv, BuildVersion};
use assetline::fs::mock::MockFileSystem;
use assetline::registry::{TaskContext, TaskHandler, TaskRegistry};

/// Project root used by every in-memory scenario.
pub const ROOT: &str = "/p";

pub fn mock_context(fs: MockFileSystem) -> TaskContext {
    let env = BuildEnv::new(ROOT, false, BuildVersion::fixed("test-build-version"));
    TaskContext::new(Arc::new(env), Arc::new(fs))
}

/// Dispatcher over an empty mock filesystem with the given handlers.
pub fn dispatcher_with(handlers: &[(&str, Arc<dyn TaskHandler>)], sink: &RecordingSink) -> Dispatcher {
    let mut registry = TaskRegistry::new();
    for (name, handler) in handlers {
        registry.register(*name, Arc::clone(handler));
    }
    Dispatcher::new(
        registry,
        mock_context(MockFileSystem::new()),
        sink.clone().into_arc(),
    )
}

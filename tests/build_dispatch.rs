// tests/build_dispatch.rs

mod common;
use crate::common::{
    dispatcher_with, init_tracing, with_timeout, Behaviour, DescriptorBuilder, RecordingHandler,
    RecordingSink, TableBuilder,
};

use std::collections::BTreeSet;
use std::path::PathBuf;

use assetline::engine::dispatch_all;
use assetline::types::DescriptorId;

#[tokio::test]
async fn dispatch_all_runs_each_descriptor_exactly_once() {
    init_tracing();

    let html = RecordingHandler::new();
    let css = RecordingHandler::new();
    let img = RecordingHandler::new();
    let sink = RecordingSink::new();
    let dispatcher = dispatcher_with(
        &[
            ("html", html.clone().into_arc()),
            ("css", css.clone().into_arc()),
            ("img", img.clone().into_arc()),
        ],
        &sink,
    );

    let table = TableBuilder::new()
        .with_task(DescriptorBuilder::new("html").entry("source/index.html").dest("dist").build())
        .with_task(DescriptorBuilder::new("css").entry("source/css/index.css").dest("dist/css").build())
        .with_task(DescriptorBuilder::new("img").watch_on("source/img/**/*").dest("dist/img").build())
        .build();

    let report = with_timeout(dispatch_all(&dispatcher, &table)).await;

    assert_eq!(report.total(), 3);
    assert!(report.is_clean());
    assert_eq!(html.call_count(), 1);
    assert_eq!(css.call_count(), 1);
    assert_eq!(img.call_count(), 1);
    assert_eq!(sink.count(), 0);

    // Paths reach the handler already resolved against the root.
    assert_eq!(css.calls()[0].dest, Some(PathBuf::from("/p/dist/css")));
}

#[tokio::test]
async fn fan_out_dispatches_every_entry_through_its_own_queue() {
    init_tracing();

    let js = RecordingHandler::new().serialized();
    let sink = RecordingSink::new();
    let dispatcher = dispatcher_with(&[("javascript", js.clone().into_arc())], &sink);

    let table = TableBuilder::new()
        .with_fan_out(
            "javascript",
            vec![
                DescriptorBuilder::new("javascript")
                    .entry("source/js/index.js")
                    .dest("dist/assets/js")
                    .param("tag", "main")
                    .build(),
                DescriptorBuilder::new("javascript")
                    .entry("source/js/sw.js")
                    .dest("dist")
                    .param("tag", "worker")
                    .build(),
            ],
        )
        .build();

    let report = with_timeout(dispatch_all(&dispatcher, &table)).await;

    assert_eq!(report.succeeded.len(), 2);
    let tags: BTreeSet<_> = js.calls().into_iter().filter_map(|c| c.tag).collect();
    assert_eq!(tags, BTreeSet::from(["main".to_string(), "worker".to_string()]));

    assert_eq!(dispatcher.queue_count(), 2);
    assert!(dispatcher.queue(&DescriptorId::new("javascript", 0)).is_some());
    assert!(dispatcher.queue(&DescriptorId::new("javascript", 1)).is_some());
}

#[tokio::test]
async fn unknown_task_is_reported_and_the_rest_still_runs() {
    init_tracing();

    let html = RecordingHandler::new();
    let sink = RecordingSink::new();
    let dispatcher = dispatcher_with(&[("html", html.clone().into_arc())], &sink);

    let table = TableBuilder::new()
        .with_task(DescriptorBuilder::new("sprites").watch_on("source/sprites/*").build())
        .with_task(DescriptorBuilder::new("html").entry("source/index.html").dest("dist").build())
        .build();

    let report = with_timeout(dispatch_all(&dispatcher, &table)).await;

    assert_eq!(report.failed, vec![DescriptorId::new("sprites", 0)]);
    assert_eq!(report.succeeded, vec![DescriptorId::new("html", 0)]);
    assert_eq!(html.call_count(), 1);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, DescriptorId::new("sprites", 0));
    assert!(reports[0].1.contains("no handler registered"), "{}", reports[0].1);
}

#[tokio::test]
async fn handler_failure_and_panic_are_reported_without_aborting_the_build() {
    init_tracing();

    let broken = RecordingHandler::new().failing();
    let panicking = RecordingHandler::new().with_script(vec![Behaviour::Panic]);
    let fine = RecordingHandler::new();
    let sink = RecordingSink::new();
    let dispatcher = dispatcher_with(
        &[
            ("css", broken.clone().into_arc()),
            ("icons", panicking.clone().into_arc()),
            ("static", fine.clone().into_arc()),
        ],
        &sink,
    );

    let table = TableBuilder::new()
        .with_task(DescriptorBuilder::new("css").entry("a.css").dest("dist").build())
        .with_task(DescriptorBuilder::new("icons").watch_on("icons/*.svg").dest("dist").build())
        .with_task(DescriptorBuilder::new("static").watch_on("static/**/*").dest("dist").build())
        .build();

    let report = with_timeout(dispatch_all(&dispatcher, &table)).await;

    assert_eq!(report.succeeded, vec![DescriptorId::new("static", 0)]);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(sink.count(), 2);
    assert!(
        sink.reports()
            .iter()
            .any(|(id, msg)| id.task == "icons" && msg.contains("panicked"))
    );
}

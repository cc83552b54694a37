//! Call-to-stream bridge behaviour through the adapter factory, against
//! scripted calls.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use fluxcall::adapter::{Adapted, FluxCallAdapterFactory};
use fluxcall::call::{CallResult, Response};
use fluxcall::reactive::{Flux, StreamEvent, ThreadScheduler};
use fluxcall::Error;
use futures::StreamExt;

use support::{RecordingSubscriber, StubCall, disconnected, not_found, ok_hey};

const WAIT: Duration = Duration::from_secs(5);

fn factories() -> [FluxCallAdapterFactory; 2] {
    [
        FluxCallAdapterFactory::create(),
        FluxCallAdapterFactory::create_async(),
    ]
}

fn adapt(factory: &FluxCallAdapterFactory, signature: &str, call: StubCall) -> Adapted<String> {
    factory
        .get_declared(signature)
        .expect("valid declaration")
        .expect("handled declaration")
        .adapt(call)
}

#[test]
fn body_emits_hey_then_completes() {
    for factory in factories() {
        let body = adapt(&factory, "Flux<String>", StubCall::new(ok_hey))
            .into_body()
            .unwrap()
            .into_flux();
        let (subscriber, recording) = RecordingSubscriber::new();
        body.subscribe(subscriber);
        recording.await_terminal(WAIT);
        assert_eq!(recording.describe(), vec!["next \"hey\"", "complete"]);
    }
}

#[test]
fn body_fails_with_http_error_on_404() {
    for factory in factories() {
        let body = adapt(&factory, "Flux<String>", StubCall::new(not_found))
            .into_body()
            .unwrap()
            .into_flux();
        let (subscriber, recording) = RecordingSubscriber::new();
        body.subscribe(subscriber);
        recording.await_terminal(WAIT);

        let events = recording.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            StreamEvent::Error(Error::Http(e)) => {
                assert_eq!(e.code(), 404);
                assert_eq!(e.body().map(|b| b.as_ref()), Some(&b"missing"[..]));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

#[test]
fn body_and_response_fail_with_io_cause_on_disconnect() {
    for factory in factories() {
        for signature in ["Flux<String>", "Flux<Response<String>>"] {
            let adapted = adapt(&factory, signature, StubCall::new(disconnected));
            let (subscriber, recording) = RecordingSubscriber::<String>::new();
            let flux = match adapted {
                Adapted::Body(body) => body.into_flux(),
                Adapted::Response(responses) => responses.into_flux().lift(downstream_bodies),
                Adapted::Result(_) => unreachable!(),
            };
            flux.subscribe(subscriber);
            recording.await_terminal(WAIT);
            assert_eq!(
                recording.describe(),
                vec!["error I/O failure: connection closed before message completed"],
                "{signature}"
            );
        }
    }
}

/// Adapts a string subscriber to a response stream so both shapes share one recorder.
fn downstream_bodies(
    downstream: Box<dyn fluxcall::reactive::Subscriber<String>>,
) -> Box<dyn fluxcall::reactive::Subscriber<Response<String>>> {
    struct Bodies(Box<dyn fluxcall::reactive::Subscriber<String>>);

    impl fluxcall::reactive::Subscriber<Response<String>> for Bodies {
        fn on_subscribe(&mut self, subscription: fluxcall::reactive::Subscription) {
            self.0.on_subscribe(subscription)
        }

        fn on_next(&mut self, item: Response<String>) -> fluxcall::Result<()> {
            self.0.on_next(item.into_body().unwrap_or_default())
        }

        fn on_error(&mut self, error: Error) -> fluxcall::Result<()> {
            self.0.on_error(error)
        }

        fn on_complete(&mut self) {
            self.0.on_complete()
        }
    }

    Box::new(Bodies(downstream))
}

#[test]
fn response_emits_raw_response_whatever_the_status() {
    for factory in factories() {
        for (outcome, code) in [(ok_hey as support::Outcome, 200), (not_found, 404)] {
            let responses = adapt(&factory, "Flux<Response<String>>", StubCall::new(outcome))
                .into_response()
                .unwrap()
                .into_flux();
            let (subscriber, recording) = RecordingSubscriber::new();
            responses.subscribe(subscriber);
            recording.await_terminal(WAIT);

            let events = recording.take_events();
            assert!(
                matches!(&events[..], [StreamEvent::Next(r), StreamEvent::Complete] if r.code() == code),
                "{events:?}"
            );
        }
    }
}

#[test]
fn result_wraps_response_and_failure_then_completes() {
    for factory in factories() {
        let results = adapt(&factory, "Flux<Result<String>>", StubCall::new(ok_hey))
            .into_result()
            .unwrap()
            .into_flux();
        let (subscriber, recording) = RecordingSubscriber::new();
        results.subscribe(subscriber);
        recording.await_terminal(WAIT);
        let events = recording.take_events();
        match &events[..] {
            [StreamEvent::Next(CallResult::Response(r)), StreamEvent::Complete] => {
                assert_eq!(r.code(), 200);
                assert_eq!(r.body().map(String::as_str), Some("hey"));
            }
            other => panic!("unexpected events: {other:?}"),
        }

        let results = adapt(&factory, "Flux<Result<String>>", StubCall::new(disconnected))
            .into_result()
            .unwrap()
            .into_flux();
        let (subscriber, recording) = RecordingSubscriber::new();
        results.subscribe(subscriber);
        recording.await_terminal(WAIT);
        let events = recording.take_events();
        assert!(
            matches!(
                &events[..],
                [StreamEvent::Next(CallResult::Error(Error::Io(_))), StreamEvent::Complete]
            ),
            "{events:?}"
        );
    }
}

#[test]
fn result_routes_rejected_failure_to_the_error_channel() {
    let results = adapt(
        &FluxCallAdapterFactory::create(),
        "Flux<Result<String>>",
        StubCall::new(disconnected),
    )
    .into_result()
    .unwrap()
    .into_flux();
    let (subscriber, recording) = RecordingSubscriber::new();
    results.subscribe(subscriber.rejecting());
    assert_eq!(
        recording.describe(),
        vec!["error Subscriber failed: rejected by test"]
    );
}

#[test]
fn rejected_body_cancels_the_call_and_reports_the_rejection() {
    let call = StubCall::new(ok_hey);
    let stats = call.stats();
    let body = adapt(&FluxCallAdapterFactory::create(), "Flux<String>", call)
        .into_body()
        .unwrap()
        .into_flux();
    let (subscriber, recording) = RecordingSubscriber::new();
    body.subscribe(subscriber.rejecting());
    assert_eq!(
        recording.describe(),
        vec!["error Subscriber failed: rejected by test"]
    );
    assert_eq!(stats.cancels.load(Ordering::SeqCst), 1);
}

#[test]
fn mono_resolves_to_the_body() {
    for factory in factories() {
        let mono = adapt(&factory, "Mono<String>", StubCall::new(ok_hey))
            .into_body()
            .unwrap()
            .into_mono()
            .unwrap();
        assert_eq!(mono.block().unwrap(), "hey");
    }
}

#[test]
fn single_rejects_empty_and_multi_valued_sources() {
    let empty = Flux::<u32>::empty().single().block();
    assert!(matches!(empty, Err(Error::NoSuchElement)));

    let many = Flux::from_items(vec![1u32, 2]).single().block();
    assert!(matches!(many, Err(Error::TooManyElements)));

    assert_eq!(Flux::from_items(vec![7u32]).single().block().unwrap(), 7);
}

#[test]
fn every_subscription_runs_its_own_clone() {
    for factory in factories() {
        let call = StubCall::new(ok_hey);
        let stats = call.stats();
        let body = adapt(&factory, "Flux<String>", call)
            .into_body()
            .unwrap()
            .into_flux();
        for _ in 0..3 {
            let (subscriber, recording) = RecordingSubscriber::new();
            body.subscribe(subscriber);
            recording.await_terminal(WAIT);
        }
        assert_eq!(stats.clones.load(Ordering::SeqCst), 3);
        assert_eq!(stats.executions.load(Ordering::SeqCst), 3);
    }
}

#[test]
fn disposing_before_completion_cancels_once() {
    let call = StubCall::new(ok_hey).parking();
    let stats = call.stats();
    let body = adapt(&FluxCallAdapterFactory::create_async(), "Flux<String>", call)
        .into_body()
        .unwrap()
        .into_flux();
    let (subscriber, recording) = RecordingSubscriber::new();
    body.subscribe(subscriber);

    let subscription = recording.subscription();
    subscription.cancel();
    subscription.cancel();
    assert!(subscription.is_cancelled());
    assert_eq!(stats.cancels.load(Ordering::SeqCst), 1);

    let late = stats.parked.lock().unwrap().pop().unwrap();
    late.on_response(Response::success("late".into()));
    late.on_failure(Error::Canceled);
    assert!(recording.describe().is_empty());
}

#[test]
fn response_waits_for_demand() {
    let body = adapt(&FluxCallAdapterFactory::create(), "Flux<String>", StubCall::new(ok_hey))
        .into_body()
        .unwrap()
        .into_flux();
    let (subscriber, recording) = RecordingSubscriber::with_request(0);
    body.subscribe(subscriber);
    assert!(recording.describe().is_empty());

    recording.subscription().request(1);
    assert_eq!(recording.describe(), vec!["next \"hey\"", "complete"]);
}

#[test]
fn scheduler_moves_the_subscription_off_the_caller() {
    let scheduler = Arc::new(ThreadScheduler::new("bridge-test"));
    let factory = FluxCallAdapterFactory::create_with_scheduler(scheduler);
    let mono = adapt(&factory, "Mono<Response<String>>", StubCall::new(ok_hey))
        .into_response()
        .unwrap()
        .into_mono()
        .unwrap();
    let response = mono.block().unwrap();
    assert!(response.is_successful());
    assert_eq!(response.into_body().as_deref(), Some("hey"));
}

#[tokio::test]
async fn stream_consumption_matches_callback_consumption() {
    let body = adapt(
        &FluxCallAdapterFactory::create_async(),
        "Flux<String>",
        StubCall::new(ok_hey),
    )
    .into_body()
    .unwrap();
    let items: Vec<_> = body.stream().collect().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_deref().unwrap(), "hey");
}

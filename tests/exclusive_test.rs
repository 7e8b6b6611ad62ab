/*!
 * Exclusive Schema Tests
 * Work-queue delivery driven through a live dispatcher thread
 */

mod common;

use common::{wait_until, RecordingReceiver};
use pretty_assertions::assert_eq;
use pubsub_dispatch::{ExclusiveSchema, Message, Schema};
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn spawn_dispatcher(schema: &ExclusiveSchema) -> thread::JoinHandle<()> {
    let runner = schema.clone();
    thread::spawn(move || runner.run())
}

#[test]
fn test_single_receiver_gets_message() {
    let schema = ExclusiveSchema::new();
    let receiver = RecordingReceiver::new("weather");
    schema.add_receiver(receiver.clone());
    schema.publish(Message::new("weather", "18"));

    let dispatcher = spawn_dispatcher(&schema);
    assert!(wait_until(TIMEOUT, || receiver.count() == 1));

    schema.cancel_token().cancel();
    dispatcher.join().unwrap();

    assert_eq!(receiver.seen(), vec!["18"]);
}

#[test]
fn test_round_robin_between_receivers() {
    let schema = ExclusiveSchema::new();
    let first = RecordingReceiver::new("weather");
    let second = RecordingReceiver::new("weather");
    schema.add_receiver(first.clone());
    schema.add_receiver(second.clone());
    for payload in ["20", "21", "22", "23"] {
        schema.publish(Message::new("weather", payload));
    }

    let dispatcher = spawn_dispatcher(&schema);
    assert!(wait_until(TIMEOUT, || first.count() + second.count() == 4));

    schema.cancel_token().cancel();
    dispatcher.join().unwrap();

    assert_eq!(first.seen(), vec!["20", "22"]);
    assert_eq!(second.seen(), vec!["21", "23"]);
}

#[test]
fn test_channel_isolation() {
    let schema = ExclusiveSchema::new();
    let weather = RecordingReceiver::new("weather");
    schema.add_receiver(weather.clone());
    schema.publish(Message::new("weather", "18"));
    schema.publish(Message::new("city", "Moscow"));

    let dispatcher = spawn_dispatcher(&schema);
    assert!(wait_until(TIMEOUT, || weather.count() == 1));

    schema.cancel_token().cancel();
    dispatcher.join().unwrap();

    assert_eq!(weather.seen(), vec!["18"]);
    // The "city" payload has no receiver and stays buffered
    let stats = schema.stats();
    assert_eq!(stats.published, 2);
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.buffered, 1);
}

#[test]
fn test_duplicate_registration_rotates_independently() {
    let schema = ExclusiveSchema::new();
    let receiver = RecordingReceiver::new("weather");
    schema.add_receiver(receiver.clone());
    schema.add_receiver(receiver.clone());
    schema.publish(Message::new("weather", "18"));
    schema.publish(Message::new("weather", "20"));

    let dispatcher = spawn_dispatcher(&schema);
    assert!(wait_until(TIMEOUT, || receiver.count() == 2));

    schema.cancel_token().cancel();
    dispatcher.join().unwrap();

    // Both rotation slots point at the same sink, one message each
    assert_eq!(receiver.seen(), vec!["18", "20"]);
}

#[test]
fn test_backlog_delivered_when_receiver_appears() {
    let schema = ExclusiveSchema::new();
    for index in 0..3 {
        schema.publish(Message::new("metrics", format!("m{}", index)));
    }

    let dispatcher = spawn_dispatcher(&schema);

    // No receiver named "metrics" yet: the backlog must sit untouched
    thread::sleep(Duration::from_millis(50));
    assert_eq!(schema.stats().buffered, 3);
    assert_eq!(schema.stats().delivered, 0);

    let receiver = RecordingReceiver::new("metrics");
    schema.add_receiver(receiver.clone());
    assert!(wait_until(TIMEOUT, || receiver.count() == 3));

    schema.cancel_token().cancel();
    dispatcher.join().unwrap();

    assert_eq!(receiver.seen(), vec!["m0", "m1", "m2"]);
}

#[test]
fn test_registration_while_running() {
    let schema = ExclusiveSchema::new();
    let dispatcher = spawn_dispatcher(&schema);

    let receiver = RecordingReceiver::new("weather");
    schema.add_receiver(receiver.clone());
    schema.publish(Message::new("weather", "18"));
    assert!(wait_until(TIMEOUT, || receiver.count() == 1));

    schema.cancel_token().cancel();
    dispatcher.join().unwrap();

    assert_eq!(receiver.seen(), vec!["18"]);
}

//! Drive the full submit/poll state machine against the mock transport.
//!
//! Run with: `cargo run --example mock_run`

use modelflow::events::{FnEventHandler, RunEvent};
use modelflow::execution::MockTransport;
use modelflow::{ExecutionClient, PollSchedule};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let transport = Arc::new(
        MockTransport::new()
            .submit_ok("poll/demo-123")
            .poll_pending()
            .poll_pending()
            .poll_done("SUCCESS", json!("le ciel est bleu")),
    );

    let client = ExecutionClient::builder("https://platform.example.com", "demo-key")
        .transport(transport)
        .events(Arc::new(FnEventHandler(|event: RunEvent| match event {
            RunEvent::Submitted { handle } => println!("submitted, handle = {handle}"),
            RunEvent::Polled { attempt, completed, .. } => {
                println!("poll #{attempt}: completed = {completed}")
            }
            RunEvent::Waiting { delay } => println!("  backing off {delay:?}"),
            RunEvent::Finished { status } => println!("finished: {status:?}"),
            _ => {}
        })))
        .build();

    let schedule = PollSchedule::asset();
    let outcome = client
        .run("execute/6239efa4822d7a13b8e20454", &json!({"data": "the sky is blue"}), &schedule)
        .await;

    println!(
        "status = {:?}, data = {:?}, elapsed = {:?}",
        outcome.status, outcome.data, outcome.elapsed
    );
}

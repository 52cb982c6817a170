use mathboardd::{serve, RelayConfig};
use serde_json::Value;
use tokio::io::AsyncReadExt;

fn config(step_delay_ms: u64) -> RelayConfig {
    RelayConfig {
        step_delay_ms,
        ..RelayConfig::default()
    }
}

async fn run(config: RelayConfig, input: &str) -> Vec<Value> {
    let (mut client, server) = tokio::io::duplex(1 << 20);
    serve(config, input.as_bytes(), server).await.unwrap();

    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();
    out.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn events<'a>(out: &'a [Value], event: &str, request_id: &str) -> Vec<&'a Value> {
    out.iter()
        .filter(|v| v["event"] == event && v["requestId"] == request_id)
        .collect()
}

#[tokio::test]
async fn request_emits_every_step_then_completes() {
    let input = r#"{"event":"request_math","session":"s","requestId":"r1","steps":[{"natural":"One.","math":"x = 1"},{"natural":"Two.","math":"<math><mn>2</mn></math>"}]}"#;
    let out = run(config(10), input).await;

    let steps = events(&out, "display_step", "r1");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["math"], r"\[\begin{align*} x = 1 \end{align*}\]");
    assert_eq!(steps[0]["mathml"], Value::Null);
    assert_eq!(steps[1]["math"], Value::Null);
    assert_eq!(steps[1]["stepNumber"], 2);
    assert_eq!(steps[1]["totalSteps"], 2);

    let done = events(&out, "request_complete", "r1");
    assert_eq!(done.len(), 1);
    assert_eq!(done[0]["emitted"], 2);
    assert_eq!(out.last().unwrap()["event"], "request_complete");
}

#[tokio::test]
async fn new_request_supersedes_running_one() {
    let input = [
        r#"{"event":"request_math","session":"s","requestId":"old","steps":[{"natural":"a","math":"a"},{"natural":"b","math":"b"},{"natural":"c","math":"c"}]}"#,
        r#"{"event":"request_math","session":"s","requestId":"new","steps":[{"natural":"d","math":"d"},{"natural":"e","math":"e"}]}"#,
    ]
    .join("\n");
    let out = run(config(50), &input).await;

    let superseded = events(&out, "request_superseded", "old");
    assert_eq!(superseded.len(), 1);
    let emitted = superseded[0]["emitted"].as_u64().unwrap();
    assert!(emitted < 3);
    assert_eq!(events(&out, "display_step", "old").len() as u64, emitted);
    assert!(events(&out, "request_complete", "old").is_empty());

    assert_eq!(events(&out, "display_step", "new").len(), 2);
    assert_eq!(events(&out, "request_complete", "new")[0]["emitted"], 2);
}

#[tokio::test]
async fn sessions_are_independent() {
    let input = [
        r#"{"event":"request_math","session":"s1","requestId":"a","steps":[{"natural":"a","math":"a"},{"natural":"b","math":"b"}]}"#,
        r#"{"event":"request_math","session":"s2","requestId":"b","steps":[{"natural":"c","math":"c"}]}"#,
    ]
    .join("\n");
    let out = run(config(20), &input).await;

    assert_eq!(events(&out, "request_complete", "a")[0]["emitted"], 2);
    assert_eq!(events(&out, "request_complete", "b")[0]["emitted"], 1);
    assert!(out.iter().all(|v| v["event"] != "request_superseded"));
}

#[tokio::test]
async fn disconnect_stops_without_further_output() {
    let input = [
        r#"{"event":"request_math","session":"s","requestId":"r","steps":[{"natural":"a","math":"a"},{"natural":"b","math":"b"},{"natural":"c","math":"c"}]}"#,
        r#"{"event":"disconnect","session":"s"}"#,
    ]
    .join("\n");
    let out = run(config(100), &input).await;

    assert!(events(&out, "display_step", "r").len() <= 1);
    assert!(events(&out, "request_complete", "r").is_empty());
    assert!(events(&out, "request_superseded", "r").is_empty());
}

#[tokio::test]
async fn invalid_lines_produce_errors() {
    let out = run(config(0), "not json\n\n{\"event\":\"disconnect\",\"session\":\"idle\"}\n").await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["event"], "error");
    assert!(out[0]["message"].as_str().unwrap().starts_with("invalid message"));
}

#[tokio::test]
async fn empty_request_emits_sentinel() {
    let out = run(
        config(0),
        r#"{"event":"request_math","session":"s","requestId":"r","steps":[]}"#,
    )
    .await;

    let steps = events(&out, "display_step", "r");
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["math"], r"\[\text{Error processing math request}\]");
    assert_eq!(events(&out, "request_complete", "r")[0]["emitted"], 1);
}

#[tokio::test]
async fn missing_request_id_is_generated() {
    let out = run(
        config(0),
        r#"{"event":"request_math","session":"s","steps":[{"natural":"n","math":"1"}]}"#,
    )
    .await;

    let id = out[0]["requestId"].as_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(out[1]["requestId"], id);
}

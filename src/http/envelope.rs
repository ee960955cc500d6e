// Response envelope shared by every endpoint.
//
// The four fields and their order (`this`, `by`, `the`, `with`) are a
// compatibility contract: consumers parse the raw JSON positionally, so the
// struct below must keep its declaration order.

use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Sending,
    Getting,
    Counting,
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub this: Outcome,
    pub by: Action,
    pub the: String,
    pub with: Value,
}

impl Envelope {
    pub fn succeeded(by: Action, the: &str, with: Value) -> Self {
        Self {
            this: Outcome::Succeeded,
            by,
            the: the.to_string(),
            with,
        }
    }

    pub fn failed(by: Action, the: &str, error: impl Display) -> Self {
        Self {
            this: Outcome::Failed,
            by,
            the: the.to_string(),
            with: json!({ "error": error.to_string() }),
        }
    }
}

#[cfg(test)]
mod envelope_tests {
    use super::*;

    #[test]
    fn it_should_serialize_the_fields_in_contract_order() {
        let envelope = Envelope::succeeded(Action::Getting, "messages", json!(["spam", "egg"]));
        let raw = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            raw,
            r#"{"this":"succeeded","by":"getting","the":"messages","with":["spam","egg"]}"#
        );
    }

    #[test]
    fn it_should_wrap_an_error_description_on_failure() {
        let envelope = Envelope::failed(Action::Sending, "events", "expected value at line 1");
        let raw = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            raw,
            r#"{"this":"failed","by":"sending","the":"events","with":{"error":"expected value at line 1"}}"#
        );
    }

    #[test]
    fn it_should_render_every_action_lowercase() {
        for (action, expected) in [
            (Action::Sending, "\"sending\""),
            (Action::Getting, "\"getting\""),
            (Action::Counting, "\"counting\""),
        ] {
            assert_eq!(serde_json::to_string(&action).unwrap(), expected);
        }
    }
}

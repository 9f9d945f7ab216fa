//! Delivery payload handed to the transport.

use crate::attributes::DeliveryAttributes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Template name, recipient and delivery attributes for one email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub template_name: String,
    /// Address string, or whatever value the recipient accessor yields.
    pub recipient: Value,
    pub attributes: DeliveryAttributes,
}

impl Payload {
    /// Splits the payload into `(template_name, recipient, attributes)`.
    pub fn into_parts(self) -> (String, Value, DeliveryAttributes) {
        (self.template_name, self.recipient, self.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::Payload;
    use serde_json::{json, Map};

    #[test]
    fn serializes_with_stable_field_names() {
        let mut attributes = Map::new();
        attributes.insert("show_call_to_action".to_string(), json!("false"));
        attributes.insert("user_id".to_string(), json!(42));
        let payload = Payload {
            template_name: "welcome".to_string(),
            recipient: json!("ada@example.com"),
            attributes,
        };

        let value = serde_json::to_value(&payload).expect("payload serializes");
        assert_eq!(value["template_name"], "welcome");
        assert_eq!(value["recipient"], "ada@example.com");
        assert_eq!(value["attributes"]["user_id"], 42);

        let (template_name, recipient, attributes) = payload.into_parts();
        assert_eq!(template_name, "welcome");
        assert_eq!(recipient, "ada@example.com");
        assert_eq!(
            attributes.keys().collect::<Vec<_>>(),
            ["show_call_to_action", "user_id"]
        );
    }
}

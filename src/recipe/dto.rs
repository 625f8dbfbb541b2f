use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::repo::RecipeItem;
use crate::error::{ApiResult, FieldErrors};

const MAX_NAME_LEN: usize = 255;

/// Wire shape of a tag or ingredient: `{id, name}`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
}

impl From<RecipeItem> for ItemResponse {
    fn from(r: RecipeItem) -> Self {
        Self {
            id: r.id,
            name: r.name,
        }
    }
}

/// Inbound tag or ingredient. `id` is accepted only so that it can be refused.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    /// `Some` whenever the key is present, `null` included.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub name: Option<String>,
}

fn present<'de, D>(de: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

impl ItemRequest {
    /// Returns the trimmed name.
    pub fn validate(self) -> ApiResult<String> {
        let mut errors = FieldErrors::new();

        if self.id.is_some() {
            errors.add("id", "This field is read-only.");
        }

        let name = match self.name {
            None => {
                errors.add("name", "This field is required.");
                String::new()
            }
            Some(raw) => {
                let name = raw.trim().to_string();
                if name.is_empty() {
                    errors.add("name", "This field may not be blank.");
                } else if name.chars().count() > MAX_NAME_LEN {
                    errors.add(
                        "name",
                        format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN),
                    );
                }
                name
            }
        };

        errors.finish(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> ItemRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn renders_only_id_and_name() {
        let row = RecipeItem {
            id: 7,
            user_id: uuid::Uuid::new_v4(),
            name: "Vegan".into(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(ItemResponse::from(row)).unwrap();
        assert_eq!(json, json!({ "id": 7, "name": "Vegan" }));
    }

    #[test]
    fn accepts_name_and_trims() {
        assert_eq!(parse(json!({ "name": "  Salt " })).validate().unwrap(), "Salt");
    }

    #[test]
    fn rejects_id() {
        assert!(parse(json!({ "id": 3, "name": "Salt" })).validate().is_err());
    }

    #[test]
    fn rejects_null_id() {
        let req = parse(json!({ "id": null, "name": "Salt" }));
        assert_eq!(req.id, Some(Value::Null));
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_missing_or_blank_name() {
        assert!(parse(json!({})).validate().is_err());
        assert!(parse(json!({ "name": "   " })).validate().is_err());
        assert!(parse(json!({ "name": "x".repeat(256) })).validate().is_err());
    }
}

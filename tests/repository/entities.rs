use serde::{Deserialize, Serialize};
use tracked_repo::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Entity)]
#[entity(collection = "notes")]
pub struct Note {
    #[entity(key)]
    pub id: u64,
    pub body: String,
}

impl Note {
    pub fn new(id: u64, body: &str) -> Self {
        Note {
            id,
            body: body.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Entity)]
pub struct OrderLine {
    #[entity(key)]
    pub order_id: String,
    #[entity(key)]
    pub line: u32,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(order_id: &str, line: u32, quantity: u32) -> Self {
        OrderLine {
            order_id: order_id.to_string(),
            line,
            quantity,
        }
    }
}

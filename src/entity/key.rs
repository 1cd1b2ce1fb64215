use std::fmt;

use serde::{Deserialize, Serialize};

/// The identity of an entity: one or more key parts in declaration order.
///
/// Parts are kept in canonical textual form, so `find(7)` and `find(7u64)`
/// address the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    parts: Vec<String>,
}

impl EntityKey {
    pub fn from_parts(parts: Vec<String>) -> Self {
        EntityKey { parts }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("/"))
    }
}

/// A value that can take part in an entity key.
pub trait KeyComponent {
    fn key_component(&self) -> String;
}

impl<T: KeyComponent + ?Sized> KeyComponent for &T {
    fn key_component(&self) -> String {
        (**self).key_component()
    }
}

impl KeyComponent for str {
    fn key_component(&self) -> String {
        self.to_string()
    }
}

impl KeyComponent for String {
    fn key_component(&self) -> String {
        self.clone()
    }
}

macro_rules! display_key_components {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyComponent for $ty {
                fn key_component(&self) -> String {
                    self.to_string()
                }
            }

            impl From<$ty> for EntityKey {
                fn from(value: $ty) -> Self {
                    EntityKey::from_parts(vec![value.key_component()])
                }
            }
        )*
    };
}

display_key_components!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char);

// Single part (&str)
impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        EntityKey::from_parts(vec![value.to_string()])
    }
}

// Single part (String)
impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        EntityKey::from_parts(vec![value])
    }
}

// Single part (&String)
impl From<&String> for EntityKey {
    fn from(value: &String) -> Self {
        EntityKey::from_parts(vec![value.clone()])
    }
}

impl From<&EntityKey> for EntityKey {
    fn from(value: &EntityKey) -> Self {
        value.clone()
    }
}

// Composite keys
impl<A: KeyComponent, B: KeyComponent> From<(A, B)> for EntityKey {
    fn from((a, b): (A, B)) -> Self {
        EntityKey::from_parts(vec![a.key_component(), b.key_component()])
    }
}

impl<A: KeyComponent, B: KeyComponent, C: KeyComponent> From<(A, B, C)> for EntityKey {
    fn from((a, b, c): (A, B, C)) -> Self {
        EntityKey::from_parts(vec![
            a.key_component(),
            b.key_component(),
            c.key_component(),
        ])
    }
}

use serde::{Deserialize, Deserializer, Serialize};

use bookshelf_kernel::settings::MissingFields;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Identifier assigned by the store
    pub id: i32,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i32,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i32,
}

impl NewBook {
    /// Attach the store-assigned id; other fields are echoed unchanged.
    pub fn into_book(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            year: self.year,
        }
    }
}

/// Zero-value decoding target used with [`MissingFields::Default`].
///
/// Absent keys and explicit `null` both become `""` / `0`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LenientNewBook {
    #[serde(deserialize_with = "null_as_default")]
    title: String,
    #[serde(deserialize_with = "null_as_default")]
    author: String,
    #[serde(deserialize_with = "null_as_default")]
    year: i32,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl From<LenientNewBook> for NewBook {
    fn from(book: LenientNewBook) -> Self {
        Self {
            title: book.title,
            author: book.author,
            year: book.year,
        }
    }
}

/// Decode a create-book payload.
///
/// Only the JSON shape is checked: empty strings and negative years pass.
pub fn decode(raw: &[u8], missing_fields: MissingFields) -> Result<NewBook, serde_json::Error> {
    match missing_fields {
        MissingFields::Reject => serde_json::from_slice(raw),
        MissingFields::Default => serde_json::from_slice::<LenientNewBook>(raw).map(NewBook::from),
    }
}

//! Serde helpers for PATCH-style payloads.
//!
//! A nullable field in a partial update has three states: absent (leave the
//! stored value alone), `null` (clear it) and a value. Declare such fields as
//! `Option<Option<T>>` with
//! `#[serde(default, deserialize_with = "common::serde_ext::double_option")]`:
//! absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

//! JSON projection of STRING files
//!
//! The JSON form is meant to be edited by hand, so it is read strictly: a key in `stringMap` that
//! isn't a locale string id, a repeated key, or an unknown field fails the whole document.

use indexmap::IndexMap;
use serde::{
    de::{self, MapAccess, Visitor},
    ser::{self, SerializeMap},
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{
    fmt,
    io::{Read, Write},
};
use tracing::instrument;

use crate::error::Result;
use crate::types::{LocaleStringId, Magic, StringEntry, StringFile};

impl Serialize for Magic {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = std::str::from_utf8(&self.0).map_err(|_| {
            <S::Error as ser::Error>::custom(format!("magic {:02X?} is not valid utf-8", self.0))
        })?;
        serializer.serialize_str(text)
    }
}

impl<'de> Deserialize<'de> for Magic {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes: [u8; 3] = text.as_bytes().try_into().map_err(|_| {
            <D::Error as de::Error>::custom(format!(
                "invalid magic {:?}, expected exactly 3 bytes",
                text
            ))
        })?;
        Ok(Magic(bytes))
    }
}

/// Serialization of the entry map with locale string ids as decimal keys
pub mod string_map {
    use super::*;

    /// Write the entries as a JSON object in table order
    pub fn serialize<S>(
        map: &IndexMap<LocaleStringId, StringEntry>,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (id, entry) in map {
            out.serialize_entry(&id.to_string(), entry)?;
        }
        out.end()
    }

    /// Read the entries, keeping the order of the JSON object
    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> core::result::Result<IndexMap<LocaleStringId, StringEntry>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StringMapVisitor)
    }

    struct StringMapVisitor;

    impl<'de> Visitor<'de> for StringMapVisitor {
        type Value = IndexMap<LocaleStringId, StringEntry>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of locale string ids to string entries")
        }

        fn visit_map<M>(self, mut access: M) -> core::result::Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));

            while let Some(key) = access.next_key::<String>()? {
                let id = key
                    .parse::<LocaleStringId>()
                    .map_err(<M::Error as de::Error>::custom)?;
                if map.contains_key(&id) {
                    return Err(de::Error::custom(format!(
                        "duplicate locale string id \"{}\"",
                        key
                    )));
                }

                let entry = access.next_value::<StringEntry>()?;
                map.insert(id, entry);
            }

            Ok(map)
        }
    }
}

impl StringFile {
    /// Serialize this file as pretty printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize this file as pretty printed JSON into `writer`
    #[instrument(skip_all, err)]
    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<()> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    /// Parse a file from JSON text
    pub fn from_json_str(text: &str) -> Result<StringFile> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a file from a JSON reader
    #[instrument(skip_all, err)]
    pub fn from_json_reader<R: Read>(reader: R) -> Result<StringFile> {
        Ok(serde_json::from_reader(reader)?)
    }
}

//! Plugin payloads, custom property schema and values, and script names
//! stored after the GUI section by 2.60 and later.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

const PLUGIN_BLOCK_VERSION: i32 = 1;
const PROPERTY_BLOCK_VERSION: i32 = 1;
pub const MAX_PLUGIN_DATA: usize = 5120;
const PLUGIN_NAME_MAX_LEN: usize = 50;
const PROPERTY_TEXT_MAX_LEN: usize = 500;
const SCRIPT_NAME_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

pub(crate) fn read_plugins(cursor: &mut Cursor<'_>) -> Result<Vec<PluginInfo>> {
    cursor.enter("plugins");
    expect_block_version(cursor, PLUGIN_BLOCK_VERSION)?;
    let count = cursor.read_count()?;
    cursor.expect_records(count, 5)?;
    let mut plugins = Vec::with_capacity(count);
    for _ in 0..count {
        let name = cursor.read_c_string(PLUGIN_NAME_MAX_LEN)?;
        let size = cursor.read_count()?;
        if size > MAX_PLUGIN_DATA {
            return Err(Error::corrupt(
                "plugins",
                format!("plugin {name} stores {size} bytes, limit is {MAX_PLUGIN_DATA}"),
            ));
        }
        let data = cursor.read_bytes(size)?.to_vec();
        plugins.push(PluginInfo { name, data });
    }
    Ok(plugins)
}

pub(crate) fn write_plugins(plugins: &[PluginInfo], out: &mut Writer) {
    out.i32(PLUGIN_BLOCK_VERSION).i32(plugins.len() as i32);
    for plugin in plugins {
        out.c_str(&plugin.name)
            .i32(plugin.data.len() as i32)
            .bytes(&plugin.data);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Boolean,
    Integer,
    Text,
    Unknown(i32),
}

impl PropertyType {
    fn from_raw(raw: i32) -> Self {
        match raw {
            1 => PropertyType::Boolean,
            2 => PropertyType::Integer,
            3 => PropertyType::Text,
            other => PropertyType::Unknown(other),
        }
    }

    fn raw(self) -> i32 {
        match self {
            PropertyType::Boolean => 1,
            PropertyType::Integer => 2,
            PropertyType::Text => 3,
            PropertyType::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyInfo {
    pub name: String,
    pub kind: PropertyType,
    pub description: String,
    pub default_value: String,
}

/// Property values of one entity; names missing here take the schema default.
pub type PropertyValues = BTreeMap<String, String>;

pub(crate) fn read_schema(cursor: &mut Cursor<'_>) -> Result<Vec<PropertyInfo>> {
    cursor.enter("property schema");
    expect_block_version(cursor, PROPERTY_BLOCK_VERSION)?;
    let count = cursor.read_count()?;
    cursor.expect_records(count, 7)?;
    (0..count)
        .map(|_| {
            Ok(PropertyInfo {
                name: cursor.read_c_string(PROPERTY_TEXT_MAX_LEN)?,
                kind: PropertyType::from_raw(cursor.read_i32()?),
                description: cursor.read_c_string(PROPERTY_TEXT_MAX_LEN)?,
                default_value: cursor.read_c_string(PROPERTY_TEXT_MAX_LEN)?,
            })
        })
        .collect()
}

pub(crate) fn write_schema(schema: &[PropertyInfo], out: &mut Writer) {
    out.i32(PROPERTY_BLOCK_VERSION).i32(schema.len() as i32);
    for property in schema {
        out.c_str(&property.name)
            .i32(property.kind.raw())
            .c_str(&property.description)
            .c_str(&property.default_value);
    }
}

pub(crate) fn read_values(cursor: &mut Cursor<'_>) -> Result<PropertyValues> {
    expect_block_version(cursor, PROPERTY_BLOCK_VERSION)?;
    let count = cursor.read_count()?;
    cursor.expect_records(count, 2)?;
    let mut values = PropertyValues::new();
    for _ in 0..count {
        let name = cursor.read_c_string(PROPERTY_TEXT_MAX_LEN)?;
        let value = cursor.read_c_string(PROPERTY_TEXT_MAX_LEN)?;
        values.insert(name, value);
    }
    Ok(values)
}

pub(crate) fn write_values(values: &PropertyValues, out: &mut Writer) {
    out.i32(PROPERTY_BLOCK_VERSION).i32(values.len() as i32);
    for (name, value) in values {
        out.c_str(name).c_str(value);
    }
}

pub(crate) fn read_names(cursor: &mut Cursor<'_>, count: usize) -> Result<Vec<String>> {
    cursor.expect_records(count, 1)?;
    (0..count)
        .map(|_| cursor.read_c_string(SCRIPT_NAME_MAX_LEN))
        .collect()
}

pub(crate) fn write_names(names: &[String], out: &mut Writer) {
    for name in names {
        out.c_str(name);
    }
}

fn expect_block_version(cursor: &mut Cursor<'_>, expected: i32) -> Result<()> {
    let version = cursor.read_i32()?;
    if version != expected {
        return Err(Error::UnsupportedVersion {
            format: cursor.section(),
            version: version as u32,
        });
    }
    Ok(())
}

/// Look up a property value, falling back to the schema default.
pub fn property_value<'a>(
    schema: &'a [PropertyInfo],
    values: &'a PropertyValues,
    name: &str,
) -> Option<&'a str> {
    if let Some(value) = values.get(name) {
        return Some(value);
    }
    schema
        .iter()
        .find(|property| property.name.eq_ignore_ascii_case(name))
        .map(|property| property.default_value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_plugin_data_is_rejected() {
        let mut out = Writer::new();
        out.i32(1).i32(1).c_str("agsblend.dll").i32(6000);
        let err = read_plugins(&mut Cursor::new(out.as_slice())).unwrap_err();
        assert!(matches!(err, Error::Corrupt { section: "plugins", .. }));
    }

    #[test]
    fn unknown_block_versions_are_rejected() {
        let mut out = Writer::new();
        out.i32(2).i32(0);
        let err = read_schema(&mut Cursor::new(out.as_slice())).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedVersion {
                format: "property schema",
                version: 2
            }
        ));
    }

    #[test]
    fn missing_values_fall_back_to_schema_defaults() {
        let schema = vec![PropertyInfo {
            name: "Weight".into(),
            kind: PropertyType::Integer,
            description: "How heavy".into(),
            default_value: "1".into(),
        }];
        let mut out = Writer::new();
        write_schema(&schema, &mut out);
        let mut values = PropertyValues::new();
        values.insert("Colour".into(), "red".into());
        write_values(&values, &mut out);

        let mut cursor = Cursor::new(out.as_slice());
        let decoded_schema = read_schema(&mut cursor).unwrap();
        let decoded_values = read_values(&mut cursor).unwrap();
        assert_eq!(decoded_schema, schema);
        assert_eq!(
            property_value(&decoded_schema, &decoded_values, "weight"),
            Some("1")
        );
        assert_eq!(
            property_value(&decoded_schema, &decoded_values, "Colour"),
            Some("red")
        );
        assert_eq!(property_value(&decoded_schema, &decoded_values, "Size"), None);
    }
}

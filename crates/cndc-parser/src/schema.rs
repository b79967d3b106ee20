use serde::{Deserialize, Serialize};

use crate::errors::{ParserError, UnresolvedFields};
use crate::model::RawTable;

/// A semantic field and the header spellings accepted for it, highest precedence first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub aliases: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
        }
    }

    /// A field whose only accepted header is its own name.
    pub fn exact(name: &str) -> Self {
        Self::new(name, &[name])
    }
}

/// Semantic field name → header actually present in one release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMap {
    entries: Vec<(String, String)>,
}

impl SchemaMap {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, column)| column.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, column)| (field.as_str(), column.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renames every resolved column to its semantic field name so tables from
    /// different releases share one column set.
    pub fn apply(&self, table: &mut RawTable) -> Result<(), ParserError> {
        for (field, column) in &self.entries {
            if field != column {
                table.rename_column(column, field)?;
            }
        }
        Ok(())
    }
}

/// Resolves each field to the first of its aliases found in `headers`.
///
/// Comparison is exact after trimming surrounding whitespace. A header already
/// claimed by an earlier field is not available to later ones, so every field
/// maps to its own column. Every field without a match is collected into a
/// single [`UnresolvedFields`].
pub fn resolve(headers: &[String], fields: &[FieldSpec]) -> Result<SchemaMap, UnresolvedFields> {
    let mut entries: Vec<(String, String)> = Vec::with_capacity(fields.len());
    let mut missing = Vec::new();

    for field in fields {
        let found = field.aliases.iter().find_map(|alias| {
            let alias = alias.trim();
            headers.iter().find(|header| {
                header.trim() == alias
                    && !entries.iter().any(|(_, claimed)| claimed == *header)
            })
        });

        match found {
            Some(header) => entries.push((field.name.clone(), header.clone())),
            None => missing.push(field.name.clone()),
        }
    }

    if missing.is_empty() {
        Ok(SchemaMap { entries })
    } else {
        Err(UnresolvedFields { fields: missing })
    }
}

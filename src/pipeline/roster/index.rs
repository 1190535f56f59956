use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::table::RosterTable;
use super::RosterError;

/// One canonical recipient and the client they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub canonical_name: String,
    pub client_name: String,
}

/// Header aliases used to locate the two required roster columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    pub recipient: Vec<String>,
    pub client: Vec<String>,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            recipient: ["Formando", "recipient name", "recipient", "name", "nome"]
                .map(String::from)
                .to_vec(),
            client: ["Cliente", "client", "client name"].map(String::from).to_vec(),
        }
    }
}

/// Read-only roster built once per run.
///
/// Names keep first-seen order; that order is the iteration order the
/// matcher breaks ties with. A name listed twice keeps its first client.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    entries: Vec<RosterEntry>,
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl RosterIndex {
    /// Load with the default column aliases.
    pub fn load(table: &RosterTable) -> Result<Self, RosterError> {
        Self::load_with_columns(table, &RosterColumns::default())
    }

    pub fn load_with_columns(
        table: &RosterTable,
        columns: &RosterColumns,
    ) -> Result<Self, RosterError> {
        let name_col = table.column_index(&columns.recipient);
        let client_col = table.column_index(&columns.client);

        let (name_col, client_col) = match (name_col, client_col) {
            (Some(n), Some(c)) => (n, c),
            (n, c) => {
                let mut missing = Vec::new();
                if n.is_none() {
                    missing.push(describe_column("recipient name", &columns.recipient));
                }
                if c.is_none() {
                    missing.push(describe_column("client", &columns.client));
                }
                return Err(RosterError::InvalidRoster { missing });
            }
        };

        let mut index = Self::default();
        let mut skipped_blank = 0usize;
        let mut duplicates = 0usize;

        for row in 0..table.rows.len() {
            let canonical_name = table.cell(row, name_col).trim().to_string();
            let client_name = table.cell(row, client_col).trim().to_string();

            if canonical_name.is_empty() {
                skipped_blank += 1;
                continue;
            }

            if let Some(&existing) = index.by_name.get(&canonical_name) {
                duplicates += 1;
                let first = &index.entries[existing];
                if first.client_name != client_name {
                    tracing::warn!(
                        name = %canonical_name,
                        kept_client = %first.client_name,
                        ignored_client = %client_name,
                        "Roster lists the same name under different clients; keeping the first"
                    );
                }
                continue;
            }

            index.by_name.insert(canonical_name.clone(), index.entries.len());
            index.names.push(canonical_name.clone());
            index.entries.push(RosterEntry {
                canonical_name,
                client_name,
            });
        }

        tracing::info!(
            entries = index.entries.len(),
            skipped_blank,
            duplicates,
            "Roster index loaded"
        );

        Ok(index)
    }

    /// Canonical names in first-seen order, without repeats.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Client of a canonical name. `None` when the name is not in the roster.
    pub fn client_for(&self, canonical_name: &str) -> Option<&str> {
        self.by_name
            .get(canonical_name)
            .map(|&i| self.entries[i].client_name.as_str())
    }

    pub fn entry(&self, canonical_name: &str) -> Option<&RosterEntry> {
        self.by_name.get(canonical_name).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn describe_column(role: &str, aliases: &[String]) -> String {
    format!("{role} (one of: {})", aliases.join(", "))
}

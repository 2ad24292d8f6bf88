//! Machine-readable form of the ABC+ command dictionary.

use log::debug;
use serde::{Serialize, Serializer};

/// One row of a dictionary table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub command: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_target: Option<String>,
}

/// Tables of the dictionary by section heading, in document order.
///
/// Serializes as a JSON object keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    sections: Vec<(String, Vec<DictionaryEntry>)>,
}

impl Dictionary {
    /// Reads the `## Section` headings and `| a | b | c |` rows of a Markdown
    /// document. Header rows, separator rows and rows outside a section are
    /// skipped.
    pub fn parse(markdown: &str) -> Self {
        let mut sections: Vec<(String, Vec<DictionaryEntry>)> = Vec::new();

        for line in markdown.lines().map(str::trim) {
            if let Some(heading) = line.strip_prefix("## ") {
                sections.push((heading.trim().to_string(), Vec::new()));
                continue;
            }
            if !line.starts_with('|') || line.contains("---") {
                continue;
            }

            let cells: Vec<&str> = line
                .split('|')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect();
            if cells.len() < 2 || matches!(cells[0], "ABC+" | "Command") {
                continue;
            }

            let Some((_, entries)) = sections.last_mut() else {
                debug!("Skipping table row outside a section: {}", line);
                continue;
            };
            entries.push(DictionaryEntry {
                command: cells[0].to_string(),
                meaning: cells[1].to_string(),
                xml_target: cells.get(2).map(|cell| cell.to_string()),
            });
        }

        Dictionary { sections }
    }

    pub fn section(&self, name: &str) -> Option<&[DictionaryEntry]> {
        self.sections
            .iter()
            .find(|(heading, _)| heading == name)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(heading, _)| heading.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.sections
                .iter()
                .map(|(heading, entries)| (heading, entries)),
        )
    }
}

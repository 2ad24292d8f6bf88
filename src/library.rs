use anyhow::{Context, Result};
use log::debug;

use crate::model::Composition;

/// Compositions saved during a session, most recent first.
#[derive(Debug, Default)]
pub struct Library {
    compositions: Vec<Composition>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the composition with the same id in place, or inserts it at
    /// the front.
    pub fn save(&mut self, comp: Composition) {
        match self.compositions.iter().position(|c| c.id == comp.id) {
            Some(index) => {
                debug!("Updating library entry {}", comp.id);
                self.compositions[index] = comp;
            }
            None => {
                debug!("Adding library entry {}", comp.id);
                self.compositions.insert(0, comp);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Composition> {
        self.compositions.iter().find(|c| c.id == id)
    }

    /// Stores the commentary on a saved composition.
    pub fn attach_report(&mut self, id: &str, report: String) -> Result<&Composition> {
        let comp = self
            .compositions
            .iter_mut()
            .find(|c| c.id == id)
            .with_context(|| format!("Composition {} is not in the library", id))?;
        comp.full_report = Some(report);
        Ok(&*comp)
    }

    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    pub fn len(&self) -> usize {
        self.compositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compositions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EditEvent, EditKind};
    use chrono::{TimeZone, Utc};

    fn composition(title: &str) -> Composition {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let first = EditEvent::new(EditKind::Creation, "Initial Generation", "Rev 1", None, now);
        Composition::start(title, title, "X:1", first)
    }

    #[test]
    fn test_save_inserts_newest_first() {
        let mut library = Library::new();
        library.save(composition("first"));
        library.save(composition("second"));

        let titles: Vec<_> = library.compositions().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_save_replaces_in_place() {
        let mut library = Library::new();
        let mut first = composition("first");
        library.save(first.clone());
        library.save(composition("second"));

        first.content = "X:1\nK:D".to_string();
        library.save(first.clone());

        assert_eq!(library.len(), 2);
        assert_eq!(library.compositions()[1].id, first.id);
        assert_eq!(library.compositions()[1].content, "X:1\nK:D");
    }

    #[test]
    fn test_attach_report() {
        let mut library = Library::new();
        let comp = composition("waltz");
        let id = comp.id.clone();
        library.save(comp);

        let updated = library.attach_report(&id, "# Notes".into()).unwrap();
        assert_eq!(updated.full_report.as_deref(), Some("# Notes"));
        assert_eq!(library.get(&id).unwrap().full_report.as_deref(), Some("# Notes"));
    }

    #[test]
    fn test_attach_report_unknown_id() {
        let mut library = Library::new();
        assert!(library.is_empty());
        let err = library.attach_report("missing", "x".into()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}

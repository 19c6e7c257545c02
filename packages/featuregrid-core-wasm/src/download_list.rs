use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DownloadEntry {
    pub filename: String,
}

/// Array store behind the download-list grid: plain ordered CRUD, no
/// deduplication. Row indices from the JS grid map directly onto entries.
#[derive(Default)]
pub struct DownloadList {
    entries: Vec<DownloadEntry>,
}

impl DownloadList {
    pub fn new() -> Self {
        DownloadList {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, filename: &str) {
        self.entries.push(DownloadEntry {
            filename: filename.to_string(),
        });
    }

    /// The per-row delete action.
    pub fn remove_at(&mut self, index: usize) -> Result<DownloadEntry, String> {
        if index >= self.entries.len() {
            return Err(format!(
                "Download list index {} out of range ({} entries)",
                index,
                self.entries.len()
            ));
        }
        Ok(self.entries.remove(index))
    }

    /// "Start Download" toolbar action: hand every queued filename to the
    /// host and leave the list empty.
    pub fn drain(&mut self) -> Vec<DownloadEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn entries(&self) -> &[DownloadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

use penguinsurf::host::{Host, Notice};
use penguinsurf::menu::DirectoryItem;

/// Records every host call so tests can assert on router behaviour
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub items: Vec<DirectoryItem>,
    pub directories_ended: usize,
    pub resolutions: Vec<Option<String>>,
    pub notices: Vec<Notice>,
}

impl RecordingHost {
    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.label.as_str()).collect()
    }

    /// True when nothing at all was sent to the host
    pub fn is_untouched(&self) -> bool {
        self.items.is_empty()
            && self.directories_ended == 0
            && self.resolutions.is_empty()
            && self.notices.is_empty()
    }
}

impl Host for RecordingHost {
    fn add_directory_item(&mut self, item: DirectoryItem) {
        self.items.push(item);
    }

    fn end_of_directory(&mut self) {
        self.directories_ended += 1;
    }

    fn set_resolved_url(&mut self, url: Option<String>) {
        self.resolutions.push(url);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

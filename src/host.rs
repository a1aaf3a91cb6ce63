//! The host application's plugin API as seen from the router.

use crate::menu::DirectoryItem;

/// How long the host shows a notification, in milliseconds
pub const NOTICE_DISPLAY_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub heading: String,
    pub message: String,
    pub level: NoticeLevel,
    pub display_ms: u32,
}

impl Notice {
    fn new(heading: &str, message: String, level: NoticeLevel) -> Self {
        Self {
            heading: heading.to_string(),
            message,
            level,
            display_ms: NOTICE_DISPLAY_MS,
        }
    }

    pub fn info(heading: &str, message: impl Into<String>) -> Self {
        Self::new(heading, message.into(), NoticeLevel::Info)
    }

    pub fn error(heading: &str, message: impl Into<String>) -> Self {
        Self::new(heading, message.into(), NoticeLevel::Error)
    }
}

/// Calls the router makes into the host. A listing is any number of
/// `add_directory_item` calls closed by one `end_of_directory`; a resolve
/// request is answered by exactly one `set_resolved_url`.
pub trait Host {
    fn add_directory_item(&mut self, item: DirectoryItem);

    fn end_of_directory(&mut self);

    /// `None` is the negative resolution signal
    fn set_resolved_url(&mut self, url: Option<String>);

    fn notify(&mut self, notice: Notice);
}

/// Prints listings and resolutions to the terminal
pub struct ConsoleHost {
    handle: i32,
    entries: usize,
}

impl ConsoleHost {
    pub fn new(handle: i32) -> Self {
        Self { handle, entries: 0 }
    }
}

impl Host for ConsoleHost {
    fn add_directory_item(&mut self, item: DirectoryItem) {
        self.entries += 1;
        let kind = if item.is_folder { "dir " } else { "item" };
        match item.info.as_ref().and_then(|i| i.year) {
            Some(year) => println!("  [{}] {} ({})  {}", kind, item.label, year, item.url),
            None => println!("  [{}] {}  {}", kind, item.label, item.url),
        }

        if let Some(plot) = item.info.as_ref().and_then(|i| i.plot.as_deref()) {
            println!("         {}", plot);
        }
    }

    fn end_of_directory(&mut self) {
        println!("\n  {} entries (handle {})", self.entries, self.handle);
        self.entries = 0;
    }

    fn set_resolved_url(&mut self, url: Option<String>) {
        match url {
            Some(url) => println!("resolved: {}", url),
            None => eprintln!("resolution failed (handle {})", self.handle),
        }
    }

    fn notify(&mut self, notice: Notice) {
        let color = match notice.level {
            NoticeLevel::Info => "\x1b[34m",  // blue
            NoticeLevel::Error => "\x1b[31m", // red
        };
        eprintln!("{}{}\x1b[0m: {}", color, notice.heading, notice.message);
    }
}

use crate::services::{Notice, NoticeLevel, Notifier};

/// Prints notices to the terminal; errors go to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let line = format!("[{}] {}: {}", notice.level.as_str(), notice.title, notice.description);
        match notice.level {
            NoticeLevel::Error => eprintln!("{line}"),
            NoticeLevel::Success | NoticeLevel::Warning => println!("{line}"),
        }
    }
}

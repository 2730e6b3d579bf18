/// Tag prefixed to every line this component writes to the build log.
pub const LOG_TAG: &str = "[conlog]";

/// Port for writing lines to the build's console log.
///
/// All lifecycle and diagnostic messages go through [`log`](BuildListener::log),
/// which prefixes the component tag so they can be grepped out of a busy
/// build log.
pub trait BuildListener {
    /// Write one line verbatim.
    fn log_line(&self, line: &str);

    /// Write one line prefixed with the component tag.
    fn log(&self, message: &str) {
        self.log_line(&format!("{LOG_TAG} {message}"));
    }
}

/// Listener that prints to stdout.
pub struct ConsoleListener;

impl BuildListener for ConsoleListener {
    fn log_line(&self, line: &str) {
        println!("{line}");
    }
}

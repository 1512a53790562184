use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct InitOutcome {
    pub path: PathBuf,
    /// False when an existing file was left alone
    pub written: bool,
}

pub struct InitView<'a> {
    data: &'a InitOutcome,
}

impl<'a> InitView<'a> {
    pub fn new(data: &'a InitOutcome) -> Self {
        Self { data }
    }
}

impl fmt::Display for InitView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.written {
            writeln!(f, "Wrote default settings to {}", self.data.path.display())?;
            writeln!(f, "\nEdit base_url to point at your chat backend, then run:")?;
            writeln!(f, "  tryll chat")
        } else {
            writeln!(f, "Settings already exist at {}", self.data.path.display())?;
            writeln!(f, "  Use --force to overwrite them with the defaults.")
        }
    }
}

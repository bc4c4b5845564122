use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::utils::ExportSinkOptions;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
    /// Export root. Exporting is off when unset.
    #[serde(default)]
    pub dir: Option<String>,

    /// Single file every step of a run appends to.
    #[serde(default)]
    pub merge: Option<String>,
}

impl ExportConfig {
    pub fn sink_options(&self) -> Option<ExportSinkOptions> {
        self.dir
            .as_ref()
            .filter(|dir| !dir.is_empty())
            .map(|dir| ExportSinkOptions {
                dir: PathBuf::from(dir),
                merge: self.merge.clone().filter(|m| !m.is_empty()),
            })
    }
}

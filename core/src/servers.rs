//! Servers configuration document.
//!
//! Models the YAML file the wrapped application reads: a set of named
//! server connections plus the name of the default one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the single server entry written during synthesis.
pub const MAIN_SERVER: &str = "main";

/// One server connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerEntry {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Login name
    pub username: String,
    /// Login password
    pub password: String,
    /// URL scheme, written only when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

/// The servers configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServersFile {
    /// Server entries by name, in file order
    pub servers: IndexMap<String, ServerEntry>,
    /// Name of the entry used when none is selected
    pub default_server: String,
}

impl ServersFile {
    /// Build a document holding a single `main` entry that is also the default.
    #[must_use]
    pub fn with_main(entry: ServerEntry) -> Self {
        let mut servers = IndexMap::new();
        servers.insert(MAIN_SERVER.to_string(), entry);

        Self {
            servers,
            default_server: MAIN_SERVER.to_string(),
        }
    }

    /// Render the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parse a document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a servers document.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Look up the entry named by `default_server`.
    #[must_use]
    pub fn default_entry(&self) -> Option<&ServerEntry> {
        self.servers.get(&self.default_server)
    }
}

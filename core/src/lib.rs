//! bootcfg core library
//!
//! Prepares the servers configuration file for a containerized application:
//! resolves where it lives, links a custom location to the default one, or
//! synthesizes a single-server file from the environment. Also provides the
//! launcher that hands control to the wrapped command afterwards.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod fs;
pub mod launch;
pub mod servers;

pub use bootstrap::{Outcome, bootstrap};

pub use config::{ApiSettings, BootstrapEnv, DEFAULT_CONFIG_PATH};

pub use error::{BootstrapError, LaunchError};

pub use fs::{Filesystem, HostFs, PathKind};

pub use launch::launch;

pub use servers::{MAIN_SERVER, ServerEntry, ServersFile};

//! Per-platform command templates.
//!
//! The engine never builds command strings itself. It drives a
//! [`HostRunner`](crate::host::HostRunner), and `CommandHost` renders each
//! operation from the templates held here. The defaults target Debian-style
//! hosts (`apt-get`, SysV `service`, coreutils).
//!
//! A YAML file can override any subset of the templates:
//!
//! ```yaml
//! installer:
//!   install: /usr/bin/dnf install -y
//!   remove: /usr/bin/dnf remove -y
//! service_manager:
//!   program: /usr/bin/systemctl
//!   verb_first: true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, RudiError};

/// Package manager templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerCommands {
    /// Prefix for installing one package. Must tolerate already-installed packages.
    pub install: String,
    /// Prefix for removing packages, with dependency auto-removal and purge.
    pub remove: String,
}

impl Default for InstallerCommands {
    fn default() -> Self {
        Self {
            install: "/usr/bin/apt-get install -y".to_string(),
            remove: "/usr/bin/apt-get remove --auto-remove --purge -y".to_string(),
        }
    }
}

/// Service manager template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCommands {
    pub program: String,
    /// `false`: `<program> <name> <verb>` (SysV `service`).
    /// `true`: `<program> <verb> <name>` (`systemctl`).
    pub verb_first: bool,
    pub start: String,
    pub stop: String,
}

impl Default for ServiceCommands {
    fn default() -> Self {
        Self {
            program: "/usr/sbin/service".to_string(),
            verb_first: false,
            start: "start".to_string(),
            stop: "stop".to_string(),
        }
    }
}

/// Filesystem tool templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemCommands {
    /// Recursive mkdir taking the mode as its next argument.
    pub mkdir: String,
    pub chown: String,
    pub chgrp: String,
    pub chmod: String,
}

impl Default for FilesystemCommands {
    fn default() -> Self {
        Self {
            mkdir: "/bin/mkdir -p -m".to_string(),
            chown: "/bin/chown".to_string(),
            chgrp: "/bin/chgrp".to_string(),
            chmod: "/bin/chmod".to_string(),
        }
    }
}

/// The full set of host command templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSet {
    pub installer: InstallerCommands,
    pub service_manager: ServiceCommands,
    pub filesystem: FilesystemCommands,
}

impl CommandSet {
    /// Load overrides from a YAML file. Missing fields keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RudiError::manifest(path, format!("cannot read command set: {e}")))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml_ng::from_str(&content)
            .map_err(|e| RudiError::manifest(path, format!("invalid command set: {e}")))
    }

    /// The templates in the same YAML shape `load_from_file` reads.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }

    pub fn install(&self, package: &str) -> String {
        format!("{} {}", self.installer.install, package)
    }

    pub fn remove(&self, packages: &[String]) -> String {
        format!("{} {}", self.installer.remove, packages.join(" "))
    }

    pub fn service_start(&self, service: &str) -> String {
        self.service_line(service, &self.service_manager.start)
    }

    pub fn service_stop(&self, service: &str) -> String {
        self.service_line(service, &self.service_manager.stop)
    }

    fn service_line(&self, service: &str, verb: &str) -> String {
        let sm = &self.service_manager;
        if sm.verb_first {
            format!("{} {} {}", sm.program, verb, service)
        } else {
            format!("{} {} {}", sm.program, service, verb)
        }
    }

    pub fn make_dir(&self, dir: &str, mode: &str) -> String {
        format!("{} {} {}", self.filesystem.mkdir, mode, dir)
    }

    pub fn chown(&self, path: &str, owner: &str) -> String {
        format!("{} {} {}", self.filesystem.chown, owner, path)
    }

    pub fn chgrp(&self, path: &str, group: &str) -> String {
        format!("{} {} {}", self.filesystem.chgrp, group, path)
    }

    pub fn chmod(&self, path: &str, mode: &str) -> String {
        format!("{} {} {}", self.filesystem.chmod, mode, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_command_lines() {
        let cmds = CommandSet::default();

        assert_eq!(cmds.install("nginx"), "/usr/bin/apt-get install -y nginx");
        assert_eq!(
            cmds.remove(&["p1".into(), "p2".into(), "p3".into()]),
            "/usr/bin/apt-get remove --auto-remove --purge -y p1 p2 p3"
        );
        assert_eq!(cmds.service_stop("nginx"), "/usr/sbin/service nginx stop");
        assert_eq!(cmds.service_start("nginx"), "/usr/sbin/service nginx start");
        assert_eq!(cmds.make_dir("/x/y/", "755"), "/bin/mkdir -p -m 755 /x/y/");
        assert_eq!(cmds.chown("/x/y/z", "www"), "/bin/chown www /x/y/z");
        assert_eq!(cmds.chgrp("/x/y/z", "adm"), "/bin/chgrp adm /x/y/z");
        assert_eq!(cmds.chmod("/x/y/z", "640"), "/bin/chmod 640 /x/y/z");
    }

    #[test]
    fn test_verb_first_service_manager() {
        let mut cmds = CommandSet::default();
        cmds.service_manager.program = "/usr/bin/systemctl".into();
        cmds.service_manager.verb_first = true;

        assert_eq!(cmds.service_stop("sshd"), "/usr/bin/systemctl stop sshd");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let mut tmp = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(tmp, "installer:\n  install: /usr/bin/dnf install -y\n").unwrap();

        let cmds = CommandSet::load_from_file(tmp.path()).unwrap();
        assert_eq!(cmds.installer.install, "/usr/bin/dnf install -y");
        assert_eq!(cmds.installer.remove, InstallerCommands::default().remove);
        assert_eq!(cmds.filesystem, FilesystemCommands::default());
    }

    #[test]
    fn test_to_yaml_reloads_as_same_set() {
        let mut cmds = CommandSet::default();
        cmds.service_manager.program = "/usr/bin/systemctl".into();
        cmds.service_manager.verb_first = true;

        let yaml = cmds.to_yaml().unwrap();
        assert!(yaml.contains("verb_first: true"));

        let mut tmp = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        tmp.write_all(yaml.as_bytes()).unwrap();
        assert_eq!(CommandSet::load_from_file(tmp.path()).unwrap(), cmds);
    }

    #[test]
    fn test_load_missing_command_set() {
        let err = CommandSet::load_from_file("/nonexistent/commands.yaml").unwrap_err();
        assert!(matches!(err, RudiError::Manifest { .. }));
    }
}

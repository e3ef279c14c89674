//! Package installation and the files each package requires.

use tracing::{info, warn};

use crate::engine::converge::{ConvergeReport, MissingFile};
use crate::engine::deploy::deploy_file;
use crate::error::Result;
use crate::host::HostRunner;
use crate::manifest::Manifest;

/// Install (or reinstall) `package`, then deploy its declared files in order.
///
/// A file key with no entry under `Files` is reported once and skipped.
/// Any other failure ends the run.
pub fn install_package<H: HostRunner + ?Sized>(
    host: &H,
    manifest: &Manifest,
    package: &str,
    report: &mut ConvergeReport,
) -> Result<()> {
    info!("Reinstalling {} ...", package);
    host.install(package)?;
    info!("Package {} installed successfully.", package);
    report.packages_installed.push(package.to_string());

    for key in manifest.package_files(package) {
        match manifest.file(key) {
            Some(file) => {
                deploy_file(host, file)?;
                report.files_deployed.push(file.target_path());
            }
            None => {
                warn!(
                    "File '{}' required by package '{}' was not found amongst Files.",
                    key, package
                );
                report.missing_files.push(MissingFile {
                    package: package.to_string(),
                    file: key.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Call, MockHost};

    const MANIFEST: &str = r#"
Packages:
  php:
    files: [index.php, ghost.php, info.php]
  bare: {}
  empty:
    files: []
Files:
  index.php:
    base: /var/www/
    name: index.php
    content: "<?php ?>"
    owner: www-data
    group: www-data
    mode: "644"
  info.php:
    base: /var/www/
    name: info.php
    content: "<?php phpinfo(); ?>"
    owner: www-data
    group: www-data
    mode: "600"
"#;

    fn manifest() -> Manifest {
        Manifest::from_yaml_str(MANIFEST).unwrap()
    }

    #[test]
    fn test_install_then_files_in_declared_order() {
        let host = MockHost::new();
        let mut report = ConvergeReport::default();
        install_package(&host, &manifest(), "php", &mut report).unwrap();

        let calls = host.calls();
        assert_eq!(calls[0], Call::Install("php".into()));
        let written: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Write(path, _) => Some(path.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        assert_eq!(written, ["/var/www/index.php", "/var/www/info.php"]);
        assert_eq!(report.files_deployed.len(), 2);
    }

    #[test]
    fn test_missing_file_warns_once_and_continues() {
        let host = MockHost::new();
        let mut report = ConvergeReport::default();
        install_package(&host, &manifest(), "php", &mut report).unwrap();

        assert_eq!(
            report.missing_files,
            [MissingFile {
                package: "php".into(),
                file: "ghost.php".into(),
            }]
        );
    }

    #[test]
    fn test_packages_without_files() {
        for name in ["bare", "empty", "undeclared"] {
            let host = MockHost::new();
            let mut report = ConvergeReport::default();
            install_package(&host, &manifest(), name, &mut report).unwrap();

            assert_eq!(host.calls(), [Call::Install(name.into())]);
            assert!(report.missing_files.is_empty());
        }
    }

    #[test]
    fn test_install_failure_deploys_nothing() {
        let host = MockHost::new().fail_on(|c| matches!(c, Call::Install(_)));
        let mut report = ConvergeReport::default();

        assert!(install_package(&host, &manifest(), "php", &mut report).is_err());
        assert_eq!(host.calls().len(), 1);
        assert!(report.packages_installed.is_empty());
    }
}

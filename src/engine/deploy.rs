//! File deployment.

use tracing::info;

use crate::error::Result;
use crate::host::HostRunner;
use crate::manifest::FileSpec;

/// Deploy one file: parent directory, content, then owner, group and mode.
///
/// The descriptor's `mode` is used for the directory and the file alike.
/// The first failing step ends the deployment; a failed write never reaches
/// the ownership calls.
pub fn deploy_file<H: HostRunner + ?Sized>(host: &H, file: &FileSpec) -> Result<()> {
    let path = file.target_path();
    info!("Deploying {}...", path.display());

    host.make_dir(&file.base, &file.mode)?;
    host.write_file(&path, &file.content)?;

    host.chown(&path, &file.owner)?;
    host.chgrp(&path, &file.group)?;
    host.chmod(&path, &file.mode)?;

    info!("File {} deployed successfully.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Call, MockHost};
    use std::path::PathBuf;

    fn spec(base: &str, name: &str) -> FileSpec {
        FileSpec {
            base: base.into(),
            name: name.into(),
            content: "hello world".into(),
            owner: "www-data".into(),
            group: "adm".into(),
            mode: "640".into(),
        }
    }

    #[test]
    fn test_deploy_call_order() {
        let host = MockHost::new();
        deploy_file(&host, &spec("/x/y/", "z.txt")).unwrap();

        let path = PathBuf::from("/x/y/z.txt");
        assert_eq!(
            host.calls(),
            [
                Call::MakeDir("/x/y/".into(), "640".into()),
                Call::Write(path.clone(), "hello world".into()),
                Call::Chown(path.clone(), "www-data".into()),
                Call::Chgrp(path.clone(), "adm".into()),
                Call::Chmod(path, "640".into()),
            ]
        );
    }

    #[test]
    fn test_mkdir_failure_stops_deploy() {
        let host = MockHost::new().fail_on(|c| matches!(c, Call::MakeDir(..)));
        assert!(deploy_file(&host, &spec("/x/", "a")).is_err());
        assert_eq!(host.calls().len(), 1);
    }

    #[test]
    fn test_write_failure_skips_ownership() {
        let host = MockHost::new().fail_write();
        let err = deploy_file(&host, &spec("/x/", "a")).unwrap_err();

        assert_eq!(err.exit_code(), crate::error::EXIT_WRITE);
        assert!(
            !host
                .calls()
                .iter()
                .any(|c| matches!(c, Call::Chown(..) | Call::Chgrp(..) | Call::Chmod(..)))
        );
    }

    #[test]
    fn test_chgrp_failure_skips_chmod() {
        let host = MockHost::new().fail_on(|c| matches!(c, Call::Chgrp(..)));
        assert!(deploy_file(&host, &spec("/x/", "a")).is_err());

        let calls = host.calls();
        assert!(matches!(calls.last(), Some(Call::Chgrp(..))));
        assert!(!calls.iter().any(|c| matches!(c, Call::Chmod(..))));
    }
}

#[cfg(feature = "integration_tests")]
mod tests {
    use std::env;
    use std::io::Write;
    use std::sync::Arc;

    use ssh_fanout_lib::error::Stage;
    use ssh_fanout_lib::output::HostOutput;
    use ssh_fanout_lib::ssh::credentials::{CredentialOptions, CredentialSet};
    use ssh_fanout_lib::ssh::host_key::PinnedFingerprints;
    use ssh_fanout_lib::{ConnectParams, HostSpec, KeySession, SshSession};
    use tempfile::NamedTempFile;

    fn connect_params() -> (HostSpec, ConnectParams) {
        let user = env::var("SSH_TEST_USER").expect("SSH_TEST_USER not set");
        let key_path = env::var("SSH_TEST_KEY_PATH").expect("SSH_TEST_KEY_PATH not set");
        let addr = env::var("SSH_TEST_ADDR").expect("SSH_TEST_ADDR not set");

        let options = CredentialOptions {
            identity_file: key_path.into(),
            ..Default::default()
        };
        let credentials =
            CredentialSet::build(&options, |_| panic!("key must not need a passphrase"))
                .expect("Failed to load secret key");
        let target = HostSpec::parse(&addr, Some(&user)).expect("SSH_TEST_ADDR is not host:port");
        (target, ConnectParams::new(credentials))
    }

    #[tokio::test]
    async fn test_key_session_integration() {
        let (target, params) = connect_params();
        let mut session = KeySession::connect(&target, &params)
            .await
            .expect("Failed to connect");

        // run a command, streams stay separate
        let mut output = HostOutput::default();
        let exit_code = session
            .call("echo 'Hello, World!'; echo oops >&2", &mut output)
            .await
            .expect("Failed to execute command");
        assert_eq!(exit_code, 0);
        assert_eq!(output.stdout, b"Hello, World!\n");
        assert_eq!(output.stderr, b"oops\n");

        session.close().await.expect("Failed to close session");
    }

    #[tokio::test]
    async fn test_key_session_upload_integration() {
        let (target, params) = connect_params();
        let mut source = NamedTempFile::new().expect("Failed to create temporary file");
        source.write_all(&[7u8; 500]).unwrap();

        let mut session = KeySession::connect(&target, &params)
            .await
            .expect("Failed to connect");
        let mut output = HostOutput::default();
        let written = session
            .upload(source.path(), "/tmp/ssh-fanout-upload-test", &mut output)
            .await
            .expect("Failed to upload");
        assert_eq!(written, 500);

        let mut output = HostOutput::default();
        session
            .call("wc -c < /tmp/ssh-fanout-upload-test", &mut output)
            .await
            .expect("Failed to execute command");
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "500");

        session.close().await.expect("Failed to close session");
    }

    #[tokio::test]
    async fn test_key_session_rejects_unpinned_host_key() {
        let (target, params) = connect_params();
        let policy = PinnedFingerprints::new().pin(&target, "SHA256:not-the-server-key");
        let params = params.with_host_key_policy(Arc::new(policy));

        let err = match KeySession::connect(&target, &params).await {
            Ok(_) => panic!("connected despite a mismatched host key"),
            Err(err) => err,
        };
        assert_eq!(err.stage, Stage::Dial);
    }
}

//! Integration tests for background linking and the readiness signal.

mod common;

use c25519_runtime::{Bridge, ExportNames, LinkState, ModuleSource, PAYLOAD_ENGINE};
use base64::Engine as _;
use common::{mock_module, runtime};
use std::sync::Arc;

#[tokio::test]
async fn spawn_link_becomes_ready() {
    let names = ExportNames::default();
    let source = ModuleSource::bytes("mock", mock_module(&names));
    let linking = Bridge::spawn_link(Arc::new(runtime()), source, names);

    let x25519_ready = linking.readiness();
    let ed25519_ready = linking.readiness();
    assert_ne!(x25519_ready.state(), LinkState::Uninitialized);

    x25519_ready.ready().await.expect("ready");
    ed25519_ready.ready().await.expect("ready");
    assert!(ed25519_ready.is_ready());

    let mut bridge = linking.finish().await.expect("bridge");
    assert_eq!(bridge.x25519().get_public(&[0u8; 32]).expect("derive"), [0x55; 32]);

    // Resolved once, stays resolved.
    x25519_ready.ready().await.expect("still ready");
    assert_eq!(x25519_ready.state(), LinkState::Ready);
}

#[tokio::test]
async fn base64_payload_links() {
    let names = ExportNames::default();
    let text = PAYLOAD_ENGINE.encode(mock_module(&names));
    let linking = Bridge::spawn_link(
        Arc::new(runtime()),
        ModuleSource::base64("embedded", text),
        names,
    );
    linking.readiness().ready().await.expect("ready");
    linking.finish().await.expect("bridge");
}

#[tokio::test]
async fn failed_link_signals_failure() {
    let linking = Bridge::spawn_link(
        Arc::new(runtime()),
        ModuleSource::bytes("garbage", b"not wasm".to_vec()),
        ExportNames::default(),
    );
    let readiness = linking.readiness();

    let err = readiness.ready().await.expect_err("must fail");
    assert_eq!(err.code(), "E105");
    assert_eq!(readiness.state(), LinkState::Failed);

    let err = linking.finish().await.expect_err("must fail");
    assert_eq!(err.code(), "E101");
}

#[test]
#[should_panic]
fn spawn_link_needs_a_tokio_runtime() {
    let names = ExportNames::default();
    let source = ModuleSource::bytes("mock", mock_module(&names));
    let _ = Bridge::spawn_link(Arc::new(runtime()), source, names);
}

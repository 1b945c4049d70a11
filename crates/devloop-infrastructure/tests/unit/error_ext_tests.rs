//! Error context helper tests

use std::error::Error as _;
use std::io;

use devloop_domain::error::Error;
use devloop_infrastructure::error_ext::ErrorContext;

fn not_found() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
}

#[test]
fn test_io_context_keeps_source() {
    let err = not_found().io_context("Failed to read customer_service.rs").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("Failed to read customer_service.rs: gone"));
    assert!(err.source().is_some());
}

#[test]
fn test_config_and_network_context_pick_category() {
    assert!(matches!(
        not_found().config_context("config").unwrap_err(),
        Error::Configuration { .. }
    ));
    assert!(matches!(
        not_found().network_context("network").unwrap_err(),
        Error::Network { .. }
    ));
}

#[test]
fn test_with_context_is_lazy() {
    let ok: Result<u8, io::Error> = Ok(1);
    let value = ok
        .with_context(|| -> String { panic!("context must not be built on success") })
        .unwrap();
    assert_eq!(value, 1);

    let err = not_found()
        .with_context(|| format!("step {}", 3))
        .unwrap_err();
    assert!(matches!(err, Error::Infrastructure { .. }));
    assert!(err.to_string().contains("step 3"));
}

//! Unit tests for the wrapped component lifecycle.

use std::sync::Mutex;

use mockall::mock;
use rstest::{fixture, rstest};

use super::*;

mock! {
    Delegate {}
    impl LifecycleDelegate for Delegate {
        fn register(&mut self) -> Result<(), ManagementError>;
        fn start(&mut self) -> Result<(), ManagementError>;
        fn stop(&mut self) -> Result<(), ManagementError>;
        fn unregister(&mut self) -> Result<(), ManagementError>;
    }
}

struct StubFactory {
    delegate: Mutex<Option<Box<dyn LifecycleDelegate>>>,
}

impl StubFactory {
    fn configured(delegate: MockDelegate) -> Self {
        Self {
            delegate: Mutex::new(Some(Box::new(delegate))),
        }
    }

    fn unconfigured() -> Self {
        Self {
            delegate: Mutex::new(None),
        }
    }
}

impl DelegateFactory for StubFactory {
    fn component_name(&self) -> &str {
        "stub"
    }

    fn create_delegate(
        &self,
        _properties: &BootstrapProperties,
    ) -> Result<Option<Box<dyn LifecycleDelegate>>, ManagementError> {
        Ok(self.delegate.lock().expect("factory lock").take())
    }
}

#[fixture]
fn properties() -> BootstrapProperties {
    BootstrapProperties::new()
}

fn expect_full_cycle(delegate: &mut MockDelegate, cycles: usize) {
    delegate.expect_register().times(1).returning(|| Ok(()));
    delegate.expect_start().times(cycles).returning(|| Ok(()));
    delegate.expect_stop().times(cycles).returning(|| Ok(()));
    delegate.expect_unregister().times(1).returning(|| Ok(()));
}

// ---------------------------------------------------------------------------
// Delegate slot
// ---------------------------------------------------------------------------

#[rstest]
fn unconfigured_factory_keeps_default_delegate(properties: BootstrapProperties) {
    let mut component = WrappedComponent::new(StubFactory::unconfigured());

    component.init(&properties).expect("init");
    component.start().expect("start");
    component.stop().expect("stop");
    component.destroy().expect("destroy");

    assert!(!component.delegate().is_configured());
}

#[rstest]
#[case::single(1)]
#[case::restarted(3)]
fn configured_delegate_sees_register_once_per_init(
    properties: BootstrapProperties,
    #[case] cycles: usize,
) {
    let mut delegate = MockDelegate::new();
    expect_full_cycle(&mut delegate, cycles);
    let mut component = WrappedComponent::new(StubFactory::configured(delegate));

    component.init(&properties).expect("init");
    assert!(component.delegate().is_configured());
    for _ in 0..cycles {
        component.start().expect("start");
        component.stop().expect("stop");
    }
    component.destroy().expect("destroy");
}

// ---------------------------------------------------------------------------
// State checks
// ---------------------------------------------------------------------------

#[rstest]
#[case::start("start")]
#[case::stop("stop")]
#[case::destroy("destroy")]
fn operations_before_init_are_rejected(#[case] operation: &str) {
    let mut component = WrappedComponent::new(StubFactory::unconfigured());
    let result = match operation {
        "start" => component.start(),
        "stop" => component.stop(),
        _ => component.destroy(),
    };
    assert!(matches!(
        result,
        Err(ManagementError::InvalidState {
            state: "uninitialised",
            ..
        })
    ));
}

#[rstest]
fn operations_after_destroy_are_rejected(properties: BootstrapProperties) {
    let mut component = WrappedComponent::new(StubFactory::unconfigured());
    component.init(&properties).expect("init");
    component.destroy().expect("destroy");

    assert!(matches!(
        component.start(),
        Err(ManagementError::InvalidState {
            state: "destroyed",
            ..
        })
    ));
    assert!(component.destroy().is_err());
    assert!(component.init(&properties).is_err());
}

#[rstest]
fn second_init_is_rejected(properties: BootstrapProperties) {
    let mut component = WrappedComponent::new(StubFactory::unconfigured());
    component.init(&properties).expect("first init");
    assert!(matches!(
        component.init(&properties),
        Err(ManagementError::InvalidState {
            operation: "init",
            ..
        })
    ));
}

#[rstest]
fn failed_registration_leaves_component_uninitialised(properties: BootstrapProperties) {
    let mut delegate = MockDelegate::new();
    delegate.expect_register().times(1).returning(|| {
        Err(ManagementError::AlreadyRegistered {
            name: "test:type=Stub".to_owned(),
        })
    });
    let mut component = WrappedComponent::new(StubFactory::configured(delegate));

    assert!(component.init(&properties).is_err());
    assert!(component.start().is_err());
}

use std::{cell::RefCell, ffi::OsStr, str::FromStr};

use log::LevelFilter;

#[derive(Clone, Copy)]
struct Env {
    log_level: Option<LevelFilter>,
    minimal: bool,
}

thread_local! {
    /// Must only be mutated within `set_env`
    static ENV: RefCell<Option<Env>> = const { RefCell::new(None) };
}

pub fn init() {
    let value = Env {
        log_level: std::env::var("LC3_LOG")
            .ok()
            .and_then(|level| LevelFilter::from_str(&level).ok()),
        minimal: var_is("LC3_MINIMAL", "1"),
    };
    set_env(value);
}

/// Level requested through `LC3_LOG`, if it names one.
pub fn log_level() -> Option<LevelFilter> {
    with_env(|env| env.log_level)
}

pub fn is_minimal() -> bool {
    with_env(|env| env.minimal)
}

fn set_env(value: Env) {
    ENV.with(|env| {
        let mut env = env.borrow_mut();
        assert!(
            env.is_none(),
            "tried to initialize environment state multiple times"
        );
        *env = Some(value);
    });
}

fn with_env<F, R>(callback: F) -> R
where
    F: Fn(&Env) -> R,
{
    ENV.with(|env| {
        let env = env.borrow();
        let env = env.unwrap_or_else(|| {
            panic!("tried to access environment state before initialization");
        });
        callback(&env)
    })
}

fn var_is(name: impl AsRef<OsStr>, value: impl AsRef<str>) -> bool {
    std::env::var(name.as_ref()).is_ok_and(|v| v == value.as_ref())
}

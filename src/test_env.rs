//! Serializes tests that mutate process environment variables.

use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "LLM_PROVIDER",
    "LLM_MODEL",
    "LLM_API_KEY_ENV",
    "LLM_OPENAI_MODE",
    "LLM_OPENAI_BASE_URL",
    "LLM_REQUEST_TIMEOUT_SECS",
    "LLM_CONNECT_TIMEOUT_SECS",
    "DIAGRAM_GENERATOR",
    "DIAGRAM_MAX_TOKENS",
    "DIAGRAM_TEMPERATURE",
    "TEST_KEY",
];

/// Holds the env lock; every known variable is cleared on acquire and release.
pub struct EnvGuard {
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn acquire() -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        clear();
        Self { _lock: lock }
    }

    pub fn set(&self, key: &str, value: &str) {
        // SAFETY: all env-mutating tests hold ENV_LOCK.
        unsafe { std::env::set_var(key, value) };
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        clear();
    }
}

fn clear() {
    for var in VARS {
        // SAFETY: called only while ENV_LOCK is held.
        unsafe { std::env::remove_var(var) };
    }
}

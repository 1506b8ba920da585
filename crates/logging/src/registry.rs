//! crates/logging/src/registry.rs
//!
//! Thread-safe sink registry with snapshot dispatch.
//!
//! Sinks live in a [`DashMap`] keyed by the address of their `Arc`
//! allocation, so registering the same `Arc` twice is a no-op and removal
//! needs nothing but the handle the caller already holds. Dispatch clones the
//! current set into a local snapshot before invoking any sink. That keeps
//! shard locks out of user callbacks, so a sink may register or unregister
//! sinks (itself included) while a message is being delivered.
//!
//! Next to the multiplexed set sits a single legacy slot, kept for callers
//! that still install one global output. Both channels receive every message;
//! the console fallback is used only when neither is configured.

use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use crate::level::LogLevel;
use crate::output::{ConsoleOutput, LogOutput};

/// Identity of a registered sink: the address of its `Arc` allocation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct SinkKey(usize);

impl SinkKey {
    fn of(sink: &Arc<dyn LogOutput>) -> Self {
        Self(Arc::as_ptr(sink).cast::<()>().addr())
    }
}

#[derive(Clone, Copy)]
enum Channel {
    Plain,
    Prompt,
}

impl Channel {
    fn deliver(self, sink: &dyn LogOutput, level: LogLevel, tag: &str, message: &str) {
        match self {
            Self::Plain => sink.print_log(level, tag, message),
            Self::Prompt => sink.print_and_prompt_log(level, tag, message),
        }
    }
}

/// Registered sinks, the legacy output slot and the console fallback.
pub struct SinkRegistry {
    sinks: DashMap<SinkKey, Arc<dyn LogOutput>>,
    legacy: RwLock<Option<Arc<dyn LogOutput>>>,
    fallback: Arc<dyn LogOutput>,
}

impl SinkRegistry {
    /// Creates an empty registry that falls back to [`ConsoleOutput`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_fallback(Arc::new(ConsoleOutput))
    }

    /// Creates an empty registry with a custom fallback sink.
    #[must_use]
    pub fn with_fallback(fallback: Arc<dyn LogOutput>) -> Self {
        Self {
            sinks: DashMap::new(),
            legacy: RwLock::new(None),
            fallback,
        }
    }

    /// Adds `sink` to the multiplexed set. Adding a sink twice has no effect.
    pub fn register(&self, sink: Arc<dyn LogOutput>) {
        self.sinks.entry(SinkKey::of(&sink)).or_insert(sink);
    }

    /// Removes `sink` from the multiplexed set. Removing an absent sink has no effect.
    pub fn unregister(&self, sink: &Arc<dyn LogOutput>) {
        self.sinks.remove(&SinkKey::of(sink));
    }

    /// Reports whether `sink` is currently in the multiplexed set.
    #[must_use]
    pub fn contains(&self, sink: &Arc<dyn LogOutput>) -> bool {
        self.sinks.contains_key(&SinkKey::of(sink))
    }

    /// Returns the number of sinks in the multiplexed set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Reports whether the multiplexed set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Installs or clears the legacy single output, replacing any previous one.
    pub fn set_legacy_output(&self, output: Option<Arc<dyn LogOutput>>) {
        *self.legacy.write().unwrap_or_else(PoisonError::into_inner) = output;
    }

    /// Returns the legacy output, if one is installed.
    #[must_use]
    pub fn legacy_output(&self) -> Option<Arc<dyn LogOutput>> {
        self.legacy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Delivers a message through every sink's plain path.
    pub fn dispatch_plain(&self, level: LogLevel, tag: &str, message: &str) {
        self.dispatch(Channel::Plain, level, tag, message);
    }

    /// Delivers a message through every sink's prompt path.
    pub fn dispatch_prompt(&self, level: LogLevel, tag: &str, message: &str) {
        self.dispatch(Channel::Prompt, level, tag, message);
    }

    fn snapshot(&self) -> Vec<Arc<dyn LogOutput>> {
        self.sinks
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn dispatch(&self, channel: Channel, level: LogLevel, tag: &str, message: &str) {
        let snapshot = self.snapshot();
        for sink in &snapshot {
            channel.deliver(sink.as_ref(), level, tag, message);
        }

        match self.legacy_output() {
            Some(legacy) => channel.deliver(legacy.as_ref(), level, tag, message),
            None if snapshot.is_empty() => {
                channel.deliver(self.fallback.as_ref(), level, tag, message);
            }
            None => {}
        }
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("sinks", &self.sinks.len())
            .field("legacy", &self.legacy_output().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{LogRecord, MemoryOutput};

    fn memory() -> (Arc<MemoryOutput>, Arc<dyn LogOutput>) {
        let memory = Arc::new(MemoryOutput::new());
        let sink: Arc<dyn LogOutput> = memory.clone();
        (memory, sink)
    }

    fn registry_with_fallback() -> (SinkRegistry, Arc<MemoryOutput>) {
        let (fallback, sink) = memory();
        (SinkRegistry::with_fallback(sink), fallback)
    }

    #[test]
    fn register_is_idempotent() {
        let (registry, _) = registry_with_fallback();
        let (_, sink) = memory();
        registry.register(Arc::clone(&sink));
        registry.register(Arc::clone(&sink));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&sink));
    }

    #[test]
    fn unregister_absent_sink_is_noop() {
        let (registry, _) = registry_with_fallback();
        let (_, sink) = memory();
        registry.unregister(&sink);
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_registry_uses_fallback() {
        let (registry, fallback) = registry_with_fallback();
        registry.dispatch_plain(LogLevel::Info, "t", "m");
        assert_eq!(
            fallback.records(),
            vec![LogRecord {
                level: LogLevel::Info,
                tag: "t".into(),
                message: "m".into(),
                prompted: false,
            }]
        );
    }

    #[test]
    fn registered_sink_suppresses_fallback() {
        let (registry, fallback) = registry_with_fallback();
        let (memory, sink) = memory();
        registry.register(sink);
        registry.dispatch_plain(LogLevel::Info, "t", "m");
        assert_eq!(memory.len(), 1);
        assert!(fallback.is_empty());
    }

    #[test]
    fn legacy_and_multiplexed_both_receive() {
        let (registry, fallback) = registry_with_fallback();
        let (memory, sink) = memory();
        let (legacy, legacy_sink) = self::memory();
        registry.register(sink);
        registry.set_legacy_output(Some(legacy_sink));

        registry.dispatch_prompt(LogLevel::Warn, "t", "m");
        assert_eq!(memory.len(), 1);
        assert_eq!(legacy.len(), 1);
        assert!(legacy.records()[0].prompted);
        assert!(fallback.is_empty());
    }

    #[test]
    fn legacy_alone_suppresses_fallback() {
        let (registry, fallback) = registry_with_fallback();
        let (legacy, legacy_sink) = memory();
        registry.set_legacy_output(Some(legacy_sink));
        registry.dispatch_plain(LogLevel::Error, "t", "m");
        assert_eq!(legacy.len(), 1);
        assert!(fallback.is_empty());

        registry.set_legacy_output(None);
        registry.dispatch_plain(LogLevel::Error, "t", "m");
        assert_eq!(legacy.len(), 1);
        assert_eq!(fallback.len(), 1);
    }

    struct SelfRemoving {
        registry: Arc<SinkRegistry>,
        me: std::sync::OnceLock<Arc<dyn LogOutput>>,
        seen: std::sync::atomic::AtomicUsize,
    }

    impl LogOutput for SelfRemoving {
        fn print_log(&self, _: LogLevel, _: &str, _: &str) {
            self.seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if let Some(me) = self.me.get() {
                self.registry.unregister(me);
            }
        }

        fn print_and_prompt_log(&self, level: LogLevel, tag: &str, message: &str) {
            self.print_log(level, tag, message);
        }
    }

    #[test]
    fn sink_may_unregister_itself_during_dispatch() {
        let (fallback, fallback_sink) = memory();
        let registry = Arc::new(SinkRegistry::with_fallback(fallback_sink));
        let remover = Arc::new(SelfRemoving {
            registry: Arc::clone(&registry),
            me: std::sync::OnceLock::new(),
            seen: std::sync::atomic::AtomicUsize::new(0),
        });
        let sink: Arc<dyn LogOutput> = remover.clone();
        let _ = remover.me.set(Arc::clone(&sink));
        registry.register(sink);

        registry.dispatch_plain(LogLevel::Info, "t", "first");
        registry.dispatch_plain(LogLevel::Info, "t", "second");

        assert_eq!(remover.seen.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback.records()[0].message, "second");
    }
}

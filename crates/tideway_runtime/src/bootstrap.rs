//! Bootstrap context management.
//!
//! A bootstrap is a script run ahead of time whose resulting context is
//! restored into every request machine before the request body executes.
//! The manager caches the captured context and refreshes it on a period;
//! a failed refresh keeps the previous context in place so requests never
//! see a half-initialized environment.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tideway_foundation::{Result, StackContext};
use tideway_script::{StackMachine, WordRegistry};
use tracing::{info, warn};

/// Source of a bootstrap context.
pub trait BootstrapProvider: Send + Sync {
    /// Produces a fresh bootstrap context.
    ///
    /// # Errors
    /// Fails when the bootstrap script cannot be evaluated.
    fn load(&self) -> Result<StackContext>;
}

/// Provider for deployments without a bootstrap: an empty context.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBootstrap;

impl BootstrapProvider for NoBootstrap {
    fn load(&self) -> Result<StackContext> {
        Ok(StackContext::default())
    }
}

/// Provider that evaluates a fixed bootstrap script on each refresh.
///
/// The script runs in its own throwaway machine; whatever symbols and
/// stack values it leaves behind become the bootstrap context.
pub struct StaticBootstrap {
    script: String,
    registry: Arc<WordRegistry>,
}

impl StaticBootstrap {
    /// Creates a provider from a bootstrap script.
    #[must_use]
    pub fn new(script: impl Into<String>, registry: Arc<WordRegistry>) -> Self {
        Self {
            script: script.into(),
            registry,
        }
    }
}

impl BootstrapProvider for StaticBootstrap {
    fn load(&self) -> Result<StackContext> {
        let mut machine = StackMachine::new(Arc::clone(&self.registry));
        for line in self.script.lines() {
            machine.exec(line)?;
        }
        Ok(machine.capture())
    }
}

struct Cached {
    context: Arc<StackContext>,
    loaded_at: Instant,
}

/// Caching front for a [`BootstrapProvider`].
pub struct BootstrapManager {
    provider: Box<dyn BootstrapProvider>,
    period: Option<Duration>,
    cached: RwLock<Cached>,
}

impl BootstrapManager {
    /// Creates a manager that loads once and never refreshes.
    ///
    /// # Errors
    /// Fails when the initial load fails; a manager never starts without
    /// a usable context.
    pub fn new(provider: impl BootstrapProvider + 'static) -> Result<Self> {
        Self::with_period(provider, None)
    }

    /// Creates a manager that refreshes the cached context after `period`.
    ///
    /// # Errors
    /// Fails when the initial load fails.
    pub fn with_period(
        provider: impl BootstrapProvider + 'static,
        period: Option<Duration>,
    ) -> Result<Self> {
        let context = Arc::new(provider.load()?);
        info!(symbols = context.symbols().len(), "bootstrap context loaded");
        Ok(Self {
            provider: Box::new(provider),
            period,
            cached: RwLock::new(Cached {
                context,
                loaded_at: Instant::now(),
            }),
        })
    }

    /// Returns the current bootstrap context, refreshing it first when the
    /// refresh period has elapsed.
    ///
    /// The swap is atomic from a caller's perspective: a request sees
    /// either the old context or the new one, never a mixture. A refresh
    /// failure is logged and the previous context stays in service.
    pub fn current(&self) -> Arc<StackContext> {
        if let Some(period) = self.period {
            let stale = {
                let cached = self.cached.read().unwrap_or_else(|e| e.into_inner());
                cached.loaded_at.elapsed() >= period
            };
            if stale {
                self.refresh();
            }
        }
        let cached = self.cached.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&cached.context)
    }

    /// Forces a refresh, keeping the previous context on failure.
    pub fn refresh(&self) {
        match self.provider.load() {
            Ok(context) => {
                let mut cached = self.cached.write().unwrap_or_else(|e| e.into_inner());
                cached.context = Arc::new(context);
                cached.loaded_at = Instant::now();
                info!("bootstrap context refreshed");
            }
            Err(error) => {
                // Previous context stays in service
                warn!(%error, "bootstrap refresh failed");
                let mut cached = self.cached.write().unwrap_or_else(|e| e.into_inner());
                cached.loaded_at = Instant::now();
            }
        }
    }
}

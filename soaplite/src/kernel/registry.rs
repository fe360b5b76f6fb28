use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::Error;
use super::{InProcessKernel, KernelVariant, SoapKernel};

/// Immutable mapping from kernel variants to their implementation.
///
/// A registry is built once, either explicitly through
/// [`KernelRegistry::builder`] or through [`KernelRegistry::global`], and
/// can then be shared between any number of descriptors and threads.
#[derive(Clone)]
pub struct KernelRegistry {
    kernels: BTreeMap<KernelVariant, Arc<dyn SoapKernel>>,
}

impl std::fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelRegistry")
            .field("variants", &self.kernels.keys().collect::<Vec<_>>())
            .finish()
    }
}

static GLOBAL_REGISTRY: Lazy<Arc<KernelRegistry>> = Lazy::new(|| {
    log::info!("initializing the global SOAP kernel registry with the in-process kernels");
    Arc::new(KernelRegistry::in_process())
});

impl KernelRegistry {
    /// Start building a new, empty registry
    pub fn builder() -> KernelRegistryBuilder {
        KernelRegistryBuilder { kernels: BTreeMap::new() }
    }

    /// Create a registry using [`InProcessKernel`] for all variants
    pub fn in_process() -> KernelRegistry {
        let kernel: Arc<dyn SoapKernel> = Arc::new(InProcessKernel);
        let mut builder = KernelRegistry::builder();
        for variant in KernelVariant::ALL {
            builder = builder.register_shared(variant, Arc::clone(&kernel));
        }
        return builder.build();
    }

    /// Get the process-wide registry, initializing it on first use. The
    /// global registry uses [`InProcessKernel`] for all variants.
    pub fn global() -> Arc<KernelRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Get the kernel registered for the given `variant`
    pub fn get(&self, variant: KernelVariant) -> Result<Arc<dyn SoapKernel>, Error> {
        self.kernels.get(&variant).cloned().ok_or_else(|| Error::KernelLoad(format!(
            "no kernel registered for the {} variant", variant
        )))
    }

    /// Check if a kernel is registered for the given `variant`
    pub fn contains(&self, variant: KernelVariant) -> bool {
        self.kernels.contains_key(&variant)
    }
}

/// Builder for [`KernelRegistry`]
pub struct KernelRegistryBuilder {
    kernels: BTreeMap<KernelVariant, Arc<dyn SoapKernel>>,
}

impl KernelRegistryBuilder {
    /// Use `kernel` for the given `variant`, replacing any previously
    /// registered kernel for this variant
    #[must_use]
    pub fn register(self, variant: KernelVariant, kernel: impl SoapKernel + 'static) -> KernelRegistryBuilder {
        self.register_shared(variant, Arc::new(kernel))
    }

    /// Same as [`KernelRegistryBuilder::register`], for a kernel already
    /// shared with other variants or registries
    #[must_use]
    pub fn register_shared(mut self, variant: KernelVariant, kernel: Arc<dyn SoapKernel>) -> KernelRegistryBuilder {
        if self.kernels.insert(variant, kernel).is_some() {
            log::debug!("replacing the kernel registered for the {} variant", variant);
        }
        self
    }

    /// Finish building the registry
    pub fn build(self) -> KernelRegistry {
        KernelRegistry { kernels: self.kernels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unavailable;
    impl SoapKernel for Unavailable {}

    #[test]
    fn global() {
        let registry = KernelRegistry::global();
        for variant in KernelVariant::ALL {
            assert!(registry.contains(variant));
        }

        assert!(Arc::ptr_eq(&registry, &KernelRegistry::global()));
    }

    #[test]
    fn missing_variant() {
        let registry = KernelRegistry::builder()
            .register(KernelVariant::Cross, Unavailable)
            .build();

        assert!(registry.contains(KernelVariant::Cross));
        assert!(registry.get(KernelVariant::Cross).is_ok());

        let error = registry.get(KernelVariant::NonCross).err().unwrap();
        assert_eq!(
            error.to_string(),
            "failed to load kernel: no kernel registered for the non cross-species (libsoapPySig) variant"
        );
    }
}

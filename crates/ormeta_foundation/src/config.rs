//! Compile options threaded through every resolution pass.

/// How extent lists are propagated through non-persistent intermediate types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExtentMode {
    /// Walk through every non-persistent intermediate.
    #[default]
    Auto,
    /// Walk through an intermediate only when its effective
    /// `determine-extents` flag is on.
    Explicit,
}

/// Configuration for a single compilation run.
///
/// Options are immutable for the duration of a run; independent runs with
/// different options share nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Whether unresolved factory, initializer, proxy, foreign-key attribute,
    /// and order-by references are fatal.
    pub strict: bool,

    /// Extent propagation mode.
    pub extent_mode: ExtentMode,

    /// Virtual catalog name used by emitters for grouping.
    pub catalog: String,

    /// Maximum depth for nested flattening and ancestry walks.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            strict: true,
            extent_mode: ExtentMode::Auto,
            catalog: "default".to_string(),
            max_depth: 64,
        }
    }
}

impl CompileOptions {
    /// Creates a configuration where every reference error is fatal.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Creates a configuration that passes unresolved bindings through.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Builder method to set strictness.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder method to set the extent propagation mode.
    #[must_use]
    pub fn with_extent_mode(mut self, mode: ExtentMode) -> Self {
        self.extent_mode = mode;
        self
    }

    /// Builder method to set the virtual catalog name.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = catalog.into();
        self
    }

    /// Builder method to set the recursion bound.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

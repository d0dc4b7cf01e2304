//! Lowering configuration.

/// Switches for [`OperationBuilder`](crate::OperationBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoweringOptions {
    /// Fold `sizeof`, literal arithmetic and constant conversions.
    /// Constants supplied by the binder are kept either way.
    pub fold_constants: bool,
    /// Append implicit arguments for omitted optional parameters.
    pub materialize_default_arguments: bool,
    /// Insert an implicit `this` when an instance member has no receiver.
    pub implicit_receivers: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
            materialize_default_arguments: true,
            implicit_receivers: true,
        }
    }
}

impl LoweringOptions {
    pub fn with_fold_constants(mut self, enabled: bool) -> Self {
        self.fold_constants = enabled;
        self
    }

    pub fn with_default_arguments(mut self, enabled: bool) -> Self {
        self.materialize_default_arguments = enabled;
        self
    }

    pub fn with_implicit_receivers(mut self, enabled: bool) -> Self {
        self.implicit_receivers = enabled;
        self
    }
}

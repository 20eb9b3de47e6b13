//! typed request
//!
//! what a caller hands to the interceptor chain: an operation plus the
//! adapters and context that travel with it.

use crate::context::ExecutionContext;
use crate::operation::Operation;
use crate::scalar::ScalarTypeAdapters;
use std::fmt;
use std::sync::Arc;

/// a single execution of an operation
pub struct OperationRequest<O> {
    operation: Arc<O>,
    scalar_adapters: Arc<ScalarTypeAdapters>,
    execution_context: ExecutionContext,
}

impl<O: Operation> OperationRequest<O> {
    /// request for `operation` with no adapters and an empty context
    pub fn new(operation: O) -> Self {
        Self {
            operation: Arc::new(operation),
            scalar_adapters: Arc::new(ScalarTypeAdapters::default()),
            execution_context: ExecutionContext::new(),
        }
    }

    /// adapters used to marshal variables and decode the response
    pub fn with_scalar_adapters(mut self, adapters: impl Into<Arc<ScalarTypeAdapters>>) -> Self {
        self.scalar_adapters = adapters.into();
        self
    }

    /// replace the request's execution context
    pub fn with_execution_context(mut self, execution_context: ExecutionContext) -> Self {
        self.execution_context = execution_context;
        self
    }

    /// add one element to the request's execution context
    pub fn with_context_element<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.execution_context = self.execution_context.with(value);
        self
    }

    /// operation being executed
    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// adapters for this request
    pub fn scalar_adapters(&self) -> &ScalarTypeAdapters {
        &self.scalar_adapters
    }

    /// context carried with this request
    pub fn execution_context(&self) -> &ExecutionContext {
        &self.execution_context
    }
}

impl<O> Clone for OperationRequest<O> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            scalar_adapters: self.scalar_adapters.clone(),
            execution_context: self.execution_context.clone(),
        }
    }
}

impl<O: Operation> fmt::Debug for OperationRequest<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRequest")
            .field("operation", &self.operation.name())
            .field("operation_id", &self.operation.operation_id())
            .field("scalar_adapters", &self.scalar_adapters)
            .field("execution_context", &self.execution_context)
            .finish()
    }
}

//! Resource state and the synchronous state machine that owns it.
//!
//! `ResourceMachine` carries no runtime: it only decides which transition a
//! request start or a request completion causes. The async driver in
//! `resource` feeds it.

use questboard_core::{EqualityFilter, QueryError};

/// Message used when a failed query carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// What a consumer sees of one remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Rows in the order the service returned them.
    pub data: Vec<T>,
    /// True exactly while the request for the current filter is outstanding.
    pub loading: bool,
    /// Set only after the request for the current filter failed.
    pub error: Option<String>,
}

impl<T> ResourceState<T> {
    pub fn idle() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Tag of one issued request. Strictly increasing per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// A newer request was issued after this one.
    Superseded,
    /// The resource was deactivated before the response arrived.
    Deactivated,
}

/// Outcome of feeding a response into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded(DiscardReason),
}

#[derive(Debug)]
pub struct ResourceMachine<T> {
    state: ResourceState<T>,
    status: ResourceStatus,
    generation: Generation,
    filter: Option<EqualityFilter>,
    issued: bool,
    active: bool,
    discarded: u64,
}

impl<T> ResourceMachine<T> {
    pub fn new() -> Self {
        Self {
            state: ResourceState::idle(),
            status: ResourceStatus::Idle,
            generation: Generation(0),
            filter: None,
            issued: false,
            active: true,
            discarded: 0,
        }
    }

    pub fn state(&self) -> &ResourceState<T> {
        &self.state
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    /// Generation of the most recently issued request.
    pub fn current_generation(&self) -> Generation {
        self.generation
    }

    /// Filter used by the most recently issued request.
    pub fn filter(&self) -> Option<&EqualityFilter> {
        self.filter.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Responses dropped so far because they were stale or arrived too late.
    pub fn discarded_responses(&self) -> u64 {
        self.discarded
    }

    /// Whether `filter` differs, by value, from the last issued one.
    pub fn filter_changed(&self, filter: &Option<EqualityFilter>) -> bool {
        !self.issued || self.filter != *filter
    }

    /// Start a request for `filter`. Returns `None` once deactivated.
    ///
    /// Data is left untouched until the response lands.
    pub fn begin(&mut self, filter: Option<EqualityFilter>) -> Option<Generation> {
        if !self.active {
            return None;
        }
        self.generation = Generation(self.generation.0 + 1);
        self.filter = filter;
        self.issued = true;
        self.state.loading = true;
        self.state.error = None;
        self.status = ResourceStatus::Loading;
        Some(self.generation)
    }

    /// Feed the response of the request tagged `generation`.
    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<Vec<T>, QueryError>,
    ) -> Completion {
        if !self.active {
            self.discarded += 1;
            return Completion::Discarded(DiscardReason::Deactivated);
        }
        if generation != self.generation {
            self.discarded += 1;
            return Completion::Discarded(DiscardReason::Superseded);
        }

        match result {
            Ok(rows) => {
                self.state.data = rows;
                self.state.error = None;
                self.status = ResourceStatus::Success;
            }
            Err(err) => {
                self.state.error =
                    Some(err.message().unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()));
                self.status = ResourceStatus::Failed;
            }
        }
        self.state.loading = false;
        Completion::Applied
    }

    /// Stop accepting transitions. Idempotent.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl<T> Default for ResourceMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Three-state request tracking with a structural in-flight guard.
//!
//! A `RequestSlot` admits one request at a time. `try_begin` hands out an
//! `InFlight` token only while the slot is not pending; the token settles the
//! slot when the request finishes, or resets it to `Idle` when dropped unsettled
//! (the awaiting future was cancelled). `try_begin_once` additionally refuses
//! once a request has succeeded, for operations that must not repeat.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle of one user-triggered operation, as consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T, E> {
    Idle,
    Pending,
    Settled(Result<T, E>),
}

impl<T, E> Default for RequestState<T, E> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T, E> RequestState<T, E> {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            RequestState::Settled(Ok(value)) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            RequestState::Settled(Err(err)) => Some(err),
            _ => None,
        }
    }
}

/// Why a slot refused to start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// Another request is in flight.
    Pending,
    /// An earlier request already succeeded.
    Succeeded,
}

#[derive(Debug)]
pub struct RequestSlot<T, E> {
    state: Mutex<RequestState<T, E>>,
}

impl<T, E> Default for RequestSlot<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> RequestSlot<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RequestState::Idle),
        }
    }

    /// Marks the slot pending, or returns `None` if a request is already in flight.
    pub fn try_begin(&self) -> Option<InFlight<'_, T, E>> {
        let mut state = self.lock();
        if state.is_pending() {
            return None;
        }
        Some(self.begin(&mut state))
    }

    /// Like [`RequestSlot::try_begin`], but also refuses once a request has
    /// succeeded. Both checks happen under one lock.
    ///
    /// # Errors
    ///
    /// Returns the `Refusal` reason when no request may start.
    pub fn try_begin_once(&self) -> Result<InFlight<'_, T, E>, Refusal> {
        let mut state = self.lock();
        match &*state {
            RequestState::Pending => Err(Refusal::Pending),
            RequestState::Settled(Ok(_)) => Err(Refusal::Succeeded),
            RequestState::Idle | RequestState::Settled(Err(_)) => Ok(self.begin(&mut state)),
        }
    }

    fn begin(&self, state: &mut RequestState<T, E>) -> InFlight<'_, T, E> {
        *state = RequestState::Pending;
        InFlight {
            slot: self,
            settled: false,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    /// Whether the last request settled successfully.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.lock().value().is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> RequestState<T, E>
    where
        T: Clone,
        E: Clone,
    {
        self.lock().clone()
    }

    // State is a plain value, so a poisoned lock still holds a usable state.
    fn lock(&self) -> MutexGuard<'_, RequestState<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Token for the request currently occupying a slot.
#[derive(Debug)]
#[must_use = "dropping the token resets the slot to idle"]
pub struct InFlight<'a, T, E> {
    slot: &'a RequestSlot<T, E>,
    settled: bool,
}

impl<T, E> InFlight<'_, T, E> {
    pub fn settle(mut self, result: Result<T, E>) {
        *self.slot.lock() = RequestState::Settled(result);
        self.settled = true;
    }
}

impl<T, E> Drop for InFlight<'_, T, E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.slot.lock();
        if state.is_pending() {
            *state = RequestState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Slot = RequestSlot<u32, String>;

    #[test]
    fn second_begin_is_refused_while_pending() {
        let slot = Slot::new();
        let first = slot.try_begin();
        assert!(first.is_some());
        assert!(slot.is_pending());
        assert!(slot.try_begin().is_none());

        if let Some(flight) = first {
            flight.settle(Ok(7));
        }
        assert_eq!(slot.snapshot(), RequestState::Settled(Ok(7)));
        assert!(slot.has_value());
        assert!(slot.try_begin().is_some());
    }

    #[test]
    fn failure_clears_the_guard() {
        let slot = Slot::new();
        slot.try_begin().unwrap().settle(Err("offline".into()));
        assert_eq!(slot.snapshot().error().map(String::as_str), Some("offline"));
        assert!(!slot.is_pending());
        assert!(slot.try_begin().is_some());
    }

    #[test]
    fn begin_once_refuses_after_success_only() {
        let slot = Slot::new();
        slot.try_begin_once().unwrap().settle(Err("offline".into()));

        let retry = slot.try_begin_once().unwrap();
        assert_eq!(slot.try_begin_once().err(), Some(Refusal::Pending));
        retry.settle(Ok(3));

        assert_eq!(slot.try_begin_once().err(), Some(Refusal::Succeeded));
        assert_eq!(slot.snapshot().value(), Some(&3));
    }

    #[test]
    fn dropping_an_unsettled_token_returns_to_idle() {
        let slot = Slot::new();
        {
            let _flight = slot.try_begin().unwrap();
            assert!(slot.is_pending());
        }
        assert!(slot.snapshot().is_idle());
    }
}

//! Cooperative cancellation tokens composable across ownership boundaries.
//!
//! ```rust
//! use scommon::CancelToken;
//!
//! let external = CancelToken::new();
//! let internal = CancelToken::new();
//! internal.link(&external);
//!
//! external.cancel();
//! assert!(internal.is_cancelled());
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct TokenState {
    cancelled: bool,
    wakers: Vec<Waker>,
    followers: Vec<Weak<Mutex<TokenState>>>,
}

/// A cheaply clonable cancellation token.
///
/// Signaling is cooperative: `cancel` never interrupts running work, it only
/// flips observable state and wakes pending [`Cancelled`] futures. Tokens can
/// be composed: [`CancelToken::link`] merges two tokens so that signaling
/// either one signals the other, and [`CancelToken::child`] derives a token
/// that follows its parent without feeding back into it.
#[derive(Clone, Default)]
pub struct CancelToken {
    state: Arc<Mutex<TokenState>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals this token and every token linked to it. Idempotent.
    pub fn cancel(&self) {
        let (wakers, followers) = {
            let mut state = self.state.lock().expect("cancel token lock poisoned");
            if state.cancelled {
                return;
            }

            state.cancelled = true;
            (
                std::mem::take(&mut state.wakers),
                std::mem::take(&mut state.followers),
            )
        };

        for waker in wakers {
            waker.wake();
        }

        for follower in followers {
            if let Some(state) = follower.upgrade() {
                Self { state }.cancel();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state
            .lock()
            .expect("cancel token lock poisoned")
            .cancelled
    }

    /// Resolves once the token is signaled. Multiple waiters are supported.
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            state: Arc::clone(&self.state),
        }
    }

    /// Derives a token that is signaled when `self` is, but whose own
    /// cancellation does not propagate back to `self`.
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        self.follow_with(&child);
        child
    }

    /// Merges two tokens into one effective cancellation state: signaling
    /// either token signals the other.
    pub fn link(&self, other: &CancelToken) {
        self.follow_with(other);
        other.follow_with(self);
    }

    fn follow_with(&self, follower: &CancelToken) {
        let already_cancelled = {
            let mut state = self.state.lock().expect("cancel token lock poisoned");
            if !state.cancelled {
                state.followers.push(Arc::downgrade(&follower.state));
            }

            state.cancelled
        };

        if already_cancelled {
            follower.cancel();
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancelToken::cancelled`].
pub struct Cancelled {
    state: Arc<Mutex<TokenState>>,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.lock().expect("cancel token lock poisoned");
        if state.cancelled {
            return Poll::Ready(());
        }

        if !state.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }

        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::{RawWaker, RawWakerVTable};

    fn noop_waker() -> Waker {
        unsafe fn clone(_: *const ()) -> RawWaker {
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        unsafe fn wake(_: *const ()) {}

        unsafe fn wake_by_ref(_: *const ()) {}

        unsafe fn drop(_: *const ()) {}

        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop);

        let raw_waker = RawWaker::new(std::ptr::null(), &VTABLE);
        unsafe { Waker::from_raw(raw_waker) }
    }

    #[test]
    fn cancel_is_observable_and_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn linked_tokens_share_one_cancellation_state() {
        let external = CancelToken::new();
        let internal = CancelToken::new();
        internal.link(&external);

        internal.cancel();
        assert!(external.is_cancelled());
        assert!(internal.is_cancelled());
    }

    #[test]
    fn linking_an_already_cancelled_token_propagates_immediately() {
        let external = CancelToken::new();
        external.cancel();

        let internal = CancelToken::new();
        internal.link(&external);
        assert!(internal.is_cancelled());
    }

    #[test]
    fn child_follows_parent_but_not_the_reverse() {
        let parent = CancelToken::new();
        let child = parent.child();

        child.cancel();
        assert!(!parent.is_cancelled());

        let second_child = parent.child();
        parent.cancel();
        assert!(second_child.is_cancelled());
    }

    #[test]
    fn cancelled_future_resolves_after_signal() {
        let token = CancelToken::new();
        let mut future = std::pin::pin!(token.cancelled());
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert_eq!(future.as_mut().poll(&mut cx), Poll::Pending);

        token.cancel();
        assert_eq!(future.as_mut().poll(&mut cx), Poll::Ready(()));
    }
}

//! Deadline helper that trips a cancel token after a delay.

use std::time::Duration;

use futures_timer::Delay;
use scommon::CancelToken;

/// Cancels `token` once `after` elapses. Run it alongside the exchange
/// stream; dropping the future disarms the deadline.
pub async fn cancel_after(token: CancelToken, after: Duration) {
    Delay::new(after).await;
    token.cancel();
}

//! Cancellable countdowns on the Tokio timer.
//!
//! Every scheduled callback is bound to a [`CancellationToken`]. Cancelling the
//! token stops the task at its next await point; callbacks that mutate shared
//! state re-check the token under their lock, so a transition that cancels a
//! token is never followed by a stale callback.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Invoke `on_tick` once per `period`, `ticks` times, passing the ticks still
/// remaining after each one. The last call receives `0`.
///
/// # Examples
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use admin_client::timer::spawn_countdown;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime").block_on(async {
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// spawn_countdown(3, Duration::from_millis(1), CancellationToken::new(), move |left| {
///     sink.lock().expect("lock").push(left);
/// })
/// .await
/// .expect("countdown runs");
/// assert_eq!(*seen.lock().expect("lock"), vec![2, 1, 0]);
/// # });
/// ```
#[must_use = "dropping the handle detaches the countdown"]
pub fn spawn_countdown<F>(
    ticks: u32,
    period: Duration,
    token: CancellationToken,
    mut on_tick: F,
) -> JoinHandle<()>
where
    F: FnMut(u32) + Send + 'static,
{
    tokio::spawn(async move {
        let mut remaining = ticks;
        while remaining > 0 {
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = tokio::time::sleep(period) => {}
            }
            remaining -= 1;
            on_tick(remaining);
        }
    })
}

/// Invoke `on_fire` once after `delay` unless `token` is cancelled first.
#[must_use = "dropping the handle detaches the timer"]
pub fn spawn_delay<F>(delay: Duration, token: CancellationToken, on_fire: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = token.cancelled() => {}
            () = tokio::time::sleep(delay) => on_fire(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(u32) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |left| {
            sink.lock().expect("recorder lock").push(left);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_reports_each_tick_down_to_zero() {
        let (seen, on_tick) = recorder();
        spawn_countdown(5, Duration::from_secs(1), CancellationToken::new(), on_tick)
            .await
            .expect("countdown completes");
        assert_eq!(*seen.lock().expect("lock"), vec![4, 3, 2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_stops_ticking() {
        let (seen, on_tick) = recorder();
        let token = CancellationToken::new();
        let handle = spawn_countdown(5, Duration::from_secs(1), token.clone(), on_tick);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        token.cancel();
        handle.await.expect("countdown exits");

        assert_eq!(*seen.lock().expect("lock"), vec![4, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_fires_once_unless_cancelled() {
        let fired = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&fired);
        spawn_delay(Duration::from_secs(4), CancellationToken::new(), move || {
            *counter.lock().expect("lock") += 1;
        })
        .await
        .expect("delay completes");
        assert_eq!(*fired.lock().expect("lock"), 1);

        let token = CancellationToken::new();
        let counter = Arc::clone(&fired);
        let handle = spawn_delay(Duration::from_secs(4), token.clone(), move || {
            *counter.lock().expect("lock") += 1;
        });
        token.cancel();
        handle.await.expect("delay exits");
        assert_eq!(*fired.lock().expect("lock"), 1);
    }
}

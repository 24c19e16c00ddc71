use std::future::Future;
use std::time::Duration;

/// Number of status probes issued before giving up.
pub const READY_ATTEMPTS: u32 = 3;

/// Fixed pause between failed probes. No jitter, no backoff.
pub const READY_DELAY: Duration = Duration::from_secs(5);

/// Poll `probe` until it reports ready.
///
/// At most `attempts` probes are issued, with `sleep(delay)` between failed
/// ones; the first success ends the loop immediately. Exhaustion is not an
/// error: this is a best-effort warm-up, and the first operation that truly
/// needs the engine reports the failure.
///
/// Probe and delay are injected so tests can run the loop deterministically.
pub async fn wait_for_engine<P, PFut, S, SFut>(
    attempts: u32,
    delay: Duration,
    mut probe: P,
    mut sleep: S,
) -> bool
where
    P: FnMut() -> PFut,
    PFut: Future<Output = bool>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    for attempt in 1..=attempts {
        if probe().await {
            return true;
        }
        if attempt < attempts {
            sleep(delay).await;
        }
    }
    false
}

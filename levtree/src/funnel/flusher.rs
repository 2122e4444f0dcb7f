use super::Funnel;
use crate::{error::Result, store::Store};
use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, error, info};

/// Background thread that periodically flushes a funnel.
///
/// A failed flush keeps the staged nodes, so the next tick retries them. Stopping
/// the flusher performs a final flush and returns its result. Dropping it stops it
/// as well, logging a final failure.
pub struct Flusher {
    shutdown: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<Result<usize>>>,
}

impl Flusher {
    pub fn spawn<S: Store + 'static>(
        funnel: Funnel<S>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (shutdown, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("levtree-flush".into())
            .spawn(move || run(funnel, interval, rx))?;
        Ok(Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    /// Stop the flusher, returning the result of the final flush
    pub fn stop(mut self) -> Result<usize> {
        self.stop0()
    }

    fn stop0(&mut self) -> Result<usize> {
        // dropping the sender wakes up the thread
        self.shutdown.take();
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(res) => res,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            None => Ok(0),
        }
    }
}

impl Drop for Flusher {
    fn drop(&mut self) {
        if let Err(cause) = self.stop0() {
            error!("final flush failed: {}", cause);
        }
    }
}

fn run<S: Store>(
    funnel: Funnel<S>,
    interval: Duration,
    shutdown: mpsc::Receiver<()>,
) -> Result<usize> {
    info!(?interval, "funnel flusher started");
    loop {
        match shutdown.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => match funnel.flush() {
                Ok(0) => {}
                Ok(count) => debug!(count, "periodic flush"),
                Err(cause) => {
                    error!(staged = funnel.len(), "periodic flush failed, will retry: {}", cause)
                }
            },
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    let res = funnel.flush();
    info!("funnel flusher stopped");
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keychain::KeyChain, node::Node, store::MemStore};
    use std::time::Instant;

    #[test]
    fn periodic_flush() -> anyhow::Result<()> {
        let store = MemStore::new();
        let funnel = Funnel::new(store.clone());
        let flusher = Flusher::spawn(funnel.clone(), Duration::from_millis(10))?;
        funnel.stage(vec![Node::root()]);
        let t0 = Instant::now();
        while store.is_empty() && t0.elapsed() < Duration::from_secs(10) {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(store.len(), 1);
        assert_eq!(flusher.stop()?, 0);
        Ok(())
    }

    #[test]
    fn stop_flushes_remaining() -> anyhow::Result<()> {
        let store = MemStore::new();
        let funnel = Funnel::new(store.clone());
        let flusher = Flusher::spawn(funnel.clone(), Duration::from_secs(3600))?;
        let forest = KeyChain::root().make_child_tree()?;
        funnel.stage(vec![Node::root(), Node::new(forest, vec![1])]);
        assert!(store.is_empty());
        assert_eq!(flusher.stop()?, 2);
        assert_eq!(store.len(), 2);
        assert!(funnel.is_empty());
        Ok(())
    }

    #[test]
    fn failed_flush_is_retried() -> anyhow::Result<()> {
        let store = MemStore::new();
        store.fail_next_writes(2);
        let funnel = Funnel::new(store.clone());
        funnel.stage(vec![Node::root()]);
        let flusher = Flusher::spawn(funnel.clone(), Duration::from_millis(10))?;
        let t0 = Instant::now();
        while store.is_empty() && t0.elapsed() < Duration::from_secs(10) {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.batches_written(), 1);
        drop(flusher);
        Ok(())
    }
}

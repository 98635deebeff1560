//! Shared fan-out of a single upstream to many consumers.
//!
//! [`BroadcastOperator`] drives its upstream exactly once, no matter how
//! many consumers attach. The shared fan-out state is created lazily on the
//! first [`Operator::to_stream`] call (first caller wins; concurrent callers
//! observe the same state), and the upstream is not polled until the first
//! subscriber stream is polled. Subscribers joining later see only items
//! produced after they joined, in order, with no gaps or duplicates.
//!
//! If the upstream fails, the failure is delivered to every attached
//! subscriber and recorded: future subscribers receive it immediately. The
//! fan-out never restarts; retrying requires a fresh operator.

use std::sync::Arc;

use futures::stream::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::Notify;

use crate::error::KaleidoError;
use crate::operators::{Operator, OperatorScope, OperatorStream, UnaryOperator};

/// Capacity of each subscriber's channel. Kept minimal: items are handed
/// over, not buffered, and a slow subscriber suspends the driver instead of
/// losing items.
const SUBSCRIBER_CAPACITY: usize = 1;

type FanOutItem<T> = std::result::Result<T, String>;

struct FanOutShared<T> {
    subscribers: Vec<mpsc::Sender<FanOutItem<T>>>,
    /// Terminal upstream failure, delivered to all future subscribers.
    failure: Option<String>,
}

struct FanOutState<T> {
    shared: Arc<Mutex<FanOutShared<T>>>,
    activation: Arc<Notify>,
    /// Scope driving the upstream; independent of any caller's scope.
    _scope: OperatorScope,
}

/// A pass-through operator that broadcasts one upstream to many consumers.
pub struct BroadcastOperator<T> {
    input: Arc<dyn Operator<T>>,
    name: String,
    state: Mutex<Option<FanOutState<T>>>,
}

impl<T> BroadcastOperator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new broadcast stage over the given upstream.
    pub fn new(input: Arc<dyn Operator<T>>) -> Self {
        BroadcastOperator {
            input,
            name: "broadcast".to_string(),
            state: Mutex::new(None),
        }
    }

    /// Create a new broadcast stage with an explicit stage name.
    pub fn with_name<S: Into<String>>(input: Arc<dyn Operator<T>>, name: S) -> Self {
        BroadcastOperator {
            input,
            name: name.into(),
            state: Mutex::new(None),
        }
    }

    /// Create the shared state and spawn the single upstream driver.
    ///
    /// The driver lives in a scope derived from the first caller's scope and
    /// parks until the first subscriber polls.
    fn create_state(&self, scope: &OperatorScope) -> FanOutState<T> {
        let shared = Arc::new(Mutex::new(FanOutShared {
            subscribers: Vec::new(),
            failure: None,
        }));
        let activation = Arc::new(Notify::new());
        let driver_scope = scope.child();

        let upstream = self.input.to_stream(&driver_scope);
        let driver_shared = Arc::clone(&shared);
        let driver_activation = Arc::clone(&activation);
        driver_scope.spawn(async move {
            driver_activation.notified().await;
            let mut upstream = upstream;
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(value) => {
                        let senders = driver_shared.lock().subscribers.clone();
                        for sender in senders {
                            // A closed receiver means that consumer detached;
                            // it is pruned below without disturbing the rest.
                            let _ = sender.send(Ok(value.clone())).await;
                        }
                        driver_shared
                            .lock()
                            .subscribers
                            .retain(|sender| !sender.is_closed());
                    }
                    Err(e) => {
                        let message = e.to_string();
                        let senders = {
                            let mut guard = driver_shared.lock();
                            guard.failure = Some(message.clone());
                            std::mem::take(&mut guard.subscribers)
                        };
                        for sender in senders {
                            let _ = sender.send(Err(message.clone())).await;
                        }
                        return;
                    }
                }
            }
            // Upstream exhausted: dropping the senders closes every
            // subscriber's stream.
            driver_shared.lock().subscribers.clear();
        });

        FanOutState {
            shared,
            activation,
            _scope: driver_scope,
        }
    }

    fn subscribe(
        shared: &Arc<Mutex<FanOutShared<T>>>,
        activation: &Arc<Notify>,
    ) -> OperatorStream<T> {
        let receiver = {
            let mut guard = shared.lock();
            if let Some(message) = guard.failure.clone() {
                return futures::stream::once(async move {
                    Err(KaleidoError::fan_out(message))
                })
                .boxed();
            }
            let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
            guard.subscribers.push(sender);
            receiver
        };

        let activation = Arc::clone(activation);
        futures::stream::unfold(
            (receiver, Some(activation)),
            |(mut receiver, activation)| async move {
                if let Some(activation) = activation {
                    // First poll of this subscriber starts the upstream if it
                    // has not been started yet.
                    activation.notify_one();
                }
                match receiver.recv().await {
                    Some(Ok(value)) => Some((Ok(value), (receiver, None))),
                    Some(Err(message)) => {
                        Some((Err(KaleidoError::fan_out(message)), (receiver, None)))
                    }
                    None => None,
                }
            },
        )
        .boxed()
    }
}

impl<T> Operator<T> for BroadcastOperator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe a consumer to the shared fan-out.
    ///
    /// The first call creates the fan-out state under mutual exclusion; all
    /// calls, regardless of caller scope, attach to the same upstream.
    fn to_stream(&self, scope: &OperatorScope) -> OperatorStream<T> {
        let mut guard = self.state.lock();
        let state = guard.get_or_insert_with(|| self.create_state(scope));
        Self::subscribe(&state.shared, &state.activation)
    }
}

impl<T> UnaryOperator<T, T> for BroadcastOperator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn input(&self) -> &Arc<dyn Operator<T>> {
        &self.input
    }
}

//! Toggleable feeds: an enable channel gating a sensor source.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use sensorlink_ipc::{ChannelId, ChannelValue, PayloadResult, ValueType};
use sensorlink_transport::{Channel, ChannelRegistry, Subscription};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::FeedError;
use crate::error_channel::ErrorChannel;
use crate::metrics::{FeedMetrics, FeedMetricsSnapshot};
use crate::FeedResult;

/// The channels making up one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedDescriptor {
    /// Display name used in logs and error messages.
    pub name: &'static str,

    /// Channel the peer writes to turn the feed on or off.
    pub enable: ChannelId,

    /// `Bool` for plain on/off, `Double` for an update interval in seconds.
    pub enable_type: ValueType,

    /// Data channels, in the order values are sent for one sample.
    pub data: &'static [(ChannelId, ValueType)],
}

impl FeedDescriptor {
    /// Returns true if the enable channel carries an update interval.
    pub fn takes_interval(&self) -> bool {
        self.enable_type == ValueType::Double
    }
}

/// One reading of a sensor, convertible into per-channel values.
pub trait FeedSample: Send + 'static {
    /// The feed this sample belongs to.
    const FEED: FeedDescriptor;

    /// Produce one value per data channel.
    fn encode(&self) -> PayloadResult<Vec<(ChannelId, ChannelValue)>>;
}

/// Callback a source invokes for every new sample.
pub type SampleCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A hardware sensor the feed can subscribe to.
pub trait FeedSource: Send + Sync + 'static {
    type Sample: FeedSample;

    /// Start delivering samples to `emit` until the subscription is released.
    ///
    /// `interval` is the requested update period, `None` for the source's
    /// own rate.
    fn subscribe(
        &self,
        interval: Option<Duration>,
        emit: SampleCallback<Self::Sample>,
    ) -> FeedResult<Subscription>;

    /// The most recent reading, if the source has one.
    fn snapshot(&self) -> Option<Self::Sample>;
}

/// Whether a feed is emitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Off,
    On { interval: Option<Duration> },
}

impl ToggleState {
    /// Interpret a value written to an enable channel of type `enable_type`.
    ///
    /// A `Bool` enable accepts only `Bool`. A `Double` enable takes an update
    /// interval in seconds, where zero turns the feed off, and also accepts
    /// `Bool` for on with the source's default interval.
    pub fn from_enable_value(enable_type: ValueType, value: &ChannelValue) -> Result<Self, String> {
        match (enable_type, value) {
            (_, ChannelValue::Bool(true)) => Ok(Self::On { interval: None }),
            (_, ChannelValue::Bool(false)) => Ok(Self::Off),
            (ValueType::Double, ChannelValue::Double(secs)) if *secs == 0.0 => Ok(Self::Off),
            (ValueType::Double, ChannelValue::Double(secs)) if *secs > 0.0 => {
                Duration::try_from_secs_f64(*secs)
                    .map(|interval| Self::On {
                        interval: Some(interval),
                    })
                    .map_err(|_| format!("update interval {secs} out of range"))
            }
            (ValueType::Double, ChannelValue::Double(secs)) => {
                Err(format!("update interval {secs} is not positive"))
            }
            (ValueType::Double, other) => Err(format!(
                "expected bool or double enable value, got {}",
                other.value_type().name()
            )),
            (_, other) => Err(format!(
                "expected bool enable value, got {}",
                other.value_type().name()
            )),
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Self::On { .. })
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::On { interval: None } => write!(f, "on"),
            Self::On {
                interval: Some(interval),
            } => write!(f, "on every {:?}", interval),
        }
    }
}

struct FeedState {
    toggle: ToggleState,
    generation: u64,
    subscription: Option<Subscription>,
}

struct FeedInner<S: FeedSource> {
    descriptor: FeedDescriptor,
    source: S,
    registry: Arc<ChannelRegistry>,
    errors: Arc<ErrorChannel>,
    enable: Arc<Channel>,
    data: Vec<Arc<Channel>>,
    state: Mutex<FeedState>,
    transition: Mutex<()>,
    metrics: FeedMetrics,
}

/// A sensor feed switched on and off by its peer.
///
/// While on, the feed holds exactly one source subscription and publishes
/// every sample on its data channels. Turning off, or losing the peer,
/// releases the subscription; samples from a released subscription are
/// discarded even if the source still delivers them.
pub struct ToggleableFeed<S: FeedSource> {
    inner: Arc<FeedInner<S>>,
    _disconnect: Subscription,
}

impl<S: FeedSource> ToggleableFeed<S> {
    /// Attach the feed's channels and start listening on its enable channel.
    #[instrument(name = "feed_attach", skip_all)]
    pub fn attach(
        registry: &Arc<ChannelRegistry>,
        errors: &Arc<ErrorChannel>,
        source: S,
    ) -> FeedResult<Self> {
        let descriptor = <S::Sample as FeedSample>::FEED;
        let (enable, data) = attach_channels(registry, &descriptor)?;

        let inner = Arc::new(FeedInner {
            descriptor,
            source,
            registry: Arc::clone(registry),
            errors: Arc::clone(errors),
            enable,
            data,
            state: Mutex::new(FeedState {
                toggle: ToggleState::Off,
                generation: 0,
                subscription: None,
            }),
            transition: Mutex::new(()),
            metrics: FeedMetrics::new(),
        });

        let weak = Arc::downgrade(&inner);
        registry.set_handler(&inner.enable, move |value| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_enable(value);
            }
        });

        let weak: Weak<FeedInner<S>> = Arc::downgrade(&inner);
        let disconnect = registry.on_disconnect(move || {
            if let Some(inner) = weak.upgrade() {
                inner.transition_to(ToggleState::Off);
            }
        });

        debug!(feed = descriptor.name, "Feed attached");
        Ok(Self {
            inner,
            _disconnect: disconnect,
        })
    }

    pub fn descriptor(&self) -> &FeedDescriptor {
        &self.inner.descriptor
    }

    /// Returns the current toggle state.
    pub fn state(&self) -> ToggleState {
        self.inner.state.lock().toggle
    }

    /// Returns true while a source subscription is held.
    pub fn is_subscribed(&self) -> bool {
        self.inner.state.lock().subscription.is_some()
    }

    pub fn metrics(&self) -> FeedMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }
}

impl<S: FeedSource> Drop for ToggleableFeed<S> {
    fn drop(&mut self) {
        self.inner.transition_to(ToggleState::Off);

        let registry = &self.inner.registry;
        let ids = std::iter::once(self.inner.descriptor.enable)
            .chain(self.inner.descriptor.data.iter().map(|(id, _)| *id));
        for id in ids {
            let _ = registry.detach(id);
        }
    }
}

/// Attach the enable and data channels, rolling back on failure.
pub(crate) fn attach_channels(
    registry: &ChannelRegistry,
    descriptor: &FeedDescriptor,
) -> FeedResult<(Arc<Channel>, Vec<Arc<Channel>>)> {
    let enable = registry.attach(descriptor.enable, descriptor.enable_type)?;

    let mut data = Vec::with_capacity(descriptor.data.len());
    for (id, value_type) in descriptor.data {
        match registry.attach(*id, *value_type) {
            Ok(channel) => data.push(channel),
            Err(e) => {
                for channel in std::iter::once(&enable).chain(data.iter()) {
                    let _ = registry.detach(channel.id());
                }
                return Err(e.into());
            }
        }
    }

    Ok((enable, data))
}

impl<S: FeedSource> FeedInner<S> {
    fn handle_enable(self: &Arc<Self>, value: &ChannelValue) {
        let target = match ToggleState::from_enable_value(self.descriptor.enable_type, value) {
            Ok(target) => target,
            Err(reason) => {
                let error = FeedError::InvalidPayload {
                    channel: self.descriptor.enable,
                    reason,
                };
                self.errors.report(error.to_string());
                return;
            }
        };

        if target.is_on() && !self.registry.is_connected() {
            debug!(feed = self.descriptor.name, "Enable ignored while disconnected");
            self.transition_to(ToggleState::Off);
            return;
        }

        self.transition_to(target);
    }

    /// Move to `target`. Subscribe and release happen outside the state lock.
    #[instrument(name = "feed_transition", skip(self), fields(feed = self.descriptor.name))]
    fn transition_to(self: &Arc<Self>, target: ToggleState) {
        let _transition = self.transition.lock();

        let (released, generation) = {
            let mut state = self.state.lock();
            if state.toggle == target {
                trace!(state = %target, "Already in requested state");
                return;
            }
            if state.toggle.is_on() {
                self.metrics.record_disabled();
            }
            state.generation += 1;
            state.toggle = target;
            (state.subscription.take(), state.generation)
        };
        drop(released);

        let ToggleState::On { interval } = target else {
            info!("Feed off");
            return;
        };

        let weak = Arc::downgrade(self);
        let emit: SampleCallback<S::Sample> = Arc::new(move |sample| {
            if let Some(inner) = weak.upgrade() {
                inner.emit(generation, &sample);
            }
        });

        match self.source.subscribe(interval, emit) {
            Ok(subscription) => {
                let mut state = self.state.lock();
                if state.generation != generation {
                    drop(state);
                    drop(subscription);
                    return;
                }
                state.subscription = Some(subscription);
            }
            Err(e) => {
                {
                    let mut state = self.state.lock();
                    state.generation += 1;
                    state.toggle = ToggleState::Off;
                }
                warn!("Source subscribe failed: {}", e);
                self.errors.report(format!("{}: {}", self.descriptor.name, e));
                return;
            }
        }

        self.metrics.record_enabled();
        info!(state = %target, "Feed on");

        if let Some(sample) = self.source.snapshot() {
            self.emit(generation, &sample);
        }
    }

    /// Publish one sample if it belongs to the live subscription.
    fn emit(&self, generation: u64, sample: &S::Sample) {
        let state = self.state.lock();
        if state.generation != generation || !state.toggle.is_on() {
            trace!(feed = self.descriptor.name, "Dropping stale sample");
            self.metrics.record_dropped();
            return;
        }
        if !self.registry.is_connected() {
            self.metrics.record_dropped();
            return;
        }

        let values = match sample.encode() {
            Ok(values) => values,
            Err(e) => {
                drop(state);
                self.metrics.record_failed();
                self.errors.report(format!(
                    "{}: {}",
                    self.descriptor.name,
                    FeedError::Encoding(e)
                ));
                return;
            }
        };

        let mut failures = Vec::new();
        for (id, value) in values {
            let Some(channel) = self.data.iter().find(|channel| channel.id() == id) else {
                warn!(feed = self.descriptor.name, channel = %id, "Sample value for foreign channel");
                continue;
            };
            match self.registry.publish(channel, value) {
                Ok(()) => self.metrics.record_value_sent(),
                Err(e) => {
                    self.metrics.record_failed();
                    failures.push(FeedError::Transport(e));
                }
            }
        }
        drop(state);

        if failures.is_empty() {
            self.metrics.record_emitted();
        }
        for failure in failures {
            self.errors.report(format!("{}: {}", self.descriptor.name, failure));
        }
    }
}

/// Object-safe view of a feed of any source type.
pub trait FeedHandle: Send {
    fn descriptor(&self) -> &FeedDescriptor;
    fn state(&self) -> ToggleState;
    fn metrics(&self) -> FeedMetricsSnapshot;
}

impl<S: FeedSource> FeedHandle for ToggleableFeed<S> {
    fn descriptor(&self) -> &FeedDescriptor {
        ToggleableFeed::descriptor(self)
    }

    fn state(&self) -> ToggleState {
        ToggleableFeed::state(self)
    }

    fn metrics(&self) -> FeedMetricsSnapshot {
        ToggleableFeed::metrics(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BatteryReading, BATTERY};
    use crate::test_support::{registry, RecordingTransport};
    use proptest::prelude::*;
    use sensorlink_ipc::{BatteryState, GyroData};
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    type Callbacks = Mutex<Vec<(u64, SampleCallback<BatteryReading>)>>;

    /// A battery source fired by hand.
    #[derive(Clone, Default)]
    struct ManualSource {
        callbacks: Arc<Callbacks>,
        next_id: Arc<AtomicU64>,
        subscribes: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
        intervals: Arc<Mutex<Vec<Option<Duration>>>>,
        snapshot: Arc<Mutex<Option<BatteryReading>>>,
        fail: Arc<AtomicBool>,
    }

    impl ManualSource {
        fn fire(&self, level: f32) {
            let callbacks: Vec<_> = self
                .callbacks
                .lock()
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            for callback in callbacks {
                callback(reading(level));
            }
        }

        fn active(&self) -> usize {
            self.callbacks.lock().len()
        }

        fn latest_callback(&self) -> SampleCallback<BatteryReading> {
            Arc::clone(&self.callbacks.lock().last().unwrap().1)
        }
    }

    impl FeedSource for ManualSource {
        type Sample = BatteryReading;

        fn subscribe(
            &self,
            interval: Option<Duration>,
            emit: SampleCallback<BatteryReading>,
        ) -> FeedResult<Subscription> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(FeedError::Source("battery monitoring unavailable".into()));
            }
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            self.intervals.lock().push(interval);

            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let active = {
                let mut callbacks = self.callbacks.lock();
                callbacks.push((id, emit));
                callbacks.len()
            };
            self.max_active.fetch_max(active, Ordering::SeqCst);

            let callbacks = Arc::clone(&self.callbacks);
            Ok(Subscription::new(move || {
                callbacks.lock().retain(|(entry, _)| *entry != id);
            }))
        }

        fn snapshot(&self) -> Option<BatteryReading> {
            *self.snapshot.lock()
        }
    }

    fn reading(level: f32) -> BatteryReading {
        BatteryReading {
            level,
            state: BatteryState::Unplugged,
        }
    }

    fn battery_feed() -> (
        ToggleableFeed<ManualSource>,
        ManualSource,
        Arc<ChannelRegistry>,
        Arc<RecordingTransport>,
    ) {
        let (registry, transport) = registry();
        let errors = ErrorChannel::attach(Arc::clone(&registry)).unwrap();
        let source = ManualSource::default();
        *source.snapshot.lock() = Some(reading(0.5));
        let feed = ToggleableFeed::attach(&registry, &errors, source.clone()).unwrap();
        (feed, source, registry, transport)
    }

    fn levels(transport: &RecordingTransport) -> Vec<f32> {
        transport
            .sent_on(ChannelId::BatteryLevel)
            .iter()
            .map(|value| value.as_float().unwrap())
            .collect()
    }

    #[test]
    fn test_enable_decoding() {
        let decode = ToggleState::from_enable_value;
        assert_eq!(
            decode(ValueType::Bool, &ChannelValue::Bool(true)),
            Ok(ToggleState::On { interval: None })
        );
        assert!(decode(ValueType::Bool, &ChannelValue::Double(1.0)).is_err());
        assert!(decode(ValueType::Bool, &ChannelValue::Double(0.0)).is_err());
        assert_eq!(
            decode(ValueType::Double, &ChannelValue::Double(0.0)),
            Ok(ToggleState::Off)
        );
        assert_eq!(
            decode(ValueType::Double, &ChannelValue::Double(0.25)),
            Ok(ToggleState::On {
                interval: Some(Duration::from_millis(250))
            })
        );
        assert_eq!(
            decode(ValueType::Double, &ChannelValue::Bool(true)),
            Ok(ToggleState::On { interval: None })
        );
        assert!(decode(ValueType::Double, &ChannelValue::Double(-1.0)).is_err());
        assert!(decode(ValueType::Double, &ChannelValue::Double(f64::NAN)).is_err());
        assert!(decode(ValueType::Double, &ChannelValue::Int32(1)).is_err());
        assert!(decode(ValueType::Bool, &ChannelValue::Int32(1)).is_err());
    }

    #[test]
    fn test_on_emits_snapshot_then_each_event() {
        let (feed, source, registry, transport) = battery_feed();

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));
        assert_eq!(feed.state(), ToggleState::On { interval: None });
        assert_eq!(levels(&transport), vec![0.5]);

        source.fire(0.4);
        source.fire(0.3);
        assert_eq!(levels(&transport), vec![0.5, 0.4, 0.3]);

        let states = transport.sent_on(ChannelId::BatteryState);
        assert_eq!(states.len(), 3);
        assert_eq!(states[0], ChannelValue::Int8(BatteryState::Unplugged.raw()));
    }

    #[test]
    fn test_off_stops_emission() {
        let (feed, source, registry, transport) = battery_feed();
        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));
        let stale = source.latest_callback();

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(false));
        assert_eq!(feed.state(), ToggleState::Off);
        assert_eq!(source.active(), 0);

        source.fire(0.1);
        stale(reading(0.2));
        assert_eq!(levels(&transport), vec![0.5]);
        assert_eq!(feed.metrics().dropped, 1);
    }

    #[test]
    fn test_invalid_enable_reports_once_and_keeps_state() {
        let (feed, _source, registry, transport) = battery_feed();
        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Int32(7));

        let errors = transport.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("batteryStatusOn"), "{}", errors[0]);
        assert_eq!(feed.state(), ToggleState::On { interval: None });
        assert!(feed.is_subscribed());
    }

    #[test]
    fn test_repeated_enable_is_noop() {
        let (_feed, source, registry, transport) = battery_feed();
        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));
        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));

        assert_eq!(source.subscribes.load(Ordering::SeqCst), 1);
        assert_eq!(levels(&transport), vec![0.5]);
    }

    #[test]
    fn test_disconnect_forces_off() {
        let (feed, source, registry, transport) = battery_feed();
        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));
        let stale = source.latest_callback();

        transport.set_connected(false);
        registry.handle_disconnect();

        assert_eq!(feed.state(), ToggleState::Off);
        assert_eq!(source.active(), 0);
        stale(reading(0.9));
        assert_eq!(levels(&transport), vec![0.5]);
    }

    #[test]
    fn test_enable_while_disconnected_stays_off() {
        let (feed, source, registry, transport) = battery_feed();
        transport.set_connected(false);

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));

        assert_eq!(feed.state(), ToggleState::Off);
        assert_eq!(source.subscribes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscribe_failure_reports_and_stays_off() {
        let (feed, source, registry, transport) = battery_feed();
        source.fail.store(true, Ordering::SeqCst);

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));

        assert_eq!(feed.state(), ToggleState::Off);
        assert!(!feed.is_subscribed());
        let errors = transport.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("battery monitoring unavailable"));
        assert!(levels(&transport).is_empty());
    }

    #[test]
    fn test_double_on_bool_enable_reports_and_stays_off() {
        let (feed, source, registry, transport) = battery_feed();

        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Double(1.0));

        let errors = transport.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("batteryStatusOn"), "{}", errors[0]);
        assert_eq!(feed.state(), ToggleState::Off);
        assert_eq!(source.subscribes.load(Ordering::SeqCst), 0);
        assert!(levels(&transport).is_empty());
    }

    /// A gyro source that only records its subscriptions.
    #[derive(Clone, Default)]
    struct IntervalSource {
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
        intervals: Arc<Mutex<Vec<Option<Duration>>>>,
    }

    impl FeedSource for IntervalSource {
        type Sample = GyroData;

        fn subscribe(
            &self,
            interval: Option<Duration>,
            _emit: SampleCallback<GyroData>,
        ) -> FeedResult<Subscription> {
            self.intervals.lock().push(interval);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);

            let counter = Arc::clone(&self.active);
            Ok(Subscription::new(move || {
                counter.fetch_sub(1, Ordering::SeqCst);
            }))
        }

        fn snapshot(&self) -> Option<GyroData> {
            None
        }
    }

    #[test]
    fn test_interval_change_replaces_subscription() {
        let (registry, transport) = registry();
        let errors = ErrorChannel::attach(Arc::clone(&registry)).unwrap();
        let source = IntervalSource::default();
        let feed = ToggleableFeed::attach(&registry, &errors, source.clone()).unwrap();

        registry.dispatch(ChannelId::GyroOn, ChannelValue::Double(0.5));
        registry.dispatch(ChannelId::GyroOn, ChannelValue::Double(0.1));

        assert_eq!(source.active.load(Ordering::SeqCst), 1);
        assert_eq!(source.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(
            *source.intervals.lock(),
            vec![Some(Duration::from_millis(500)), Some(Duration::from_millis(100))]
        );
        assert_eq!(
            feed.state(),
            ToggleState::On {
                interval: Some(Duration::from_millis(100))
            }
        );

        registry.dispatch(ChannelId::GyroOn, ChannelValue::Double(0.0));
        assert_eq!(feed.state(), ToggleState::Off);
        assert_eq!(source.active.load(Ordering::SeqCst), 0);
        assert!(transport.errors().is_empty());
    }

    #[test]
    fn test_drop_releases_channels() {
        let (feed, source, registry, _transport) = battery_feed();
        registry.dispatch(ChannelId::BatteryStatusOn, ChannelValue::Bool(true));

        drop(feed);

        assert_eq!(source.active(), 0);
        assert_eq!(registry.attached(), vec![ChannelId::Error]);
    }

    fn enable_value() -> impl Strategy<Value = ChannelValue> {
        prop_oneof![
            any::<bool>().prop_map(ChannelValue::Bool),
            prop_oneof![Just(0.0), Just(0.1), Just(0.5), Just(-1.0)].prop_map(ChannelValue::Double),
            any::<i32>().prop_map(ChannelValue::Int32),
        ]
    }

    proptest! {
        #[test]
        fn prop_at_most_one_live_subscription(
            values in proptest::collection::vec(enable_value(), 1..40),
            disconnect_at in proptest::option::of(0usize..40),
        ) {
            let (feed, source, registry, transport) = battery_feed();

            for (step, value) in values.into_iter().enumerate() {
                if disconnect_at == Some(step) {
                    transport.set_connected(false);
                    registry.handle_disconnect();
                }
                registry.dispatch(ChannelId::BatteryStatusOn, value);

                let active = source.active();
                prop_assert!(active <= 1);
                prop_assert_eq!(active == 1, feed.state().is_on());
            }
            prop_assert!(source.max_active.load(Ordering::SeqCst) <= 1);
        }
    }
}

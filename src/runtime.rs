//=========================================================================
// Cadence Runtime
//
// Frame orchestrator: owns global time, input sampling, the manager
// registry, the schedulers and the event emitter, and drives them once
// per tick.
//
// Architecture:
// ```text
//     RuntimeBuilder  ──build(app)──>  Runtime  ──run()──>  [winit host]
//         │                              │
//         ├─ with_config()               ├─ tick(elapsed)
//         ├─ with_device_reset_debounce()├─ render_frame()
//         ├─ with_channel_capacity()     └─ notify_*()
//         └─ with_manager()
// ```
//
// Tick order:
//   1. Time::advance(elapsed)
//   2. drain host events → notify_*() / InputState::push, then sample,
//      then open the frame on the timer scheduler
//   3. ManagerRegistry::update_all (coroutines, timers, user managers)
//   4. App::update
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::config::RuntimeConfig;
use crate::core::context::{DrawContext, FrameContext};
use crate::core::coroutines::CoroutineScheduler;
use crate::core::debounce::Debouncer;
use crate::core::events::{CoreEvent, Emitter};
use crate::core::input::{InputEvent, InputState};
use crate::core::managers::{GlobalManager, ManagerRegistry};
use crate::core::platform_bridge::{EventCollector, HostEvent};
use crate::core::time::Time;
use crate::core::timers::TimerScheduler;
use crate::error::Result;
use crate::logging::init_logging;
use crate::platform::Platform;

//=== App Trait ===========================================================

/// User hooks invoked by the runtime.
///
/// Every hook has an empty default, so an app only overrides what it
/// needs.
pub trait App {
    /// Called once per tick, after every enabled manager has updated.
    fn update(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Called once per rendered frame, independently of `update`.
    fn draw(&mut self, _ctx: &DrawContext<'_>) {}

    /// Called when the host shuts down, before `Exiting` is emitted.
    fn on_exiting(&mut self) {}
}

impl App for () {}

//=== RuntimeBuilder ======================================================

/// Builder for configuring and constructing a [`Runtime`].
///
/// # Default Values
///
/// See [`RuntimeConfig`]. Extra managers are registered after the
/// built-in coroutine and timer schedulers, in the order given.
///
/// # Examples
///
/// ```no_run
/// use cadence_runtime::prelude::*;
///
/// struct Game;
/// impl App for Game {}
///
/// RuntimeBuilder::new()
///     .with_device_reset_debounce(0.1)
///     .with_channel_capacity(256)
///     .build(Game)
///     .run()
///     .expect("runtime failed");
/// ```
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    managers: Vec<Box<dyn GlobalManager>>,
}

impl RuntimeBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            managers: Vec::new(),
        }
    }

    /// Replaces the whole configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`RuntimeConfig::validate`].
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        if let Err(e) = config.validate() {
            panic!("Invalid runtime config: {}", e);
        }
        self.config = config;
        self
    }

    /// Sets the quiet period before a burst of device-changed
    /// notifications emits `GraphicsDeviceReset`.
    ///
    /// Default: 0.05
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_device_reset_debounce(mut self, seconds: f32) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Debounce window must be non-negative, got {}",
            seconds
        );
        self.config.device_reset_debounce = seconds;
        self
    }

    /// Sets the capacity of the host event channel.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.config.host_channel_capacity = capacity;
        self
    }

    /// Registers an extra manager at build time.
    pub fn with_manager<M>(mut self, manager: M) -> Self
    where
        M: GlobalManager + 'static,
    {
        self.managers.push(Box::new(manager));
        self
    }

    /// Builds the runtime around `app`.
    pub fn build<A: App>(self, app: A) -> Runtime<A> {
        info!(
            "Building runtime (debounce: {}s, channel: {}, extra managers: {})",
            self.config.device_reset_debounce,
            self.config.host_channel_capacity,
            self.managers.len()
        );

        let timers = TimerScheduler::new();
        let coroutines = CoroutineScheduler::new();

        let mut managers = ManagerRegistry::new();
        managers.register(coroutines.clone());
        managers.register(timers.clone());
        for manager in self.managers {
            managers.register_boxed(manager);
        }

        Runtime {
            device_reset: Debouncer::new(
                self.config.device_reset_debounce,
                CoreEvent::GraphicsDeviceReset,
            ),
            collector: EventCollector::new(self.config.host_channel_capacity),
            config: self.config,
            time: Time::new(),
            input: InputState::new(),
            managers,
            events: Emitter::new(),
            timers,
            coroutines,
            exit_requested: false,
            exited: false,
            app,
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Runtime =============================================================

/// The frame orchestrator.
///
/// Drive it yourself with [`tick`](Self::tick) and
/// [`render_frame`](Self::render_frame), or hand it to the winit host
/// with [`run`](Self::run).
pub struct Runtime<A: App> {
    config: RuntimeConfig,
    time: Time,
    input: InputState,
    managers: ManagerRegistry,
    events: Emitter<CoreEvent>,
    timers: TimerScheduler,
    coroutines: CoroutineScheduler,
    device_reset: Debouncer,
    collector: EventCollector,
    exit_requested: bool,
    exited: bool,
    app: A,
}

impl<A: App> Runtime<A> {
    /// Builds a runtime with the default configuration.
    pub fn new(app: A) -> Self {
        RuntimeBuilder::new().build(app)
    }

    //--- Frame Driving ----------------------------------------------------

    /// Runs one frame of logic for `elapsed` seconds of host time.
    ///
    /// Panics raised by managers, timer callbacks, coroutine steps or the
    /// update hook propagate out of this call.
    pub fn tick(&mut self, elapsed: f32) {
        //--- Step 1: Global time -------------------------------------------
        self.time.advance(elapsed);

        //--- Step 2: Host events and input ---------------------------------
        self.pump_host_events();
        self.input.sample();

        // Host notifications above count as arriving before this frame;
        // timers scheduled from here on are not charged its delta.
        self.timers.enter_frame(self.time.frame_count());

        //--- Step 3 & 4: Managers, then the update hook ---------------------
        let Self {
            time,
            input,
            managers,
            events,
            timers,
            coroutines,
            exit_requested,
            app,
            ..
        } = self;

        let mut ctx = FrameContext::new(
            time,
            input,
            managers,
            events,
            timers,
            coroutines,
            exit_requested,
        );
        ManagerRegistry::update_all(&mut ctx);
        app.update(&mut ctx);
    }

    /// Calls the draw hook with the state of the most recent tick.
    pub fn render_frame(&mut self) {
        let ctx = DrawContext {
            time: &self.time,
            input: &self.input,
        };
        self.app.draw(&ctx);
    }

    //--- Host Notifications -----------------------------------------------

    /// Records a display/device change.
    ///
    /// Bursts are coalesced: `GraphicsDeviceReset` is emitted once, after
    /// the configured quiet period has passed without another call.
    pub fn notify_device_changed(&mut self) {
        self.device_reset.trigger(&self.timers);
    }

    /// Emits `OrientationChanged` right away.
    pub fn notify_orientation_changed(&mut self) {
        debug!("Orientation changed");
        self.events.emit(CoreEvent::OrientationChanged);
    }

    /// Runs the app's shutdown hook, then emits `Exiting`.
    ///
    /// Only the first call has an effect.
    pub fn notify_exiting(&mut self) {
        if self.exited {
            return;
        }

        info!("Runtime exiting");
        self.exited = true;
        self.exit_requested = true;
        self.app.on_exiting();
        self.events.emit(CoreEvent::Exiting);
    }

    /// Queues input for the next tick's sampling step.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Returns a sender hosts (on any thread) use to queue notifications
    /// for the next tick.
    ///
    /// The channel is bounded; prefer `try_send` from threads that must
    /// not block.
    pub fn host_sender(&self) -> Sender<HostEvent> {
        self.collector.sender()
    }

    //--- Exit -------------------------------------------------------------

    /// Asks the host to shut down after the current frame.
    pub fn request_exit(&mut self) {
        debug!("Exit requested");
        self.exit_requested = true;
    }

    /// Returns `true` once the app, the host or a shutdown asked to exit.
    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Returns `true` once [`notify_exiting`](Self::notify_exiting) ran.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    //--- Execution --------------------------------------------------------

    /// Opens a window and drives the runtime from the winit event loop.
    ///
    /// Installs the `env_logger` backend first when
    /// `config.logging.init` is set. Returns once the window closed or
    /// exit was requested.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`](crate::RuntimeError) if the event loop
    /// cannot be created or fails while running.
    pub fn run(self) -> Result<()> {
        if self.config.logging.init {
            init_logging(&self.config.logging);
        }

        info!("Starting runtime ({})", self.config.window.title);
        Platform::new(self).run()
    }

    //--- Accessors --------------------------------------------------------

    /// Configuration the runtime was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Timing state of the most recent tick.
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Scales the `delta` seen by timers and coroutines. Negative values
    /// clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time.set_time_scale(scale);
    }

    /// Input sampled during the most recent tick.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Registered global managers, in update order.
    pub fn managers(&self) -> &ManagerRegistry {
        &self.managers
    }

    /// Mutable access for registering or toggling managers between ticks.
    pub fn managers_mut(&mut self) -> &mut ManagerRegistry {
        &mut self.managers
    }

    /// The runtime-wide emitter. Clone it to subscribe from elsewhere.
    pub fn events(&self) -> &Emitter<CoreEvent> {
        &self.events
    }

    /// The built-in timer scheduler.
    pub fn timers(&self) -> &TimerScheduler {
        &self.timers
    }

    /// The built-in coroutine scheduler.
    pub fn coroutines(&self) -> &CoroutineScheduler {
        &self.coroutines
    }

    /// The user app.
    pub fn app(&self) -> &A {
        &self.app
    }

    /// Mutable access to the user app.
    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    //--- Internal Helpers -------------------------------------------------

    fn pump_host_events(&mut self) {
        if self.collector.collect_frame() == 0 {
            return;
        }

        for event in self.collector.take_events() {
            match event {
                HostEvent::DeviceChanged => self.notify_device_changed(),
                HostEvent::OrientationChanged => self.notify_orientation_changed(),
                HostEvent::Exiting => self.notify_exiting(),
                HostEvent::Input(input) => self.push_input(input),
            }
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

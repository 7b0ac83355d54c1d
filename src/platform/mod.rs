//=========================================================================
// Platform Subsystem
//
// Drives a `Runtime` from the winit event loop.
//
// Architecture:
// ```text
//  Main Thread:
//  ┌───────────────────────────────────────────────┐
//  │  Winit Event Loop                             │
//  │   ├─ KeyboardInput / MouseInput / CursorMoved │
//  │   │    ↓ InputProcessor                       │
//  │   │  Runtime::push_input                      │
//  │   ├─ Resized / ScaleFactorChanged             │
//  │   │    ↓                                      │
//  │   │  Runtime::notify_device_changed (debounced)│
//  │   │  Runtime::notify_orientation_changed      │
//  │   ├─ CloseRequested                           │
//  │   │    ↓                                      │
//  │   │  Runtime::notify_exiting → exit           │
//  │   └─ RedrawRequested (frame boundary)         │
//  │        ↓ FrameClock                           │
//  │      Runtime::tick(dt) → Runtime::render_frame│
//  └───────────────────────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **RedrawRequested = frame boundary**: input buffered by the runtime
//   since the previous redraw is sampled by the next tick
// - **Sticky modifiers**: modifier state persists across events until
//   explicitly changed (matches platform behavior)
// - **Main thread requirement**: winit mandates main thread on
//   macOS/iOS, so this runs on the thread that called `Runtime::run()`
//
//=========================================================================

//=== Submodules ==========================================================

mod frame_clock;
mod input_processor;

//=== External Crates =====================================================

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::input::{InputEvent, KeyCode};
use crate::error::{Result, RuntimeError};
use crate::runtime::{App, Runtime};
use frame_clock::FrameClock;
use input_processor::InputProcessor;

//=== Platform ============================================================

/// Window owner and frame driver.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(runtime)`
/// 2. **Execution**: `platform.run()` blocks in the winit event loop
/// 3. **Shutdown**: window closed or exit requested → `notify_exiting`
///    → event loop exits → `run()` returns
///
/// This type is not `Send`; it must stay on the main thread.
pub(crate) struct Platform<A: App> {
    runtime: Runtime<A>,

    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,
    input_processor: InputProcessor,
    clock: FrameClock,
    focused: bool,

    /// Last seen orientation; `None` until the first non-empty size.
    landscape: Option<bool>,
}

impl<A: App> Platform<A> {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(runtime: Runtime<A>) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        let clock = FrameClock::new(runtime.config().max_frame_delta);

        Self {
            runtime,
            window: None,
            input_processor: InputProcessor::new(),
            clock,
            focused: true,
            landscape: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes or exit is requested.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::EventLoopCreation`] if the loop cannot be created
    /// (only one event loop may exist per process), and
    /// [`RuntimeError::EventLoopExecution`] if it fails while running.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS winit requirement).
    pub(crate) fn run(mut self) -> Result<()> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::new().map_err(RuntimeError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(RuntimeError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Runs one frame: tick (unless paused), draw, then honor exit
    /// requests.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let paused = self.runtime.config().pause_on_focus_lost && !self.focused;

        if paused {
            self.clock.reset();
        } else {
            let dt = self.clock.tick();
            self.runtime.tick(dt);
        }
        self.runtime.render_frame();

        if self.runtime.is_exit_requested() {
            self.shutdown(event_loop);
            return;
        }

        // While paused, the next redraw is requested on focus regain.
        if !paused {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        debug!(target: "platform", "Window resized to {}x{}", size.width, size.height);
        self.runtime.notify_device_changed();

        if orientation_flipped(&mut self.landscape, size) {
            self.runtime.notify_orientation_changed();
        }
    }

    fn handle_input(&mut self, input: InputEvent) {
        if self.runtime.config().exit_on_escape && input == InputEvent::key_down(KeyCode::Escape) {
            info!(target: "platform", "Escape pressed, exit requested");
            self.runtime.request_exit();
        }
        self.runtime.push_input(input);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.runtime.notify_exiting();
        event_loop.exit();
    }
}

/// Updates `last` with the orientation of `size` and reports whether it
/// flipped between landscape and portrait. Empty sizes (minimized
/// windows) are ignored.
fn orientation_flipped(last: &mut Option<bool>, size: PhysicalSize<u32>) -> bool {
    if size.width == 0 || size.height == 0 {
        return false;
    }

    let landscape = size.width >= size.height;
    let flipped = matches!(*last, Some(previous) if previous != landscape);
    *last = Some(landscape);
    flipped
}

//=== Winit Integration ===================================================

impl<A: App> ApplicationHandler for Platform<A> {
    /// Called when app becomes active (startup or mobile resume).
    ///
    /// Creates the window if it doesn't exist yet.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let config = &self.runtime.config().window;
        let fullscreen = config.fullscreen.then_some(Fullscreen::Borderless(None));
        let attrs = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_fullscreen(fullscreen);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                orientation_flipped(&mut self.landscape, size);
                self.clock.reset();
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.shutdown(event_loop);
            }
        }
    }

    /// Handles per-window events.
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(size) => self.handle_resize(*size),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                debug!(target: "platform", "Scale factor changed to {}", scale_factor);
                self.runtime.notify_device_changed();
            }

            WindowEvent::Focused(focused) => {
                trace!(target: "platform", "Focus changed: {}", focused);
                self.focused = *focused;
                if *focused {
                    self.clock.reset();
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {
                if let Some(input) = self.input_processor.process(&event) {
                    self.handle_input(input);
                }
            }
        }
    }

    /// Last callback before the loop returns; covers OS-initiated exits.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.runtime.notify_exiting();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

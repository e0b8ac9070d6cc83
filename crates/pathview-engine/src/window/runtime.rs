use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalSize, Size};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, InitCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::{InputEvent, InputFrame, InputState, KeyState};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: Size,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "pathview".to_string(),
            initial_size: PhysicalSize::new(800, 800).into(),
        }
    }
}

/// When the runtime asks for frames.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RedrawMode {
    /// Render a new frame as soon as the previous one is done.
    #[default]
    Continuous,
    /// Only redraw when the window system asks (expose, resize).
    OnDemand,
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_redraw_mode(&mut self, mode: RedrawMode) {
        self.commands.push(Command::SetRedrawMode(mode));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    SetRedrawMode(RedrawMode),
    Exit,
}

/// Whether `event` has to wake a loop that is not redrawing on its own.
///
/// Key bindings are only seen by `App::on_frame`, so a paused preview must
/// still get a frame for every key press.
pub(crate) fn wants_redraw(mode: RedrawMode, event: &InputEvent) -> bool {
    match mode {
        RedrawMode::Continuous => false,
        RedrawMode::OnDemand => matches!(
            event,
            InputEvent::Key { state: KeyState::Pressed, .. } | InputEvent::Focused(_)
        ),
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the preview window and drives `app` until the window closes.
    ///
    /// Returns an error when the event loop, the window, the GPU context, or
    /// `App::init` could not be created.
    pub fn run<A>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    redraw_mode: RedrawMode,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            entry: None,
            redraw_mode: RedrawMode::default(),
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.initial.title.clone())
            .with_inner_size(self.initial.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        let app = &mut self.app;
        entry.with_mut(|fields| {
            let mut ctx = InitCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            app.init(&mut ctx)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::SetRedrawMode(mode) => {
                    if mode != self.redraw_mode {
                        log::debug!("redraw mode: {mode:?}");
                    }
                    self.redraw_mode = mode;
                    if let Some(entry) = self.entry.as_mut() {
                        entry.with_clock_mut(|c| c.reset());
                        entry.with_window(|w| w.request_redraw());
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut app_control = AppControl::Continue;

        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            let ft: FrameTime = fields.clock.tick();

            // Scope to ensure `ctx` is dropped before mutating frame state.
            {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: window_id,
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    time: ft,
                    runtime: &mut runtime_ctx,
                };

                app_control = app.on_frame(&mut ctx);
            }

            // Clear per-frame deltas after the frame is consumed.
            fields.input_frame.clear();
        });

        if app_control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_commands(event_loop, runtime_ctx);
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to initialize preview window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if self.redraw_mode == RedrawMode::Continuous {
            if let Some(entry) = self.entry.as_ref() {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);

        let Some(entry) = entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let redraw_mode = self.redraw_mode;
        let wake = entry.with_mut(|fields| {
            let Some(ev) = translate_window_event(fields.input_state, &event) else {
                return false;
            };
            let wake = wants_redraw(redraw_mode, &ev);
            fields.input_state.apply_event(fields.input_frame, ev);
            wake
        });
        if wake {
            entry.with_window(|w| w.request_redraw());
        }

        if app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // App resources go before the device and window they were made from.
        self.app.on_exit();
        self.entry = None;
        log::debug!("runtime shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, Modifiers};

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat: false }
    }

    #[test]
    fn paused_loop_wakes_on_key_press() {
        assert!(wants_redraw(RedrawMode::OnDemand, &key(Key::P, KeyState::Pressed)));
        assert!(wants_redraw(RedrawMode::OnDemand, &key(Key::Escape, KeyState::Pressed)));
    }

    #[test]
    fn paused_loop_ignores_releases_and_modifiers() {
        assert!(!wants_redraw(RedrawMode::OnDemand, &key(Key::P, KeyState::Released)));
        assert!(!wants_redraw(
            RedrawMode::OnDemand,
            &InputEvent::ModifiersChanged(Modifiers { shift: true, ..Default::default() }),
        ));
    }

    #[test]
    fn paused_loop_wakes_on_focus_change() {
        assert!(wants_redraw(RedrawMode::OnDemand, &InputEvent::Focused(false)));
    }

    #[test]
    fn continuous_loop_never_needs_a_wake() {
        assert!(!wants_redraw(RedrawMode::Continuous, &key(Key::S, KeyState::Pressed)));
        assert!(!wants_redraw(RedrawMode::Continuous, &InputEvent::Focused(true)));
    }

    #[test]
    fn commands_are_buffered_in_order() {
        let mut ctx = RuntimeCtx::default();
        ctx.set_redraw_mode(RedrawMode::OnDemand);
        ctx.exit();
        assert!(matches!(
            ctx.commands.as_slice(),
            [Command::SetRedrawMode(RedrawMode::OnDemand), Command::Exit]
        ));
    }
}

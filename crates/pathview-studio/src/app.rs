use anyhow::Result;
use chrono::{DateTime, Utc};

use pathview_engine::capture;
use pathview_engine::config::PreviewConfig;
use pathview_engine::core::{App, AppControl, FrameCtx, InitCtx};
use pathview_engine::display::{Display, DisplayConfig, ScaleMode};
use pathview_engine::input::{InputFrame, Key};
use pathview_engine::step::{GradientStep, NoiseStep, RenderStep};
use pathview_engine::time::RateMeter;
use pathview_engine::window::{format_title, RedrawMode};

use crate::cli::StepKind;

/// Something the user asked for this frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    Quit,
    Screenshot,
    Reset,
    TogglePause,
    ToggleFit,
    ToggleFlipX,
}

/// Key bindings, in the order they are handled.
const BINDINGS: [(Key, Action); 6] = [
    (Key::Escape, Action::Quit),
    (Key::R, Action::Reset),
    (Key::P, Action::TogglePause),
    (Key::F, Action::ToggleFit),
    (Key::X, Action::ToggleFlipX),
    (Key::S, Action::Screenshot),
];

/// Actions triggered by keys pressed this frame.
pub fn actions(frame: &InputFrame) -> Vec<Action> {
    BINDINGS
        .iter()
        .filter(|(key, _)| frame.pressed(*key))
        .map(|(_, action)| *action)
        .collect()
}

/// The preview: runs a render step each frame and shows its pixel buffer.
pub struct PreviewApp {
    config: PreviewConfig,
    step_kind: StepKind,
    started: DateTime<Utc>,

    display: Option<Display>,
    step: Option<Box<dyn RenderStep>>,

    paused: bool,
    title: String,
    rate: RateMeter,
}

impl PreviewApp {
    pub fn new(config: PreviewConfig, step_kind: StepKind) -> Self {
        Self {
            config,
            step_kind,
            started: Utc::now(),
            display: None,
            step: None,
            paused: false,
            title: String::new(),
            rate: RateMeter::default(),
        }
    }

    fn window_title(&self, iteration: u32) -> String {
        let title = format_title(&self.config.title, iteration);
        if self.paused {
            format!("{title} [paused]")
        } else {
            title
        }
    }

    fn save_screenshot(&self, ctx: &FrameCtx<'_, '_>, display: &Display, iteration: u32) -> Result<()> {
        let rgba = capture::read_display_image(ctx.gpu.device(), ctx.gpu.queue(), display.image())?;
        let (width, height) = display.image().size();
        let name = capture::screenshot_file_name(&self.config.screenshot_prefix, self.started, iteration);
        let path = capture::save_png(&self.config.screenshot_dir, &name, width, height, rgba)?;
        log::info!("saved screenshot {}", path.display());
        Ok(())
    }
}

impl App for PreviewApp {
    fn init(&mut self, ctx: &mut InitCtx<'_, '_>) -> Result<()> {
        let display = Display::new(ctx.device(), self.config.display_config())?;

        let step: Box<dyn RenderStep> = match self.step_kind {
            StepKind::Gradient => Box::new(GradientStep::new(ctx.device(), display.pixels())),
            StepKind::Noise => Box::new(NoiseStep::new(self.config.width, self.config.height)),
        };

        log::info!(
            "preview {}x{} with {} step; keys: Esc quit, S screenshot, R reset, P pause, F fit, X mirror",
            self.config.width,
            self.config.height,
            step.label(),
        );

        self.display = Some(display);
        self.step = Some(step);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (Some(mut display), Some(mut step)) = (self.display.take(), self.step.take()) else {
            return AppControl::Exit;
        };

        let control = self.frame(ctx, &mut display, step.as_mut());

        self.display = Some(display);
        self.step = Some(step);
        control
    }

    fn on_exit(&mut self) {
        if let Some(step) = self.step.as_ref() {
            log::info!("stopped after {} iterations", step.iteration());
        }
        self.step = None;
        self.display = None;
    }
}

impl PreviewApp {
    fn frame(
        &mut self,
        ctx: &mut FrameCtx<'_, '_>,
        display: &mut Display,
        step: &mut dyn RenderStep,
    ) -> AppControl {
        let mut screenshot = false;

        for action in actions(ctx.input_frame) {
            match action {
                Action::Quit => return AppControl::Exit,
                Action::Reset => {
                    step.reset();
                    ctx.clear_pixels(display);
                    log::info!("accumulation reset");
                }
                Action::TogglePause => {
                    self.paused = !self.paused;
                    ctx.runtime.set_redraw_mode(if self.paused {
                        RedrawMode::OnDemand
                    } else {
                        RedrawMode::Continuous
                    });
                }
                Action::ToggleFit => {
                    let mode = match display.config().scale_mode {
                        ScaleMode::Stretch => ScaleMode::Fit,
                        ScaleMode::Fit => ScaleMode::Stretch,
                    };
                    display.set_scale_mode(mode);
                    log::info!("scale mode: {mode:?}");
                }
                Action::ToggleFlipX => {
                    let DisplayConfig { flip_x, flip_y, .. } = *display.config();
                    display.set_flip(ctx.gpu.queue(), !flip_x, flip_y);
                }
                Action::Screenshot => screenshot = true,
            }
        }

        if !self.paused {
            if let Err(e) = step.step(&ctx.step_ctx(), display.pixels()) {
                log::error!("{} step failed: {e:#}", step.label());
                return AppControl::Exit;
            }

            if let Some(fps) = self.rate.record(ctx.time.dt) {
                log::debug!("{fps:.1} frames/s at iteration {}", step.iteration());
            }
        }

        let title = self.window_title(step.iteration());
        if title != self.title {
            ctx.window.set_title(&title);
            self.title = title;
        }

        if ctx.present(display) == AppControl::Exit {
            return AppControl::Exit;
        }

        if screenshot {
            if let Err(e) = self.save_screenshot(ctx, display, step.iteration()) {
                log::error!("screenshot failed: {e:#}");
            }
        }

        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathview_engine::input::{InputEvent, InputState, KeyState, Modifiers};

    fn press(keys: &[Key]) -> InputFrame {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for key in keys {
            state.apply_event(
                &mut frame,
                InputEvent::Key {
                    key: *key,
                    state: KeyState::Pressed,
                    modifiers: Modifiers::default(),
                    repeat: false,
                },
            );
        }
        frame
    }

    #[test]
    fn no_keys_no_actions() {
        assert!(actions(&InputFrame::default()).is_empty());
    }

    #[test]
    fn escape_quits() {
        assert_eq!(actions(&press(&[Key::Escape])), vec![Action::Quit]);
    }

    #[test]
    fn actions_follow_binding_order() {
        let got = actions(&press(&[Key::S, Key::X, Key::P, Key::R]));
        assert_eq!(
            got,
            vec![Action::Reset, Action::TogglePause, Action::ToggleFlipX, Action::Screenshot]
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert!(actions(&press(&[Key::Q, Key::Space])).is_empty());
    }

    #[test]
    fn title_marks_pause() {
        let mut app = PreviewApp::new(PreviewConfig::default(), StepKind::Noise);
        assert_eq!(app.window_title(3), "pathview | 3 Iterations");
        app.paused = true;
        assert_eq!(app.window_title(3), "pathview | 3 Iterations [paused]");
    }

    #[test]
    fn reset_while_paused_restarts_the_count() {
        let mut app = PreviewApp::new(PreviewConfig::default(), StepKind::Noise);
        let mut step = NoiseStep::with_seed(4, 4, 7);
        step.sample();
        step.sample();
        app.paused = true;
        assert_eq!(app.window_title(step.iteration()), "pathview | 2 Iterations [paused]");

        step.reset();
        assert_eq!(app.window_title(step.iteration()), "pathview | 0 Iterations [paused]");
    }
}

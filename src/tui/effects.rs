use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::Frame;
use std::time::Instant;
use tachyonfx::{fx, Effect, EffectRenderer, Interpolation, Motion};

/// Duration for animations in milliseconds
const EFFECT_DURATION_MS: u32 = 400;

/// Prompt slides in a little faster than the panes
const PROMPT_DURATION_MS: u32 = 250;

/// Delay between each pane's animation in milliseconds
const STAGGER_DELAY_MS: u32 = 80;

/// Background color for slide animation
const SLIDE_BG: Color = Color::from_u32(0x1D2021);

/// Calculate inner area of a block (excluding 1-pixel border on all sides)
fn inner_area(area: Rect) -> Rect {
    if area.width < 2 || area.height < 2 {
        return area;
    }
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Sessions,
    Windows,
    Activity,
    Prompt,
}

/// Slide-in animations for the board. When disabled every trigger is a
/// no-op and content simply appears.
pub struct EffectsManager {
    enabled: bool,
    effects: Vec<(PaneId, Effect, Rect)>,
    last_frame: Instant,
    startup_triggered: bool,
}

impl EffectsManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            effects: Vec::new(),
            last_frame: Instant::now(),
            startup_triggered: false,
        }
    }

    fn slide(area: Rect, duration_ms: u32, delay_ms: u32) -> Effect {
        let timer = (duration_ms, Interpolation::Linear);
        let slide = fx::slide_in(Motion::UpToDown, 10, 0, SLIDE_BG, timer).with_area(area);

        if delay_ms > 0 {
            fx::sequence(&[fx::sleep(delay_ms), slide])
        } else {
            slide
        }
    }

    /// Stagger the panes in, top to bottom, once per run
    pub fn trigger_startup(&mut self, areas: &StartupAreas) {
        if self.startup_triggered {
            return;
        }
        self.startup_triggered = true;
        if !self.enabled {
            return;
        }

        let panes = [
            (PaneId::Sessions, areas.sessions),
            (PaneId::Windows, areas.windows),
            (PaneId::Activity, areas.activity),
        ];
        self.effects.clear();
        for (i, (id, area)) in panes.into_iter().enumerate() {
            let inner = inner_area(area);
            let delay = i as u32 * STAGGER_DELAY_MS;
            self.effects
                .push((id, Self::slide(inner, EFFECT_DURATION_MS, delay), inner));
        }
        self.last_frame = Instant::now();
    }

    /// Slide the redirect prompt in
    pub fn trigger_prompt(&mut self, area: Rect) {
        if !self.enabled {
            return;
        }
        self.effects.retain(|(id, _, _)| *id != PaneId::Prompt);
        let inner = inner_area(area);
        self.effects
            .push((PaneId::Prompt, Self::slide(inner, PROMPT_DURATION_MS, 0), inner));
        self.last_frame = Instant::now();
    }

    /// Process and render all active effects on the frame
    pub fn process(&mut self, frame: &mut Frame) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.last_frame).as_millis() as u32;
        self.last_frame = now;
        let elapsed = tachyonfx::Duration::from_millis(elapsed_ms);

        self.effects.retain_mut(|(_, effect, area)| {
            frame.render_effect(effect, *area, elapsed);
            effect.running()
        });
    }

    pub fn has_active_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// Areas for startup animation
#[derive(Debug, Clone, Default)]
pub struct StartupAreas {
    pub sessions: Rect,
    pub windows: Rect,
    pub activity: Rect,
}

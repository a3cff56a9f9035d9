use crate::core::types::Toast;
use crate::tui::{Action, Component, RenderContext};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const MAX_VISIBLE: usize = 4;

/// Expiring notices in the bottom-right corner
pub struct ToastStack {
    toasts: Vec<(Toast, u64)>,
    lifetime: u64,
}

impl ToastStack {
    /// `lifetime` is measured in ticks
    pub fn new(lifetime: u64) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime: lifetime.max(1),
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push((toast, self.lifetime));
        if self.toasts.len() > MAX_VISIBLE {
            let overflow = self.toasts.len() - MAX_VISIBLE;
            self.toasts.drain(..overflow);
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().map(|(t, _)| t)
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Component for ToastStack {
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        if self.toasts.is_empty() {
            return;
        }
        let width = self
            .toasts
            .iter()
            .map(|(t, _)| t.message.chars().count() as u16 + 4)
            .max()
            .unwrap_or(0)
            .max(20)
            .min(area.width);
        let height = (self.toasts.len() as u16 + 2).min(area.height);
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width),
            y: area.y + area.height.saturating_sub(height),
            width,
            height,
        };
        let lines: Vec<Line> = self
            .toasts
            .iter()
            .map(|(t, _)| {
                Line::from(Span::styled(
                    t.message.clone(),
                    ctx.theme.toast_style(t.level),
                ))
            })
            .collect();
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(ctx.theme.border_style()),
            ),
            rect,
        );
    }

    fn supported_actions(&self) -> &[Action] {
        &[]
    }

    fn name(&self) -> &str {
        "ToastStack"
    }

    fn update(&mut self) -> Result<()> {
        for (_, ticks) in self.toasts.iter_mut() {
            *ticks = ticks.saturating_sub(1);
        }
        self.toasts.retain(|(_, ticks)| *ticks > 0);
        Ok(())
    }
}

use crate::core::pattern::DEFAULT_FLAGS;
use crate::core::state::ViewState;
use crate::core::types::ExecutionResult;
use crate::tui::{Action, Component, RenderContext};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

/// One-line summary of the active pattern, plus optional details
pub struct RegexChips {
    supported_actions: Vec<Action>,
}

impl Default for RegexChips {
    fn default() -> Self {
        Self::new()
    }
}

/// `(label, value)` pairs for the summary line
pub fn chips(state: &ViewState) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if let Some(upload) = &state.upload {
        out.push(("file", format!("{} #{}", upload.filename, upload.file_id)));
    }
    if let Some(view) = &state.result {
        out.push(("mode", view.mode().to_string()));
        if let Some(p) = &view.pattern {
            out.push(("regex", p.clone()));
        }
        out.push((
            "flags",
            view.flags.clone().unwrap_or_else(|| DEFAULT_FLAGS.to_string()),
        ));
        if let Some(intent) = &view.intent {
            if let Some(rep) = &intent.replacement {
                out.push(("replace with", rep.clone()));
            }
        }
        if !view.row_filter.is_empty() {
            out.push(("rows", view.row_filter.clone()));
        }
        match &view.result {
            ExecutionResult::Find(find) => {
                out.push(("matches", find.stats.total_matches.to_string()));
                if let Some(n) = view.result_rows_count {
                    out.push(("hit rows", n.to_string()));
                }
            }
            ExecutionResult::Replace(replace) => {
                out.push(("replaced", replace.replacements_count.to_string()));
            }
        }
    }
    if state.auto_chain {
        out.push(("auto-chain", "on".to_string()));
    }
    if state.show_hits_only {
        out.push(("view", "hits only".to_string()));
    }
    out
}

/// Extra lines shown when regex details are toggled on
pub fn details(state: &ViewState) -> Vec<String> {
    let Some(view) = &state.result else {
        return Vec::new();
    };
    let mut out = vec![format!("instruction: {}", view.instruction)];
    if let Some(src) = &view.pattern_source {
        out.push(format!("regex source: {}", src));
    }
    if let Some(d) = &view.display_pattern {
        match &view.display_pattern_source {
            Some(src) => out.push(format!("display regex: {} ({})", d, src)),
            None => out.push(format!("display regex: {}", d)),
        }
    }
    if let Some(intent) = &view.intent {
        let mut line = format!("intent: {}", intent.intent);
        if let Some(c) = intent.confidence {
            line.push_str(&format!(" ({:.0}%)", c * 100.0));
        }
        if let Some(reason) = &intent.reason {
            line.push_str(&format!(" {}", reason));
        }
        out.push(line);
    }
    if let Some(plan) = &view.plan_source {
        out.push(format!("plan: {}", plan));
    }
    if let Some(desc) = &view.result_rows_description {
        out.push(desc.clone());
    }
    if view.matcher().is_none() {
        out.push("highlighting off for this pattern".to_string());
    }
    out
}

impl RegexChips {
    pub fn new() -> Self {
        Self {
            supported_actions: vec![Action::ToggleRegexInfo],
        }
    }

    /// Rows needed to draw the current state
    pub fn height(state: &ViewState) -> u16 {
        let extra = if state.show_regex_info {
            details(state).len()
        } else {
            0
        };
        1 + extra as u16
    }
}

impl Component for RegexChips {
    /// The toggle lives on [`ViewState`]; the owner applies it
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let mut spans = Vec::new();
        for (label, value) in chips(ctx.state) {
            spans.push(Span::styled(format!(" {}: {} ", label, value), theme.chip_style()));
            spans.push(Span::raw(" "));
        }
        if spans.is_empty() {
            spans.push(Span::styled("sheetrx", theme.muted_style()));
        }
        let mut lines = vec![Line::from(spans)];
        if ctx.state.show_regex_info {
            lines.extend(
                details(ctx.state)
                    .into_iter()
                    .map(|d| Line::from(Span::styled(d, theme.muted_style()))),
            );
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "RegexChips"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::StateEvent;
    use crate::core::types::{FileId, UploadResult};
    use pretty_assertions::assert_eq;

    fn state_with_find() -> ViewState {
        let mut state = ViewState::default();
        state.apply(StateEvent::UploadStarted);
        state.apply(StateEvent::UploadSucceeded(UploadResult {
            file_id: FileId::Int(3),
            filename: "a.csv".to_string(),
            is_excel: false,
            columns: vec!["email".to_string()],
            head: Vec::new(),
        }));
        state.apply(StateEvent::ExecuteStarted);
        state.apply(StateEvent::ExecuteSucceeded {
            instruction: "find emails".to_string(),
            chained: false,
            response: Box::new(
                serde_json::from_value(serde_json::json!({
                    "mode": "find",
                    "regex": "\\S+@\\S+",
                    "regex_source": "llm",
                    "row_filter_normalized": "status == 'active'",
                    "stats": {"total_matches": 4, "rows_with_hits": 3}
                }))
                .unwrap(),
            ),
        });
        state
    }

    #[test]
    fn test_find_chips() {
        let state = state_with_find();
        let labels: Vec<&str> = chips(&state).iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec!["file", "mode", "regex", "flags", "rows", "matches", "hit rows"]
        );
        assert!(chips(&state).contains(&("flags", "i".to_string())));
    }

    #[test]
    fn test_details_height() {
        let mut state = state_with_find();
        assert_eq!(RegexChips::height(&state), 1);
        state.apply(StateEvent::RegexInfoToggled);
        assert_eq!(RegexChips::height(&state), 1 + details(&state).len() as u16);
        assert!(details(&state).contains(&"regex source: llm".to_string()));
    }

    #[test]
    fn test_badges() {
        let mut state = ViewState::default();
        state.auto_chain = true;
        state.apply(StateEvent::ShowHitsOnlyToggled);
        assert_eq!(
            chips(&state),
            vec![
                ("auto-chain", "on".to_string()),
                ("view", "hits only".to_string())
            ]
        );
    }
}

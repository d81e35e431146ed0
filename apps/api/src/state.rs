use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{Config, TextMeasure};
use crate::layout::{CharBudgetFlow, MetricFlow, TextFlow};
use crate::render::theme::{Theme, ThemePreset};

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Every preset with the deployment's overrides applied.
    pub themes: Arc<HashMap<ThemePreset, Arc<Theme>>>,
    /// Line-breaking strategy selected by `TEXT_MEASURE`.
    pub text_flow: Arc<dyn TextFlow>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let themes = ThemePreset::ALL
            .into_iter()
            .map(|preset| {
                let theme = Theme::from_preset(preset).with_overrides(&config.theme_overrides);
                (preset, Arc::new(theme))
            })
            .collect();

        let text_flow: Arc<dyn TextFlow> = match config.text_measure {
            TextMeasure::CharBudget => Arc::new(CharBudgetFlow),
            TextMeasure::Metrics => {
                let family = config
                    .theme_overrides
                    .font_family
                    .unwrap_or(Theme::default().font_family);
                Arc::new(MetricFlow::new(family))
            }
        };

        AppState {
            config,
            themes: Arc::new(themes),
            text_flow,
        }
    }

    /// Theme for `preset`, or the configured default when none is requested.
    pub fn theme(&self, preset: Option<ThemePreset>) -> Arc<Theme> {
        let preset = preset.unwrap_or(self.config.default_preset);
        match self.themes.get(&preset) {
            Some(theme) => Arc::clone(theme),
            None => Arc::new(Theme::from_preset(preset).with_overrides(&self.config.theme_overrides)),
        }
    }
}

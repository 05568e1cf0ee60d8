use crate::config::EffectsConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollThresholds {
    pub header: f64,
    pub scroll_top: f64,
    pub section_offset: f64,
}

impl From<&EffectsConfig> for ScrollThresholds {
    fn from(config: &EffectsConfig) -> Self {
        Self {
            header: config.header_scroll_threshold,
            scroll_top: config.scroll_top_threshold,
            section_offset: config.section_offset,
        }
    }
}

impl Default for ScrollThresholds {
    fn default() -> Self {
        Self::from(&EffectsConfig::default())
    }
}

/// Everything the header derives from one scroll position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavSnapshot {
    pub header_scrolled: bool,
    pub active: Option<String>,
    pub show_scroll_top: bool,
}

impl NavSnapshot {
    pub fn is_active(&self, section_id: &str) -> bool {
        self.active.as_deref() == Some(section_id)
    }
}

pub fn evaluate(scroll_y: f64, sections: &[SectionBounds], thresholds: ScrollThresholds) -> NavSnapshot {
    NavSnapshot {
        header_scrolled: scroll_y > thresholds.header,
        active: active_section(scroll_y, sections, thresholds.section_offset).map(str::to_string),
        show_scroll_top: scroll_y > thresholds.scroll_top,
    }
}

/// Section whose offset band `[top - offset, top - offset + height)` holds
/// `scroll_y`. Overlapping bands resolve to the last match in document
/// order.
pub fn active_section(scroll_y: f64, sections: &[SectionBounds], offset: f64) -> Option<&str> {
    sections
        .iter()
        .rev()
        .find(|section| {
            let start = section.top - offset;
            scroll_y >= start && scroll_y < start + section.height
        })
        .map(|section| section.id.as_str())
}

/// Whether a nav link's `href` points at `section_id`.
pub fn link_targets_section(href: &str, section_id: &str) -> bool {
    href.trim_start_matches('#') == section_id
        || href.rsplit_once('#').is_some_and(|(_, fragment)| fragment == section_id)
}

/// Hamburger toggle and the nav panel share one open flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggled(self) -> Self {
        Self { open: !self.open }
    }

    pub fn closed(self) -> Self {
        Self { open: false }
    }

    pub fn toggle_class(&self) -> Option<&'static str> {
        self.open.then_some("active")
    }

    pub fn panel_class(&self) -> Option<&'static str> {
        self.open.then_some("show-menu")
    }
}

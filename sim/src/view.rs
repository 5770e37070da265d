use tilepop_core::*;

/// Headless stand-in for a sprite with a collider.
#[derive(Debug)]
pub struct LogView {
    name: String,
    color: Option<Color>,
    hit_testing: bool,
}

impl LogView {
    pub fn new(name: String) -> Self {
        Self {
            name,
            color: None,
            hit_testing: false,
        }
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn hit_testing(&self) -> bool {
        self.hit_testing
    }
}

impl PieceView for LogView {
    fn set_color(&mut self, color: Color) {
        log::debug!(
            "{}: color rgba({}, {}, {}, {})",
            self.name,
            color.r,
            color.g,
            color.b,
            color.a
        );
        self.color = Some(color);
    }

    fn set_hit_testing(&mut self, enabled: bool) {
        if self.hit_testing != enabled {
            log::trace!("{}: hit testing {}", self.name, enabled);
        }
        self.hit_testing = enabled;
    }
}

/// Headless floating score text.
#[derive(Debug)]
pub struct LogPresenter {
    name: String,
    label: String,
    cues_played: u32,
}

impl LogPresenter {
    pub fn new(name: String) -> Self {
        Self {
            name,
            label: String::new(),
            cues_played: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cues_played(&self) -> u32 {
        self.cues_played
    }
}

impl ScorePresenter for LogPresenter {
    fn play_cue(&mut self, cue: Cue) {
        log::debug!("{}: play {:?}", self.name, cue);
        self.cues_played += 1;
    }

    fn set_label(&mut self, text: &str) {
        log::info!("{}: {}", self.name, text);
        self.label = text.to_owned();
    }
}

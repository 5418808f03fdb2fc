#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureProperties {
    /// Text shown in the hover popup.
    pub hover_label: String,
    /// Representative speed of a traffic segment, km/h.
    pub speed: Option<f64>,
}

impl FeatureProperties {
    pub fn labeled(hover_label: impl Into<String>) -> Self {
        Self {
            hover_label: hover_label.into(),
            speed: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}
